//! Configuration management for the toolpath reader.
//!
//! Handles:
//! - Command-line argument parsing
//! - Profile file resolution

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// File name of the per-user profile inside the config directory
pub const PROFILE_FILE_NAME: &str = "profile.toml";

/// Command-line arguments for the toolpath reader
#[derive(Debug, Parser)]
#[command(name = "gcode-toolpath")]
#[command(about = "Reconstruct layers, filament use and print time from G-code files")]
#[command(version)]
pub struct Args {
    /// G-code files to analyze
    #[arg(required = true, help = "G-code files to analyze")]
    pub files: Vec<PathBuf>,

    /// Machine/material profile to use
    #[arg(long, help = "Profile TOML with filament and extruder settings")]
    pub profile: Option<PathBuf>,

    /// Emit JSON instead of text
    #[arg(long, help = "Print the report as JSON")]
    pub json: bool,

    /// Log level
    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    /// Input files, in command-line order
    pub files: Vec<PathBuf>,
    /// Profile file to read, or `None` for the embedded default
    pub profile_path: Option<PathBuf>,
    /// Report format
    pub json: bool,
    /// Log level
    pub log_level: String,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args) -> Result<Self> {
        // Explicit profile wins, then the user config directory
        let profile_path = args
            .profile
            .or_else(|| user_profile_path().filter(|path| path.is_file()));

        Ok(Config {
            files: args.files,
            profile_path,
            json: args.json,
            log_level: args.log_level,
        })
    }
}

/// `<config_dir>/gcode-toolpath/profile.toml`
pub fn user_profile_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gcode-toolpath").join(PROFILE_FILE_NAME))
}
