//! Command-line front end
//!
//! Parses each file named on the command line and prints a per-file report.

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::config::Config;
use crate::interpreter::{Interpreter, ParseOutcome};
use crate::profile::{FileProfileStore, Profile, ProfileStore};
use crate::toolpath::ToolpathSummary;

/// Everything reported for one input file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub summary: ToolpathSummary,
    pub weight_kg: f64,
    /// `None` when no filament price is configured
    pub cost: Option<String>,
}

/// Entry point used by the binary
pub fn run() -> Result<()> {
    let config = Config::from_args_and_env()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    let profile = open_profile(&config)?;

    let mut reports = Vec::with_capacity(config.files.len());
    for path in &config.files {
        reports.push(analyze_file(path, profile.as_ref())?);
    }

    if config.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print!("{}", render_text(report));
        }
    }

    Ok(())
}

/// Profile store selected by the configuration
pub fn open_profile(config: &Config) -> Result<Box<dyn ProfileStore>> {
    match &config.profile_path {
        Some(path) => {
            let store = FileProfileStore::new(path);
            // Fail early on a broken profile; lookups later re-read the file
            store.load()?;
            log::debug!("Using profile {}", path.display());
            Ok(Box::new(store))
        }
        None => {
            log::debug!("Using embedded default profile");
            Ok(Box::new(Profile::embedded_default()))
        }
    }
}

/// Parse one file and compute its metrics
pub fn analyze_file(path: &Path, profile: &dyn ProfileStore) -> Result<FileReport> {
    // The library treats a missing file as empty; on the command line that is a mistake
    if !path.is_file() {
        bail!("G-code file not found: {}", path.display());
    }

    let mut interpreter = Interpreter::new(profile).with_progress(|fraction| {
        log::debug!("{}: {:.0}%", path.display(), fraction * 100.0);
        ControlFlow::Continue(())
    });

    let outcome = interpreter
        .load(path)
        .with_context(|| format!("Failed to analyze {}", path.display()))?;
    let toolpath = match outcome {
        ParseOutcome::Completed(toolpath) => toolpath,
        ParseOutcome::Cancelled(_) => bail!("Loading {} was cancelled", path.display()),
    };

    Ok(FileReport {
        path: path.to_path_buf(),
        summary: toolpath.summary(),
        weight_kg: toolpath.calculate_weight(profile),
        cost: toolpath.calculate_cost(profile),
    })
}

/// Human-readable report block
pub fn render_text(report: &FileReport) -> String {
    let summary = &report.summary;
    let cost = report.cost.as_deref().unwrap_or("unavailable");

    format!(
        concat!(
            "{}\n",
            "  layers:      {}\n",
            "  segments:    {}\n",
            "  points:      {}\n",
            "  filament:    {:.2} mm\n",
            "  duration:    {:.2} min\n",
            "  weight:      {:.2} g\n",
            "  cost:        {}\n",
            "  diagnostics: {}\n",
        ),
        report.path.display(),
        summary.layers,
        summary.segments,
        summary.points,
        summary.extrusion_mm,
        summary.duration_minutes,
        report.weight_kg * 1000.0,
        cost,
        summary.diagnostics,
    )
}
