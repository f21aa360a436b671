//! G-code Toolpath Reader
//!
//! Reconstructs a layered toolpath model from 3-D printer G-code.
//!
//! This library provides:
//! - Streaming, single-pass G-code interpretation
//! - Layer/segment/point toolpath model with move classification
//! - Filament length, weight, cost and print-time estimates
//! - TOML machine/material profiles

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod interpreter;
pub mod metrics;
pub mod parser;
pub mod profile;
pub mod toolpath;

// Re-exports for clean public API
pub use config::Config;
pub use diagnostics::Diagnostic;
pub use interpreter::{Interpreter, ParseOutcome, PartialToolpath};
pub use profile::{FileProfileStore, Profile, ProfileStore};
pub use toolpath::{Layer, MoveKind, PathSegment, PathType, Point, Toolpath, Vec3};
