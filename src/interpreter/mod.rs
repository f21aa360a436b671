//! G-code interpreter
//!
//! Streams G-code lines through the motion state machine and returns the
//! reconstructed toolpath. Input can be a file path, any `BufRead`, or lines
//! already in memory.
//!
//! The only suspension point is the optional progress callback, invoked at
//! every layer boundary with the fraction of input bytes consumed so far.
//! Returning [`ControlFlow::Break`] stops the parse immediately and yields
//! [`ParseOutcome::Cancelled`].

pub mod commands;
pub mod state;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::ControlFlow;
use std::path::Path;

use anyhow::{Context, Result};

use crate::parser::Tokenizer;
use crate::profile::ProfileStore;
use crate::toolpath::{Layer, Toolpath};

pub use commands::{LineEffect, ParsePass};
pub use state::{
    MachineState, PrimerHeuristic, DEFAULT_FEED_RATE, DEFAULT_LAYER_THICKNESS, INCH_SCALE,
    PRIMER_DROP_THRESHOLD, PRIMER_LANDING_CEILING,
};

/// Callback receiving the consumed fraction of the input at layer boundaries
pub type ProgressCallback<'p> = Box<dyn FnMut(f64) -> ControlFlow<()> + 'p>;

/// Layers gathered before a parse was cancelled
///
/// Not authoritative: the layer that was being filled is missing and no
/// totals were published.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialToolpath {
    pub layers: Vec<Layer>,
    /// Input fraction consumed when the callback asked to stop
    pub progress: f64,
}

/// Result of a parse
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum ParseOutcome {
    Completed(Toolpath),
    Cancelled(PartialToolpath),
}

impl ParseOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ParseOutcome::Cancelled(_))
    }

    /// The finished toolpath, or `None` if the parse was cancelled
    pub fn completed(self) -> Option<Toolpath> {
        match self {
            ParseOutcome::Completed(toolpath) => Some(toolpath),
            ParseOutcome::Cancelled(_) => None,
        }
    }

    /// Layers held by either variant
    pub fn layers(&self) -> &[Layer] {
        match self {
            ParseOutcome::Completed(toolpath) => toolpath.layers(),
            ParseOutcome::Cancelled(partial) => &partial.layers,
        }
    }
}

/// Reusable G-code interpreter
///
/// Owns the tokenizer's precompiled matchers; each `load*` call runs an
/// independent pass with fresh machine state.
pub struct Interpreter<'p> {
    tokenizer: Tokenizer,
    profile: &'p dyn ProfileStore,
    heuristic: PrimerHeuristic,
    progress: Option<ProgressCallback<'p>>,
}

impl<'p> Interpreter<'p> {
    pub fn new(profile: &'p dyn ProfileStore) -> Self {
        Self {
            tokenizer: Tokenizer::new(),
            profile,
            heuristic: PrimerHeuristic::default(),
            progress: None,
        }
    }

    /// Install a progress callback
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: FnMut(f64) -> ControlFlow<()> + 'p,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Override the primer-move thresholds used for layer thickness
    pub fn with_primer_heuristic(mut self, heuristic: PrimerHeuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    /// Parse a G-code file
    ///
    /// A path that does not name an existing file yields an empty, completed
    /// toolpath. Read errors on an existing file are returned.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<ParseOutcome> {
        let path = path.as_ref();
        if !path.is_file() {
            log::warn!("G-code file not found, nothing loaded: {}", path.display());
            return Ok(ParseOutcome::Completed(Toolpath::default()));
        }

        let file = File::open(path)
            .with_context(|| format!("Failed to open G-code file: {}", path.display()))?;
        let size = file
            .metadata()
            .with_context(|| format!("Failed to stat G-code file: {}", path.display()))?
            .len();

        let outcome = self
            .load_reader(BufReader::new(file), size)
            .with_context(|| format!("Failed to read G-code file: {}", path.display()))?;

        if let ParseOutcome::Completed(toolpath) = &outcome {
            log::info!(
                "Loaded {}: {} layers, {:.2} mm filament, {:.2} min",
                path.display(),
                toolpath.layers().len(),
                toolpath.extrusion_amount(),
                toolpath.total_move_time_minutes()
            );
        }
        Ok(outcome)
    }

    /// Parse from a buffered reader, streaming line by line
    ///
    /// `total_bytes` is the expected input size used for progress fractions.
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn load_reader<R: BufRead>(
        &mut self,
        mut reader: R,
        total_bytes: u64,
    ) -> Result<ParseOutcome> {
        let mut pass = ParsePass::new(&self.tokenizer, self.profile, self.heuristic);
        let mut buffer = Vec::new();
        let mut consumed: u64 = 0;

        loop {
            buffer.clear();
            let read = reader.read_until(b'\n', &mut buffer)?;
            if read == 0 {
                break;
            }
            consumed += read as u64;

            let line = String::from_utf8_lossy(&buffer);
            let effect = pass.feed_line(line.trim_end_matches(['\n', '\r']));
            if effect == LineEffect::LayerBoundary {
                let progress = fraction(consumed, total_bytes);
                if report(&mut self.progress, progress).is_break() {
                    return Ok(cancelled(pass, progress));
                }
            }
        }

        Ok(ParseOutcome::Completed(pass.finish()))
    }

    /// Parse lines that are already in memory
    ///
    /// Progress is measured in bytes, counting one separator per line.
    pub fn load_lines<S: AsRef<str>>(&mut self, lines: &[S]) -> ParseOutcome {
        let total_bytes: u64 = lines.iter().map(|l| l.as_ref().len() as u64 + 1).sum();
        let mut pass = ParsePass::new(&self.tokenizer, self.profile, self.heuristic);
        let mut consumed: u64 = 0;

        for line in lines {
            let line = line.as_ref();
            consumed += line.len() as u64 + 1;

            if pass.feed_line(line) == LineEffect::LayerBoundary {
                let progress = fraction(consumed, total_bytes);
                if report(&mut self.progress, progress).is_break() {
                    return cancelled(pass, progress);
                }
            }
        }

        ParseOutcome::Completed(pass.finish())
    }
}

fn fraction(consumed: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (consumed as f64 / total as f64).min(1.0)
    }
}

fn report(progress: &mut Option<ProgressCallback<'_>>, fraction: f64) -> ControlFlow<()> {
    match progress {
        Some(callback) => callback(fraction),
        None => ControlFlow::Continue(()),
    }
}

fn cancelled(pass: ParsePass<'_>, progress: f64) -> ParseOutcome {
    log::info!("G-code loading cancelled at {:.0}%", progress * 100.0);
    ParseOutcome::Cancelled(PartialToolpath {
        layers: pass.abandon(),
        progress,
    })
}
