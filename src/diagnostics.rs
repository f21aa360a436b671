//! Parse diagnostics
//!
//! Problems the interpreter noticed but stepped over. None of them stop a
//! parse; they are logged and kept on the result for callers that care.

use std::fmt;

use serde::Serialize;

/// What kind of oddity was seen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A G or M code outside the supported set
    UnknownCommand,
    /// A tool index that cannot name an extruder
    InvalidExtruder,
}

/// A non-fatal message tied to a 1-based input line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub line: usize,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Collects diagnostics during a parse, logging each as it arrives
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unknown_command(&mut self, line: usize, letter: char, code: i64) {
        self.push(
            line,
            DiagnosticKind::UnknownCommand,
            format!("Unknown {letter} code: {letter}{code}"),
        );
    }

    pub fn invalid_extruder(&mut self, line: usize, index: i64) {
        self.push(
            line,
            DiagnosticKind::InvalidExtruder,
            format!("Ignoring invalid extruder index T{index}"),
        );
    }

    fn push(&mut self, line: usize, kind: DiagnosticKind, message: String) {
        log::warn!("line {}: {}", line, message);
        self.items.push(Diagnostic {
            line,
            kind,
            message,
        });
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}
