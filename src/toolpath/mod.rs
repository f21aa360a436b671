//! Toolpath model
//!
//! The read-only result of a parse: ordered layers plus the totals the
//! interpreter published when the stream ended.

pub mod builder;
pub mod model;
pub mod vector;

use serde::Serialize;

use crate::diagnostics::Diagnostic;
use crate::metrics;
use crate::profile::ProfileStore;

pub use builder::ToolpathBuilder;
pub use model::{Layer, MoveKind, PathSegment, PathType, Point};
pub use vector::Vec3;

/// A fully parsed print job
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Toolpath {
    layers: Vec<Layer>,
    extrusion_amount: f64,
    total_move_time_minutes: f64,
    preamble_ended: bool,
    diagnostics: Vec<Diagnostic>,
}

/// Serializable overview of a toolpath
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolpathSummary {
    pub layers: usize,
    pub segments: usize,
    pub points: usize,
    pub extrusion_mm: f64,
    pub duration_minutes: f64,
    pub preamble_ended: bool,
    pub diagnostics: usize,
}

impl Toolpath {
    pub(crate) fn new(
        layers: Vec<Layer>,
        extrusion_amount: f64,
        total_move_time_minutes: f64,
        preamble_ended: bool,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        Self {
            layers,
            extrusion_amount,
            total_move_time_minutes,
            preamble_ended,
            diagnostics,
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Total filament extruded (mm), the highest value the accumulator reached
    pub fn extrusion_amount(&self) -> f64 {
        self.extrusion_amount
    }

    /// Estimated print duration in minutes
    pub fn total_move_time_minutes(&self) -> f64 {
        self.total_move_time_minutes
    }

    /// Whether the start-of-print preamble was left (a non-custom path type was seen)
    pub fn preamble_ended(&self) -> bool {
        self.preamble_ended
    }

    /// Non-fatal problems noticed while parsing
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Filament weight in kilograms
    pub fn calculate_weight(&self, profile: &dyn ProfileStore) -> f64 {
        metrics::filament_weight(self.extrusion_amount, profile)
    }

    /// Filament cost, or `None` when no cost is configured
    pub fn calculate_cost(&self, profile: &dyn ProfileStore) -> Option<String> {
        metrics::filament_cost(self.extrusion_amount, profile)
    }

    pub fn summary(&self) -> ToolpathSummary {
        ToolpathSummary {
            layers: self.layers.len(),
            segments: self.layers.iter().map(Layer::segment_count).sum(),
            points: self.layers.iter().map(Layer::point_count).sum(),
            extrusion_mm: self.extrusion_amount,
            duration_minutes: self.total_move_time_minutes,
            preamble_ended: self.preamble_ended,
            diagnostics: self.diagnostics.len(),
        }
    }
}
