//! Interpreter state
//!
//! Everything the motion state machine carries from one line to the next.

use crate::toolpath::{PathType, Point, Vec3};

/// Z drop (mm) beyond which a descending travel may be a primer/home move
pub const PRIMER_DROP_THRESHOLD: f64 = 5.0;

/// Z height (mm) below which such a drop is treated as landing on the bed
pub const PRIMER_LANDING_CEILING: f64 = 1.0;

/// Feed rate assumed before the first `F` word, in mm/min
pub const DEFAULT_FEED_RATE: f64 = 3600.0;

/// Layer thickness assumed before the first Z travel, in mm
pub const DEFAULT_LAYER_THICKNESS: f64 = 0.1;

/// Millimeters per inch, the scale selected by G20
pub const INCH_SCALE: f64 = 25.4;

/// Outlier guard for layer-thickness inference
///
/// Slicer start code often parks the head high and then drops to the first
/// layer. Read naively, that drop would become the layer thickness. A fall
/// of more than `drop_threshold` that lands below `landing_ceiling` is
/// measured from zero instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimerHeuristic {
    pub drop_threshold: f64,
    pub landing_ceiling: f64,
}

impl Default for PrimerHeuristic {
    fn default() -> Self {
        Self {
            drop_threshold: PRIMER_DROP_THRESHOLD,
            landing_ceiling: PRIMER_LANDING_CEILING,
        }
    }
}

impl PrimerHeuristic {
    /// Layer thickness implied by a travel from `old_z` to `new_z`
    pub fn layer_thickness(&self, old_z: f64, new_z: f64) -> f64 {
        let is_primer_drop = old_z > new_z
            && (old_z - new_z).abs() > self.drop_threshold
            && new_z < self.landing_ceiling;

        let from_z = if is_primer_drop { 0.0 } else { old_z };
        (from_z - new_z).abs()
    }
}

/// Mutable state of one parse
#[derive(Debug, Clone)]
pub struct MachineState {
    /// Physical head position
    pub position: Vec3,
    /// Offset added to absolute coordinates (G92, G28, nozzle offsets)
    pub offset: Vec3,
    /// Live E axis value, as the firmware sees it
    pub current_e: f64,
    /// Running accumulated extrusion, unaffected by G92 E resets
    pub extrusion_total: f64,
    /// Highest value `extrusion_total` reached
    pub max_extrusion: f64,
    /// mm/min
    pub feed_rate: f64,
    /// Unit scale: 1.0 for mm, 25.4 for inches
    pub scale: f64,
    pub absolute_position: bool,
    pub absolute_extrusion: bool,
    pub extruder: u32,
    pub extrusion_multiplier: f64,
    pub path_type: PathType,
    pub layer_thickness: f64,
    pub move_time_minutes: f64,
    /// Set once a non-custom path type shows up
    pub preamble_ended: bool,
}

impl Default for MachineState {
    fn default() -> Self {
        Self {
            position: Vec3::zero(),
            offset: Vec3::zero(),
            current_e: 0.0,
            extrusion_total: 0.0,
            max_extrusion: 0.0,
            feed_rate: DEFAULT_FEED_RATE,
            scale: 1.0,
            absolute_position: true,
            absolute_extrusion: true,
            extruder: 0,
            extrusion_multiplier: 1.0,
            path_type: PathType::Custom,
            layer_thickness: DEFAULT_LAYER_THICKNESS,
            move_time_minutes: 0.0,
            preamble_ended: false,
        }
    }
}

impl MachineState {
    /// Point for the current position and extrusion
    pub fn point(&self) -> Point {
        Point::new(self.position, self.extrusion_total, self.extrusion_multiplier)
    }

    /// New coordinate for one axis given a parsed word
    pub fn resolve_axis(&self, current: f64, value: f64, offset: f64) -> f64 {
        if self.absolute_position {
            value * self.scale + offset
        } else {
            current + value * self.scale
        }
    }

    /// Feed a new E value, returning the signed change of the accumulator
    pub fn advance_extrusion(&mut self, e: f64) -> f64 {
        let target = if self.absolute_extrusion {
            e
        } else {
            self.current_e + e
        };

        let delta = target - self.current_e;
        self.extrusion_total += delta;
        self.current_e = target;
        if self.extrusion_total > self.max_extrusion {
            self.max_extrusion = self.extrusion_total;
        }
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_thickness_from_z_step() {
        let heuristic = PrimerHeuristic::default();
        assert!((heuristic.layer_thickness(0.2, 0.4) - 0.2).abs() < 1e-12);
        assert!((heuristic.layer_thickness(0.4, 0.2) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_primer_drop_is_measured_from_zero() {
        let heuristic = PrimerHeuristic::default();
        assert_eq!(heuristic.layer_thickness(15.0, 0.3), 0.3);
        // Large drop that stays high is a real move
        assert_eq!(heuristic.layer_thickness(15.0, 2.0), 13.0);
        // Small drop near the bed is a real move
        assert_eq!(heuristic.layer_thickness(4.0, 0.5), 3.5);
    }

    #[test]
    fn test_custom_heuristic_thresholds() {
        let heuristic = PrimerHeuristic {
            drop_threshold: 2.0,
            landing_ceiling: 1.0,
        };
        assert_eq!(heuristic.layer_thickness(4.0, 0.5), 0.5);
    }

    #[test]
    fn test_resolve_axis_modes() {
        let mut state = MachineState::default();
        assert_eq!(state.resolve_axis(5.0, 10.0, 1.0), 11.0);

        state.absolute_position = false;
        state.scale = INCH_SCALE;
        assert_eq!(state.resolve_axis(5.0, 1.0, 1.0), 30.4);
    }

    #[test]
    fn test_extrusion_accumulator_tracks_maximum() {
        let mut state = MachineState::default();
        assert_eq!(state.advance_extrusion(5.0), 5.0);
        assert_eq!(state.advance_extrusion(3.0), -2.0);
        assert_eq!(state.extrusion_total, 3.0);
        assert_eq!(state.max_extrusion, 5.0);

        state.absolute_extrusion = false;
        assert_eq!(state.advance_extrusion(4.0), 4.0);
        assert_eq!(state.current_e, 7.0);
        assert_eq!(state.max_extrusion, 7.0);
    }
}
