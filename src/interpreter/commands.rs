//! Motion State Machine
//!
//! Interprets one line at a time: annotations first, then the tool select,
//! then the G or M command. State changes land in [`MachineState`]; geometry
//! lands in the [`ToolpathBuilder`].

use std::borrow::Cow;

use crate::diagnostics::Diagnostics;
use crate::parser::{classify_line, Tokenizer};
use crate::profile::{Profile, ProfileStore};
use crate::toolpath::{Layer, MoveKind, Toolpath, ToolpathBuilder, Vec3};

use super::state::{MachineState, PrimerHeuristic, INCH_SCALE};

/// M codes that carry no geometric meaning
///
/// Message/wait, power, steppers, steps-per-unit, extruder enable/disable,
/// temperatures, fans, extruder RPM/PWM and line-number resets.
const IGNORED_M_CODES: &[i64] = &[
    1, 80, 81, 84, 92, 101, 103, 104, 105, 106, 107, 108, 109, 110, 113, 140, 190,
];

/// What a line did to the layer structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEffect {
    None,
    /// A layer marker closed the previous layer
    LayerBoundary,
}

/// State of one forward pass over the input
pub struct ParsePass<'a> {
    tokenizer: &'a Tokenizer,
    /// Taken once when the pass starts
    profile: Cow<'a, Profile>,
    heuristic: PrimerHeuristic,
    state: MachineState,
    builder: ToolpathBuilder,
    diagnostics: Diagnostics,
    line_number: usize,
}

impl<'a> ParsePass<'a> {
    pub fn new(
        tokenizer: &'a Tokenizer,
        profile: &'a dyn ProfileStore,
        heuristic: PrimerHeuristic,
    ) -> Self {
        let state = MachineState::default();
        let builder = ToolpathBuilder::new(state.point(), state.layer_thickness);

        Self {
            tokenizer,
            profile: profile.snapshot(),
            heuristic,
            state,
            builder,
            diagnostics: Diagnostics::new(),
            line_number: 0,
        }
    }

    /// Interpret one raw line
    pub fn feed_line(&mut self, line: &str) -> LineEffect {
        self.line_number += 1;

        let annotation = classify_line(line);
        if let Some(path_type) = annotation.path_type {
            self.state.path_type = path_type;
        }
        if annotation.has_comment && !self.state.path_type.is_custom() {
            self.state.preamble_ended = true;
        }

        let effect = if annotation.layer_boundary {
            self.builder.close_layer();
            log::debug!(
                "Layer {} closed at line {}",
                self.builder.closed_layer_count(),
                self.line_number
            );
            LineEffect::LayerBoundary
        } else {
            LineEffect::None
        };

        let code = annotation.code;
        self.select_tool(code);

        if let Some(g) = self.tokenizer.code_int(code, 'G') {
            self.dispatch_g(g, code);
        } else if let Some(m) = self.tokenizer.code_int(code, 'M') {
            self.dispatch_m(m, code);
        }

        effect
    }

    /// Close the open layer and publish totals
    pub fn finish(self) -> Toolpath {
        log::debug!(
            "Parsed {} lines: {:.2} mm extruded, {:.2} min",
            self.line_number,
            self.state.max_extrusion,
            self.state.move_time_minutes
        );

        Toolpath::new(
            self.builder.finish(),
            self.state.max_extrusion,
            self.state.move_time_minutes,
            self.state.preamble_ended,
            self.diagnostics.into_vec(),
        )
    }

    /// Stop without closing the in-progress layer
    pub fn abandon(self) -> Vec<Layer> {
        self.builder.into_closed_layers()
    }

    fn select_tool(&mut self, code: &str) {
        let Some(index) = self.tokenizer.code_int(code, 'T') else {
            return;
        };
        let Ok(index) = u32::try_from(index) else {
            self.diagnostics.invalid_extruder(self.line_number, index);
            return;
        };
        if index == self.state.extruder {
            return;
        }

        let (old_x, old_y) = self.nozzle_offset(self.state.extruder);
        let (new_x, new_y) = self.nozzle_offset(index);
        self.state.offset.x += new_x - old_x;
        self.state.offset.y += new_y - old_y;

        log::debug!(
            "Switched extruder T{} -> T{} at line {}",
            self.state.extruder,
            index,
            self.line_number
        );
        self.state.extruder = index;
    }

    /// Extruder 0 is the reference nozzle and never has an offset
    fn nozzle_offset(&self, index: u32) -> (f64, f64) {
        if index == 0 {
            (0.0, 0.0)
        } else {
            self.profile.extruder_offset(index)
        }
    }

    fn dispatch_g(&mut self, g: i64, code: &str) {
        match g {
            0 | 1 => self.linear_move(code),
            4 => self.dwell(code),
            20 => self.state.scale = INCH_SCALE,
            21 => self.state.scale = 1.0,
            28 => self.home(code),
            90 => self.state.absolute_position = true,
            91 => self.state.absolute_position = false,
            92 => self.set_position(code),
            _ => self.diagnostics.unknown_command(self.line_number, 'G', g),
        }
    }

    fn dispatch_m(&mut self, m: i64, code: &str) {
        match m {
            82 => self.state.absolute_extrusion = true,
            83 => self.state.absolute_extrusion = false,
            221 => {
                if let Some(s) = self.tokenizer.code_float(code, 'S') {
                    self.state.extrusion_multiplier = s / 100.0;
                }
            }
            m if IGNORED_M_CODES.contains(&m) => {}
            _ => self.diagnostics.unknown_command(self.line_number, 'M', m),
        }
    }

    /// G0/G1
    fn linear_move(&mut self, code: &str) {
        let t = self.tokenizer;
        let x = t.code_float(code, 'X');
        let y = t.code_float(code, 'Y');
        let z = t.code_float(code, 'Z');
        let e = t.code_float(code, 'E');
        let f = t.code_float(code, 'F');

        let state = &mut self.state;
        let old_position = state.position;

        if let Some(x) = x {
            state.position.x = state.resolve_axis(state.position.x, x, state.offset.x);
        }
        if let Some(y) = y {
            state.position.y = state.resolve_axis(state.position.y, y, state.offset.y);
        }
        if let Some(z) = z {
            state.position.z = state.resolve_axis(state.position.z, z, state.offset.z);
        }
        if let Some(f) = f {
            state.feed_rate = f;
        }

        if x.is_some() || y.is_some() || z.is_some() {
            if state.feed_rate > 0.0 {
                state.move_time_minutes += old_position.distance(&state.position) / state.feed_rate;
            } else {
                log::debug!(
                    "Skipping time estimate at line {}: feed rate {}",
                    self.line_number,
                    state.feed_rate
                );
            }
        }

        let mut kind = MoveKind::Travel;
        if let Some(e) = e {
            let delta = state.advance_extrusion(e);
            if delta > 0.0 {
                kind = MoveKind::Extrude;
            } else if delta < 0.0 {
                kind = MoveKind::Retract;
            }
        }

        if kind == MoveKind::Travel && old_position.z != state.position.z {
            state.layer_thickness = self
                .heuristic
                .layer_thickness(old_position.z, state.position.z);
        }

        self.builder.push_point(
            kind,
            &state.path_type,
            state.layer_thickness,
            state.point(),
        );
    }

    /// G4: S seconds or P milliseconds
    fn dwell(&mut self, code: &str) {
        if let Some(seconds) = self.tokenizer.code_float(code, 'S') {
            self.state.move_time_minutes += seconds / 60.0;
        }
        if let Some(millis) = self.tokenizer.code_float(code, 'P') {
            self.state.move_time_minutes += millis / 60.0 / 1000.0;
        }
    }

    /// G28: home all axes, or only the ones named
    fn home(&mut self, code: &str) {
        let t = self.tokenizer;
        let x = t.has_word(code, 'X');
        let y = t.has_word(code, 'Y');
        let z = t.has_word(code, 'Z');

        if !(x || y || z) {
            self.state.position = Vec3::zero();
            self.state.offset = Vec3::zero();
            return;
        }
        if x {
            self.state.position.x = 0.0;
        }
        if y {
            self.state.position.y = 0.0;
        }
        if z {
            self.state.position.z = 0.0;
        }
    }

    /// G92: redefine the current position without moving
    fn set_position(&mut self, code: &str) {
        let t = self.tokenizer;
        let state = &mut self.state;

        if let Some(e) = t.code_float(code, 'E') {
            state.current_e = e;
        }
        if let Some(x) = t.code_float(code, 'X') {
            state.offset.x = state.position.x - x;
        }
        if let Some(y) = t.code_float(code, 'Y') {
            state.offset.y = state.position.y - y;
        }
        if let Some(z) = t.code_float(code, 'Z') {
            state.offset.z = state.position.z - z;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolpath::PathType;

    fn run(lines: &[&str], profile: &Profile) -> Toolpath {
        let tokenizer = Tokenizer::new();
        let mut pass = ParsePass::new(&tokenizer, profile, PrimerHeuristic::default());
        for line in lines {
            pass.feed_line(line);
        }
        pass.finish()
    }

    fn last_position(toolpath: &Toolpath) -> Vec3 {
        let layer = toolpath.layers().last().expect("layer");
        let segment = layer.segments().last().expect("segment");
        segment.last_point().position
    }

    #[test]
    fn test_absolute_move() {
        let toolpath = run(&["G1 X10 Y20 Z0.3 E1.5"], &Profile::default());
        assert_eq!(last_position(&toolpath), Vec3::new(10.0, 20.0, 0.3));
        assert_eq!(toolpath.extrusion_amount(), 1.5);
    }

    #[test]
    fn test_relative_positioning() {
        let toolpath = run(&["G1 X10", "G91", "G1 X5 Y-2", "G1 X5"], &Profile::default());
        assert_eq!(last_position(&toolpath), Vec3::new(20.0, -2.0, 0.0));
    }

    #[test]
    fn test_relative_extrusion() {
        let toolpath = run(
            &["M83", "G1 X1 E1", "G1 X2 E1", "G1 X3 E-0.5", "G1 X4 E0.5"],
            &Profile::default(),
        );
        assert_eq!(toolpath.extrusion_amount(), 2.0);
    }

    #[test]
    fn test_g92_offsets_absolute_coordinates() {
        let toolpath = run(&["G1 X50", "G92 X0", "G1 X10"], &Profile::default());
        assert_eq!(last_position(&toolpath).x, 60.0);
    }

    #[test]
    fn test_g92_e_keeps_total_extrusion() {
        let toolpath = run(
            &["G1 X1 E10", "G92 E0", "G1 X2 E5", "G1 X3 E6"],
            &Profile::default(),
        );
        assert_eq!(toolpath.extrusion_amount(), 16.0);
    }

    #[test]
    fn test_home_all_and_single_axis() {
        let toolpath = run(&["G1 X10 Y10 Z5", "G28 X", "G91", "G1 X1"], &Profile::default());
        assert_eq!(last_position(&toolpath), Vec3::new(1.0, 10.0, 5.0));

        // G28 with axes keeps offsets
        let toolpath = run(&["G92 X5", "G28 X0", "G1 X10"], &Profile::default());
        assert_eq!(last_position(&toolpath).x, 5.0);

        let toolpath = run(&["G1 X10 Y10 Z5", "G92 X0", "G28", "G1 X1"], &Profile::default());
        assert_eq!(last_position(&toolpath), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_dwell_time() {
        let toolpath = run(&["G4 S30", "G4 P1500"], &Profile::default());
        assert!((toolpath.total_move_time_minutes() - 0.525).abs() < 1e-12);
    }

    #[test]
    fn test_move_time_uses_feed_rate() {
        let toolpath = run(&["G1 X30 Y40 F600"], &Profile::default());
        assert!((toolpath.total_move_time_minutes() - 50.0 / 600.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_feed_rate_does_not_poison_time() {
        let toolpath = run(&["G1 X10 F0", "G1 X20 F600"], &Profile::default());
        assert!(toolpath.total_move_time_minutes().is_finite());
        assert!((toolpath.total_move_time_minutes() - 10.0 / 600.0).abs() < 1e-12);
    }

    #[test]
    fn test_extrusion_multiplier() {
        let toolpath = run(&["M221 S95", "G1 X1 E1"], &Profile::default());
        let point = toolpath.layers()[0].segments()[1].last_point();
        assert!((point.extrusion_multiplier - 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_tool_change_applies_nozzle_offsets() {
        let mut profile = Profile::default();
        profile.extruder_offsets.insert(1, (18.0, 2.0));
        profile.extruder_offsets.insert(2, (-5.0, 0.0));

        let toolpath = run(&["T1", "G1 X10 Y10"], &profile);
        assert_eq!(last_position(&toolpath), Vec3::new(28.0, 12.0, 0.0));

        let toolpath = run(&["T1", "T2", "G1 X10 Y10"], &profile);
        assert_eq!(last_position(&toolpath), Vec3::new(5.0, 10.0, 0.0));

        let toolpath = run(&["T1", "T0", "G1 X10 Y10"], &profile);
        assert_eq!(last_position(&toolpath), Vec3::new(10.0, 10.0, 0.0));
    }

    #[test]
    fn test_reselecting_same_tool_is_noop() {
        let mut profile = Profile::default();
        profile.extruder_offsets.insert(1, (18.0, 0.0));

        let toolpath = run(&["T1", "T1", "G1 X10"], &profile);
        assert_eq!(last_position(&toolpath).x, 28.0);
    }

    #[test]
    fn test_unknown_codes_produce_diagnostics() {
        let toolpath = run(&["G29", "M999", "M104 S200", "G1 X1"], &Profile::default());
        let lines: Vec<_> = toolpath.diagnostics().iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![1, 2]);
        assert_eq!(last_position(&toolpath).x, 1.0);
    }

    #[test]
    fn test_preamble_ends_on_typed_comment() {
        let toolpath = run(&["; start code", "G28"], &Profile::default());
        assert!(!toolpath.preamble_ended());

        let toolpath = run(&[";TYPE:CUSTOM", "G28", ";TYPE:SKIRT"], &Profile::default());
        assert!(toolpath.preamble_ended());
    }

    #[test]
    fn test_path_type_applies_to_following_moves() {
        let toolpath = run(&[";TYPE:WALL-OUTER", "G1 X10 E1"], &Profile::default());
        let segment = &toolpath.layers()[0].segments()[1];
        assert_eq!(segment.path_type(), &PathType::WallOuter);
        assert_eq!(segment.kind(), MoveKind::Extrude);
    }
}
