//! Derived-Metric Calculator
//!
//! Weight and cost of the filament a toolpath consumes. Every call takes one
//! fresh snapshot of the profile store, since the store may change between
//! calls.

use std::f64::consts::PI;

use crate::profile::{Profile, ProfileStore};

const MM3_PER_M3: f64 = 1000.0 * 1000.0 * 1000.0;
const MM_PER_M: f64 = 1000.0;

/// Filament weight in kilograms
///
/// The extruded length is treated as a cylinder of the configured filament
/// diameter; its volume times the configured density (kg/m³) gives the mass.
pub fn filament_weight(extruded_mm: f64, profile: &dyn ProfileStore) -> f64 {
    weight_with(extruded_mm, &profile.snapshot())
}

fn weight_with(extruded_mm: f64, profile: &Profile) -> f64 {
    let radius = profile.filament_diameter / 2.0;
    let volume_m3 = extruded_mm * PI * radius * radius / MM3_PER_M3;
    volume_m3 * profile.filament_density
}

/// Filament cost formatted to two decimals
///
/// With both a per-kg and a per-meter price configured, both estimates are
/// returned as `"<by weight> / <by length>"`. Returns `None` when neither
/// price is positive.
pub fn filament_cost(extruded_mm: f64, profile: &dyn ProfileStore) -> Option<String> {
    let profile = profile.snapshot();
    let cost_kg = profile.filament_cost_kg;
    let cost_meter = profile.filament_cost_meter;

    let by_weight = || weight_with(extruded_mm, &profile) * cost_kg;
    let by_length = || extruded_mm / MM_PER_M * cost_meter;

    match (cost_kg > 0.0, cost_meter > 0.0) {
        (true, true) => Some(format!("{:.2} / {:.2}", by_weight(), by_length())),
        (true, false) => Some(format!("{:.2}", by_weight())),
        (false, true) => Some(format!("{:.2}", by_length())),
        (false, false) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Profile;

    fn profile(diameter: f64, density: f64, cost_kg: f64, cost_meter: f64) -> Profile {
        Profile {
            filament_diameter: diameter,
            filament_density: density,
            filament_cost_kg: cost_kg,
            filament_cost_meter: cost_meter,
            ..Profile::default()
        }
    }

    #[test]
    fn test_weight_matches_hand_computation() {
        let profile = profile(1.75, 1.24, 0.0, 0.0);
        let expected = PI * 0.875 * 0.875 * 1000.0 / 1e9 * 1.24;
        let weight = filament_weight(1000.0, &profile);
        assert!((weight - expected).abs() < 1e-15);
    }

    #[test]
    fn test_weight_of_pla_meter() {
        // One meter of 1.75 mm PLA weighs about three grams
        let profile = profile(1.75, 1240.0, 0.0, 0.0);
        let grams = filament_weight(1000.0, &profile) * 1000.0;
        assert!((grams - 2.9826).abs() < 1e-3);
    }

    #[test]
    fn test_weight_without_profile_is_zero() {
        assert_eq!(filament_weight(1000.0, &Profile::default()), 0.0);
    }

    #[test]
    fn test_cost_by_weight_only() {
        let profile = profile(1.75, 1240.0, 20.0, 0.0);
        let expected = format!("{:.2}", filament_weight(10_000.0, &profile) * 20.0);
        assert_eq!(filament_cost(10_000.0, &profile), Some(expected));
    }

    #[test]
    fn test_cost_by_length_only() {
        let profile = profile(1.75, 1240.0, 0.0, 0.05);
        assert_eq!(filament_cost(12_000.0, &profile), Some("0.60".to_string()));
    }

    #[test]
    fn test_cost_both_estimates() {
        let profile = profile(1.75, 1240.0, 20.0, 0.05);
        let by_weight = filament_weight(12_000.0, &profile) * 20.0;
        assert_eq!(
            filament_cost(12_000.0, &profile),
            Some(format!("{:.2} / 0.60", by_weight))
        );
    }

    #[test]
    fn test_cost_unavailable() {
        let unpriced = profile(1.75, 1240.0, 0.0, 0.0);
        assert_eq!(filament_cost(12_000.0, &unpriced), None);

        let negative = profile(1.75, 1240.0, -1.0, -1.0);
        assert_eq!(filament_cost(12_000.0, &negative), None);
    }
}
