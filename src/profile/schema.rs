//! Profile Schema Types
//!
//! TOML layout of a machine/material profile and its runtime form.

use std::collections::HashMap;

use serde::Deserialize;

/// Root profile file structure (matches TOML)
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ProfileFile {
    #[serde(default)]
    pub filament: FilamentSection,
    #[serde(default)]
    pub extruders: Vec<ExtruderEntry>,
}

/// `[filament]` table
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilamentSection {
    /// Filament diameter in mm
    pub diameter: f64,
    /// Density in kg/m³
    pub density: f64,
    /// Price per kilogram
    pub cost_kg: f64,
    /// Price per meter
    pub cost_meter: f64,
}

/// One `[[extruders]]` entry
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtruderEntry {
    pub index: u32,
    /// Nozzle X offset relative to extruder 0, in mm
    pub offset_x: f64,
    /// Nozzle Y offset relative to extruder 0, in mm
    pub offset_y: f64,
}

/// Runtime profile (optimized for lookups)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub filament_diameter: f64,
    pub filament_density: f64,
    pub filament_cost_kg: f64,
    pub filament_cost_meter: f64,
    pub extruder_offsets: HashMap<u32, (f64, f64)>,
}

impl From<ProfileFile> for Profile {
    fn from(file: ProfileFile) -> Self {
        let extruder_offsets = file
            .extruders
            .into_iter()
            .map(|e| (e.index, (e.offset_x, e.offset_y)))
            .collect();

        Self {
            filament_diameter: file.filament.diameter,
            filament_density: file.filament.density,
            filament_cost_kg: file.filament.cost_kg,
            filament_cost_meter: file.filament.cost_meter,
            extruder_offsets,
        }
    }
}

impl Profile {
    /// Parse a profile from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<ProfileFile>(content).map(Profile::from)
    }

    /// X/Y nozzle offset of extruder `index`; unknown extruders have none
    pub fn extruder_offset(&self, index: u32) -> (f64, f64) {
        self.extruder_offsets
            .get(&index)
            .copied()
            .unwrap_or((0.0, 0.0))
    }

    /// Profile shipped with the binary (1.75 mm PLA, single extruder)
    pub fn embedded_default() -> Self {
        let embedded_toml = include_str!("../../resources/profiles/default.profile.toml");

        match Self::from_toml_str(embedded_toml) {
            Ok(profile) => profile,
            Err(e) => {
                log::warn!(
                    "Failed to parse embedded default profile: {}. Using empty profile.",
                    e
                );
                Self::default()
            }
        }
    }
}
