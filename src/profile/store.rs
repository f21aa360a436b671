//! Profile Store
//!
//! Read-only lookups the interpreter and metric calculator make against the
//! machine/material configuration. Absent values read as zero.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::schema::Profile;

/// Source of machine and material parameters
///
/// Callers that need several values take one [`snapshot`](Self::snapshot)
/// so they all come from the same version of the profile.
pub trait ProfileStore {
    /// Consistent view of the whole profile as of this call
    fn snapshot(&self) -> Cow<'_, Profile>;

    /// Filament diameter in mm
    fn filament_diameter(&self) -> f64 {
        self.snapshot().filament_diameter
    }

    /// Filament density in kg/m³
    fn filament_density(&self) -> f64 {
        self.snapshot().filament_density
    }

    /// Price per kilogram of filament
    fn filament_cost_kg(&self) -> f64 {
        self.snapshot().filament_cost_kg
    }

    /// Price per meter of filament
    fn filament_cost_meter(&self) -> f64 {
        self.snapshot().filament_cost_meter
    }

    /// X/Y nozzle offset of extruder `index`, relative to extruder 0
    fn extruder_offset(&self, index: u32) -> (f64, f64) {
        self.snapshot().extruder_offset(index)
    }
}

impl ProfileStore for Profile {
    fn snapshot(&self) -> Cow<'_, Profile> {
        Cow::Borrowed(self)
    }
}

/// Profile backed by a TOML file that is re-read on every lookup
///
/// Edits to the file between two metric calls are picked up without
/// reloading anything. A file that is missing or fails to parse reads as an
/// empty profile.
#[derive(Debug, Clone)]
pub struct FileProfileStore {
    path: PathBuf,
}

impl FileProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the profile file
    pub fn load(&self) -> Result<Profile> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read profile file: {}", self.path.display()))?;

        Profile::from_toml_str(&content)
            .with_context(|| format!("Failed to parse profile TOML: {}", self.path.display()))
    }

}

impl ProfileStore for FileProfileStore {
    fn snapshot(&self) -> Cow<'_, Profile> {
        let profile = self.load().unwrap_or_else(|e| {
            log::warn!("{:#}", e);
            Profile::default()
        });
        Cow::Owned(profile)
    }
}
