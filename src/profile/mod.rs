//! Machine/material profiles
//!
//! The configuration store consulted for filament properties and extruder
//! offsets, plus the TOML format it is loaded from.

pub mod schema;
pub mod store;

pub use schema::{ExtruderEntry, FilamentSection, Profile, ProfileFile};
pub use store::{FileProfileStore, ProfileStore};
