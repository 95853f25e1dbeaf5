//! Preset container decoding for CM3D2-format content.
//!
//! # File Format
//!
//! - string: `CM3D2_PRESET`
//! - i32: version
//! - i32: preset kind (wear, body, all)
//! - i32 thumbnail length, then the thumbnail (absent when 0)
//! - part property list
//! - version >= 2: part color table
//! - version >= 200: body settings
//!
//! The property lists belong to the game's own serializers and are handed to
//! a [`PropertyListDecoder`].
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use cmkit_preset::load_preset;
//!
//! let mut buffer = Vec::new();
//! if let Some(preset) = load_preset(Path::new("Preset/pre_maid.preset"), &mut buffer) {
//!     println!("{:?} preset, version {}", preset.kind, preset.version);
//! }
//! ```

mod error;
mod preset;
mod properties;

pub use error::{Error, Result};
pub use preset::{
    decode_preset, is_incompatible_version, load_preset, PresetDescriptor, PresetKind,
    BODY_VERSION, COLORS_VERSION, FOREIGN_VERSIONS, FUTURE_VERSIONS, PRESET_SIGNATURE,
};
pub use properties::{OpaquePropertyList, PropertyListDecoder};
