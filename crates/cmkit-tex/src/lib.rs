//! Texture container decoding for CM3D2-format content.
//!
//! # File Format
//!
//! - string: `CM3D2_TEX`
//! - i32: version
//! - string: reserved (original asset path)
//! - version >= 1011: i32 count, then `count` x 4 f32 atlas rectangles
//! - version >= 1010: i32 width, i32 height, i32 format
//! - i32 payload length, then the payload
//!
//! Version 1000 containers store no dimensions in the header; they are read
//! from the PNG header inside the payload instead.
//!
//! # Example
//!
//! ```no_run
//! use cmkit_common::source::DirectoryFileSystem;
//! use cmkit_tex::load_texture;
//!
//! let fs = DirectoryFileSystem::open("GameData")?;
//! let mut buffer = Vec::new();
//! if let Some(texture) = load_texture(&fs, "dress001_i_.tex", &mut buffer) {
//!     println!("{}x{} {:?}", texture.width, texture.height, texture.format);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod format;
mod texture;

pub use error::{Error, Result};
pub use format::TextureFormat;
pub use texture::{
    decode_texture, load_texture, AtlasRect, TextureDescriptor, ATLAS_VERSION,
    HEADER_FIELDS_VERSION, LEGACY_VERSION, TEX_SIGNATURE,
};
