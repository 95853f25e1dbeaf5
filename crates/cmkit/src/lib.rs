//! cmkit - CM3D2 content container decoding.
//!
//! This crate provides a unified interface to the cmkit library ecosystem
//! for reading the game's item descriptors and their companion files.
//!
//! # Crates
//!
//! - [`cmkit_common`] - Binary reading and writing, file sources, CRC32C
//! - [`cmkit_menu`] - Menu and mod overlay decoding plus the descriptor cache
//! - [`cmkit_tex`] - Texture container headers
//! - [`cmkit_preset`] - Preset container headers
//!
//! # Example
//!
//! ```no_run
//! use cmkit::prelude::*;
//!
//! let fs = DirectoryFileSystem::open("GameData")?;
//! let decoder = MenuDecoder::new(&fs);
//! let mut cache = DescriptorCache::new();
//!
//! for name in ["dress001", "mod_dress001_red"] {
//!     if let Some(menu) = cache.get(name, &decoder) {
//!         println!("{}: {} in {}", menu.file_name, menu.name, menu.part_type);
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use cmkit_common as common;
pub use cmkit_menu as menu;
pub use cmkit_preset as preset;
pub use cmkit_tex as tex;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use cmkit_common::source::{DirectoryFileSystem, MemoryFileSystem};
    pub use cmkit_common::{crc, BinaryReader, ErrorKind, FileSystem};
    pub use cmkit_menu::{DescriptorCache, MenuDecoder, MenuDescriptor, PartType};
    #[cfg(feature = "parallel")]
    pub use cmkit_menu::{decode_parallel, SharedDescriptorCache};
    pub use cmkit_preset::{load_preset, PresetDescriptor, PresetKind};
    pub use cmkit_tex::{load_texture, TextureDescriptor, TextureFormat};
}

// Re-export commonly used types at the crate root
pub use cmkit_menu::{DescriptorCache, MenuDescriptor};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
