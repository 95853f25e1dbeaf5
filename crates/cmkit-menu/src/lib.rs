//! Menu container decoding for CM3D2-format content.
//!
//! A menu container describes one equipment or accessory item: its display
//! name, target slot, icon, sort priority, model and palette. Two container
//! kinds decode into the same [`MenuDescriptor`]:
//!
//! - Plain menus (`CM3D2_MENU`), shipped with the game. After a short header
//!   they carry a [command stream](command) that sets most fields.
//! - Mod overlays (`CM3D2_MOD`), community-made variants with a fixed header
//!   and a table of embedded blobs, one of which may be the icon.
//!
//! Every decoded menu goes through the same normalization (path fix-up,
//! variation detection, hidden-flag rules) and is memoized by
//! [`DescriptorCache`].
//!
//! # Example
//!
//! ```no_run
//! use cmkit_common::source::DirectoryFileSystem;
//! use cmkit_menu::{DescriptorCache, MenuDecoder};
//!
//! let fs = DirectoryFileSystem::open("GameData")?;
//! let decoder = MenuDecoder::new(&fs);
//! let mut cache = DescriptorCache::new();
//!
//! if let Some(menu) = cache.get("dress001", &decoder) {
//!     println!("{} ({}) hidden: {}", menu.name, menu.part_type, menu.is_hidden);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod cache;
mod decoder;
mod descriptor;
mod error;
mod fixup;
mod part_type;

pub mod command;

#[cfg(feature = "parallel")]
pub mod parallel;

pub use cache::{DescriptorCache, CACHE_VERSION};
pub use decoder::{
    normalize_file_name, parse_menu, parse_mod, ContainerKind, MenuDecoder, MENU_EXTENSION,
    MENU_SIGNATURE, MOD_EXTENSION, MOD_PREFIX, MOD_PRIORITY, MOD_SIGNATURE,
};
pub use descriptor::MenuDescriptor;
pub use error::{Error, Result};
pub use fixup::{fix_menu_path, variation_base_name, DEFAULT_MENU_DIR, LINE_BREAK_TOKEN};
pub use part_type::{PartCategory, PartType, PartTypeResolver, StandardPartTypes};

#[cfg(feature = "parallel")]
pub use parallel::{decode_parallel, decode_parallel_with_progress, SharedDescriptorCache};
