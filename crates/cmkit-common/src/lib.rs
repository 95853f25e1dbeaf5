//! Common utilities for cmkit.
//!
//! This crate provides foundational types used across all cmkit crates:
//!
//! - [`BinaryReader`] - Bounds-checked cursor over a byte slice, including the
//!   7-bit length-prefixed strings used by every container
//! - [`BinaryWriter`] - The matching writer, used for the descriptor cache file
//! - [`source`] - The virtual file system seam and buffer-reusing reads
//! - [`crc`] - CRC32C hashing and content ids
//! - [`ErrorKind`] - The failure taxonomy shared by all decoders

mod error;
mod reader;
mod writer;

pub mod crc;
pub mod source;

pub use error::{Error, ErrorKind, Result};
pub use reader::BinaryReader;
pub use source::{FileBytes, FileHandle, FileSystem};
pub use writer::BinaryWriter;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Re-export memchr for SIMD-accelerated byte searching
pub use memchr;
