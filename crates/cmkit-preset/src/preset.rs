//! Preset container decoding.

use std::ops::{Range, RangeFrom};
use std::path::Path;

use cmkit_common::{source, BinaryReader};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::properties::{OpaquePropertyList, PropertyListDecoder};
use crate::{Error, Result};

/// Signature of preset containers.
pub const PRESET_SIGNATURE: &str = "CM3D2_PRESET";

/// Versions saved by a different game line, which this format cannot load.
pub const FOREIGN_VERSIONS: Range<i32> = 1560..20000;

/// Versions newer than any supported build.
pub const FUTURE_VERSIONS: RangeFrom<i32> = 30000..;

/// First version with a part color table.
pub const COLORS_VERSION: i32 = 2;

/// First version with body settings.
pub const BODY_VERSION: i32 = 200;

/// What a preset applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PresetKind {
    /// Clothing only.
    Wear,
    /// Body only.
    Body,
    /// Clothing and body.
    All,
    /// A kind this crate does not name.
    Other(i32),
}

impl PresetKind {
    /// Map a raw tag.
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::Wear,
            1 => Self::Body,
            2 => Self::All,
            other => Self::Other(other),
        }
    }

    /// The raw tag.
    pub fn to_i32(self) -> i32 {
        match self {
            Self::Wear => 0,
            Self::Body => 1,
            Self::All => 2,
            Self::Other(value) => value,
        }
    }
}

/// Whether presets of `version` are rejected outright.
pub fn is_incompatible_version(version: i32) -> bool {
    FOREIGN_VERSIONS.contains(&version) || FUTURE_VERSIONS.contains(&version)
}

/// A decoded preset container.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PresetDescriptor<T = Vec<u8>> {
    /// File name the preset was loaded from.
    pub file_name: String,
    /// Container version.
    pub version: i32,
    /// What the preset applies.
    pub kind: PresetKind,
    /// Embedded thumbnail image, if any.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub thumbnail: Option<Vec<u8>>,
    /// Output of the property-list decoder.
    pub properties: T,
    /// Source modification time in Unix milliseconds, 0 when unknown.
    pub last_write_at: i64,
}

impl PresetDescriptor<Vec<u8>> {
    /// Parse a preset, keeping its property lists as raw bytes.
    pub fn parse(data: &[u8], file_name: &str, last_write_at: i64) -> Result<Self> {
        Self::parse_with(data, file_name, last_write_at, &OpaquePropertyList)
    }
}

impl<T> PresetDescriptor<T> {
    /// Parse a preset, handing its property lists to `decoder`.
    pub fn parse_with<D>(
        data: &[u8],
        file_name: &str,
        last_write_at: i64,
        decoder: &D,
    ) -> Result<Self>
    where
        D: PropertyListDecoder<Output = T> + ?Sized,
    {
        let mut reader = BinaryReader::new(data);
        reader.expect_string(PRESET_SIGNATURE)?;
        let version = reader.read_i32()?;
        if is_incompatible_version(version) {
            return Err(Error::IncompatibleVersion(version));
        }

        let kind = PresetKind::from_i32(reader.read_i32()?);
        let thumbnail = match reader.read_length()? {
            0 => None,
            length => Some(reader.read_bytes(length)?.to_vec()),
        };

        let mut properties = decoder.decode_properties(&mut reader)?;
        if version >= COLORS_VERSION {
            decoder.decode_colors(&mut reader, &mut properties)?;
        }
        if version >= BODY_VERSION {
            decoder.decode_body(&mut reader, &mut properties)?;
        }

        Ok(Self {
            file_name: file_name.to_string(),
            version,
            kind,
            thumbnail,
            properties,
            last_write_at,
        })
    }

    /// Whether a thumbnail was embedded.
    pub fn has_thumbnail(&self) -> bool {
        self.thumbnail.is_some()
    }
}

/// Read and decode a preset file from disk, reusing `buffer`.
pub fn decode_preset<D>(
    path: &Path,
    buffer: &mut Vec<u8>,
    decoder: &D,
) -> Result<PresetDescriptor<D::Output>>
where
    D: PropertyListDecoder + ?Sized,
{
    let bytes = source::read_path(path, buffer)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    PresetDescriptor::parse_with(bytes.data, &file_name, bytes.last_write_at, decoder)
}

/// Like [`decode_preset`] with opaque property lists, but logs failures and
/// returns `None`.
pub fn load_preset(path: &Path, buffer: &mut Vec<u8>) -> Option<PresetDescriptor> {
    match decode_preset(path, buffer, &OpaquePropertyList) {
        Ok(preset) => Some(preset),
        Err(e) => {
            log::warn!("could not load preset {} ({:?}): {e}", path.display(), e.kind());
            None
        }
    }
}
