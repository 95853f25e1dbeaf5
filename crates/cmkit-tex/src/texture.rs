//! Texture container decoding.

use cmkit_common::{source, BinaryReader, FileSystem};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{Error, Result, TextureFormat};

/// Signature of texture containers.
pub const TEX_SIGNATURE: &str = "CM3D2_TEX";

/// The only version whose dimensions live inside the payload.
pub const LEGACY_VERSION: i32 = 1000;

/// First version with width, height and format in the header.
pub const HEADER_FIELDS_VERSION: i32 = 1010;

/// First version with an atlas rectangle table.
pub const ATLAS_VERSION: i32 = 1011;

/// Payload offset of the big-endian width in legacy containers (PNG IHDR).
const LEGACY_WIDTH_OFFSET: usize = 16;

/// Payload offset of the big-endian height in legacy containers.
const LEGACY_HEIGHT_OFFSET: usize = 20;

/// A sub-image rectangle in normalized texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(C)]
pub struct AtlasRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A decoded texture container.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TextureDescriptor {
    /// Container version.
    pub version: i32,
    /// Width in pixels, 0 when the container does not record it.
    pub width: i32,
    /// Height in pixels, 0 when the container does not record it.
    pub height: i32,
    /// Pixel format of the payload.
    pub format: TextureFormat,
    /// Sub-image rectangles, empty before [`ATLAS_VERSION`].
    pub atlas_rects: Vec<AtlasRect>,
    /// Pixel payload, interpreted according to `format`.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub data: Vec<u8>,
}

impl TextureDescriptor {
    /// Parse a texture container.
    ///
    /// Versions below [`HEADER_FIELDS_VERSION`] carry no dimensions in the
    /// header. Exactly [`LEGACY_VERSION`] recovers them from the payload;
    /// other old versions report 0 x 0.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        reader.expect_string(TEX_SIGNATURE)?;
        let version = reader.read_i32()?;
        reader.read_string()?;

        let mut width = 0;
        let mut height = 0;
        let mut format = TextureFormat::default();
        let mut atlas_rects = Vec::new();

        if version >= HEADER_FIELDS_VERSION {
            if version >= ATLAS_VERSION {
                let count = reader.read_i32()?;
                if count > 0 {
                    let count = count as usize;
                    atlas_rects.reserve(count.min(reader.remaining() / 16));
                    for _ in 0..count {
                        atlas_rects.push(reader.read_struct::<AtlasRect>()?);
                    }
                }
            }

            width = reader.read_i32()?;
            height = reader.read_i32()?;
            format = TextureFormat::from_i32(reader.read_i32()?);
        }

        let payload = reader.read_length_prefixed_bytes()?;

        if version == LEGACY_VERSION {
            width = read_be_i32(payload, LEGACY_WIDTH_OFFSET)?;
            height = read_be_i32(payload, LEGACY_HEIGHT_OFFSET)?;
        }

        Ok(Self {
            version,
            width,
            height,
            format,
            atlas_rects,
            data: payload.to_vec(),
        })
    }

    /// Whether the container carries atlas rectangles.
    pub fn is_atlas(&self) -> bool {
        !self.atlas_rects.is_empty()
    }
}

fn read_be_i32(payload: &[u8], offset: usize) -> Result<i32> {
    payload
        .get(offset..offset + 4)
        .map(|b| i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or(Error::LegacyPayloadTooShort(payload.len()))
}

/// Read and decode the texture called `name`, reusing `buffer`.
pub fn decode_texture<F>(fs: &F, name: &str, buffer: &mut Vec<u8>) -> Result<TextureDescriptor>
where
    F: FileSystem + ?Sized,
{
    let bytes = source::read_all(fs, name, buffer)?;
    TextureDescriptor::parse(bytes.data)
}

/// Like [`decode_texture`], but logs failures and returns `None`.
pub fn load_texture<F>(fs: &F, name: &str, buffer: &mut Vec<u8>) -> Option<TextureDescriptor>
where
    F: FileSystem + ?Sized,
{
    match decode_texture(fs, name, buffer) {
        Ok(texture) => Some(texture),
        Err(e) => {
            log::warn!("could not load texture {name:?} ({:?}): {e}", e.kind());
            None
        }
    }
}
