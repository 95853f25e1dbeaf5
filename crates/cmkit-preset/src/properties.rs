//! The seam for decoding a preset's property lists.
//!
//! The property lists after a preset's header are owned by the game's own
//! serializers. Hosts that understand them implement [`PropertyListDecoder`];
//! [`OpaquePropertyList`] keeps the bytes untouched.

use cmkit_common::BinaryReader;

use crate::Result;

/// Decodes the payload that follows a preset header.
pub trait PropertyListDecoder {
    /// The decoded property list.
    type Output;

    /// Decode the part property list, present in every version.
    fn decode_properties(&self, reader: &mut BinaryReader<'_>) -> Result<Self::Output>;

    /// Decode the part color table, present from version 2.
    fn decode_colors(&self, reader: &mut BinaryReader<'_>, output: &mut Self::Output) -> Result<()>;

    /// Decode the body settings, present from version 200.
    fn decode_body(&self, reader: &mut BinaryReader<'_>, output: &mut Self::Output) -> Result<()>;
}

/// Keeps everything after the header as raw bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpaquePropertyList;

impl PropertyListDecoder for OpaquePropertyList {
    type Output = Vec<u8>;

    fn decode_properties(&self, reader: &mut BinaryReader<'_>) -> Result<Vec<u8>> {
        Ok(reader.read_bytes(reader.remaining())?.to_vec())
    }

    fn decode_colors(&self, _reader: &mut BinaryReader<'_>, _output: &mut Vec<u8>) -> Result<()> {
        Ok(())
    }

    fn decode_body(&self, _reader: &mut BinaryReader<'_>, _output: &mut Vec<u8>) -> Result<()> {
        Ok(())
    }
}
