//! Binary reader for parsing container byte slices.
//!
//! This module provides [`BinaryReader`], a forward-only cursor that reads
//! little-endian primitives and .NET-style length-prefixed strings.

use std::borrow::Cow;

use zerocopy::FromBytes;

use crate::{Error, Result};

/// A forward-only binary reader over a byte slice.
///
/// Every read either consumes exactly the bytes it needs or fails with
/// [`Error::UnexpectedEof`]. Fixed-width reads do not move on failure;
/// string reads may already have consumed their length prefix or presence
/// flag. There is no way to seek backwards, so every decoder built on this
/// type is single-pass.
///
/// Strings are stored the way .NET's `BinaryWriter` writes them: a 7-bit
/// encoded byte length followed by UTF-8 bytes.
///
/// # Example
///
/// ```
/// use cmkit_common::BinaryReader;
///
/// let data = [0x05, b'h', b'e', b'l', b'l', b'o', 0x2A, 0x00, 0x00, 0x00];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_string().unwrap(), "hello");
/// assert_eq!(reader.read_i32().unwrap(), 42);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    /// Create a new reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the total length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Get the remaining bytes as a slice without consuming them.
    #[inline]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.position.min(self.data.len())..]
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::UnexpectedEof {
                needed: count,
                available: self.remaining(),
            });
        }
        let bytes = &self.data[self.position..self.position + count];
        self.position += count;
        Ok(bytes)
    }

    /// Read a fixed number of bytes into an array.
    #[inline]
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    /// Read a signed byte.
    #[inline]
    pub fn read_i8(&mut self) -> Result<i8> {
        self.read_u8().map(|b| b as i8)
    }

    /// Read a boolean (non-zero = true).
    #[inline]
    pub fn read_bool(&mut self) -> Result<bool> {
        self.read_u8().map(|b| b != 0)
    }

    /// Read a little-endian u16.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    /// Read a little-endian i16.
    #[inline]
    pub fn read_i16(&mut self) -> Result<i16> {
        self.read_array().map(i16::from_le_bytes)
    }

    /// Read a little-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    /// Read a little-endian i32.
    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_array().map(i32::from_le_bytes)
    }

    /// Read a little-endian u64.
    #[inline]
    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    /// Read a little-endian i64.
    #[inline]
    pub fn read_i64(&mut self) -> Result<i64> {
        self.read_array().map(i64::from_le_bytes)
    }

    /// Read a little-endian f32.
    #[inline]
    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_array().map(f32::from_le_bytes)
    }

    /// Read a little-endian f64.
    #[inline]
    pub fn read_f64(&mut self) -> Result<f64> {
        self.read_array().map(f64::from_le_bytes)
    }

    /// Read an i32 length field, rejecting negative values.
    pub fn read_length(&mut self) -> Result<usize> {
        let length = self.read_i32()?;
        usize::try_from(length).map_err(|_| Error::NegativeLength(length))
    }

    /// Read an integer stored 7 bits at a time, low groups first.
    ///
    /// At most five bytes are consumed; the fifth may only carry four bits.
    pub fn read_7bit_encoded_int(&mut self) -> Result<i32> {
        let mut value: u32 = 0;
        for shift in (0..35).step_by(7) {
            let byte = self.read_u8()?;
            if shift == 28 && byte > 0x0F {
                return Err(Error::Invalid7BitInt);
            }
            value |= u32::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value as i32);
            }
        }
        Err(Error::Invalid7BitInt)
    }

    /// Read a length-prefixed UTF-8 string.
    ///
    /// Invalid UTF-8 sequences are replaced with U+FFFD, which matches how
    /// the tooling that produces these files decodes them.
    pub fn read_string(&mut self) -> Result<Cow<'a, str>> {
        let length = self.read_7bit_encoded_int()?;
        let length = usize::try_from(length).map_err(|_| Error::NegativeLength(length))?;
        let bytes = self.read_bytes(length)?;
        Ok(String::from_utf8_lossy(bytes))
    }

    /// Read a string preceded by a one-byte presence flag.
    pub fn read_nullable_string(&mut self) -> Result<Option<Cow<'a, str>>> {
        if !self.read_bool()? {
            return Ok(None);
        }
        self.read_string().map(Some)
    }

    /// Read an i32 byte count followed by that many bytes.
    pub fn read_length_prefixed_bytes(&mut self) -> Result<&'a [u8]> {
        let length = self.read_length()?;
        self.read_bytes(length)
    }

    /// Read a struct using zerocopy.
    ///
    /// The struct must implement `FromBytes` from the zerocopy crate.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            needed: size,
            available: bytes.len(),
        })
    }

    /// Expect a specific length-prefixed signature string.
    pub fn expect_string(&mut self, expected: &str) -> Result<()> {
        let actual = self.read_string()?;
        if actual != expected {
            return Err(Error::InvalidMagic {
                expected: expected.to_string(),
                actual: actual.into_owned(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_primitives() {
        let data = [
            0x01u8, 0x02, 0x03, 0x04, // u32: 0x04030201
            0xFF, 0xFF, 0xFF, 0xFF, // i32: -1
            0x00, 0x00, 0x80, 0x3F, // f32: 1.0
        ];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_u32().unwrap(), 0x04030201);
        assert_eq!(reader.read_i32().unwrap(), -1);
        assert_eq!(reader.read_f32().unwrap(), 1.0);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_7bit_encoded_int() {
        let data = [0x7F, 0x80, 0x01, 0xAC, 0x02];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_7bit_encoded_int().unwrap(), 127);
        assert_eq!(reader.read_7bit_encoded_int().unwrap(), 128);
        assert_eq!(reader.read_7bit_encoded_int().unwrap(), 300);
    }

    #[test]
    fn test_7bit_encoded_int_too_long() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0x7F];
        let mut reader = BinaryReader::new(&data);

        assert!(matches!(
            reader.read_7bit_encoded_int(),
            Err(Error::Invalid7BitInt)
        ));
    }

    #[test]
    fn test_read_string() {
        let mut data = vec![0x03];
        data.extend_from_slice("abc".as_bytes());
        data.push(0x06);
        data.extend_from_slice("改行".as_bytes());
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_string().unwrap(), "abc");
        assert_eq!(reader.read_string().unwrap(), "改行");
        assert!(reader.is_empty());
    }

    #[test]
    fn test_nullable_string() {
        let data = [0x00, 0x01, 0x02, b'o', b'k'];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_nullable_string().unwrap(), None);
        assert_eq!(reader.read_nullable_string().unwrap().as_deref(), Some("ok"));
    }

    #[test]
    fn test_eof_does_not_advance() {
        let data = [0x01, 0x02];
        let mut reader = BinaryReader::new(&data);

        assert!(matches!(
            reader.read_u32(),
            Err(Error::UnexpectedEof {
                needed: 4,
                available: 2
            })
        ));
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.read_u16().unwrap(), 0x0201);
    }

    #[test]
    fn test_string_length_past_end() {
        let data = [0x10, b'a', b'b'];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(
            reader.read_string().unwrap_err().kind(),
            crate::ErrorKind::TruncatedData
        );
    }

    #[test]
    fn test_failed_string_keeps_prefix_consumed() {
        let data = [0x10, b'a', b'b'];
        let mut reader = BinaryReader::new(&data);
        assert!(reader.read_string().is_err());
        assert_eq!(reader.position(), 1);

        let data = [0x01, 0x05, b'a'];
        let mut reader = BinaryReader::new(&data);
        assert!(reader.read_nullable_string().is_err());
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn test_expect_string() {
        let data = [0x04, b'M', b'E', b'N', b'U'];

        assert!(BinaryReader::new(&data).expect_string("MENU").is_ok());
        assert!(matches!(
            BinaryReader::new(&data).expect_string("MODS"),
            Err(Error::InvalidMagic { .. })
        ));
    }

    #[test]
    fn test_negative_length() {
        let data = (-5i32).to_le_bytes();
        let mut reader = BinaryReader::new(&data);

        assert!(matches!(
            reader.read_length_prefixed_bytes(),
            Err(Error::NegativeLength(-5))
        ));
    }
}
