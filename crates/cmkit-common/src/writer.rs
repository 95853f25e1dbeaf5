//! Binary writer producing the encodings [`BinaryReader`](crate::BinaryReader) reads.

use std::io::{self, Write};

use byteorder::{LittleEndian, WriteBytesExt};

/// A little-endian binary writer over any [`Write`] sink.
///
/// # Example
///
/// ```
/// use cmkit_common::{BinaryReader, BinaryWriter};
///
/// let mut writer = BinaryWriter::new(Vec::new());
/// writer.write_string("CM3D2_MENU").unwrap();
/// writer.write_i32(1000).unwrap();
/// let bytes = writer.into_inner();
///
/// let mut reader = BinaryReader::new(&bytes);
/// assert_eq!(reader.read_string().unwrap(), "CM3D2_MENU");
/// assert_eq!(reader.read_i32().unwrap(), 1000);
/// ```
#[derive(Debug)]
pub struct BinaryWriter<W> {
    inner: W,
}

impl<W: Write> BinaryWriter<W> {
    /// Wrap a sink.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Unwrap the sink.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Get a reference to the sink.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Write a single byte.
    pub fn write_u8(&mut self, value: u8) -> io::Result<()> {
        self.inner.write_u8(value)
    }

    /// Write a boolean as one byte.
    pub fn write_bool(&mut self, value: bool) -> io::Result<()> {
        self.inner.write_u8(u8::from(value))
    }

    /// Write a little-endian i32.
    pub fn write_i32(&mut self, value: i32) -> io::Result<()> {
        self.inner.write_i32::<LittleEndian>(value)
    }

    /// Write a little-endian u32.
    pub fn write_u32(&mut self, value: u32) -> io::Result<()> {
        self.inner.write_u32::<LittleEndian>(value)
    }

    /// Write a little-endian i64.
    pub fn write_i64(&mut self, value: i64) -> io::Result<()> {
        self.inner.write_i64::<LittleEndian>(value)
    }

    /// Write a little-endian f32.
    pub fn write_f32(&mut self, value: f32) -> io::Result<()> {
        self.inner.write_f32::<LittleEndian>(value)
    }

    /// Write raw bytes without a length prefix.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.write_all(bytes)
    }

    /// Write an i32 byte count followed by the bytes.
    pub fn write_length_prefixed_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_i32(length_to_i32(bytes.len())?)?;
        self.write_bytes(bytes)
    }

    /// Write an integer 7 bits at a time, low groups first.
    pub fn write_7bit_encoded_int(&mut self, value: i32) -> io::Result<()> {
        let mut value = value as u32;
        while value >= 0x80 {
            self.inner.write_u8((value as u8) | 0x80)?;
            value >>= 7;
        }
        self.inner.write_u8(value as u8)
    }

    /// Write a length-prefixed UTF-8 string.
    pub fn write_string(&mut self, value: &str) -> io::Result<()> {
        self.write_7bit_encoded_int(length_to_i32(value.len())?)?;
        self.write_bytes(value.as_bytes())
    }

    /// Write a presence flag followed by the string when present.
    pub fn write_nullable_string(&mut self, value: Option<&str>) -> io::Result<()> {
        self.write_bool(value.is_some())?;
        match value {
            Some(value) => self.write_string(value),
            None => Ok(()),
        }
    }
}

fn length_to_i32(length: usize) -> io::Result<i32> {
    i32::try_from(length).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("length {length} does not fit in an i32"),
        )
    })
}
