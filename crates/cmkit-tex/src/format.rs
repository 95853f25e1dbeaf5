//! Pixel formats stored in texture containers.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pixel format tag, using the engine's texture format numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TextureFormat {
    Alpha8,
    Argb4444,
    Rgb24,
    Rgba32,
    #[default]
    Argb32,
    Rgb565,
    Dxt1,
    Dxt5,
    Rgba4444,
    Bgra32,
    /// A tag this crate does not name.
    Other(i32),
}

impl TextureFormat {
    /// Map a raw tag.
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => Self::Alpha8,
            2 => Self::Argb4444,
            3 => Self::Rgb24,
            4 => Self::Rgba32,
            5 => Self::Argb32,
            7 => Self::Rgb565,
            10 => Self::Dxt1,
            12 => Self::Dxt5,
            13 => Self::Rgba4444,
            14 => Self::Bgra32,
            other => Self::Other(other),
        }
    }

    /// The raw tag.
    pub fn to_i32(self) -> i32 {
        match self {
            Self::Alpha8 => 1,
            Self::Argb4444 => 2,
            Self::Rgb24 => 3,
            Self::Rgba32 => 4,
            Self::Argb32 => 5,
            Self::Rgb565 => 7,
            Self::Dxt1 => 10,
            Self::Dxt5 => 12,
            Self::Rgba4444 => 13,
            Self::Bgra32 => 14,
            Self::Other(value) => value,
        }
    }

    /// Whether the payload is block-compressed pixel data rather than an
    /// encoded image file.
    pub fn is_compressed(self) -> bool {
        matches!(self, Self::Dxt1 | Self::Dxt5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip() {
        for tag in 0..20 {
            assert_eq!(TextureFormat::from_i32(tag).to_i32(), tag);
        }
        assert_eq!(TextureFormat::from_i32(12), TextureFormat::Dxt5);
        assert_eq!(TextureFormat::default(), TextureFormat::Argb32);
    }
}
