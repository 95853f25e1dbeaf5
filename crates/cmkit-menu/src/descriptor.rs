//! The decoded menu descriptor and its cache-file encoding.

use std::io::{self, Write};

use cmkit_common::{crc, BinaryReader, BinaryWriter};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{PartType, Result};

/// A decoded menu or mod-overlay container.
///
/// Built once per successful decode and never modified afterwards; the
/// descriptor cache hands out shared references.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MenuDescriptor {
    /// Lower-cased file name with its `.menu` or `.mod` extension.
    pub file_name: String,
    /// Container path with known prefixes stripped, using the platform separator.
    pub path: String,
    /// CRC32C of `file_name`.
    pub content_id: i32,
    /// Display name.
    pub name: String,
    /// Description with line-break tokens decoded.
    pub description: Option<String>,
    /// Target slot.
    pub part_type: PartType,
    /// Icon texture name.
    pub icon_name: Option<String>,
    /// Embedded icon payload, empty when absent.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub icon_data: Vec<u8>,
    /// Sort priority.
    pub priority: f32,
    /// Model file added by this menu.
    pub model_file_name: Option<String>,
    /// Slot of the companion palette menu.
    pub color_set_part_type: PartType,
    /// Lower-cased name of the companion palette menu.
    pub color_set_menu_name: Option<String>,
    /// Base menu this one is a variation of.
    pub variation_base_file_name: Option<String>,
    /// Menu a mod overlay is based on.
    pub mod_base_file_name: Option<String>,
    /// Source modification time in Unix milliseconds, 0 when unknown.
    pub last_write_at: i64,
    /// Hidden from editor listings.
    pub is_hidden: bool,
    /// Shipped with the game rather than installed as a mod overlay.
    pub is_official: bool,
    /// Filed under the male menu folder.
    pub is_man: bool,
}

impl MenuDescriptor {
    /// Create an empty descriptor for a normalized file name.
    pub fn new(file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        Self {
            content_id: crc::content_id(&file_name),
            file_name,
            ..Self::default()
        }
    }

    /// Whether an icon payload was embedded.
    pub fn has_icon_data(&self) -> bool {
        !self.icon_data.is_empty()
    }

    /// Write this descriptor in the cache-file encoding.
    pub fn write_to<W: Write>(&self, writer: &mut BinaryWriter<W>) -> io::Result<()> {
        writer.write_nullable_string(Some(&self.file_name))?;
        writer.write_nullable_string(Some(&self.path))?;
        writer.write_i32(self.content_id)?;
        writer.write_nullable_string(Some(&self.name))?;
        writer.write_nullable_string(self.description.as_deref())?;
        writer.write_i32(self.part_type.to_i32())?;
        writer.write_nullable_string(self.icon_name.as_deref())?;
        writer.write_length_prefixed_bytes(&self.icon_data)?;
        writer.write_f32(self.priority)?;
        writer.write_nullable_string(self.model_file_name.as_deref())?;
        writer.write_i32(self.color_set_part_type.to_i32())?;
        writer.write_nullable_string(self.color_set_menu_name.as_deref())?;
        writer.write_nullable_string(self.variation_base_file_name.as_deref())?;
        writer.write_nullable_string(self.mod_base_file_name.as_deref())?;
        writer.write_i64(self.last_write_at)?;
        writer.write_bool(self.is_hidden)?;
        writer.write_bool(self.is_official)?;
        writer.write_bool(self.is_man)
    }

    /// Read a descriptor written by [`write_to`](Self::write_to).
    pub fn read_from(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            file_name: read_owned(reader)?.unwrap_or_default(),
            path: read_owned(reader)?.unwrap_or_default(),
            content_id: reader.read_i32()?,
            name: read_owned(reader)?.unwrap_or_default(),
            description: read_owned(reader)?,
            part_type: PartType::from_i32(reader.read_i32()?),
            icon_name: read_owned(reader)?,
            icon_data: reader.read_length_prefixed_bytes()?.to_vec(),
            priority: reader.read_f32()?,
            model_file_name: read_owned(reader)?,
            color_set_part_type: PartType::from_i32(reader.read_i32()?),
            color_set_menu_name: read_owned(reader)?,
            variation_base_file_name: read_owned(reader)?,
            mod_base_file_name: read_owned(reader)?,
            last_write_at: reader.read_i64()?,
            is_hidden: reader.read_bool()?,
            is_official: reader.read_bool()?,
            is_man: reader.read_bool()?,
        })
    }
}

fn read_owned(reader: &mut BinaryReader<'_>) -> Result<Option<String>> {
    Ok(reader.read_nullable_string()?.map(|s| s.into_owned()))
}
