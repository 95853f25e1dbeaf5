//! Menu and mod-overlay container decoding.
//!
//! # Plain menu layout
//!
//! - string: `CM3D2_MENU`
//! - i32: reserved (version)
//! - string: container path
//! - string: default display name
//! - 2 x string, i32: reserved
//! - command stream (see [`crate::command`])
//!
//! # Mod overlay layout
//!
//! - string: `CM3D2_MOD`
//! - i32: reserved (version)
//! - string: icon name, base menu name, display name
//! - string: part type
//! - string: description
//! - string: palette part type, then the palette menu name unless the part
//!   type resolves to `null_mpn`
//! - string: reserved
//! - i32 count, then `count` x (string key, i32 length, bytes)

use std::path::Path;

use cmkit_common::source::{self, FileBytes};
use cmkit_common::{BinaryReader, FileSystem};

use crate::command::{split_line, Command, CommandReader, MAN_FOLDER};
use crate::fixup::fix_menu;
use crate::part_type::{PartType, PartTypeResolver, StandardPartTypes};
use crate::{Error, MenuDescriptor, Result};

/// Signature of plain menu containers.
pub const MENU_SIGNATURE: &str = "CM3D2_MENU";

/// Signature of mod overlay containers.
pub const MOD_SIGNATURE: &str = "CM3D2_MOD";

/// Priority given to every mod overlay.
pub const MOD_PRIORITY: f32 = 1000.0;

/// File name prefix routing a name to the mod overlay decoder.
pub const MOD_PREFIX: &str = "mod_";

/// Extension of plain menu containers.
pub const MENU_EXTENSION: &str = ".menu";

/// Extension of mod overlay containers.
pub const MOD_EXTENSION: &str = ".mod";

/// Which decoder a file name routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Menu,
    Mod,
}

/// Lower-case `name` and make sure it carries its container's extension.
///
/// Names with the `mod_` prefix or the `.mod` extension are mod overlays.
pub fn normalize_file_name(name: &str) -> (String, ContainerKind) {
    let mut file_name = name.to_lowercase();
    let is_mod = file_name.starts_with(MOD_PREFIX) || file_name.ends_with(MOD_EXTENSION);
    let (kind, extension) = if is_mod {
        (ContainerKind::Mod, MOD_EXTENSION)
    } else {
        (ContainerKind::Menu, MENU_EXTENSION)
    };
    if !file_name.ends_with(extension) {
        file_name.push_str(extension);
    }
    (file_name, kind)
}

/// Decode a plain menu container. `file_name` must already be normalized.
pub fn parse_menu(
    data: &[u8],
    file_name: &str,
    resolver: &dyn PartTypeResolver,
) -> Result<MenuDescriptor> {
    let mut menu = MenuDescriptor::new(file_name);
    menu.is_official = true;

    let mut reader = BinaryReader::new(data);
    reader.expect_string(MENU_SIGNATURE)?;
    reader.read_i32()?;
    menu.path = reader.read_string()?.into_owned();
    menu.name = reader.read_string()?.into_owned();
    reader.read_string()?;
    reader.read_string()?;
    reader.read_i32()?;

    let mut commands = CommandReader::new(&mut reader);
    while let Some(line) = commands.next_line()? {
        let tokens = split_line(line);
        match Command::parse(&tokens) {
            Command::End => break,
            command => apply_command(&mut menu, command, resolver)?,
        }
    }

    fix_menu(&mut menu);
    Ok(menu)
}

fn apply_command(
    menu: &mut MenuDescriptor,
    command: Command<'_>,
    resolver: &dyn PartTypeResolver,
) -> Result<()> {
    match command {
        Command::Name(name) => menu.name = name.to_string(),
        Command::Description(text) => menu.description = Some(text.to_string()),
        Command::Category(name) => menu.part_type = resolver.resolve(name),
        Command::Icon(name) => menu.icon_name = Some(name.to_string()),
        Command::Priority(value) => {
            menu.priority = value
                .trim()
                .parse()
                .map_err(|_| Error::InvalidPriority(value.to_string()))?;
        }
        Command::AddItem(model) => menu.model_file_name = Some(model.to_string()),
        Command::ColorSet { part_type, menu: palette } => {
            menu.color_set_part_type = resolver.resolve(part_type);
            menu.color_set_menu_name = Some(palette.to_lowercase());
        }
        Command::MenuFolder(folder) => {
            if folder.eq_ignore_ascii_case(MAN_FOLDER) {
                menu.is_man = true;
            }
        }
        Command::End | Command::Ignored(_) => {}
    }
    Ok(())
}

/// Decode a mod overlay container. `file_name` must already be normalized.
pub fn parse_mod(
    data: &[u8],
    file_name: &str,
    resolver: &dyn PartTypeResolver,
) -> Result<MenuDescriptor> {
    let mut menu = MenuDescriptor::new(file_name);
    menu.priority = MOD_PRIORITY;

    let mut reader = BinaryReader::new(data);
    reader.expect_string(MOD_SIGNATURE)?;
    reader.read_i32()?;
    let icon_name = reader.read_string()?.into_owned();
    menu.mod_base_file_name = Some(reader.read_string()?.into_owned());
    menu.name = reader.read_string()?.into_owned();
    menu.part_type = resolver.resolve(&reader.read_string()?);
    menu.description = Some(reader.read_string()?.into_owned());
    menu.color_set_part_type = resolver.resolve(&reader.read_string()?);
    if menu.color_set_part_type != PartType::NullMpn {
        menu.color_set_menu_name = Some(reader.read_string()?.to_lowercase());
    }
    reader.read_string()?;

    let blob_count = reader.read_i32()?;
    for _ in 0..blob_count {
        let key = reader.read_string()?;
        let data = reader.read_length_prefixed_bytes()?;
        if key.to_lowercase() == icon_name.to_lowercase() {
            menu.icon_data = data.to_vec();
        }
    }
    menu.icon_name = Some(icon_name);

    fix_menu(&mut menu);
    Ok(menu)
}

/// Loads menus by name from a [`FileSystem`].
#[derive(Clone, Copy)]
pub struct MenuDecoder<'a> {
    fs: &'a dyn FileSystem,
    resolver: &'a dyn PartTypeResolver,
}

impl<'a> MenuDecoder<'a> {
    /// Create a decoder using the built-in part-type table.
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self {
            fs,
            resolver: &StandardPartTypes,
        }
    }

    /// Use a host-provided part-type table.
    pub fn with_resolver(mut self, resolver: &'a dyn PartTypeResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// The file system menus are read from.
    pub fn file_system(&self) -> &'a dyn FileSystem {
        self.fs
    }

    /// Decode the menu called `name`.
    ///
    /// Names starting with `mod_` are mod overlays. They are read from
    /// `path_hint` on disk when it is non-empty, otherwise from the file
    /// system like plain menus. `buffer` is reused across calls.
    pub fn decode(
        &self,
        name: &str,
        path_hint: &str,
        buffer: &mut Vec<u8>,
    ) -> Result<MenuDescriptor> {
        let (file_name, kind) = normalize_file_name(name);

        let FileBytes {
            data,
            last_write_at,
        } = if kind == ContainerKind::Mod && !path_hint.is_empty() {
            source::read_path(Path::new(path_hint), buffer)?
        } else {
            source::read_all(self.fs, &file_name, buffer)?
        };

        let mut menu = match kind {
            ContainerKind::Menu => parse_menu(data, &file_name, self.resolver)?,
            ContainerKind::Mod => parse_mod(data, &file_name, self.resolver)?,
        };
        menu.last_write_at = last_write_at;
        Ok(menu)
    }

    /// Like [`decode`](Self::decode), but logs failures and returns `None`.
    pub fn load(&self, name: &str, path_hint: &str, buffer: &mut Vec<u8>) -> Option<MenuDescriptor> {
        match self.decode(name, path_hint, buffer) {
            Ok(menu) => Some(menu),
            Err(e) => {
                log::warn!("could not load menu {name:?} ({:?}): {e}", e.kind());
                None
            }
        }
    }
}

impl std::fmt::Debug for MenuDecoder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuDecoder").finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use cmkit_common::source::MemoryFileSystem;
    use cmkit_common::{crc, BinaryWriter, ErrorKind};

    /// Build a plain menu container.
    pub(crate) fn menu_bytes(path: &str, name: &str, commands: &[&[&str]]) -> Vec<u8> {
        let mut writer = BinaryWriter::new(Vec::new());
        writer.write_string(MENU_SIGNATURE).unwrap();
        writer.write_i32(1000).unwrap();
        writer.write_string(path).unwrap();
        writer.write_string(name).unwrap();
        writer.write_string("").unwrap();
        writer.write_string("").unwrap();
        writer.write_i32(0).unwrap();
        for command in commands {
            writer.write_u8(command.len() as u8).unwrap();
            for part in *command {
                writer.write_string(part).unwrap();
            }
        }
        writer.write_u8(0).unwrap();
        writer.into_inner()
    }

    fn mod_bytes(color_set: &str, blobs: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = BinaryWriter::new(Vec::new());
        writer.write_string(MOD_SIGNATURE).unwrap();
        writer.write_i32(1000).unwrap();
        writer.write_string("Icon.tex").unwrap();
        writer.write_string("dress_base.menu").unwrap();
        writer.write_string("Custom Dress").unwrap();
        writer.write_string("onepiece").unwrap();
        writer.write_string("A dress《改行》from a mod").unwrap();
        writer.write_string(color_set).unwrap();
        if PartType::from_name(color_set) != PartType::NullMpn {
            writer.write_string("Palette.MENU").unwrap();
        }
        writer.write_string("").unwrap();
        writer.write_i32(blobs.len() as i32).unwrap();
        for (key, data) in blobs {
            writer.write_string(key).unwrap();
            writer.write_length_prefixed_bytes(data).unwrap();
        }
        writer.into_inner()
    }

    #[test]
    fn test_parse_menu() {
        let data = menu_bytes(
            "assets/menu/dress/maid/dress001.menu",
            "Default",
            &[
                &["name", "Maid Dress"],
                &["setumei", "Line《改行》Break"],
                &["category", "Wear"],
                &["icons", "dress001_i_.tex"],
                &["priority", "120"],
                &["additem", "dress001.model", "wear"],
                &["color_set", "wear", "Dress_Palette.menu"],
                &["unknown_keyword", "ignored"],
            ],
        );
        let menu = parse_menu(&data, "dress001.menu", &StandardPartTypes).unwrap();

        assert_eq!(menu.file_name, "dress001.menu");
        assert_eq!(menu.content_id, crc::content_id("dress001.menu"));
        assert_eq!(menu.name, "Maid Dress");
        assert_eq!(menu.description.as_deref(), Some("Line\nBreak"));
        assert_eq!(menu.part_type, PartType::Wear);
        assert_eq!(menu.icon_name.as_deref(), Some("dress001_i_.tex"));
        assert_eq!(menu.priority, 120.0);
        assert_eq!(menu.model_file_name.as_deref(), Some("dress001.model"));
        assert_eq!(menu.color_set_part_type, PartType::Wear);
        assert_eq!(menu.color_set_menu_name.as_deref(), Some("dress_palette.menu"));
        assert!(menu.is_official);
        assert!(!menu.is_hidden);
        assert!(!menu.is_man);
    }

    #[test]
    fn test_later_commands_overwrite() {
        let data = menu_bytes(
            "",
            "",
            &[&["name", "First"], &["category", "wear"], &["name", "Second"]],
        );
        let menu = parse_menu(&data, "a.menu", &StandardPartTypes).unwrap();
        assert_eq!(menu.name, "Second");
    }

    #[test]
    fn test_end_keyword_stops_stream() {
        let data = menu_bytes(
            "",
            "Kept",
            &[&["end"], &["name", "Never Read"]],
        );
        let menu = parse_menu(&data, "a.menu", &StandardPartTypes).unwrap();
        assert_eq!(menu.name, "Kept");
    }

    #[test]
    fn test_man_folder() {
        let data = menu_bytes("", "", &[&["メニューフォルダ", "MAN"]]);
        let menu = parse_menu(&data, "a.menu", &StandardPartTypes).unwrap();
        assert!(menu.is_man);
    }

    #[test]
    fn test_non_editable_category_is_hidden() {
        let data = menu_bytes("", "Normal Name", &[&["category", "handitem"]]);
        let menu = parse_menu(&data, "normal.menu", &StandardPartTypes).unwrap();
        assert!(menu.is_hidden);
    }

    #[test]
    fn test_bad_priority_fails() {
        let data = menu_bytes("", "", &[&["priority", "high"]]);
        let err = parse_menu(&data, "a.menu", &StandardPartTypes).unwrap_err();
        assert!(matches!(err, Error::InvalidPriority(_)));
    }

    #[test]
    fn test_wrong_signature() {
        let mut writer = BinaryWriter::new(Vec::new());
        writer.write_string("CM3D2_MODEL").unwrap();
        let data = writer.into_inner();

        let err = parse_menu(&data, "a.menu", &StandardPartTypes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedHeader);
    }

    #[test]
    fn test_short_buffers_never_panic() {
        let data = menu_bytes("", "Name", &[&["category", "wear"]]);
        for len in 0..data.len() {
            assert!(parse_menu(&data[..len], "a.menu", &StandardPartTypes).is_err());
        }
    }

    #[test]
    fn test_parse_mod() {
        let data = mod_bytes(
            "skirt",
            &[
                ("other.tex", &[9, 9, 9]),
                ("icon.TEX", &[1, 2, 3, 4]),
                ("model.model", &[7]),
            ],
        );
        let menu = parse_mod(&data, "mod_dress.mod", &StandardPartTypes).unwrap();

        assert_eq!(menu.priority, 1000.0);
        assert_eq!(menu.icon_data, vec![1, 2, 3, 4]);
        assert_eq!(menu.icon_name.as_deref(), Some("Icon.tex"));
        assert_eq!(menu.mod_base_file_name.as_deref(), Some("dress_base.menu"));
        assert_eq!(menu.name, "Custom Dress");
        assert_eq!(menu.part_type, PartType::Onepiece);
        assert_eq!(menu.description.as_deref(), Some("A dress\nfrom a mod"));
        assert_eq!(menu.color_set_part_type, PartType::Skirt);
        assert_eq!(menu.color_set_menu_name.as_deref(), Some("palette.menu"));
        assert!(!menu.is_official);
    }

    #[test]
    fn test_parse_mod_without_color_set() {
        let data = mod_bytes("null_mpn", &[("unrelated.tex", &[1])]);
        let menu = parse_mod(&data, "mod_plain.mod", &StandardPartTypes).unwrap();

        assert_eq!(menu.color_set_part_type, PartType::NullMpn);
        assert_eq!(menu.color_set_menu_name, None);
        assert!(menu.icon_data.is_empty());
    }

    #[test]
    fn test_decoder_normalizes_names() {
        let mut fs = MemoryFileSystem::new();
        fs.insert("dress001.menu", menu_bytes("", "", &[&["category", "wear"]]));
        let decoder = MenuDecoder::new(&fs);
        let mut buffer = Vec::new();

        let menu = decoder.decode("Dress001", "", &mut buffer).unwrap();
        assert_eq!(menu.file_name, "dress001.menu");
        assert_eq!(menu.name, "dress001");
        assert_eq!(menu.content_id, crc::content_id("dress001.menu"));
    }

    #[test]
    fn test_decoder_routes_mods() {
        let mut fs = MemoryFileSystem::new();
        fs.insert("mod_dress.mod", mod_bytes("null_mpn", &[]));
        let decoder = MenuDecoder::new(&fs);
        let mut buffer = Vec::new();

        let menu = decoder.decode("MOD_Dress", "", &mut buffer).unwrap();
        assert_eq!(menu.file_name, "mod_dress.mod");
        assert_eq!(menu.priority, MOD_PRIORITY);
    }

    #[test]
    fn test_decoder_routes_mod_extension() {
        assert_eq!(
            normalize_file_name("Red_Dress.MOD"),
            ("red_dress.mod".to_string(), ContainerKind::Mod)
        );

        let mut fs = MemoryFileSystem::new();
        fs.insert("red_dress.mod", mod_bytes("null_mpn", &[("icon.tex", &[5])]));
        let decoder = MenuDecoder::new(&fs);

        let menu = decoder.decode("red_dress.mod", "", &mut Vec::new()).unwrap();
        assert_eq!(menu.file_name, "red_dress.mod");
        assert_eq!(menu.priority, MOD_PRIORITY);
        assert_eq!(menu.icon_data, vec![5]);
        assert!(!menu.is_official);
    }

    #[test]
    fn test_short_mod_buffers_are_truncated() {
        let data = mod_bytes("skirt", &[("icon.tex", &[1, 2, 3, 4])]);
        for len in 0..data.len() {
            let err = parse_mod(&data[..len], "mod_a.mod", &StandardPartTypes).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::TruncatedData, "length {len}");
        }
    }

    #[test]
    fn test_mod_blob_length_past_end() {
        let mut data = mod_bytes("null_mpn", &[]);
        let count_at = data.len() - 4;
        data[count_at..].copy_from_slice(&1i32.to_le_bytes());
        let mut writer = BinaryWriter::new(data);
        writer.write_string("icon.tex").unwrap();
        writer.write_i32(64).unwrap();
        writer.write_bytes(&[0; 8]).unwrap();

        let err = parse_mod(&writer.into_inner(), "mod_a.mod", &StandardPartTypes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedData);
    }

    #[test]
    fn test_load_missing_returns_none() {
        let fs = MemoryFileSystem::new();
        let decoder = MenuDecoder::new(&fs);
        let mut buffer = Vec::new();

        assert!(decoder.load("missing", "", &mut buffer).is_none());
        let err = decoder.decode("missing", "", &mut buffer).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceUnavailable);
    }

    #[test]
    fn test_decoding_is_idempotent() {
        let mut fs = MemoryFileSystem::new();
        fs.insert(
            "acc_z1.menu",
            menu_bytes("menu/acc/acc_z1.menu", "Acc", &[&["category", "acckami"]]),
        );
        let decoder = MenuDecoder::new(&fs);
        let mut buffer = Vec::new();

        let first = decoder.decode("acc_z1.menu", "", &mut buffer).unwrap();
        let second = decoder.decode("acc_z1.menu", "", &mut buffer).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.variation_base_file_name.as_deref(), Some("acc.menu"));
        assert!(first.is_hidden);
    }
}
