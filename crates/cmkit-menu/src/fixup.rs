//! Normalization applied to every decoded menu.

use std::path::{MAIN_SEPARATOR, MAIN_SEPARATOR_STR};
use std::sync::OnceLock;

use regex::Regex;

use crate::MenuDescriptor;

/// Escape token for a line break inside descriptions.
pub const LINE_BREAK_TOKEN: &str = "《改行》";

/// Directory used when a container path has no directory part.
pub const DEFAULT_MENU_DIR: &str = "menu";

/// Path fragments removed from container paths.
const PATH_PREFIXES: [&str; 4] = ["assets/", "menu/", "parts/", "dress/"];

/// File name fragments marking alternate or adjusted poses.
const HIDDEN_MARKERS: [&str; 4] = ["_zurashi", "_mekure", "_porori", "_back"];

fn variation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"_z\d{1,4}").expect("valid variation pattern"))
}

/// Apply all post-decode fix-ups to `menu`.
pub(crate) fn fix_menu(menu: &mut MenuDescriptor) {
    if menu.name.is_empty() {
        menu.name = file_stem(&menu.file_name).to_string();
    }

    menu.path = fix_menu_path(&menu.path, &menu.file_name);

    if let Some(description) = &mut menu.description {
        if description.contains(LINE_BREAK_TOKEN) {
            *description = description.replace(LINE_BREAK_TOKEN, "\n");
        }
    }

    menu.variation_base_file_name = variation_base_name(&menu.file_name);

    menu.is_hidden = !menu.part_type.is_editable()
        || menu
            .variation_base_file_name
            .as_deref()
            .is_some_and(|base| !base.is_empty())
        || HIDDEN_MARKERS
            .iter()
            .any(|marker| menu.file_name.contains(marker));
}

/// File name without its last extension.
fn file_stem(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map_or(file_name, |(stem, _)| stem)
}

/// Normalize a container path and re-root it on `file_name`.
///
/// Known prefixes are stripped and `/` becomes the platform separator. The
/// directory part is kept and joined with `file_name`; a path with no
/// directory falls back to [`DEFAULT_MENU_DIR`].
pub fn fix_menu_path(path: &str, file_name: &str) -> String {
    let mut fixed = String::new();
    if !path.is_empty() {
        let mut stripped = path.to_string();
        for prefix in PATH_PREFIXES {
            stripped = stripped.replace(prefix, "");
        }
        let stripped = stripped.replace('/', MAIN_SEPARATOR_STR);

        fixed = match stripped.rsplit_once(MAIN_SEPARATOR) {
            Some((dir, _)) => format!("{dir}{MAIN_SEPARATOR}{file_name}"),
            None => file_name.to_string(),
        };
    }

    if !fixed.contains(MAIN_SEPARATOR) {
        fixed = format!("{DEFAULT_MENU_DIR}{MAIN_SEPARATOR}{file_name}");
    }
    fixed
}

/// Name of the menu `file_name` is a variation of, if it has a `_z<digits>`
/// suffix.
///
/// Every suffix match is removed, then `_i.` is rewritten to `_i_.`.
pub fn variation_base_name(file_name: &str) -> Option<String> {
    let pattern = variation_pattern();
    if !pattern.is_match(file_name) {
        return None;
    }
    Some(pattern.replace_all(file_name, "").replace("_i.", "_i_."))
}
