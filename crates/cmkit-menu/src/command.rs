//! The command stream embedded in menu containers.
//!
//! After its header, a menu container holds a sequence of commands. Each one
//! is a byte count `n` followed by `n` length-prefixed strings. The strings
//! are joined into one line with every string wrapped in `"`, and the line
//! is split back into a keyword and its arguments. A count of zero or the
//! keyword `end` terminates the stream.
//!
//! There is no recovery: a string length that overruns the buffer fails the
//! whole decode.

use cmkit_common::memchr::memchr_iter;
use cmkit_common::BinaryReader;

use crate::Result;

/// Keyword that ends the command stream.
pub const END_KEYWORD: &str = "end";

/// Keyword whose argument names the menu folder a menu is filed under.
pub const MENU_FOLDER_KEYWORD: &str = "メニューフォルダ";

/// Menu folder value marking a male menu, compared case-insensitively.
pub const MAN_FOLDER: &str = "man";

/// Reads raw command lines from a menu container.
pub struct CommandReader<'r, 'a> {
    reader: &'r mut BinaryReader<'a>,
    line: String,
}

impl<'r, 'a> CommandReader<'r, 'a> {
    /// Start reading commands at the reader's current position.
    pub fn new(reader: &'r mut BinaryReader<'a>) -> Self {
        Self {
            reader,
            line: String::new(),
        }
    }

    /// Read the next command line, or `None` at a zero group count.
    ///
    /// The returned line is overwritten by the next call.
    pub fn next_line(&mut self) -> Result<Option<&str>> {
        let count = self.reader.read_u8()?;
        if count == 0 {
            return Ok(None);
        }

        self.line.clear();
        for _ in 0..count {
            let part = self.reader.read_string()?;
            self.line.push('"');
            self.line.push_str(&part);
            self.line.push('"');
        }
        Ok(Some(&self.line))
    }
}

/// Split a command line into the contents of its quoted segments.
///
/// An unpaired trailing quote is ignored.
pub fn split_line(line: &str) -> Vec<&str> {
    let quotes: Vec<usize> = memchr_iter(b'"', line.as_bytes()).collect();
    quotes
        .chunks_exact(2)
        .map(|pair| &line[pair[0] + 1..pair[1]])
        .collect()
}

/// A decoded menu command.
///
/// Commands that need an argument only decode to their variant when the
/// argument is present and non-empty; otherwise they become [`Command::Ignored`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `end`: stop reading.
    End,
    /// `name`: display name.
    Name(&'a str),
    /// `setumei`: description.
    Description(&'a str),
    /// `category`: part type name.
    Category(&'a str),
    /// `icons` or `icon`: icon texture name.
    Icon(&'a str),
    /// `priority`: sort priority, still unparsed.
    Priority(&'a str),
    /// `additem`: model file.
    AddItem(&'a str),
    /// `color_set`: palette part type and palette menu.
    ColorSet { part_type: &'a str, menu: &'a str },
    /// `メニューフォルダ`: menu folder.
    MenuFolder(&'a str),
    /// Anything else, including known keywords missing their argument.
    Ignored(&'a str),
}

impl<'a> Command<'a> {
    /// Interpret the tokens of one command line. Keywords are case-sensitive.
    pub fn parse(tokens: &[&'a str]) -> Self {
        let Some(&keyword) = tokens.first() else {
            return Command::Ignored("");
        };
        let arg = tokens.get(1).copied().filter(|arg| !arg.is_empty());

        match (keyword, arg) {
            (END_KEYWORD, _) => Command::End,
            ("name", Some(arg)) => Command::Name(arg),
            ("setumei", Some(arg)) => Command::Description(arg),
            ("category", Some(arg)) => Command::Category(arg),
            ("icons" | "icon", Some(arg)) => Command::Icon(arg),
            ("priority", Some(arg)) => Command::Priority(arg),
            ("additem", Some(arg)) => Command::AddItem(arg),
            ("color_set", Some(arg)) if tokens.len() > 2 => Command::ColorSet {
                part_type: arg,
                menu: tokens[2],
            },
            (MENU_FOLDER_KEYWORD, Some(arg)) => Command::MenuFolder(arg),
            _ => Command::Ignored(keyword),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmkit_common::BinaryWriter;

    fn stream(commands: &[&[&str]]) -> Vec<u8> {
        let mut writer = BinaryWriter::new(Vec::new());
        for command in commands {
            writer.write_u8(command.len() as u8).unwrap();
            for part in *command {
                writer.write_string(part).unwrap();
            }
        }
        writer.write_u8(0).unwrap();
        writer.into_inner()
    }

    #[test]
    fn test_lines_are_quoted() {
        let data = stream(&[&["name", "Maid Dress"], &["priority", "10"]]);
        let mut reader = BinaryReader::new(&data);
        let mut commands = CommandReader::new(&mut reader);

        assert_eq!(commands.next_line().unwrap(), Some("\"name\"\"Maid Dress\""));
        assert_eq!(commands.next_line().unwrap(), Some("\"priority\"\"10\""));
        assert_eq!(commands.next_line().unwrap(), None);
    }

    #[test]
    fn test_split_line() {
        assert_eq!(split_line("\"name\"\"a b\""), vec!["name", "a b"]);
        assert_eq!(split_line("\"name\"\"\""), vec!["name", ""]);
        assert_eq!(split_line("\"end\""), vec!["end"]);
        assert!(split_line("").is_empty());
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse(&["end"]), Command::End);
        assert_eq!(Command::parse(&["name", "Dress"]), Command::Name("Dress"));
        assert_eq!(Command::parse(&["icons", "x.tex"]), Command::Icon("x.tex"));
        assert_eq!(Command::parse(&["icon", "y.tex"]), Command::Icon("y.tex"));
        assert_eq!(
            Command::parse(&["color_set", "skirt", "Palette.menu"]),
            Command::ColorSet {
                part_type: "skirt",
                menu: "Palette.menu"
            }
        );
    }

    #[test]
    fn test_missing_arguments_are_ignored() {
        assert_eq!(Command::parse(&["name"]), Command::Ignored("name"));
        assert_eq!(Command::parse(&["name", ""]), Command::Ignored("name"));
        assert_eq!(
            Command::parse(&["color_set", "skirt"]),
            Command::Ignored("color_set")
        );
        assert_eq!(Command::parse(&["Name", "x"]), Command::Ignored("Name"));
        assert_eq!(Command::parse(&[]), Command::Ignored(""));
    }

    #[test]
    fn test_truncated_stream_fails() {
        let mut data = stream(&[&["name", "Dress"]]);
        data.truncate(8);
        let mut reader = BinaryReader::new(&data);
        let mut commands = CommandReader::new(&mut reader);

        assert!(commands.next_line().is_err());
    }
}
