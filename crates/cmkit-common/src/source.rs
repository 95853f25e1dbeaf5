//! Byte sources.
//!
//! Containers are looked up by bare file name in the game's virtual file
//! system, which is abstracted here as [`FileSystem`]. Reads go through a
//! caller-owned buffer that is grown and reused so decoding thousands of
//! small files does not allocate per file.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use hashbrown::HashMap;
use walkdir::WalkDir;

use crate::{Error, Result};

/// Size of the first allocation of a reused read buffer.
pub const MIN_BUFFER_SIZE: usize = 500_000;

/// An open file in a [`FileSystem`].
pub trait FileHandle {
    /// Whether the handle refers to a readable file.
    fn is_valid(&self) -> bool;

    /// Size of the file in bytes.
    fn size(&self) -> u64;

    /// Fill `dst` from the start of the file. `dst` is exactly `size()` bytes.
    fn read(&mut self, dst: &mut [u8]) -> io::Result<()>;

    /// Last modification time, when the source knows it.
    fn modified(&self) -> Option<SystemTime> {
        None
    }
}

/// A virtual file system that resolves container names to file handles.
pub trait FileSystem: Send + Sync {
    /// Open a file by name, or `None` if it does not exist.
    fn open(&self, path: &str) -> Option<Box<dyn FileHandle + '_>>;
}

/// Bytes read into a reused buffer.
#[derive(Debug, Clone, Copy)]
pub struct FileBytes<'b> {
    /// The file contents, exactly as long as the file.
    pub data: &'b [u8],
    /// Last modification time as Unix milliseconds, 0 when unknown.
    pub last_write_at: i64,
}

/// Read a whole file from a [`FileSystem`] into `buffer`.
///
/// The buffer only ever grows. The returned slice borrows it and is
/// overwritten by the next read into the same buffer.
pub fn read_all<'b, F>(fs: &F, path: &str, buffer: &'b mut Vec<u8>) -> Result<FileBytes<'b>>
where
    F: FileSystem + ?Sized,
{
    let mut handle = fs
        .open(path)
        .filter(|handle| handle.is_valid())
        .ok_or_else(|| Error::FileNotFound(path.to_string()))?;

    let size = usize::try_from(handle.size()).map_err(|_| too_large(path))?;
    if size == 0 {
        return Err(Error::EmptyFile(path.to_string()));
    }

    grow_buffer(buffer, size);
    handle.read(&mut buffer[..size])?;

    Ok(FileBytes {
        data: &buffer[..size],
        last_write_at: handle.modified().map(unix_millis).unwrap_or(0),
    })
}

/// Read a whole file from disk into `buffer`, with the same reuse rules as
/// [`read_all`].
pub fn read_path<'b>(path: &Path, buffer: &'b mut Vec<u8>) -> Result<FileBytes<'b>> {
    let mut file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::FileNotFound(path.display().to_string()),
        _ => Error::Io(e),
    })?;
    let metadata = file.metadata()?;
    let size = usize::try_from(metadata.len())
        .map_err(|_| too_large(&path.display().to_string()))?;
    if size == 0 {
        return Err(Error::EmptyFile(path.display().to_string()));
    }

    grow_buffer(buffer, size);
    file.read_exact(&mut buffer[..size])?;

    Ok(FileBytes {
        data: &buffer[..size],
        last_write_at: metadata.modified().map(unix_millis).unwrap_or(0),
    })
}

fn too_large(path: &str) -> Error {
    Error::Io(io::Error::new(
        io::ErrorKind::InvalidData,
        format!("{path} is too large to read into memory"),
    ))
}

/// Grow `buffer` to hold `size` bytes. The first allocation is at least
/// [`MIN_BUFFER_SIZE`].
fn grow_buffer(buffer: &mut Vec<u8>, size: usize) {
    if buffer.is_empty() {
        buffer.resize(size.max(MIN_BUFFER_SIZE), 0);
    } else if buffer.len() < size {
        buffer.resize(size, 0);
    }
}

/// Convert a timestamp to Unix milliseconds, clamping pre-epoch times to 0.
pub fn unix_millis(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// An in-memory file system keyed by case-insensitive file name.
#[derive(Debug, Default, Clone)]
pub struct MemoryFileSystem {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryFileSystem {
    /// Create an empty file system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&mut self, name: &str, data: impl Into<Vec<u8>>) {
        self.files.insert(name.to_lowercase(), data.into());
    }

    /// Remove a file, returning its contents.
    pub fn remove(&mut self, name: &str) -> Option<Vec<u8>> {
        self.files.remove(&name.to_lowercase())
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether there are no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

struct MemoryFile<'a> {
    data: &'a [u8],
}

impl FileHandle for MemoryFile<'_> {
    fn is_valid(&self) -> bool {
        true
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn read(&mut self, dst: &mut [u8]) -> io::Result<()> {
        dst.copy_from_slice(&self.data[..dst.len()]);
        Ok(())
    }
}

impl FileSystem for MemoryFileSystem {
    fn open(&self, path: &str) -> Option<Box<dyn FileHandle + '_>> {
        let data = self.files.get(&path.to_lowercase())?;
        Some(Box::new(MemoryFile { data }))
    }
}

/// A directory tree exposed as a flat, case-insensitive namespace of file
/// names, the way the game resolves containers across its archives.
///
/// When two files share a name, the one visited last (in file name order)
/// shadows the other.
#[derive(Debug, Clone)]
pub struct DirectoryFileSystem {
    root: PathBuf,
    index: HashMap<String, PathBuf>,
}

impl DirectoryFileSystem {
    /// Index every file under `root`.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(Error::FileNotFound(root.display().to_string()));
        }

        let mut index = HashMap::new();
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("skipping unreadable entry under {}: {e}", root.display());
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_lowercase();
            index.insert(name, entry.into_path());
        }

        log::debug!("indexed {} files under {}", index.len(), root.display());
        Ok(Self { root, index })
    }

    /// The indexed root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a file name to its on-disk path.
    pub fn resolve(&self, name: &str) -> Option<&Path> {
        self.index.get(&name.to_lowercase()).map(PathBuf::as_path)
    }

    /// Iterate over all indexed (lower-cased name, path) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.index.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }

    /// Number of indexed files.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no files were indexed.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

struct DiskFile {
    file: File,
    size: u64,
    modified: Option<SystemTime>,
}

impl FileHandle for DiskFile {
    fn is_valid(&self) -> bool {
        true
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn read(&mut self, dst: &mut [u8]) -> io::Result<()> {
        self.file.read_exact(dst)
    }

    fn modified(&self) -> Option<SystemTime> {
        self.modified
    }
}

impl FileSystem for DirectoryFileSystem {
    fn open(&self, path: &str) -> Option<Box<dyn FileHandle + '_>> {
        let path = self.resolve(path)?;
        let file = File::open(path).ok()?;
        let metadata = file.metadata().ok()?;
        Some(Box::new(DiskFile {
            file,
            size: metadata.len(),
            modified: metadata.modified().ok(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_read_all_grows_to_floor() {
        let mut fs = MemoryFileSystem::new();
        fs.insert("a.menu", vec![1u8, 2, 3]);
        let mut buffer = Vec::new();

        let bytes = read_all(&fs, "A.MENU", &mut buffer).unwrap();
        assert_eq!(bytes.data, &[1, 2, 3]);
        assert_eq!(buffer.len(), MIN_BUFFER_SIZE);
    }

    #[test]
    fn test_read_all_never_shrinks() {
        let mut fs = MemoryFileSystem::new();
        fs.insert("big.tex", vec![7u8; MIN_BUFFER_SIZE + 10]);
        fs.insert("small.tex", vec![9u8; 4]);
        let mut buffer = Vec::new();

        read_all(&fs, "big.tex", &mut buffer).unwrap();
        assert_eq!(buffer.len(), MIN_BUFFER_SIZE + 10);

        let bytes = read_all(&fs, "small.tex", &mut buffer).unwrap();
        assert_eq!(bytes.data, &[9, 9, 9, 9]);
        assert_eq!(buffer.len(), MIN_BUFFER_SIZE + 10);
    }

    #[test]
    fn test_missing_and_empty_files() {
        let mut fs = MemoryFileSystem::new();
        fs.insert("empty.menu", Vec::new());
        let mut buffer = Vec::new();

        let missing = read_all(&fs, "nope.menu", &mut buffer).unwrap_err();
        assert!(matches!(missing, Error::FileNotFound(_)));
        assert_eq!(missing.kind(), ErrorKind::SourceUnavailable);

        let empty = read_all(&fs, "empty.menu", &mut buffer).unwrap_err();
        assert!(matches!(empty, Error::EmptyFile(_)));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_read_path() {
        let dir = std::env::temp_dir().join(format!("cmkit-read-path-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("pre_test.preset");
        std::fs::write(&file, [4u8, 5, 6]).unwrap();
        let mut buffer = Vec::new();

        let bytes = read_path(&file, &mut buffer).unwrap();
        assert_eq!(bytes.data, &[4, 5, 6]);
        assert!(bytes.last_write_at > 0);
        assert_eq!(buffer.len(), MIN_BUFFER_SIZE);

        let missing = read_path(&dir.join("missing.preset"), &mut buffer).unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::SourceUnavailable);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
