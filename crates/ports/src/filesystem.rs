//! Filesystem boundary contract.

use flatsnap_domain::SafeRelativePath;
use flatsnap_shared::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File system entry kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSystemEntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symlink, socket, device, or unknown.
    Other,
}

/// A directory listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSystemDirEntry {
    /// Entry name (single path segment).
    pub name: Box<str>,
    /// Entry kind. Symlinks are reported as `Other` and never followed.
    pub kind: FileSystemEntryKind,
    /// True when the on-disk name is not valid UTF-8 and `name` is a lossy
    /// rendering of it.
    pub lossy_name: bool,
}

/// File system stat info.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSystemStat {
    /// Kind of the entry.
    pub kind: FileSystemEntryKind,
    /// Size in bytes.
    pub size_bytes: u64,
}

/// Boundary contract for filesystem access.
///
/// Tree operations take the root as an absolute path owned by the caller and
/// a `SafeRelativePath` beneath it. Document operations address a single
/// file (the archive itself) by plain path.
pub trait FileSystemPort: Send + Sync {
    /// List directory entries.
    fn read_dir(&self, root: &Path, dir: &SafeRelativePath) -> Result<Vec<FileSystemDirEntry>>;

    /// Read a UTF-8 text file. Non-UTF-8 content fails with `invalid_data`.
    fn read_file_text(&self, root: &Path, file: &SafeRelativePath) -> Result<Box<str>>;

    /// Read a file's raw bytes.
    ///
    /// The default goes through `read_file_text`, so adapters that can hand
    /// out non-UTF-8 content should override it.
    fn read_file_bytes(&self, root: &Path, file: &SafeRelativePath) -> Result<Vec<u8>> {
        self.read_file_text(root, file)
            .map(|text| text.into_boxed_bytes().into_vec())
    }

    /// Read entry metadata.
    fn stat(&self, root: &Path, path: &SafeRelativePath) -> Result<FileSystemStat>;

    /// Write a text file, creating parent directories as needed.
    fn write_file_text(&self, root: &Path, file: &SafeRelativePath, contents: &str) -> Result<()>;

    /// Create a directory and all of its parents.
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Read a whole document as UTF-8 text.
    fn read_document(&self, path: &Path) -> Result<String>;

    /// Replace a document's contents.
    fn write_document(&self, path: &Path, contents: &str) -> Result<()>;
}

/// Borrowing filesystem session bound to a tree root.
pub struct FileSystemSession<'a> {
    fs: &'a dyn FileSystemPort,
    root: PathBuf,
}

impl<'a> FileSystemSession<'a> {
    /// Create a borrowing session for a tree root.
    #[must_use]
    pub fn new(fs: &'a dyn FileSystemPort, root: PathBuf) -> Self {
        Self { fs, root }
    }

    /// Root this session is bound to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List directory entries relative to the root.
    pub fn read_dir(&self, dir: &SafeRelativePath) -> Result<Vec<FileSystemDirEntry>> {
        self.fs.read_dir(&self.root, dir)
    }

    /// Read a UTF-8 text file relative to the root.
    pub fn read_file_text(&self, file: &SafeRelativePath) -> Result<Box<str>> {
        self.fs.read_file_text(&self.root, file)
    }

    /// Read raw file bytes relative to the root.
    pub fn read_file_bytes(&self, file: &SafeRelativePath) -> Result<Vec<u8>> {
        self.fs.read_file_bytes(&self.root, file)
    }

    /// Read metadata relative to the root.
    pub fn stat(&self, path: &SafeRelativePath) -> Result<FileSystemStat> {
        self.fs.stat(&self.root, path)
    }

    /// Write a text file relative to the root.
    pub fn write_file_text(&self, file: &SafeRelativePath, contents: &str) -> Result<()> {
        self.fs.write_file_text(&self.root, file, contents)
    }
}

/// Extension helpers for filesystem ports.
pub trait FileSystemPortExt {
    /// Create a borrowing session for a tree root.
    fn session(&self, root: PathBuf) -> FileSystemSession<'_>;
}

impl<T> FileSystemPortExt for T
where
    T: FileSystemPort,
{
    fn session(&self, root: PathBuf) -> FileSystemSession<'_> {
        FileSystemSession::new(self, root)
    }
}

impl FileSystemPortExt for Arc<dyn FileSystemPort> {
    fn session(&self, root: PathBuf) -> FileSystemSession<'_> {
        FileSystemSession::new(self.as_ref(), root)
    }
}
