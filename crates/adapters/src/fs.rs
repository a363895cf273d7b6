//! Local filesystem adapter.

use flatsnap_ports::{
    FileSystemDirEntry, FileSystemEntryKind, FileSystemPort, FileSystemStat, SafeRelativePath,
};
use flatsnap_shared::{ErrorCode, ErrorEnvelope, Result, io_error_at};
use std::fs;
use std::path::{Path, PathBuf};

/// Local filesystem adapter using blocking `std::fs` IO.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystem {
    max_file_size_bytes: Option<u64>,
}

impl LocalFileSystem {
    /// Build a filesystem adapter with an optional max file size for reads.
    pub const fn new(max_file_size_bytes: Option<u64>) -> Self {
        Self {
            max_file_size_bytes,
        }
    }
}

impl LocalFileSystem {
    fn check_readable(&self, full_path: &Path, file: &SafeRelativePath) -> Result<()> {
        let metadata = fs::metadata(full_path).map_err(|error| io_error_at(error, full_path))?;
        if !metadata.is_file() {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "path is not a file",
            )
            .with_metadata("path", file.as_str().to_owned()));
        }
        if let Some(limit) = self.max_file_size_bytes {
            if metadata.len() > limit {
                return Err(ErrorEnvelope::expected(
                    ErrorCode::new("fs", "file_too_large"),
                    format!("file exceeds max size of {limit} bytes"),
                )
                .with_metadata("path", file.as_str().to_owned())
                .with_metadata("sizeBytes", metadata.len().to_string()));
            }
        }
        Ok(())
    }
}

impl FileSystemPort for LocalFileSystem {
    fn read_dir(&self, root: &Path, dir: &SafeRelativePath) -> Result<Vec<FileSystemDirEntry>> {
        let full_path = resolve(root, dir);
        let read_dir = fs::read_dir(&full_path).map_err(|error| io_error_at(error, &full_path))?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|error| io_error_at(error, &full_path))?;
            let file_type = entry
                .file_type()
                .map_err(|error| io_error_at(error, &entry.path()))?;
            let raw_name = entry.file_name();
            let (name, lossy_name) = match raw_name.to_str() {
                Some(name) => (name.to_owned(), false),
                None => (raw_name.to_string_lossy().into_owned(), true),
            };
            entries.push(FileSystemDirEntry {
                name: name.into_boxed_str(),
                kind: entry_kind(&file_type),
                lossy_name,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read_file_text(&self, root: &Path, file: &SafeRelativePath) -> Result<Box<str>> {
        let full_path = resolve(root, file);
        self.check_readable(&full_path, file)?;
        let contents =
            fs::read_to_string(&full_path).map_err(|error| io_error_at(error, &full_path))?;
        Ok(contents.into_boxed_str())
    }

    fn read_file_bytes(&self, root: &Path, file: &SafeRelativePath) -> Result<Vec<u8>> {
        let full_path = resolve(root, file);
        self.check_readable(&full_path, file)?;
        fs::read(&full_path).map_err(|error| io_error_at(error, &full_path))
    }

    fn stat(&self, root: &Path, path: &SafeRelativePath) -> Result<FileSystemStat> {
        let full_path = resolve(root, path);
        let metadata = fs::metadata(&full_path).map_err(|error| io_error_at(error, &full_path))?;
        Ok(FileSystemStat {
            kind: entry_kind(&metadata.file_type()),
            size_bytes: metadata.len(),
        })
    }

    fn write_file_text(&self, root: &Path, file: &SafeRelativePath, contents: &str) -> Result<()> {
        let full_path = resolve(root, file);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|error| io_error_at(error, parent))?;
        }
        fs::write(&full_path, contents).map_err(|error| io_error_at(error, &full_path))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|error| io_error_at(error, path))
    }

    fn read_document(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|error| io_error_at(error, path))
    }

    fn write_document(&self, path: &Path, contents: &str) -> Result<()> {
        fs::write(path, contents).map_err(|error| io_error_at(error, path))
    }
}

fn resolve(root: &Path, path: &SafeRelativePath) -> PathBuf {
    if path.is_root() {
        root.to_path_buf()
    } else {
        root.join(path.as_str())
    }
}

fn entry_kind(file_type: &fs::FileType) -> FileSystemEntryKind {
    if file_type.is_symlink() {
        FileSystemEntryKind::Other
    } else if file_type.is_file() {
        FileSystemEntryKind::File
    } else if file_type.is_dir() {
        FileSystemEntryKind::Directory
    } else {
        FileSystemEntryKind::Other
    }
}
