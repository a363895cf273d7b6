//! The flat snapshot text format.
//!
//! A snapshot is a header line followed by one entry per file:
//!
//! ```text
//! # This snapshot contains multiple files. Each file starts with '### FILE: path/to/file ###'
//! ### FILE: src/main.rs ###
//! fn main() {}
//!
//! ### FILE: README.md ###
//! hello
//! ```
//!
//! Entries are joined with a newline, so every entry but the last is followed
//! by a blank line. Content containing the file marker cannot be represented.

use crate::paths::SafeRelativePath;

/// First line of every snapshot document.
pub const SNAPSHOT_HEADER: &str =
    "# This snapshot contains multiple files. Each file starts with '### FILE: path/to/file ###'";

/// Prefix of every entry marker.
pub const FILE_MARKER: &str = "### FILE: ";

/// Terminator between an entry path and its content.
pub const MARKER_TERMINATOR: &str = " ###\n";

/// One archived file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    /// Path relative to the archive root.
    pub path: SafeRelativePath,
    /// Full text content.
    pub content: Box<str>,
}

impl SnapshotEntry {
    /// Build an entry.
    pub fn new(path: SafeRelativePath, content: impl Into<Box<str>>) -> Self {
        Self {
            path,
            content: content.into(),
        }
    }

    /// True when the content would be split apart on extraction.
    #[must_use]
    pub fn contains_marker(&self) -> bool {
        self.content.contains(FILE_MARKER)
    }
}

/// Result of decoding a snapshot document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedSnapshot {
    /// Decoded entries in document order.
    pub entries: Vec<SnapshotEntry>,
    /// Segments without a marker terminator.
    pub malformed_segments: usize,
    /// Entry paths rejected as absolute or escaping the root.
    pub unsafe_paths: Vec<Box<str>>,
}

/// Encode entries into a snapshot document.
#[must_use]
pub fn render_snapshot(entries: &[SnapshotEntry]) -> String {
    let capacity = entries.iter().fold(SNAPSHOT_HEADER.len() + 1, |total, entry| {
        total + FILE_MARKER.len() + entry.path.as_str().len() + MARKER_TERMINATOR.len()
            + entry.content.len()
            + 2
    });
    let mut document = String::with_capacity(capacity);
    document.push_str(SNAPSHOT_HEADER);
    document.push('\n');

    for (index, entry) in entries.iter().enumerate() {
        if index > 0 {
            document.push('\n');
        }
        document.push_str(FILE_MARKER);
        document.push_str(entry.path.as_str());
        document.push_str(MARKER_TERMINATOR);
        document.push_str(&entry.content);
        document.push('\n');
    }
    document
}

/// Decode a snapshot document.
///
/// Never fails: malformed segments are counted and unsafe paths recorded,
/// while every well-formed entry is still returned.
#[must_use]
pub fn parse_snapshot(document: &str) -> ParsedSnapshot {
    let mut parsed = ParsedSnapshot::default();
    // The header quotes the marker itself.
    let body = document.strip_prefix(SNAPSHOT_HEADER).unwrap_or(document);
    let mut segments = body.split(FILE_MARKER).skip(1).peekable();

    while let Some(segment) = segments.next() {
        let is_last = segments.peek().is_none();
        if segment.trim().is_empty() {
            continue;
        }
        let Some((raw_path, body)) = segment.split_once(MARKER_TERMINATOR) else {
            parsed.malformed_segments += 1;
            continue;
        };

        let content = if is_last {
            body.strip_suffix('\n').unwrap_or(body)
        } else {
            body.strip_suffix("\n\n").unwrap_or(body)
        };

        match SafeRelativePath::new(raw_path) {
            Ok(path) if !path.is_root() => parsed.entries.push(SnapshotEntry::new(path, content)),
            _ => parsed.unsafe_paths.push(raw_path.into()),
        }
    }
    parsed
}
