//! Relative path primitives shared by scanning, matching, and extraction.

use flatsnap_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Path string used for the archive root itself.
pub const ROOT_PATH: &str = ".";

/// Validation failures for relative paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path is absolute (leading `/` or a drive prefix).
    Absolute {
        /// Raw input.
        input: String,
    },
    /// The path contains a `..` segment.
    Traversal {
        /// Raw input.
        input: String,
    },
    /// The path contains a NUL byte.
    ContainsNul {
        /// Raw input (lossy).
        input: String,
    },
}

impl PathError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::Absolute { .. } => ErrorCode::new("path", "absolute"),
            Self::Traversal { .. } => ErrorCode::new("path", "traversal"),
            Self::ContainsNul { .. } => ErrorCode::new("path", "contains_nul"),
        }
    }

    /// Returns the rejected input.
    #[must_use]
    pub fn input(&self) -> &str {
        match self {
            Self::Absolute { input } | Self::Traversal { input } | Self::ContainsNul { input } => {
                input
            },
        }
    }
}

impl fmt::Display for PathError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute { .. } => formatter.write_str("absolute paths are not allowed"),
            Self::Traversal { .. } => formatter.write_str("path traversal is not allowed"),
            Self::ContainsNul { .. } => formatter.write_str("paths must not contain NUL bytes"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for ErrorEnvelope {
    fn from(error: PathError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        Self::expected(code, message).with_metadata("path", error.input().to_owned())
    }
}

/// A validated, normalized path relative to an archive root.
///
/// Separators are always `/`. Absolute paths and `..` segments are rejected,
/// so joining the path onto a root can never escape it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SafeRelativePath(Box<str>);

impl SafeRelativePath {
    /// Validate and normalize an untrusted relative path.
    pub fn new(input: &str) -> Result<Self, PathError> {
        normalize_relative_path(input).map(|normalized| Self(normalized.into_boxed_str()))
    }

    /// The archive root (`.`).
    #[must_use]
    pub fn root() -> Self {
        Self(ROOT_PATH.into())
    }

    /// Returns true for the archive root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.as_ref() == ROOT_PATH
    }

    /// Borrow the path as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Join a single entry name onto this path.
    pub fn join(&self, name: &str) -> Result<Self, PathError> {
        if self.is_root() {
            Self::new(name)
        } else {
            Self::new(&format!("{}/{name}", self.0))
        }
    }

    /// Final path segment.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for SafeRelativePath {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl TryFrom<String> for SafeRelativePath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<SafeRelativePath> for String {
    fn from(value: SafeRelativePath) -> Self {
        value.0.into_string()
    }
}

/// A path under evaluation by the ignore matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePath {
    path: SafeRelativePath,
    is_directory: bool,
}

impl CandidatePath {
    /// Candidate for a regular file.
    #[must_use]
    pub const fn file(path: SafeRelativePath) -> Self {
        Self {
            path,
            is_directory: false,
        }
    }

    /// Candidate for a directory.
    #[must_use]
    pub const fn directory(path: SafeRelativePath) -> Self {
        Self {
            path,
            is_directory: true,
        }
    }

    /// Parse a raw relative path into a candidate.
    pub fn parse(input: &str, is_directory: bool) -> Result<Self, PathError> {
        Ok(Self {
            path: SafeRelativePath::new(input)?,
            is_directory,
        })
    }

    /// Relative path being matched.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.path.as_str()
    }

    /// Underlying validated path.
    #[must_use]
    pub const fn path(&self) -> &SafeRelativePath {
        &self.path
    }

    /// Whether the candidate denotes a directory.
    #[must_use]
    pub const fn is_directory(&self) -> bool {
        self.is_directory
    }
}

fn normalize_relative_path(input: &str) -> Result<String, PathError> {
    if input.contains('\0') {
        return Err(PathError::ContainsNul {
            input: input.replace('\0', "\u{fffd}"),
        });
    }
    if is_absolute_like(input) {
        return Err(PathError::Absolute {
            input: input.to_owned(),
        });
    }

    let segments: Vec<&str> = input
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();

    if segments.iter().any(|segment| *segment == "..") {
        return Err(PathError::Traversal {
            input: input.to_owned(),
        });
    }

    if segments.is_empty() {
        return Ok(ROOT_PATH.to_owned());
    }
    Ok(segments.join("/"))
}

fn is_absolute_like(path: &str) -> bool {
    if path.starts_with('/') || path.starts_with('\\') {
        return true;
    }
    let bytes = path.as_bytes();
    matches!(bytes, [drive, b':', b'/' | b'\\', ..] if drive.is_ascii_alphabetic())
}
