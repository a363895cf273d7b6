//! Loading the ignore pattern set for a tree.

use flatsnap_domain::{PatternSet, SafeRelativePath};
use flatsnap_ports::{FileSystemSession, LoggerPort, LogFields};
use flatsnap_shared::{ErrorCode, ErrorEnvelope, Result};
use serde_json::Value;
use std::sync::Arc;

/// Resolve the ignore file name to a root-level path.
pub fn ignore_file_path(file_name: &str) -> Result<SafeRelativePath> {
    let path = SafeRelativePath::new(file_name).map_err(ErrorEnvelope::from)?;
    if path.is_root() || path.as_str().contains('/') {
        return Err(ErrorEnvelope::expected(
            ErrorCode::invalid_input(),
            "ignore file name must be a single path segment",
        )
        .with_metadata("fileName", file_name.to_owned()));
    }
    Ok(path)
}

/// Active patterns plus any failure reading the ignore file.
#[derive(Debug, Clone, Default)]
pub struct LoadedPatterns {
    /// Extra patterns first, then the ignore file's lines.
    pub patterns: PatternSet,
    /// Why the ignore file contributed nothing, when it exists but could not be read.
    pub ignore_file_error: Option<Box<str>>,
}

/// Build the pattern set: extra patterns first, then the ignore file's lines.
///
/// Bytes that are not valid UTF-8 are decoded lossily, so one bad line never
/// drops the rest of the file. A missing ignore file contributes nothing.
/// Any other read failure is logged and returned with the patterns.
pub fn load_pattern_set(
    fs: &FileSystemSession<'_>,
    logger: Option<&Arc<dyn LoggerPort>>,
    ignore_file: &SafeRelativePath,
    extra_patterns: &[Box<str>],
) -> LoadedPatterns {
    let mut ignore_file_error = None;
    let source = match fs.read_file_bytes(ignore_file) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(error) => {
            if !error.is_not_found() {
                if let Some(logger) = logger {
                    logger.warn(
                        "snapshot.ignore.read_failed",
                        "Failed to read ignore file; continuing without it",
                        Some(read_failed_fields(ignore_file, &error)),
                    );
                }
                ignore_file_error = Some(error.message.into_boxed_str());
            }
            None
        },
    };

    let file_lines = source.as_deref().map(str::lines).into_iter().flatten();
    LoadedPatterns {
        patterns: PatternSet::parse(extra_patterns.iter().map(|pattern| &**pattern).chain(file_lines)),
        ignore_file_error,
    }
}

fn read_failed_fields(ignore_file: &SafeRelativePath, error: &ErrorEnvelope) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert(
        "ignoreFile".to_owned().into_boxed_str(),
        Value::String(ignore_file.as_str().to_owned()),
    );
    fields.insert(
        "error".to_owned().into_boxed_str(),
        Value::String(error.to_string()),
    );
    fields
}
