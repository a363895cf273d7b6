//! Environment variable parsing and env-to-config merging.
//!
//! Env parsing is strict: a variable that is present but empty or malformed
//! fails instead of being ignored.

use crate::schema::{SnapshotConfig, ValidatedSnapshotConfig};
use flatsnap_domain::NegationMode;
use flatsnap_shared::{ErrorCode, ErrorEnvelope};
use std::collections::BTreeMap;
use std::fmt;

/// Env var: default archive output path.
pub const ENV_DEFAULT_OUTPUT: &str = "FLATSNAP_DEFAULT_OUTPUT";
/// Env var: ignore file name.
pub const ENV_IGNORE_FILE: &str = "FLATSNAP_IGNORE_FILE";
/// Env var: extra ignore patterns (comma separated).
pub const ENV_IGNORE_PATTERNS: &str = "FLATSNAP_IGNORE_PATTERNS";
/// Env var: negation mode (`inert` or `lastMatchWins`).
pub const ENV_IGNORE_NEGATION: &str = "FLATSNAP_IGNORE_NEGATION";
/// Env var: max file size in bytes.
pub const ENV_MAX_FILE_SIZE_BYTES: &str = "FLATSNAP_MAX_FILE_SIZE_BYTES";
/// Env var: max files per archive.
pub const ENV_MAX_FILES: &str = "FLATSNAP_MAX_FILES";

const ALL_VARS: [&str; 6] = [
    ENV_DEFAULT_OUTPUT,
    ENV_IGNORE_FILE,
    ENV_IGNORE_PATTERNS,
    ENV_IGNORE_NEGATION,
    ENV_MAX_FILE_SIZE_BYTES,
    ENV_MAX_FILES,
];

const MAX_CSV_ITEMS: usize = 512;

/// Parsed env overrides. `None` means the variable was not set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SnapshotEnv {
    /// Override for `archive.defaultOutput`.
    pub default_output: Option<Box<str>>,
    /// Override for `ignore.fileName`.
    pub ignore_file_name: Option<Box<str>>,
    /// Override for `ignore.patterns`.
    pub ignore_patterns: Option<Vec<Box<str>>>,
    /// Override for `ignore.negation`.
    pub ignore_negation: Option<NegationMode>,
    /// Override for `scan.maxFileSizeBytes`.
    pub max_file_size_bytes: Option<u64>,
    /// Override for `scan.maxFiles`.
    pub max_files: Option<u32>,
}

impl SnapshotEnv {
    /// Parse env overrides from a key/value map (useful for tests and fixtures).
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            default_output: parse_optional_trimmed_string(map, ENV_DEFAULT_OUTPUT)?,
            ignore_file_name: parse_optional_trimmed_string(map, ENV_IGNORE_FILE)?,
            ignore_patterns: parse_optional_csv_patterns(map, ENV_IGNORE_PATTERNS)?,
            ignore_negation: parse_optional_negation(map, ENV_IGNORE_NEGATION)?,
            max_file_size_bytes: parse_optional_u64(map, ENV_MAX_FILE_SIZE_BYTES)?,
            max_files: parse_optional_u32(map, ENV_MAX_FILES)?,
        })
    }

    /// Parse env overrides from the current process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let map = ALL_VARS
            .iter()
            .filter_map(|name| {
                std::env::var(name)
                    .ok()
                    .map(|value| ((*name).to_owned(), value))
            })
            .collect();
        Self::from_map(&map)
    }

    /// True when no variable was set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Apply env overrides to a base config (env wins over file/default values).
pub fn apply_env_overrides(
    base: SnapshotConfig,
    env: &SnapshotEnv,
) -> Result<ValidatedSnapshotConfig, ErrorEnvelope> {
    let mut config = base;
    set_clone(&mut config.archive.default_output, env.default_output.as_ref());
    set_clone(&mut config.ignore.file_name, env.ignore_file_name.as_ref());
    set_clone(&mut config.ignore.patterns, env.ignore_patterns.as_ref());
    set_clone(&mut config.ignore.negation, env.ignore_negation.as_ref());
    set_clone(
        &mut config.scan.max_file_size_bytes,
        env.max_file_size_bytes.as_ref(),
    );
    set_clone(&mut config.scan.max_files, env.max_files.as_ref());

    config.validate_and_normalize().map_err(Into::into)
}

fn set_clone<T: Clone>(field: &mut T, value: Option<&T>) {
    if let Some(value) = value {
        field.clone_from(value);
    }
}

/// Validation failures when parsing env variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// Integer env var had an invalid value.
    InvalidInt {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Enum env var had an invalid value.
    InvalidEnum {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// CSV list exceeds a safety limit.
    CsvTooLarge {
        /// Env var name.
        var: &'static str,
        /// Number of parsed items.
        len: usize,
        /// Maximum allowed.
        max: usize,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } => ErrorCode::new("config", "empty_env_var"),
            Self::InvalidInt { .. } => ErrorCode::new("config", "invalid_env_int"),
            Self::InvalidEnum { .. } => ErrorCode::new("config", "invalid_env_enum"),
            Self::CsvTooLarge { .. } => ErrorCode::new("config", "invalid_env_csv"),
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } => write!(formatter, "{var} must be non-empty"),
            Self::InvalidInt { var, .. } => write!(formatter, "{var} must be an integer"),
            Self::InvalidEnum { var, .. } => write!(formatter, "{var} has an unsupported value"),
            Self::CsvTooLarge { var, len, max } => {
                write!(formatter, "{var} is too large ({len} items, max {max})")
            },
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            EnvParseError::EmptyValue { var } => envelope.with_metadata("env_var", var),
            EnvParseError::InvalidInt { var, value } | EnvParseError::InvalidEnum { var, value } => {
                envelope
                    .with_metadata("env_var", var)
                    .with_metadata("value", value)
            },
            EnvParseError::CsvTooLarge { var, len, max } => envelope
                .with_metadata("env_var", var)
                .with_metadata("len", len.to_string())
                .with_metadata("max", max.to_string()),
        }
    }
}

fn parse_optional_trimmed_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Box<str>>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }
    Ok(Some(trimmed.into()))
}

fn parse_optional_u64(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<u64>, EnvParseError> {
    let Some(trimmed) = parse_optional_trimmed_string(map, var)? else {
        return Ok(None);
    };
    trimmed
        .parse::<u64>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidInt {
            var,
            value: trimmed.into_string(),
        })
}

fn parse_optional_u32(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<u32>, EnvParseError> {
    let Some(trimmed) = parse_optional_trimmed_string(map, var)? else {
        return Ok(None);
    };
    trimmed
        .parse::<u32>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidInt {
            var,
            value: trimmed.into_string(),
        })
}

fn parse_optional_negation(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<NegationMode>, EnvParseError> {
    let Some(trimmed) = parse_optional_trimmed_string(map, var)? else {
        return Ok(None);
    };
    NegationMode::parse(&trimmed)
        .map(Some)
        .ok_or_else(|| EnvParseError::InvalidEnum {
            var,
            value: trimmed.into_string(),
        })
}

/// An empty value clears the configured patterns; entries keep their order.
fn parse_optional_csv_patterns(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Vec<Box<str>>>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };

    let items: Vec<Box<str>> = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(Into::into)
        .collect();
    if items.len() > MAX_CSV_ITEMS {
        return Err(EnvParseError::CsvTooLarge {
            var,
            len: items.len(),
            max: MAX_CSV_ITEMS,
        });
    }
    Ok(Some(items))
}
