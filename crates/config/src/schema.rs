//! Snapshot configuration schema, defaults, validation, and normalization.
//!
//! - Deserialization uses `serde` (JSON or TOML).
//! - Validation is manual and returns typed errors mapped to `ErrorEnvelope`.
//! - Normalization trims string fields; ignore pattern order is preserved
//!   because it is significant for negation.

use flatsnap_domain::{DEFAULT_IGNORE_FILE_NAME, NegationMode};
use flatsnap_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current supported configuration schema version.
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Archive written by `create` when no output is given.
pub const DEFAULT_OUTPUT_PATH: &str = "./current.snapshot";

const SCAN_MAX_FILES_MIN: u32 = 1;
const SCAN_MAX_FILES_MAX: u32 = 10_000_000;
const SCAN_MAX_FILES_DEFAULT: u32 = 1_000_000;
const SCAN_MAX_FILE_SIZE_MIN_BYTES: u64 = 1;
const SCAN_MAX_FILE_SIZE_MAX_BYTES: u64 = 1_000_000_000;
const SCAN_MAX_FILE_SIZE_DEFAULT_BYTES: u64 = 10_000_000;

const IGNORE_PATTERNS_MAX: usize = 512;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct SnapshotConfig {
    /// Schema version for forward-compatible migrations.
    pub version: u32,
    /// Archive output settings.
    pub archive: ArchiveConfig,
    /// Ignore-pattern settings.
    pub ignore: IgnoreConfig,
    /// Tree scanning limits.
    pub scan: ScanConfig,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            archive: ArchiveConfig::default(),
            ignore: IgnoreConfig::default(),
            scan: ScanConfig::default(),
        }
    }
}

impl SnapshotConfig {
    /// Validate and normalize the config.
    pub fn validate_and_normalize(mut self) -> Result<ValidatedSnapshotConfig, ConfigSchemaError> {
        if self.version != CURRENT_CONFIG_VERSION {
            return Err(ConfigSchemaError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_CONFIG_VERSION,
            });
        }

        self.archive.normalize_and_validate()?;
        self.ignore.normalize_and_validate()?;
        self.scan.validate()?;
        Ok(ValidatedSnapshotConfig { raw: self })
    }
}

/// Config that has passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSnapshotConfig {
    raw: SnapshotConfig,
}

impl ValidatedSnapshotConfig {
    /// Borrow the raw config.
    #[must_use]
    pub const fn as_ref(&self) -> &SnapshotConfig {
        &self.raw
    }

    /// Consume the wrapper and return the raw config.
    #[must_use]
    pub fn into_inner(self) -> SnapshotConfig {
        self.raw
    }
}

impl AsRef<SnapshotConfig> for ValidatedSnapshotConfig {
    fn as_ref(&self) -> &SnapshotConfig {
        &self.raw
    }
}

impl std::ops::Deref for ValidatedSnapshotConfig {
    type Target = SnapshotConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

/// Parse a config from a JSON string, applying validation and normalization.
pub fn parse_snapshot_config_json(input: &str) -> Result<ValidatedSnapshotConfig, ErrorEnvelope> {
    let config: SnapshotConfig = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}

/// Parse a config from a TOML string, applying validation and normalization.
pub fn parse_snapshot_config_toml(input: &str) -> Result<ValidatedSnapshotConfig, ErrorEnvelope> {
    let config: SnapshotConfig = toml::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_toml"),
            format!("invalid config TOML: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}

/// Archive output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ArchiveConfig {
    /// Output path used by `create` when none is given.
    pub default_output: Box<str>,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            default_output: DEFAULT_OUTPUT_PATH.into(),
        }
    }
}

impl ArchiveConfig {
    fn normalize_and_validate(&mut self) -> Result<(), ConfigSchemaError> {
        normalize_boxed_str(&mut self.default_output);
        if self.default_output.is_empty() {
            return Err(ConfigSchemaError::EmptyValue {
                section: "archive",
                field: "defaultOutput",
            });
        }
        Ok(())
    }
}

/// Ignore-pattern configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct IgnoreConfig {
    /// Ignore file name looked up at the archive root.
    pub file_name: Box<str>,
    /// Extra patterns evaluated before the ignore file's patterns.
    pub patterns: Vec<Box<str>>,
    /// Negation handling.
    pub negation: NegationMode,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_IGNORE_FILE_NAME.into(),
            patterns: Vec::new(),
            negation: NegationMode::default(),
        }
    }
}

impl IgnoreConfig {
    fn normalize_and_validate(&mut self) -> Result<(), ConfigSchemaError> {
        normalize_boxed_str(&mut self.file_name);
        if !is_single_segment(&self.file_name) {
            return Err(ConfigSchemaError::InvalidIgnoreFileName {
                name: self.file_name.to_string(),
            });
        }

        self.patterns = normalize_ignore_patterns(&self.patterns)?;
        if self.patterns.len() > IGNORE_PATTERNS_MAX {
            return Err(ConfigSchemaError::ListTooLarge {
                section: "ignore",
                field: "patterns",
                len: self.patterns.len(),
                max: IGNORE_PATTERNS_MAX,
            });
        }
        Ok(())
    }
}

/// Tree scanning limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ScanConfig {
    /// Files larger than this are skipped.
    pub max_file_size_bytes: u64,
    /// Maximum number of files archived in one run.
    pub max_files: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: SCAN_MAX_FILE_SIZE_DEFAULT_BYTES,
            max_files: SCAN_MAX_FILES_DEFAULT,
        }
    }
}

impl ScanConfig {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        validate_limit_u64(
            "scan",
            "maxFileSizeBytes",
            self.max_file_size_bytes,
            SCAN_MAX_FILE_SIZE_MIN_BYTES,
            SCAN_MAX_FILE_SIZE_MAX_BYTES,
        )?;
        validate_limit_u64(
            "scan",
            "maxFiles",
            u64::from(self.max_files),
            u64::from(SCAN_MAX_FILES_MIN),
            u64::from(SCAN_MAX_FILES_MAX),
        )
    }
}

/// Typed validation errors for the configuration schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSchemaError {
    /// The config version is not supported by this binary.
    UnsupportedVersion {
        /// Version found in the config.
        found: u32,
        /// Version supported by this crate.
        supported: u32,
    },
    /// A numeric limit is out of bounds.
    LimitOutOfRange {
        /// Schema section (e.g. `scan`).
        section: &'static str,
        /// Field name in the config file (e.g. `maxFiles`).
        field: &'static str,
        /// Value provided.
        value: u64,
        /// Minimum allowed value.
        min: u64,
        /// Maximum allowed value.
        max: u64,
    },
    /// A list field exceeds the maximum allowed size.
    ListTooLarge {
        /// Schema section (e.g. `ignore`).
        section: &'static str,
        /// Field name in the config file (e.g. `patterns`).
        field: &'static str,
        /// Number of entries after normalization.
        len: usize,
        /// Maximum allowed number of entries.
        max: usize,
    },
    /// A required string is empty after trimming.
    EmptyValue {
        /// Schema section.
        section: &'static str,
        /// Field name in the config file.
        field: &'static str,
    },
    /// The ignore file name is empty or contains a separator.
    InvalidIgnoreFileName {
        /// Invalid name.
        name: String,
    },
    /// An ignore pattern entry is blank.
    InvalidIgnorePattern {
        /// Invalid ignore pattern value.
        pattern: String,
    },
}

impl ConfigSchemaError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedVersion { .. } => ErrorCode::new("config", "unsupported_version"),
            Self::LimitOutOfRange { .. } => ErrorCode::new("config", "invalid_limit"),
            Self::ListTooLarge { .. } => ErrorCode::new("config", "list_too_large"),
            Self::EmptyValue { .. } => ErrorCode::new("config", "empty_value"),
            Self::InvalidIgnoreFileName { .. } => {
                ErrorCode::new("config", "invalid_ignore_file_name")
            },
            Self::InvalidIgnorePattern { .. } => ErrorCode::new("config", "invalid_ignore_pattern"),
        }
    }
}

impl fmt::Display for ConfigSchemaError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found, supported } => {
                write!(
                    formatter,
                    "unsupported config version: {found} (supported: {supported})"
                )
            },
            Self::LimitOutOfRange {
                section,
                field,
                value,
                min,
                max,
            } => write!(
                formatter,
                "{section}.{field} must be within [{min}, {max}] (got {value})"
            ),
            Self::ListTooLarge {
                section,
                field,
                len,
                max,
            } => write!(
                formatter,
                "{section}.{field} must have at most {max} entries (got {len})"
            ),
            Self::EmptyValue { section, field } => {
                write!(formatter, "{section}.{field} must not be empty")
            },
            Self::InvalidIgnoreFileName { name } => {
                write!(formatter, "invalid ignore file name: {name:?}")
            },
            Self::InvalidIgnorePattern { pattern } => {
                write!(formatter, "invalid ignore pattern entry: {pattern:?}")
            },
        }
    }
}

impl std::error::Error for ConfigSchemaError {}

impl From<ConfigSchemaError> for ErrorEnvelope {
    fn from(error: ConfigSchemaError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            ConfigSchemaError::UnsupportedVersion { found, supported } => envelope
                .with_metadata("found", found.to_string())
                .with_metadata("supported", supported.to_string()),
            ConfigSchemaError::LimitOutOfRange {
                section,
                field,
                value,
                min,
                max,
            } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field)
                .with_metadata("value", value.to_string())
                .with_metadata("min", min.to_string())
                .with_metadata("max", max.to_string()),
            ConfigSchemaError::ListTooLarge {
                section,
                field,
                len,
                max,
            } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field)
                .with_metadata("len", len.to_string())
                .with_metadata("max", max.to_string()),
            ConfigSchemaError::EmptyValue { section, field } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field),
            ConfigSchemaError::InvalidIgnoreFileName { name } => {
                envelope.with_metadata("name", name)
            },
            ConfigSchemaError::InvalidIgnorePattern { pattern } => {
                envelope.with_metadata("pattern", pattern)
            },
        }
    }
}

const fn validate_limit_u64(
    section: &'static str,
    field: &'static str,
    value: u64,
    min: u64,
    max: u64,
) -> Result<(), ConfigSchemaError> {
    if value < min || value > max {
        return Err(ConfigSchemaError::LimitOutOfRange {
            section,
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

fn normalize_boxed_str(value: &mut Box<str>) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.into();
    }
}

fn is_single_segment(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

fn normalize_ignore_patterns(input: &[Box<str>]) -> Result<Vec<Box<str>>, ConfigSchemaError> {
    input
        .iter()
        .map(|pattern| {
            let trimmed = pattern.trim();
            if trimmed.is_empty() {
                return Err(ConfigSchemaError::InvalidIgnorePattern {
                    pattern: pattern.to_string(),
                });
            }
            Ok(trimmed.into())
        })
        .collect()
}
