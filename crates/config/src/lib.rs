//! # flatsnap-config
//!
//! Configuration schema, validation, and normalization logic for the CLI.
//! This crate depends on `domain` and `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (env + file).
pub mod load;
/// Configuration schema types and helpers.
pub mod schema;

pub use flatsnap_domain::NegationMode;
pub use schema::{
    ArchiveConfig, CURRENT_CONFIG_VERSION, ConfigSchemaError, DEFAULT_OUTPUT_PATH, IgnoreConfig,
    ScanConfig, SnapshotConfig, ValidatedSnapshotConfig, parse_snapshot_config_json,
    parse_snapshot_config_toml,
};

pub use env::{EnvParseError, SnapshotEnv, apply_env_overrides};
pub use load::{
    ConfigFormat, DEFAULT_CONFIG_FILE_NAME, discover_config_path, load_snapshot_config_from_path,
    load_snapshot_config_from_sources, load_snapshot_config_std_env, to_pretty_json,
    to_pretty_toml,
};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
