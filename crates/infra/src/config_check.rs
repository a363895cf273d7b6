//! Config loading helpers for CLI surfaces.

use crate::{InfraResult, validate_env_parsing};
use flatsnap_config::{
    ValidatedSnapshotConfig, discover_config_path, load_snapshot_config_from_path, to_pretty_json,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Pick the config file: the explicit path, or `.flatsnap.toml` in `cwd`.
#[must_use]
pub fn resolve_config_path(config_path: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    config_path.map_or_else(|| discover_config_path(cwd), |path| Some(path.to_path_buf()))
}

/// Load and validate the effective config from an env map and optional file.
pub fn load_effective_config(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
) -> InfraResult<ValidatedSnapshotConfig> {
    let env = validate_env_parsing(env)?;
    load_snapshot_config_from_path(config_path, &env)
}

/// Load and validate the effective config, returning deterministic pretty JSON.
pub fn load_effective_config_json(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
) -> InfraResult<String> {
    let config = load_effective_config(env, config_path)?;
    to_pretty_json(&config)
}
