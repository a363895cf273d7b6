//! Integration tests for env parsing and env-to-config merging.

use flatsnap_config::{EnvParseError, SnapshotConfig, SnapshotEnv, apply_env_overrides};
use flatsnap_shared::{ErrorCode, ErrorEnvelope};
use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::Path;

fn read_env_map(name: &str) -> Result<BTreeMap<String, String>, Box<dyn Error>> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[test]
fn env_fixture_merges_into_effective_config() -> Result<(), Box<dyn Error>> {
    let env = SnapshotEnv::from_map(&read_env_map("env.valid.json")?)?;
    let config = apply_env_overrides(SnapshotConfig::default(), &env)?;

    assert_eq!(config.archive.default_output.as_ref(), "build/all.snapshot");
    assert_eq!(config.ignore.file_name.as_ref(), ".gitignore");
    let patterns: Vec<&str> = config.ignore.patterns.iter().map(AsRef::as_ref).collect();
    assert_eq!(patterns, vec!["node_modules/", "dist/", "*.min.js"]);
    assert_eq!(config.scan.max_file_size_bytes, 1_048_576);
    assert_eq!(config.scan.max_files, 500);
    Ok(())
}

#[test]
fn invalid_env_fixture_is_rejected() -> Result<(), Box<dyn Error>> {
    let error = SnapshotEnv::from_map(&read_env_map("env.invalid.json")?).err();
    assert!(matches!(error, Some(EnvParseError::InvalidEnum { .. })));

    let envelope: ErrorEnvelope = error
        .ok_or_else(|| std::io::Error::other("expected invalid env error"))?
        .into();
    assert_eq!(envelope.code, ErrorCode::new("config", "invalid_env_enum"));
    Ok(())
}
