//! Integration tests for parsing config fixtures.

use flatsnap_config::{
    CURRENT_CONFIG_VERSION, NegationMode, parse_snapshot_config_json, parse_snapshot_config_toml,
};
use flatsnap_shared::ErrorCode;
use std::error::Error;
use std::fs;
use std::path::Path;

fn read_fixture(name: &str) -> Result<String, Box<dyn Error>> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    Ok(fs::read_to_string(path)?)
}

#[test]
fn parses_valid_toml_fixture_and_normalizes() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("config.valid.toml")?;
    let config = parse_snapshot_config_toml(&contents)?;

    assert_eq!(config.version, CURRENT_CONFIG_VERSION);
    assert_eq!(
        config.archive.default_output.as_ref(),
        "./out/tree.snapshot",
        "output should be trimmed"
    );
    assert_eq!(config.ignore.file_name.as_ref(), ".archiveignore");
    assert_eq!(config.ignore.negation, NegationMode::LastMatchWins);

    let patterns: Vec<&str> = config.ignore.patterns.iter().map(AsRef::as_ref).collect();
    assert_eq!(patterns, vec!["target/", "*.log", "!keep.log"]);

    assert_eq!(config.scan.max_file_size_bytes, 65_536);
    assert_eq!(config.scan.max_files, 2_000);
    Ok(())
}

#[test]
fn invalid_fixture_reports_error_code() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("config.invalid.json")?;
    let error = parse_snapshot_config_json(&contents)
        .err()
        .ok_or_else(|| std::io::Error::other("expected invalid fixture error"))?;

    assert_eq!(error.code, ErrorCode::new("config", "invalid_limit"));
    assert_eq!(error.metadata.get("section").map(String::as_str), Some("scan"));
    assert_eq!(error.metadata.get("field").map(String::as_str), Some("maxFiles"));
    Ok(())
}
