//! Environment validation helpers for CLI surfaces.

use flatsnap_config::{SnapshotConfig, SnapshotEnv, apply_env_overrides};
use flatsnap_shared::ErrorEnvelope;
use std::collections::BTreeMap;

/// Infra-level error type (shared error envelope).
pub type InfraError = ErrorEnvelope;

/// Infra-level result type.
pub type InfraResult<T> = Result<T, InfraError>;

/// Parse `FLATSNAP_*` overrides from a map and check they merge into a valid config.
pub fn validate_env_parsing(env: &BTreeMap<String, String>) -> InfraResult<SnapshotEnv> {
    let parsed = SnapshotEnv::from_map(env).map_err(ErrorEnvelope::from)?;
    apply_env_overrides(SnapshotConfig::default(), &parsed)?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatsnap_shared::ErrorCode;

    #[test]
    fn rejects_unknown_negation_mode() {
        let env = BTreeMap::from([(
            "FLATSNAP_IGNORE_NEGATION".to_owned(),
            "sometimes".to_owned(),
        )]);
        let error = validate_env_parsing(&env).err();
        assert_eq!(
            error.map(|error| error.code),
            Some(ErrorCode::new("config", "invalid_env_enum"))
        );
    }

    #[test]
    fn accepts_empty_env() -> InfraResult<()> {
        let env = validate_env_parsing(&BTreeMap::new())?;
        assert!(env.is_empty());
        Ok(())
    }
}
