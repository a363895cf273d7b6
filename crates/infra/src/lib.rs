//! # flatsnap-infra
//!
//! Infrastructure wiring and runtime composition.
//! This crate depends on `app`, `adapters`, `config`, and `shared`.

/// Local CLI orchestration helpers.
pub mod cli_local;
/// Config loading helpers used by CLI surfaces.
pub mod config_check;
/// Environment validation helpers used by CLI surfaces.
pub mod env_check;
/// Logger wiring from the environment.
pub mod observability;

pub use cli_local::{load_config, run_check_ignore_local, run_create_local, run_extract_local};
pub use config_check::{load_effective_config, load_effective_config_json, resolve_config_path};
pub use env_check::{InfraError, InfraResult, validate_env_parsing};
pub use observability::{LOG_FORMAT_ENV, LOG_LEVEL_ENV, Observability};

/// Returns the infra crate version.
#[must_use]
pub const fn infra_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
