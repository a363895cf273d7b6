//! # flatsnap-ports
//!
//! Port traits for the flatsnap hexagonal architecture.
//!
//! This crate defines the interfaces between the use cases and the outside
//! world (filesystem, ignore matching, logging). It depends only on `domain`
//! and `shared`.

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod filesystem;
pub mod ignore;
pub mod logger;

pub use filesystem::*;
pub use ignore::*;
pub use logger::*;

// Re-export domain types used in port signatures, so adapter crates can
// implement ports without depending on `flatsnap-domain` directly.
pub use flatsnap_domain::{CandidatePath, IgnoreMatch, NegationMode, PatternSet, SafeRelativePath};

#[cfg(test)]
mod tests {
    use super::*;
    use flatsnap_domain::domain_crate_version;
    use flatsnap_shared::shared_crate_version;

    fn workspace_deps() -> Vec<String> {
        let cargo_toml = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));
        let mut in_deps = false;

        cargo_toml
            .lines()
            .filter_map(|raw_line| {
                let line = raw_line.split('#').next().unwrap_or("").trim();
                if line.starts_with('[') {
                    in_deps = line == "[dependencies]" || line == "[dev-dependencies]";
                    return None;
                }
                if !in_deps || !line.starts_with("flatsnap-") {
                    return None;
                }
                let key = line.split('=').next().unwrap_or("");
                Some(key.split('.').next().unwrap_or("").trim().to_owned())
            })
            .collect()
    }

    #[test]
    fn ports_depends_only_on_domain_and_shared() {
        let deps = workspace_deps();
        let allowed = ["flatsnap-domain", "flatsnap-shared"];

        for dep in &deps {
            assert!(
                allowed.contains(&dep.as_str()),
                "unexpected dependency found: {dep}"
            );
        }
        for expected in allowed {
            assert!(
                deps.iter().any(|dep| dep == expected),
                "missing dependency: {expected}"
            );
        }
    }

    #[test]
    fn ports_can_use_domain_and_shared() {
        assert!(!ports_crate_version().is_empty());
        assert!(!domain_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }
}
