//! Logger wiring driven by `FLATSNAP_LOG_*` environment variables.

use flatsnap_adapters::{JsonLogger, LogSink, StderrLogSink};
use flatsnap_ports::{LogFields, LogLevel, LoggerPort};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Enables JSON logs on stderr when set to `json`.
pub const LOG_FORMAT_ENV: &str = "FLATSNAP_LOG_FORMAT";
/// Minimum level: `debug`, `info`, `warn`, or `error`.
pub const LOG_LEVEL_ENV: &str = "FLATSNAP_LOG_LEVEL";

/// Optional ports shared by every command.
#[derive(Clone, Default)]
pub struct Observability {
    /// Structured logger, present only when enabled.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

impl Observability {
    /// Build from the process environment.
    #[must_use]
    pub fn from_std_env() -> Self {
        let env: BTreeMap<String, String> = std::env::vars()
            .filter(|(key, _)| key == LOG_FORMAT_ENV || key == LOG_LEVEL_ENV)
            .collect();
        Self::from_map(&env, Arc::new(StderrLogSink))
    }

    /// Build from an env map, writing to the provided sink.
    #[must_use]
    pub fn from_map(env: &BTreeMap<String, String>, sink: Arc<dyn LogSink>) -> Self {
        let enabled = env
            .get(LOG_FORMAT_ENV)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("json"));
        if !enabled {
            return Self::default();
        }

        let level = env
            .get(LOG_LEVEL_ENV)
            .and_then(|value| LogLevel::parse(value))
            .unwrap_or_default();
        Self {
            logger: Some(Arc::new(JsonLogger::new(sink).with_min_level(level))),
        }
    }

    /// Logger tagged with the running command.
    #[must_use]
    pub fn scoped_logger(&self, command: &str) -> Option<Arc<dyn LoggerPort>> {
        let logger = self.logger.as_ref()?;
        let mut fields = LogFields::new();
        fields.insert(
            "command".to_owned().into_boxed_str(),
            Value::String(command.to_owned()),
        );
        Some(Arc::from(logger.child(fields)))
    }
}
