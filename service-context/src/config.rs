//! Context configuration is represented by [ContextConfig], which can be applied to a
//! [ServiceContextBuilder](crate::context::ServiceContextBuilder) with
//! [with_config](crate::context::ServiceContextBuilder::with_config).
//!
//! By default, the config is created with opinionated default values, which can then be overwritten
//! by environment variables prefixed with `SCTX_` (e.g. `SCTX_LOG_LEVEL=debug`) or the
//! `service-context.json` file.

use crate::context::{DuplicatePolicy, Environment, ShutdownOrder};
use config::{Config, ConfigError, Environment as EnvironmentSource, File};
use serde::Deserialize;
use service_context_log::{must_parse_severity, LogConfig, DEFAULT_BASE_PREFIX};

const CONFIG_ENV_PREFIX: &str = "SCTX";

/// Name of the default config file.
pub const CONFIG_FILE: &str = "service-context.json";

/// Context configuration.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContextConfig {
    /// Application name. Keeps the builder name when not set.
    pub name: Option<String>,
    pub environment: Environment,
    /// Minimum log level: trace | debug | info | warn | error | fatal | panic.
    pub log_level: String,
    /// Base prefix of all loggers.
    pub log_prefix: String,
    /// Should a default tracing logger be installed when the context loads.
    pub install_tracing_logger: bool,
    pub shutdown_order: ShutdownOrder,
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            name: None,
            environment: Environment::Dev,
            log_level: "info".to_string(),
            log_prefix: DEFAULT_BASE_PREFIX.to_string(),
            install_tracing_logger: true,
            shutdown_order: ShutdownOrder::Forward,
            duplicate_policy: DuplicatePolicy::Ignore,
        }
    }
}

impl From<OptionalContextConfig> for ContextConfig {
    fn from(value: OptionalContextConfig) -> Self {
        let default = Self::default();
        Self {
            name: value.name.or(default.name),
            environment: value.environment.unwrap_or(default.environment),
            log_level: value.log_level.unwrap_or(default.log_level),
            log_prefix: value.log_prefix.unwrap_or(default.log_prefix),
            install_tracing_logger: value
                .install_tracing_logger
                .unwrap_or(default.install_tracing_logger),
            shutdown_order: value.shutdown_order.unwrap_or(default.shutdown_order),
            duplicate_policy: value.duplicate_policy.unwrap_or(default.duplicate_policy),
        }
    }
}

impl ContextConfig {
    /// Reads the config from [CONFIG_FILE] and `SCTX_` environment variables, in that order.
    pub fn init_from_environment() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(EnvironmentSource::with_prefix(CONFIG_ENV_PREFIX))
            .build()
            .and_then(|config| config.try_deserialize::<OptionalContextConfig>())
            .map(|config| config.into())
    }

    /// Facility configuration. Panics on an unknown log level.
    pub fn log_config(&self) -> LogConfig {
        LogConfig::new(must_parse_severity(&self.log_level), self.log_prefix.clone())
    }
}

#[derive(Deserialize)]
struct OptionalContextConfig {
    name: Option<String>,
    environment: Option<Environment>,
    log_level: Option<String>,
    log_prefix: Option<String>,
    install_tracing_logger: Option<bool>,
    shutdown_order: Option<ShutdownOrder>,
    duplicate_policy: Option<DuplicatePolicy>,
}

#[cfg(test)]
mod tests {
    use crate::config::{ContextConfig, OptionalContextConfig};
    use crate::context::{DuplicatePolicy, Environment, ShutdownOrder};
    use service_context_log::Severity;

    #[test]
    fn should_fill_missing_values_with_defaults() {
        let config: ContextConfig = OptionalContextConfig {
            name: Some("app".to_string()),
            environment: Some(Environment::Prd),
            log_level: None,
            log_prefix: None,
            install_tracing_logger: Some(false),
            shutdown_order: Some(ShutdownOrder::Reverse),
            duplicate_policy: None,
        }
        .into();

        assert_eq!(config.name.as_deref(), Some("app"));
        assert_eq!(config.environment, Environment::Prd);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_prefix, "core");
        assert!(!config.install_tracing_logger);
        assert_eq!(config.shutdown_order, ShutdownOrder::Reverse);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Ignore);
    }

    #[test]
    fn should_convert_to_log_config() {
        let config = ContextConfig {
            log_level: "WARN".to_string(),
            log_prefix: "app".to_string(),
            ..Default::default()
        };

        let log_config = config.log_config();
        assert_eq!(log_config.level, Severity::Warn);
        assert_eq!(log_config.base_prefix, "app");
    }

    #[test]
    #[should_panic(expected = "Invalid log level: loud")]
    fn should_panic_on_invalid_log_level() {
        ContextConfig {
            log_level: "loud".to_string(),
            ..Default::default()
        }
        .log_config();
    }
}
