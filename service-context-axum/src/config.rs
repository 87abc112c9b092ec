//! Server configuration is represented by [ServerConfig], which is either passed directly to an
//! [AxumComponent](crate::component::AxumComponent), or read when the component activates.
//!
//! By default, the config is created with opinionated default values, which can then be overwritten
//! by values from `service-context.json` file under the `web.<component id>` key.

use config::{Config, ConfigError, File};
use fxhash::FxHashMap;
use serde::Deserialize;
use service_context::config::CONFIG_FILE;

/// Server configuration.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerConfig {
    /// Address on which to listen.
    pub listen_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0:4000".to_string(),
        }
    }
}

impl From<OptionalServerConfig> for ServerConfig {
    fn from(value: OptionalServerConfig) -> Self {
        let default = Self::default();
        Self {
            listen_address: value.listen_address.unwrap_or(default.listen_address),
        }
    }
}

impl ServerConfig {
    pub fn new(listen_address: impl Into<String>) -> Self {
        Self {
            listen_address: listen_address.into(),
        }
    }

    /// Reads config of the server with given component id from [CONFIG_FILE].
    pub fn init_from_config(id: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .build()
            .and_then(|config| config.try_deserialize::<OptionalWebConfigWrapper>())
            .map(|config| Self::from_wrapper(config, id))
    }

    fn from_wrapper(wrapper: OptionalWebConfigWrapper, id: &str) -> Self {
        wrapper
            .web
            .and_then(|mut servers| servers.remove(id))
            .map(|config| config.into())
            .unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct OptionalServerConfig {
    listen_address: Option<String>,
}

#[derive(Deserialize)]
struct OptionalWebConfigWrapper {
    web: Option<FxHashMap<String, OptionalServerConfig>>,
}
