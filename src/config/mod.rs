//! Engine configuration, loaded with the `config` crate.
mod sync;
pub use sync::*;


use std::env;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Prefix of environment variables overriding configuration values,
/// e.g. `TOPOLOGY__SYNC__BACKOFF_UNIT_MS=250`
const ENV_PREFIX: &str = "TOPOLOGY";

/// Settings of a [`TopologySync`](crate::TopologySync) engine.
///
/// Values come from, lowest priority first: the defaults below, the TOML
/// file named by `CONFIG_PATH`, then `TOPOLOGY__`-prefixed environment
/// variables.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TopologyConfig {
    /// Watch loop tuning
    #[serde(default)]
    pub sync: SyncConfig,
}

impl TopologyConfig {
    /// Builds the configuration from defaults, `CONFIG_PATH` and the
    /// environment.
    ///
    /// The result is not validated yet, so a host can still layer its own
    /// file on top with [`with_override_config`](Self::with_override_config).
    ///
    /// ```ignore
    /// std::env::set_var("TOPOLOGY__SYNC__BACKOFF_UNIT_MS", "250");
    /// let sync = TopologyConfig::new()?.validate()?.sync;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(Self::environment());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Layers the file at `path` over `self`.
    ///
    /// Environment variables are applied again afterwards and keep the last
    /// word. Not validated.
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(Self::environment())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Checks every section, handing `self` back when it is usable.
    pub fn validate(self) -> Result<Self> {
        self.sync.validate()?;
        Ok(self)
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .ignore_empty(true)
            .try_parsing(true)
    }
}
