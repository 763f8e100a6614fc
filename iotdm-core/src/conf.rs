/*
    Copyright 2025 MydriaTech AB

    Licensed under the Apache License 2.0 with Free world makers exception
    1.0.0 (the "License"); you may not use this file except in compliance with
    the License. You should have obtained a copy of the License with the source
    or binary distribution in file named

        LICENSE-Apache-2.0-with-FWM-Exception-1.0.0

    Unless required by applicable law or agreed to in writing, software
    distributed under the License is distributed on an "AS IS" BASIS,
    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
    See the License for the specific language governing permissions and
    limitations under the License.
*/


//! Parsing of application configuration.

mod alarm_config;
mod api_config;
mod backend_config;

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use config::builder::BuilderState;
use serde::Deserialize;
use serde::Serialize;

pub use self::alarm_config::AlarmConfig;
pub use self::api_config::ApiConfig;
pub use self::backend_config::BackendConfig;

/// Package name reported by Cargo at build time.
const CARGO_PKG_NAME: &str = env!("CARGO_PKG_NAME");
/// Package version reported by Cargo at build time.
const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Static trait for tracking implementations.
trait AppConfigDefaults {
    fn set_defaults<T: BuilderState>(
        config_builder: ConfigBuilder<T>,
        prefix: &str,
    ) -> ConfigBuilder<T>;
}

/**
Application configration root.

The application name defaults to the Rust package name, but can be overridden
with the environment variable `APP_NAME`.

Configuration will be loaded from

1. the file `{application name}.json` in the current working directory.
2. environment variable overrides in the form
   `{APPLICATION_NAME}_MODULE_CONFIGKEYWITHOUTSPACES`
 */
#[derive(Debug, Deserialize, Serialize)]
pub struct AppConfig {
    /// Configuration of the exposed REST API.
    pub api: ApiConfig,
    /// Configuration for the collaborator backends.
    pub backend: BackendConfig,
    /// Configuration of the alarm history service.
    pub alarm: AlarmConfig,

    /// Lower case application name. Ignored when loading configuration.
    #[serde(skip_deserializing)]
    app_name: String,
}

impl AppConfig {
    /// The application name defaults to the Rust package name, but can be
    /// overridden with the environment variable `APP_NAME`.
    fn read_app_name_lowercase(cargo_pkg_name: &str) -> String {
        std::env::var("APP_NAME")
            .map_err(|e| {
                log::debug!(
                    "Environment variable APP_NAME: {e:?} -> Default app name '{cargo_pkg_name}' will be used."
                );
            })
            .ok()
            .map(|value| value.to_lowercase())
            .unwrap_or(cargo_pkg_name.to_owned())
    }

    /// Lower case application name.
    pub fn app_name_lowercase(&self) -> &str {
        &self.app_name
    }

    /// SemVer application version derived fromt the Rust package version.
    pub fn app_version(&self) -> &'static str {
        CARGO_PKG_VERSION
    }

    /// Return a configuration builder pre-populated with all defaults.
    fn builder_with_defaults() -> ConfigBuilder<config::builder::DefaultState> {
        let mut config_builder = Config::builder();
        config_builder = ApiConfig::set_defaults(config_builder, "api");
        config_builder = BackendConfig::set_defaults(config_builder, "backend");
        config_builder = AlarmConfig::set_defaults(config_builder, "alarm");
        config_builder
    }

    /** Creates a new instance pre-populated with defaults, an optional
    configurations file and environment variable overrides.

    Use `env!("CARGO_PKG_NAME")` as `cargo_pkg_name`.
    */
    pub fn new(cargo_pkg_name: &str) -> Result<Self, ConfigError> {
        let app_name = Self::read_app_name_lowercase(cargo_pkg_name);
        let config_filename = app_name.to_owned() + ".json";
        let config_env_prefix = &app_name.to_uppercase();
        let conf_file = std::env::current_dir()
            .map_err(|e| ConfigError::Message(format!("No working directory: {e}")))?
            .join(config_filename);
        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "Will load '{}' configuration if present.",
                conf_file.display()
            );
        }
        let config = Self::builder_with_defaults()
            .add_source(File::from(conf_file).required(false))
            .add_source(
                Environment::with_prefix(config_env_prefix).separator("_"),
            )
            .build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;
        app_config.app_name = app_name;
        log::info!("Running with configuration: {app_config:?}");
        Ok(app_config)
    }

    /// Return a new instance using only defaults.
    pub fn with_defaults() -> Self {
        Self::builder_with_defaults()
            .build()
            .and_then(Config::try_deserialize::<AppConfig>)
            .map(|mut app_config| {
                app_config.app_name = CARGO_PKG_NAME.to_owned();
                app_config
            })
            .expect("Built-in configuration defaults must always be valid.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let app_config = AppConfig::with_defaults();
        assert_eq!(app_config.api.bind_address(), "0.0.0.0");
        assert_eq!(app_config.api.bind_port(), 8080);
        assert!(app_config.api.workers() > 0);
        assert_eq!(app_config.backend.implementation(), "mem");
        assert!(app_config.backend.endpoints().is_empty());
        assert_eq!(app_config.backend.index_prefix(), "");
        assert_eq!(app_config.alarm.schema_init_timeout().as_secs(), 10);
        assert_eq!(app_config.app_name_lowercase(), CARGO_PKG_NAME);
    }
}
