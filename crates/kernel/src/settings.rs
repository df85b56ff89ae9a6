use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "BOOKTRACK_ENV";
const CONFIG_DIR_ENV: &str = "BOOKTRACK_CONFIG_DIR";

/// Deployment environment the client is pointed at.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub ui: UiSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, and environment overlay.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .with_context(|| "unable to resolve current directory")?
                .join("config"),
        };

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix("BOOKTRACK")
                    .prefix_separator("_")
                    .separator("__"),
            );

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.environment = environment.parse()?;

        Ok(settings)
    }
}

/// Where the library backend lives and how long to wait for it.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "ApiSettings::default_base_url")]
    pub base_url: String,
    #[serde(default = "ApiSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ApiSettings {
    fn default_base_url() -> String {
        "http://127.0.0.1:8000".to_string()
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            request_timeout_ms: Self::default_request_timeout_ms(),
        }
    }
}

/// Knobs shared by the view controllers.
#[derive(Debug, Clone, Deserialize)]
pub struct UiSettings {
    #[serde(default = "UiSettings::default_search_debounce_ms")]
    pub search_debounce_ms: u64,
    #[serde(default = "UiSettings::default_add_reset_ms")]
    pub add_reset_ms: u64,
    #[serde(default = "UiSettings::default_placeholder_thumbnail")]
    pub placeholder_thumbnail: String,
    #[serde(default = "UiSettings::default_description_limit")]
    pub description_limit: usize,
}

impl UiSettings {
    fn default_search_debounce_ms() -> u64 {
        300
    }

    fn default_add_reset_ms() -> u64 {
        1200
    }

    fn default_placeholder_thumbnail() -> String {
        "/static/placeholder.png".to_string()
    }

    fn default_description_limit() -> usize {
        160
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn add_reset(&self) -> Duration {
        Duration::from_millis(self.add_reset_ms)
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            search_debounce_ms: Self::default_search_debounce_ms(),
            add_reset_ms: Self::default_add_reset_ms(),
            placeholder_thumbnail: Self::default_placeholder_thumbnail(),
            description_limit: Self::default_description_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default = "TelemetrySettings::default_filter")]
    pub filter: String,
}

impl TelemetrySettings {
    fn default_filter() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            filter: Self::default_filter(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
