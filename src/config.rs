use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::model::MappingConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub engine: EngineConfig,
    pub template: TemplateConfig,
    pub mapping: MappingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub base_url: String,
    pub poll_interval_secs: f64,
    pub timeout_ms: u64,
    /// Per-call bound on each `/prompt` and `/history` request.
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8188".to_string(),
            poll_interval_secs: 2.0,
            timeout_ms: 300_000,
            request_timeout_secs: 60,
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            path: "/workspace/workflows/flux-text2img.json".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs_f64(self.poll_interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional `relay` config file and
    /// `RELAY_`-prefixed environment variables (nested keys split on `__`,
    /// e.g. `RELAY_ENGINE__BASE_URL`, `RELAY_MAPPING__SEED__NODE_ID`).
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        config = config.add_source(config::File::with_name("relay").required(false));

        config = config.add_source(
            config::Environment::with_prefix("RELAY")
                .prefix_separator("_")
                .separator("__"),
        );

        let app_config: AppConfig = config.build()?.try_deserialize()?;
        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.engine.poll_interval_secs.is_finite() && self.engine.poll_interval_secs > 0.0) {
            anyhow::bail!(
                "engine.poll_interval_secs must be a positive number, got {}",
                self.engine.poll_interval_secs
            );
        }
        if self.engine.timeout_ms == 0 {
            anyhow::bail!("engine.timeout_ms must be greater than zero");
        }
        if self.engine.request_timeout_secs == 0 {
            anyhow::bail!("engine.request_timeout_secs must be greater than zero");
        }
        reqwest::Url::parse(&self.engine.base_url).map_err(|e| {
            anyhow::anyhow!("engine.base_url '{}' is not a URL: {}", self.engine.base_url, e)
        })?;
        if self.template.path.trim().is_empty() {
            anyhow::bail!("template.path must not be empty");
        }
        self.mapping.validate().map_err(anyhow::Error::msg)?;
        Ok(())
    }

    /// Get the server bind address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
