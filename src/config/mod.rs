use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::ClientError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub realtime: RealtimeConfig,
    pub ui: UiConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    pub ws_url: String,
    pub reconnect_delay_ms: u64,
    pub heartbeat_incoming_ms: u64,
    pub heartbeat_outgoing_ms: u64,
    pub event_buffer: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub language: String,
    pub notice_duration_ms: u64,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for the durable key/value file; `None` uses `$HOME/.config/cirquetask/client`
    pub dir: Option<PathBuf>,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("CIRQUE_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    /// Development defaults pointed at an explicit backend, used by tests and embedders
    pub fn for_endpoints(api_url: impl Into<String>, ws_url: impl Into<String>) -> Self {
        let mut config = Self::development();
        config.api.base_url = api_url.into();
        config.realtime.ws_url = ws_url.into();
        config
    }

    fn with_env_overrides(mut self) -> Self {
        // API overrides
        if let Ok(v) = env::var("CIRQUE_API_URL") {
            self.api.base_url = v;
        }
        if let Ok(v) = env::var("CIRQUE_REQUEST_TIMEOUT_SECS") {
            self.api.request_timeout_secs = v.parse().unwrap_or(self.api.request_timeout_secs);
        }

        // Realtime overrides
        if let Ok(v) = env::var("CIRQUE_WS_URL") {
            self.realtime.ws_url = v;
        }
        if let Ok(v) = env::var("CIRQUE_RECONNECT_DELAY_MS") {
            self.realtime.reconnect_delay_ms = v.parse().unwrap_or(self.realtime.reconnect_delay_ms);
        }
        if let Ok(v) = env::var("CIRQUE_HEARTBEAT_INCOMING_MS") {
            self.realtime.heartbeat_incoming_ms = v.parse().unwrap_or(self.realtime.heartbeat_incoming_ms);
        }
        if let Ok(v) = env::var("CIRQUE_HEARTBEAT_OUTGOING_MS") {
            self.realtime.heartbeat_outgoing_ms = v.parse().unwrap_or(self.realtime.heartbeat_outgoing_ms);
        }
        if let Ok(v) = env::var("CIRQUE_EVENT_BUFFER") {
            self.realtime.event_buffer = v.parse().unwrap_or(self.realtime.event_buffer);
        }

        // UI overrides
        if let Ok(v) = env::var("CIRQUE_LANGUAGE") {
            self.ui.language = v;
        }
        if let Ok(v) = env::var("CIRQUE_NOTICE_DURATION_MS") {
            self.ui.notice_duration_ms = v.parse().unwrap_or(self.ui.notice_duration_ms);
        }
        if let Ok(v) = env::var("CIRQUE_LOG_LEVEL") {
            self.ui.log_level = v;
        }

        // Storage overrides
        if let Ok(v) = env::var("CIRQUE_STORAGE_DIR") {
            self.storage.dir = Some(PathBuf::from(v));
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:8080/api".to_string(),
                request_timeout_secs: 30,
            },
            realtime: RealtimeConfig {
                ws_url: "ws://localhost:8080/ws".to_string(),
                reconnect_delay_ms: 5000,
                heartbeat_incoming_ms: 4000,
                heartbeat_outgoing_ms: 4000,
                event_buffer: 256,
            },
            ui: UiConfig {
                language: "tr".to_string(),
                notice_duration_ms: 5000,
                log_level: "debug".to_string(),
            },
            storage: StorageConfig { dir: None },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://staging.example.com/api".to_string(),
                request_timeout_secs: 20,
            },
            realtime: RealtimeConfig {
                ws_url: "wss://staging.example.com/ws".to_string(),
                reconnect_delay_ms: 5000,
                heartbeat_incoming_ms: 4000,
                heartbeat_outgoing_ms: 4000,
                event_buffer: 256,
            },
            ui: UiConfig {
                language: "tr".to_string(),
                notice_duration_ms: 5000,
                log_level: "info".to_string(),
            },
            storage: StorageConfig { dir: None },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://app.example.com/api".to_string(),
                request_timeout_secs: 15,
            },
            realtime: RealtimeConfig {
                ws_url: "wss://app.example.com/ws".to_string(),
                reconnect_delay_ms: 5000,
                heartbeat_incoming_ms: 4000,
                heartbeat_outgoing_ms: 4000,
                event_buffer: 512,
            },
            ui: UiConfig {
                language: "tr".to_string(),
                notice_duration_ms: 5000,
                log_level: "warn".to_string(),
            },
            storage: StorageConfig { dir: None },
        }
    }

    pub fn api_url(&self) -> Result<Url, ClientError> {
        Ok(Url::parse(&self.api.base_url)?)
    }

    pub fn ws_url(&self) -> Result<Url, ClientError> {
        Ok(Url::parse(&self.realtime.ws_url)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.ui.notice_duration_ms)
    }
}

impl RealtimeConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

// Process-wide config for the CLI binary; library types take a ClientConfig explicitly
pub static CONFIG: Lazy<ClientConfig> = Lazy::new(ClientConfig::from_env);

pub fn config() -> &'static ClientConfig {
    &CONFIG
}
