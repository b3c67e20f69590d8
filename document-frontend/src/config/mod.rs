use crate::services::workspace::{WorkspaceOptions, DEFAULT_REFRESH_DELAY};
use crate::state::DEFAULT_NOTIFICATION_TTL;
use crate::validation::DEFAULT_MAX_UPLOAD_BYTES;
use serde::Deserialize;
use service_core::config::{load_settings, ServerSettings, TelemetrySettings};
use service_core::error::AppError;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub documents: DocumentSettings,
}

/// Which document backend to talk to.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// Canned fixture data, no network.
    #[default]
    Mock,
    /// The real REST API at `backend.url`.
    Live,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    #[serde(default)]
    pub mode: BackendMode,
    #[serde(default = "default_backend_url")]
    pub url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Artificial delay applied by the fixture backend.
    #[serde(default = "default_mock_latency_ms")]
    pub mock_latency_ms: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            mode: BackendMode::default(),
            url: default_backend_url(),
            request_timeout_ms: default_request_timeout_ms(),
            mock_latency_ms: default_mock_latency_ms(),
        }
    }
}

fn default_backend_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_mock_latency_ms() -> u64 {
    500
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationSettings {
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            ttl_ms: default_ttl_ms(),
        }
    }
}

fn default_ttl_ms() -> u64 {
    DEFAULT_NOTIFICATION_TTL.as_millis() as u64
}

#[derive(Debug, Deserialize, Clone)]
pub struct DocumentSettings {
    /// Delay between an upload and the re-sync that picks up page counts.
    #[serde(default = "default_refresh_delay_ms")]
    pub refresh_delay_ms: u64,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            refresh_delay_ms: default_refresh_delay_ms(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_refresh_delay_ms() -> u64 {
    DEFAULT_REFRESH_DELAY.as_millis() as u64
}

fn default_max_upload_bytes() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}

impl Settings {
    pub fn workspace_options(&self) -> WorkspaceOptions {
        WorkspaceOptions {
            notification_ttl: Duration::from_millis(self.notifications.ttl_ms),
            refresh_delay: Duration::from_millis(self.documents.refresh_delay_ms),
            max_upload_bytes: self.documents.max_upload_bytes,
        }
    }
}

pub fn get_configuration() -> Result<Settings, AppError> {
    load_settings("document-frontend")
}
