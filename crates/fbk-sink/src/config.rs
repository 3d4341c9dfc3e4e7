use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SinkError, SinkResult};

pub const DEFAULT_BASE_URL: &str = "https://api.kelet.ai";

/// Environment variable consulted for the API key when none is configured.
pub const API_KEY_ENV: &str = "FBK_API_KEY";

/// Connection settings for the feedback collection endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    /// Project the feedback is filed under.
    pub project: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            project: String::new(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

impl ClientConfig {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn from_toml_str(text: &str) -> SinkResult<Self> {
        toml::from_str(text).map_err(|e| SinkError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> SinkResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Fill a missing API key from [`API_KEY_ENV`].
    pub fn with_env_fallback(mut self) -> Self {
        if self.api_key.is_none() {
            self.api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// `POST` target for feedback on this project.
    pub fn feedback_url(&self) -> String {
        format!(
            "{}/projects/{}/feedback",
            self.base_url.trim_end_matches('/'),
            self.project
        )
    }
}
