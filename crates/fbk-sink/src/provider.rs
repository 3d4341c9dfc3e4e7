//! Ambient feedback context.
//!
//! A [`FeedbackProvider`] binds a project and API key to an HTTP sink.
//! Providers nest: a child names its own project and inherits the parent's
//! key unless it brings one. Code that merely *may* run under a provider
//! asks [`default_sink`] and gets a no-op sink when none is bound.

use std::sync::Arc;

use tracing::info;

use crate::config::ClientConfig;
use crate::error::{SinkError, SinkResult};
use crate::http::HttpSink;
use crate::sink::{FeedbackSink, NoOpSink};

#[derive(Clone, Debug)]
pub struct FeedbackProvider {
    config: ClientConfig,
    api_key: String,
    sink: Arc<HttpSink>,
}

impl FeedbackProvider {
    /// Bind a provider. Fails fast when no API key is available.
    pub fn new(config: ClientConfig) -> SinkResult<Self> {
        Self::with_parent(config, None)
    }

    /// Bind a provider nested under `parent`, inheriting its API key when
    /// `config` carries none.
    pub fn with_parent(config: ClientConfig, parent: Option<&FeedbackProvider>) -> SinkResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| parent.map(|p| p.api_key.clone()))
            .ok_or(SinkError::MissingApiKey)?;
        let sink = Arc::new(HttpSink::new(&config, api_key.clone())?);

        info!(project = %config.project, endpoint = %sink.endpoint(), "feedback provider bound");

        Ok(Self {
            config,
            api_key,
            sink,
        })
    }

    /// A child provider for another project under the same credentials.
    pub fn nested(&self, project: impl Into<String>) -> SinkResult<Self> {
        let config = ClientConfig {
            project: project.into(),
            api_key: None,
            ..self.config.clone()
        };
        Self::with_parent(config, Some(self))
    }

    pub fn project(&self) -> &str {
        &self.config.project
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn sink(&self) -> Arc<dyn FeedbackSink> {
        self.sink.clone()
    }
}

/// The bound provider's sink, or a [`NoOpSink`] when there is none.
pub fn default_sink(provider: Option<&FeedbackProvider>) -> Arc<dyn FeedbackSink> {
    match provider {
        Some(p) => p.sink(),
        None => Arc::new(NoOpSink),
    }
}
