use async_trait::async_trait;
use fbk_types::FeedbackPayload;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{SinkError, SinkResult};
use crate::sink::FeedbackSink;

/// Posts each payload as JSON to the project's feedback endpoint.
#[derive(Clone, Debug)]
pub struct HttpSink {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpSink {
    pub fn new(config: &ClientConfig, api_key: impl Into<String>) -> SinkResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client,
            endpoint: config.feedback_url(),
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl FeedbackSink for HttpSink {
    async fn submit(&self, payload: FeedbackPayload) -> SinkResult<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                reason: status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string(),
            });
        }

        debug!(
            session = %payload.session_id,
            vote = %payload.vote,
            status = status.as_u16(),
            "feedback submitted"
        );
        Ok(())
    }
}
