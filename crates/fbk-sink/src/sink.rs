use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use fbk_types::FeedbackPayload;

use crate::error::SinkResult;

/// Delivers feedback payloads somewhere: a collection endpoint, a log, a test
/// buffer.
///
/// Callers treat submission as fire-and-forget. An error is reported to
/// whoever drives the sink; it is never retried.
#[async_trait]
pub trait FeedbackSink: Send + Sync {
    async fn submit(&self, payload: FeedbackPayload) -> SinkResult<()>;
}

#[async_trait]
impl<S: FeedbackSink + ?Sized> FeedbackSink for Arc<S> {
    async fn submit(&self, payload: FeedbackPayload) -> SinkResult<()> {
        (**self).submit(payload).await
    }
}

/// Sink used when no provider is bound. Accepts and drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpSink;

#[async_trait]
impl FeedbackSink for NoOpSink {
    async fn submit(&self, _payload: FeedbackPayload) -> SinkResult<()> {
        Ok(())
    }
}

/// Sink that keeps every payload in memory, in submission order.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    payloads: Arc<Mutex<Vec<FeedbackPayload>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything submitted so far.
    pub fn payloads(&self) -> Vec<FeedbackPayload> {
        self.payloads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.payloads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove and return everything submitted so far.
    pub fn drain(&self) -> Vec<FeedbackPayload> {
        std::mem::take(
            &mut *self
                .payloads
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }
}

#[async_trait]
impl FeedbackSink for MemorySink {
    async fn submit(&self, payload: FeedbackPayload) -> SinkResult<()> {
        self.payloads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(payload);
        Ok(())
    }
}
