//! Feedback delivery.
//!
//! Defines the [`FeedbackSink`] contract the change tracker emits into, plus
//! the sinks a host wires in: [`NoOpSink`] when nothing is bound,
//! [`MemorySink`] for inspection, and [`HttpSink`] for the collection
//! endpoint (`POST {base}/projects/{project}/feedback`, bearer auth).

pub mod config;
pub mod error;
pub mod http;
pub mod provider;
pub mod sink;

pub use config::{ClientConfig, API_KEY_ENV, DEFAULT_BASE_URL};
pub use error::{SinkError, SinkResult};
pub use http::HttpSink;
pub use provider::{default_sink, FeedbackProvider};
pub use sink::{FeedbackSink, MemorySink, NoOpSink};
