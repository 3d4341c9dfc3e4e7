//! Foundation types for feedback signals.
//!
//! Every other `fbk` crate depends on `fbk-types`. A feedback signal is a
//! single [`FeedbackPayload`] delivered to a sink: either an explicit vote
//! made by a person, or an implicit one derived from a tracked state change.
//!
//! # Key Types
//!
//! - [`FeedbackPayload`] -- The record handed to a sink and posted on the wire
//! - [`Vote`] -- Two-valued classification (upvote / downvote)
//! - [`FeedbackSource`] -- Whether the signal was explicit or implicit

pub mod error;
pub mod payload;
pub mod vote;

pub use error::TypeError;
pub use payload::{FeedbackPayload, Metadata};
pub use vote::{FeedbackSource, Vote};

/// Trigger label used when neither the caller nor the configuration names one.
pub const DEFAULT_TRIGGER_NAME: &str = "auto_state_change";
