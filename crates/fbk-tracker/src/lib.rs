//! Debounced change tracking.
//!
//! A [`ChangeTracker`] follows one value through a sequence of changes and
//! turns each settled transition into an implicit [`FeedbackPayload`]: a
//! vote derived from how much the value moved, the formatted diff as the
//! correction, and the label of the change that caused it.
//!
//! # Key Types
//!
//! - [`ChangeTracker`] -- `begin` / `observe` driven tracker with a debounce timer
//! - [`TrackerOptions`] / [`TrackerSettings`] -- Behavior knobs, the latter loadable from TOML
//! - [`SessionId`] / [`VoteRule`] -- Fixed or value-derived session and vote
//!
//! [`FeedbackPayload`]: fbk_types::FeedbackPayload

pub mod config;
pub mod error;
pub mod rules;
pub mod tracker;

pub use config::{Equality, TrackerOptions, TrackerSettings, DEFAULT_DEBOUNCE_MS};
pub use error::{TrackerError, TrackerResult};
pub use rules::{SessionId, VoteRule};
pub use tracker::{explanation, ChangeTracker, Observation, Trackable};
