//! State containers with built-in implicit feedback.
//!
//! Two thin adapters over [`fbk_tracker::ChangeTracker`]: [`FeedbackState`]
//! for assignment-style updates (values or updater functions) and
//! [`FeedbackReducer`] for action dispatch. Both hold exactly the values an
//! untracked container would; the tracker only observes them.

pub mod reducer;
pub mod state;

pub use reducer::{Action, FeedbackReducer, Reducer};
pub use state::{FeedbackState, StateAction};
