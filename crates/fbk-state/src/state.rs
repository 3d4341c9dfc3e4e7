use std::fmt;
use std::sync::Arc;

use fbk_sink::FeedbackSink;
use fbk_tracker::{ChangeTracker, SessionId, Trackable, TrackerOptions, TrackerResult};
use tracing::trace;

/// An update for [`FeedbackState::set_state`]: a replacement value, or a
/// function of the current one.
pub enum StateAction<T> {
    Value(T),
    Updater(Box<dyn FnOnce(&T) -> T>),
}

impl<T> StateAction<T> {
    pub fn updater(f: impl FnOnce(&T) -> T + 'static) -> Self {
        Self::Updater(Box::new(f))
    }

    /// Produce the next value from the current one.
    pub fn apply(self, current: &T) -> T {
        match self {
            Self::Value(value) => value,
            Self::Updater(f) => f(current),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for StateAction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Updater(_) => f.write_str("Updater(..)"),
        }
    }
}

/// A value cell whose every assignment is reported through a [`ChangeTracker`].
///
/// Holds exactly the values a plain cell would; tracking never alters the
/// value sequence.
pub struct FeedbackState<T: Trackable> {
    value: T,
    tracker: ChangeTracker<T>,
}

impl<T: Trackable> FeedbackState<T> {
    pub fn new(
        initial: T,
        session: impl Into<SessionId<T>>,
        options: TrackerOptions<T>,
        sink: Arc<dyn FeedbackSink>,
    ) -> TrackerResult<Self> {
        let tracker = ChangeTracker::new(initial.clone(), session, options, sink)?;
        Ok(Self {
            value: initial,
            tracker,
        })
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Apply `action`, labelling the change with `trigger`.
    pub fn set_state(&mut self, action: StateAction<T>, trigger: Option<&str>) -> &T {
        self.tracker.begin(trigger);
        let next = action.apply(&self.value);
        let observation = self.tracker.observe(&next);
        trace!(?observation, trigger = trigger.unwrap_or_default(), "state updated");
        self.value = next;
        &self.value
    }

    pub fn set(&mut self, value: T, trigger: Option<&str>) -> &T {
        self.set_state(StateAction::Value(value), trigger)
    }

    pub fn update(&mut self, f: impl FnOnce(&T) -> T + 'static, trigger: Option<&str>) -> &T {
        self.set_state(StateAction::updater(f), trigger)
    }

    pub fn tracker(&self) -> &ChangeTracker<T> {
        &self.tracker
    }

    /// Stop tracking and return the current value. A pending transition is
    /// discarded.
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: Trackable + fmt::Debug> fmt::Debug for FeedbackState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedbackState")
            .field("value", &self.value)
            .field("pending", &self.tracker.is_pending())
            .finish()
    }
}
