use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use fbk_diff::{is_nullish, snapshot, DiffReport};
use fbk_sink::FeedbackSink;
use fbk_types::FeedbackPayload;
use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::TrackerOptions;
use crate::error::{TrackerError, TrackerResult};
use crate::rules::SessionId;

/// Values a tracker can follow: cloned into snapshots, serialized for
/// diffing, and moved across the runtime's timer tasks.
pub trait Trackable: Clone + Serialize + Send + 'static {}

impl<T: Clone + Serialize + Send + 'static> Trackable for T {}

/// What [`ChangeTracker::observe`] did with a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Observation {
    /// Equal to the last observed value; nothing recorded.
    Unchanged,
    /// First transition out of a nullish start; recorded, not reported.
    Suppressed,
    /// Opened a new pending transition.
    Started,
    /// Extended the pending transition and restarted its debounce window.
    Extended,
}

/// Explanation text carried by every implicit payload.
pub fn explanation(percent_changed: f64) -> String {
    format!(
        "State change with diff percentage: {:.1}%",
        percent_changed * 100.0
    )
}

struct TrackerState<T> {
    /// Value before the current burst of changes.
    baseline: T,
    last_observed: T,
    last_snapshot: Value,
    trigger: Option<String>,
    seen_non_nullish: bool,
    timer: Option<JoinHandle<()>>,
    /// Bumped whenever the timer is replaced or cancelled, so a timer task
    /// that already woke up can tell it has been superseded.
    generation: u64,
}

impl<T> TrackerState<T> {
    fn disarm(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.generation = self.generation.wrapping_add(1);
    }
}

/// A settled transition on its way to the delivery task.
struct Transition<T> {
    before: T,
    after: T,
    trigger: String,
}

/// Turns transitions into payloads on the delivery task.
struct Emitter<T> {
    options: TrackerOptions<T>,
    session: SessionId<T>,
}

impl<T: Trackable> Emitter<T> {
    fn payload(&self, transition: &Transition<T>) -> FeedbackPayload {
        let Transition {
            before,
            after,
            trigger,
        } = transition;
        let report = DiffReport::compute(
            &snapshot(before),
            &snapshot(after),
            self.options.settings.diff_format,
        );
        let vote = self.options.classify(before, after, report.percent_changed);
        let session_id = self.session.resolve(after);

        debug!(
            session = %session_id,
            %trigger,
            %vote,
            percent = report.percent_changed,
            "emitting implicit feedback"
        );

        FeedbackPayload::implicit(session_id, vote)
            .with_explanation(explanation(report.percent_changed))
            .with_correction(report.diff)
            .with_trigger(trigger.as_str())
            .with_metadata(self.options.settings.metadata.clone())
    }
}

struct Shared<T> {
    state: Mutex<TrackerState<T>>,
    options: TrackerOptions<T>,
    session: SessionId<T>,
    outbox: mpsc::UnboundedSender<Transition<T>>,
    runtime: Handle,
}

impl<T: Trackable> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, TrackerState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue `(baseline, last_observed)` under `trigger` and rebase.
    fn emit(&self, state: &mut TrackerState<T>, trigger: String) {
        let transition = Transition {
            before: state.baseline.clone(),
            after: state.last_observed.clone(),
            trigger,
        };
        state.baseline = state.last_observed.clone();
        if let Err(err) = self.outbox.send(transition) {
            warn!(trigger = %err.0.trigger, "feedback delivery has stopped; emission dropped");
        }
    }

    fn arm(self: &Arc<Self>, state: &mut TrackerState<T>) {
        state.disarm();
        let generation = state.generation;
        let debounce = self.options.settings.debounce();
        let shared = Arc::downgrade(self);

        state.timer = Some(self.runtime.spawn(async move {
            tokio::time::sleep(debounce).await;
            if let Some(shared) = shared.upgrade() {
                shared.settle(generation);
            }
        }));
    }

    fn settle(&self, generation: u64) {
        let mut state = self.lock();
        if state.generation != generation || state.timer.is_none() {
            return;
        }
        state.timer = None;
        let trigger = self.current_trigger(&state);
        self.emit(&mut state, trigger);
    }

    fn current_trigger(&self, state: &TrackerState<T>) -> String {
        state
            .trigger
            .clone()
            .unwrap_or_else(|| self.options.settings.trigger_name().to_string())
    }
}

/// Watches a sequence of values and reports each settled transition once.
///
/// Changes that arrive within the debounce window of each other, under the
/// same trigger label, collapse into one transition reported as
/// `(value before the burst, value at settle)`. A change under a different
/// label flushes the pending transition immediately. Reports are queued to
/// a per-tracker delivery task and submitted to the sink in order.
///
/// Equality, vote and session closures run without the tracker's lock
/// held, so they may call back into the tracker.
///
/// Dropping the tracker cancels a pending transition without reporting it.
pub struct ChangeTracker<T: Trackable> {
    shared: Arc<Shared<T>>,
}

impl<T: Trackable> ChangeTracker<T> {
    /// Create a tracker seeded with `initial`.
    ///
    /// Must be called within a tokio runtime.
    pub fn new(
        initial: T,
        session: impl Into<SessionId<T>>,
        options: TrackerOptions<T>,
        sink: Arc<dyn FeedbackSink>,
    ) -> TrackerResult<Self> {
        let runtime = Handle::try_current().map_err(|_| TrackerError::NoRuntime)?;
        let (outbox, inbox) = mpsc::unbounded_channel();
        let session = session.into();
        let emitter = Emitter {
            options: options.clone(),
            session: session.clone(),
        };
        runtime.spawn(deliver(emitter, sink, inbox));

        let last_snapshot = snapshot(&initial);
        let seen_non_nullish = !is_nullish(&last_snapshot);

        info!(
            debounce_ms = options.settings.debounce_ms,
            format = %options.settings.diff_format,
            "change tracker started"
        );

        let state = TrackerState {
            baseline: initial.clone(),
            last_observed: initial,
            last_snapshot,
            trigger: None,
            seen_non_nullish,
            timer: None,
            generation: 0,
        };

        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                options,
                session,
                outbox,
                runtime,
            }),
        })
    }

    /// Announce an impending change and its trigger label.
    ///
    /// Falls back to the configured default label when `trigger` is `None`
    /// or empty. If a transition is pending under a different label, it is
    /// reported right away using the last observed value, and `true` is
    /// returned.
    pub fn begin(&self, trigger: Option<&str>) -> bool {
        let label = match trigger.filter(|t| !t.is_empty()) {
            Some(t) => t.to_string(),
            None => self.shared.options.settings.trigger_name().to_string(),
        };

        let mut state = self.shared.lock();
        let mut flushed = false;
        if state.timer.is_some() {
            if let Some(current) = state.trigger.clone().filter(|c| *c != label) {
                state.disarm();
                self.shared.emit(&mut state, current);
                flushed = true;
            }
        }
        state.trigger = Some(label);
        flushed
    }

    /// Record the value a change produced.
    pub fn observe(&self, next: &T) -> Observation {
        let next_snapshot = snapshot(next);

        // Custom equality runs outside the lock.
        if let Some(eq) = &self.shared.options.compare_with {
            let last = self.shared.lock().last_observed.clone();
            if eq(&last, next) {
                return Observation::Unchanged;
            }
        }

        let mut state = self.shared.lock();
        if self.shared.options.compare_with.is_none() && state.last_snapshot == next_snapshot {
            return Observation::Unchanged;
        }

        let next_nullish = is_nullish(&next_snapshot);
        let suppress = self.shared.options.settings.ignore_initial_nullish
            && !state.seen_non_nullish
            && !next_nullish;
        if !next_nullish {
            state.seen_non_nullish = true;
        }

        if suppress {
            debug!("initial nullish transition not reported");
            state.baseline = next.clone();
            state.last_observed = next.clone();
            state.last_snapshot = next_snapshot;
            return Observation::Suppressed;
        }

        let started = state.timer.is_none();
        if started {
            state.baseline = state.last_observed.clone();
        }
        state.last_observed = next.clone();
        state.last_snapshot = next_snapshot;
        self.shared.arm(&mut state);

        if started {
            Observation::Started
        } else {
            Observation::Extended
        }
    }

    /// Restart the debounce window of the pending transition.
    ///
    /// Returns `false` when nothing is pending.
    pub fn arm_or_extend(&self) -> bool {
        let mut state = self.shared.lock();
        if state.timer.is_none() {
            return false;
        }
        self.shared.arm(&mut state);
        true
    }

    /// Drop the pending transition without reporting it.
    pub fn cancel(&self) -> bool {
        let mut state = self.shared.lock();
        let pending = state.timer.is_some();
        state.disarm();
        state.baseline = state.last_observed.clone();
        pending
    }

    /// Report the pending transition now instead of waiting for it to settle.
    pub fn flush_now(&self) -> bool {
        let mut state = self.shared.lock();
        if state.timer.is_none() {
            return false;
        }
        state.disarm();
        let trigger = self.shared.current_trigger(&state);
        self.shared.emit(&mut state, trigger);
        true
    }

    pub fn is_pending(&self) -> bool {
        self.shared.lock().timer.is_some()
    }

    /// Label of the most recent change, if any change has been announced.
    pub fn current_trigger(&self) -> Option<String> {
        self.shared.lock().trigger.clone()
    }

    pub fn baseline(&self) -> T {
        self.shared.lock().baseline.clone()
    }

    pub fn last_observed(&self) -> T {
        self.shared.lock().last_observed.clone()
    }

    /// Session identifier as it would be reported right now.
    pub fn session_id(&self) -> String {
        let last = self.last_observed();
        self.shared.session.resolve(&last)
    }

    pub fn options(&self) -> &TrackerOptions<T> {
        &self.shared.options
    }
}

impl<T: Trackable> Drop for ChangeTracker<T> {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        if state.timer.is_some() {
            debug!("tracker dropped with a pending transition; discarding it");
        }
        state.disarm();
    }
}

async fn deliver<T: Trackable>(
    emitter: Emitter<T>,
    sink: Arc<dyn FeedbackSink>,
    mut inbox: mpsc::UnboundedReceiver<Transition<T>>,
) {
    while let Some(transition) = inbox.recv().await {
        let payload = emitter.payload(&transition);
        let session = payload.session_id.clone();
        let trigger = payload.trigger_name.clone().unwrap_or_default();
        if let Err(err) = sink.submit(payload).await {
            warn!(%session, %trigger, error = %err, "feedback submission failed");
        }
    }
}
