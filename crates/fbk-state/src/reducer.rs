use std::fmt;
use std::sync::Arc;

use fbk_sink::FeedbackSink;
use fbk_tracker::{ChangeTracker, SessionId, Trackable, TrackerOptions, TrackerResult};
use serde_json::Value;
use tracing::trace;

/// An action that may carry a type name, used as the trigger label when a
/// dispatch does not name one.
pub trait Action {
    fn action_type(&self) -> Option<&str> {
        None
    }
}

impl Action for Value {
    fn action_type(&self) -> Option<&str> {
        self.get("type").and_then(Value::as_str)
    }
}

pub type Reducer<S, A> = Box<dyn Fn(&S, A) -> S + Send + Sync>;

/// A reducer-driven store whose every dispatch is reported through a
/// [`ChangeTracker`].
pub struct FeedbackReducer<S: Trackable, A> {
    state: S,
    reducer: Reducer<S, A>,
    tracker: ChangeTracker<S>,
}

impl<S: Trackable, A: Action> FeedbackReducer<S, A> {
    pub fn new(
        reducer: impl Fn(&S, A) -> S + Send + Sync + 'static,
        initial: S,
        session: impl Into<SessionId<S>>,
        options: TrackerOptions<S>,
        sink: Arc<dyn FeedbackSink>,
    ) -> TrackerResult<Self> {
        let tracker = ChangeTracker::new(initial.clone(), session, options, sink)?;
        Ok(Self {
            state: initial,
            reducer: Box::new(reducer),
            tracker,
        })
    }

    /// Build the initial state lazily as `init(arg)`.
    pub fn with_initializer<I>(
        reducer: impl Fn(&S, A) -> S + Send + Sync + 'static,
        arg: I,
        init: impl FnOnce(I) -> S,
        session: impl Into<SessionId<S>>,
        options: TrackerOptions<S>,
        sink: Arc<dyn FeedbackSink>,
    ) -> TrackerResult<Self> {
        Self::new(reducer, init(arg), session, options, sink)
    }

    /// Run `action` through the reducer.
    ///
    /// The change is labelled with `trigger`, else the action's type, else
    /// the tracker's default label.
    pub fn dispatch(&mut self, action: A, trigger: Option<&str>) -> &S {
        let label = trigger
            .filter(|t| !t.is_empty())
            .or_else(|| action.action_type())
            .map(str::to_owned);
        self.tracker.begin(label.as_deref());

        let next = (self.reducer)(&self.state, action);
        let observation = self.tracker.observe(&next);
        trace!(?observation, trigger = label.as_deref().unwrap_or_default(), "action dispatched");
        self.state = next;
        &self.state
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn tracker(&self) -> &ChangeTracker<S> {
        &self.tracker
    }

    /// Stop tracking and return the current state. A pending transition is
    /// discarded.
    pub fn into_inner(self) -> S {
        self.state
    }
}

impl<S: Trackable + fmt::Debug, A> fmt::Debug for FeedbackReducer<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedbackReducer")
            .field("state", &self.state)
            .field("pending", &self.tracker.is_pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use fbk_diff::DiffFormat;
    use fbk_sink::MemorySink;
    use fbk_types::FeedbackPayload;
    use serde_json::json;
    use tokio::time::sleep;

    const DEBOUNCE: Duration = Duration::from_millis(300);

    fn options<S>() -> TrackerOptions<S> {
        TrackerOptions::new()
            .with_debounce(DEBOUNCE)
            .with_diff_format(DiffFormat::Json)
    }

    fn before_after(payload: &FeedbackPayload) -> (Value, Value) {
        let diff: Value = serde_json::from_str(payload.correction.as_deref().unwrap()).unwrap();
        (diff["before"].clone(), diff["after"].clone())
    }

    fn counter(state: &i64, action: Value) -> i64 {
        match action.action_type() {
            Some("increment") => state + 1,
            Some("decrement") => state - 1,
            Some("set") => action["value"].as_i64().unwrap_or(*state),
            _ => *state,
        }
    }

    fn todos(state: &Vec<String>, action: Value) -> Vec<String> {
        let mut next = state.clone();
        if let Some(text) = action["text"].as_str() {
            next.push(text.to_string());
        }
        next
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_dispatches_reports_once_under_action_type() {
        let sink = MemorySink::new();
        let mut store =
            FeedbackReducer::new(counter, 0, "counter", options(), Arc::new(sink.clone())).unwrap();

        for _ in 0..4 {
            store.dispatch(json!({"type": "increment"}), None);
        }
        assert_eq!(*store.state(), 4);
        sleep(DEBOUNCE * 2).await;

        let payloads = sink.payloads();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].trigger_name.as_deref(), Some("increment"));
        assert_eq!(before_after(&payloads[0]), (json!(0), json!(4)));
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_trigger_wins_and_label_change_flushes() {
        let sink = MemorySink::new();
        let mut store = FeedbackReducer::new(
            todos,
            Vec::new(),
            "todos",
            options(),
            Arc::new(sink.clone()),
        )
        .unwrap();

        store.dispatch(json!({"type": "add", "text": "a"}), Some("trigger1"));
        store.dispatch(json!({"type": "add", "text": "b"}), Some("trigger2"));
        sleep(Duration::from_millis(1)).await;

        let payloads = sink.payloads();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].trigger_name.as_deref(), Some("trigger1"));
        assert_eq!(before_after(&payloads[0]), (json!([]), json!(["a"])));

        sleep(DEBOUNCE * 2).await;
        let payloads = sink.payloads();
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[1].trigger_name.as_deref(), Some("trigger2"));
        assert_eq!(before_after(&payloads[1]), (json!(["a"]), json!(["a", "b"])));
    }

    #[tokio::test(start_paused = true)]
    async fn untyped_action_uses_default_label() {
        let sink = MemorySink::new();
        let mut store = FeedbackReducer::new(
            counter,
            1,
            "counter",
            options().with_default_trigger_name("counter_update"),
            Arc::new(sink.clone()),
        )
        .unwrap();

        store.dispatch(json!({"type": "noop"}), None);
        assert!(!store.tracker().is_pending());

        store.dispatch(json!({"value": 9}), None);
        assert_eq!(*store.state(), 1);

        struct Reset;
        impl Action for Reset {}
        let mut resettable = FeedbackReducer::new(
            |_: &i64, _: Reset| 0,
            5,
            "counter",
            options(),
            Arc::new(sink.clone()),
        )
        .unwrap();
        resettable.dispatch(Reset, None);
        assert_eq!(
            resettable.tracker().current_trigger().as_deref(),
            Some("auto_state_change")
        );

        store.dispatch(json!({"type": "set", "value": 3}), Some(""));
        assert_eq!(store.tracker().current_trigger().as_deref(), Some("set"));
        sleep(DEBOUNCE * 2).await;

        let labels: Vec<_> = sink
            .payloads()
            .into_iter()
            .filter_map(|p| p.trigger_name)
            .collect();
        assert_eq!(labels.len(), 2);
        assert!(labels.contains(&"set".to_string()));
        assert!(labels.contains(&"auto_state_change".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn lazy_initializer_builds_the_first_state() {
        let sink = MemorySink::new();
        let store = FeedbackReducer::with_initializer(
            counter,
            "41",
            |raw: &str| raw.parse::<i64>().unwrap_or(0) + 1,
            "counter",
            options(),
            Arc::new(sink.clone()),
        )
        .unwrap();

        assert_eq!(*store.state(), 42);
        assert_eq!(store.tracker().baseline(), 42);
        assert_eq!(store.into_inner(), 42);
    }
}
