use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fbk_sink::{FeedbackSink, SinkResult};
use fbk_state::FeedbackState;
use fbk_tracker::TrackerOptions;
use fbk_types::FeedbackPayload;
use serde::Deserialize;
use serde_json::Value;
use tokio::time::sleep;
use tracing::debug;

/// Extra wait after the last step so the final transition can settle.
const SETTLE_MARGIN: Duration = Duration::from_millis(50);

#[derive(Debug, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub initial: Value,
    #[serde(default = "default_session")]
    pub session: String,
    pub steps: Vec<ReplayStep>,
}

#[derive(Debug, Deserialize)]
pub struct ReplayStep {
    pub value: Value,
    pub trigger: Option<String>,
    /// Pause before this step is applied.
    #[serde(default)]
    pub wait_ms: u64,
}

fn default_session() -> String {
    "replay".to_string()
}

/// Writes each payload to stdout as one JSON line.
pub struct PrintSink;

#[async_trait]
impl FeedbackSink for PrintSink {
    async fn submit(&self, payload: FeedbackPayload) -> SinkResult<()> {
        let line = serde_json::to_string(&payload)?;
        let mut out = std::io::stdout().lock();
        writeln!(out, "{line}")?;
        Ok(())
    }
}

/// Apply every step of `script` to a tracked value, then wait for the last
/// transition to settle.
pub async fn run(
    script: ReplayScript,
    options: TrackerOptions<Value>,
    sink: Arc<dyn FeedbackSink>,
) -> anyhow::Result<Value> {
    let settle = options.settings.debounce() + SETTLE_MARGIN;
    let mut state = FeedbackState::new(script.initial, script.session, options, sink)?;

    for (n, step) in script.steps.into_iter().enumerate() {
        if step.wait_ms > 0 {
            sleep(Duration::from_millis(step.wait_ms)).await;
        }
        debug!(step = n, trigger = step.trigger.as_deref().unwrap_or_default(), "replaying step");
        state.set(step.value, step.trigger.as_deref());
    }

    if state.tracker().is_pending() {
        sleep(settle).await;
    }
    // Let the delivery task drain.
    sleep(Duration::from_millis(1)).await;
    Ok(state.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fbk_diff::DiffFormat;
    use fbk_sink::MemorySink;
    use serde_json::json;

    fn script(text: &str) -> ReplayScript {
        serde_json::from_str(text).unwrap()
    }

    fn options() -> TrackerOptions<Value> {
        TrackerOptions::new()
            .with_debounce(Duration::from_millis(300))
            .with_diff_format(DiffFormat::Json)
    }

    #[test]
    fn script_defaults() {
        let s = script(r#"{"steps": [{"value": 1}]}"#);
        assert_eq!(s.initial, Value::Null);
        assert_eq!(s.session, "replay");
        assert_eq!(s.steps[0].wait_ms, 0);
        assert!(s.steps[0].trigger.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn bursts_and_pauses() {
        let s = script(
            r#"{
                "initial": 0,
                "session": "counter",
                "steps": [
                    {"value": 1, "trigger": "click"},
                    {"value": 2, "trigger": "click", "wait_ms": 100},
                    {"value": 3, "trigger": "click", "wait_ms": 1000},
                    {"value": 10, "trigger": "reset"}
                ]
            }"#,
        );
        let sink = MemorySink::new();
        let last = run(s, options(), Arc::new(sink.clone())).await.unwrap();
        assert_eq!(last, json!(10));

        let payloads = sink.payloads();
        let summary: Vec<_> = payloads
            .iter()
            .map(|p| {
                let diff: Value = serde_json::from_str(p.correction.as_deref().unwrap()).unwrap();
                (
                    p.trigger_name.clone().unwrap(),
                    diff["before"].clone(),
                    diff["after"].clone(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("click".to_string(), json!(0), json!(2)),
                ("click".to_string(), json!(2), json!(3)),
                ("reset".to_string(), json!(3), json!(10)),
            ]
        );
        assert!(payloads.iter().all(|p| p.session_id == "counter"));
    }
}
