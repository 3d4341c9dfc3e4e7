use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::vote::{FeedbackSource, Vote};

/// Free-form metadata attached to a feedback signal.
pub type Metadata = Map<String, Value>;

/// A single feedback signal, as handed to a sink.
///
/// The serialized form is the wire body posted to the collection endpoint,
/// so field names follow the endpoint's conventions (`tx_id` carries the
/// session identifier).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedbackPayload {
    /// Identifier of the feedback stream this signal belongs to.
    #[serde(rename = "tx_id")]
    pub session_id: String,
    pub vote: Vote,
    #[serde(default)]
    pub source: FeedbackSource,
    /// Human-readable reason for the vote.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Corrected output; for implicit signals, the formatted state diff.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction: Option<String>,
    /// Text the user had selected when voting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<String>,
    /// Label describing why the underlying change happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_metadata: Option<Metadata>,
}

impl FeedbackPayload {
    /// An explicit vote with no further detail.
    pub fn new(session_id: impl Into<String>, vote: Vote) -> Self {
        Self {
            session_id: session_id.into(),
            vote,
            source: FeedbackSource::Explicit,
            explanation: None,
            correction: None,
            selection: None,
            trigger_name: None,
            extra_metadata: None,
        }
    }

    /// An implicit vote derived from a state change.
    pub fn implicit(session_id: impl Into<String>, vote: Vote) -> Self {
        Self {
            source: FeedbackSource::Implicit,
            ..Self::new(session_id, vote)
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn with_correction(mut self, correction: impl Into<String>) -> Self {
        self.correction = Some(correction.into());
        self
    }

    pub fn with_selection(mut self, selection: impl Into<String>) -> Self {
        self.selection = Some(selection.into());
        self
    }

    pub fn with_trigger(mut self, trigger_name: impl Into<String>) -> Self {
        self.trigger_name = Some(trigger_name.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Option<Metadata>) -> Self {
        self.extra_metadata = metadata;
        self
    }

    /// Returns `true` if this signal was derived from a state change.
    pub fn is_implicit(&self) -> bool {
        self.source == FeedbackSource::Implicit
    }
}
