use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use fbk_diff::DiffFormat;
use fbk_types::{Metadata, Vote, DEFAULT_TRIGGER_NAME};
use serde::{Deserialize, Serialize};

use crate::error::{TrackerError, TrackerResult};
use crate::rules::VoteRule;

pub const DEFAULT_DEBOUNCE_MS: u64 = 1500;

/// Plain-data tracker configuration, loadable from TOML.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    /// Quiet period after the last change before a transition is reported.
    pub debounce_ms: u64,
    /// Rendering of the diff carried in the payload's `correction` field.
    pub diff_format: DiffFormat,
    /// Skip reporting the first transition out of an initially nullish value,
    /// the usual "loading, then loaded" pattern.
    pub ignore_initial_nullish: bool,
    /// Trigger label for changes that do not name one.
    pub default_trigger_name: Option<String>,
    pub metadata: Option<Metadata>,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            diff_format: DiffFormat::Git,
            ignore_initial_nullish: true,
            default_trigger_name: None,
            metadata: None,
        }
    }
}

impl TrackerSettings {
    pub fn from_toml_str(text: &str) -> TrackerResult<Self> {
        toml::from_str(text).map_err(|e| TrackerError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> TrackerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// The configured default trigger label, or `auto_state_change`.
    pub fn trigger_name(&self) -> &str {
        self.default_trigger_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_TRIGGER_NAME)
    }
}

/// Custom equality: returns `true` when two values count as unchanged.
pub type Equality<T> = Arc<dyn Fn(&T, &T) -> bool + Send + Sync>;

/// Full per-tracker configuration: the plain settings plus behaviour that
/// can only be expressed as code.
pub struct TrackerOptions<T> {
    pub settings: TrackerSettings,
    pub compare_with: Option<Equality<T>>,
    pub vote: Option<VoteRule<T>>,
}

impl<T> TrackerOptions<T> {
    pub fn new() -> Self {
        Self::from_settings(TrackerSettings::default())
    }

    pub fn from_settings(settings: TrackerSettings) -> Self {
        Self {
            settings,
            compare_with: None,
            vote: None,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.settings.debounce_ms = u64::try_from(debounce.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_diff_format(mut self, format: DiffFormat) -> Self {
        self.settings.diff_format = format;
        self
    }

    pub fn with_ignore_initial_nullish(mut self, ignore: bool) -> Self {
        self.settings.ignore_initial_nullish = ignore;
        self
    }

    pub fn with_default_trigger_name(mut self, name: impl Into<String>) -> Self {
        self.settings.default_trigger_name = Some(name.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.settings.metadata = Some(metadata);
        self
    }

    pub fn with_compare(mut self, eq: impl Fn(&T, &T) -> bool + Send + Sync + 'static) -> Self {
        self.compare_with = Some(Arc::new(eq));
        self
    }

    /// Report every transition with this vote.
    pub fn with_vote(mut self, vote: Vote) -> Self {
        self.vote = Some(VoteRule::Fixed(vote));
        self
    }

    /// Classify each transition from `(before, after, percent_changed)`.
    pub fn with_classifier(
        mut self,
        classify: impl Fn(&T, &T, f64) -> Vote + Send + Sync + 'static,
    ) -> Self {
        self.vote = Some(VoteRule::Classify(Arc::new(classify)));
        self
    }

    /// The vote for a transition; falls back to the percentage threshold.
    pub fn classify(&self, before: &T, after: &T, percent_changed: f64) -> Vote {
        match &self.vote {
            Some(rule) => rule.resolve(before, after, percent_changed),
            None => Vote::from_percent_changed(percent_changed),
        }
    }
}

impl<T> Default for TrackerOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for TrackerOptions<T> {
    fn clone(&self) -> Self {
        Self {
            settings: self.settings.clone(),
            compare_with: self.compare_with.clone(),
            vote: self.vote.clone(),
        }
    }
}

impl<T> fmt::Debug for TrackerOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerOptions")
            .field("settings", &self.settings)
            .field("compare_with", &self.compare_with.as_ref().map(|_| ".."))
            .field("vote", &self.vote)
            .finish()
    }
}

impl<T> From<TrackerSettings> for TrackerOptions<T> {
    fn from(settings: TrackerSettings) -> Self {
        Self::from_settings(settings)
    }
}
