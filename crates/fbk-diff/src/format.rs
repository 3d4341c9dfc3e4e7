use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::DiffError;
use crate::percent::percent_changed;
use crate::structural::structural_changes;
use crate::text_diff::diff_lines;

/// Unchanged lines kept around each change in the `git` format.
pub const DEFAULT_CONTEXT_LINES: usize = 3;

/// Rendering used for the human-readable diff.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffFormat {
    /// Unified line diff of the pretty-printed JSON of each side.
    #[default]
    Git,
    /// JSON list of structural edit records.
    Object,
    /// JSON object holding both sides verbatim.
    Json,
}

impl DiffFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Object => "object",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for DiffFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiffFormat {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "git" => Ok(Self::Git),
            "object" => Ok(Self::Object),
            "json" => Ok(Self::Json),
            _ => Err(DiffError::UnknownFormat(s.to_string())),
        }
    }
}

/// Render the difference between two snapshots.
pub fn format_diff(before: &Value, after: &Value, format: DiffFormat) -> String {
    format_diff_with_context(before, after, format, DEFAULT_CONTEXT_LINES)
}

/// [`format_diff`] with an explicit context radius for the `git` format.
pub fn format_diff_with_context(
    before: &Value,
    after: &Value,
    format: DiffFormat,
    context: usize,
) -> String {
    match format {
        DiffFormat::Git => {
            let old = pretty(before) + "\n";
            let new = pretty(after) + "\n";
            diff_lines(&old, &new, context).to_unified()
        }
        DiffFormat::Object => pretty(&json!(structural_changes(before, after))),
        DiffFormat::Json => pretty(&json!({ "before": before, "after": after })),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Percentage and rendered diff for one before/after pair.
#[derive(Clone, Debug, PartialEq)]
pub struct DiffReport {
    /// Dissimilarity in `[0, 1]`.
    pub percent_changed: f64,
    pub diff: String,
}

impl DiffReport {
    pub fn compute(before: &Value, after: &Value, format: DiffFormat) -> Self {
        Self {
            percent_changed: percent_changed(before, after),
            diff: format_diff(before, after, format),
        }
    }
}
