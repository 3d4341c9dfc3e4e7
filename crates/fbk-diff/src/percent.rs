//! Normalized dissimilarity between two snapshots.

use serde_json::Value;

use crate::distance::{number_ratio, text_ratio};
use crate::kind::ValueKind;
use crate::structural::{structural_changes, Change};

/// Per-record weights used when scoring a structural diff.
///
/// Edits between two strings or two numbers are always scored by their own
/// ratio; these weights cover everything else.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChangeWeights {
    pub added: f64,
    pub deleted: f64,
    pub array_change: f64,
    /// Edit between values that are not both strings or both numbers.
    pub opaque_edit: f64,
}

impl ChangeWeights {
    pub const DEFAULT: Self = Self {
        added: 1.0,
        deleted: 1.0,
        array_change: 0.5,
        opaque_edit: 1.0,
    };

    /// Weight contributed by a single structural record.
    pub fn weight_of(&self, change: &Change) -> f64 {
        match change {
            Change::Added { .. } => self.added,
            Change::Deleted { .. } => self.deleted,
            Change::ArrayChange { .. } => self.array_change,
            Change::Edited { lhs, rhs, .. } => match (ValueKind::of(lhs), ValueKind::of(rhs)) {
                (ValueKind::Text(a), ValueKind::Text(b)) => text_ratio(a, b),
                (ValueKind::Number(a), ValueKind::Number(b)) => number_ratio(a, b),
                _ => self.opaque_edit,
            },
        }
    }
}

impl Default for ChangeWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Symmetric dissimilarity between two snapshots, in `[0, 1]`.
///
/// Two strings compare by normalized edit distance, two numbers by relative
/// change, and every other pairing by a weighted structural diff divided by
/// the larger top-level property count.
pub fn percent_changed(before: &Value, after: &Value) -> f64 {
    percent_changed_with(before, after, &ChangeWeights::DEFAULT)
}

/// [`percent_changed`] with custom structural weights.
pub fn percent_changed_with(before: &Value, after: &Value, weights: &ChangeWeights) -> f64 {
    match (ValueKind::of(before), ValueKind::of(after)) {
        (ValueKind::Text(a), ValueKind::Text(b)) => text_ratio(a, b),
        (ValueKind::Number(a), ValueKind::Number(b)) => number_ratio(a, b),
        (left, right) => {
            if before == after {
                return 0.0;
            }
            let total = left.property_count().max(right.property_count());
            if total == 0 {
                return 0.0;
            }
            let weight: f64 = structural_changes(before, after)
                .iter()
                .map(|c| weights.weight_of(c))
                .sum();
            (weight / total as f64).clamp(0.0, 1.0)
        }
    }
}
