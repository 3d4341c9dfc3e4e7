//! Difference engine for tracked state.
//!
//! Pure functions that score how much a value changed and render the change
//! for humans. Inputs are JSON snapshots produced by [`snapshot`], which
//! accepts any `Serialize` value and never fails.
//!
//! # Key Types
//!
//! - [`percent_changed`] -- Symmetric dissimilarity in `[0, 1]`
//! - [`format_diff`] / [`DiffFormat`] -- `git`, `object` or `json` rendering
//! - [`Change`] -- Structural edit record (new / deleted / edited / array change)
//! - [`LineDiff`] / [`DiffHunk`] -- Line-level diff used by the `git` format

pub mod distance;
pub mod error;
pub mod format;
pub mod kind;
pub mod percent;
pub mod snapshot;
pub mod structural;
pub mod text_diff;

pub use error::{DiffError, DiffResult};
pub use format::{
    format_diff, format_diff_with_context, DiffFormat, DiffReport, DEFAULT_CONTEXT_LINES,
};
pub use kind::ValueKind;
pub use percent::{percent_changed, percent_changed_with, ChangeWeights};
pub use snapshot::{is_nullish, snapshot};
pub use structural::{structural_changes, ArrayItem, Change, PathSegment};
pub use text_diff::{diff_lines, DiffHunk, DiffLine, LineDiff};
