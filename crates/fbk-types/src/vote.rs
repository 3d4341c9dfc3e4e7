use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Share of change above which an implicit signal counts as a downvote.
pub const DOWNVOTE_THRESHOLD: f64 = 0.5;

/// Two-valued feedback classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Upvote,
    Downvote,
}

impl Vote {
    /// Default classification of an implicit change.
    ///
    /// A change of more than half the value is read as the user rejecting
    /// what they were given; anything smaller is a refinement.
    pub fn from_percent_changed(percent: f64) -> Self {
        if percent > DOWNVOTE_THRESHOLD {
            Self::Downvote
        } else {
            Self::Upvote
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upvote => "upvote",
            Self::Downvote => "downvote",
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Vote {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upvote" | "up" => Ok(Self::Upvote),
            "downvote" | "down" => Ok(Self::Downvote),
            _ => Err(TypeError::InvalidVote(s.to_string())),
        }
    }
}

/// Where a feedback signal came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FeedbackSource {
    /// Derived from observed state changes, not from a direct user action.
    Implicit,
    /// A direct user action such as pressing a vote button.
    #[default]
    Explicit,
}

impl fmt::Display for FeedbackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Implicit => f.write_str("IMPLICIT"),
            Self::Explicit => f.write_str("EXPLICIT"),
        }
    }
}

impl FromStr for FeedbackSource {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IMPLICIT" => Ok(Self::Implicit),
            "EXPLICIT" => Ok(Self::Explicit),
            _ => Err(TypeError::InvalidSource(s.to_string())),
        }
    }
}
