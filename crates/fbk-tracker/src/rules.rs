use std::fmt;
use std::sync::Arc;

use fbk_types::Vote;

/// Names the feedback stream a tracked value belongs to.
///
/// A derived identifier is evaluated against the value at emission time.
pub enum SessionId<T> {
    Static(String),
    Derived(Arc<dyn Fn(&T) -> String + Send + Sync>),
}

impl<T> SessionId<T> {
    pub fn derived(f: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        Self::Derived(Arc::new(f))
    }

    pub fn resolve(&self, value: &T) -> String {
        match self {
            Self::Static(id) => id.clone(),
            Self::Derived(f) => f(value),
        }
    }
}

impl<T> Clone for SessionId<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Static(id) => Self::Static(id.clone()),
            Self::Derived(f) => Self::Derived(Arc::clone(f)),
        }
    }
}

impl<T> fmt::Debug for SessionId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(id) => f.debug_tuple("Static").field(id).finish(),
            Self::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

impl<T> From<&str> for SessionId<T> {
    fn from(id: &str) -> Self {
        Self::Static(id.to_string())
    }
}

impl<T> From<String> for SessionId<T> {
    fn from(id: String) -> Self {
        Self::Static(id)
    }
}

/// How an emitted transition is classified.
pub enum VoteRule<T> {
    /// Always this vote, whatever changed.
    Fixed(Vote),
    /// Called with `(before, after, percent_changed)`.
    Classify(Arc<dyn Fn(&T, &T, f64) -> Vote + Send + Sync>),
}

impl<T> VoteRule<T> {
    pub fn resolve(&self, before: &T, after: &T, percent_changed: f64) -> Vote {
        match self {
            Self::Fixed(vote) => *vote,
            Self::Classify(f) => f(before, after, percent_changed),
        }
    }
}

impl<T> Clone for VoteRule<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Fixed(vote) => Self::Fixed(*vote),
            Self::Classify(f) => Self::Classify(Arc::clone(f)),
        }
    }
}

impl<T> fmt::Debug for VoteRule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(vote) => f.debug_tuple("Fixed").field(vote).finish(),
            Self::Classify(_) => f.write_str("Classify(..)"),
        }
    }
}
