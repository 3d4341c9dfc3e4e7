use serde_json::{Map, Value};

/// The closed set of shapes the difference engine distinguishes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ValueKind<'a> {
    Nullish,
    Bool(bool),
    Number(f64),
    Text(&'a str),
    Array(&'a [Value]),
    Object(&'a Map<String, Value>),
}

impl<'a> ValueKind<'a> {
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Null => Self::Nullish,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::Number(n.as_f64().unwrap_or_default()),
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::Array(items),
            Value::Object(map) => Self::Object(map),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Nullish => "nullish",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Number of countable properties: array length, object key count,
    /// 1 for any other scalar, 0 for nullish.
    pub fn property_count(&self) -> usize {
        match self {
            Self::Nullish => 0,
            Self::Array(items) => items.len(),
            Self::Object(map) => map.len(),
            Self::Bool(_) | Self::Number(_) | Self::Text(_) => 1,
        }
    }
}
