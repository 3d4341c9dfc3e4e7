//! Structural diff: a flat list of edit records between two JSON trees.
//!
//! Records use single-letter kind tags (`N`ew, `D`eleted, `E`dited,
//! `A`rray change) so the `object` diff format reads the same as the
//! deep-diff output that feedback consumers already parse.

use serde::Serialize;
use serde_json::Value;

/// One step in the path from the root to a changed value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// A single structural edit.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Change {
    /// A property present only on the right-hand side.
    #[serde(rename = "N")]
    Added {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        path: Vec<PathSegment>,
        rhs: Value,
    },
    /// A property present only on the left-hand side.
    #[serde(rename = "D")]
    Deleted {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        path: Vec<PathSegment>,
        lhs: Value,
    },
    /// A value that differs, or changed kind, at the same path.
    #[serde(rename = "E")]
    Edited {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        path: Vec<PathSegment>,
        lhs: Value,
        rhs: Value,
    },
    /// An element appended to or removed from the end of an array.
    #[serde(rename = "A")]
    ArrayChange {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        path: Vec<PathSegment>,
        index: usize,
        item: ArrayItem,
    },
}

/// The element-level edit inside an [`Change::ArrayChange`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum ArrayItem {
    #[serde(rename = "N")]
    Added { rhs: Value },
    #[serde(rename = "D")]
    Deleted { lhs: Value },
}

impl Change {
    pub fn path(&self) -> &[PathSegment] {
        match self {
            Self::Added { path, .. }
            | Self::Deleted { path, .. }
            | Self::Edited { path, .. }
            | Self::ArrayChange { path, .. } => path,
        }
    }
}

/// Compute the edit records that turn `lhs` into `rhs`.
///
/// Objects are compared key by key, arrays index by index over their common
/// prefix with surplus elements reported as array changes, and anything else
/// (including two values of different kinds) is a single edit.
pub fn structural_changes(lhs: &Value, rhs: &Value) -> Vec<Change> {
    let mut changes = Vec::new();
    let mut path = Vec::new();
    walk(lhs, rhs, &mut path, &mut changes);
    changes
}

fn walk(lhs: &Value, rhs: &Value, path: &mut Vec<PathSegment>, out: &mut Vec<Change>) {
    match (lhs, rhs) {
        (Value::Array(left), Value::Array(right)) => {
            let common = left.len().min(right.len());
            for (i, (l, r)) in left.iter().zip(right).enumerate() {
                path.push(PathSegment::Index(i));
                walk(l, r, path, out);
                path.pop();
            }
            for (index, item) in right.iter().enumerate().skip(common) {
                out.push(Change::ArrayChange {
                    path: path.clone(),
                    index,
                    item: ArrayItem::Added { rhs: item.clone() },
                });
            }
            for (index, item) in left.iter().enumerate().skip(common) {
                out.push(Change::ArrayChange {
                    path: path.clone(),
                    index,
                    item: ArrayItem::Deleted { lhs: item.clone() },
                });
            }
        }
        (Value::Object(left), Value::Object(right)) => {
            for (key, l) in left {
                path.push(PathSegment::Key(key.clone()));
                match right.get(key) {
                    Some(r) => walk(l, r, path, out),
                    None => out.push(Change::Deleted {
                        path: path.clone(),
                        lhs: l.clone(),
                    }),
                }
                path.pop();
            }
            for (key, r) in right {
                if !left.contains_key(key) {
                    path.push(PathSegment::Key(key.clone()));
                    out.push(Change::Added {
                        path: path.clone(),
                        rhs: r.clone(),
                    });
                    path.pop();
                }
            }
        }
        _ if lhs == rhs => {}
        _ => out.push(Change::Edited {
            path: path.clone(),
            lhs: lhs.clone(),
            rhs: rhs.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(k: &str) -> PathSegment {
        PathSegment::Key(k.to_string())
    }

    #[test]
    fn equal_trees_have_no_changes() {
        let v = json!({"a": [1, {"b": null}], "c": "x"});
        assert!(structural_changes(&v, &v).is_empty());
    }

    #[test]
    fn added_deleted_edited_keys() {
        let old = json!({"keep": 1, "edit": "old", "gone": true});
        let new = json!({"keep": 1, "edit": "new", "fresh": [1]});

        let changes = structural_changes(&old, &new);
        assert_eq!(changes.len(), 3);
        assert!(changes.contains(&Change::Edited {
            path: vec![key("edit")],
            lhs: json!("old"),
            rhs: json!("new"),
        }));
        assert!(changes.contains(&Change::Deleted {
            path: vec![key("gone")],
            lhs: json!(true),
        }));
        assert!(changes.contains(&Change::Added {
            path: vec![key("fresh")],
            rhs: json!([1]),
        }));
    }

    #[test]
    fn nested_paths() {
        let old = json!({"user": {"address": {"city": "Oslo"}}});
        let new = json!({"user": {"address": {"city": "Bergen"}}});

        let changes = structural_changes(&old, &new);
        assert_eq!(changes.len(), 1);
        assert_eq!(
            changes[0].path(),
            &[key("user"), key("address"), key("city")]
        );
    }

    #[test]
    fn array_growth_and_shrink() {
        let grown = structural_changes(&json!([1, 2]), &json!([1, 2, 3]));
        assert_eq!(
            grown,
            vec![Change::ArrayChange {
                path: vec![],
                index: 2,
                item: ArrayItem::Added { rhs: json!(3) },
            }]
        );

        let shrunk = structural_changes(&json!({"xs": [1, 2, 3]}), &json!({"xs": [1]}));
        assert_eq!(shrunk.len(), 2);
        assert!(shrunk
            .iter()
            .all(|c| matches!(c, Change::ArrayChange { item: ArrayItem::Deleted { .. }, .. })));
    }

    #[test]
    fn kind_change_is_one_edit() {
        let changes = structural_changes(&json!(null), &json!({"id": 1}));
        assert_eq!(
            changes,
            vec![Change::Edited {
                path: vec![],
                lhs: json!(null),
                rhs: json!({"id": 1}),
            }]
        );
    }

    #[test]
    fn record_wire_shape() {
        let changes = structural_changes(&json!({"a": [1]}), &json!({"a": [2, 3]}));
        let wire = serde_json::to_value(&changes).unwrap();
        assert_eq!(
            wire,
            json!([
                {"kind": "E", "path": ["a", 0], "lhs": 1, "rhs": 2},
                {"kind": "A", "path": ["a"], "index": 1, "item": {"kind": "N", "rhs": 3}},
            ])
        );

        let root = serde_json::to_value(structural_changes(&json!(1), &json!(2))).unwrap();
        assert_eq!(root, json!([{"kind": "E", "lhs": 1, "rhs": 2}]));
    }
}
