//! Sentinel-tolerant conversion of arbitrary values into JSON trees.
//!
//! `serde_json::to_value` turns non-finite floats into `null` and fails on
//! non-string map keys. [`snapshot`] substitutes sentinel strings and
//! stringified keys instead, and never fails.

use serde::ser::{self, Serialize};
use serde_json::{Map, Number, Value};

pub const NAN_SENTINEL: &str = "[NaN]";
pub const INFINITY_SENTINEL: &str = "[Infinity]";
pub const NEG_INFINITY_SENTINEL: &str = "[-Infinity]";

type Error = serde_json::Error;

/// Convert any serializable value into a JSON tree. Never fails.
///
/// A value whose `Serialize` impl reports an error becomes the string
/// `"[Unserializable: <reason>]"`.
pub fn snapshot<T: Serialize + ?Sized>(value: &T) -> Value {
    value
        .serialize(SnapshotSerializer)
        .unwrap_or_else(|err| Value::String(format!("[Unserializable: {err}]")))
}

/// Returns `true` for JSON `null`, which is what `None` and `()` snapshot to.
pub fn is_nullish(value: &Value) -> bool {
    value.is_null()
}

fn float(v: f64) -> Value {
    if v.is_nan() {
        Value::String(NAN_SENTINEL.to_owned())
    } else if v == f64::INFINITY {
        Value::String(INFINITY_SENTINEL.to_owned())
    } else if v == f64::NEG_INFINITY {
        Value::String(NEG_INFINITY_SENTINEL.to_owned())
    } else {
        Number::from_f64(v).map_or(Value::Null, Value::Number)
    }
}

fn map_key(key: Value) -> String {
    match key {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn tagged(variant: &'static str, inner: Value) -> Value {
    let mut map = Map::new();
    map.insert(variant.to_owned(), inner);
    Value::Object(map)
}

struct SnapshotSerializer;

impl ser::Serializer for SnapshotSerializer {
    type Ok = Value;
    type Error = Error;
    type SerializeSeq = SeqSnapshot;
    type SerializeTuple = SeqSnapshot;
    type SerializeTupleStruct = SeqSnapshot;
    type SerializeTupleVariant = VariantSnapshot<SeqSnapshot>;
    type SerializeMap = MapSnapshot;
    type SerializeStruct = MapSnapshot;
    type SerializeStructVariant = VariantSnapshot<MapSnapshot>;

    fn serialize_bool(self, v: bool) -> Result<Value, Error> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, Error> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, Error> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, Error> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, Error> {
        Ok(Value::Number(v.into()))
    }

    fn serialize_i128(self, v: i128) -> Result<Value, Error> {
        Ok(match i64::try_from(v) {
            Ok(n) => Value::Number(n.into()),
            Err(_) => Value::String(v.to_string()),
        })
    }

    fn serialize_u8(self, v: u8) -> Result<Value, Error> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, Error> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, Error> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, Error> {
        Ok(Value::Number(v.into()))
    }

    fn serialize_u128(self, v: u128) -> Result<Value, Error> {
        Ok(match u64::try_from(v) {
            Ok(n) => Value::Number(n.into()),
            Err(_) => Value::String(v.to_string()),
        })
    }

    fn serialize_f32(self, v: f32) -> Result<Value, Error> {
        Ok(float(f64::from(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<Value, Error> {
        Ok(float(v))
    }

    fn serialize_char(self, v: char) -> Result<Value, Error> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, Error> {
        Ok(Value::String(v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, Error> {
        Ok(Value::Array(
            v.iter().map(|b| Value::Number((*b).into())).collect(),
        ))
    }

    fn serialize_none(self) -> Result<Value, Error> {
        Ok(Value::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value, Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, Error> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, Error> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value, Error> {
        Ok(Value::String(variant.to_owned()))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, Error> {
        Ok(tagged(variant, value.serialize(SnapshotSerializer)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqSnapshot, Error> {
        Ok(SeqSnapshot {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqSnapshot, Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqSnapshot, Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantSnapshot<SeqSnapshot>, Error> {
        Ok(VariantSnapshot {
            variant,
            inner: SeqSnapshot {
                items: Vec::with_capacity(len),
            },
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapSnapshot, Error> {
        Ok(MapSnapshot::default())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<MapSnapshot, Error> {
        Ok(MapSnapshot::default())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<VariantSnapshot<MapSnapshot>, Error> {
        Ok(VariantSnapshot {
            variant,
            inner: MapSnapshot::default(),
        })
    }
}

struct SeqSnapshot {
    items: Vec<Value>,
}

impl ser::SerializeSeq for SeqSnapshot {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        self.items.push(value.serialize(SnapshotSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, Error> {
        Ok(Value::Array(self.items))
    }
}

impl ser::SerializeTuple for SeqSnapshot {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, Error> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SeqSnapshot {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, Error> {
        ser::SerializeSeq::end(self)
    }
}

#[derive(Default)]
struct MapSnapshot {
    map: Map<String, Value>,
    pending_key: Option<String>,
}

impl ser::SerializeMap for MapSnapshot {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), Error> {
        self.pending_key = Some(map_key(key.serialize(SnapshotSerializer)?));
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| <Error as ser::Error>::custom("map value serialized before its key"))?;
        self.map.insert(key, value.serialize(SnapshotSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, Error> {
        Ok(Value::Object(self.map))
    }
}

impl ser::SerializeStruct for MapSnapshot {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Error> {
        self.map
            .insert(key.to_owned(), value.serialize(SnapshotSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, Error> {
        Ok(Value::Object(self.map))
    }
}

struct VariantSnapshot<S> {
    variant: &'static str,
    inner: S,
}

impl ser::SerializeTupleVariant for VariantSnapshot<SeqSnapshot> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        ser::SerializeSeq::serialize_element(&mut self.inner, value)
    }

    fn end(self) -> Result<Value, Error> {
        let inner = ser::SerializeSeq::end(self.inner)?;
        Ok(tagged(self.variant, inner))
    }
}

impl ser::SerializeStructVariant for VariantSnapshot<MapSnapshot> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Error> {
        ser::SerializeStruct::serialize_field(&mut self.inner, key, value)
    }

    fn end(self) -> Result<Value, Error> {
        let inner = ser::SerializeStruct::end(self.inner)?;
        Ok(tagged(self.variant, inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Profile {
        name: String,
        age: Option<u32>,
        score: f64,
        tags: Vec<&'static str>,
        role: Role,
    }

    #[derive(Serialize)]
    enum Role {
        Admin,
        Guest { since: u16 },
        Pair(u8, u8),
    }

    #[test]
    fn matches_serde_json_for_plain_data() {
        let p = Profile {
            name: "ada".into(),
            age: None,
            score: 1.5,
            tags: vec!["a", "b"],
            role: Role::Guest { since: 2020 },
        };
        assert_eq!(snapshot(&p), serde_json::to_value(&p).unwrap());
        assert_eq!(snapshot(&Role::Admin), json!("Admin"));
        assert_eq!(snapshot(&Role::Pair(1, 2)), json!({"Pair": [1, 2]}));
    }

    #[test]
    fn non_finite_floats_become_sentinels() {
        assert_eq!(snapshot(&f64::NAN), json!(NAN_SENTINEL));
        assert_eq!(snapshot(&f64::INFINITY), json!(INFINITY_SENTINEL));
        assert_eq!(snapshot(&f32::NEG_INFINITY), json!(NEG_INFINITY_SENTINEL));
        assert_eq!(snapshot(&vec![1.0, f64::NAN]), json!([1.0, "[NaN]"]));
    }

    #[test]
    fn non_string_keys_are_stringified() {
        let mut m = BTreeMap::new();
        m.insert(1, "one");
        m.insert(2, "two");
        assert_eq!(snapshot(&m), json!({"1": "one", "2": "two"}));
    }

    #[test]
    fn failing_serialize_impl_degrades() {
        struct Broken;
        impl Serialize for Broken {
            fn serialize<S: serde::Serializer>(&self, _s: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("cannot snapshot"))
            }
        }
        assert_eq!(snapshot(&Broken), json!("[Unserializable: cannot snapshot]"));
        assert_eq!(
            snapshot(&vec![Broken]),
            json!("[Unserializable: cannot snapshot]")
        );
    }

    #[test]
    fn nullish_values() {
        assert!(is_nullish(&snapshot(&Option::<u8>::None)));
        assert!(is_nullish(&snapshot(&())));
        assert!(!is_nullish(&snapshot(&Some(0))));
        assert!(!is_nullish(&snapshot("")));
    }
}
