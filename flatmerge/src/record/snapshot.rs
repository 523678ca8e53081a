//! Snapshots that remember which optional values are set.
//!
//! A plain JSON snapshot renders `Some(0)` and `0` alike, so a set option
//! holding a zero value would look unset. The snapshot serializer wraps the
//! content of every `Some` in a single-key object, which keeps it non-zero
//! while it is folded, and [`unmark`] strips the wrappers again afterwards.

use serde::Serialize;
use serde::ser::{
    SerializeMap, SerializeSeq, SerializeStruct, SerializeStructVariant, SerializeTuple,
    SerializeTupleStruct, SerializeTupleVariant, Serializer,
};
use serde_json::{Map as JsonMap, Value as JsonValue};

const PRESENT: &str = "\u{0}present";

/// Serialise `value` with every `Some` wrapped.
pub(super) fn capture<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<JsonValue> {
    serde_json::to_value(Marked(value))
}

/// Whether `map` wraps a set option whose content is not itself an object.
#[must_use]
pub(super) fn wraps_leaf(map: &JsonMap<String, JsonValue>) -> bool {
    map.len() == 1 && map.get(PRESENT).is_some_and(|inner| !inner.is_object())
}

/// Replace every wrapper with the value it holds.
#[must_use]
pub(super) fn unmark(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(mut map) => {
            if map.len() == 1
                && let Some(inner) = map.remove(PRESENT)
            {
                return unmark(inner);
            }
            JsonValue::Object(
                map.into_iter()
                    .map(|(key, item)| (key, unmark(item)))
                    .collect(),
            )
        }
        JsonValue::Array(items) => JsonValue::Array(items.into_iter().map(unmark).collect()),
        other => other,
    }
}

struct Marked<'a, T: ?Sized>(&'a T);

impl<T: Serialize + ?Sized> Serialize for Marked<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(Marking(serializer))
    }
}

/// Wraps a serializer, or one of its compound states, so that nested values
/// are marked as well.
struct Marking<S>(S);

macro_rules! forward_primitives {
    ($($method:ident($ty:ty))*) => {$(
        fn $method(self, value: $ty) -> Result<Self::Ok, Self::Error> {
            self.0.$method(value)
        }
    )*};
}

impl<S: Serializer> Serializer for Marking<S> {
    type Ok = S::Ok;
    type Error = S::Error;
    type SerializeSeq = Marking<S::SerializeSeq>;
    type SerializeTuple = Marking<S::SerializeTuple>;
    type SerializeTupleStruct = Marking<S::SerializeTupleStruct>;
    type SerializeTupleVariant = Marking<S::SerializeTupleVariant>;
    type SerializeMap = Marking<S::SerializeMap>;
    type SerializeStruct = Marking<S::SerializeStruct>;
    type SerializeStructVariant = Marking<S::SerializeStructVariant>;

    forward_primitives! {
        serialize_bool(bool)
        serialize_i8(i8) serialize_i16(i16) serialize_i32(i32) serialize_i64(i64)
        serialize_i128(i128)
        serialize_u8(u8) serialize_u16(u16) serialize_u32(u32) serialize_u64(u64)
        serialize_u128(u128)
        serialize_f32(f32) serialize_f64(f64)
        serialize_char(char) serialize_str(&str) serialize_bytes(&[u8])
    }

    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        self.0.serialize_none()
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Self::Ok, Self::Error> {
        let mut map = self.0.serialize_map(Some(1))?;
        map.serialize_entry(PRESENT, &Marked(value))?;
        map.end()
    }

    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        self.0.serialize_unit()
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Self::Ok, Self::Error> {
        self.0.serialize_unit_struct(name)
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        self.0.serialize_unit_variant(name, variant_index, variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        self.0.serialize_newtype_struct(name, &Marked(value))
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        self.0
            .serialize_newtype_variant(name, variant_index, variant, &Marked(value))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        self.0.serialize_seq(len).map(Marking)
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        self.0.serialize_tuple(len).map(Marking)
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        self.0.serialize_tuple_struct(name, len).map(Marking)
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        self.0
            .serialize_tuple_variant(name, variant_index, variant, len)
            .map(Marking)
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        self.0.serialize_map(len).map(Marking)
    }

    fn serialize_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        self.0.serialize_struct(name, len).map(Marking)
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        self.0
            .serialize_struct_variant(name, variant_index, variant, len)
            .map(Marking)
    }

    fn is_human_readable(&self) -> bool {
        self.0.is_human_readable()
    }
}

macro_rules! marked_elements {
    ($($compound:ident::$method:ident)*) => {$(
        impl<S: $compound> $compound for Marking<S> {
            type Ok = S::Ok;
            type Error = S::Error;

            fn $method<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
                self.0.$method(&Marked(value))
            }

            fn end(self) -> Result<Self::Ok, Self::Error> {
                self.0.end()
            }
        }
    )*};
}

marked_elements! {
    SerializeSeq::serialize_element
    SerializeTuple::serialize_element
    SerializeTupleStruct::serialize_field
    SerializeTupleVariant::serialize_field
}

macro_rules! marked_fields {
    ($($compound:ident)*) => {$(
        impl<S: $compound> $compound for Marking<S> {
            type Ok = S::Ok;
            type Error = S::Error;

            fn serialize_field<T: Serialize + ?Sized>(
                &mut self,
                key: &'static str,
                value: &T,
            ) -> Result<(), Self::Error> {
                self.0.serialize_field(key, &Marked(value))
            }

            fn skip_field(&mut self, key: &'static str) -> Result<(), Self::Error> {
                self.0.skip_field(key)
            }

            fn end(self) -> Result<Self::Ok, Self::Error> {
                self.0.end()
            }
        }
    )*};
}

marked_fields! { SerializeStruct SerializeStructVariant }

impl<S: SerializeMap> SerializeMap for Marking<S> {
    type Ok = S::Ok;
    type Error = S::Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), Self::Error> {
        self.0.serialize_key(key)
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.0.serialize_value(&Marked(value))
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.0.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use serde_json::json;

    #[derive(Serialize)]
    struct Knobs {
        retries: Option<u8>,
        label: Option<String>,
        limits: Vec<Option<u8>>,
        extra: BTreeMap<String, Option<bool>>,
    }

    fn knobs() -> Knobs {
        Knobs {
            retries: Some(0),
            label: None,
            limits: vec![Some(1), None],
            extra: BTreeMap::from([("on".to_owned(), Some(false))]),
        }
    }

    #[test]
    fn set_options_are_wrapped_at_any_depth() {
        let marked = capture(&knobs()).expect("snapshot");
        assert_eq!(
            marked,
            json!({
                "retries": {PRESENT: 0},
                "label": null,
                "limits": [{PRESENT: 1}, null],
                "extra": {"on": {PRESENT: false}},
            })
        );
    }

    #[test]
    fn unmark_restores_the_plain_snapshot() {
        let marked = capture(&knobs()).expect("snapshot");
        assert_eq!(unmark(marked), serde_json::to_value(knobs()).expect("plain"));
    }

    #[test]
    fn only_wrapped_leaves_are_reported() {
        let leaf = json!({PRESENT: 0});
        let record = json!({PRESENT: {"port": 0}});
        let plain = json!({"port": 0});
        let as_map = |value: &JsonValue| value.as_object().cloned().unwrap_or_default();
        assert!(wraps_leaf(&as_map(&leaf)));
        assert!(!wraps_leaf(&as_map(&record)));
        assert!(!wraps_leaf(&as_map(&plain)));
    }
}
