//! Weakly typed `serde` deserializer over JSON values.
//!
//! Flat maps deliver every leaf as text, so the deserializer coerces text,
//! numbers and booleans into whatever primitive the destination asks for.

use std::num::FpCategory;

use serde::de::{
    self, DeserializeSeed, EnumAccess, MapAccess, SeqAccess, Unexpected, VariantAccess, Visitor,
};
use serde::forward_to_deserialize_any;
use serde_json::map::Entry;
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::error::DecodeError;
use super::overlay::overlay;

type Result<T> = std::result::Result<T, DecodeError>;

const TRUE_WORDS: [&str; 6] = ["1", "t", "T", "TRUE", "true", "True"];
const FALSE_WORDS: [&str; 7] = ["", "0", "f", "F", "FALSE", "false", "False"];

/// Deserializer that owns one JSON value and coerces it on demand.
///
/// An optional layer sits on top of the value. Struct fields pair the layer's
/// keys with the value's ignoring ASCII case, map keys pair exactly, and
/// anywhere else the layer replaces the value.
pub(crate) struct WeakDeserializer {
    value: JsonValue,
    layer: Option<JsonValue>,
}

impl WeakDeserializer {
    pub(crate) const fn new(value: JsonValue) -> Self {
        Self { value, layer: None }
    }

    pub(crate) const fn layered(value: JsonValue, layer: JsonValue) -> Self {
        Self {
            value,
            layer: Some(layer),
        }
    }

    /// Collapse the layer onto the value where no field names are known.
    fn settle(self) -> JsonValue {
        match self.layer {
            None => self.value,
            Some(layer) => {
                let mut settled = self.value;
                overlay(&mut settled, layer);
                settled
            }
        }
    }
}

macro_rules! weak_integer {
    ($($method:ident)*) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
            let value = self.settle();
            match coerce_integer(&value)? {
                Some(number) => visit_integer(number, visitor),
                None => Self::new(value).deserialize_any(visitor),
            }
        }
    )*};
}

macro_rules! weak_float {
    ($($method:ident)*) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
            let value = self.settle();
            match coerce_float(&value)? {
                Some(number) => visitor.visit_f64(number),
                None => Self::new(value).deserialize_any(visitor),
            }
        }
    )*};
}

impl<'de> de::Deserializer<'de> for WeakDeserializer {
    type Error = DecodeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.settle() {
            JsonValue::Null => visitor.visit_unit(),
            JsonValue::Bool(flag) => visitor.visit_bool(flag),
            JsonValue::Number(number) => {
                if let Some(signed) = number.as_i64() {
                    visitor.visit_i64(signed)
                } else if let Some(unsigned) = number.as_u64() {
                    visitor.visit_u64(unsigned)
                } else {
                    visitor.visit_f64(number.as_f64().unwrap_or_default())
                }
            }
            JsonValue::String(text) => visitor.visit_string(text),
            JsonValue::Array(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            JsonValue::Object(map) => visitor.visit_map(MapDeserializer::new(map)),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let value = self.settle();
        match coerce_bool(&value)? {
            Some(flag) => visitor.visit_bool(flag),
            None => Self::new(value).deserialize_any(visitor),
        }
    }

    weak_integer! {
        deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64 deserialize_i128
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64 deserialize_u128
    }

    weak_float! { deserialize_f32 deserialize_f64 }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_string(visitor)
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.settle() {
            JsonValue::String(text) => visitor.visit_string(text),
            JsonValue::Bool(flag) => visitor.visit_string(flag.to_string()),
            JsonValue::Number(number) => visitor.visit_string(number.to_string()),
            other => Self::new(other).deserialize_any(visitor),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match (self.value, self.layer) {
            (_, Some(JsonValue::Null)) | (JsonValue::Null, None) => visitor.visit_none(),
            (JsonValue::Null, Some(layer)) => visitor.visit_some(Self::new(layer)),
            (value, layer) => visitor.visit_some(Self { value, layer }),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let value = self.settle();
        if is_unit_like(&value) {
            visitor.visit_unit()
        } else {
            Self::new(value).deserialize_any(visitor)
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let items = match self.settle() {
            JsonValue::Array(items) if is_blank_list(&items) => Vec::new(),
            JsonValue::Array(items) => items,
            JsonValue::Null => Vec::new(),
            JsonValue::String(text) if text.is_empty() => Vec::new(),
            JsonValue::Object(map) if map.is_empty() => Vec::new(),
            single => vec![single],
        };
        visitor.visit_seq(SeqDeserializer::new(items))
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match (self.value, self.layer) {
            (JsonValue::Object(base), Some(JsonValue::Object(layer))) => {
                visitor.visit_map(MapDeserializer::layered(base, layer))
            }
            (value, layer) => match (Self { value, layer }).settle() {
                JsonValue::Object(map) => visitor.visit_map(MapDeserializer::new(map)),
                other if is_empty_container(&other) => {
                    visitor.visit_map(MapDeserializer::new(JsonMap::new()))
                }
                other => Self::new(other).deserialize_any(visitor),
            },
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match (self.value, self.layer) {
            (JsonValue::Object(base), Some(JsonValue::Object(layer))) => visitor.visit_map(
                MapDeserializer::layered(align_fields(base, fields), align_fields(layer, fields)),
            ),
            (value, layer) => match (Self { value, layer }).settle() {
                JsonValue::Object(map) => {
                    visitor.visit_map(MapDeserializer::new(align_fields(map, fields)))
                }
                other if is_empty_container(&other) => {
                    visitor.visit_map(MapDeserializer::new(JsonMap::new()))
                }
                other => Self::new(other).deserialize_any(visitor),
            },
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self.settle() {
            JsonValue::String(text) => {
                let variant = resolve_name(&text, variants).map_or(text, str::to_owned);
                visitor.visit_enum(EnumDeserializer {
                    variant,
                    value: None,
                })
            }
            JsonValue::Object(map) => {
                let mut entries = map.into_iter();
                match (entries.next(), entries.next()) {
                    (Some((key, value)), None) => {
                        let variant = resolve_name(&key, variants).map_or(key, str::to_owned);
                        visitor.visit_enum(EnumDeserializer {
                            variant,
                            value: Some(value),
                        })
                    }
                    _ => Err(de::Error::invalid_value(
                        Unexpected::Map,
                        &"a map with a single key",
                    )),
                }
            }
            other => Err(de::Error::invalid_type(
                unexpected(&other),
                &"a variant name or a single-key map",
            )),
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_string(visitor)
    }

    // Skipped values are never inspected, so there is nothing to coerce.
    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! { bytes byte_buf }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<JsonValue>,
    index: usize,
}

impl SeqDeserializer {
    fn new(items: Vec<JsonValue>) -> Self {
        Self {
            iter: items.into_iter(),
            index: 0,
        }
    }
}

impl<'de> SeqAccess<'de> for SeqDeserializer {
    type Error = DecodeError;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        let Some(value) = self.iter.next() else {
            return Ok(None);
        };
        let index = self.index;
        self.index += 1;
        seed.deserialize(WeakDeserializer::new(value))
            .map(Some)
            .map_err(|err| err.at(index.to_string()))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// A key, its value and whatever layer sits over that value.
type Slot = (String, JsonValue, Option<JsonValue>);

struct MapDeserializer {
    iter: std::vec::IntoIter<Slot>,
    pending: Option<Slot>,
}

impl MapDeserializer {
    fn new(map: JsonMap<String, JsonValue>) -> Self {
        Self::from_slots(map.into_iter().map(|(key, item)| (key, item, None)).collect())
    }

    /// Pair every key of `base` with the same key of `layer`. Keys only the
    /// layer holds follow on their own.
    fn layered(base: JsonMap<String, JsonValue>, mut layer: JsonMap<String, JsonValue>) -> Self {
        let mut slots: Vec<Slot> = base
            .into_iter()
            .map(|(key, item)| {
                let top = layer.remove(key.as_str());
                (key, item, top)
            })
            .collect();
        slots.extend(layer.into_iter().map(|(key, item)| (key, item, None)));
        Self::from_slots(slots)
    }

    fn from_slots(slots: Vec<Slot>) -> Self {
        Self {
            iter: slots.into_iter(),
            pending: None,
        }
    }
}

impl<'de> MapAccess<'de> for MapDeserializer {
    type Error = DecodeError;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        let Some((key, value, layer)) = self.iter.next() else {
            return Ok(None);
        };
        let parsed = seed
            .deserialize(WeakDeserializer::new(JsonValue::String(key.clone())))
            .map_err(|err| err.at(key.clone()))?;
        self.pending = Some((key, value, layer));
        Ok(Some(parsed))
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        let Some((key, value, layer)) = self.pending.take() else {
            return Err(de::Error::custom("map value requested before its key"));
        };
        seed.deserialize(WeakDeserializer { value, layer })
            .map_err(|err| err.at(key))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<JsonValue>,
}

impl<'de> EnumAccess<'de> for EnumDeserializer {
    type Error = DecodeError;
    type Variant = VariantDeserializer;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self::Variant)> {
        let tag = seed.deserialize(WeakDeserializer::new(JsonValue::String(self.variant)))?;
        Ok((tag, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Option<JsonValue>,
}

impl VariantDeserializer {
    fn into_content(self) -> Result<JsonValue> {
        self.value.ok_or_else(|| {
            de::Error::invalid_type(Unexpected::UnitVariant, &"a variant with content")
        })
    }
}

impl<'de> VariantAccess<'de> for VariantDeserializer {
    type Error = DecodeError;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            None => Ok(()),
            Some(value) => de::Deserialize::deserialize(WeakDeserializer::new(value)),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        seed.deserialize(WeakDeserializer::new(self.into_content()?))
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_seq(WeakDeserializer::new(self.into_content()?), visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        de::Deserializer::deserialize_struct(
            WeakDeserializer::new(self.into_content()?),
            "",
            fields,
            visitor,
        )
    }
}

/// Booleans accept the usual spellings of true and false, and numbers where
/// any non-zero value is true.
fn coerce_bool(value: &JsonValue) -> Result<Option<bool>> {
    match value {
        JsonValue::Bool(flag) => Ok(Some(*flag)),
        JsonValue::Number(number) => Ok(Some(number_is_non_zero(number))),
        JsonValue::String(text) if TRUE_WORDS.contains(&text.as_str()) => Ok(Some(true)),
        JsonValue::String(text) if FALSE_WORDS.contains(&text.as_str()) => Ok(Some(false)),
        JsonValue::String(text) => Err(de::Error::custom(format!(
            "cannot parse `{text}` as a boolean"
        ))),
        _ => Ok(None),
    }
}

fn number_is_non_zero(number: &serde_json::Number) -> bool {
    if let Some(signed) = number.as_i64() {
        signed != 0
    } else if let Some(unsigned) = number.as_u64() {
        unsigned != 0
    } else {
        number
            .as_f64()
            .is_some_and(|float| float.classify() != FpCategory::Zero)
    }
}

fn coerce_integer(value: &JsonValue) -> Result<Option<i128>> {
    match value {
        JsonValue::Bool(flag) => Ok(Some(i128::from(*flag))),
        JsonValue::Number(number) => {
            if let Some(signed) = number.as_i64() {
                Ok(Some(i128::from(signed)))
            } else if let Some(unsigned) = number.as_u64() {
                Ok(Some(i128::from(unsigned)))
            } else {
                Ok(number.as_f64().and_then(truncate))
            }
        }
        JsonValue::String(text) if text.trim().is_empty() => Ok(Some(0)),
        JsonValue::String(text) => text.trim().parse::<i128>().map(Some).map_err(|err| {
            de::Error::custom(format!("cannot parse `{text}` as an integer: {err}"))
        }),
        _ => Ok(None),
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "fractional input is truncated towards zero, saturating at the bounds"
)]
fn truncate(float: f64) -> Option<i128> {
    float.is_finite().then(|| float.trunc() as i128)
}

fn visit_integer<'de, V: Visitor<'de>>(number: i128, visitor: V) -> Result<V::Value> {
    if let Ok(signed) = i64::try_from(number) {
        visitor.visit_i64(signed)
    } else if let Ok(unsigned) = u64::try_from(number) {
        visitor.visit_u64(unsigned)
    } else {
        visitor.visit_i128(number)
    }
}

fn coerce_float(value: &JsonValue) -> Result<Option<f64>> {
    match value {
        JsonValue::Bool(flag) => Ok(Some(if *flag { 1.0 } else { 0.0 })),
        JsonValue::Number(number) => Ok(number.as_f64()),
        JsonValue::String(text) if text.trim().is_empty() => Ok(Some(0.0)),
        JsonValue::String(text) => text.trim().parse::<f64>().map(Some).map_err(|err| {
            de::Error::custom(format!("cannot parse `{text}` as a float: {err}"))
        }),
        _ => Ok(None),
    }
}

fn is_unit_like(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::String(text) => text.is_empty(),
        _ => false,
    }
}

/// An empty list which went through flat-map text comes back as `[""]`.
fn is_blank_list(items: &[JsonValue]) -> bool {
    matches!(items, [JsonValue::String(text)] if text.is_empty())
}

fn is_empty_container(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::Array(items) => items.is_empty(),
        JsonValue::String(text) => text.is_empty(),
        _ => false,
    }
}

/// Exact match first, then ASCII case-insensitive.
fn resolve_name(key: &str, names: &'static [&'static str]) -> Option<&'static str> {
    names
        .iter()
        .find(|name| **name == key)
        .or_else(|| names.iter().find(|name| name.eq_ignore_ascii_case(key)))
        .copied()
}

/// Rename keys to the struct's field names, combining keys that resolve to
/// the same field. Objects merge; any other value replaces the earlier one.
fn align_fields(
    map: JsonMap<String, JsonValue>,
    fields: &'static [&'static str],
) -> JsonMap<String, JsonValue> {
    let mut aligned = JsonMap::new();
    for (key, value) in map {
        let name = resolve_name(&key, fields).map_or(key, str::to_owned);
        match aligned.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => overlay(slot.get_mut(), value),
        }
    }
    aligned
}

fn unexpected(value: &JsonValue) -> Unexpected<'_> {
    match value {
        JsonValue::Null => Unexpected::Unit,
        JsonValue::Bool(flag) => Unexpected::Bool(*flag),
        JsonValue::Number(number) => number
            .as_i64()
            .map(Unexpected::Signed)
            .or_else(|| number.as_u64().map(Unexpected::Unsigned))
            .unwrap_or_else(|| Unexpected::Float(number.as_f64().unwrap_or_default())),
        JsonValue::String(text) => Unexpected::Str(text),
        JsonValue::Array(_) => Unexpected::Seq,
        JsonValue::Object(_) => Unexpected::Map,
    }
}
