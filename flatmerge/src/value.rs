//! Classified values and the nested mapping built from flat maps.
//!
//! Every raw string is interpreted exactly once as a [`Value`]. Nested
//! structure is expressed through [`Value::Object`], so the expanded result of
//! a flat map is a plain [`Dict`].

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map as JsonMap, Value as JsonValue};

/// Nested mapping from key to classified value.
///
/// A `BTreeMap` keeps iteration deterministic, which the decoder and the
/// figment bridge both rely on.
pub type Dict = BTreeMap<String, Value>;

/// Single-level mapping from string key to raw string value.
pub type FlatMap = BTreeMap<String, String>;

/// Interpretation of a raw string value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// Plain text, left exactly as supplied.
    Scalar(String),
    /// Comma or bracket delimited list.
    List(Vec<String>),
    /// Nested mapping, either from a separated key path or embedded JSON.
    Object(Dict),
}

/// Shape of a [`Value`], used in diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// See [`Value::Scalar`].
    Scalar,
    /// See [`Value::List`].
    List,
    /// See [`Value::Object`].
    Object,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Scalar => "scalar",
            Self::List => "list",
            Self::Object => "object",
        })
    }
}

impl Value {
    /// Returns an empty [`Value::Object`].
    #[must_use]
    pub const fn empty_object() -> Self {
        Self::Object(Dict::new())
    }

    /// Returns the shape of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Scalar(_) => ValueKind::Scalar,
            Self::List(_) => ValueKind::List,
            Self::Object(_) => ValueKind::Object,
        }
    }

    /// Whether this value is a nested mapping.
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Borrow the scalar text, if any.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(text) => Some(text),
            _ => None,
        }
    }

    /// Borrow the list items, if any.
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow the nested mapping, if any.
    #[must_use]
    pub const fn as_object(&self) -> Option<&Dict> {
        match self {
            Self::Object(dict) => Some(dict),
            _ => None,
        }
    }

    /// Mutably borrow the nested mapping, if any.
    #[must_use]
    pub fn as_object_mut(&mut self) -> Option<&mut Dict> {
        match self {
            Self::Object(dict) => Some(dict),
            _ => None,
        }
    }

    /// Follow a sequence of keys through nested objects.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use flatmerge::{Value, expand};
    ///
    /// let dict = expand([("Address__City", "LA")]);
    /// let root = Value::Object(dict);
    /// assert_eq!(
    ///     root.pointer(&["Address", "City"]).and_then(Value::as_scalar),
    ///     Some("LA")
    /// );
    /// ```
    #[must_use]
    pub fn pointer(&self, path: &[&str]) -> Option<&Self> {
        path.iter()
            .try_fold(self, |current, key| current.as_object()?.get(*key))
    }

    /// Convert into the JSON representation handed to the decoder.
    ///
    /// Scalars become strings, lists become arrays of strings and objects
    /// become JSON objects. Type coercion happens later, in the decoder.
    #[must_use]
    pub fn into_json(self) -> JsonValue {
        match self {
            Self::Scalar(text) => JsonValue::String(text),
            Self::List(items) => {
                JsonValue::Array(items.into_iter().map(JsonValue::String).collect())
            }
            Self::Object(dict) => JsonValue::Object(dict_into_json(dict)),
        }
    }

    /// Convert a parsed JSON value into its classified form.
    ///
    /// Returns `None` for JSON `null`, which has no classified counterpart.
    /// Array elements that are themselves arrays or objects are kept as
    /// compact JSON text.
    #[must_use]
    pub fn from_json(json: JsonValue) -> Option<Self> {
        match json {
            JsonValue::Null => None,
            JsonValue::Bool(flag) => Some(Self::Scalar(flag.to_string())),
            JsonValue::Number(number) => Some(Self::Scalar(number.to_string())),
            JsonValue::String(text) => Some(Self::Scalar(text)),
            JsonValue::Array(items) => {
                Some(Self::List(items.into_iter().map(json_item_text).collect()))
            }
            JsonValue::Object(map) => Some(Self::Object(dict_from_json(map))),
        }
    }
}

/// Convert a [`Dict`] into a JSON object map.
#[must_use]
pub fn dict_into_json(dict: Dict) -> JsonMap<String, JsonValue> {
    dict.into_iter()
        .map(|(key, value)| (key, value.into_json()))
        .collect()
}

/// Convert a JSON object map into a [`Dict`], dropping `null` members.
#[must_use]
pub fn dict_from_json(map: JsonMap<String, JsonValue>) -> Dict {
    map.into_iter()
        .filter_map(|(key, value)| Value::from_json(value).map(|v| (key, v)))
        .collect()
}

fn json_item_text(item: JsonValue) -> String {
    match item {
        JsonValue::Null => String::new(),
        JsonValue::String(text) => text,
        other => other.to_string(),
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Scalar(text.to_owned())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::Scalar(text)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<Dict> for Value {
    fn from(dict: Dict) -> Self {
        Self::Object(dict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!("x"), Some(Value::from("x")))]
    #[case(json!(12), Some(Value::from("12")))]
    #[case(json!(true), Some(Value::from("true")))]
    #[case(json!(null), None)]
    #[case(json!(["a", 1, [2]]), Some(Value::List(vec!["a".into(), "1".into(), "[2]".into()])))]
    fn converts_json_members(#[case] input: JsonValue, #[case] expected: Option<Value>) {
        assert_eq!(Value::from_json(input), expected);
    }

    #[test]
    fn drops_null_members_from_objects() {
        let map = json!({"a": null, "b": {"c": "d"}});
        let Some(Value::Object(dict)) = Value::from_json(map) else {
            panic!("expected an object");
        };
        assert!(!dict.contains_key("a"));
        assert_eq!(
            Value::Object(dict).pointer(&["b", "c"]),
            Some(&Value::from("d"))
        );
    }

    #[test]
    fn renders_lists_as_string_arrays() {
        let value = Value::List(vec!["1".into(), "2".into()]);
        assert_eq!(value.into_json(), json!(["1", "2"]));
    }
}
