//! JSON overlay used to lay an expanded map over a destination snapshot.

use serde_json::map::Entry;
use serde_json::{Map as JsonMap, Value as JsonValue};

/// Overlay `layer` onto `target`.
///
/// Objects merge recursively and keys match exactly. Arrays and scalars
/// replace the target wholesale. Case-insensitive matching belongs to struct
/// fields, which the decoder resolves once it knows the field names.
///
/// # Examples
///
/// ```rust
/// use flatmerge::decode::overlay;
/// use serde_json::json;
///
/// let mut acc = json!({"port": 80, "tls": {"enabled": false, "cert": "a.pem"}});
/// overlay(&mut acc, json!({"port": "8080", "tls": {"enabled": "true"}}));
/// assert_eq!(
///     acc,
///     json!({"port": "8080", "tls": {"enabled": "true", "cert": "a.pem"}})
/// );
/// ```
pub fn overlay(target: &mut JsonValue, layer: JsonValue) {
    match (target, layer) {
        (JsonValue::Object(existing), JsonValue::Object(incoming)) => {
            overlay_object(existing, incoming);
        }
        (slot, replacement) => *slot = replacement,
    }
}

fn overlay_object(target: &mut JsonMap<String, JsonValue>, layer: JsonMap<String, JsonValue>) {
    for (key, value) in layer {
        match target.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => overlay(slot.get_mut(), value),
        }
    }
}
