//! Weakly typed decoding of nested mappings into `serde` types.
//!
//! Expanded flat maps hold nothing but text, lists of text and nested
//! objects. The decoder bridges that to typed destinations by coercing at the
//! point each field asks for a primitive:
//!
//! - text to integers and floats, with empty text read as zero;
//! - `1`, `t`, `T`, `TRUE`, `true`, `True` and their false counterparts (plus
//!   empty text) to booleans, and numbers to booleans where non-zero is true;
//! - numbers and booleans to text;
//! - a single value to a one-element sequence, and empty text, `null` or a
//!   list holding only empty text to an empty sequence;
//! - `null` or an empty list to an empty map or struct;
//! - text to unit enum variants.
//!
//! Struct fields match exactly first and then ignoring ASCII case. Map keys
//! always match exactly.

mod de;
mod error;
mod overlay;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

pub use error::DecodeError;
pub use overlay::overlay;

use crate::error::{MergeError, MergeResult};
use crate::value::{Dict, dict_into_json};
use de::WeakDeserializer;

/// Decode `dict` into a freshly built `T`.
///
/// # Errors
///
/// Returns a [`DecodeError`] naming the failing field when a value cannot be
/// coerced or a required field is missing.
///
/// # Examples
///
/// ```rust
/// use flatmerge::{decode::decode, expand};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Server {
///     port: u16,
///     tls: bool,
///     hosts: Vec<String>,
/// }
///
/// let server: Server = decode(expand([
///     ("PORT", "8080"),
///     ("TLS", "t"),
///     ("HOSTS", "a.example,b.example"),
/// ]))?;
/// assert_eq!(server.port, 8080);
/// assert!(server.tls);
/// assert_eq!(server.hosts, ["a.example", "b.example"]);
/// # Ok::<_, flatmerge::decode::DecodeError>(())
/// ```
pub fn decode<T: DeserializeOwned>(dict: Dict) -> Result<T, DecodeError> {
    decode_value(JsonValue::Object(dict_into_json(dict)))
}

/// Decode an arbitrary JSON value with weak coercion.
///
/// # Errors
///
/// Returns a [`DecodeError`] when `value` cannot be coerced into `T`.
pub fn decode_value<T: DeserializeOwned>(value: JsonValue) -> Result<T, DecodeError> {
    T::deserialize(WeakDeserializer::new(value))
}

/// Overlay `dict` onto `dst`.
///
/// Fields present in `dict` replace the destination's values, nested
/// structures merge, and fields absent from `dict` keep their current
/// values. Keys pair with struct fields ignoring ASCII case, while keys of
/// map-typed fields pair exactly. Fields the destination never serialises (for example
/// `#[serde(skip)]`) are rebuilt from their defaults.
///
/// # Errors
///
/// Returns [`MergeError::Snapshot`] when `dst` cannot be serialised and
/// [`MergeError::Decode`] when the combined value cannot be decoded.
///
/// # Examples
///
/// ```rust
/// use flatmerge::{decode::decode_into, expand};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Limits {
///     soft: u32,
///     hard: u32,
/// }
///
/// let mut limits = Limits { soft: 1, hard: 2 };
/// decode_into(&mut limits, expand([("HARD", "64")]))?;
/// assert_eq!((limits.soft, limits.hard), (1, 64));
/// # Ok::<_, flatmerge::MergeError>(())
/// ```
pub fn decode_into<T>(dst: &mut T, dict: Dict) -> MergeResult<()>
where
    T: Serialize + DeserializeOwned,
{
    decode_into_at(dst, dict, 0)
}

pub(crate) fn decode_into_at<T>(dst: &mut T, dict: Dict, index: usize) -> MergeResult<()>
where
    T: Serialize + DeserializeOwned,
{
    let snapshot = serde_json::to_value(&*dst).map_err(MergeError::Snapshot)?;
    let layer = JsonValue::Object(dict_into_json(dict));
    *dst = T::deserialize(WeakDeserializer::layered(snapshot, layer))
        .map_err(|source| MergeError::Decode { index, source })?;
    Ok(())
}
