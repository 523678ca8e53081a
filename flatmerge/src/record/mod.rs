//! Folding typed records into a destination, first non-zero value wins.
//!
//! Records are compared through their `serde` snapshots. A destination field
//! only takes a record's value while it still holds its zero value: `null`,
//! `false`, `0`, `""` or an empty sequence. Nested records and maps merge
//! field by field and keys missing from the destination are added. An
//! optional field that is set counts as non-zero whatever it holds, so
//! `Some(0)` and `Some(false)` are kept; a set optional record still merges
//! field by field.

mod snapshot;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use serde_json::map::Entry;

use crate::error::{MergeError, MergeResult};
use snapshot::{capture, unmark, wraps_leaf};

/// Fill the zero-valued fields of `dst` from `record`.
///
/// # Errors
///
/// Returns [`MergeError::Snapshot`] when `dst` cannot be serialised and
/// [`MergeError::StructMerge`] (tagged with `index`) when `record` cannot be
/// serialised or the filled snapshot no longer fits `T`.
pub(crate) fn fill_record<T, R>(dst: &mut T, record: &R, index: usize) -> MergeResult<()>
where
    T: Serialize + DeserializeOwned,
    R: Serialize + ?Sized,
{
    let mut filled = capture(&*dst).map_err(MergeError::Snapshot)?;
    let layer = capture(record).map_err(|source| MergeError::StructMerge { index, source })?;
    fill_zero(&mut filled, layer);
    *dst = serde_json::from_value(unmark(filled))
        .map_err(|source| MergeError::StructMerge { index, source })?;
    Ok(())
}

/// Copy values from `layer` into the zero-valued parts of `target`.
///
/// # Examples
///
/// ```rust
/// use flatmerge::record::fill_zero;
/// use serde_json::json;
///
/// let mut target = json!({"port": 0, "host": "localhost", "tls": {"cert": ""}});
/// fill_zero(&mut target, json!({"port": 443, "host": "example.org", "tls": {"cert": "a.pem"}}));
/// assert_eq!(
///     target,
///     json!({"port": 443, "host": "localhost", "tls": {"cert": "a.pem"}})
/// );
/// ```
pub fn fill_zero(target: &mut JsonValue, layer: JsonValue) {
    match (target, layer) {
        (JsonValue::Object(existing), JsonValue::Object(incoming)) if !wraps_leaf(existing) => {
            for (key, value) in incoming {
                match existing.entry(key) {
                    Entry::Vacant(slot) => {
                        slot.insert(value);
                    }
                    Entry::Occupied(mut slot) => fill_zero(slot.get_mut(), value),
                }
            }
        }
        (slot, incoming) => {
            if is_zero(slot) {
                *slot = incoming;
            }
        }
    }
}

/// Whether `value` is the snapshot of a zero value.
#[must_use]
pub fn is_zero(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::Bool(flag) => !flag,
        JsonValue::Number(number) => number
            .as_f64()
            .is_some_and(|float| float.classify() == std::num::FpCategory::Zero),
        JsonValue::String(text) => text.is_empty(),
        JsonValue::Array(items) => items.is_empty(),
        JsonValue::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
    struct Pair {
        f1: i32,
        f2: String,
    }

    #[rstest]
    #[case(json!(null), true)]
    #[case(json!(false), true)]
    #[case(json!(0), true)]
    #[case(json!(0.0), true)]
    #[case(json!(""), true)]
    #[case(json!([]), true)]
    #[case(json!(true), false)]
    #[case(json!(-1), false)]
    #[case(json!("x"), false)]
    #[case(json!([0]), false)]
    #[case(json!({}), false)]
    fn detects_zero_values(#[case] value: JsonValue, #[case] expected: bool) {
        assert_eq!(is_zero(&value), expected);
    }

    #[test]
    fn non_zero_fields_are_kept() {
        let mut dst = Pair {
            f1: 1,
            f2: String::new(),
        };
        let record = Pair {
            f1: 2,
            f2: "two".into(),
        };
        fill_record(&mut dst, &record, 0).expect("fill");
        assert_eq!(
            dst,
            Pair {
                f1: 1,
                f2: "two".into(),
            }
        );
    }

    #[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
    struct Tuning {
        retries: Option<u8>,
        verbose: Option<bool>,
        nested: Option<Pair>,
    }

    #[test]
    fn set_options_holding_zero_values_are_kept() {
        let mut dst = Tuning {
            retries: Some(0),
            verbose: Some(false),
            nested: None,
        };
        let record = Tuning {
            retries: Some(5),
            verbose: Some(true),
            nested: Some(Pair {
                f1: 7,
                f2: "seven".into(),
            }),
        };
        fill_record(&mut dst, &record, 0).expect("fill");
        assert_eq!(
            dst,
            Tuning {
                retries: Some(0),
                verbose: Some(false),
                nested: Some(Pair {
                    f1: 7,
                    f2: "seven".into(),
                }),
            }
        );
    }

    #[test]
    fn set_optional_records_merge_field_by_field() {
        let mut dst = Tuning {
            nested: Some(Pair {
                f1: 1,
                f2: String::new(),
            }),
            ..Tuning::default()
        };
        let record = Tuning {
            retries: Some(3),
            nested: Some(Pair {
                f1: 2,
                f2: "two".into(),
            }),
            ..Tuning::default()
        };
        fill_record(&mut dst, &record, 0).expect("fill");
        assert_eq!(dst.retries, Some(3));
        assert_eq!(dst.verbose, None);
        assert_eq!(
            dst.nested,
            Some(Pair {
                f1: 1,
                f2: "two".into(),
            })
        );
    }

    #[test]
    fn maps_gain_missing_keys_only() {
        let mut target = json!({"labels": {"a": "1", "b": ""}});
        fill_zero(&mut target, json!({"labels": {"a": "x", "b": "2", "c": "3"}}));
        assert_eq!(target, json!({"labels": {"a": "1", "b": "2", "c": "3"}}));
    }

    #[test]
    fn mismatched_records_fail_with_their_index() {
        #[derive(Serialize)]
        struct Wrong {
            f1: &'static str,
        }
        let mut dst = Pair::default();
        let err = fill_record(&mut dst, &Wrong { f1: "text" }, 3).expect_err("type mismatch");
        assert!(
            matches!(err, MergeError::StructMerge { index: 3, .. }),
            "unexpected error: {err:?}"
        );
        assert_eq!(dst, Pair::default());
    }
}
