//! Deep merge of nested dictionaries.

use std::collections::btree_map::Entry;

use crate::value::{Dict, Value};

/// Merge `src` into `dst`, recursing wherever both sides hold an object.
///
/// Keys missing from `dst` are copied across. When both values are objects
/// they merge recursively with the same `overwrite` flag. Any other collision
/// keeps the value in `dst` unless `overwrite` is set, in which case the value
/// from `src` replaces it.
///
/// # Examples
///
/// ```rust
/// use flatmerge::{Value, expand, merge_dicts};
///
/// let mut dst = expand([("a__x", "1"), ("b", "keep")]);
/// let src = expand([("a__y", "2"), ("b", "drop")]);
/// merge_dicts(&mut dst, src, false);
///
/// let root = Value::Object(dst);
/// assert_eq!(root.pointer(&["a", "x"]), Some(&Value::from("1")));
/// assert_eq!(root.pointer(&["a", "y"]), Some(&Value::from("2")));
/// assert_eq!(root.pointer(&["b"]), Some(&Value::from("keep")));
/// ```
pub fn merge_dicts(dst: &mut Dict, src: Dict, overwrite: bool) {
    for (key, incoming) in src {
        match dst.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(incoming);
            }
            Entry::Occupied(mut slot) => match (slot.get_mut(), incoming) {
                (Value::Object(existing), Value::Object(nested)) => {
                    merge_dicts(existing, nested, overwrite);
                }
                (existing, replacement) => {
                    if overwrite {
                        *existing = replacement;
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn dict(entries: &[(&str, Value)]) -> Dict {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[rstest]
    #[case::kept(false, Value::from("old"))]
    #[case::replaced(true, Value::from("new"))]
    fn leaf_collisions_follow_overwrite(#[case] overwrite: bool, #[case] expected: Value) {
        let mut dst = dict(&[("k", Value::from("old"))]);
        merge_dicts(&mut dst, dict(&[("k", Value::from("new"))]), overwrite);
        assert_eq!(dst.get("k"), Some(&expected));
    }

    #[rstest]
    #[case::kept(false, Value::from("scalar"))]
    #[case::replaced(true, Value::Object(dict(&[("x", Value::from("1"))])))]
    fn type_mismatch_follows_overwrite(#[case] overwrite: bool, #[case] expected: Value) {
        let mut dst = dict(&[("k", Value::from("scalar"))]);
        let src = dict(&[("k", Value::Object(dict(&[("x", Value::from("1"))])))]);
        merge_dicts(&mut dst, src, overwrite);
        assert_eq!(dst.get("k"), Some(&expected));
    }

    #[test]
    fn nested_objects_merge_at_every_level() {
        let inner_dst = dict(&[("zip", Value::from("32123"))]);
        let inner_src = dict(&[("planet", Value::from("Earth"))]);
        let mut dst = dict(&[(
            "parents",
            Value::Object(dict(&[("address", Value::Object(inner_dst))])),
        )]);
        let src = dict(&[(
            "parents",
            Value::Object(dict(&[("address", Value::Object(inner_src))])),
        )]);

        merge_dicts(&mut dst, src, false);

        let root = Value::Object(dst);
        assert_eq!(
            root.pointer(&["parents", "address", "zip"]),
            Some(&Value::from("32123"))
        );
        assert_eq!(
            root.pointer(&["parents", "address", "planet"]),
            Some(&Value::from("Earth"))
        );
    }
}
