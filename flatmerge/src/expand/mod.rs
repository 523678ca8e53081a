//! Expansion of flat maps into nested dictionaries.
//!
//! Keys are split on the configured separator and each segment descends one
//! level into the result. Colliding objects merge recursively; any other
//! collision is resolved by the last write. Entries are applied in ascending
//! key order so the output never depends on the iteration order of the input
//! container.

mod merge;

use std::collections::btree_map::Entry;

pub use merge::merge_dicts;

use crate::classify::Classifier;
use crate::options::{Diagnostic, MergeOptions};
use crate::value::{Dict, Value, ValueKind};

/// Builds nested dictionaries from flat maps.
#[derive(Clone, Copy, Debug)]
pub struct Expander<'a> {
    options: &'a MergeOptions,
}

impl<'a> Expander<'a> {
    /// Create an expander bound to `options`.
    #[must_use]
    pub const fn new(options: &'a MergeOptions) -> Self {
        Self { options }
    }

    /// Expand `flat` into a nested dictionary.
    ///
    /// Keys that are empty or contain an empty segment are skipped and raised
    /// as [`Diagnostic::DegenerateKey`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use flatmerge::{Expander, MergeOptions, Value};
    ///
    /// let options = MergeOptions::new().separator(".");
    /// let dict = Expander::new(&options).expand([("dns.servers", "[a, b]")]);
    /// assert_eq!(
    ///     Value::Object(dict).pointer(&["dns", "servers"]),
    ///     Some(&Value::List(vec!["a".into(), "b".into()]))
    /// );
    /// ```
    #[must_use]
    pub fn expand<I, K, V>(&self, flat: I) -> Dict
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut entries: Vec<(K, V)> = flat.into_iter().collect();
        entries.sort_by(|(left, _), (right, _)| left.as_ref().cmp(right.as_ref()));

        let classifier = Classifier::new(self.options);
        let mut result = Dict::new();
        for (key, raw) in &entries {
            self.insert(&mut result, key.as_ref(), classifier.classify(raw.as_ref()));
        }
        tracing::trace!(
            entries = entries.len(),
            top_level = result.len(),
            "expanded flat map"
        );
        result
    }

    /// Apply a single classified entry to `dict`.
    ///
    /// Returns `false` when `key` is degenerate and nothing was inserted.
    pub fn insert(&self, dict: &mut Dict, key: &str, value: Value) -> bool {
        let Some(segments) = self.segments(key) else {
            self.options.report(&Diagnostic::DegenerateKey {
                key: key.to_owned(),
            });
            return false;
        };
        let Some((leaf, parents)) = segments.split_last() else {
            return false;
        };

        let mut current = dict;
        for (depth, segment) in parents.iter().enumerate() {
            let slot = current
                .entry((*segment).to_owned())
                .or_insert_with(Value::empty_object);
            if !slot.is_object() {
                self.discarded(parents.get(..=depth), slot.kind(), ValueKind::Object);
                *slot = Value::empty_object();
            }
            let Some(next) = slot.as_object_mut() else {
                return false;
            };
            current = next;
        }
        self.assign(current, &segments, leaf, value);
        true
    }

    fn assign(&self, dict: &mut Dict, path: &[&str], leaf: &str, value: Value) {
        match dict.entry(leaf.to_owned()) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => match (slot.get_mut(), value) {
                (Value::Object(existing), Value::Object(incoming)) => {
                    merge_dicts(existing, incoming, false);
                }
                (existing, incoming) => {
                    if existing.is_object() != incoming.is_object() {
                        self.discarded(Some(path), existing.kind(), incoming.kind());
                    }
                    *existing = incoming;
                }
            },
        }
    }

    fn segments<'k>(&self, key: &'k str) -> Option<Vec<&'k str>> {
        if key.is_empty() {
            return None;
        }
        let separator = self.options.separator_str();
        let segments: Vec<&str> = if separator.is_empty() {
            vec![key]
        } else {
            key.split(separator).collect()
        };
        segments.iter().all(|s| !s.is_empty()).then_some(segments)
    }

    fn discarded(&self, path: Option<&[&str]>, discarded: ValueKind, replacement: ValueKind) {
        let joined = path.unwrap_or_default().join(self.options.separator_str());
        self.options.report(&Diagnostic::ValueDiscarded {
            path: joined,
            discarded,
            replacement,
        });
    }
}

/// Expand `flat` using default options.
///
/// # Examples
///
/// ```rust
/// use flatmerge::{Value, expand};
///
/// let dict = expand([
///     ("Address__City", "LA"),
///     ("Address__Country", "US"),
/// ]);
/// let address = dict.get("Address").and_then(Value::as_object).expect("nested");
/// assert_eq!(address.get("City"), Some(&Value::from("LA")));
/// assert_eq!(address.get("Country"), Some(&Value::from("US")));
/// ```
#[must_use]
pub fn expand<I, K, V>(flat: I) -> Dict
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    Expander::new(&MergeOptions::default()).expand(flat)
}

#[cfg(test)]
mod tests;
