//! Interpretation of raw string values.
//!
//! A raw value is one of three shapes:
//!
//! - embedded object notation, any trimmed value wrapped in `{` and `}`;
//! - a delimited list, a value containing a comma or wrapped in `[` and `]`;
//! - a scalar, anything else.
//!
//! Object detection always wins over list detection because object text
//! commonly contains commas.

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::options::{Diagnostic, MergeOptions};
use crate::value::{Dict, Value, dict_from_json};

/// Classifies raw values, reporting lenient parses through the options' hook.
#[derive(Clone, Copy, Debug)]
pub struct Classifier<'a> {
    options: &'a MergeOptions,
}

impl<'a> Classifier<'a> {
    /// Create a classifier bound to `options`.
    #[must_use]
    pub const fn new(options: &'a MergeOptions) -> Self {
        Self { options }
    }

    /// Classify `raw` as a scalar, list or object.
    ///
    /// Object notation that is not valid JSON degrades to an empty object and
    /// raises [`Diagnostic::MalformedObject`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use flatmerge::{Classifier, MergeOptions, Value};
    ///
    /// let options = MergeOptions::default();
    /// let classifier = Classifier::new(&options);
    /// assert_eq!(classifier.classify("plain"), Value::from("plain"));
    /// assert_eq!(
    ///     classifier.classify("[ a, 'b c' ]"),
    ///     Value::List(vec!["a".into(), "b c".into()])
    /// );
    /// ```
    #[must_use]
    pub fn classify(&self, raw: &str) -> Value {
        if is_object_notation(raw) {
            Value::Object(self.parse_object(raw))
        } else if is_list_notation(raw) {
            Value::List(parse_list(raw))
        } else {
            Value::Scalar(raw.to_owned())
        }
    }

    fn parse_object(&self, raw: &str) -> Dict {
        match serde_json::from_str::<JsonMap<String, JsonValue>>(raw.trim()) {
            Ok(map) => dict_from_json(map),
            Err(err) => {
                self.options.report(&Diagnostic::MalformedObject {
                    raw: raw.to_owned(),
                    reason: err.to_string(),
                });
                Dict::new()
            }
        }
    }
}

/// Classify `raw` using default options.
///
/// # Examples
///
/// ```rust
/// use flatmerge::{Value, classify};
///
/// assert_eq!(
///     classify("B1,B2, B3"),
///     Value::List(vec!["B1".into(), "B2".into(), "B3".into()])
/// );
/// assert!(classify(r#"{"city": "LA"}"#).is_object());
/// ```
#[must_use]
pub fn classify(raw: &str) -> Value {
    Classifier::new(&MergeOptions::default()).classify(raw)
}

/// Whether `raw` looks like an embedded JSON object.
#[must_use]
pub fn is_object_notation(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.starts_with('{') && trimmed.ends_with('}')
}

/// Whether `raw` should be split into a list.
#[must_use]
pub fn is_list_notation(raw: &str) -> bool {
    if is_object_notation(raw) {
        return false;
    }
    let trimmed = raw.trim();
    trimmed.contains(',') || (trimmed.starts_with('[') && trimmed.ends_with(']'))
}

/// Split list text into its items.
///
/// Leading and trailing brackets and spaces are removed, the rest is split
/// on commas, and each item is trimmed of spaces and then of single quotes.
/// Empty items are kept.
#[must_use]
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.trim_matches(|c: char| matches!(c, '[' | ']' | ' '))
        .split(',')
        .map(|item| item.trim_matches(' ').trim_matches('\'').to_owned())
        .collect()
}
