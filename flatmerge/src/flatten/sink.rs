//! Accumulator handed to [`Flatten`] implementations.

use std::fmt::Display;

use super::Flatten;
use crate::options::MergeOptions;
use crate::value::FlatMap;

/// Static description of one record field, emitted by `#[derive(Flatten)]`.
///
/// `tags` lists the `(tag, name)` pairs declared on the field. The name
/// actually used is chosen against the tag preference configured in
/// [`MergeOptions::tag_keys`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    /// Rust field name, used when no tag supplies a name.
    pub ident: &'static str,
    /// Declared tag names, in declaration order.
    pub tags: &'static [(&'static str, &'static str)],
    /// Whether the field is excluded regardless of tags.
    pub skip: bool,
}

impl FieldSpec {
    /// Choose the key segment for this field, or `None` when it is ignored.
    ///
    /// Tag keys are tried in order. The first tag carrying a non-empty name
    /// other than `-` supplies the name; a tag set to `-` ignores the field.
    /// Empty or missing tags fall through to the next key and finally to the
    /// Rust field name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use flatmerge::FieldSpec;
    ///
    /// let spec = FieldSpec {
    ///     ident: "title",
    ///     tags: &[("json", ""), ("yaml", "name"), ("toml", "-")],
    ///     skip: false,
    /// };
    /// let keys = |tags: &[&str]| tags.iter().map(|t| (*t).to_owned()).collect::<Vec<_>>();
    /// assert_eq!(spec.resolve(&keys(&["json", "yaml"])), Some("name"));
    /// assert_eq!(spec.resolve(&keys(&["toml", "yaml"])), None);
    /// assert_eq!(spec.resolve(&keys(&["serde"])), Some("title"));
    /// ```
    #[must_use]
    pub fn resolve(&self, tag_keys: &[String]) -> Option<&'static str> {
        if self.skip {
            return None;
        }
        for key in tag_keys {
            match self.tags.iter().find(|(tag, _)| *tag == key.as_str()) {
                Some((_, "-")) => return None,
                Some((_, name)) if !name.is_empty() => return Some(*name),
                _ => {}
            }
        }
        Some(self.ident)
    }
}

/// Collects flattened entries under lower-cased, separator-joined keys.
#[derive(Debug)]
pub struct FlatSink<'a> {
    options: &'a MergeOptions,
    entries: FlatMap,
}

impl<'a> FlatSink<'a> {
    pub(crate) const fn new(options: &'a MergeOptions) -> Self {
        Self {
            options,
            entries: FlatMap::new(),
        }
    }

    /// Join `parent` and `segment` with the configured separator, lower-cased.
    #[must_use]
    pub fn child_path(&self, parent: &str, segment: &str) -> String {
        let joined = if parent.is_empty() {
            segment.to_owned()
        } else {
            format!("{parent}{}{segment}", self.options.separator_str())
        };
        joined.to_lowercase()
    }

    /// Flatten one record field under `parent`, honouring its tags.
    pub fn field<T: Flatten + ?Sized>(&mut self, parent: &str, spec: &FieldSpec, value: &T) {
        let Some(name) = spec.resolve(self.options.tags()) else {
            return;
        };
        let path = self.child_path(parent, name);
        value.flatten_into(&path, self);
    }

    /// Flatten one map entry under `parent`; spaces in `key` become `_`.
    pub fn entry<K, V>(&mut self, parent: &str, key: &K, value: &V)
    where
        K: Display + ?Sized,
        V: Flatten + ?Sized,
    {
        let segment = key.to_string().replace(' ', "_");
        let path = self.child_path(parent, &segment);
        value.flatten_into(&path, self);
    }

    /// Record a rendered leaf at `path`.
    pub fn leaf(&mut self, path: &str, text: String) {
        self.entries.insert(path.to_owned(), text);
    }

    pub(crate) fn finish(self) -> FlatMap {
        self.entries
    }
}
