//! Explicit configuration threaded through every merge entry point.
//!
//! Separator, tag preference and the diagnostic hook live together in
//! [`MergeOptions`] so independent configurations can coexist in one process.

use std::fmt;
use std::sync::Arc;

use crate::value::ValueKind;

/// Separator used to encode nesting in flat-map keys.
pub const DEFAULT_SEPARATOR: &str = "__";

/// Tag consulted for field names when none are configured.
pub const DEFAULT_TAG: &str = "serde";

/// Event raised when a lenient code path drops or rewrites input.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Diagnostic {
    /// Text shaped like `{...}` failed to parse as a JSON object and was
    /// replaced by an empty object.
    MalformedObject {
        /// Raw text as supplied.
        raw: String,
        /// Parser message.
        reason: String,
    },
    /// An existing value was replaced by an incompatible one during
    /// expansion.
    ValueDiscarded {
        /// Separator-joined path of the replaced entry.
        path: String,
        /// Shape of the value that was lost.
        discarded: ValueKind,
        /// Shape of the value that took its place.
        replacement: ValueKind,
    },
    /// A key was empty or produced an empty path segment and was skipped.
    DegenerateKey {
        /// Key as supplied.
        key: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedObject { raw, reason } => {
                write!(f, "treating malformed object `{raw}` as empty: {reason}")
            }
            Self::ValueDiscarded {
                path,
                discarded,
                replacement,
            } => write!(f, "{discarded} at `{path}` replaced by {replacement}"),
            Self::DegenerateKey { key } => write!(f, "skipping degenerate key `{key}`"),
        }
    }
}

/// Callback receiving [`Diagnostic`] events.
pub type DiagnosticHook = Arc<dyn Fn(&Diagnostic) + Send + Sync>;

/// Settings shared by classification, expansion, decoding and flattening.
///
/// # Examples
///
/// ```rust
/// use flatmerge::MergeOptions;
///
/// let options = MergeOptions::new()
///     .separator(".")
///     .tag_keys(["json", "serde"]);
/// assert_eq!(options.separator_str(), ".");
/// assert_eq!(options.tags(), ["json", "serde"]);
/// ```
#[derive(Clone)]
pub struct MergeOptions {
    separator: String,
    tag_keys: Vec<String>,
    hook: DiagnosticHook,
}

impl MergeOptions {
    /// Create options with the default separator, tag and hook.
    #[must_use]
    pub fn new() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_owned(),
            tag_keys: vec![DEFAULT_TAG.to_owned()],
            hook: default_hook(),
        }
    }

    /// Use `separator` to split keys into path segments.
    ///
    /// An empty separator disables nesting: every key is a single segment.
    #[must_use]
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Tags consulted, in order, when naming fields during flattening.
    ///
    /// An empty list falls back to [`DEFAULT_TAG`].
    #[must_use]
    pub fn tag_keys<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tag_keys = tags.into_iter().map(Into::into).collect();
        if self.tag_keys.is_empty() {
            self.tag_keys.push(DEFAULT_TAG.to_owned());
        }
        self
    }

    /// Route diagnostics to `hook` instead of the default `tracing` warning.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::{Arc, Mutex};
    /// use flatmerge::{Classifier, Diagnostic, MergeOptions};
    ///
    /// let seen = Arc::new(Mutex::new(Vec::new()));
    /// let sink = Arc::clone(&seen);
    /// let options = MergeOptions::new().on_diagnostic(move |d: &Diagnostic| {
    ///     sink.lock().expect("lock diagnostics").push(d.clone());
    /// });
    /// let _ = Classifier::new(&options).classify("{not json}");
    /// assert_eq!(seen.lock().expect("lock diagnostics").len(), 1);
    /// ```
    #[must_use]
    pub fn on_diagnostic<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Diagnostic) + Send + Sync + 'static,
    {
        self.hook = Arc::new(hook);
        self
    }

    /// Returns the configured separator.
    #[must_use]
    pub fn separator_str(&self) -> &str {
        &self.separator
    }

    /// Returns the tag preference list.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tag_keys
    }

    /// Forward `diagnostic` to the configured hook.
    pub fn report(&self, diagnostic: &Diagnostic) {
        (self.hook)(diagnostic);
    }
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MergeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeOptions")
            .field("separator", &self.separator)
            .field("tag_keys", &self.tag_keys)
            .field("hook", &"<hook>")
            .finish()
    }
}

#[must_use]
fn default_hook() -> DiagnosticHook {
    Arc::new(|diagnostic: &Diagnostic| {
        tracing::warn!(%diagnostic, "lenient flat map handling");
    })
}
