//! Decoder error carrying the path of the failing field.

use std::fmt;

use serde::de;

/// Failure while decoding a nested mapping into a typed destination.
///
/// The path is recorded outermost first; sequence positions appear as their
/// decimal index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeError {
    path: Vec<String>,
    message: String,
}

impl DecodeError {
    /// Build an error for the field at `path` (dot separated).
    #[must_use]
    pub fn custom_at(path: &str, message: impl fmt::Display) -> Self {
        Self {
            path: path
                .split('.')
                .filter(|segment| !segment.is_empty())
                .map(str::to_owned)
                .collect(),
            message: message.to_string(),
        }
    }

    /// Prefix the recorded path with `segment`.
    #[must_use]
    pub fn at(mut self, segment: impl Into<String>) -> Self {
        self.path.insert(0, segment.into());
        self
    }

    /// Dot separated path of the failing field, empty at the root.
    #[must_use]
    pub fn path(&self) -> String {
        self.path.join(".")
    }

    /// Message reported by the decoder or the destination type.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path(), self.message)
        }
    }
}

impl std::error::Error for DecodeError {}

impl de::Error for DecodeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self {
            path: Vec::new(),
            message: msg.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::Error as _;

    #[test]
    fn prefixes_accumulate_outermost_first() {
        let err = DecodeError::custom("bad").at("zip").at("address");
        assert_eq!(err.path(), "address.zip");
        assert_eq!(err.to_string(), "address.zip: bad");
    }

    #[test]
    fn root_errors_show_only_the_message() {
        let err = DecodeError::custom("bad");
        assert_eq!(err.to_string(), "bad");
        assert_eq!(err.message(), "bad");
    }

    #[test]
    fn custom_at_splits_dotted_paths() {
        let err = DecodeError::custom_at("a.b", "oops");
        assert_eq!(err.path(), "a.b");
    }
}
