//! Error type shared by the merge entry points.

use thiserror::Error;

use crate::decode::DecodeError;

/// Errors raised while merging flat maps and records into a destination.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MergeError {
    /// The destination could not be captured for overlaying.
    #[error("failed to snapshot destination: {0}")]
    Snapshot(#[source] serde_json::Error),

    /// A flat map could not be decoded onto the destination.
    #[error("failed to decode map source #{index}: {source}")]
    Decode {
        /// Position of the failing map within its source list.
        index: usize,
        /// Underlying decoder error.
        #[source]
        source: DecodeError,
    },

    /// A record could not be folded into the destination.
    #[error("failed to merge record source #{index}: {source}")]
    StructMerge {
        /// Position of the failing record within its source list.
        index: usize,
        /// Underlying serialisation error.
        #[source]
        source: serde_json::Error,
    },

    /// Flattening was given something other than a record.
    #[error("cannot flatten {kind}: expected a struct")]
    InvalidInput {
        /// Kind of value actually supplied, `nil` when absent.
        kind: &'static str,
    },
}

impl MergeError {
    /// Returns the source position carried by chain failures.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use flatmerge::MergeError;
    ///
    /// let err = MergeError::InvalidInput { kind: "nil" };
    /// assert_eq!(err.index(), None);
    /// ```
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        match self {
            Self::Decode { index, .. } | Self::StructMerge { index, .. } => Some(*index),
            Self::Snapshot(_) | Self::InvalidInput { .. } => None,
        }
    }
}

/// Result alias used throughout the crate.
pub type MergeResult<T> = Result<T, MergeError>;
