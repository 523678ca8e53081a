//! Inverse transform: records back to flat maps.
//!
//! [`Flatten`] is normally derived. Record fields descend with
//! `parent SEP name`, map entries append `SEP key` with spaces in the key
//! replaced by `_`, and sequences of scalars render as `[a, b]`. Sequences of
//! composite elements, `None` options and non-`pub` fields are skipped.
//! Every emitted key is lower-cased.

mod impls;
mod sink;

use std::fmt;

pub use sink::{FieldSpec, FlatSink};

use crate::error::{MergeError, MergeResult};
use crate::options::MergeOptions;
use crate::value::FlatMap;

/// Shape of a flattenable type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlatKind {
    /// `bool`.
    Bool,
    /// Any primitive integer.
    Integer,
    /// `f32` or `f64`.
    Float,
    /// `char`.
    Char,
    /// `String` or `str`.
    String,
    /// `Option<T>`.
    Option,
    /// Vectors, slices and arrays.
    Sequence,
    /// Maps keyed by displayable values.
    Map,
    /// A struct deriving [`Flatten`].
    Record,
}

impl FlatKind {
    /// Human readable name used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Char => "char",
            Self::String => "string",
            Self::Option => "option",
            Self::Sequence => "sequence",
            Self::Map => "map",
            Self::Record => "struct",
        }
    }

    /// Whether values of this kind render as a single leaf.
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        matches!(
            self,
            Self::Bool | Self::Integer | Self::Float | Self::Char | Self::String
        )
    }
}

impl fmt::Display for FlatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Types that can be written into a flat map.
pub trait Flatten {
    /// Shape of the implementing type.
    const KIND: FlatKind;

    /// Write this value's entries under `path`.
    fn flatten_into(&self, path: &str, sink: &mut FlatSink<'_>);

    /// Render a scalar as text; `None` for composite kinds.
    fn scalar_text(&self) -> Option<String> {
        None
    }
}

/// Flatten a record into a flat map using default options.
///
/// # Errors
///
/// Returns [`MergeError::InvalidInput`] with kind `nil` when `value` is
/// `None`, or naming the actual kind when `T` is not a record.
///
/// # Examples
///
/// ```rust
/// use flatmerge::{Flatten, to_flat_map};
///
/// #[derive(Flatten)]
/// struct Movie {
///     pub title: String,
///     #[flatmerge(serde = "year_of_release")]
///     pub year: u16,
///     pub actors: Vec<String>,
/// }
///
/// let movie = Movie {
///     title: "Alien".into(),
///     year: 1979,
///     actors: vec!["Sigourney Weaver".into(), "Tom Skerritt".into()],
/// };
/// let flat = to_flat_map(Some(&movie))?;
/// assert_eq!(flat.get("title").map(String::as_str), Some("Alien"));
/// assert_eq!(flat.get("year_of_release").map(String::as_str), Some("1979"));
/// assert_eq!(
///     flat.get("actors").map(String::as_str),
///     Some("[Sigourney Weaver, Tom Skerritt]")
/// );
/// # Ok::<_, flatmerge::MergeError>(())
/// ```
pub fn to_flat_map<T: Flatten + ?Sized>(value: Option<&T>) -> MergeResult<FlatMap> {
    flatten_with(&MergeOptions::default(), value)
}

pub(crate) fn flatten_with<T: Flatten + ?Sized>(
    options: &MergeOptions,
    value: Option<&T>,
) -> MergeResult<FlatMap> {
    let Some(record) = value else {
        return Err(MergeError::InvalidInput { kind: "nil" });
    };
    if T::KIND != FlatKind::Record {
        return Err(MergeError::InvalidInput {
            kind: T::KIND.name(),
        });
    }
    let mut sink = FlatSink::new(options);
    record.flatten_into("", &mut sink);
    let flat = sink.finish();
    tracing::trace!(keys = flat.len(), "flattened record");
    Ok(flat)
}
