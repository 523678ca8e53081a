//! Merge flat string maps and typed records into nested configuration
//! structs.
//!
//! A flat map such as a set of environment variables carries nesting in its
//! keys (`DB__POOL__SIZE`) and structure in its values (`a, b, c` or
//! `{"city": "LA"}`). This crate expands such a map into a nested
//! dictionary, decodes it onto a typed destination with weak type coercion,
//! and folds in typed records so that the first non-zero value wins.
//! [`to_flat_map`] performs the inverse walk for records deriving
//! [`Flatten`].
//!
//! # Examples
//!
//! ```rust
//! use flatmerge::merge;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
//! struct Simple {
//!     #[serde(rename = "F1")]
//!     f1: i32,
//!     #[serde(rename = "F2")]
//!     f2: String,
//! }
//!
//! let mut dst = Simple::default();
//! merge(
//!     &mut dst,
//!     [("F1", "10")],
//!     [
//!         Simple { f1: 20, f2: "hello".into() },
//!         Simple { f1: 0, f2: "hola".into() },
//!     ],
//! )?;
//! assert_eq!(dst, Simple { f1: 10, f2: "hello".into() });
//! # Ok::<_, flatmerge::MergeError>(())
//! ```

pub use flatmerge_macros::Flatten;

mod classify;
pub mod decode;
mod env;
mod error;
mod expand;
mod flatten;
mod merge;
mod options;
mod provider;
pub mod record;
mod value;

pub use classify::{Classifier, classify, is_list_notation, is_object_notation, parse_list};
pub use env::env_map;
pub use error::{MergeError, MergeResult};
pub use expand::{Expander, expand, merge_dicts};
pub use flatten::{FieldSpec, FlatKind, FlatSink, Flatten, to_flat_map};
pub use merge::{Merger, merge, merge_map, merge_maps, merge_structs};
pub use options::{DEFAULT_SEPARATOR, DEFAULT_TAG, Diagnostic, DiagnosticHook, MergeOptions};
pub use provider::FlatMapProvider;
pub use value::{Dict, FlatMap, Value, ValueKind, dict_from_json, dict_into_json};
