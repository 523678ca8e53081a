//! Procedural macros for `flatmerge`.
//!
//! [`macro@Flatten`] implements `flatmerge::Flatten` for structs with named
//! fields so they can be written back into a flat map with
//! `flatmerge::to_flat_map`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod derive;

/// Derive `flatmerge::Flatten` for a struct with named fields.
///
/// Each `pub` field is emitted with its tag table. Private fields are never
/// flattened.
///
/// Field attributes:
///
/// - `#[flatmerge(<tag> = "name")]` declares a name under an arbitrary tag
///   key such as `json` or `mapstructure`. `"-"` ignores the field for that
///   tag.
/// - `#[flatmerge(skip)]` excludes the field under every tag.
///
/// The `serde` tag is derived from `#[serde(rename = "...")]`,
/// `#[serde(skip)]`, `#[serde(skip_serializing)]` and the container's
/// `#[serde(rename_all = "...")]` unless `#[flatmerge(serde = "...")]` sets
/// it explicitly.
///
/// Container attributes:
///
/// - `#[flatmerge(crate = "path")]` names the `flatmerge` crate when it is
///   re-exported or renamed.
#[proc_macro_derive(Flatten, attributes(flatmerge))]
pub fn derive_flatten(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
