//! Expansion of `#[derive(Flatten)]`.

mod crate_path;
mod generate;
mod parse;
#[cfg(test)]
mod tests;

use proc_macro2::TokenStream;
use syn::DeriveInput;

/// Parse `input` and emit its `Flatten` implementation.
pub(crate) fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let record = parse::parse_input(input)?;
    Ok(generate::generate(input, &record))
}
