//! Resolve the path used to reference the `flatmerge` crate in generated code.

use proc_macro2::TokenStream;
use quote::quote;

/// Returns the crate path tokens, defaulting to `flatmerge`.
pub(crate) fn resolve(path: Option<&syn::Path>) -> TokenStream {
    path.map_or_else(|| quote! { flatmerge }, |p| quote! { #p })
}
