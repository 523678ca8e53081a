//! Token generation for the `Flatten` implementation.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{DeriveInput, Generics};

use super::crate_path;
use super::parse::{Record, RecordField};

/// Emit `impl Flatten` for the parsed `record`.
///
/// Every type parameter gains a `Flatten` bound since fields of that type
/// are flattened in turn.
pub(crate) fn generate(input: &DeriveInput, record: &Record) -> TokenStream {
    let krate = crate_path::resolve(record.attrs.crate_path.as_ref());
    let ident = &input.ident;
    let generics = bounded_generics(&input.generics, &krate);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let (path, sink) = if record.fields.is_empty() {
        (format_ident!("_path"), format_ident!("_sink"))
    } else {
        (format_ident!("path"), format_ident!("sink"))
    };
    let calls = record
        .fields
        .iter()
        .map(|field| field_call(field, &krate));

    quote! {
        impl #impl_generics #krate::Flatten for #ident #ty_generics #where_clause {
            const KIND: #krate::FlatKind = #krate::FlatKind::Record;

            fn flatten_into(&self, #path: &str, #sink: &mut #krate::FlatSink<'_>) {
                #(#calls)*
            }
        }
    }
}

fn field_call(field: &RecordField, krate: &TokenStream) -> TokenStream {
    let member = &field.member;
    let name = &field.name;
    let skip = field.attrs.skip;
    let tags = field.attrs.tags.iter().map(|(tag, value)| quote! { (#tag, #value) });
    quote! {
        sink.field(
            path,
            &#krate::FieldSpec {
                ident: #name,
                tags: &[#(#tags),*],
                skip: #skip,
            },
            &self.#member,
        );
    }
}

fn bounded_generics(generics: &Generics, krate: &TokenStream) -> Generics {
    let mut out = generics.clone();
    for param in out.type_params_mut() {
        param.bounds.push(syn::parse_quote!(#krate::Flatten));
    }
    out
}
