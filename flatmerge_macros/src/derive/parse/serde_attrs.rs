//! Serde attribute parsing helpers.
//!
//! The `serde` tag of a field is the key serde emits for it, so the rules
//! here mirror serde's `rename`, `rename_all` and `skip` handling.

use heck::{
    ToKebabCase, ToLowerCamelCase, ToShoutyKebabCase, ToShoutySnakeCase, ToSnakeCase,
    ToUpperCamelCase,
};
use syn::meta::ParseNestedMeta;
use syn::{Attribute, LitStr, Token};

/// Supported `#[serde(rename_all = "...")]` rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SerdeRenameAll {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl SerdeRenameAll {
    fn parse(value: &LitStr) -> syn::Result<Self> {
        match value.value().as_str() {
            "lowercase" => Ok(Self::Lower),
            "UPPERCASE" => Ok(Self::Upper),
            "PascalCase" => Ok(Self::Pascal),
            "camelCase" => Ok(Self::Camel),
            "snake_case" => Ok(Self::Snake),
            "SCREAMING_SNAKE_CASE" => Ok(Self::ScreamingSnake),
            "kebab-case" => Ok(Self::Kebab),
            "SCREAMING-KEBAB-CASE" => Ok(Self::ScreamingKebab),
            other => Err(syn::Error::new(
                value.span(),
                format!("unsupported serde rename_all value '{other}'"),
            )),
        }
    }

    pub(crate) fn apply(self, field_name: &str) -> String {
        match self {
            Self::Lower => field_name.to_ascii_lowercase(),
            Self::Upper => field_name.to_ascii_uppercase(),
            Self::Pascal => field_name.to_upper_camel_case(),
            Self::Camel => field_name.to_lower_camel_case(),
            Self::Snake => field_name.to_snake_case(),
            Self::ScreamingSnake => field_name.to_shouty_snake_case(),
            Self::Kebab => field_name.to_kebab_case(),
            Self::ScreamingKebab => field_name.to_shouty_kebab_case(),
        }
    }
}

fn each_serde_meta<F>(attrs: &[Attribute], mut f: F) -> syn::Result<()>
where
    F: FnMut(&ParseNestedMeta) -> syn::Result<()>,
{
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| f(&meta))?;
    }
    Ok(())
}

/// Read `name = "..."` or the `serialize` half of `name(serialize = "...")`.
fn serialized_value(meta: &ParseNestedMeta) -> syn::Result<Option<LitStr>> {
    if meta.input.peek(Token![=]) {
        return meta.value()?.parse::<LitStr>().map(Some);
    }
    let mut out = None;
    if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|nested| {
            if nested.path.is_ident("serialize") {
                out = Some(nested.value()?.parse::<LitStr>()?);
                Ok(())
            } else {
                super::discard_unknown(&nested)
            }
        })?;
    }
    Ok(out)
}

/// Parse `#[serde(rename_all = "...")]` from struct attributes.
pub(crate) fn serde_rename_all(attrs: &[Attribute]) -> syn::Result<Option<SerdeRenameAll>> {
    let mut out = None;
    each_serde_meta(attrs, |meta| {
        if !meta.path.is_ident("rename_all") {
            return super::discard_unknown(meta);
        }
        if let Some(value) = serialized_value(meta)? {
            out = Some(SerdeRenameAll::parse(&value)?);
        }
        Ok(())
    })?;
    Ok(out)
}

/// Parse `#[serde(rename = "...")]` (and `rename(serialize = "...")`) from field attributes.
pub(crate) fn serde_field_rename(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut out = None;
    each_serde_meta(attrs, |meta| {
        if !meta.path.is_ident("rename") {
            return super::discard_unknown(meta);
        }
        if let Some(value) = serialized_value(meta)? {
            out = Some(value.value());
        }
        Ok(())
    })?;
    Ok(out)
}

/// Whether `#[serde(skip)]` or `#[serde(skip_serializing)]` is present.
pub(crate) fn serde_skips_field(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut skipped = false;
    each_serde_meta(attrs, |meta| {
        if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
            skipped = true;
            return Ok(());
        }
        super::discard_unknown(meta)
    })?;
    Ok(skipped)
}
