//! Attribute parsing for `#[derive(Flatten)]`.
//!
//! Fields accept `#[flatmerge(<tag> = "name")]` and `#[flatmerge(skip)]`;
//! the container accepts `#[flatmerge(crate = "path")]`. Serde attributes
//! are read so the `serde` tag matches the names serde itself emits.

use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::{
    Attribute, Data, DeriveInput, Field, Fields, Lit, LitStr, Token, Visibility, parenthesized,
};

mod serde_attrs;

pub(crate) use serde_attrs::SerdeRenameAll;
use serde_attrs::{serde_field_rename, serde_rename_all, serde_skips_field};

/// Tag key reserved for names derived from serde attributes.
pub(crate) const SERDE_TAG: &str = "serde";

/// Container-level attributes.
#[derive(Default, Clone)]
pub(crate) struct StructAttrs {
    /// Overrides the generated crate path for dependency aliasing.
    pub crate_path: Option<syn::Path>,
    pub rename_all: Option<SerdeRenameAll>,
}

/// Field-level `#[flatmerge(...)]` attributes.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub(crate) struct FieldAttrs {
    /// `(tag, name)` pairs in declaration order.
    pub tags: Vec<(String, String)>,
    pub skip: bool,
}

impl FieldAttrs {
    fn has_tag(&self, key: &str) -> bool {
        self.tags.iter().any(|(tag, _)| tag == key)
    }
}

/// One exported field of the deriving struct.
pub(crate) struct RecordField {
    pub member: syn::Ident,
    /// Field name with any raw identifier prefix removed.
    pub name: String,
    pub attrs: FieldAttrs,
}

/// Everything generation needs from the deriving struct.
pub(crate) struct Record {
    pub attrs: StructAttrs,
    pub fields: Vec<RecordField>,
}

/// Gather the exported fields and their tag tables from `input`.
///
/// Fields that are not `pub` never reach the flat map, so they are dropped
/// here. Tuple structs, unit structs, enums and unions are rejected.
pub(crate) fn parse_input(input: &DeriveInput) -> syn::Result<Record> {
    let attrs = parse_struct_attrs(&input.attrs)?;
    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    data.struct_token,
                    "Flatten requires named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Flatten can only be derived for structs",
            ));
        }
    };

    let mut fields = Vec::new();
    for field in named {
        if !matches!(field.vis, Visibility::Public(_)) {
            continue;
        }
        fields.push(parse_field(field, attrs.rename_all)?);
    }
    Ok(Record { attrs, fields })
}

fn parse_field(field: &Field, rename_all: Option<SerdeRenameAll>) -> syn::Result<RecordField> {
    let Some(member) = field.ident.clone() else {
        return Err(syn::Error::new_spanned(field, "unnamed fields are not supported"));
    };
    let name = member.unraw().to_string();
    let mut attrs = parse_field_attrs(&field.attrs)?;
    if !attrs.has_tag(SERDE_TAG)
        && let Some(serde_name) = serde_tag(field, &name, rename_all)?
    {
        attrs.tags.push((SERDE_TAG.to_owned(), serde_name));
    }
    Ok(RecordField { member, name, attrs })
}

/// Name serde serializes `field` under, `-` when serde skips it.
fn serde_tag(
    field: &Field,
    name: &str,
    rename_all: Option<SerdeRenameAll>,
) -> syn::Result<Option<String>> {
    if serde_skips_field(&field.attrs)? {
        return Ok(Some("-".to_owned()));
    }
    if let Some(rename) = serde_field_rename(&field.attrs)? {
        return Ok(Some(rename));
    }
    Ok(rename_all.map(|rule| rule.apply(name)))
}

fn parse_flatmerge<F>(attrs: &[Attribute], mut f: F) -> syn::Result<()>
where
    F: FnMut(&ParseNestedMeta) -> syn::Result<()>,
{
    for attr in attrs.iter().filter(|a| a.path().is_ident("flatmerge")) {
        attr.parse_nested_meta(|meta| f(&meta))?;
    }
    Ok(())
}

/// Skip the value of an attribute this macro does not interpret.
///
/// `key = value` consumes a single expression so later entries in the same
/// attribute are still visited.
fn discard_unknown(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        parenthesized!(content in meta.input);
        content.parse::<proc_macro2::TokenStream>()?;
    }
    Ok(())
}

fn lit_str(meta: &ParseNestedMeta, key: &str) -> syn::Result<LitStr> {
    match meta.value()?.parse::<Lit>()? {
        Lit::Str(s) => Ok(s),
        other => Err(syn::Error::new(
            other.span(),
            format!("{key} must be a string"),
        )),
    }
}

pub(crate) fn parse_struct_attrs(attrs: &[Attribute]) -> syn::Result<StructAttrs> {
    let mut out = StructAttrs::default();
    parse_flatmerge(attrs, |meta| {
        if meta.path.is_ident("crate") {
            let s = lit_str(meta, "crate")?;
            let path: syn::Path =
                syn::parse_str(&s.value()).map_err(|e| syn::Error::new(s.span(), e))?;
            out.crate_path = Some(path);
            Ok(())
        } else {
            discard_unknown(meta)
        }
    })?;
    out.rename_all = serde_rename_all(attrs)?;
    Ok(out)
}

pub(crate) fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut out = FieldAttrs::default();
    parse_flatmerge(attrs, |meta| {
        if meta.path.is_ident("skip") {
            out.skip = true;
            return Ok(());
        }
        let Some(ident) = meta.path.get_ident() else {
            return Err(meta.error("expected a tag name such as `json`"));
        };
        let key = ident.unraw().to_string();
        if !meta.input.peek(Token![=]) {
            return Err(meta.error(format!("expected `{key} = \"...\"`")));
        }
        let name = lit_str(meta, &key)?;
        if out.has_tag(&key) {
            return Err(syn::Error::new(name.span(), format!("duplicate `{key}` tag")));
        }
        out.tags.push((key, name.value()));
        Ok(())
    })?;
    Ok(out)
}
