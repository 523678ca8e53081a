//! Unit tests for `#[derive(Flatten)]` parsing and generation.

use anyhow::{Result, anyhow, ensure};
use quote::quote;
use rstest::rstest;
use syn::{DeriveInput, parse_quote};

use super::expand;
use super::parse::{FieldAttrs, parse_field_attrs, parse_input};

fn tags(record: &DeriveInput, field: &str) -> Result<Vec<(String, String)>> {
    let parsed = parse_input(record).map_err(|e| anyhow!("parse failed: {e}"))?;
    parsed
        .fields
        .into_iter()
        .find(|f| f.name == field)
        .map(|f| f.attrs.tags)
        .ok_or_else(|| anyhow!("field {field} not exported"))
}

fn pairs(entries: &[(&str, &str)]) -> Vec<(String, String)> {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

#[rstest]
fn expands_public_fields_with_tags() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        struct Movie {
            #[serde(rename = "year_of_release")]
            pub year: u16,
            #[flatmerge(json = "name", skip)]
            pub title: String,
            secret: String,
        }
    };
    let tokens = expand(&input).map_err(|e| anyhow!("expand failed: {e}"))?;
    let expected = quote! {
        impl flatmerge::Flatten for Movie {
            const KIND: flatmerge::FlatKind = flatmerge::FlatKind::Record;

            fn flatten_into(&self, path: &str, sink: &mut flatmerge::FlatSink<'_>) {
                sink.field(
                    path,
                    &flatmerge::FieldSpec {
                        ident: "year",
                        tags: &[("serde", "year_of_release")],
                        skip: false,
                    },
                    &self.year,
                );
                sink.field(
                    path,
                    &flatmerge::FieldSpec {
                        ident: "title",
                        tags: &[("json", "name")],
                        skip: true,
                    },
                    &self.title,
                );
            }
        }
    };
    ensure!(
        tokens.to_string() == expected.to_string(),
        "generated tokens differ: {tokens} != {expected}"
    );
    Ok(())
}

#[rstest]
fn records_without_exported_fields_ignore_their_arguments() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        struct Hidden {
            inner: u8,
        }
    };
    let tokens = expand(&input).map_err(|e| anyhow!("expand failed: {e}"))?;
    let expected = quote! {
        impl flatmerge::Flatten for Hidden {
            const KIND: flatmerge::FlatKind = flatmerge::FlatKind::Record;

            fn flatten_into(&self, _path: &str, _sink: &mut flatmerge::FlatSink<'_>) {}
        }
    };
    ensure!(
        tokens.to_string() == expected.to_string(),
        "generated tokens differ: {tokens} != {expected}"
    );
    Ok(())
}

#[rstest]
fn crate_path_override_is_used() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        #[flatmerge(crate = "my_alias")]
        struct Aliased {
            pub value: u8,
        }
    };
    let tokens = expand(&input)
        .map_err(|e| anyhow!("expand failed: {e}"))?
        .to_string();
    ensure!(
        tokens.contains("impl my_alias :: Flatten for Aliased"),
        "missing alias: {tokens}"
    );
    ensure!(!tokens.contains("flatmerge ::"), "default path leaked: {tokens}");
    Ok(())
}

#[rstest]
fn type_parameters_gain_flatten_bounds() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        struct Wrapper<T: Clone> {
            pub inner: T,
        }
    };
    let tokens = expand(&input)
        .map_err(|e| anyhow!("expand failed: {e}"))?
        .to_string();
    ensure!(
        tokens.contains("impl < T : Clone + flatmerge :: Flatten >"),
        "missing bound: {tokens}"
    );
    Ok(())
}

#[rstest]
#[case::tuple(parse_quote! { struct Pair(pub u8, pub u8); }, "Flatten requires named fields")]
#[case::unit(parse_quote! { struct Marker; }, "Flatten requires named fields")]
#[case::enumeration(
    parse_quote! { enum Choice { A, B } },
    "Flatten can only be derived for structs"
)]
fn rejects_unsupported_shapes(#[case] input: DeriveInput, #[case] message: &str) -> Result<()> {
    let Err(err) = expand(&input) else {
        return Err(anyhow!("expected an error for {}", input.ident));
    };
    ensure!(err.to_string() == message, "unexpected error: {err}");
    Ok(())
}

#[rstest]
fn serde_attributes_supply_the_serde_tag() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        #[serde(rename_all = "camelCase", deny_unknown_fields)]
        struct Release {
            pub release_year: u16,
            #[serde(rename(serialize = "Title", deserialize = "title"))]
            pub title: String,
            #[serde(skip)]
            pub cache: String,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub rating: Option<u8>,
            #[serde(rename = "ignored")]
            #[flatmerge(serde = "explicit")]
            pub label: String,
        }
    };
    ensure!(tags(&input, "release_year")? == pairs(&[("serde", "releaseYear")]));
    ensure!(tags(&input, "title")? == pairs(&[("serde", "Title")]));
    ensure!(tags(&input, "cache")? == pairs(&[("serde", "-")]));
    ensure!(tags(&input, "rating")? == pairs(&[("serde", "rating")]));
    ensure!(tags(&input, "label")? == pairs(&[("serde", "explicit")]));
    Ok(())
}

#[rstest]
fn fields_without_serde_attributes_have_no_serde_tag() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        struct Plain {
            #[flatmerge(mapstructure = "-", json = "kind")]
            pub r#type: String,
        }
    };
    ensure!(tags(&input, "type")? == pairs(&[("mapstructure", "-"), ("json", "kind")]));
    Ok(())
}

#[rstest]
fn private_fields_are_not_exported() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        struct Mixed {
            pub shown: u8,
            pub(crate) crate_only: u8,
            hidden: u8,
        }
    };
    let parsed = parse_input(&input).map_err(|e| anyhow!("parse failed: {e}"))?;
    let names: Vec<_> = parsed.fields.iter().map(|f| f.name.as_str()).collect();
    ensure!(names == ["shown"], "unexpected fields: {names:?}");
    Ok(())
}

#[rstest]
fn field_attributes_collect_tags_in_order() -> Result<()> {
    let field: syn::Field = parse_quote! {
        #[flatmerge(yaml = "a")]
        #[flatmerge(json = "", skip)]
        pub value: u8
    };
    let attrs = parse_field_attrs(&field.attrs).map_err(|e| anyhow!("parse failed: {e}"))?;
    let expected = FieldAttrs {
        tags: pairs(&[("yaml", "a"), ("json", "")]),
        skip: true,
    };
    ensure!(attrs == expected, "unexpected attrs: {attrs:?}");
    Ok(())
}

#[rstest]
#[case::duplicate(parse_quote! { #[flatmerge(json = "a", json = "b")] pub v: u8 }, "duplicate `json` tag")]
#[case::not_a_string(parse_quote! { #[flatmerge(json = 1)] pub v: u8 }, "json must be a string")]
#[case::bare_tag(parse_quote! { #[flatmerge(json)] pub v: u8 }, "expected `json = \"...\"`")]
fn invalid_field_attributes_are_rejected(
    #[case] field: syn::Field,
    #[case] message: &str,
) -> Result<()> {
    let Err(err) = parse_field_attrs(&field.attrs) else {
        return Err(anyhow!("expected an error"));
    };
    ensure!(err.to_string() == message, "unexpected error: {err}");
    Ok(())
}
