//! Field-level `#[sql(...)]` attribute parsing.

use syn::{LitStr, Result};

/// Column marker meaning "not mapped".
pub(crate) const EXCLUDED_MARKER: &str = "-";

/// Parsed contents of one `#[sql(...)]` attribute.
#[derive(Default)]
pub(crate) struct FieldAttr {
    pub skip: bool,
    pub column: Option<LitStr>,
}

impl syn::parse::Parse for FieldAttr {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            if ident == "skip" {
                attr.skip = true;
            } else if ident == "column" {
                let _: syn::Token![=] = input.parse()?;
                let value: LitStr = input.parse()?;
                if attr.column.is_some() {
                    return Err(syn::Error::new(value.span(), "duplicate `column` key"));
                }
                attr.column = Some(value);
            } else {
                return Err(syn::Error::new(
                    ident.span(),
                    format!("unknown sql attribute `{ident}` (expected `column` or `skip`)"),
                ));
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        if !input.is_empty() {
            return Err(input.error("unexpected tokens in sql attribute"));
        }
        Ok(attr)
    }
}

/// How a field maps to the database.
pub(crate) enum Mapping {
    /// Mapped to this column.
    Column(LitStr),
    /// Not mapped; carries the raw tag (possibly empty).
    Excluded(String),
}

/// Merge every `#[sql(...)]` attribute on a field into a [`Mapping`].
pub(crate) fn field_mapping(field: &syn::Field) -> Result<Mapping> {
    let mut merged = FieldAttr::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("sql") {
            continue;
        }
        let parsed: FieldAttr = attr.parse_args()?;
        merged.skip |= parsed.skip;
        if let Some(column) = parsed.column {
            if merged.column.is_some() {
                return Err(syn::Error::new(column.span(), "duplicate `column` key"));
            }
            merged.column = Some(column);
        }
    }

    let tag = merged.column.as_ref().map(LitStr::value).unwrap_or_default();
    match merged.column {
        Some(column) if !merged.skip && !tag.is_empty() && tag != EXCLUDED_MARKER => {
            Ok(Mapping::Column(column))
        }
        _ => Ok(Mapping::Excluded(tag)),
    }
}
