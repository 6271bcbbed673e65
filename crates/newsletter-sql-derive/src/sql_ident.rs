use std::collections::HashMap;

use proc_macro2::Span;
use syn::{Error, LitStr, Result};

pub(crate) fn is_valid_sql_ident(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn parse_column(lit: &LitStr) -> Result<String> {
    parse_sql_ident_with_span(&lit.value(), lit.span(), "sql column")
}

pub(crate) fn parse_sql_ident_with_span(s: &str, span: Span, what: &str) -> Result<String> {
    if s.is_empty() {
        return Err(Error::new(span, format!("{what} must not be empty")));
    }
    if !is_valid_sql_ident(s) {
        return Err(Error::new(
            span,
            format!("{what} '{s}' must be a valid SQL identifier (expected [A-Za-z_][A-Za-z0-9_]*)"),
        ));
    }
    Ok(s.to_string())
}

/// Tracks mapped columns and rejects a second field mapping to the same one.
#[derive(Default)]
pub(crate) struct ColumnSet {
    seen: HashMap<String, String>,
}

impl ColumnSet {
    pub(crate) fn insert(&mut self, column: &str, field: &str, span: Span) -> Result<()> {
        if let Some(previous) = self.seen.get(column) {
            return Err(Error::new(
                span,
                format!("column '{column}' is already mapped by field `{previous}`"),
            ));
        }
        self.seen.insert(column.to_string(), field.to_string());
        Ok(())
    }
}
