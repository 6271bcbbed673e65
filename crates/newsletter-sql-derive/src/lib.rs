//! Derive macro for newsletter-sql
//!
//! Provides `#[derive(Record)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod record;
mod sql_ident;

/// Derive the `Record` field catalog for a struct.
///
/// # Example
///
/// ```ignore
/// use newsletter_sql::Record;
///
/// #[derive(Record)]
/// struct Subscriber {
///     #[sql(column = "id")]
///     id: i64,
///     #[sql(column = "email")]
///     email: String,
///     #[sql(column = "subscribedDate")]
///     subscribed_date: Option<chrono::DateTime<chrono::Utc>>,
///     #[sql(column = "-")]
///     password: String,
///     cached: bool,
/// }
/// ```
///
/// # Attributes
///
/// - `#[sql(column = "name")]` - Map the field to a column
/// - `#[sql(column = "-")]` or `#[sql(skip)]` - Keep the field out of generated SQL
///
/// Fields without a column are excluded as well. Every mapped field type must
/// implement `newsletter_sql::SqlType`.
#[proc_macro_derive(Record, attributes(sql))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
