//! # newsletter-sql
//!
//! Schema-driven T-SQL fragment generation for SQL Server.
//!
//! ## Features
//!
//! - **Field catalogs**: `#[derive(Record)]` builds an ordered descriptor table per type
//! - **Typed literals**: values render by declared category (`N'...'`, `null`, RFC 3339 timestamps)
//! - **Fragments**: column lists, value lists and `[col] = value` assignments with include/exclude sets
//! - **Transactions**: wrap statements in a rollback-on-error `BEGIN TRY/CATCH` script
//!
//! ## Example
//!
//! ```ignore
//! use newsletter_sql::{FieldSet, Record, column_names, column_values, update_assignments};
//!
//! #[derive(Record)]
//! struct Subscriber {
//!     #[sql(column = "id")]
//!     id: i64,
//!     #[sql(column = "email")]
//!     email: String,
//!     #[sql(column = "name")]
//!     name: Option<String>,
//! }
//!
//! let skip = FieldSet::of(["id"]);
//! let insert = format!(
//!     "INSERT INTO TB_TRN_Subscribers ({}) VALUES ({})",
//!     column_names::<Subscriber>(&skip, ""),
//!     column_values(&subscriber, &skip)?,
//! );
//! let update = format!(
//!     "UPDATE TB_TRN_Subscribers SET {} WHERE Email = {}",
//!     update_assignments(&subscriber, &skip)?,
//!     newsletter_sql::quote_nstring(&subscriber.email),
//! );
//! ```
//!
//! Generated text embeds values directly; it is not parameterized.

pub mod catalog;
pub mod error;
pub mod fragment;
pub mod transaction;
pub mod value;

pub use catalog::{
    EXCLUDED_MARKER, Field, FieldDescriptor, Record, RecordRegistration, active_fields, describe,
    field_by_name, registered_records,
};
pub use error::{FragmentError, FragmentResult};
pub use fragment::{
    FieldSet, Fragment, column_names, column_names_including, column_values,
    column_values_including, update_assignments, update_assignments_including, zip_assignments,
};
pub use transaction::{IsolationLevel, TransactionScript, wrap};
pub use value::{SqlType, SqlValue, TypeCategory, format_timestamp, quote_nstring, render};

#[cfg(feature = "derive")]
pub use newsletter_sql_derive::Record;

// Re-export inventory for use by the derive macro
pub use inventory;
