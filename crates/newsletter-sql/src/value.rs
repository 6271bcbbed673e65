//! Field values and their T-SQL literal rendering.
//!
//! Rendering dispatches on the *declared* [`TypeCategory`] of a field and on the
//! null-ness of its runtime [`SqlValue`]:
//!
//! | category       | value                | output               |
//! |----------------|----------------------|----------------------|
//! | any            | `Null`               | `null`               |
//! | `PointerOf(T)` | non-null             | rendered as `T`      |
//! | `String`       | text                 | `N'...'`, `'` → `''` |
//! | `Boolean`      | bool                 | `N'true'`/`N'false'` |
//! | `Timestamp`    | timestamp            | `N'<RFC 3339>'`      |
//! | `Numeric`      | number               | `10`, `2.5`          |
//! | `Other`        | number / bool / text | default text form    |
//!
//! Booleans are emitted as quoted national strings rather than bit literals;
//! downstream statements depend on that exact form.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, SecondsFormat, Utc};

use crate::error::{FragmentError, FragmentResult};

/// Lightweight type category of a record field.
///
/// Determined from the declared field type (see [`SqlType::category`]), never
/// from the runtime value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    String,
    Boolean,
    Timestamp,
    /// A nullable field (`Option<T>`); non-null values render as the inner category.
    PointerOf(Box<TypeCategory>),
    Numeric,
    Other,
}

impl TypeCategory {
    /// Wrap a category as nullable.
    pub fn pointer_of(inner: TypeCategory) -> Self {
        Self::PointerOf(Box::new(inner))
    }

    /// Strip every `PointerOf` layer.
    pub fn base(&self) -> &TypeCategory {
        match self {
            Self::PointerOf(inner) => inner.base(),
            other => other,
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::PointerOf(_))
    }
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("String"),
            Self::Boolean => f.write_str("Boolean"),
            Self::Timestamp => f.write_str("Timestamp"),
            Self::PointerOf(inner) => write!(f, "PointerOf({inner})"),
            Self::Numeric => f.write_str("Numeric"),
            Self::Other => f.write_str("Other"),
        }
    }
}

/// Runtime value of a single field, as read through its accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    /// Text payload; numbers too wide for `Int`/`UInt` also travel as text.
    Text(String),
    Timestamp(DateTime<FixedOffset>),
    /// A value with no SQL text form; carries the Rust type name.
    Unsupported(&'static str),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the value kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) | Self::UInt(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Timestamp(_) => "timestamp",
            Self::Unsupported(_) => "unsupported",
        }
    }
}

/// Maps a Rust type to its [`TypeCategory`] and converts values into [`SqlValue`].
///
/// `#[derive(Record)]` requires this for every tagged field. Implement it for
/// your own types to make them usable as record fields.
pub trait SqlType {
    /// Category of the declared type.
    fn category() -> TypeCategory;

    /// Current value as a [`SqlValue`].
    fn to_sql_value(&self) -> SqlValue;
}

impl SqlType for str {
    fn category() -> TypeCategory {
        TypeCategory::String
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.to_string())
    }
}

impl SqlType for String {
    fn category() -> TypeCategory {
        TypeCategory::String
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl SqlType for Cow<'_, str> {
    fn category() -> TypeCategory {
        TypeCategory::String
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.to_string())
    }
}

impl SqlType for char {
    fn category() -> TypeCategory {
        TypeCategory::String
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.to_string())
    }
}

impl SqlType for bool {
    fn category() -> TypeCategory {
        TypeCategory::Boolean
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Bool(*self)
    }
}

macro_rules! impl_signed {
    ($($t:ty),*) => {$(
        impl SqlType for $t {
            fn category() -> TypeCategory {
                TypeCategory::Numeric
            }

            fn to_sql_value(&self) -> SqlValue {
                SqlValue::Int(i64::from(*self))
            }
        }
    )*};
}

macro_rules! impl_unsigned {
    ($($t:ty),*) => {$(
        impl SqlType for $t {
            fn category() -> TypeCategory {
                TypeCategory::Numeric
            }

            fn to_sql_value(&self) -> SqlValue {
                SqlValue::UInt(u64::from(*self))
            }
        }
    )*};
}

macro_rules! impl_wide {
    ($($t:ty),*) => {$(
        impl SqlType for $t {
            fn category() -> TypeCategory {
                TypeCategory::Numeric
            }

            fn to_sql_value(&self) -> SqlValue {
                SqlValue::Text(self.to_string())
            }
        }
    )*};
}

impl_signed!(i8, i16, i32, i64);
impl_unsigned!(u8, u16, u32, u64);
impl_wide!(i128, u128, isize, usize);

// Finite values travel as text; widened to f64, 0.1 prints as 0.10000000149011612.
impl SqlType for f32 {
    fn category() -> TypeCategory {
        TypeCategory::Numeric
    }

    fn to_sql_value(&self) -> SqlValue {
        if self.is_finite() {
            SqlValue::Text(self.to_string())
        } else {
            SqlValue::Unsupported("f32")
        }
    }
}

impl SqlType for f64 {
    fn category() -> TypeCategory {
        TypeCategory::Numeric
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Float(*self)
    }
}

#[cfg(feature = "rust_decimal")]
impl SqlType for rust_decimal::Decimal {
    fn category() -> TypeCategory {
        TypeCategory::Numeric
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.to_string())
    }
}

impl SqlType for DateTime<Utc> {
    fn category() -> TypeCategory {
        TypeCategory::Timestamp
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Timestamp(self.fixed_offset())
    }
}

impl SqlType for DateTime<FixedOffset> {
    fn category() -> TypeCategory {
        TypeCategory::Timestamp
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Timestamp(*self)
    }
}

impl SqlType for DateTime<Local> {
    fn category() -> TypeCategory {
        TypeCategory::Timestamp
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Timestamp(self.fixed_offset())
    }
}

// Naive timestamps are taken to be UTC.
impl SqlType for NaiveDateTime {
    fn category() -> TypeCategory {
        TypeCategory::Timestamp
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Timestamp(self.and_utc().fixed_offset())
    }
}

impl<T: SqlType> SqlType for Option<T> {
    fn category() -> TypeCategory {
        TypeCategory::pointer_of(T::category())
    }

    fn to_sql_value(&self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl<T: SqlType + ?Sized> SqlType for &T {
    fn category() -> TypeCategory {
        T::category()
    }

    fn to_sql_value(&self) -> SqlValue {
        (**self).to_sql_value()
    }
}

impl<T: SqlType + ?Sized> SqlType for Box<T> {
    fn category() -> TypeCategory {
        T::category()
    }

    fn to_sql_value(&self) -> SqlValue {
        (**self).to_sql_value()
    }
}

/// Wrap text in a national string literal, doubling embedded quotes.
///
/// ```
/// assert_eq!(newsletter_sql::quote_nstring("O'Brien"), "N'O''Brien'");
/// ```
pub fn quote_nstring(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 3);
    out.push_str("N'");
    for ch in s.chars() {
        if ch == '\'' {
            out.push_str("''");
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
    out
}

/// Format a timestamp with the fixed RFC 3339 profile (seconds, `Z` for UTC).
pub fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Render a value as T-SQL literal text according to its declared category.
///
/// Errors carry an empty field name; [`crate::fragment`] fills it in.
pub fn render(value: &SqlValue, category: &TypeCategory) -> FragmentResult<String> {
    if value.is_null() {
        return Ok("null".to_string());
    }
    if let SqlValue::Unsupported(type_name) = value {
        return Err(FragmentError::unsupported("", *type_name));
    }

    match (category, value) {
        (TypeCategory::PointerOf(inner), _) => render(value, inner),

        (TypeCategory::String, SqlValue::Text(s)) => Ok(quote_nstring(s)),

        (TypeCategory::Boolean, SqlValue::Bool(true)) => Ok("N'true'".to_string()),
        (TypeCategory::Boolean, SqlValue::Bool(false)) => Ok("N'false'".to_string()),

        (TypeCategory::Timestamp, SqlValue::Timestamp(ts)) => {
            Ok(format!("N'{}'", format_timestamp(ts)))
        }

        (TypeCategory::Numeric | TypeCategory::Other, SqlValue::Int(n)) => Ok(n.to_string()),
        (TypeCategory::Numeric | TypeCategory::Other, SqlValue::UInt(n)) => Ok(n.to_string()),
        (TypeCategory::Numeric | TypeCategory::Other, SqlValue::Float(f)) => {
            if f.is_finite() {
                Ok(f.to_string())
            } else {
                Err(FragmentError::unsupported("", format!("non-finite float {f}")))
            }
        }
        (TypeCategory::Numeric | TypeCategory::Other, SqlValue::Text(s)) => Ok(s.clone()),
        (TypeCategory::Other, SqlValue::Bool(b)) => Ok(b.to_string()),

        (category, value) => Err(FragmentError::CategoryMismatch {
            field: String::new(),
            category: category.to_string(),
            found: value.kind(),
        }),
    }
}
