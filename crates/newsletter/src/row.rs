//! Result rows returned by an [`SqlExecutor`](crate::repository::SqlExecutor).

use chrono::{DateTime, Utc};
use newsletter_sql::SqlValue;
use thiserror::Error;

pub type RowResult<T> = Result<T, RowError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error("Column not found: {0}")]
    MissingColumn(String),

    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },
}

impl RowError {
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }
}

/// One result row: column names paired with values, in select order.
///
/// Column lookup ignores ASCII case, matching SQL Server's default collation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, SqlValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, SqlValue)>,
        S: Into<String>,
    {
        Self {
            columns: pairs.into_iter().map(|(c, v)| (c.into(), v)).collect(),
        }
    }

    pub fn push(&mut self, column: impl Into<String>, value: SqlValue) {
        self.columns.push((column.into(), value));
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(c, _)| c.eq_ignore_ascii_case(column))
            .map(|(_, v)| v)
    }

    /// Decode a column into `T`.
    pub fn try_get<T: FromSqlValue>(&self, column: &str) -> RowResult<T> {
        let value = self
            .get(column)
            .ok_or_else(|| RowError::MissingColumn(column.to_string()))?;
        T::from_sql_value(value).map_err(|message| RowError::decode(column, message))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Types that can be decoded from a single [`SqlValue`].
pub trait FromSqlValue: Sized {
    /// Decode, or describe why the value does not fit.
    fn from_sql_value(value: &SqlValue) -> Result<Self, String>;
}

/// Types that can be built from a whole [`Row`].
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> RowResult<Self>;
}

fn mismatch(expected: &str, value: &SqlValue) -> String {
    format!("expected {expected}, found {}", value.kind())
}

impl FromSqlValue for i64 {
    fn from_sql_value(value: &SqlValue) -> Result<Self, String> {
        match value {
            SqlValue::Int(n) => Ok(*n),
            SqlValue::UInt(n) => i64::try_from(*n).map_err(|e| e.to_string()),
            SqlValue::Text(s) => s.trim().parse().map_err(|e| format!("{e}")),
            other => Err(mismatch("integer", other)),
        }
    }
}

impl FromSqlValue for String {
    fn from_sql_value(value: &SqlValue) -> Result<Self, String> {
        match value {
            SqlValue::Text(s) => Ok(s.clone()),
            other => Err(mismatch("text", other)),
        }
    }
}

// SQL Server `bit` columns may arrive as 0/1 integers.
impl FromSqlValue for bool {
    fn from_sql_value(value: &SqlValue) -> Result<Self, String> {
        match value {
            SqlValue::Bool(b) => Ok(*b),
            SqlValue::Int(n) => Ok(*n != 0),
            SqlValue::UInt(n) => Ok(*n != 0),
            other => Err(mismatch("boolean", other)),
        }
    }
}

impl FromSqlValue for DateTime<Utc> {
    fn from_sql_value(value: &SqlValue) -> Result<Self, String> {
        match value {
            SqlValue::Timestamp(ts) => Ok(ts.with_timezone(&Utc)),
            other => Err(mismatch("timestamp", other)),
        }
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    fn from_sql_value(value: &SqlValue) -> Result<Self, String> {
        match value {
            SqlValue::Null => Ok(None),
            other => T::from_sql_value(other).map(Some),
        }
    }
}
