//! Error types for newsletter-sql

use thiserror::Error;

/// Result type alias for fragment generation
pub type FragmentResult<T> = Result<T, FragmentError>;

/// Faults raised while generating SQL fragments.
///
/// Every variant is fatal to the single call that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FragmentError {
    /// The field's value has no meaningful SQL text form.
    #[error("Unsupported type for field '{field}': {type_name}")]
    UnsupportedType { field: String, type_name: String },

    /// The runtime value does not match the declared type category.
    #[error("Field '{field}' declared as {category} but holds a {found} value")]
    CategoryMismatch {
        field: String,
        category: String,
        found: &'static str,
    },

    /// Column and value lists handed to a positional zip differ in length.
    #[error("Misaligned fragments: {columns} columns vs {values} values")]
    MisalignedFragments { columns: usize, values: usize },
}

impl FragmentError {
    /// Create an unsupported type error
    pub fn unsupported(field: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            field: field.into(),
            type_name: type_name.into(),
        }
    }

    /// Attach a field name to an error raised before the field was known.
    pub(crate) fn for_field(self, name: &str) -> Self {
        match self {
            Self::UnsupportedType { type_name, .. } => Self::UnsupportedType {
                field: name.to_string(),
                type_name,
            },
            Self::CategoryMismatch {
                category, found, ..
            } => Self::CategoryMismatch {
                field: name.to_string(),
                category,
                found,
            },
            other => other,
        }
    }

    /// Check if this is a contract violation between paired fragment lists
    pub fn is_misaligned(&self) -> bool {
        matches!(self, Self::MisalignedFragments { .. })
    }
}
