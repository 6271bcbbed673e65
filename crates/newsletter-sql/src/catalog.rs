//! Field catalogs: the ordered descriptor table of a record type.
//!
//! A record type lists its fields in declaration order. Each field carries the
//! column tag it maps to and the [`TypeCategory`] of its declared type. Fields
//! whose column tag is empty or equal to [`EXCLUDED_MARKER`] are *inactive* and
//! never take part in generated fragments.
//!
//! Catalogs are usually produced by `#[derive(Record)]`, which builds the table
//! once per type on first use and registers it through `inventory`:
//!
//! ```ignore
//! use newsletter_sql::Record;
//!
//! #[derive(Record)]
//! struct Subscriber {
//!     #[sql(column = "id")]
//!     id: i64,
//!     #[sql(column = "email")]
//!     email: String,
//!     #[sql(skip)]
//!     cached: bool,
//! }
//! ```

use crate::value::{SqlValue, TypeCategory};

/// Column tag that marks a field as excluded.
pub const EXCLUDED_MARKER: &str = "-";

/// Static metadata of one record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Rust field identifier (without any `r#` prefix).
    pub field_name: &'static str,
    /// Database column name from the field's tag; empty when untagged.
    pub column: &'static str,
    /// Category of the declared field type.
    pub category: TypeCategory,
    /// True when the column tag is empty or the excluded marker.
    pub excluded: bool,
}

impl FieldDescriptor {
    /// Create a descriptor; exclusion is derived from the column tag.
    pub fn new(field_name: &'static str, column: &'static str, category: TypeCategory) -> Self {
        Self {
            field_name,
            column,
            category,
            excluded: is_excluded_column(column),
        }
    }

    /// Whether the field participates in generated fragments.
    pub fn is_active(&self) -> bool {
        !self.excluded
    }
}

/// True for an empty column tag or the excluded marker.
pub fn is_excluded_column(column: &str) -> bool {
    column.is_empty() || column == EXCLUDED_MARKER
}

/// A field descriptor together with its typed accessor.
pub struct Field<R> {
    descriptor: FieldDescriptor,
    read: Option<fn(&R) -> SqlValue>,
}

impl<R> Field<R> {
    /// Tagged field with an accessor.
    pub fn new(
        field_name: &'static str,
        column: &'static str,
        category: TypeCategory,
        read: fn(&R) -> SqlValue,
    ) -> Self {
        let descriptor = FieldDescriptor::new(field_name, column, category);
        let read = descriptor.is_active().then_some(read);
        Self { descriptor, read }
    }

    /// Field without a usable column tag. It stays in the catalog for
    /// introspection but never yields a value.
    pub fn excluded(field_name: &'static str, column: &'static str) -> Self {
        Self {
            descriptor: FieldDescriptor {
                field_name,
                column,
                category: TypeCategory::Other,
                excluded: true,
            },
            read: None,
        }
    }

    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &'static str {
        self.descriptor.field_name
    }

    pub fn column(&self) -> &'static str {
        self.descriptor.column
    }

    pub fn category(&self) -> &TypeCategory {
        &self.descriptor.category
    }

    pub fn is_active(&self) -> bool {
        self.descriptor.is_active()
    }

    /// Read this field from a record. Inactive fields read as `Null`.
    pub fn value(&self, record: &R) -> SqlValue {
        match self.read {
            Some(read) => read(record),
            None => SqlValue::Null,
        }
    }
}

impl<R> std::fmt::Debug for Field<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("descriptor", &self.descriptor)
            .field("readable", &self.read.is_some())
            .finish()
    }
}

/// A record type whose fields map to database columns.
///
/// This trait is automatically implemented by `#[derive(Record)]`.
pub trait Record: Sized + 'static {
    /// Every field in declaration order, including excluded ones.
    fn fields() -> &'static [Field<Self>];

    /// The Rust type name, for diagnostics.
    fn record_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// All descriptors of `R` in declaration order.
pub fn describe<R: Record>() -> impl Iterator<Item = &'static FieldDescriptor> {
    R::fields().iter().map(Field::descriptor)
}

/// Only the active fields of `R`, in declaration order.
pub fn active_fields<R: Record>() -> impl Iterator<Item = &'static Field<R>> {
    R::fields().iter().filter(|f| f.is_active())
}

/// Look up a field of `R` by its Rust identifier.
pub fn field_by_name<R: Record>(name: &str) -> Option<&'static Field<R>> {
    R::fields().iter().find(|f| f.name() == name)
}

/// Registration entry for record types.
///
/// `#[derive(Record)]` submits one of these per type, so every record linked
/// into the binary can be listed at startup.
pub struct RecordRegistration {
    /// The Rust type name.
    pub name: &'static str,
    /// Returns the type's descriptors in declaration order.
    pub describe: fn() -> Vec<FieldDescriptor>,
}

inventory::collect!(RecordRegistration);

/// Descriptor table of a record type, for registrations.
pub fn descriptors_of<R: Record>() -> Vec<FieldDescriptor> {
    describe::<R>().cloned().collect()
}

/// All registered record types, sorted by name.
pub fn registered_records() -> Vec<(&'static str, Vec<FieldDescriptor>)> {
    let mut out: Vec<_> = inventory::iter::<RecordRegistration>
        .into_iter()
        .map(|reg| (reg.name, (reg.describe)()))
        .collect();
    out.sort_by_key(|(name, _)| *name);
    out
}
