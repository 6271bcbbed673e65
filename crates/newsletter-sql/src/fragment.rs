//! Column, value and assignment fragments built from a record's catalog.
//!
//! Every function walks the active fields of a [`Record`] in declaration order
//! and keeps or drops each field according to a [`FieldSet`]:
//!
//! - `*_excluding` style functions (`column_names`, `column_values`,
//!   `update_assignments`) drop fields named in the set.
//! - `*_including` functions keep only fields named in the set; an empty set
//!   yields an empty fragment.
//!
//! Column and value lists produced with the same record and the same set always
//! have equal length and correspond position by position.
//!
//! # Example
//!
//! ```ignore
//! use newsletter_sql::{FieldSet, column_names, column_values};
//!
//! let skip = FieldSet::of(["id"]);
//! let sql = format!(
//!     "INSERT INTO subscribers ({}) VALUES ({})",
//!     column_names::<Subscriber>(&skip, ""),
//!     column_values(&subscriber, &skip)?,
//! );
//! ```

use std::collections::BTreeSet;
use std::fmt;

use crate::catalog::{Field, Record, active_fields};
use crate::error::{FragmentError, FragmentResult};
use crate::value::render;

/// A set of Rust field names used to include or exclude fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    names: BTreeSet<String>,
}

impl FieldSet {
    /// The empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from field names.
    pub fn of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Add a name to the set.
    pub fn with(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Every field of `R` whose name is *not* in this set.
    ///
    /// Used to turn an include set into the equivalent exclude set.
    pub fn complement<R: Record>(&self) -> FieldSet {
        FieldSet {
            names: R::fields()
                .iter()
                .map(Field::name)
                .filter(|name| !self.contains(name))
                .map(str::to_string)
                .collect(),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for FieldSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::of(iter)
    }
}

/// An ordered list of rendered SQL tokens.
///
/// Renders as the tokens joined by `,` (see [`Fragment::to_sql`]). An empty
/// fragment renders as the empty string and means "nothing to emit".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    tokens: Vec<String>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: impl Into<String>) {
        self.tokens.push(token.into());
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<String> {
        self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens joined by `,`.
    pub fn to_sql(&self) -> String {
        self.tokens.join(",")
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(token)?;
        }
        Ok(())
    }
}

impl From<Vec<String>> for Fragment {
    fn from(tokens: Vec<String>) -> Self {
        Self { tokens }
    }
}

impl FromIterator<String> for Fragment {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

#[derive(Clone, Copy)]
enum Selection<'a> {
    Exclude(&'a FieldSet),
    Include(&'a FieldSet),
}

impl Selection<'_> {
    fn keeps(&self, name: &str) -> bool {
        match self {
            Self::Exclude(set) => !set.contains(name),
            Self::Include(set) => set.contains(name),
        }
    }
}

fn selected<R: Record>(selection: Selection<'_>) -> impl Iterator<Item = &'static Field<R>> + '_ {
    active_fields::<R>().filter(move |f| selection.keeps(f.name()))
}

fn column_token(column: &str, alias: &str) -> String {
    if alias.is_empty() {
        format!("[{column}]")
    } else {
        format!("{alias}.[{column}]")
    }
}

fn value_token<R: Record>(field: &Field<R>, record: &R) -> FragmentResult<String> {
    render(&field.value(record), field.category()).map_err(|e| e.for_field(field.name()))
}

fn names<R: Record>(selection: Selection<'_>, alias: &str) -> Fragment {
    selected::<R>(selection)
        .map(|f| column_token(f.column(), alias))
        .collect()
}

fn values<R: Record>(record: &R, selection: Selection<'_>) -> FragmentResult<Fragment> {
    selected::<R>(selection)
        .map(|f| value_token(f, record))
        .collect::<FragmentResult<Vec<_>>>()
        .map(Fragment::from)
}

fn assignments<R: Record>(record: &R, selection: Selection<'_>) -> FragmentResult<Fragment> {
    selected::<R>(selection)
        .map(|f| {
            let value = value_token(f, record)?;
            Ok(format!("{} = {}", column_token(f.column(), ""), value))
        })
        .collect::<FragmentResult<Vec<_>>>()
        .map(Fragment::from)
}

/// Bracketed column names of the active fields not in `exclude`.
///
/// A non-empty `alias` prefixes each column as `alias.[column]`.
pub fn column_names<R: Record>(exclude: &FieldSet, alias: &str) -> Fragment {
    names::<R>(Selection::Exclude(exclude), alias)
}

/// Bracketed column names of the active fields named in `include`.
///
/// An empty `include` yields an empty fragment.
pub fn column_names_including<R: Record>(include: &FieldSet, alias: &str) -> Fragment {
    if include.is_empty() {
        return Fragment::new();
    }
    names::<R>(Selection::Include(include), alias)
}

/// Rendered values of the active fields not in `exclude`.
pub fn column_values<R: Record>(record: &R, exclude: &FieldSet) -> FragmentResult<Fragment> {
    values(record, Selection::Exclude(exclude))
}

/// Rendered values of the active fields named in `include`.
pub fn column_values_including<R: Record>(
    record: &R,
    include: &FieldSet,
) -> FragmentResult<Fragment> {
    if include.is_empty() {
        return Ok(Fragment::new());
    }
    values(record, Selection::Include(include))
}

/// `[column] = value` pairs for the active fields not in `exclude`.
///
/// Columns and values are produced in a single pass, so each pair always
/// belongs to the same field.
pub fn update_assignments<R: Record>(record: &R, exclude: &FieldSet) -> FragmentResult<Fragment> {
    assignments(record, Selection::Exclude(exclude))
}

/// `[column] = value` pairs for the active fields named in `include`.
///
/// Equivalent to [`update_assignments`] with the complement of `include` as
/// the exclude set. An empty `include` yields an empty fragment.
pub fn update_assignments_including<R: Record>(
    record: &R,
    include: &FieldSet,
) -> FragmentResult<Fragment> {
    if include.is_empty() {
        return Ok(Fragment::new());
    }
    update_assignments(record, &include.complement::<R>())
}

/// Zip separately produced column and value lists into assignments.
///
/// Both lists must come from the same record and the same field set; a length
/// difference is reported as [`FragmentError::MisalignedFragments`].
pub fn zip_assignments(columns: &Fragment, values: &Fragment) -> FragmentResult<Fragment> {
    if columns.len() != values.len() {
        return Err(FragmentError::MisalignedFragments {
            columns: columns.len(),
            values: values.len(),
        });
    }
    Ok(columns
        .tokens()
        .iter()
        .zip(values.tokens())
        .map(|(c, v)| format!("{c} = {v}"))
        .collect())
}
