//! Field-level diff engine for partial updates.
//!
//! Compares a stored record against a patch request and produces the minimal
//! [`ChangeSet`] to write. The diff is a declarative list of
//! `(field, value)` pairs in the order the fields were declared; the
//! persistence layer turns it into a single parameterized `UPDATE`.
//!
//! Normalization rules:
//!
//! - text values are trimmed before comparison and before staging;
//! - a text value that is empty after trimming means "no change requested";
//! - [`Patch::Null`] clears a nullable field that currently holds a value and
//!   is ignored on required fields (callers reject it up front via
//!   [`Patch::forbid_null`]).

use chrono::{NaiveDate, NaiveTime};

use crate::patch::Patch;

/// A staged column value. Every variant is nullable so that clearing a field
/// binds a typed SQL `NULL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(Option<String>),
    Int(Option<i32>),
    Date(Option<NaiveDate>),
    Time(Option<NaiveTime>),
}

/// One dirty column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: &'static str,
    pub value: FieldValue,
}

/// The ordered set of dirty columns produced by [`Diff::finish`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changes: Vec<FieldChange>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldChange> {
        self.changes.iter()
    }

    /// Names of the dirty columns, in declaration order.
    pub fn fields(&self) -> Vec<&'static str> {
        self.changes.iter().map(|c| c.field).collect()
    }

    /// Look up the staged value for `field`.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.changes
            .iter()
            .find(|c| c.field == field)
            .map(|c| &c.value)
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a FieldChange;
    type IntoIter = std::slice::Iter<'a, FieldChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

/// Builder comparing one record field by field.
///
/// ```ignore
/// let changes = Diff::new()
///     .text("name", &current.name, &input.name)
///     .optional_text("description", current.description.as_deref(), &input.description)
///     .finish();
/// ```
#[derive(Debug, Default)]
pub struct Diff {
    changes: Vec<FieldChange>,
}

impl Diff {
    pub fn new() -> Self {
        Self::default()
    }

    fn stage(mut self, field: &'static str, value: FieldValue) -> Self {
        self.changes.push(FieldChange { field, value });
        self
    }

    /// Compare a required (non-nullable) text column.
    pub fn text(self, field: &'static str, current: &str, patch: &Patch<String>) -> Self {
        match normalized_text(patch) {
            Some(proposed) if proposed != current => {
                self.stage(field, FieldValue::Text(Some(proposed.to_string())))
            }
            _ => self,
        }
    }

    /// Compare a nullable text column.
    pub fn optional_text(
        self,
        field: &'static str,
        current: Option<&str>,
        patch: &Patch<String>,
    ) -> Self {
        match patch {
            Patch::Null if current.is_some() => self.stage(field, FieldValue::Text(None)),
            Patch::Value(_) => match normalized_text(patch) {
                Some(proposed) if Some(proposed) != current => {
                    self.stage(field, FieldValue::Text(Some(proposed.to_string())))
                }
                _ => self,
            },
            _ => self,
        }
    }

    /// Compare a required integer column.
    pub fn int(self, field: &'static str, current: i32, patch: &Patch<i32>) -> Self {
        match patch {
            Patch::Value(v) if *v != current => self.stage(field, FieldValue::Int(Some(*v))),
            _ => self,
        }
    }

    /// Compare a required date column.
    pub fn date(self, field: &'static str, current: NaiveDate, patch: &Patch<NaiveDate>) -> Self {
        match patch {
            Patch::Value(v) if *v != current => self.stage(field, FieldValue::Date(Some(*v))),
            _ => self,
        }
    }

    /// Compare a required time column.
    pub fn time(self, field: &'static str, current: NaiveTime, patch: &Patch<NaiveTime>) -> Self {
        match patch {
            Patch::Value(v) if *v != current => self.stage(field, FieldValue::Time(Some(*v))),
            _ => self,
        }
    }

    /// Compare a nullable time column.
    pub fn optional_time(
        self,
        field: &'static str,
        current: Option<NaiveTime>,
        patch: &Patch<NaiveTime>,
    ) -> Self {
        match patch {
            Patch::Null if current.is_some() => self.stage(field, FieldValue::Time(None)),
            Patch::Value(v) if Some(*v) != current => {
                self.stage(field, FieldValue::Time(Some(*v)))
            }
            _ => self,
        }
    }

    pub fn finish(self) -> ChangeSet {
        ChangeSet {
            changes: self.changes,
        }
    }
}

/// Trimmed proposed text, or `None` when nothing usable was supplied.
fn normalized_text(patch: &Patch<String>) -> Option<&str> {
    match patch {
        Patch::Value(v) => {
            let trimmed = v.trim();
            (!trimmed.is_empty()).then_some(trimmed)
        }
        _ => None,
    }
}
