//! Tri-state field values for partial updates.
//!
//! A JSON update body can say three different things about a field: nothing
//! (the key is absent), "clear it" (`null`), or "set it" (a value). A plain
//! `Option<T>` collapses the first two, so update DTOs use [`Patch`] with
//! `#[serde(default)]` on every field:
//!
//! ```ignore
//! #[derive(Deserialize)]
//! struct UpdateHotel {
//!     #[serde(default)]
//!     description: Patch<String>,
//! }
//! ```

use serde::{Deserialize, Deserializer};

use crate::error::CoreError;

/// A single field of a partial update request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    /// The field was not present in the request. No change requested.
    #[default]
    Missing,
    /// The field was explicitly `null`. Clear the stored value.
    Null,
    /// A proposed new value.
    Value(T),
}

impl<T> Patch<T> {
    /// `true` when the request did not mention the field at all.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Borrow the proposed value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Borrowing view, mirroring `Option::as_ref`.
    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Self::Missing => Patch::Missing,
            Self::Null => Patch::Null,
            Self::Value(v) => Patch::Value(v),
        }
    }

    /// Reject an explicit `null` on a field that cannot be cleared.
    pub fn forbid_null(&self, field: &str) -> Result<(), CoreError> {
        match self {
            Self::Null => Err(CoreError::Validation(format!(
                "Field '{field}' is required and cannot be cleared"
            ))),
            _ => Ok(()),
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Absent keys never reach here; `#[serde(default)]` yields `Missing`.
        Option::<T>::deserialize(deserializer).map(|opt| match opt {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default)]
        name: Patch<String>,
        #[serde(default)]
        position: Patch<i32>,
    }

    #[test]
    fn absent_field_is_missing() {
        let body: Body = serde_json::from_str("{}").unwrap();
        assert_eq!(body.name, Patch::Missing);
        assert_eq!(body.position, Patch::Missing);
    }

    #[test]
    fn default_is_missing_without_inner_default() {
        #[derive(Debug, PartialEq)]
        struct NoDefault;

        assert_eq!(Patch::<NoDefault>::default(), Patch::Missing);
    }

    #[test]
    fn null_field_is_null() {
        let body: Body = serde_json::from_str(r#"{"name": null}"#).unwrap();
        assert_eq!(body.name, Patch::Null);
        assert!(body.position.is_missing());
    }

    #[test]
    fn present_field_is_value() {
        let body: Body = serde_json::from_str(r#"{"name": "Hall A", "position": 3}"#).unwrap();
        assert_eq!(body.name, Patch::Value("Hall A".to_string()));
        assert_eq!(body.position.value(), Some(&3));
    }

    #[test]
    fn forbid_null_rejects_only_null() {
        assert!(Patch::<String>::Missing.forbid_null("name").is_ok());
        assert!(Patch::Value("x".to_string()).forbid_null("name").is_ok());
        let err = Patch::<String>::Null.forbid_null("name").unwrap_err();
        assert!(err.to_string().contains("'name'"));
    }
}
