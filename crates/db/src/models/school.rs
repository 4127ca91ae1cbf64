//! School delegation registration models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use summit_core::diff::{ChangeSet, Diff};
use summit_core::error::CoreError;
use summit_core::patch::Patch;
use summit_core::types::{DbId, Timestamp};
use summit_core::validation::{self, MAX_NAME_LEN, MAX_TEXT_LEN};

use super::{check_optional, check_patch};

/// Smallest delegation a school may register.
pub const MIN_DELEGATES: i32 = 1;

/// Largest delegation a school may register.
pub const MAX_DELEGATES: i32 = 200;

/// A row from the `schools` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct School {
    pub id: DbId,
    pub school_name: String,
    pub advisor_name: String,
    pub advisor_email: String,
    pub phone: Option<String>,
    pub delegate_count: i32,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for a public registration.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSchool {
    pub school_name: String,
    pub advisor_name: String,
    pub advisor_email: String,
    pub phone: Option<String>,
    pub delegate_count: i32,
    pub notes: Option<String>,
}

fn check_delegates(count: i32) -> Result<(), CoreError> {
    validation::at_least("delegate_count", count, MIN_DELEGATES)?;
    if count > MAX_DELEGATES {
        return Err(CoreError::Validation(format!(
            "Field 'delegate_count' must be at most {MAX_DELEGATES}"
        )));
    }
    Ok(())
}

impl CreateSchool {
    pub fn validate(&self) -> Result<(), CoreError> {
        validation::require_text("school_name", &self.school_name)?;
        validation::require_text("advisor_name", &self.advisor_name)?;
        validation::require_text("advisor_email", &self.advisor_email)?;
        validation::max_len("school_name", self.school_name.trim(), MAX_NAME_LEN)?;
        validation::max_len("advisor_name", self.advisor_name.trim(), MAX_NAME_LEN)?;
        validation::email("advisor_email", &self.advisor_email)?;
        check_optional("phone", &self.phone, 40)?;
        check_optional("notes", &self.notes, MAX_TEXT_LEN)?;
        check_delegates(self.delegate_count)
    }
}

/// DTO for partially updating a registration (admin).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSchool {
    #[serde(default)]
    pub school_name: Patch<String>,
    #[serde(default)]
    pub advisor_name: Patch<String>,
    #[serde(default)]
    pub advisor_email: Patch<String>,
    #[serde(default)]
    pub phone: Patch<String>,
    #[serde(default)]
    pub delegate_count: Patch<i32>,
    #[serde(default)]
    pub notes: Patch<String>,
}

impl UpdateSchool {
    pub fn validate(&self) -> Result<(), CoreError> {
        self.school_name.forbid_null("school_name")?;
        self.advisor_name.forbid_null("advisor_name")?;
        self.advisor_email.forbid_null("advisor_email")?;
        self.delegate_count.forbid_null("delegate_count")?;
        check_patch("school_name", &self.school_name, MAX_NAME_LEN)?;
        check_patch("advisor_name", &self.advisor_name, MAX_NAME_LEN)?;
        validation::patch_value(&self.advisor_email, |v| {
            validation::email("advisor_email", v)
        })?;
        check_patch("phone", &self.phone, 40)?;
        check_patch("notes", &self.notes, MAX_TEXT_LEN)?;
        if let Some(count) = self.delegate_count.value() {
            check_delegates(*count)?;
        }
        Ok(())
    }

    pub fn changes(&self, current: &School) -> ChangeSet {
        Diff::new()
            .text("school_name", &current.school_name, &self.school_name)
            .text("advisor_name", &current.advisor_name, &self.advisor_name)
            .text("advisor_email", &current.advisor_email, &self.advisor_email)
            .optional_text("phone", current.phone.as_deref(), &self.phone)
            .int("delegate_count", current.delegate_count, &self.delegate_count)
            .optional_text("notes", current.notes.as_deref(), &self.notes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> CreateSchool {
        CreateSchool {
            school_name: "Northside High".into(),
            advisor_name: "J. Okafor".into(),
            advisor_email: "okafor@northside.edu".into(),
            phone: None,
            delegate_count: 12,
            notes: None,
        }
    }

    #[test]
    fn valid_registration() {
        assert!(registration().validate().is_ok());
    }

    #[test]
    fn delegate_bounds() {
        let mut r = registration();
        r.delegate_count = 0;
        assert!(r.validate().is_err());
        r.delegate_count = MAX_DELEGATES + 1;
        assert!(r.validate().is_err());
    }

    #[test]
    fn advisor_email_must_be_valid() {
        let mut r = registration();
        r.advisor_email = "okafor-at-northside".into();
        assert!(r.validate().is_err());
    }
}
