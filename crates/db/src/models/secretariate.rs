//! Secretariate (conference staff) models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use summit_core::diff::{ChangeSet, Diff};
use summit_core::error::CoreError;
use summit_core::ordering::validate_position;
use summit_core::patch::Patch;
use summit_core::types::{DbId, Position, Timestamp};
use summit_core::validation::{self, MAX_NAME_LEN, MAX_TEXT_LEN};

use super::{check_optional, check_patch, clean};

/// A row from the `secretariates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Secretariate {
    pub id: DbId,
    pub name: String,
    pub title: String,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    pub position: Position,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a secretariate member.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSecretariate {
    pub name: String,
    pub title: String,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub photo: Option<String>,
    pub position: Option<Position>,
}

impl CreateSecretariate {
    pub fn validate(&self) -> Result<(), CoreError> {
        validation::require_text("name", &self.name)?;
        validation::require_text("title", &self.title)?;
        validation::max_len("name", self.name.trim(), MAX_NAME_LEN)?;
        validation::max_len("title", self.title.trim(), MAX_NAME_LEN)?;
        check_optional("bio", &self.bio, MAX_TEXT_LEN)?;
        if let Some(email) = clean(&self.email) {
            validation::email("email", email)?;
        }
        if let Some(position) = self.position {
            validate_position(position)?;
        }
        Ok(())
    }
}

/// DTO for partially updating a secretariate member.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSecretariate {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub bio: Patch<String>,
    #[serde(default)]
    pub email: Patch<String>,
    #[serde(default)]
    pub photo: Patch<String>,
    #[serde(default)]
    pub position: Patch<Position>,
}

impl UpdateSecretariate {
    pub fn validate(&self) -> Result<(), CoreError> {
        self.name.forbid_null("name")?;
        self.title.forbid_null("title")?;
        self.position.forbid_null("position")?;
        check_patch("name", &self.name, MAX_NAME_LEN)?;
        check_patch("title", &self.title, MAX_NAME_LEN)?;
        check_patch("bio", &self.bio, MAX_TEXT_LEN)?;
        validation::patch_value(&self.email, |v| validation::email("email", v))?;
        if let Some(position) = self.position.value() {
            validate_position(*position)?;
        }
        Ok(())
    }

    /// Field changes against `current`. `photo_url` is the resolved photo patch.
    pub fn changes(&self, current: &Secretariate, photo_url: &Patch<String>) -> ChangeSet {
        Diff::new()
            .text("name", &current.name, &self.name)
            .text("title", &current.title, &self.title)
            .optional_text("bio", current.bio.as_deref(), &self.bio)
            .optional_text("email", current.email.as_deref(), &self.email)
            .optional_text("photo_url", current.photo_url.as_deref(), photo_url)
            .finish()
    }

    /// Requested position, when it differs from the current one.
    pub fn position_change(&self, current: &Secretariate) -> Option<Position> {
        self.position.value().copied().filter(|p| *p != current.position)
    }
}
