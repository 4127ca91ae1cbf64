//! Committee models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use summit_core::diff::{ChangeSet, Diff};
use summit_core::error::CoreError;
use summit_core::ordering::validate_position;
use summit_core::patch::Patch;
use summit_core::types::{DbId, Position, Timestamp};
use summit_core::validation::{self, MAX_NAME_LEN, MAX_TEXT_LEN};

use super::{check_optional, check_patch};

/// A row from the `committees` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Committee {
    pub id: DbId,
    pub name: String,
    pub abbreviation: Option<String>,
    pub topic: Option<String>,
    pub description: Option<String>,
    pub chair_name: Option<String>,
    pub image_url: Option<String>,
    pub position: Position,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a committee.
///
/// `image` is a data URL or an absolute URL; it is resolved to a stored URL
/// before insert. `position` defaults to the end of the list.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommittee {
    pub name: String,
    pub abbreviation: Option<String>,
    pub topic: Option<String>,
    pub description: Option<String>,
    pub chair_name: Option<String>,
    pub image: Option<String>,
    pub position: Option<Position>,
}

impl CreateCommittee {
    pub fn validate(&self) -> Result<(), CoreError> {
        validation::require_text("name", &self.name)?;
        validation::max_len("name", self.name.trim(), MAX_NAME_LEN)?;
        check_optional("abbreviation", &self.abbreviation, MAX_NAME_LEN)?;
        check_optional("topic", &self.topic, MAX_NAME_LEN)?;
        check_optional("description", &self.description, MAX_TEXT_LEN)?;
        check_optional("chair_name", &self.chair_name, MAX_NAME_LEN)?;
        if let Some(position) = self.position {
            validate_position(position)?;
        }
        Ok(())
    }
}

/// DTO for partially updating a committee.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCommittee {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub abbreviation: Patch<String>,
    #[serde(default)]
    pub topic: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub chair_name: Patch<String>,
    #[serde(default)]
    pub image: Patch<String>,
    #[serde(default)]
    pub position: Patch<Position>,
}

impl UpdateCommittee {
    pub fn validate(&self) -> Result<(), CoreError> {
        self.name.forbid_null("name")?;
        self.position.forbid_null("position")?;
        check_patch("name", &self.name, MAX_NAME_LEN)?;
        check_patch("abbreviation", &self.abbreviation, MAX_NAME_LEN)?;
        check_patch("topic", &self.topic, MAX_NAME_LEN)?;
        check_patch("description", &self.description, MAX_TEXT_LEN)?;
        check_patch("chair_name", &self.chair_name, MAX_NAME_LEN)?;
        if let Some(position) = self.position.value() {
            validate_position(*position)?;
        }
        Ok(())
    }

    /// Field changes against `current`. `image_url` is the resolved image
    /// patch (already uploaded, or `Null` to clear).
    pub fn changes(&self, current: &Committee, image_url: &Patch<String>) -> ChangeSet {
        Diff::new()
            .text("name", &current.name, &self.name)
            .optional_text("abbreviation", current.abbreviation.as_deref(), &self.abbreviation)
            .optional_text("topic", current.topic.as_deref(), &self.topic)
            .optional_text("description", current.description.as_deref(), &self.description)
            .optional_text("chair_name", current.chair_name.as_deref(), &self.chair_name)
            .optional_text("image_url", current.image_url.as_deref(), image_url)
            .finish()
    }

    /// Requested position, when it differs from the current one.
    pub fn position_change(&self, current: &Committee) -> Option<Position> {
        self.position.value().copied().filter(|p| *p != current.position)
    }
}
