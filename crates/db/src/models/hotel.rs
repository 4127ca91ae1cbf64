//! Partner hotel models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use summit_core::diff::{ChangeSet, Diff};
use summit_core::error::CoreError;
use summit_core::patch::Patch;
use summit_core::types::{DbId, Timestamp};
use summit_core::validation::{self, MAX_NAME_LEN, MAX_TEXT_LEN};

use super::{check_optional, check_patch, clean};

/// A row from the `hotels` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Hotel {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub website_url: Option<String>,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a hotel.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateHotel {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub website_url: Option<String>,
    pub image: Option<String>,
}

impl CreateHotel {
    pub fn validate(&self) -> Result<(), CoreError> {
        validation::require_text("name", &self.name)?;
        validation::max_len("name", self.name.trim(), MAX_NAME_LEN)?;
        check_optional("description", &self.description, MAX_TEXT_LEN)?;
        check_optional("address", &self.address, MAX_TEXT_LEN)?;
        if let Some(url) = clean(&self.website_url) {
            validation::website("website_url", url)?;
        }
        Ok(())
    }
}

/// DTO for partially updating a hotel.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateHotel {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub address: Patch<String>,
    #[serde(default)]
    pub website_url: Patch<String>,
    #[serde(default)]
    pub image: Patch<String>,
}

impl UpdateHotel {
    pub fn validate(&self) -> Result<(), CoreError> {
        self.name.forbid_null("name")?;
        check_patch("name", &self.name, MAX_NAME_LEN)?;
        check_patch("description", &self.description, MAX_TEXT_LEN)?;
        check_patch("address", &self.address, MAX_TEXT_LEN)?;
        validation::patch_value(&self.website_url, |v| {
            validation::website("website_url", v)
        })?;
        Ok(())
    }

    /// Field changes against `current`. `image_url` is the resolved image patch.
    pub fn changes(&self, current: &Hotel, image_url: &Patch<String>) -> ChangeSet {
        Diff::new()
            .text("name", &current.name, &self.name)
            .optional_text("description", current.description.as_deref(), &self.description)
            .optional_text("address", current.address.as_deref(), &self.address)
            .optional_text("website_url", current.website_url.as_deref(), &self.website_url)
            .optional_text("image_url", current.image_url.as_deref(), image_url)
            .finish()
    }
}
