//! Quote models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use summit_core::diff::{ChangeSet, Diff};
use summit_core::error::CoreError;
use summit_core::patch::Patch;
use summit_core::types::{DbId, Timestamp};
use summit_core::validation::{self, MAX_NAME_LEN, MAX_TEXT_LEN};

use super::{check_optional, check_patch};

/// A row from the `quotes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Quote {
    pub id: DbId,
    pub text: String,
    pub author: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a quote.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuote {
    pub text: String,
    pub author: Option<String>,
}

impl CreateQuote {
    pub fn validate(&self) -> Result<(), CoreError> {
        validation::require_text("text", &self.text)?;
        validation::max_len("text", self.text.trim(), MAX_TEXT_LEN)?;
        check_optional("author", &self.author, MAX_NAME_LEN)
    }
}

/// DTO for partially updating a quote.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateQuote {
    #[serde(default)]
    pub text: Patch<String>,
    #[serde(default)]
    pub author: Patch<String>,
}

impl UpdateQuote {
    pub fn validate(&self) -> Result<(), CoreError> {
        self.text.forbid_null("text")?;
        check_patch("text", &self.text, MAX_TEXT_LEN)?;
        check_patch("author", &self.author, MAX_NAME_LEN)
    }

    pub fn changes(&self, current: &Quote) -> ChangeSet {
        Diff::new()
            .text("text", &current.text, &self.text)
            .optional_text("author", current.author.as_deref(), &self.author)
            .finish()
    }
}
