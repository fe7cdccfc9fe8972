use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use todo_core::{AccountId, AppResult, ItemId};

use crate::changes::{ChangeTracker, FieldChangeSummary};
use crate::validate_required;

/// A todo item owned by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Row id.
    pub id: ItemId,
    /// Public identifier assigned at insert.
    pub external_id: String,
    /// Short item name.
    pub name: String,
    /// Free-form details.
    pub details: String,
    /// Creation timestamp.
    pub created_on: DateTime<Utc>,
    /// Last update timestamp.
    pub last_updated_on: Option<DateTime<Utc>>,
    /// Soft-archive timestamp.
    pub archived_on: Option<DateTime<Utc>>,
    /// Owning account.
    pub belongs_to_account: AccountId,
}

impl Item {
    /// Applies an update input and returns the fields that changed.
    pub fn update(&mut self, input: ItemUpdateInput) -> Vec<FieldChangeSummary> {
        let mut tracker = ChangeTracker::new();
        tracker.apply("name", &mut self.name, input.name);
        tracker.apply("details", &mut self.details, input.details);
        tracker.finish()
    }
}

/// Input payload for item creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCreationInput {
    /// Short item name.
    pub name: String,
    /// Free-form details.
    pub details: String,
    /// Owning account.
    pub belongs_to_account: AccountId,
}

impl ItemCreationInput {
    /// Validates the payload before any storage access.
    pub fn validate(&self) -> AppResult<()> {
        validate_required("item name", &self.name)
    }
}

/// Partial update for an item. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdateInput {
    /// New name.
    pub name: Option<String>,
    /// New details.
    pub details: Option<String>,
}

impl ItemUpdateInput {
    /// Validates the payload before any storage access.
    pub fn validate(&self) -> AppResult<()> {
        if let Some(name) = &self.name {
            validate_required("item name", name)?;
        }

        Ok(())
    }
}
