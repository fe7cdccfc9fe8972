use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use todo_core::{ApiClientId, AppError, AppResult, UserId};

use crate::validate_required;

/// Minimum length of an API client secret in bytes.
pub const API_CLIENT_SECRET_MIN_LENGTH: usize = 32;

/// Credential pair a user issues for programmatic access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiClient {
    /// Row id.
    pub id: ApiClientId,
    /// Public identifier assigned at insert.
    pub external_id: String,
    /// Display name.
    pub name: String,
    /// Unique client identifier presented by callers.
    pub client_id: String,
    /// Shared signing secret.
    #[serde(skip_serializing)]
    pub secret_key: Vec<u8>,
    /// Creation timestamp.
    pub created_on: DateTime<Utc>,
    /// Last update timestamp.
    pub last_updated_on: Option<DateTime<Utc>>,
    /// Soft-archive timestamp.
    pub archived_on: Option<DateTime<Utc>>,
    /// Owning user.
    pub belongs_to_user: UserId,
}

/// Input payload for API client creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiClientCreationInput {
    /// Display name.
    pub name: String,
    /// Unique client identifier.
    pub client_id: String,
    /// Shared signing secret.
    pub secret_key: Vec<u8>,
    /// Owning user.
    pub belongs_to_user: UserId,
}

impl ApiClientCreationInput {
    /// Validates the payload before any storage access.
    pub fn validate(&self) -> AppResult<()> {
        validate_required("api client name", &self.name)?;
        validate_required("api client id", &self.client_id)?;

        if self.secret_key.len() < API_CLIENT_SECRET_MIN_LENGTH {
            return Err(AppError::Validation(format!(
                "api client secret must be at least {API_CLIENT_SECRET_MIN_LENGTH} bytes"
            )));
        }

        Ok(())
    }
}
