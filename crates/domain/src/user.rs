//! User domain types and validation rules.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use todo_core::{AppError, AppResult, UserId};

use crate::changes::{ChangeTracker, FieldChangeSummary};
use crate::permissions::ServiceAdminPermissions;
use crate::validate_required;

/// Maximum username length.
pub const USERNAME_MAX_LENGTH: usize = 64;

/// Standing of a user with the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserReputation {
    /// Newly registered, not yet verified.
    #[default]
    Unverified,
    /// In good standing.
    Good,
    /// Banned by a service admin.
    Banned,
    /// Account terminated.
    Terminated,
}

impl UserReputation {
    /// Returns the storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unverified => "unverified",
            Self::Good => "good",
            Self::Banned => "banned",
            Self::Terminated => "terminated",
        }
    }
}

impl FromStr for UserReputation {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "unverified" => Ok(Self::Unverified),
            "good" => Ok(Self::Good),
            "banned" => Ok(Self::Banned),
            "terminated" => Ok(Self::Terminated),
            _ => Err(AppError::Validation(format!(
                "unknown user reputation '{value}'"
            ))),
        }
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Row id.
    pub id: UserId,
    /// Public identifier assigned at insert.
    pub external_id: String,
    /// Unique login name.
    pub username: String,
    /// Password hash produced outside this crate.
    #[serde(skip_serializing)]
    pub hashed_password: String,
    /// Forces a password change at next sign-in.
    pub requires_password_change: bool,
    /// Last password change.
    pub password_last_changed_on: Option<DateTime<Utc>>,
    /// TOTP secret.
    #[serde(skip_serializing)]
    pub two_factor_secret: String,
    /// When the TOTP secret was verified.
    pub two_factor_secret_verified_on: Option<DateTime<Utc>>,
    /// Service-wide capabilities.
    pub service_admin_permissions: ServiceAdminPermissions,
    /// Standing with the service.
    pub reputation: UserReputation,
    /// Reason for the last reputation change.
    pub reputation_explanation: String,
    /// Avatar location.
    pub avatar_src: Option<String>,
    /// Creation timestamp.
    pub created_on: DateTime<Utc>,
    /// Last update timestamp.
    pub last_updated_on: Option<DateTime<Utc>>,
    /// Soft-archive timestamp.
    pub archived_on: Option<DateTime<Utc>>,
}

impl User {
    /// Applies a profile update and returns the fields that changed.
    pub fn update(&mut self, input: UserUpdateInput) -> Vec<FieldChangeSummary> {
        let mut tracker = ChangeTracker::new();
        tracker.apply("username", &mut self.username, input.username);
        tracker.apply("avatar_src", &mut self.avatar_src, input.avatar_src.map(Some));
        tracker.finish()
    }

    /// Returns true when the user may act at all.
    #[must_use]
    pub fn is_in_good_standing(&self) -> bool {
        !matches!(
            self.reputation,
            UserReputation::Banned | UserReputation::Terminated
        )
    }
}

/// Input payload for user registration. The password arrives already hashed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRegistrationInput {
    /// Unique login name.
    pub username: String,
    /// Password hash.
    pub hashed_password: String,
    /// TOTP secret.
    pub two_factor_secret: String,
}

impl UserRegistrationInput {
    /// Validates the payload before any storage access.
    pub fn validate(&self) -> AppResult<()> {
        validate_username(&self.username)?;
        validate_required("password hash", &self.hashed_password)
    }
}

/// Partial profile update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdateInput {
    /// New username.
    pub username: Option<String>,
    /// New avatar location.
    pub avatar_src: Option<String>,
}

impl UserUpdateInput {
    /// Validates the payload before any storage access.
    pub fn validate(&self) -> AppResult<()> {
        if let Some(username) = &self.username {
            validate_username(username)?;
        }

        Ok(())
    }
}

/// Admin action changing a user's standing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserReputationUpdateInput {
    /// Target user.
    pub target_user_id: UserId,
    /// New standing.
    pub new_reputation: UserReputation,
    /// Reason shown to the user and recorded in the audit log.
    pub reason: String,
}

impl UserReputationUpdateInput {
    /// Validates the payload before any storage access.
    pub fn validate(&self) -> AppResult<()> {
        validate_required("reputation change reason", &self.reason)
    }
}

/// Validates a username: non-blank, bounded, no whitespace.
pub fn validate_username(username: &str) -> AppResult<()> {
    validate_required("username", username)?;

    if username.chars().count() > USERNAME_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "username must not exceed {USERNAME_MAX_LENGTH} characters"
        )));
    }

    if username.chars().any(char::is_whitespace) {
        return Err(AppError::Validation(
            "username must not contain whitespace".to_owned(),
        ));
    }

    Ok(())
}
