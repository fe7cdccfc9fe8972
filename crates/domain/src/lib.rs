//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod account;
mod api_client;
mod audit;
mod changes;
mod filter;
mod item;
mod permissions;
mod user;
mod webhook;

/// Sample payloads for tests.
#[cfg(any(test, feature = "fakes"))]
pub mod fakes;

pub use account::{
    Account, AccountCreationInput, AccountSubscriptionPlan, AccountSubscriptionPlanCreationInput,
    AccountSubscriptionPlanUpdateInput, AccountUpdateInput, AccountUserMembership,
    AddUserToAccountInput, ModifyUserPermissionsInput, TransferAccountOwnershipInput,
    UNPAID_BILLING_STATUS,
};
pub use api_client::{API_CLIENT_SECRET_MIN_LENGTH, ApiClient, ApiClientCreationInput};
pub use audit::{AuditEvent, AuditLogEntry, AuditSubject};
pub use changes::{ChangeTracker, FieldChangeSummary};
pub use filter::{
    DEFAULT_QUERY_LIMIT, ListPage, MAX_QUERY_LIMIT, Pagination, QueryFilter, SortDirection,
};
pub use item::{Item, ItemCreationInput, ItemUpdateInput};
pub use permissions::{
    AccountUserPermission, AccountUserPermissions, ServiceAdminPermission,
    ServiceAdminPermissions,
};
pub use user::{
    USERNAME_MAX_LENGTH, User, UserRegistrationInput, UserReputation, UserReputationUpdateInput,
    UserUpdateInput, validate_username,
};
pub use webhook::{Webhook, WebhookCreationInput, WebhookUpdateInput};

use todo_core::{AppError, AppResult};

/// Rejects blank required text fields.
pub(crate) fn validate_required(field_name: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field_name} must not be empty")));
    }

    Ok(())
}
