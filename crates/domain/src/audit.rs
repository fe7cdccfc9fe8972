//! Typed audit events.
//!
//! Every mutation produces exactly one event per affected row. An event is
//! stored as its `event_type` tag plus a JSON context holding `performed_by`
//! and the subject id keys, so entries can be looked up by any of those keys
//! without a relational join.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use todo_core::{
    AccountId, AccountSubscriptionPlanId, ApiClientId, AppError, AppResult, AuditLogEntryId,
    ItemId, MembershipId, UserId, WebhookId,
};

use crate::changes::FieldChangeSummary;
use crate::permissions::AccountUserPermissions;
use crate::user::UserReputation;

/// Closed set of auditable events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "context", rename_all = "snake_case")]
pub enum AuditEvent {
    /// An item was created.
    ItemCreated {
        /// Acting user.
        performed_by: UserId,
        /// Owning account.
        account_id: AccountId,
        /// Created item.
        item_id: ItemId,
    },
    /// An item was updated.
    ItemUpdated {
        /// Acting user.
        performed_by: UserId,
        /// Owning account.
        account_id: AccountId,
        /// Updated item.
        item_id: ItemId,
        /// Field changes.
        changes: Vec<FieldChangeSummary>,
    },
    /// An item was archived.
    ItemArchived {
        /// Acting user.
        performed_by: UserId,
        /// Owning account.
        account_id: AccountId,
        /// Archived item.
        item_id: ItemId,
    },
    /// A webhook was created.
    WebhookCreated {
        /// Acting user.
        performed_by: UserId,
        /// Owning account.
        account_id: AccountId,
        /// Created webhook.
        webhook_id: WebhookId,
    },
    /// A webhook was updated.
    WebhookUpdated {
        /// Acting user.
        performed_by: UserId,
        /// Owning account.
        account_id: AccountId,
        /// Updated webhook.
        webhook_id: WebhookId,
        /// Field changes.
        changes: Vec<FieldChangeSummary>,
    },
    /// A webhook was archived.
    WebhookArchived {
        /// Acting user.
        performed_by: UserId,
        /// Owning account.
        account_id: AccountId,
        /// Archived webhook.
        webhook_id: WebhookId,
    },
    /// An account was created.
    AccountCreated {
        /// Acting user.
        performed_by: UserId,
        /// Created account.
        account_id: AccountId,
    },
    /// An account was updated.
    AccountUpdated {
        /// Acting user.
        performed_by: UserId,
        /// Updated account.
        account_id: AccountId,
        /// Field changes.
        changes: Vec<FieldChangeSummary>,
    },
    /// An account was archived.
    AccountArchived {
        /// Acting user.
        performed_by: UserId,
        /// Archived account.
        account_id: AccountId,
    },
    /// An account was handed to another user.
    AccountOwnershipTransferred {
        /// Acting user.
        performed_by: UserId,
        /// Transferred account.
        account_id: AccountId,
        /// Previous owner.
        previous_owner: UserId,
        /// New owner.
        new_owner: UserId,
        /// Stated reason.
        reason: String,
    },
    /// A subscription plan was created.
    AccountSubscriptionPlanCreated {
        /// Acting user.
        performed_by: UserId,
        /// Created plan.
        plan_id: AccountSubscriptionPlanId,
    },
    /// A subscription plan was updated.
    AccountSubscriptionPlanUpdated {
        /// Acting user.
        performed_by: UserId,
        /// Updated plan.
        plan_id: AccountSubscriptionPlanId,
        /// Field changes.
        changes: Vec<FieldChangeSummary>,
    },
    /// A subscription plan was archived.
    AccountSubscriptionPlanArchived {
        /// Acting user.
        performed_by: UserId,
        /// Archived plan.
        plan_id: AccountSubscriptionPlanId,
    },
    /// A user joined an account.
    UserAddedToAccount {
        /// Acting user.
        performed_by: UserId,
        /// Joined account.
        account_id: AccountId,
        /// Added user.
        user_id: UserId,
        /// Created membership.
        membership_id: MembershipId,
        /// Granted mask.
        permissions: AccountUserPermissions,
        /// Stated reason.
        reason: String,
    },
    /// A user left or was removed from an account.
    UserRemovedFromAccount {
        /// Acting user.
        performed_by: UserId,
        /// Left account.
        account_id: AccountId,
        /// Removed user.
        user_id: UserId,
        /// Stated reason.
        reason: String,
    },
    /// A member's mask changed.
    UserPermissionsModified {
        /// Acting user.
        performed_by: UserId,
        /// Account of the membership.
        account_id: AccountId,
        /// Affected user.
        user_id: UserId,
        /// New mask.
        permissions: AccountUserPermissions,
        /// Stated reason.
        reason: String,
    },
    /// A user picked a new default account.
    AccountMarkedAsDefault {
        /// Acting user.
        performed_by: UserId,
        /// New default account.
        account_id: AccountId,
        /// Affected user.
        user_id: UserId,
    },
    /// An API client was issued.
    ApiClientCreated {
        /// Acting user.
        performed_by: UserId,
        /// Created client.
        api_client_id: ApiClientId,
    },
    /// An API client was revoked.
    ApiClientArchived {
        /// Acting user.
        performed_by: UserId,
        /// Archived client.
        api_client_id: ApiClientId,
    },
    /// A user registered. Self-attributed.
    UserCreated {
        /// Acting user, equal to `user_id`.
        performed_by: UserId,
        /// Created user.
        user_id: UserId,
    },
    /// A user profile changed.
    UserUpdated {
        /// Acting user.
        performed_by: UserId,
        /// Updated user.
        user_id: UserId,
        /// Field changes.
        changes: Vec<FieldChangeSummary>,
    },
    /// A user password changed.
    UserPasswordUpdated {
        /// Acting user.
        performed_by: UserId,
        /// Updated user.
        user_id: UserId,
    },
    /// A service admin changed a user's standing.
    UserReputationUpdated {
        /// Acting admin.
        performed_by: UserId,
        /// Affected user.
        user_id: UserId,
        /// New standing.
        reputation: UserReputation,
        /// Stated reason.
        reason: String,
    },
    /// A user was archived.
    UserArchived {
        /// Acting user.
        performed_by: UserId,
        /// Archived user.
        user_id: UserId,
    },
}

impl AuditEvent {
    /// Returns the stable storage tag for this event.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ItemCreated { .. } => "item_created",
            Self::ItemUpdated { .. } => "item_updated",
            Self::ItemArchived { .. } => "item_archived",
            Self::WebhookCreated { .. } => "webhook_created",
            Self::WebhookUpdated { .. } => "webhook_updated",
            Self::WebhookArchived { .. } => "webhook_archived",
            Self::AccountCreated { .. } => "account_created",
            Self::AccountUpdated { .. } => "account_updated",
            Self::AccountArchived { .. } => "account_archived",
            Self::AccountOwnershipTransferred { .. } => "account_ownership_transferred",
            Self::AccountSubscriptionPlanCreated { .. } => "account_subscription_plan_created",
            Self::AccountSubscriptionPlanUpdated { .. } => "account_subscription_plan_updated",
            Self::AccountSubscriptionPlanArchived { .. } => "account_subscription_plan_archived",
            Self::UserAddedToAccount { .. } => "user_added_to_account",
            Self::UserRemovedFromAccount { .. } => "user_removed_from_account",
            Self::UserPermissionsModified { .. } => "user_permissions_modified",
            Self::AccountMarkedAsDefault { .. } => "account_marked_as_default",
            Self::ApiClientCreated { .. } => "api_client_created",
            Self::ApiClientArchived { .. } => "api_client_archived",
            Self::UserCreated { .. } => "user_created",
            Self::UserUpdated { .. } => "user_updated",
            Self::UserPasswordUpdated { .. } => "user_password_updated",
            Self::UserReputationUpdated { .. } => "user_reputation_updated",
            Self::UserArchived { .. } => "user_archived",
        }
    }

    /// Returns the acting user.
    #[must_use]
    pub fn performed_by(&self) -> UserId {
        match self {
            Self::ItemCreated { performed_by, .. }
            | Self::ItemUpdated { performed_by, .. }
            | Self::ItemArchived { performed_by, .. }
            | Self::WebhookCreated { performed_by, .. }
            | Self::WebhookUpdated { performed_by, .. }
            | Self::WebhookArchived { performed_by, .. }
            | Self::AccountCreated { performed_by, .. }
            | Self::AccountUpdated { performed_by, .. }
            | Self::AccountArchived { performed_by, .. }
            | Self::AccountOwnershipTransferred { performed_by, .. }
            | Self::AccountSubscriptionPlanCreated { performed_by, .. }
            | Self::AccountSubscriptionPlanUpdated { performed_by, .. }
            | Self::AccountSubscriptionPlanArchived { performed_by, .. }
            | Self::UserAddedToAccount { performed_by, .. }
            | Self::UserRemovedFromAccount { performed_by, .. }
            | Self::UserPermissionsModified { performed_by, .. }
            | Self::AccountMarkedAsDefault { performed_by, .. }
            | Self::ApiClientCreated { performed_by, .. }
            | Self::ApiClientArchived { performed_by, .. }
            | Self::UserCreated { performed_by, .. }
            | Self::UserUpdated { performed_by, .. }
            | Self::UserPasswordUpdated { performed_by, .. }
            | Self::UserReputationUpdated { performed_by, .. }
            | Self::UserArchived { performed_by, .. } => *performed_by,
        }
    }

    /// Returns the JSON context stored alongside the tag.
    pub fn context(&self) -> AppResult<Value> {
        let mut tagged = serde_json::to_value(self).map_err(|error| {
            AppError::Internal(format!("failed to serialize audit event: {error}"))
        })?;

        Ok(tagged
            .get_mut("context")
            .map(Value::take)
            .unwrap_or(Value::Null))
    }

    /// Rebuilds an event from its stored tag and context.
    pub fn from_stored(event_type: &str, context: Value) -> AppResult<Self> {
        serde_json::from_value(json!({ "event_type": event_type, "context": context })).map_err(
            |error| {
                AppError::Internal(format!(
                    "stored audit event '{event_type}' does not match its schema: {error}"
                ))
            },
        )
    }
}

/// Context key an audit lookup matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditSubject {
    /// Entries mentioning an item.
    Item(ItemId),
    /// Entries mentioning a webhook.
    Webhook(WebhookId),
    /// Entries mentioning an account.
    Account(AccountId),
    /// Entries mentioning a subscription plan.
    Plan(AccountSubscriptionPlanId),
    /// Entries mentioning an API client.
    ApiClient(ApiClientId),
    /// Entries mentioning a user as subject.
    User(UserId),
    /// Entries mentioning a membership.
    Membership(MembershipId),
}

impl AuditSubject {
    /// Returns the context key.
    #[must_use]
    pub fn context_key(&self) -> &'static str {
        match self {
            Self::Item(_) => "item_id",
            Self::Webhook(_) => "webhook_id",
            Self::Account(_) => "account_id",
            Self::Plan(_) => "plan_id",
            Self::ApiClient(_) => "api_client_id",
            Self::User(_) => "user_id",
            Self::Membership(_) => "membership_id",
        }
    }

    /// Returns the id rendered the way `context->>'key'` yields it.
    #[must_use]
    pub fn context_value(&self) -> String {
        match self {
            Self::Item(id) => id.to_string(),
            Self::Webhook(id) => id.to_string(),
            Self::Account(id) => id.to_string(),
            Self::Plan(id) => id.to_string(),
            Self::ApiClient(id) => id.to_string(),
            Self::User(id) => id.to_string(),
            Self::Membership(id) => id.to_string(),
        }
    }
}

/// A persisted audit event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// Row id.
    pub id: AuditLogEntryId,
    /// Recorded event.
    pub event: AuditEvent,
    /// Insert timestamp.
    pub created_on: DateTime<Utc>,
}
