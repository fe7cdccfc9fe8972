//! Accounts, subscription plans and account memberships.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use todo_core::{AccountId, AccountSubscriptionPlanId, AppError, AppResult, MembershipId, UserId};

use crate::changes::{ChangeTracker, FieldChangeSummary};
use crate::permissions::AccountUserPermissions;
use crate::validate_required;

/// Billing status assigned to newly created accounts.
pub const UNPAID_BILLING_STATUS: &str = "unpaid";

/// Tenant that owns items and webhooks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Row id.
    pub id: AccountId,
    /// Public identifier assigned at insert.
    pub external_id: String,
    /// Display name.
    pub name: String,
    /// Billing state reported by the payment processor.
    pub billing_status: String,
    /// Contact email, empty when unknown.
    pub contact_email: String,
    /// Contact phone, empty when unknown.
    pub contact_phone: String,
    /// Customer id at the payment processor.
    pub payment_processor_customer_id: String,
    /// Subscribed plan.
    pub subscription_plan_id: Option<AccountSubscriptionPlanId>,
    /// Mask granted to the owner membership on creation.
    pub default_user_permissions: AccountUserPermissions,
    /// Creation timestamp.
    pub created_on: DateTime<Utc>,
    /// Last update timestamp.
    pub last_updated_on: Option<DateTime<Utc>>,
    /// Soft-archive timestamp.
    pub archived_on: Option<DateTime<Utc>>,
    /// Owning user.
    pub belongs_to_user: UserId,
}

impl Account {
    /// Applies an update input and returns the fields that changed.
    pub fn update(&mut self, input: AccountUpdateInput) -> Vec<FieldChangeSummary> {
        let mut tracker = ChangeTracker::new();
        tracker.apply("name", &mut self.name, input.name);
        tracker.apply("contact_email", &mut self.contact_email, input.contact_email);
        tracker.apply("contact_phone", &mut self.contact_phone, input.contact_phone);
        tracker.apply(
            "subscription_plan_id",
            &mut self.subscription_plan_id,
            input.subscription_plan_id.map(Some),
        );
        tracker.finish()
    }
}

/// Input payload for account creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCreationInput {
    /// Display name.
    pub name: String,
    /// Contact email, empty when unknown.
    pub contact_email: String,
    /// Contact phone, empty when unknown.
    pub contact_phone: String,
    /// Subscribed plan.
    pub subscription_plan_id: Option<AccountSubscriptionPlanId>,
    /// Mask granted to the owner membership.
    pub default_user_permissions: AccountUserPermissions,
    /// Owning user.
    pub belongs_to_user: UserId,
}

impl AccountCreationInput {
    /// Validates the payload before any storage access.
    pub fn validate(&self) -> AppResult<()> {
        validate_required("account name", &self.name)?;
        validate_contact_email(&self.contact_email)
    }
}

/// Partial update for an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUpdateInput {
    /// New display name.
    pub name: Option<String>,
    /// New contact email.
    pub contact_email: Option<String>,
    /// New contact phone.
    pub contact_phone: Option<String>,
    /// New subscription plan.
    pub subscription_plan_id: Option<AccountSubscriptionPlanId>,
}

impl AccountUpdateInput {
    /// Validates the payload before any storage access.
    pub fn validate(&self) -> AppResult<()> {
        if let Some(name) = &self.name {
            validate_required("account name", name)?;
        }
        if let Some(email) = &self.contact_email {
            validate_contact_email(email)?;
        }

        Ok(())
    }
}

/// Structural email check: one `@`, non-empty local part, dotted domain.
/// An empty string means "no contact email".
fn validate_contact_email(value: &str) -> AppResult<()> {
    if value.is_empty() {
        return Ok(());
    }

    let Some((local, domain)) = value.split_once('@') else {
        return Err(AppError::Validation(
            "contact email must contain exactly one '@'".to_owned(),
        ));
    };

    if local.is_empty() || domain.contains('@') {
        return Err(AppError::Validation(
            "contact email must contain exactly one '@'".to_owned(),
        ));
    }

    if !domain.contains('.') {
        return Err(AppError::Validation(
            "contact email domain must contain at least one '.'".to_owned(),
        ));
    }

    if value.len() > 254 {
        return Err(AppError::Validation(
            "contact email must not exceed 254 characters".to_owned(),
        ));
    }

    Ok(())
}

/// Priced plan an account may subscribe to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSubscriptionPlan {
    /// Row id.
    pub id: AccountSubscriptionPlanId,
    /// Public identifier assigned at insert.
    pub external_id: String,
    /// Display name.
    pub name: String,
    /// Marketing description.
    pub description: String,
    /// Price per period in cents.
    pub price: u32,
    /// Billing period in days.
    pub period_days: u32,
    /// Creation timestamp.
    pub created_on: DateTime<Utc>,
    /// Last update timestamp.
    pub last_updated_on: Option<DateTime<Utc>>,
    /// Soft-archive timestamp.
    pub archived_on: Option<DateTime<Utc>>,
}

impl AccountSubscriptionPlan {
    /// Applies an update input and returns the fields that changed.
    pub fn update(&mut self, input: AccountSubscriptionPlanUpdateInput) -> Vec<FieldChangeSummary> {
        let mut tracker = ChangeTracker::new();
        tracker.apply("name", &mut self.name, input.name);
        tracker.apply("description", &mut self.description, input.description);
        tracker.apply("price", &mut self.price, input.price);
        tracker.apply("period_days", &mut self.period_days, input.period_days);
        tracker.finish()
    }
}

/// Input payload for plan creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSubscriptionPlanCreationInput {
    /// Display name.
    pub name: String,
    /// Marketing description.
    pub description: String,
    /// Price per period in cents.
    pub price: u32,
    /// Billing period in days.
    pub period_days: u32,
}

impl AccountSubscriptionPlanCreationInput {
    /// Validates the payload before any storage access.
    pub fn validate(&self) -> AppResult<()> {
        validate_required("plan name", &self.name)?;
        validate_period(self.period_days)
    }
}

/// Partial update for a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSubscriptionPlanUpdateInput {
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New price in cents.
    pub price: Option<u32>,
    /// New period in days.
    pub period_days: Option<u32>,
}

impl AccountSubscriptionPlanUpdateInput {
    /// Validates the payload before any storage access.
    pub fn validate(&self) -> AppResult<()> {
        if let Some(name) = &self.name {
            validate_required("plan name", name)?;
        }
        if let Some(period_days) = self.period_days {
            validate_period(period_days)?;
        }

        Ok(())
    }
}

fn validate_period(period_days: u32) -> AppResult<()> {
    if period_days == 0 {
        return Err(AppError::Validation(
            "plan period must be at least one day".to_owned(),
        ));
    }

    Ok(())
}

/// Link between a user and an account with the user's per-account mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUserMembership {
    /// Row id.
    pub id: MembershipId,
    /// Member user.
    pub belongs_to_user: UserId,
    /// Account joined.
    pub belongs_to_account: AccountId,
    /// Capabilities inside the account.
    pub account_permissions: AccountUserPermissions,
    /// True for the account selected when the user signs in.
    pub default_account: bool,
    /// Creation timestamp.
    pub created_on: DateTime<Utc>,
    /// Last update timestamp.
    pub last_updated_on: Option<DateTime<Utc>>,
    /// Soft-archive timestamp.
    pub archived_on: Option<DateTime<Utc>>,
}

/// Input payload for adding a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddUserToAccountInput {
    /// User to add.
    pub user_id: UserId,
    /// Account joined.
    pub account_id: AccountId,
    /// Capabilities granted.
    pub account_permissions: AccountUserPermissions,
    /// Audit reason.
    pub reason: String,
}

/// Input payload for changing a member's mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyUserPermissionsInput {
    /// New mask.
    pub new_permissions: AccountUserPermissions,
    /// Audit reason.
    pub reason: String,
}

/// Input payload for handing an account to another user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferAccountOwnershipInput {
    /// Current owner.
    pub current_owner: UserId,
    /// New owner.
    pub new_owner: UserId,
    /// Audit reason.
    pub reason: String,
}

impl TransferAccountOwnershipInput {
    /// Validates the payload before any storage access.
    pub fn validate(&self) -> AppResult<()> {
        if self.current_owner == self.new_owner {
            return Err(AppError::Validation(
                "new owner must differ from the current owner".to_owned(),
            ));
        }

        validate_required("transfer reason", &self.reason)
    }
}
