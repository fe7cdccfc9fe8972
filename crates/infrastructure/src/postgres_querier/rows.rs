use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;
use sqlx::postgres::PgRow;
use todo_core::{
    AccountId, AccountSubscriptionPlanId, ApiClientId, AppError, AppResult, AuditLogEntryId,
    ItemId, MembershipId, UserId, WebhookId,
};
use todo_domain::{
    Account, AccountSubscriptionPlan, AccountUserMembership, AccountUserPermissions, ApiClient,
    AuditEvent, AuditLogEntry, Item, ServiceAdminPermissions, User, UserReputation, Webhook,
};

/// A table row that decodes into a domain entity.
pub(super) trait EntityRow: for<'r> FromRow<'r, PgRow> + Send + Unpin + 'static {
    type Entity: Send + 'static;

    fn into_entity(self) -> AppResult<Self::Entity>;
}

fn stored_u32(column: &str, value: i64) -> AppResult<u32> {
    u32::try_from(value).map_err(|_| {
        AppError::Internal(format!("stored {column} '{value}' is out of range"))
    })
}

/// Splits a comma-joined list column.
pub(super) fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect()
}

#[derive(Debug, FromRow)]
pub(super) struct ItemRow {
    id: i64,
    external_id: String,
    name: String,
    details: String,
    created_on: DateTime<Utc>,
    last_updated_on: Option<DateTime<Utc>>,
    archived_on: Option<DateTime<Utc>>,
    belongs_to_account: i64,
}

impl EntityRow for ItemRow {
    type Entity = Item;

    fn into_entity(self) -> AppResult<Item> {
        Ok(Item {
            id: ItemId::from_database(self.id)?,
            external_id: self.external_id,
            name: self.name,
            details: self.details,
            created_on: self.created_on,
            last_updated_on: self.last_updated_on,
            archived_on: self.archived_on,
            belongs_to_account: AccountId::from_database(self.belongs_to_account)?,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct WebhookRow {
    id: i64,
    external_id: String,
    name: String,
    content_type: String,
    url: String,
    method: String,
    events: String,
    data_types: String,
    topics: String,
    created_on: DateTime<Utc>,
    last_updated_on: Option<DateTime<Utc>>,
    archived_on: Option<DateTime<Utc>>,
    belongs_to_account: i64,
}

impl EntityRow for WebhookRow {
    type Entity = Webhook;

    fn into_entity(self) -> AppResult<Webhook> {
        Ok(Webhook {
            id: WebhookId::from_database(self.id)?,
            external_id: self.external_id,
            name: self.name,
            content_type: self.content_type,
            url: self.url,
            method: self.method,
            events: split_list(&self.events),
            data_types: split_list(&self.data_types),
            topics: split_list(&self.topics),
            created_on: self.created_on,
            last_updated_on: self.last_updated_on,
            archived_on: self.archived_on,
            belongs_to_account: AccountId::from_database(self.belongs_to_account)?,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct AccountRow {
    id: i64,
    external_id: String,
    name: String,
    billing_status: String,
    contact_email: String,
    contact_phone: String,
    payment_processor_customer_id: String,
    subscription_plan_id: Option<i64>,
    default_user_permissions: i64,
    created_on: DateTime<Utc>,
    last_updated_on: Option<DateTime<Utc>>,
    archived_on: Option<DateTime<Utc>>,
    belongs_to_user: i64,
}

impl EntityRow for AccountRow {
    type Entity = Account;

    fn into_entity(self) -> AppResult<Account> {
        Ok(Account {
            id: AccountId::from_database(self.id)?,
            external_id: self.external_id,
            name: self.name,
            billing_status: self.billing_status,
            contact_email: self.contact_email,
            contact_phone: self.contact_phone,
            payment_processor_customer_id: self.payment_processor_customer_id,
            subscription_plan_id: self
                .subscription_plan_id
                .map(AccountSubscriptionPlanId::from_database)
                .transpose()?,
            default_user_permissions: AccountUserPermissions::from_database(
                self.default_user_permissions,
            ),
            created_on: self.created_on,
            last_updated_on: self.last_updated_on,
            archived_on: self.archived_on,
            belongs_to_user: UserId::from_database(self.belongs_to_user)?,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct PlanRow {
    id: i64,
    external_id: String,
    name: String,
    description: String,
    price: i64,
    period_days: i64,
    created_on: DateTime<Utc>,
    last_updated_on: Option<DateTime<Utc>>,
    archived_on: Option<DateTime<Utc>>,
}

impl EntityRow for PlanRow {
    type Entity = AccountSubscriptionPlan;

    fn into_entity(self) -> AppResult<AccountSubscriptionPlan> {
        Ok(AccountSubscriptionPlan {
            id: AccountSubscriptionPlanId::from_database(self.id)?,
            external_id: self.external_id,
            name: self.name,
            description: self.description,
            price: stored_u32("price", self.price)?,
            period_days: stored_u32("period_days", self.period_days)?,
            created_on: self.created_on,
            last_updated_on: self.last_updated_on,
            archived_on: self.archived_on,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct MembershipRow {
    id: i64,
    belongs_to_user: i64,
    belongs_to_account: i64,
    user_account_permissions: i64,
    default_account: bool,
    created_on: DateTime<Utc>,
    last_updated_on: Option<DateTime<Utc>>,
    archived_on: Option<DateTime<Utc>>,
}

impl EntityRow for MembershipRow {
    type Entity = AccountUserMembership;

    fn into_entity(self) -> AppResult<AccountUserMembership> {
        Ok(AccountUserMembership {
            id: MembershipId::from_database(self.id)?,
            belongs_to_user: UserId::from_database(self.belongs_to_user)?,
            belongs_to_account: AccountId::from_database(self.belongs_to_account)?,
            account_permissions: AccountUserPermissions::from_database(
                self.user_account_permissions,
            ),
            default_account: self.default_account,
            created_on: self.created_on,
            last_updated_on: self.last_updated_on,
            archived_on: self.archived_on,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct ApiClientRow {
    id: i64,
    external_id: String,
    name: String,
    client_id: String,
    secret_key: Vec<u8>,
    created_on: DateTime<Utc>,
    last_updated_on: Option<DateTime<Utc>>,
    archived_on: Option<DateTime<Utc>>,
    belongs_to_user: i64,
}

impl EntityRow for ApiClientRow {
    type Entity = ApiClient;

    fn into_entity(self) -> AppResult<ApiClient> {
        Ok(ApiClient {
            id: ApiClientId::from_database(self.id)?,
            external_id: self.external_id,
            name: self.name,
            client_id: self.client_id,
            secret_key: self.secret_key,
            created_on: self.created_on,
            last_updated_on: self.last_updated_on,
            archived_on: self.archived_on,
            belongs_to_user: UserId::from_database(self.belongs_to_user)?,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct UserRow {
    id: i64,
    external_id: String,
    username: String,
    avatar_src: Option<String>,
    hashed_password: String,
    requires_password_change: bool,
    password_last_changed_on: Option<DateTime<Utc>>,
    two_factor_secret: String,
    two_factor_secret_verified_on: Option<DateTime<Utc>>,
    service_admin_permissions: i64,
    reputation: String,
    reputation_explanation: String,
    created_on: DateTime<Utc>,
    last_updated_on: Option<DateTime<Utc>>,
    archived_on: Option<DateTime<Utc>>,
}

impl EntityRow for UserRow {
    type Entity = User;

    fn into_entity(self) -> AppResult<User> {
        let reputation = self.reputation.parse::<UserReputation>().map_err(|error| {
            AppError::Internal(format!("stored reputation is invalid: {error}"))
        })?;

        Ok(User {
            id: UserId::from_database(self.id)?,
            external_id: self.external_id,
            username: self.username,
            hashed_password: self.hashed_password,
            requires_password_change: self.requires_password_change,
            password_last_changed_on: self.password_last_changed_on,
            two_factor_secret: self.two_factor_secret,
            two_factor_secret_verified_on: self.two_factor_secret_verified_on,
            service_admin_permissions: ServiceAdminPermissions::from_database(
                self.service_admin_permissions,
            ),
            reputation,
            reputation_explanation: self.reputation_explanation,
            avatar_src: self.avatar_src,
            created_on: self.created_on,
            last_updated_on: self.last_updated_on,
            archived_on: self.archived_on,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct AuditLogRow {
    id: i64,
    event_type: String,
    context: Value,
    created_on: DateTime<Utc>,
}

impl EntityRow for AuditLogRow {
    type Entity = AuditLogEntry;

    fn into_entity(self) -> AppResult<AuditLogEntry> {
        Ok(AuditLogEntry {
            id: AuditLogEntryId::from_database(self.id)?,
            event: AuditEvent::from_stored(&self.event_type, self.context)?,
            created_on: self.created_on,
        })
    }
}
