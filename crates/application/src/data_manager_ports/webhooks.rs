use async_trait::async_trait;
use todo_core::{AccountId, AppResult, UserId, WebhookId};
use todo_domain::{
    AuditLogEntry, FieldChangeSummary, ListPage, QueryFilter, Webhook, WebhookCreationInput,
};

use super::BatchSender;

/// Storage port for webhooks.
#[async_trait]
pub trait WebhookDataManager: Send + Sync {
    /// Returns a live webhook in the account.
    async fn get_webhook(&self, webhook_id: WebhookId, account_id: AccountId)
    -> AppResult<Webhook>;

    /// Counts every live webhook.
    async fn get_all_webhooks_count(&self) -> AppResult<u64>;

    /// Streams every webhook in batches.
    async fn get_all_webhooks(
        &self,
        results: BatchSender<Webhook>,
        batch_size: u16,
    ) -> AppResult<()>;

    /// Lists the account's webhooks.
    async fn get_webhooks(
        &self,
        account_id: AccountId,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<Webhook>>;

    /// Lists webhooks across all accounts.
    async fn get_webhooks_for_admin(
        &self,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<Webhook>>;

    /// Creates a webhook and its audit entry.
    async fn create_webhook(
        &self,
        input: &WebhookCreationInput,
        created_by: UserId,
    ) -> AppResult<Webhook>;

    /// Persists an updated webhook and its audit entry.
    async fn update_webhook(
        &self,
        updated: &Webhook,
        changed_by: UserId,
        changes: Vec<FieldChangeSummary>,
    ) -> AppResult<u64>;

    /// Archives a webhook and records the audit entry.
    async fn archive_webhook(
        &self,
        webhook_id: WebhookId,
        account_id: AccountId,
        archived_by: UserId,
    ) -> AppResult<u64>;

    /// Returns audit entries mentioning the webhook.
    async fn get_audit_log_entries_for_webhook(
        &self,
        webhook_id: WebhookId,
    ) -> AppResult<Vec<AuditLogEntry>>;
}
