//! Permission-gated webhook operations.

use std::sync::Arc;

use todo_core::{AppError, AppResult, WebhookId};
use todo_domain::{
    AccountUserPermission, AuditLogEntry, ListPage, QueryFilter, Webhook, WebhookCreationInput,
    WebhookUpdateInput,
};

use crate::Actor;
use crate::data_manager_ports::WebhookDataManager;

/// Application service for webhooks in the actor's account.
#[derive(Clone)]
pub struct WebhookService {
    webhooks: Arc<dyn WebhookDataManager>,
}

impl WebhookService {
    /// Creates a new webhook service.
    #[must_use]
    pub fn new(webhooks: Arc<dyn WebhookDataManager>) -> Self {
        Self { webhooks }
    }

    /// Returns one webhook.
    pub async fn get_webhook(&self, actor: &Actor, webhook_id: WebhookId) -> AppResult<Webhook> {
        self.webhooks
            .get_webhook(webhook_id, actor.account_id())
            .await
    }

    /// Lists webhooks in the actor's account.
    pub async fn list_webhooks(
        &self,
        actor: &Actor,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<Webhook>> {
        self.webhooks.get_webhooks(actor.account_id(), filter).await
    }

    /// Registers a webhook in the actor's account.
    pub async fn create_webhook(
        &self,
        actor: &Actor,
        mut input: WebhookCreationInput,
    ) -> AppResult<Webhook> {
        actor.require_account_permission(AccountUserPermission::ManageWebhooks)?;
        input.belongs_to_account = actor.account_id();
        input.validate()?;

        self.webhooks.create_webhook(&input, actor.user_id()).await
    }

    /// Applies a partial update.
    pub async fn update_webhook(
        &self,
        actor: &Actor,
        webhook_id: WebhookId,
        input: WebhookUpdateInput,
    ) -> AppResult<Webhook> {
        actor.require_account_permission(AccountUserPermission::ManageWebhooks)?;
        input.validate()?;

        let mut webhook = self
            .webhooks
            .get_webhook(webhook_id, actor.account_id())
            .await?;
        let changes = webhook.update(input);
        if changes.is_empty() {
            return Ok(webhook);
        }

        let affected = self
            .webhooks
            .update_webhook(&webhook, actor.user_id(), changes)
            .await?;
        if affected == 0 {
            return Err(AppError::NotFound(format!(
                "webhook '{webhook_id}' was not found"
            )));
        }

        Ok(webhook)
    }

    /// Archives a webhook.
    pub async fn archive_webhook(&self, actor: &Actor, webhook_id: WebhookId) -> AppResult<()> {
        actor.require_account_permission(AccountUserPermission::ManageWebhooks)?;

        let affected = self
            .webhooks
            .archive_webhook(webhook_id, actor.account_id(), actor.user_id())
            .await?;
        if affected == 0 {
            return Err(AppError::NotFound(format!(
                "webhook '{webhook_id}' was not found"
            )));
        }

        Ok(())
    }

    /// Returns the audit trail of a webhook in the actor's account.
    pub async fn webhook_audit_log(
        &self,
        actor: &Actor,
        webhook_id: WebhookId,
    ) -> AppResult<Vec<AuditLogEntry>> {
        actor.require_account_permission(AccountUserPermission::ReadAuditLog)?;
        self.webhooks
            .get_webhook(webhook_id, actor.account_id())
            .await?;

        self.webhooks
            .get_audit_log_entries_for_webhook(webhook_id)
            .await
    }
}
