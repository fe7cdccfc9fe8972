use async_trait::async_trait;
use todo_application::{BatchSender, WebhookDataManager};
use todo_core::{AccountId, AppResult, UserId, WebhookId};
use todo_domain::{
    AuditEvent, AuditLogEntry, AuditSubject, FieldChangeSummary, ListPage, QueryFilter, Webhook,
    WebhookCreationInput,
};
use uuid::Uuid;

use super::PostgresQuerier;
use super::reads::{fetch_audit_entries, fetch_count, fetch_entity, fetch_list};
use super::rows::WebhookRow;
use crate::query_builder::{
    ListScope, SqlValue, WEBHOOKS, build_archive_query, build_get_all_count_query,
    build_get_query, build_insert_query, build_update_query,
};

// List columns are stored comma-joined.
fn joined(values: &[String]) -> SqlValue {
    SqlValue::Text(values.join(","))
}

#[async_trait]
impl WebhookDataManager for PostgresQuerier {
    #[tracing::instrument(skip_all, fields(webhook_id = %webhook_id, account_id = %account_id))]
    async fn get_webhook(
        &self,
        webhook_id: WebhookId,
        account_id: AccountId,
    ) -> AppResult<Webhook> {
        fetch_entity::<WebhookRow>(
            &self.pool,
            build_get_query(
                &WEBHOOKS,
                webhook_id.as_database(),
                Some(account_id.as_database()),
            ),
            &format!("webhook '{webhook_id}'"),
        )
        .await
    }

    #[tracing::instrument(skip_all)]
    async fn get_all_webhooks_count(&self) -> AppResult<u64> {
        fetch_count(
            &self.pool,
            build_get_all_count_query(&WEBHOOKS),
            "count webhooks",
        )
        .await
    }

    #[tracing::instrument(skip_all, fields(batch_size = batch_size))]
    async fn get_all_webhooks(
        &self,
        results: BatchSender<Webhook>,
        batch_size: u16,
    ) -> AppResult<()> {
        self.stream_all::<WebhookRow>(WEBHOOKS, results, batch_size)
            .await
    }

    #[tracing::instrument(
        skip_all,
        fields(
            account_id = %account_id,
            page = filter.map(QueryFilter::effective_page),
            limit = filter.map(QueryFilter::effective_limit),
        )
    )]
    async fn get_webhooks(
        &self,
        account_id: AccountId,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<Webhook>> {
        fetch_list::<WebhookRow>(
            &self.pool,
            &WEBHOOKS,
            ListScope::Owner(account_id.as_database()),
            filter,
            "list webhooks",
        )
        .await
    }

    #[tracing::instrument(skip_all)]
    async fn get_webhooks_for_admin(
        &self,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<Webhook>> {
        fetch_list::<WebhookRow>(
            &self.pool,
            &WEBHOOKS,
            ListScope::Admin,
            filter,
            "list webhooks for admin",
        )
        .await
    }

    #[tracing::instrument(
        skip_all,
        fields(account_id = %input.belongs_to_account, created_by = %created_by)
    )]
    async fn create_webhook(
        &self,
        input: &WebhookCreationInput,
        created_by: UserId,
    ) -> AppResult<Webhook> {
        let external_id = Uuid::new_v4().to_string();
        let statement = build_insert_query(
            &WEBHOOKS,
            vec![
                ("external_id", external_id.clone().into()),
                ("name", input.name.clone().into()),
                ("content_type", input.content_type.clone().into()),
                ("url", input.url.clone().into()),
                ("method", input.method.clone().into()),
                ("events", joined(&input.events)),
                ("data_types", joined(&input.data_types)),
                ("topics", joined(&input.topics)),
                (
                    "belongs_to_account",
                    input.belongs_to_account.as_database().into(),
                ),
            ],
        );

        let (pending, inserted) = self
            .begin_write("create webhook")
            .await?
            .insert(statement)
            .await?;
        let (pending, webhook_id) = pending
            .check(WebhookId::from_database(inserted.id))
            .await?;

        pending
            .record(&AuditEvent::WebhookCreated {
                performed_by: created_by,
                account_id: input.belongs_to_account,
                webhook_id,
            })
            .await?
            .commit()
            .await?;

        Ok(Webhook {
            id: webhook_id,
            external_id,
            name: input.name.clone(),
            content_type: input.content_type.clone(),
            url: input.url.clone(),
            method: input.method.clone(),
            events: input.events.clone(),
            data_types: input.data_types.clone(),
            topics: input.topics.clone(),
            created_on: inserted.created_on,
            last_updated_on: None,
            archived_on: None,
            belongs_to_account: input.belongs_to_account,
        })
    }

    #[tracing::instrument(
        skip_all,
        fields(webhook_id = %updated.id, account_id = %updated.belongs_to_account)
    )]
    async fn update_webhook(
        &self,
        updated: &Webhook,
        changed_by: UserId,
        changes: Vec<FieldChangeSummary>,
    ) -> AppResult<u64> {
        let statement = build_update_query(
            &WEBHOOKS,
            vec![
                ("name", updated.name.clone().into()),
                ("content_type", updated.content_type.clone().into()),
                ("url", updated.url.clone().into()),
                ("method", updated.method.clone().into()),
                ("events", joined(&updated.events)),
                ("data_types", joined(&updated.data_types)),
                ("topics", joined(&updated.topics)),
            ],
            updated.id.as_database(),
            Some(updated.belongs_to_account.as_database()),
        );

        self.execute_audited(
            "update webhook",
            statement,
            AuditEvent::WebhookUpdated {
                performed_by: changed_by,
                account_id: updated.belongs_to_account,
                webhook_id: updated.id,
                changes,
            },
        )
        .await
    }

    #[tracing::instrument(skip_all, fields(webhook_id = %webhook_id, account_id = %account_id))]
    async fn archive_webhook(
        &self,
        webhook_id: WebhookId,
        account_id: AccountId,
        archived_by: UserId,
    ) -> AppResult<u64> {
        self.execute_audited(
            "archive webhook",
            build_archive_query(
                &WEBHOOKS,
                webhook_id.as_database(),
                Some(account_id.as_database()),
            ),
            AuditEvent::WebhookArchived {
                performed_by: archived_by,
                account_id,
                webhook_id,
            },
        )
        .await
    }

    #[tracing::instrument(skip_all, fields(webhook_id = %webhook_id))]
    async fn get_audit_log_entries_for_webhook(
        &self,
        webhook_id: WebhookId,
    ) -> AppResult<Vec<AuditLogEntry>> {
        fetch_audit_entries(&self.pool, AuditSubject::Webhook(webhook_id)).await
    }
}
