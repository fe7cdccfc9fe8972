use async_trait::async_trait;
use todo_application::{BatchSender, ItemDataManager};
use todo_core::{AccountId, AppResult, ItemId, UserId};
use todo_domain::{
    AuditEvent, AuditLogEntry, AuditSubject, FieldChangeSummary, Item, ItemCreationInput,
    ListPage, QueryFilter,
};
use uuid::Uuid;

use super::PostgresQuerier;
use super::reads::{fetch_audit_entries, fetch_count, fetch_entities, fetch_entity, fetch_exists, fetch_list};
use super::rows::ItemRow;
use crate::query_builder::{
    ITEMS, ListScope, build_archive_query, build_exists_query, build_get_all_count_query,
    build_get_query, build_id_set_query, build_insert_query, build_update_query,
};

fn database_ids(ids: &[ItemId]) -> Vec<i64> {
    ids.iter().map(|id| id.as_database()).collect()
}

#[async_trait]
impl ItemDataManager for PostgresQuerier {
    #[tracing::instrument(skip_all, fields(item_id = %item_id, account_id = %account_id))]
    async fn item_exists(&self, item_id: ItemId, account_id: AccountId) -> AppResult<bool> {
        fetch_exists(
            &self.pool,
            build_exists_query(
                &ITEMS,
                item_id.as_database(),
                Some(account_id.as_database()),
            ),
            "check item existence",
        )
        .await
    }

    #[tracing::instrument(skip_all, fields(item_id = %item_id, account_id = %account_id))]
    async fn get_item(&self, item_id: ItemId, account_id: AccountId) -> AppResult<Item> {
        fetch_entity::<ItemRow>(
            &self.pool,
            build_get_query(
                &ITEMS,
                item_id.as_database(),
                Some(account_id.as_database()),
            ),
            &format!("item '{item_id}'"),
        )
        .await
    }

    #[tracing::instrument(skip_all)]
    async fn get_all_items_count(&self) -> AppResult<u64> {
        fetch_count(&self.pool, build_get_all_count_query(&ITEMS), "count items").await
    }

    #[tracing::instrument(skip_all, fields(batch_size = batch_size))]
    async fn get_all_items(&self, results: BatchSender<Item>, batch_size: u16) -> AppResult<()> {
        self.stream_all::<ItemRow>(ITEMS, results, batch_size).await
    }

    #[tracing::instrument(
        skip_all,
        fields(
            account_id = %account_id,
            page = filter.map(QueryFilter::effective_page),
            limit = filter.map(QueryFilter::effective_limit),
        )
    )]
    async fn get_items(
        &self,
        account_id: AccountId,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<Item>> {
        fetch_list::<ItemRow>(
            &self.pool,
            &ITEMS,
            ListScope::Owner(account_id.as_database()),
            filter,
            "list items",
        )
        .await
    }

    #[tracing::instrument(
        skip_all,
        fields(
            page = filter.map(QueryFilter::effective_page),
            limit = filter.map(QueryFilter::effective_limit),
        )
    )]
    async fn get_items_for_admin(
        &self,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<Item>> {
        fetch_list::<ItemRow>(&self.pool, &ITEMS, ListScope::Admin, filter, "list items for admin")
            .await
    }

    #[tracing::instrument(skip_all, fields(account_id = %account_id, limit = limit, requested = ids.len()))]
    async fn get_items_with_ids(
        &self,
        account_id: AccountId,
        limit: u16,
        ids: &[ItemId],
    ) -> AppResult<Vec<Item>> {
        fetch_entities::<ItemRow>(
            &self.pool,
            build_id_set_query(
                &ITEMS,
                ListScope::Owner(account_id.as_database()),
                limit,
                &database_ids(ids),
            ),
            "fetch items by id",
        )
        .await
    }

    #[tracing::instrument(skip_all, fields(limit = limit, requested = ids.len()))]
    async fn get_items_with_ids_for_admin(
        &self,
        limit: u16,
        ids: &[ItemId],
    ) -> AppResult<Vec<Item>> {
        fetch_entities::<ItemRow>(
            &self.pool,
            build_id_set_query(&ITEMS, ListScope::Admin, limit, &database_ids(ids)),
            "fetch items by id for admin",
        )
        .await
    }

    #[tracing::instrument(
        skip_all,
        fields(account_id = %input.belongs_to_account, created_by = %created_by)
    )]
    async fn create_item(&self, input: &ItemCreationInput, created_by: UserId) -> AppResult<Item> {
        let external_id = Uuid::new_v4().to_string();
        let statement = build_insert_query(
            &ITEMS,
            vec![
                ("external_id", external_id.clone().into()),
                ("name", input.name.clone().into()),
                ("details", input.details.clone().into()),
                (
                    "belongs_to_account",
                    input.belongs_to_account.as_database().into(),
                ),
            ],
        );

        let (pending, inserted) = self
            .begin_write("create item")
            .await?
            .insert(statement)
            .await?;
        let (pending, item_id) = pending.check(ItemId::from_database(inserted.id)).await?;

        pending
            .record(&AuditEvent::ItemCreated {
                performed_by: created_by,
                account_id: input.belongs_to_account,
                item_id,
            })
            .await?
            .commit()
            .await?;

        Ok(Item {
            id: item_id,
            external_id,
            name: input.name.clone(),
            details: input.details.clone(),
            created_on: inserted.created_on,
            last_updated_on: None,
            archived_on: None,
            belongs_to_account: input.belongs_to_account,
        })
    }

    #[tracing::instrument(
        skip_all,
        fields(item_id = %updated.id, account_id = %updated.belongs_to_account, changed_by = %changed_by)
    )]
    async fn update_item(
        &self,
        updated: &Item,
        changed_by: UserId,
        changes: Vec<FieldChangeSummary>,
    ) -> AppResult<u64> {
        let statement = build_update_query(
            &ITEMS,
            vec![
                ("name", updated.name.clone().into()),
                ("details", updated.details.clone().into()),
            ],
            updated.id.as_database(),
            Some(updated.belongs_to_account.as_database()),
        );

        self.execute_audited(
            "update item",
            statement,
            AuditEvent::ItemUpdated {
                performed_by: changed_by,
                account_id: updated.belongs_to_account,
                item_id: updated.id,
                changes,
            },
        )
        .await
    }

    #[tracing::instrument(
        skip_all,
        fields(item_id = %item_id, account_id = %account_id, archived_by = %archived_by)
    )]
    async fn archive_item(
        &self,
        item_id: ItemId,
        account_id: AccountId,
        archived_by: UserId,
    ) -> AppResult<u64> {
        self.execute_audited(
            "archive item",
            build_archive_query(
                &ITEMS,
                item_id.as_database(),
                Some(account_id.as_database()),
            ),
            AuditEvent::ItemArchived {
                performed_by: archived_by,
                account_id,
                item_id,
            },
        )
        .await
    }

    #[tracing::instrument(skip_all, fields(item_id = %item_id))]
    async fn get_audit_log_entries_for_item(
        &self,
        item_id: ItemId,
    ) -> AppResult<Vec<AuditLogEntry>> {
        fetch_audit_entries(&self.pool, AuditSubject::Item(item_id)).await
    }
}
