use async_trait::async_trait;
use todo_core::{AccountId, AppResult, ItemId, UserId};
use todo_domain::{
    AuditLogEntry, FieldChangeSummary, Item, ItemCreationInput, ListPage, QueryFilter,
};

use super::BatchSender;

/// Storage port for items.
#[async_trait]
pub trait ItemDataManager: Send + Sync {
    /// Returns whether a live item exists in the account.
    async fn item_exists(&self, item_id: ItemId, account_id: AccountId) -> AppResult<bool>;

    /// Returns a live item in the account.
    async fn get_item(&self, item_id: ItemId, account_id: AccountId) -> AppResult<Item>;

    /// Counts every live item.
    async fn get_all_items_count(&self) -> AppResult<u64>;

    /// Streams every item in batches. Returns once batches are dispatched.
    async fn get_all_items(&self, results: BatchSender<Item>, batch_size: u16) -> AppResult<()>;

    /// Lists the account's items.
    async fn get_items(
        &self,
        account_id: AccountId,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<Item>>;

    /// Lists items across all accounts.
    async fn get_items_for_admin(&self, filter: Option<&QueryFilter>)
    -> AppResult<ListPage<Item>>;

    /// Returns the account's items in the order of `ids`, at most `limit`.
    async fn get_items_with_ids(
        &self,
        account_id: AccountId,
        limit: u16,
        ids: &[ItemId],
    ) -> AppResult<Vec<Item>>;

    /// Returns items in the order of `ids` regardless of account.
    async fn get_items_with_ids_for_admin(&self, limit: u16, ids: &[ItemId])
    -> AppResult<Vec<Item>>;

    /// Creates an item and its audit entry.
    async fn create_item(&self, input: &ItemCreationInput, created_by: UserId) -> AppResult<Item>;

    /// Persists an updated item and its audit entry.
    async fn update_item(
        &self,
        updated: &Item,
        changed_by: UserId,
        changes: Vec<FieldChangeSummary>,
    ) -> AppResult<u64>;

    /// Archives an item and records the audit entry.
    async fn archive_item(
        &self,
        item_id: ItemId,
        account_id: AccountId,
        archived_by: UserId,
    ) -> AppResult<u64>;

    /// Returns audit entries mentioning the item, oldest first.
    async fn get_audit_log_entries_for_item(&self, item_id: ItemId)
    -> AppResult<Vec<AuditLogEntry>>;
}
