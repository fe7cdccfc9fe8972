//! Permission-gated item operations.

use std::sync::Arc;

use todo_core::{AppError, AppResult, ItemId};
use todo_domain::{
    AccountUserPermission, AuditLogEntry, Item, ItemCreationInput, ItemUpdateInput, ListPage,
    QueryFilter,
};

use crate::Actor;
use crate::data_manager_ports::ItemDataManager;

/// Application service for items in the actor's account.
#[derive(Clone)]
pub struct ItemService {
    items: Arc<dyn ItemDataManager>,
}

impl ItemService {
    /// Creates a new item service.
    #[must_use]
    pub fn new(items: Arc<dyn ItemDataManager>) -> Self {
        Self { items }
    }

    /// Returns one item from the actor's account.
    pub async fn get_item(&self, actor: &Actor, item_id: ItemId) -> AppResult<Item> {
        self.items.get_item(item_id, actor.account_id()).await
    }

    /// Lists items in the actor's account.
    pub async fn list_items(
        &self,
        actor: &Actor,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<Item>> {
        self.items.get_items(actor.account_id(), filter).await
    }

    /// Returns items in ranked order, typically from a search index.
    pub async fn items_with_ids(
        &self,
        actor: &Actor,
        limit: u16,
        ids: &[ItemId],
    ) -> AppResult<Vec<Item>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        self.items
            .get_items_with_ids(actor.account_id(), limit, ids)
            .await
    }

    /// Creates an item in the actor's account.
    pub async fn create_item(&self, actor: &Actor, mut input: ItemCreationInput) -> AppResult<Item> {
        actor.require_account_permission(AccountUserPermission::CreateItems)?;
        input.belongs_to_account = actor.account_id();
        input.validate()?;

        self.items.create_item(&input, actor.user_id()).await
    }

    /// Applies a partial update. Unchanged input performs no write.
    pub async fn update_item(
        &self,
        actor: &Actor,
        item_id: ItemId,
        input: ItemUpdateInput,
    ) -> AppResult<Item> {
        actor.require_account_permission(AccountUserPermission::UpdateItems)?;
        input.validate()?;

        let mut item = self.items.get_item(item_id, actor.account_id()).await?;
        let changes = item.update(input);
        if changes.is_empty() {
            return Ok(item);
        }

        let affected = self
            .items
            .update_item(&item, actor.user_id(), changes)
            .await?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("item '{item_id}' was not found")));
        }

        Ok(item)
    }

    /// Archives an item in the actor's account.
    pub async fn archive_item(&self, actor: &Actor, item_id: ItemId) -> AppResult<()> {
        actor.require_account_permission(AccountUserPermission::ArchiveItems)?;

        let affected = self
            .items
            .archive_item(item_id, actor.account_id(), actor.user_id())
            .await?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("item '{item_id}' was not found")));
        }

        Ok(())
    }

    /// Returns the audit trail of an item in the actor's account.
    pub async fn item_audit_log(
        &self,
        actor: &Actor,
        item_id: ItemId,
    ) -> AppResult<Vec<AuditLogEntry>> {
        actor.require_account_permission(AccountUserPermission::ReadAuditLog)?;

        if !self.items.item_exists(item_id, actor.account_id()).await? {
            return Err(AppError::NotFound(format!("item '{item_id}' was not found")));
        }

        self.items.get_audit_log_entries_for_item(item_id).await
    }
}
