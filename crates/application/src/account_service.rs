//! Account lifecycle operations.

use std::sync::Arc;

use todo_core::{AccountId, AppError, AppResult, UserId};
use todo_domain::{
    Account, AccountCreationInput, AccountUpdateInput, AccountUserPermission, AuditLogEntry,
    ListPage, QueryFilter,
};

use crate::Actor;
use crate::data_manager_ports::AccountDataManager;

/// Application service for accounts owned by the acting user.
#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountDataManager>,
}

impl AccountService {
    /// Creates a new account service.
    #[must_use]
    pub fn new(accounts: Arc<dyn AccountDataManager>) -> Self {
        Self { accounts }
    }

    /// Creates an account owned by `owner`. Any user in good standing may
    /// open an account, so no actor is required.
    pub async fn create_account(
        &self,
        owner: UserId,
        mut input: AccountCreationInput,
    ) -> AppResult<Account> {
        input.belongs_to_user = owner;
        input.validate()?;

        self.accounts.create_account(&input, owner).await
    }

    /// Returns an account owned by the actor.
    pub async fn get_account(&self, actor: &Actor, account_id: AccountId) -> AppResult<Account> {
        self.accounts.get_account(account_id, actor.user_id()).await
    }

    /// Lists accounts owned by the actor.
    pub async fn list_accounts(
        &self,
        actor: &Actor,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<Account>> {
        self.accounts.get_accounts(actor.user_id(), filter).await
    }

    /// Updates the active account.
    pub async fn update_account(
        &self,
        actor: &Actor,
        input: AccountUpdateInput,
    ) -> AppResult<Account> {
        actor.require_account_permission(AccountUserPermission::UpdateAccount)?;
        input.validate()?;

        let mut account = self
            .accounts
            .get_account(actor.account_id(), actor.user_id())
            .await?;
        let changes = account.update(input);
        if changes.is_empty() {
            return Ok(account);
        }

        let affected = self
            .accounts
            .update_account(&account, actor.user_id(), changes)
            .await?;
        if affected == 0 {
            return Err(AppError::NotFound(format!(
                "account '{}' was not found",
                actor.account_id()
            )));
        }

        Ok(account)
    }

    /// Archives the active account.
    pub async fn archive_account(&self, actor: &Actor) -> AppResult<()> {
        actor.require_account_permission(AccountUserPermission::ArchiveAccount)?;

        let affected = self
            .accounts
            .archive_account(actor.account_id(), actor.user_id(), actor.user_id())
            .await?;
        if affected == 0 {
            return Err(AppError::NotFound(format!(
                "account '{}' was not found",
                actor.account_id()
            )));
        }

        Ok(())
    }

    /// Returns the audit trail of the active account.
    pub async fn account_audit_log(&self, actor: &Actor) -> AppResult<Vec<AuditLogEntry>> {
        actor.require_account_permission(AccountUserPermission::ReadAuditLog)?;
        self.accounts
            .get_audit_log_entries_for_account(actor.account_id())
            .await
    }
}
