use async_trait::async_trait;
use todo_core::{AccountId, AppResult, UserId};
use todo_domain::{
    Account, AccountCreationInput, AuditLogEntry, FieldChangeSummary, ListPage, QueryFilter,
};

use super::BatchSender;

/// Storage port for accounts.
#[async_trait]
pub trait AccountDataManager: Send + Sync {
    /// Returns a live account owned by the user.
    async fn get_account(&self, account_id: AccountId, user_id: UserId) -> AppResult<Account>;

    /// Counts every live account.
    async fn get_all_accounts_count(&self) -> AppResult<u64>;

    /// Streams every account in batches.
    async fn get_all_accounts(
        &self,
        results: BatchSender<Account>,
        batch_size: u16,
    ) -> AppResult<()>;

    /// Lists accounts owned by the user.
    async fn get_accounts(
        &self,
        user_id: UserId,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<Account>>;

    /// Lists every account.
    async fn get_accounts_for_admin(
        &self,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<Account>>;

    /// Creates an account plus the owner's membership, auditing both.
    async fn create_account(
        &self,
        input: &AccountCreationInput,
        created_by: UserId,
    ) -> AppResult<Account>;

    /// Persists an updated account and its audit entry.
    async fn update_account(
        &self,
        updated: &Account,
        changed_by: UserId,
        changes: Vec<FieldChangeSummary>,
    ) -> AppResult<u64>;

    /// Archives an account owned by `user_id`.
    async fn archive_account(
        &self,
        account_id: AccountId,
        user_id: UserId,
        archived_by: UserId,
    ) -> AppResult<u64>;

    /// Returns audit entries mentioning the account.
    async fn get_audit_log_entries_for_account(
        &self,
        account_id: AccountId,
    ) -> AppResult<Vec<AuditLogEntry>>;
}
