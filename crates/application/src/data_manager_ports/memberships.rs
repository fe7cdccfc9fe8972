use async_trait::async_trait;
use todo_core::{AccountId, AppResult, UserId};
use todo_domain::{
    AccountUserMembership, AddUserToAccountInput, ListPage, ModifyUserPermissionsInput,
    QueryFilter, TransferAccountOwnershipInput,
};

/// Storage port for account memberships.
#[async_trait]
pub trait AccountUserMembershipDataManager: Send + Sync {
    /// Returns the account the user marked as default.
    async fn get_default_account_id_for_user(&self, user_id: UserId) -> AppResult<AccountId>;

    /// Returns whether the user holds a live membership in the account.
    async fn user_is_member_of_account(
        &self,
        user_id: UserId,
        account_id: AccountId,
    ) -> AppResult<bool>;

    /// Returns the user's live memberships.
    async fn get_memberships_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<AccountUserMembership>>;

    /// Lists the account's members.
    async fn get_account_memberships(
        &self,
        account_id: AccountId,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<AccountUserMembership>>;

    /// Adds a user to an account.
    async fn add_user_to_account(
        &self,
        input: &AddUserToAccountInput,
        added_by: UserId,
    ) -> AppResult<AccountUserMembership>;

    /// Replaces a member's mask.
    async fn modify_user_permissions(
        &self,
        user_id: UserId,
        account_id: AccountId,
        changed_by: UserId,
        input: &ModifyUserPermissionsInput,
    ) -> AppResult<u64>;

    /// Marks one membership as the user's default and clears the others.
    async fn mark_account_as_user_default(
        &self,
        user_id: UserId,
        account_id: AccountId,
        changed_by: UserId,
    ) -> AppResult<u64>;

    /// Archives a membership.
    async fn remove_user_from_account(
        &self,
        user_id: UserId,
        account_id: AccountId,
        removed_by: UserId,
        reason: &str,
    ) -> AppResult<u64>;

    /// Moves account ownership to another member, copying the owner's mask.
    async fn transfer_account_ownership(
        &self,
        account_id: AccountId,
        transferred_by: UserId,
        input: &TransferAccountOwnershipInput,
    ) -> AppResult<u64>;
}
