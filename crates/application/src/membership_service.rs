//! Account membership management.

use std::sync::Arc;

use todo_core::{AccountId, AppError, AppResult, UserId};
use todo_domain::{
    AccountUserMembership, AccountUserPermission, AddUserToAccountInput, ListPage,
    ModifyUserPermissionsInput, QueryFilter, TransferAccountOwnershipInput,
};

use crate::Actor;
use crate::data_manager_ports::{AccountUserMembershipDataManager, UserDataManager};

/// Application service for members of the actor's account.
#[derive(Clone)]
pub struct MembershipService {
    memberships: Arc<dyn AccountUserMembershipDataManager>,
    users: Arc<dyn UserDataManager>,
}

impl MembershipService {
    /// Creates a new membership service.
    #[must_use]
    pub fn new(
        memberships: Arc<dyn AccountUserMembershipDataManager>,
        users: Arc<dyn UserDataManager>,
    ) -> Self {
        Self { memberships, users }
    }

    /// Lists members of the active account.
    pub async fn list_members(
        &self,
        actor: &Actor,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<AccountUserMembership>> {
        self.memberships
            .get_account_memberships(actor.account_id(), filter)
            .await
    }

    /// Adds a user to the active account.
    pub async fn add_member(
        &self,
        actor: &Actor,
        mut input: AddUserToAccountInput,
    ) -> AppResult<AccountUserMembership> {
        actor.require_account_permission(AccountUserPermission::AddMembers)?;
        actor.require_can_delegate(input.account_permissions)?;
        input.account_id = actor.account_id();
        require_reason(&input.reason)?;

        if !self.users.user_exists(input.user_id).await? {
            return Err(AppError::NotFound(format!(
                "user '{}' was not found",
                input.user_id
            )));
        }

        if self
            .memberships
            .user_is_member_of_account(input.user_id, input.account_id)
            .await?
        {
            return Err(AppError::Conflict(format!(
                "user '{}' is already a member of account '{}'",
                input.user_id, input.account_id
            )));
        }

        self.memberships
            .add_user_to_account(&input, actor.user_id())
            .await
    }

    /// Replaces a member's permissions in the active account.
    pub async fn modify_member_permissions(
        &self,
        actor: &Actor,
        user_id: UserId,
        input: ModifyUserPermissionsInput,
    ) -> AppResult<()> {
        actor.require_account_permission(AccountUserPermission::ModifyMemberPermissions)?;
        actor.require_can_delegate(input.new_permissions)?;
        require_reason(&input.reason)?;

        let affected = self
            .memberships
            .modify_user_permissions(user_id, actor.account_id(), actor.user_id(), &input)
            .await?;
        require_affected(affected, user_id, actor.account_id())
    }

    /// Removes a member. Members may always remove themselves.
    pub async fn remove_member(
        &self,
        actor: &Actor,
        user_id: UserId,
        reason: &str,
    ) -> AppResult<()> {
        if user_id != actor.user_id() {
            actor.require_account_permission(AccountUserPermission::RemoveMembers)?;
        }
        require_reason(reason)?;

        let affected = self
            .memberships
            .remove_user_from_account(user_id, actor.account_id(), actor.user_id(), reason)
            .await?;
        require_affected(affected, user_id, actor.account_id())
    }

    /// Marks `account_id` as the actor's default account.
    pub async fn mark_default_account(&self, actor: &Actor, account_id: AccountId) -> AppResult<()> {
        if !self
            .memberships
            .user_is_member_of_account(actor.user_id(), account_id)
            .await?
        {
            return Err(AppError::Forbidden(format!(
                "user '{}' is not a member of account '{account_id}'",
                actor.user_id()
            )));
        }

        let affected = self
            .memberships
            .mark_account_as_user_default(actor.user_id(), account_id, actor.user_id())
            .await?;
        require_affected(affected, actor.user_id(), account_id)
    }

    /// Hands the active account to another member.
    pub async fn transfer_ownership(
        &self,
        actor: &Actor,
        input: TransferAccountOwnershipInput,
    ) -> AppResult<()> {
        actor.require_account_permission(AccountUserPermission::TransferAccountOwnership)?;
        input.validate()?;

        if !self
            .memberships
            .user_is_member_of_account(input.new_owner, actor.account_id())
            .await?
        {
            return Err(AppError::Validation(format!(
                "new owner '{}' must already be a member of account '{}'",
                input.new_owner,
                actor.account_id()
            )));
        }

        let affected = self
            .memberships
            .transfer_account_ownership(actor.account_id(), actor.user_id(), &input)
            .await?;
        if affected == 0 {
            return Err(AppError::NotFound(format!(
                "account '{}' is not owned by user '{}'",
                actor.account_id(),
                input.current_owner
            )));
        }

        Ok(())
    }
}

fn require_reason(reason: &str) -> AppResult<()> {
    if reason.trim().is_empty() {
        return Err(AppError::Validation(
            "a reason is required for membership changes".to_owned(),
        ));
    }

    Ok(())
}

fn require_affected(affected: u64, user_id: UserId, account_id: AccountId) -> AppResult<()> {
    if affected == 0 {
        return Err(AppError::NotFound(format!(
            "user '{user_id}' has no membership in account '{account_id}'"
        )));
    }

    Ok(())
}
