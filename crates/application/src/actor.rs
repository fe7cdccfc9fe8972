//! Resolved caller identity and capability checks.

use std::sync::Arc;

use todo_core::{AccountId, AppError, AppResult, UserId};
use todo_domain::{
    AccountUserPermission, AccountUserPermissions, ServiceAdminPermission,
    ServiceAdminPermissions,
};

use crate::data_manager_ports::{AccountUserMembershipDataManager, UserDataManager};

/// The user performing an operation, scoped to one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    user_id: UserId,
    account_id: AccountId,
    account_permissions: AccountUserPermissions,
    service_admin_permissions: ServiceAdminPermissions,
}

impl Actor {
    /// Creates an actor from already resolved masks.
    #[must_use]
    pub fn new(
        user_id: UserId,
        account_id: AccountId,
        account_permissions: AccountUserPermissions,
        service_admin_permissions: ServiceAdminPermissions,
    ) -> Self {
        Self {
            user_id,
            account_id,
            account_permissions,
            service_admin_permissions,
        }
    }

    /// Returns the acting user.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the active account.
    #[must_use]
    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    /// Returns the mask held in the active account.
    #[must_use]
    pub fn account_permissions(&self) -> AccountUserPermissions {
        self.account_permissions
    }

    /// Returns the service-wide mask.
    #[must_use]
    pub fn service_admin_permissions(&self) -> ServiceAdminPermissions {
        self.service_admin_permissions
    }

    /// Fails with `Forbidden` unless the account mask grants `permission`.
    pub fn require_account_permission(&self, permission: AccountUserPermission) -> AppResult<()> {
        if self.account_permissions.has(permission) {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{}' is missing permission '{}' in account '{}'",
            self.user_id,
            permission.as_str(),
            self.account_id
        )))
    }

    /// Fails with `Forbidden` unless the service mask grants `permission`.
    pub fn require_service_admin_permission(
        &self,
        permission: ServiceAdminPermission,
    ) -> AppResult<()> {
        if self.service_admin_permissions.has(permission) {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{}' is missing service admin permission '{}'",
            self.user_id,
            permission.as_str()
        )))
    }

    /// Fails with `Forbidden` when `requested` holds bits the actor lacks.
    ///
    /// Superusers may hand out anything.
    pub fn require_can_delegate(&self, requested: AccountUserPermissions) -> AppResult<()> {
        if self.account_permissions.is_superuser()
            || self.account_permissions.contains(requested)
        {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{}' cannot grant permissions it does not hold in account '{}'",
            self.user_id, self.account_id
        )))
    }
}

/// Builds an [`Actor`] from stored user and membership rows.
#[derive(Clone)]
pub struct ActorResolver {
    users: Arc<dyn UserDataManager>,
    memberships: Arc<dyn AccountUserMembershipDataManager>,
}

impl ActorResolver {
    /// Creates a resolver.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserDataManager>,
        memberships: Arc<dyn AccountUserMembershipDataManager>,
    ) -> Self {
        Self { users, memberships }
    }

    /// Resolves the caller in `account_id`, or in the default account when
    /// none is requested.
    pub async fn resolve(
        &self,
        user_id: UserId,
        account_id: Option<AccountId>,
    ) -> AppResult<Actor> {
        let user = self.users.get_user(user_id).await?;
        if !user.is_in_good_standing() {
            return Err(AppError::Forbidden(format!(
                "user '{user_id}' is {}",
                user.reputation.as_str()
            )));
        }

        let account_id = match account_id {
            Some(account_id) => account_id,
            None => {
                self.memberships
                    .get_default_account_id_for_user(user_id)
                    .await?
            }
        };

        let membership = self
            .memberships
            .get_memberships_for_user(user_id)
            .await?
            .into_iter()
            .find(|membership| membership.belongs_to_account == account_id)
            .ok_or_else(|| {
                AppError::Forbidden(format!(
                    "user '{user_id}' is not a member of account '{account_id}'"
                ))
            })?;

        Ok(Actor::new(
            user_id,
            account_id,
            membership.account_permissions,
            user.service_admin_permissions,
        ))
    }
}

#[cfg(test)]
mod tests;
