//! Service-administrator operations that cross account boundaries.

use std::sync::Arc;

use todo_core::{AccountSubscriptionPlanId, AppError, AppResult, ItemId};
use todo_domain::{
    Account, AccountSubscriptionPlan, AccountSubscriptionPlanCreationInput,
    AccountSubscriptionPlanUpdateInput, Item, ListPage, QueryFilter, ServiceAdminPermission,
    User, UserReputation, UserReputationUpdateInput, Webhook,
};

use crate::Actor;
use crate::data_manager_ports::{
    AccountDataManager, AccountSubscriptionPlanDataManager, ItemDataManager, UserDataManager,
    WebhookDataManager,
};

mod plans;

/// Storage ports the admin service reads across accounts.
#[derive(Clone)]
pub struct AdminDataManagers {
    /// User storage.
    pub users: Arc<dyn UserDataManager>,
    /// Account storage.
    pub accounts: Arc<dyn AccountDataManager>,
    /// Item storage.
    pub items: Arc<dyn ItemDataManager>,
    /// Webhook storage.
    pub webhooks: Arc<dyn WebhookDataManager>,
    /// Subscription plan storage.
    pub plans: Arc<dyn AccountSubscriptionPlanDataManager>,
}

/// Application service for service administrators.
#[derive(Clone)]
pub struct AdminService {
    data: AdminDataManagers,
}

impl AdminService {
    /// Creates a new admin service.
    #[must_use]
    pub fn new(data: AdminDataManagers) -> Self {
        Self { data }
    }

    /// Lists users.
    pub async fn list_users(
        &self,
        actor: &Actor,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<User>> {
        actor.require_service_admin_permission(ServiceAdminPermission::ImpersonateAccounts)?;
        self.data.users.get_users(filter).await
    }

    /// Lists accounts across all owners.
    pub async fn list_accounts(
        &self,
        actor: &Actor,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<Account>> {
        actor.require_service_admin_permission(ServiceAdminPermission::ImpersonateAccounts)?;
        self.data.accounts.get_accounts_for_admin(filter).await
    }

    /// Lists items across all accounts.
    pub async fn list_items(
        &self,
        actor: &Actor,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<Item>> {
        actor.require_service_admin_permission(ServiceAdminPermission::ImpersonateAccounts)?;
        self.data.items.get_items_for_admin(filter).await
    }

    /// Returns ranked items across all accounts.
    pub async fn items_with_ids(
        &self,
        actor: &Actor,
        limit: u16,
        ids: &[ItemId],
    ) -> AppResult<Vec<Item>> {
        actor.require_service_admin_permission(ServiceAdminPermission::ImpersonateAccounts)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        self.data.items.get_items_with_ids_for_admin(limit, ids).await
    }

    /// Lists webhooks across all accounts.
    pub async fn list_webhooks(
        &self,
        actor: &Actor,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<Webhook>> {
        actor.require_service_admin_permission(ServiceAdminPermission::ImpersonateAccounts)?;
        self.data.webhooks.get_webhooks_for_admin(filter).await
    }

    /// Changes another user's standing.
    ///
    /// Termination needs `terminate_accounts`; every other change needs
    /// `ban_users`.
    pub async fn update_user_reputation(
        &self,
        actor: &Actor,
        input: UserReputationUpdateInput,
    ) -> AppResult<()> {
        let required = match input.new_reputation {
            UserReputation::Terminated => ServiceAdminPermission::TerminateAccounts,
            _ => ServiceAdminPermission::BanUsers,
        };
        actor.require_service_admin_permission(required)?;
        input.validate()?;

        if input.target_user_id == actor.user_id() {
            return Err(AppError::Forbidden(
                "administrators cannot change their own reputation".to_owned(),
            ));
        }

        let affected = self
            .data
            .users
            .update_user_reputation(&input, actor.user_id())
            .await?;
        if affected == 0 {
            return Err(AppError::NotFound(format!(
                "user '{}' was not found",
                input.target_user_id
            )));
        }

        Ok(())
    }
}
