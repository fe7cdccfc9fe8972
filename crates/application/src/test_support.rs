//! In-memory data managers shared by service tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use todo_core::{
    AccountId, AccountSubscriptionPlanId, ApiClientId, AppError, AppResult, ItemId, MembershipId,
    UserId, WebhookId,
};
use todo_domain::{
    Account, AccountCreationInput, AccountSubscriptionPlan, AccountSubscriptionPlanCreationInput,
    AccountUserMembership, AccountUserPermissions, AddUserToAccountInput, ApiClient,
    ApiClientCreationInput, AuditLogEntry, FieldChangeSummary, Item, ItemCreationInput, ListPage,
    ModifyUserPermissionsInput, Pagination, QueryFilter, ServiceAdminPermissions,
    TransferAccountOwnershipInput, User, UserRegistrationInput, UserReputation,
    UserReputationUpdateInput, Webhook, WebhookCreationInput,
};

use crate::Actor;
use crate::data_manager_ports::{
    AccountDataManager, AccountSubscriptionPlanDataManager, AccountUserMembershipDataManager,
    ApiClientDataManager, BatchSender, ItemDataManager, UserDataManager, WebhookDataManager,
};

pub(crate) fn user_id(value: u64) -> UserId {
    UserId::new(value).unwrap_or_else(|_| unreachable!())
}

pub(crate) fn account_id(value: u64) -> AccountId {
    AccountId::new(value).unwrap_or_else(|_| unreachable!())
}

pub(crate) fn item_id(value: u64) -> ItemId {
    ItemId::new(value).unwrap_or_else(|_| unreachable!())
}

pub(crate) fn actor_with(
    user: u64,
    account: u64,
    account_permissions: AccountUserPermissions,
    service_admin_permissions: ServiceAdminPermissions,
) -> Actor {
    Actor::new(
        user_id(user),
        account_id(account),
        account_permissions,
        service_admin_permissions,
    )
}

fn page_of<T: Clone>(rows: Vec<T>, filter: Option<&QueryFilter>) -> ListPage<T> {
    let filter = filter.cloned().unwrap_or_default();
    let count = rows.len() as u64;
    let data = rows
        .into_iter()
        .skip(usize::try_from(filter.offset()).unwrap_or(usize::MAX))
        .take(usize::from(filter.effective_limit()))
        .collect();

    ListPage {
        data,
        pagination: Pagination {
            filtered_count: count,
            total_count: count,
            ..Pagination::for_filter(&filter)
        },
    }
}

fn not_found(what: &str) -> AppError {
    AppError::NotFound(format!("{what} was not found"))
}

pub(crate) fn sample_item(id: u64, account: u64) -> Item {
    Item {
        id: item_id(id),
        external_id: format!("item-{id}"),
        name: "milk".to_owned(),
        details: "2%".to_owned(),
        created_on: Utc::now(),
        last_updated_on: None,
        archived_on: None,
        belongs_to_account: account_id(account),
    }
}

pub(crate) fn sample_user(id: u64) -> User {
    User {
        id: user_id(id),
        external_id: format!("user-{id}"),
        username: format!("user_{id}"),
        hashed_password: "$argon2id$hash".to_owned(),
        requires_password_change: false,
        password_last_changed_on: None,
        two_factor_secret: "secret".to_owned(),
        two_factor_secret_verified_on: None,
        service_admin_permissions: ServiceAdminPermissions::none(),
        reputation: UserReputation::Good,
        reputation_explanation: String::new(),
        avatar_src: None,
        created_on: Utc::now(),
        last_updated_on: None,
        archived_on: None,
    }
}

pub(crate) fn sample_membership(
    id: u64,
    user: u64,
    account: u64,
    account_permissions: AccountUserPermissions,
) -> AccountUserMembership {
    AccountUserMembership {
        id: MembershipId::new(id).unwrap_or_else(|_| unreachable!()),
        belongs_to_user: user_id(user),
        belongs_to_account: account_id(account),
        account_permissions,
        default_account: true,
        created_on: Utc::now(),
        last_updated_on: None,
        archived_on: None,
    }
}

pub(crate) fn sample_plan(id: u64) -> AccountSubscriptionPlan {
    AccountSubscriptionPlan {
        id: AccountSubscriptionPlanId::new(id).unwrap_or_else(|_| unreachable!()),
        external_id: format!("plan-{id}"),
        name: "starter".to_owned(),
        description: "starter plan".to_owned(),
        price: 1_000,
        period_days: 30,
        created_on: Utc::now(),
        last_updated_on: None,
        archived_on: None,
    }
}

/// Records every storage call by name.
#[derive(Default)]
pub(crate) struct CallLog {
    calls: Mutex<Vec<&'static str>>,
}

impl CallLog {
    async fn record(&self, call: &'static str) {
        self.calls.lock().await.push(call);
    }

    pub(crate) async fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().await.clone()
    }
}

#[derive(Default)]
pub(crate) struct FakeItemDataManager {
    pub(crate) items: Mutex<Vec<Item>>,
    pub(crate) updates: Mutex<Vec<Vec<FieldChangeSummary>>>,
    pub(crate) log: CallLog,
}

#[async_trait]
impl ItemDataManager for FakeItemDataManager {
    async fn item_exists(&self, item_id: ItemId, account_id: AccountId) -> AppResult<bool> {
        self.log.record("item_exists").await;
        Ok(self
            .items
            .lock()
            .await
            .iter()
            .any(|item| item.id == item_id && item.belongs_to_account == account_id))
    }

    async fn get_item(&self, item_id: ItemId, account_id: AccountId) -> AppResult<Item> {
        self.log.record("get_item").await;
        self.items
            .lock()
            .await
            .iter()
            .find(|item| {
                item.id == item_id
                    && item.belongs_to_account == account_id
                    && item.archived_on.is_none()
            })
            .cloned()
            .ok_or_else(|| not_found("item"))
    }

    async fn get_all_items_count(&self) -> AppResult<u64> {
        self.log.record("get_all_items_count").await;
        Ok(self.items.lock().await.len() as u64)
    }

    async fn get_all_items(&self, results: BatchSender<Item>, _batch_size: u16) -> AppResult<()> {
        self.log.record("get_all_items").await;
        drop(results);
        Ok(())
    }

    async fn get_items(
        &self,
        account_id: AccountId,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<Item>> {
        self.log.record("get_items").await;
        let rows = self
            .items
            .lock()
            .await
            .iter()
            .filter(|item| item.belongs_to_account == account_id)
            .cloned()
            .collect();
        Ok(page_of(rows, filter))
    }

    async fn get_items_for_admin(
        &self,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<Item>> {
        self.log.record("get_items_for_admin").await;
        Ok(page_of(self.items.lock().await.clone(), filter))
    }

    async fn get_items_with_ids(
        &self,
        account_id: AccountId,
        limit: u16,
        ids: &[ItemId],
    ) -> AppResult<Vec<Item>> {
        self.log.record("get_items_with_ids").await;
        let items = self.items.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| {
                items
                    .iter()
                    .find(|item| item.id == *id && item.belongs_to_account == account_id)
                    .cloned()
            })
            .take(usize::from(limit))
            .collect())
    }

    async fn get_items_with_ids_for_admin(
        &self,
        limit: u16,
        ids: &[ItemId],
    ) -> AppResult<Vec<Item>> {
        self.log.record("get_items_with_ids_for_admin").await;
        let items = self.items.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| items.iter().find(|item| item.id == *id).cloned())
            .take(usize::from(limit))
            .collect())
    }

    async fn create_item(&self, input: &ItemCreationInput, _created_by: UserId) -> AppResult<Item> {
        self.log.record("create_item").await;
        let mut items = self.items.lock().await;
        let mut item = sample_item(items.len() as u64 + 1, input.belongs_to_account.get());
        item.name = input.name.clone();
        item.details = input.details.clone();
        items.push(item.clone());
        Ok(item)
    }

    async fn update_item(
        &self,
        updated: &Item,
        _changed_by: UserId,
        changes: Vec<FieldChangeSummary>,
    ) -> AppResult<u64> {
        self.log.record("update_item").await;
        self.updates.lock().await.push(changes);
        let mut items = self.items.lock().await;
        match items.iter_mut().find(|item| item.id == updated.id) {
            Some(item) => {
                *item = updated.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn archive_item(
        &self,
        item_id: ItemId,
        account_id: AccountId,
        _archived_by: UserId,
    ) -> AppResult<u64> {
        self.log.record("archive_item").await;
        let mut items = self.items.lock().await;
        match items.iter_mut().find(|item| {
            item.id == item_id && item.belongs_to_account == account_id && item.archived_on.is_none()
        }) {
            Some(item) => {
                item.archived_on = Some(Utc::now());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn get_audit_log_entries_for_item(
        &self,
        _item_id: ItemId,
    ) -> AppResult<Vec<AuditLogEntry>> {
        self.log.record("get_audit_log_entries_for_item").await;
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub(crate) struct FakeUserDataManager {
    pub(crate) users: Mutex<Vec<User>>,
    pub(crate) reputation_updates: Mutex<Vec<UserReputationUpdateInput>>,
    pub(crate) log: CallLog,
}

impl FakeUserDataManager {
    pub(crate) fn with_users(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users),
            ..Self::default()
        }
    }
}

#[async_trait]
impl UserDataManager for FakeUserDataManager {
    async fn user_exists(&self, user_id: UserId) -> AppResult<bool> {
        self.log.record("user_exists").await;
        Ok(self.users.lock().await.iter().any(|user| user.id == user_id))
    }

    async fn get_user(&self, user_id: UserId) -> AppResult<User> {
        self.log.record("get_user").await;
        self.users
            .lock()
            .await
            .iter()
            .find(|user| user.id == user_id)
            .cloned()
            .ok_or_else(|| not_found("user"))
    }

    async fn get_user_by_username(&self, username: &str) -> AppResult<User> {
        self.log.record("get_user_by_username").await;
        self.users
            .lock()
            .await
            .iter()
            .find(|user| user.username == username)
            .cloned()
            .ok_or_else(|| not_found("user"))
    }

    async fn search_for_users_by_username(&self, query: &str) -> AppResult<Vec<User>> {
        self.log.record("search_for_users_by_username").await;
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .filter(|user| user.username.starts_with(query))
            .cloned()
            .collect())
    }

    async fn get_all_users_count(&self) -> AppResult<u64> {
        self.log.record("get_all_users_count").await;
        Ok(self.users.lock().await.len() as u64)
    }

    async fn get_users(&self, filter: Option<&QueryFilter>) -> AppResult<ListPage<User>> {
        self.log.record("get_users").await;
        Ok(page_of(self.users.lock().await.clone(), filter))
    }

    async fn create_user(&self, input: &UserRegistrationInput) -> AppResult<User> {
        self.log.record("create_user").await;
        let mut users = self.users.lock().await;
        let mut user = sample_user(users.len() as u64 + 1);
        user.username = input.username.clone();
        user.reputation = UserReputation::Unverified;
        users.push(user.clone());
        Ok(user)
    }

    async fn update_user(
        &self,
        updated: &User,
        _changed_by: UserId,
        _changes: Vec<FieldChangeSummary>,
    ) -> AppResult<u64> {
        self.log.record("update_user").await;
        let mut users = self.users.lock().await;
        match users.iter_mut().find(|user| user.id == updated.id) {
            Some(user) => {
                *user = updated.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn update_user_password(&self, user_id: UserId, new_hash: &str) -> AppResult<u64> {
        self.log.record("update_user_password").await;
        let mut users = self.users.lock().await;
        match users.iter_mut().find(|user| user.id == user_id) {
            Some(user) => {
                new_hash.clone_into(&mut user.hashed_password);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn update_user_reputation(
        &self,
        input: &UserReputationUpdateInput,
        _changed_by: UserId,
    ) -> AppResult<u64> {
        self.log.record("update_user_reputation").await;
        self.reputation_updates.lock().await.push(input.clone());
        let exists = self
            .users
            .lock()
            .await
            .iter()
            .any(|user| user.id == input.target_user_id);
        Ok(u64::from(exists))
    }

    async fn archive_user(&self, user_id: UserId, _archived_by: UserId) -> AppResult<u64> {
        self.log.record("archive_user").await;
        let mut users = self.users.lock().await;
        let before = users.len();
        users.retain(|user| user.id != user_id);
        Ok((before - users.len()) as u64)
    }

    async fn get_audit_log_entries_for_user(
        &self,
        _user_id: UserId,
    ) -> AppResult<Vec<AuditLogEntry>> {
        self.log.record("get_audit_log_entries_for_user").await;
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub(crate) struct FakeMembershipDataManager {
    pub(crate) memberships: Mutex<Vec<AccountUserMembership>>,
    pub(crate) default_account: Mutex<Option<AccountId>>,
    pub(crate) log: CallLog,
}

impl FakeMembershipDataManager {
    pub(crate) fn with_memberships(memberships: Vec<AccountUserMembership>) -> Self {
        Self {
            memberships: Mutex::new(memberships),
            ..Self::default()
        }
    }
}

#[async_trait]
impl AccountUserMembershipDataManager for FakeMembershipDataManager {
    async fn get_default_account_id_for_user(&self, user_id: UserId) -> AppResult<AccountId> {
        self.log.record("get_default_account_id_for_user").await;
        if let Some(account_id) = *self.default_account.lock().await {
            return Ok(account_id);
        }

        self.memberships
            .lock()
            .await
            .iter()
            .find(|membership| membership.belongs_to_user == user_id && membership.default_account)
            .map(|membership| membership.belongs_to_account)
            .ok_or_else(|| not_found("default account"))
    }

    async fn user_is_member_of_account(
        &self,
        user_id: UserId,
        account_id: AccountId,
    ) -> AppResult<bool> {
        self.log.record("user_is_member_of_account").await;
        Ok(self.memberships.lock().await.iter().any(|membership| {
            membership.belongs_to_user == user_id && membership.belongs_to_account == account_id
        }))
    }

    async fn get_memberships_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<AccountUserMembership>> {
        self.log.record("get_memberships_for_user").await;
        Ok(self
            .memberships
            .lock()
            .await
            .iter()
            .filter(|membership| membership.belongs_to_user == user_id)
            .cloned()
            .collect())
    }

    async fn get_account_memberships(
        &self,
        account_id: AccountId,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<AccountUserMembership>> {
        self.log.record("get_account_memberships").await;
        let rows = self
            .memberships
            .lock()
            .await
            .iter()
            .filter(|membership| membership.belongs_to_account == account_id)
            .cloned()
            .collect();
        Ok(page_of(rows, filter))
    }

    async fn add_user_to_account(
        &self,
        input: &AddUserToAccountInput,
        _added_by: UserId,
    ) -> AppResult<AccountUserMembership> {
        self.log.record("add_user_to_account").await;
        let mut memberships = self.memberships.lock().await;
        let mut membership = sample_membership(
            memberships.len() as u64 + 1,
            input.user_id.get(),
            input.account_id.get(),
            input.account_permissions,
        );
        membership.default_account = false;
        memberships.push(membership.clone());
        Ok(membership)
    }

    async fn modify_user_permissions(
        &self,
        user_id: UserId,
        account_id: AccountId,
        _changed_by: UserId,
        input: &ModifyUserPermissionsInput,
    ) -> AppResult<u64> {
        self.log.record("modify_user_permissions").await;
        let mut memberships = self.memberships.lock().await;
        match memberships.iter_mut().find(|membership| {
            membership.belongs_to_user == user_id && membership.belongs_to_account == account_id
        }) {
            Some(membership) => {
                membership.account_permissions = input.new_permissions;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn mark_account_as_user_default(
        &self,
        user_id: UserId,
        account_id: AccountId,
        _changed_by: UserId,
    ) -> AppResult<u64> {
        self.log.record("mark_account_as_user_default").await;
        let mut affected = 0;
        for membership in self
            .memberships
            .lock()
            .await
            .iter_mut()
            .filter(|membership| membership.belongs_to_user == user_id)
        {
            membership.default_account = membership.belongs_to_account == account_id;
            affected += u64::from(membership.default_account);
        }
        Ok(affected)
    }

    async fn remove_user_from_account(
        &self,
        user_id: UserId,
        account_id: AccountId,
        _removed_by: UserId,
        _reason: &str,
    ) -> AppResult<u64> {
        self.log.record("remove_user_from_account").await;
        let mut memberships = self.memberships.lock().await;
        let before = memberships.len();
        memberships.retain(|membership| {
            !(membership.belongs_to_user == user_id && membership.belongs_to_account == account_id)
        });
        Ok((before - memberships.len()) as u64)
    }

    async fn transfer_account_ownership(
        &self,
        _account_id: AccountId,
        _transferred_by: UserId,
        _input: &TransferAccountOwnershipInput,
    ) -> AppResult<u64> {
        self.log.record("transfer_account_ownership").await;
        Ok(1)
    }
}

#[derive(Default)]
pub(crate) struct FakePlanDataManager {
    pub(crate) plans: Mutex<Vec<AccountSubscriptionPlan>>,
    pub(crate) updates: Mutex<Vec<Vec<FieldChangeSummary>>>,
    pub(crate) log: CallLog,
}

#[async_trait]
impl AccountSubscriptionPlanDataManager for FakePlanDataManager {
    async fn get_account_subscription_plan(
        &self,
        plan_id: AccountSubscriptionPlanId,
    ) -> AppResult<AccountSubscriptionPlan> {
        self.log.record("get_account_subscription_plan").await;
        self.plans
            .lock()
            .await
            .iter()
            .find(|plan| plan.id == plan_id)
            .cloned()
            .ok_or_else(|| not_found("plan"))
    }

    async fn get_all_account_subscription_plans_count(&self) -> AppResult<u64> {
        self.log.record("get_all_account_subscription_plans_count").await;
        Ok(self.plans.lock().await.len() as u64)
    }

    async fn get_account_subscription_plans(
        &self,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<AccountSubscriptionPlan>> {
        self.log.record("get_account_subscription_plans").await;
        Ok(page_of(self.plans.lock().await.clone(), filter))
    }

    async fn create_account_subscription_plan(
        &self,
        input: &AccountSubscriptionPlanCreationInput,
        _created_by: UserId,
    ) -> AppResult<AccountSubscriptionPlan> {
        self.log.record("create_account_subscription_plan").await;
        let mut plans = self.plans.lock().await;
        let mut plan = sample_plan(plans.len() as u64 + 1);
        plan.name = input.name.clone();
        plan.description = input.description.clone();
        plan.price = input.price;
        plan.period_days = input.period_days;
        plans.push(plan.clone());
        Ok(plan)
    }

    async fn update_account_subscription_plan(
        &self,
        updated: &AccountSubscriptionPlan,
        _changed_by: UserId,
        changes: Vec<FieldChangeSummary>,
    ) -> AppResult<u64> {
        self.log.record("update_account_subscription_plan").await;
        self.updates.lock().await.push(changes);
        let mut plans = self.plans.lock().await;
        match plans.iter_mut().find(|plan| plan.id == updated.id) {
            Some(plan) => {
                *plan = updated.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn archive_account_subscription_plan(
        &self,
        plan_id: AccountSubscriptionPlanId,
        _archived_by: UserId,
    ) -> AppResult<u64> {
        self.log.record("archive_account_subscription_plan").await;
        let mut plans = self.plans.lock().await;
        let before = plans.len();
        plans.retain(|plan| plan.id != plan_id);
        Ok((before - plans.len()) as u64)
    }

    async fn get_audit_log_entries_for_account_subscription_plan(
        &self,
        _plan_id: AccountSubscriptionPlanId,
    ) -> AppResult<Vec<AuditLogEntry>> {
        self.log
            .record("get_audit_log_entries_for_account_subscription_plan")
            .await;
        Ok(Vec::new())
    }
}

/// Storage that must never be reached by the test using it.
#[derive(Default)]
pub(crate) struct UnreachableDataManager;

fn unreachable_storage() -> AppError {
    AppError::Internal("storage was not expected to be called".to_owned())
}

#[async_trait]
impl AccountDataManager for UnreachableDataManager {
    async fn get_account(&self, _account_id: AccountId, _user_id: UserId) -> AppResult<Account> {
        Err(unreachable_storage())
    }

    async fn get_all_accounts_count(&self) -> AppResult<u64> {
        Err(unreachable_storage())
    }

    async fn get_all_accounts(
        &self,
        _results: BatchSender<Account>,
        _batch_size: u16,
    ) -> AppResult<()> {
        Err(unreachable_storage())
    }

    async fn get_accounts(
        &self,
        _user_id: UserId,
        _filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<Account>> {
        Err(unreachable_storage())
    }

    async fn get_accounts_for_admin(
        &self,
        _filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<Account>> {
        Err(unreachable_storage())
    }

    async fn create_account(
        &self,
        _input: &AccountCreationInput,
        _created_by: UserId,
    ) -> AppResult<Account> {
        Err(unreachable_storage())
    }

    async fn update_account(
        &self,
        _updated: &Account,
        _changed_by: UserId,
        _changes: Vec<FieldChangeSummary>,
    ) -> AppResult<u64> {
        Err(unreachable_storage())
    }

    async fn archive_account(
        &self,
        _account_id: AccountId,
        _user_id: UserId,
        _archived_by: UserId,
    ) -> AppResult<u64> {
        Err(unreachable_storage())
    }

    async fn get_audit_log_entries_for_account(
        &self,
        _account_id: AccountId,
    ) -> AppResult<Vec<AuditLogEntry>> {
        Err(unreachable_storage())
    }
}

#[async_trait]
impl WebhookDataManager for UnreachableDataManager {
    async fn get_webhook(
        &self,
        _webhook_id: WebhookId,
        _account_id: AccountId,
    ) -> AppResult<Webhook> {
        Err(unreachable_storage())
    }

    async fn get_all_webhooks_count(&self) -> AppResult<u64> {
        Err(unreachable_storage())
    }

    async fn get_all_webhooks(
        &self,
        _results: BatchSender<Webhook>,
        _batch_size: u16,
    ) -> AppResult<()> {
        Err(unreachable_storage())
    }

    async fn get_webhooks(
        &self,
        _account_id: AccountId,
        _filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<Webhook>> {
        Err(unreachable_storage())
    }

    async fn get_webhooks_for_admin(
        &self,
        _filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<Webhook>> {
        Err(unreachable_storage())
    }

    async fn create_webhook(
        &self,
        _input: &WebhookCreationInput,
        _created_by: UserId,
    ) -> AppResult<Webhook> {
        Err(unreachable_storage())
    }

    async fn update_webhook(
        &self,
        _updated: &Webhook,
        _changed_by: UserId,
        _changes: Vec<FieldChangeSummary>,
    ) -> AppResult<u64> {
        Err(unreachable_storage())
    }

    async fn archive_webhook(
        &self,
        _webhook_id: WebhookId,
        _account_id: AccountId,
        _archived_by: UserId,
    ) -> AppResult<u64> {
        Err(unreachable_storage())
    }

    async fn get_audit_log_entries_for_webhook(
        &self,
        _webhook_id: WebhookId,
    ) -> AppResult<Vec<AuditLogEntry>> {
        Err(unreachable_storage())
    }
}

#[async_trait]
impl ApiClientDataManager for UnreachableDataManager {
    async fn get_api_client_by_client_id(&self, _client_id: &str) -> AppResult<ApiClient> {
        Err(unreachable_storage())
    }

    async fn get_api_client_by_database_id(
        &self,
        _api_client_id: ApiClientId,
        _user_id: UserId,
    ) -> AppResult<ApiClient> {
        Err(unreachable_storage())
    }

    async fn get_all_api_clients_count(&self) -> AppResult<u64> {
        Err(unreachable_storage())
    }

    async fn get_all_api_clients(
        &self,
        _results: BatchSender<ApiClient>,
        _batch_size: u16,
    ) -> AppResult<()> {
        Err(unreachable_storage())
    }

    async fn get_api_clients(
        &self,
        _user_id: UserId,
        _filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<ApiClient>> {
        Err(unreachable_storage())
    }

    async fn create_api_client(
        &self,
        _input: &ApiClientCreationInput,
        _created_by: UserId,
    ) -> AppResult<ApiClient> {
        Err(unreachable_storage())
    }

    async fn archive_api_client(
        &self,
        _api_client_id: ApiClientId,
        _user_id: UserId,
        _archived_by: UserId,
    ) -> AppResult<u64> {
        Err(unreachable_storage())
    }

    async fn get_audit_log_entries_for_api_client(
        &self,
        _api_client_id: ApiClientId,
    ) -> AppResult<Vec<AuditLogEntry>> {
        Err(unreachable_storage())
    }
}
