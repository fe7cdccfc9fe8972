use async_trait::async_trait;
use todo_core::{AccountSubscriptionPlanId, AppResult, UserId};
use todo_domain::{
    AccountSubscriptionPlan, AccountSubscriptionPlanCreationInput, AuditLogEntry,
    FieldChangeSummary, ListPage, QueryFilter,
};

/// Storage port for subscription plans. Plans are not owned by anyone.
#[async_trait]
pub trait AccountSubscriptionPlanDataManager: Send + Sync {
    /// Returns a live plan.
    async fn get_account_subscription_plan(
        &self,
        plan_id: AccountSubscriptionPlanId,
    ) -> AppResult<AccountSubscriptionPlan>;

    /// Counts every live plan.
    async fn get_all_account_subscription_plans_count(&self) -> AppResult<u64>;

    /// Lists plans.
    async fn get_account_subscription_plans(
        &self,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<AccountSubscriptionPlan>>;

    /// Creates a plan and its audit entry.
    async fn create_account_subscription_plan(
        &self,
        input: &AccountSubscriptionPlanCreationInput,
        created_by: UserId,
    ) -> AppResult<AccountSubscriptionPlan>;

    /// Persists an updated plan and its audit entry.
    async fn update_account_subscription_plan(
        &self,
        updated: &AccountSubscriptionPlan,
        changed_by: UserId,
        changes: Vec<FieldChangeSummary>,
    ) -> AppResult<u64>;

    /// Archives a plan.
    async fn archive_account_subscription_plan(
        &self,
        plan_id: AccountSubscriptionPlanId,
        archived_by: UserId,
    ) -> AppResult<u64>;

    /// Returns audit entries mentioning the plan.
    async fn get_audit_log_entries_for_account_subscription_plan(
        &self,
        plan_id: AccountSubscriptionPlanId,
    ) -> AppResult<Vec<AuditLogEntry>>;
}
