use super::*;

impl AdminService {
    /// Lists subscription plans. The catalog is visible to every member.
    pub async fn list_subscription_plans(
        &self,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<AccountSubscriptionPlan>> {
        self.data.plans.get_account_subscription_plans(filter).await
    }

    /// Returns one plan.
    pub async fn get_subscription_plan(
        &self,
        plan_id: AccountSubscriptionPlanId,
    ) -> AppResult<AccountSubscriptionPlan> {
        self.data.plans.get_account_subscription_plan(plan_id).await
    }

    /// Adds a plan to the catalog.
    pub async fn create_subscription_plan(
        &self,
        actor: &Actor,
        input: AccountSubscriptionPlanCreationInput,
    ) -> AppResult<AccountSubscriptionPlan> {
        actor.require_service_admin_permission(ServiceAdminPermission::ManageSubscriptionPlans)?;
        input.validate()?;

        self.data
            .plans
            .create_account_subscription_plan(&input, actor.user_id())
            .await
    }

    /// Applies a partial update to a plan.
    pub async fn update_subscription_plan(
        &self,
        actor: &Actor,
        plan_id: AccountSubscriptionPlanId,
        input: AccountSubscriptionPlanUpdateInput,
    ) -> AppResult<AccountSubscriptionPlan> {
        actor.require_service_admin_permission(ServiceAdminPermission::ManageSubscriptionPlans)?;
        input.validate()?;

        let mut plan = self.data.plans.get_account_subscription_plan(plan_id).await?;
        let changes = plan.update(input);
        if changes.is_empty() {
            return Ok(plan);
        }

        let affected = self
            .data
            .plans
            .update_account_subscription_plan(&plan, actor.user_id(), changes)
            .await?;
        if affected == 0 {
            return Err(AppError::NotFound(format!(
                "subscription plan '{plan_id}' was not found"
            )));
        }

        Ok(plan)
    }

    /// Retires a plan.
    pub async fn archive_subscription_plan(
        &self,
        actor: &Actor,
        plan_id: AccountSubscriptionPlanId,
    ) -> AppResult<()> {
        actor.require_service_admin_permission(ServiceAdminPermission::ManageSubscriptionPlans)?;

        let affected = self
            .data
            .plans
            .archive_account_subscription_plan(plan_id, actor.user_id())
            .await?;
        if affected == 0 {
            return Err(AppError::NotFound(format!(
                "subscription plan '{plan_id}' was not found"
            )));
        }

        Ok(())
    }

    /// Returns the audit trail of a plan.
    pub async fn subscription_plan_audit_log(
        &self,
        actor: &Actor,
        plan_id: AccountSubscriptionPlanId,
    ) -> AppResult<Vec<todo_domain::AuditLogEntry>> {
        actor.require_service_admin_permission(ServiceAdminPermission::ReadAuditLog)?;
        self.data
            .plans
            .get_audit_log_entries_for_account_subscription_plan(plan_id)
            .await
    }
}
