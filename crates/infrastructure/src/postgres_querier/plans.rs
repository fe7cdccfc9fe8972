use async_trait::async_trait;
use todo_application::AccountSubscriptionPlanDataManager;
use todo_core::{AccountSubscriptionPlanId, AppResult, UserId};
use todo_domain::{
    AccountSubscriptionPlan, AccountSubscriptionPlanCreationInput, AuditEvent, AuditLogEntry,
    AuditSubject, FieldChangeSummary, ListPage, QueryFilter,
};
use uuid::Uuid;

use super::PostgresQuerier;
use super::reads::{fetch_audit_entries, fetch_count, fetch_entity, fetch_list};
use super::rows::PlanRow;
use crate::query_builder::{
    ACCOUNT_SUBSCRIPTION_PLANS, ListScope, SqlValue, build_archive_query,
    build_get_all_count_query, build_get_query, build_insert_query, build_update_query,
};

fn stored(value: u32) -> SqlValue {
    SqlValue::BigInt(i64::from(value))
}

#[async_trait]
impl AccountSubscriptionPlanDataManager for PostgresQuerier {
    #[tracing::instrument(skip_all, fields(plan_id = %plan_id))]
    async fn get_account_subscription_plan(
        &self,
        plan_id: AccountSubscriptionPlanId,
    ) -> AppResult<AccountSubscriptionPlan> {
        fetch_entity::<PlanRow>(
            &self.pool,
            build_get_query(&ACCOUNT_SUBSCRIPTION_PLANS, plan_id.as_database(), None),
            &format!("subscription plan '{plan_id}'"),
        )
        .await
    }

    #[tracing::instrument(skip_all)]
    async fn get_all_account_subscription_plans_count(&self) -> AppResult<u64> {
        fetch_count(
            &self.pool,
            build_get_all_count_query(&ACCOUNT_SUBSCRIPTION_PLANS),
            "count subscription plans",
        )
        .await
    }

    #[tracing::instrument(
        skip_all,
        fields(
            page = filter.map(QueryFilter::effective_page),
            limit = filter.map(QueryFilter::effective_limit),
        )
    )]
    async fn get_account_subscription_plans(
        &self,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<AccountSubscriptionPlan>> {
        // Unowned table, so the admin scope only matters for archived rows,
        // which the public catalog never shows.
        let filter = filter.map(|filter| QueryFilter {
            include_archived: false,
            ..filter.clone()
        });
        fetch_list::<PlanRow>(
            &self.pool,
            &ACCOUNT_SUBSCRIPTION_PLANS,
            ListScope::Admin,
            filter.as_ref(),
            "list subscription plans",
        )
        .await
    }

    #[tracing::instrument(skip_all, fields(created_by = %created_by))]
    async fn create_account_subscription_plan(
        &self,
        input: &AccountSubscriptionPlanCreationInput,
        created_by: UserId,
    ) -> AppResult<AccountSubscriptionPlan> {
        let external_id = Uuid::new_v4().to_string();
        let statement = build_insert_query(
            &ACCOUNT_SUBSCRIPTION_PLANS,
            vec![
                ("external_id", external_id.clone().into()),
                ("name", input.name.clone().into()),
                ("description", input.description.clone().into()),
                ("price", stored(input.price)),
                ("period_days", stored(input.period_days)),
            ],
        );

        let (pending, inserted) = self
            .begin_write("create subscription plan")
            .await?
            .insert(statement)
            .await?;
        let (pending, plan_id) = pending
            .check(AccountSubscriptionPlanId::from_database(inserted.id))
            .await?;

        pending
            .record(&AuditEvent::AccountSubscriptionPlanCreated {
                performed_by: created_by,
                plan_id,
            })
            .await?
            .commit()
            .await?;

        Ok(AccountSubscriptionPlan {
            id: plan_id,
            external_id,
            name: input.name.clone(),
            description: input.description.clone(),
            price: input.price,
            period_days: input.period_days,
            created_on: inserted.created_on,
            last_updated_on: None,
            archived_on: None,
        })
    }

    #[tracing::instrument(skip_all, fields(plan_id = %updated.id, changed_by = %changed_by))]
    async fn update_account_subscription_plan(
        &self,
        updated: &AccountSubscriptionPlan,
        changed_by: UserId,
        changes: Vec<FieldChangeSummary>,
    ) -> AppResult<u64> {
        let statement = build_update_query(
            &ACCOUNT_SUBSCRIPTION_PLANS,
            vec![
                ("name", updated.name.clone().into()),
                ("description", updated.description.clone().into()),
                ("price", stored(updated.price)),
                ("period_days", stored(updated.period_days)),
            ],
            updated.id.as_database(),
            None,
        );

        self.execute_audited(
            "update subscription plan",
            statement,
            AuditEvent::AccountSubscriptionPlanUpdated {
                performed_by: changed_by,
                plan_id: updated.id,
                changes,
            },
        )
        .await
    }

    #[tracing::instrument(skip_all, fields(plan_id = %plan_id, archived_by = %archived_by))]
    async fn archive_account_subscription_plan(
        &self,
        plan_id: AccountSubscriptionPlanId,
        archived_by: UserId,
    ) -> AppResult<u64> {
        self.execute_audited(
            "archive subscription plan",
            build_archive_query(&ACCOUNT_SUBSCRIPTION_PLANS, plan_id.as_database(), None),
            AuditEvent::AccountSubscriptionPlanArchived {
                performed_by: archived_by,
                plan_id,
            },
        )
        .await
    }

    #[tracing::instrument(skip_all, fields(plan_id = %plan_id))]
    async fn get_audit_log_entries_for_account_subscription_plan(
        &self,
        plan_id: AccountSubscriptionPlanId,
    ) -> AppResult<Vec<AuditLogEntry>> {
        fetch_audit_entries(&self.pool, AuditSubject::Plan(plan_id)).await
    }
}
