use async_trait::async_trait;
use todo_application::{AccountDataManager, BatchSender};
use todo_core::{AccountId, AppResult, MembershipId, UserId};
use todo_domain::{
    Account, AccountCreationInput, AuditEvent, AuditLogEntry, AuditSubject, FieldChangeSummary,
    ListPage, QueryFilter, UNPAID_BILLING_STATUS,
};
use uuid::Uuid;

use super::PostgresQuerier;
use super::reads::{fetch_audit_entries, fetch_count, fetch_entity, fetch_list};
use super::rows::AccountRow;
use crate::query_builder::{
    ACCOUNT_USER_MEMBERSHIPS, ACCOUNTS, ListScope, SqlValue, build_archive_query,
    build_get_all_count_query, build_get_query, build_insert_query, build_update_query,
};

const OWNER_MEMBERSHIP_REASON: &str = "account creation";

#[async_trait]
impl AccountDataManager for PostgresQuerier {
    #[tracing::instrument(skip_all, fields(account_id = %account_id, user_id = %user_id))]
    async fn get_account(&self, account_id: AccountId, user_id: UserId) -> AppResult<Account> {
        fetch_entity::<AccountRow>(
            &self.pool,
            build_get_query(
                &ACCOUNTS,
                account_id.as_database(),
                Some(user_id.as_database()),
            ),
            &format!("account '{account_id}'"),
        )
        .await
    }

    #[tracing::instrument(skip_all)]
    async fn get_all_accounts_count(&self) -> AppResult<u64> {
        fetch_count(
            &self.pool,
            build_get_all_count_query(&ACCOUNTS),
            "count accounts",
        )
        .await
    }

    #[tracing::instrument(skip_all, fields(batch_size = batch_size))]
    async fn get_all_accounts(
        &self,
        results: BatchSender<Account>,
        batch_size: u16,
    ) -> AppResult<()> {
        self.stream_all::<AccountRow>(ACCOUNTS, results, batch_size)
            .await
    }

    #[tracing::instrument(
        skip_all,
        fields(
            user_id = %user_id,
            page = filter.map(QueryFilter::effective_page),
            limit = filter.map(QueryFilter::effective_limit),
        )
    )]
    async fn get_accounts(
        &self,
        user_id: UserId,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<Account>> {
        fetch_list::<AccountRow>(
            &self.pool,
            &ACCOUNTS,
            ListScope::Owner(user_id.as_database()),
            filter,
            "list accounts",
        )
        .await
    }

    #[tracing::instrument(skip_all)]
    async fn get_accounts_for_admin(
        &self,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<Account>> {
        fetch_list::<AccountRow>(
            &self.pool,
            &ACCOUNTS,
            ListScope::Admin,
            filter,
            "list accounts for admin",
        )
        .await
    }

    /// Inserts the account and the owner's default membership in one
    /// transaction, with one audit entry each.
    #[tracing::instrument(
        skip_all,
        fields(owner = %input.belongs_to_user, created_by = %created_by)
    )]
    async fn create_account(
        &self,
        input: &AccountCreationInput,
        created_by: UserId,
    ) -> AppResult<Account> {
        let external_id = Uuid::new_v4().to_string();
        let account_statement = build_insert_query(
            &ACCOUNTS,
            vec![
                ("external_id", external_id.clone().into()),
                ("name", input.name.clone().into()),
                ("billing_status", UNPAID_BILLING_STATUS.into()),
                ("contact_email", input.contact_email.clone().into()),
                ("contact_phone", input.contact_phone.clone().into()),
                ("payment_processor_customer_id", "".into()),
                (
                    "subscription_plan_id",
                    SqlValue::OptionalBigInt(
                        input.subscription_plan_id.map(|plan| plan.as_database()),
                    ),
                ),
                (
                    "default_user_permissions",
                    input.default_user_permissions.as_database().into(),
                ),
                ("belongs_to_user", input.belongs_to_user.as_database().into()),
            ],
        );

        let (pending, inserted) = self
            .begin_write("create account")
            .await?
            .insert(account_statement)
            .await?;
        let (pending, account_id) = pending
            .check(AccountId::from_database(inserted.id))
            .await?;

        let membership_statement = build_insert_query(
            &ACCOUNT_USER_MEMBERSHIPS,
            vec![
                ("belongs_to_user", input.belongs_to_user.as_database().into()),
                ("belongs_to_account", account_id.as_database().into()),
                (
                    "user_account_permissions",
                    input.default_user_permissions.as_database().into(),
                ),
                ("default_account", true.into()),
            ],
        );

        let (pending, membership) = pending
            .record(&AuditEvent::AccountCreated {
                performed_by: created_by,
                account_id,
            })
            .await?
            .then()
            .insert(membership_statement)
            .await?;
        let (pending, membership_id) = pending
            .check(MembershipId::from_database(membership.id))
            .await?;

        pending
            .record(&AuditEvent::UserAddedToAccount {
                performed_by: created_by,
                account_id,
                user_id: input.belongs_to_user,
                membership_id,
                permissions: input.default_user_permissions,
                reason: OWNER_MEMBERSHIP_REASON.to_owned(),
            })
            .await?
            .commit()
            .await?;

        Ok(Account {
            id: account_id,
            external_id,
            name: input.name.clone(),
            billing_status: UNPAID_BILLING_STATUS.to_owned(),
            contact_email: input.contact_email.clone(),
            contact_phone: input.contact_phone.clone(),
            payment_processor_customer_id: String::new(),
            subscription_plan_id: input.subscription_plan_id,
            default_user_permissions: input.default_user_permissions,
            created_on: inserted.created_on,
            last_updated_on: None,
            archived_on: None,
            belongs_to_user: input.belongs_to_user,
        })
    }

    #[tracing::instrument(
        skip_all,
        fields(account_id = %updated.id, changed_by = %changed_by)
    )]
    async fn update_account(
        &self,
        updated: &Account,
        changed_by: UserId,
        changes: Vec<FieldChangeSummary>,
    ) -> AppResult<u64> {
        let statement = build_update_query(
            &ACCOUNTS,
            vec![
                ("name", updated.name.clone().into()),
                ("contact_email", updated.contact_email.clone().into()),
                ("contact_phone", updated.contact_phone.clone().into()),
                (
                    "subscription_plan_id",
                    SqlValue::OptionalBigInt(
                        updated.subscription_plan_id.map(|plan| plan.as_database()),
                    ),
                ),
            ],
            updated.id.as_database(),
            Some(updated.belongs_to_user.as_database()),
        );

        self.execute_audited(
            "update account",
            statement,
            AuditEvent::AccountUpdated {
                performed_by: changed_by,
                account_id: updated.id,
                changes,
            },
        )
        .await
    }

    #[tracing::instrument(
        skip_all,
        fields(account_id = %account_id, user_id = %user_id, archived_by = %archived_by)
    )]
    async fn archive_account(
        &self,
        account_id: AccountId,
        user_id: UserId,
        archived_by: UserId,
    ) -> AppResult<u64> {
        self.execute_audited(
            "archive account",
            build_archive_query(
                &ACCOUNTS,
                account_id.as_database(),
                Some(user_id.as_database()),
            ),
            AuditEvent::AccountArchived {
                performed_by: archived_by,
                account_id,
            },
        )
        .await
    }

    #[tracing::instrument(skip_all, fields(account_id = %account_id))]
    async fn get_audit_log_entries_for_account(
        &self,
        account_id: AccountId,
    ) -> AppResult<Vec<AuditLogEntry>> {
        fetch_audit_entries(&self.pool, AuditSubject::Account(account_id)).await
    }
}
