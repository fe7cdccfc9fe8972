use async_trait::async_trait;
use chrono::Utc;
use todo_application::UserDataManager;
use todo_core::{AppResult, UserId};
use todo_domain::{
    AuditEvent, AuditLogEntry, AuditSubject, FieldChangeSummary, ListPage, QueryFilter,
    ServiceAdminPermissions, User, UserRegistrationInput, UserReputation,
    UserReputationUpdateInput,
};
use uuid::Uuid;

use super::PostgresQuerier;
use super::reads::{
    fetch_audit_entries, fetch_count, fetch_entities, fetch_entity, fetch_exists, fetch_list,
};
use super::rows::{MembershipRow, UserRow};
use crate::query_builder::{
    ACCOUNT_USER_MEMBERSHIPS, ListScope, SqlValue, USERS, build_archive_query,
    build_exists_query, build_get_all_count_query, build_get_matching_query, build_get_query,
    build_insert_query, build_prefix_search_query, build_update_query,
};

const USER_SEARCH_LIMIT: i64 = 20;
const ARCHIVED_USER_REASON: &str = "user archived";

#[async_trait]
impl UserDataManager for PostgresQuerier {
    #[tracing::instrument(skip_all, fields(user_id = %user_id))]
    async fn user_exists(&self, user_id: UserId) -> AppResult<bool> {
        fetch_exists(
            &self.pool,
            build_exists_query(&USERS, user_id.as_database(), None),
            "check user existence",
        )
        .await
    }

    #[tracing::instrument(skip_all, fields(user_id = %user_id))]
    async fn get_user(&self, user_id: UserId) -> AppResult<User> {
        fetch_entity::<UserRow>(
            &self.pool,
            build_get_query(&USERS, user_id.as_database(), None),
            &format!("user '{user_id}'"),
        )
        .await
    }

    #[tracing::instrument(skip_all)]
    async fn get_user_by_username(&self, username: &str) -> AppResult<User> {
        fetch_entity::<UserRow>(
            &self.pool,
            build_get_matching_query(&USERS, vec![("username", username.into())]),
            &format!("user '{username}'"),
        )
        .await
    }

    #[tracing::instrument(skip_all)]
    async fn search_for_users_by_username(&self, query: &str) -> AppResult<Vec<User>> {
        fetch_entities::<UserRow>(
            &self.pool,
            build_prefix_search_query(&USERS, "username", query, USER_SEARCH_LIMIT),
            "search users by username",
        )
        .await
    }

    #[tracing::instrument(skip_all)]
    async fn get_all_users_count(&self) -> AppResult<u64> {
        fetch_count(&self.pool, build_get_all_count_query(&USERS), "count users").await
    }

    #[tracing::instrument(
        skip_all,
        fields(
            page = filter.map(QueryFilter::effective_page),
            limit = filter.map(QueryFilter::effective_limit),
        )
    )]
    async fn get_users(&self, filter: Option<&QueryFilter>) -> AppResult<ListPage<User>> {
        fetch_list::<UserRow>(&self.pool, &USERS, ListScope::Admin, filter, "list users").await
    }

    #[tracing::instrument(skip_all)]
    async fn create_user(&self, input: &UserRegistrationInput) -> AppResult<User> {
        let external_id = Uuid::new_v4().to_string();
        let reputation = UserReputation::default();
        let service_admin_permissions = ServiceAdminPermissions::none();
        let statement = build_insert_query(
            &USERS,
            vec![
                ("external_id", external_id.clone().into()),
                ("username", input.username.clone().into()),
                ("hashed_password", input.hashed_password.clone().into()),
                ("requires_password_change", false.into()),
                ("two_factor_secret", input.two_factor_secret.clone().into()),
                (
                    "service_admin_permissions",
                    service_admin_permissions.as_database().into(),
                ),
                ("reputation", reputation.as_str().into()),
                ("reputation_explanation", "".into()),
            ],
        );

        let (pending, inserted) = self
            .begin_write("create user")
            .await?
            .insert(statement)
            .await?;
        let (pending, user_id) = pending.check(UserId::from_database(inserted.id)).await?;

        pending
            .record(&AuditEvent::UserCreated {
                performed_by: user_id,
                user_id,
            })
            .await?
            .commit()
            .await?;

        Ok(User {
            id: user_id,
            external_id,
            username: input.username.clone(),
            hashed_password: input.hashed_password.clone(),
            requires_password_change: false,
            password_last_changed_on: None,
            two_factor_secret: input.two_factor_secret.clone(),
            two_factor_secret_verified_on: None,
            service_admin_permissions,
            reputation,
            reputation_explanation: String::new(),
            avatar_src: None,
            created_on: inserted.created_on,
            last_updated_on: None,
            archived_on: None,
        })
    }

    #[tracing::instrument(skip_all, fields(user_id = %updated.id, changed_by = %changed_by))]
    async fn update_user(
        &self,
        updated: &User,
        changed_by: UserId,
        changes: Vec<FieldChangeSummary>,
    ) -> AppResult<u64> {
        let statement = build_update_query(
            &USERS,
            vec![
                ("username", updated.username.clone().into()),
                ("avatar_src", SqlValue::OptionalText(updated.avatar_src.clone())),
            ],
            updated.id.as_database(),
            None,
        );

        self.execute_audited(
            "update user",
            statement,
            AuditEvent::UserUpdated {
                performed_by: changed_by,
                user_id: updated.id,
                changes,
            },
        )
        .await
    }

    #[tracing::instrument(skip_all, fields(user_id = %user_id))]
    async fn update_user_password(&self, user_id: UserId, new_hash: &str) -> AppResult<u64> {
        let statement = build_update_query(
            &USERS,
            vec![
                ("hashed_password", new_hash.into()),
                ("requires_password_change", false.into()),
                ("password_last_changed_on", SqlValue::Timestamp(Utc::now())),
            ],
            user_id.as_database(),
            None,
        );

        self.execute_audited(
            "update user password",
            statement,
            AuditEvent::UserPasswordUpdated {
                performed_by: user_id,
                user_id,
            },
        )
        .await
    }

    #[tracing::instrument(
        skip_all,
        fields(
            user_id = %input.target_user_id,
            reputation = input.new_reputation.as_str(),
            changed_by = %changed_by,
        )
    )]
    async fn update_user_reputation(
        &self,
        input: &UserReputationUpdateInput,
        changed_by: UserId,
    ) -> AppResult<u64> {
        let statement = build_update_query(
            &USERS,
            vec![
                ("reputation", input.new_reputation.as_str().into()),
                ("reputation_explanation", input.reason.clone().into()),
            ],
            input.target_user_id.as_database(),
            None,
        );

        self.execute_audited(
            "update user reputation",
            statement,
            AuditEvent::UserReputationUpdated {
                performed_by: changed_by,
                user_id: input.target_user_id,
                reputation: input.new_reputation,
                reason: input.reason.clone(),
            },
        )
        .await
    }

    /// Archives the user, then each live membership with its own audit entry.
    #[tracing::instrument(skip_all, fields(user_id = %user_id, archived_by = %archived_by))]
    async fn archive_user(&self, user_id: UserId, archived_by: UserId) -> AppResult<u64> {
        let memberships = fetch_entities::<MembershipRow>(
            &self.pool,
            build_get_matching_query(
                &ACCOUNT_USER_MEMBERSHIPS,
                vec![("belongs_to_user", user_id.as_database().into())],
            ),
            "list memberships of archived user",
        )
        .await?;

        let (pending, affected) = self
            .begin_write("archive user")
            .await?
            .execute(build_archive_query(&USERS, user_id.as_database(), None))
            .await?;
        if affected == 0 {
            pending.abandon().await;
            return Ok(0);
        }

        let mut audited = pending
            .record(&AuditEvent::UserArchived {
                performed_by: archived_by,
                user_id,
            })
            .await?;

        for membership in memberships {
            let statement = build_archive_query(
                &ACCOUNT_USER_MEMBERSHIPS,
                membership.id.as_database(),
                Some(membership.belongs_to_account.as_database()),
            );
            audited = audited
                .then_audited(
                    statement,
                    &AuditEvent::UserRemovedFromAccount {
                        performed_by: archived_by,
                        account_id: membership.belongs_to_account,
                        user_id,
                        reason: ARCHIVED_USER_REASON.to_owned(),
                    },
                )
                .await?;
        }

        audited.commit().await?;
        Ok(affected)
    }

    #[tracing::instrument(skip_all, fields(user_id = %user_id))]
    async fn get_audit_log_entries_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<AuditLogEntry>> {
        fetch_audit_entries(&self.pool, AuditSubject::User(user_id)).await
    }
}
