use async_trait::async_trait;
use todo_application::AccountUserMembershipDataManager;
use todo_core::{AccountId, AppResult, MembershipId, UserId};
use todo_domain::{
    AccountUserMembership, AddUserToAccountInput, AuditEvent, ListPage,
    ModifyUserPermissionsInput, QueryFilter, TransferAccountOwnershipInput,
};

use super::PostgresQuerier;
use super::reads::{fetch_entities, fetch_entity, fetch_list};
use super::rows::MembershipRow;
use crate::query_builder::{
    ACCOUNT_USER_MEMBERSHIPS, ACCOUNTS, ListScope, SqlValue, build_archive_matching_query,
    build_copy_column_query, build_get_matching_query, build_insert_query,
    build_update_matching_query, build_update_query,
};

fn membership_of(user_id: UserId, account_id: AccountId) -> Vec<(&'static str, SqlValue)> {
    vec![
        ("belongs_to_user", user_id.as_database().into()),
        ("belongs_to_account", account_id.as_database().into()),
    ]
}

#[async_trait]
impl AccountUserMembershipDataManager for PostgresQuerier {
    #[tracing::instrument(skip_all, fields(user_id = %user_id))]
    async fn get_default_account_id_for_user(&self, user_id: UserId) -> AppResult<AccountId> {
        let membership = fetch_entity::<MembershipRow>(
            &self.pool,
            build_get_matching_query(
                &ACCOUNT_USER_MEMBERSHIPS,
                vec![
                    ("belongs_to_user", user_id.as_database().into()),
                    ("default_account", true.into()),
                ],
            ),
            &format!("default account for user '{user_id}'"),
        )
        .await?;

        Ok(membership.belongs_to_account)
    }

    #[tracing::instrument(skip_all, fields(user_id = %user_id, account_id = %account_id))]
    async fn user_is_member_of_account(
        &self,
        user_id: UserId,
        account_id: AccountId,
    ) -> AppResult<bool> {
        let memberships = fetch_entities::<MembershipRow>(
            &self.pool,
            build_get_matching_query(
                &ACCOUNT_USER_MEMBERSHIPS,
                membership_of(user_id, account_id),
            ),
            "check account membership",
        )
        .await?;

        Ok(!memberships.is_empty())
    }

    #[tracing::instrument(skip_all, fields(user_id = %user_id))]
    async fn get_memberships_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<AccountUserMembership>> {
        fetch_entities::<MembershipRow>(
            &self.pool,
            build_get_matching_query(
                &ACCOUNT_USER_MEMBERSHIPS,
                vec![("belongs_to_user", user_id.as_database().into())],
            ),
            "list memberships for user",
        )
        .await
    }

    #[tracing::instrument(
        skip_all,
        fields(
            account_id = %account_id,
            page = filter.map(QueryFilter::effective_page),
            limit = filter.map(QueryFilter::effective_limit),
        )
    )]
    async fn get_account_memberships(
        &self,
        account_id: AccountId,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<AccountUserMembership>> {
        fetch_list::<MembershipRow>(
            &self.pool,
            &ACCOUNT_USER_MEMBERSHIPS,
            ListScope::Owner(account_id.as_database()),
            filter,
            "list account memberships",
        )
        .await
    }

    #[tracing::instrument(
        skip_all,
        fields(user_id = %input.user_id, account_id = %input.account_id, added_by = %added_by)
    )]
    async fn add_user_to_account(
        &self,
        input: &AddUserToAccountInput,
        added_by: UserId,
    ) -> AppResult<AccountUserMembership> {
        let mut values = membership_of(input.user_id, input.account_id);
        values.push((
            "user_account_permissions",
            input.account_permissions.as_database().into(),
        ));
        values.push(("default_account", false.into()));

        let (pending, inserted) = self
            .begin_write("add user to account")
            .await?
            .insert(build_insert_query(&ACCOUNT_USER_MEMBERSHIPS, values))
            .await?;
        let (pending, membership_id) = pending
            .check(MembershipId::from_database(inserted.id))
            .await?;

        pending
            .record(&AuditEvent::UserAddedToAccount {
                performed_by: added_by,
                account_id: input.account_id,
                user_id: input.user_id,
                membership_id,
                permissions: input.account_permissions,
                reason: input.reason.clone(),
            })
            .await?
            .commit()
            .await?;

        Ok(AccountUserMembership {
            id: membership_id,
            belongs_to_user: input.user_id,
            belongs_to_account: input.account_id,
            account_permissions: input.account_permissions,
            default_account: false,
            created_on: inserted.created_on,
            last_updated_on: None,
            archived_on: None,
        })
    }

    #[tracing::instrument(
        skip_all,
        fields(user_id = %user_id, account_id = %account_id, changed_by = %changed_by)
    )]
    async fn modify_user_permissions(
        &self,
        user_id: UserId,
        account_id: AccountId,
        changed_by: UserId,
        input: &ModifyUserPermissionsInput,
    ) -> AppResult<u64> {
        let statement = build_update_matching_query(
            &ACCOUNT_USER_MEMBERSHIPS,
            vec![(
                "user_account_permissions",
                input.new_permissions.as_database().into(),
            )],
            membership_of(user_id, account_id),
        );

        self.execute_audited(
            "modify user permissions",
            statement,
            AuditEvent::UserPermissionsModified {
                performed_by: changed_by,
                account_id,
                user_id,
                permissions: input.new_permissions,
                reason: input.reason.clone(),
            },
        )
        .await
    }

    /// Clears every default flag the user holds, then sets the one for
    /// `account_id`. Rolls back when the user is not a member.
    #[tracing::instrument(
        skip_all,
        fields(user_id = %user_id, account_id = %account_id, changed_by = %changed_by)
    )]
    async fn mark_account_as_user_default(
        &self,
        user_id: UserId,
        account_id: AccountId,
        changed_by: UserId,
    ) -> AppResult<u64> {
        let clear_defaults = build_update_matching_query(
            &ACCOUNT_USER_MEMBERSHIPS,
            vec![("default_account", false.into())],
            vec![("belongs_to_user", user_id.as_database().into())],
        );
        let set_default = build_update_matching_query(
            &ACCOUNT_USER_MEMBERSHIPS,
            vec![("default_account", true.into())],
            membership_of(user_id, account_id),
        );

        let (pending, _) = self
            .begin_write("mark account as user default")
            .await?
            .execute(clear_defaults)
            .await?;
        let (pending, affected) = pending.execute(set_default).await?;
        if affected == 0 {
            pending.abandon().await;
            return Ok(0);
        }

        pending
            .record(&AuditEvent::AccountMarkedAsDefault {
                performed_by: changed_by,
                account_id,
                user_id,
            })
            .await?
            .commit()
            .await?;

        Ok(affected)
    }

    #[tracing::instrument(
        skip_all,
        fields(user_id = %user_id, account_id = %account_id, removed_by = %removed_by)
    )]
    async fn remove_user_from_account(
        &self,
        user_id: UserId,
        account_id: AccountId,
        removed_by: UserId,
        reason: &str,
    ) -> AppResult<u64> {
        self.execute_audited(
            "remove user from account",
            build_archive_matching_query(
                &ACCOUNT_USER_MEMBERSHIPS,
                membership_of(user_id, account_id),
            ),
            AuditEvent::UserRemovedFromAccount {
                performed_by: removed_by,
                account_id,
                user_id,
                reason: reason.to_owned(),
            },
        )
        .await
    }

    /// Reassigns the account only while `current_owner` still owns it, then
    /// grants the new owner the previous owner's mask.
    #[tracing::instrument(
        skip_all,
        fields(
            account_id = %account_id,
            current_owner = %input.current_owner,
            new_owner = %input.new_owner,
        )
    )]
    async fn transfer_account_ownership(
        &self,
        account_id: AccountId,
        transferred_by: UserId,
        input: &TransferAccountOwnershipInput,
    ) -> AppResult<u64> {
        let reassign = build_update_query(
            &ACCOUNTS,
            vec![("belongs_to_user", input.new_owner.as_database().into())],
            account_id.as_database(),
            Some(input.current_owner.as_database()),
        );

        let (pending, affected) = self
            .begin_write("transfer account ownership")
            .await?
            .execute(reassign)
            .await?;
        if affected == 0 {
            pending.abandon().await;
            return Ok(0);
        }

        let (pending, _) = pending
            .execute(build_copy_column_query(
                &ACCOUNT_USER_MEMBERSHIPS,
                "user_account_permissions",
                membership_of(input.new_owner, account_id),
                membership_of(input.current_owner, account_id),
            ))
            .await?;

        pending
            .record(&AuditEvent::AccountOwnershipTransferred {
                performed_by: transferred_by,
                account_id,
                previous_owner: input.current_owner,
                new_owner: input.new_owner,
                reason: input.reason.clone(),
            })
            .await?
            .commit()
            .await?;

        Ok(affected)
    }
}
