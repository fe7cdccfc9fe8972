use std::sync::Arc;

use todo_core::AppError;
use todo_domain::{
    AccountUserPermission, AccountUserPermissions, ServiceAdminPermission,
    ServiceAdminPermissions, UserReputation,
};

use super::ActorResolver;
use crate::test_support::{
    FakeMembershipDataManager, FakeUserDataManager, account_id, actor_with, sample_membership,
    sample_user, user_id,
};

#[test]
fn account_permission_checks_follow_the_mask() {
    let actor = actor_with(
        1,
        10,
        AccountUserPermissions::from(AccountUserPermission::CreateItems),
        ServiceAdminPermissions::none(),
    );

    assert!(
        actor
            .require_account_permission(AccountUserPermission::CreateItems)
            .is_ok()
    );
    assert!(matches!(
        actor.require_account_permission(AccountUserPermission::ArchiveItems),
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        actor.require_service_admin_permission(ServiceAdminPermission::BanUsers),
        Err(AppError::Forbidden(_))
    ));
}

#[test]
fn delegation_is_limited_to_held_bits_unless_superuser() {
    let held = AccountUserPermissions::member_defaults();
    let member = actor_with(1, 10, held, ServiceAdminPermissions::none());
    let superuser = actor_with(
        2,
        10,
        AccountUserPermissions::all(),
        ServiceAdminPermissions::none(),
    );
    let escalated = held.grant(AccountUserPermission::TransferAccountOwnership);

    assert!(member.require_can_delegate(held).is_ok());
    assert!(matches!(
        member.require_can_delegate(escalated),
        Err(AppError::Forbidden(_))
    ));
    assert!(superuser.require_can_delegate(escalated).is_ok());
}

#[tokio::test]
async fn resolver_uses_default_account_and_membership_mask() {
    let mut user = sample_user(1);
    user.service_admin_permissions = ServiceAdminPermission::BanUsers.into();
    let resolver = ActorResolver::new(
        Arc::new(FakeUserDataManager::with_users(vec![user])),
        Arc::new(FakeMembershipDataManager::with_memberships(vec![
            sample_membership(1, 1, 10, AccountUserPermissions::member_defaults()),
        ])),
    );

    let actor = resolver
        .resolve(user_id(1), None)
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(actor.account_id(), account_id(10));
    assert_eq!(
        actor.account_permissions(),
        AccountUserPermissions::member_defaults()
    );
    assert!(
        actor
            .service_admin_permissions()
            .has(ServiceAdminPermission::BanUsers)
    );
}

#[tokio::test]
async fn resolver_rejects_non_members_and_banned_users() {
    let mut banned = sample_user(2);
    banned.reputation = UserReputation::Banned;
    let resolver = ActorResolver::new(
        Arc::new(FakeUserDataManager::with_users(vec![sample_user(1), banned])),
        Arc::new(FakeMembershipDataManager::with_memberships(vec![
            sample_membership(1, 1, 10, AccountUserPermissions::member_defaults()),
            sample_membership(2, 2, 10, AccountUserPermissions::member_defaults()),
        ])),
    );

    let outsider = resolver.resolve(user_id(1), Some(account_id(99))).await;
    let banned = resolver.resolve(user_id(2), Some(account_id(10))).await;

    assert!(matches!(outsider, Err(AppError::Forbidden(_))));
    assert!(matches!(banned, Err(AppError::Forbidden(_))));
}
