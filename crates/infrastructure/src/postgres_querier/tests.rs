use std::str::FromStr;

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use todo_application::{
    AccountDataManager, AccountUserMembershipDataManager, AuditLogEntryDataManager,
    ItemDataManager, UserDataManager,
};
use todo_core::{AccountId, AppError, ItemId, UserId};
use todo_domain::fakes::{
    fake_account_creation_input, fake_add_user_to_account_input, fake_user_registration_input,
};
use todo_domain::{
    Account, AuditEvent, Item, ItemCreationInput, QueryFilter, TransferAccountOwnershipInput,
    User,
};
use uuid::Uuid;

use super::PostgresQuerier;
use crate::query_builder::{ITEMS, Statement, build_insert_query};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres querier tests: {error}");
    }

    Some(pool)
}

/// Pool whose connections resolve tables in a new, freshly migrated schema.
///
/// Returns the scoped pool and the schema name; drop it with [`drop_schema`].
async fn isolated_schema_pool() -> Option<(PgPool, String)> {
    let pool = test_pool().await?;
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let schema = format!("querier_test_{}", Uuid::new_v4().simple());
    if let Err(error) = sqlx::query(&format!("CREATE SCHEMA {schema}"))
        .execute(&pool)
        .await
    {
        panic!("failed to create test schema {schema}: {error}");
    }

    let options = match PgConnectOptions::from_str(database_url.as_str()) {
        Ok(options) => options.options([("search_path", schema.as_str())]),
        Err(error) => panic!("failed to parse DATABASE_URL in test: {error}"),
    };
    let scoped = match PgPoolOptions::new()
        .max_connections(2)
        .connect_with(options)
        .await
    {
        Ok(scoped) => scoped,
        Err(error) => panic!("failed to connect to test schema {schema}: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&scoped).await {
        panic!("failed to migrate test schema {schema}: {error}");
    }

    Some((scoped, schema))
}

async fn drop_schema(scoped: PgPool, schema: &str) {
    let result = sqlx::query(&format!("DROP SCHEMA {schema} CASCADE"))
        .execute(&scoped)
        .await;
    scoped.close().await;

    if let Err(error) = result {
        panic!("failed to drop test schema {schema}: {error}");
    }
}

async fn create_user(querier: &PostgresQuerier) -> User {
    match querier.create_user(&fake_user_registration_input()).await {
        Ok(user) => user,
        Err(error) => panic!("failed to create test user: {error}"),
    }
}

async fn create_account(querier: &PostgresQuerier, owner: UserId) -> Account {
    match querier
        .create_account(&fake_account_creation_input(owner), owner)
        .await
    {
        Ok(account) => account,
        Err(error) => panic!("failed to create test account: {error}"),
    }
}

async fn create_item(
    querier: &PostgresQuerier,
    account_id: AccountId,
    created_by: UserId,
    name: &str,
) -> Item {
    let input = ItemCreationInput {
        name: name.to_owned(),
        details: "2%".to_owned(),
        belongs_to_account: account_id,
    };

    match querier.create_item(&input, created_by).await {
        Ok(item) => item,
        Err(error) => panic!("failed to create test item: {error}"),
    }
}

#[tokio::test]
async fn created_item_is_listed_for_its_account_only() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let querier = PostgresQuerier::new(pool);
    let user = create_user(&querier).await;
    let account = create_account(&querier, user.id).await;
    let other_account = create_account(&querier, user.id).await;

    let item = create_item(&querier, account.id, user.id, "milk").await;

    let listed = querier.get_items(account.id, None).await;
    assert!(listed.is_ok());
    let listed = listed.unwrap_or_else(|_| unreachable!());
    assert_eq!(listed.data.len(), 1);
    assert_eq!(listed.pagination.filtered_count, 1);
    assert_eq!(listed.pagination.total_count, 1);
    assert_eq!(listed.data[0].name, "milk");
    assert_eq!(listed.data[0].details, "2%");

    let fetched = querier.get_item(item.id, account.id).await;
    assert!(fetched.is_ok());
    let fetched = fetched.unwrap_or_else(|_| unreachable!());
    assert_eq!(fetched.external_id, item.external_id);
    assert_eq!(fetched.created_on, item.created_on);

    let elsewhere = querier.get_items(other_account.id, None).await;
    assert!(elsewhere.is_ok());
    let elsewhere = elsewhere.unwrap_or_else(|_| unreachable!());
    assert!(elsewhere.data.is_empty());
    assert_eq!(elsewhere.pagination.total_count, 0);

    let missing = querier.get_item(item.id, other_account.id).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn archive_is_owner_scoped_and_idempotent() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let querier = PostgresQuerier::new(pool);
    let user = create_user(&querier).await;
    let account = create_account(&querier, user.id).await;
    let other_account = create_account(&querier, user.id).await;
    let item = create_item(&querier, account.id, user.id, "eggs").await;

    let foreign = querier.archive_item(item.id, other_account.id, user.id).await;
    assert!(matches!(foreign, Ok(0)));
    assert!(matches!(
        querier.item_exists(item.id, account.id).await,
        Ok(true)
    ));

    let archived = querier.archive_item(item.id, account.id, user.id).await;
    assert!(matches!(archived, Ok(1)));
    let repeated = querier.archive_item(item.id, account.id, user.id).await;
    assert!(matches!(repeated, Ok(0)));

    assert!(matches!(
        querier.item_exists(item.id, account.id).await,
        Ok(false)
    ));

    let entries = querier.get_audit_log_entries_for_item(item.id).await;
    assert!(entries.is_ok());
    let events = entries
        .unwrap_or_default()
        .into_iter()
        .map(|entry| entry.event.event_type())
        .collect::<Vec<_>>();
    assert_eq!(events, vec!["item_created", "item_archived"]);
}

#[tokio::test]
async fn update_records_field_changes() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let querier = PostgresQuerier::new(pool);
    let user = create_user(&querier).await;
    let account = create_account(&querier, user.id).await;
    let mut item = create_item(&querier, account.id, user.id, "bread").await;

    let changes = item.update(todo_domain::ItemUpdateInput {
        name: None,
        details: Some("sourdough".to_owned()),
    });
    let updated = querier.update_item(&item, user.id, changes).await;
    assert!(matches!(updated, Ok(1)));

    let fetched = querier.get_item(item.id, account.id).await;
    assert!(fetched.is_ok());
    let fetched = fetched.unwrap_or_else(|_| unreachable!());
    assert_eq!(fetched.details, "sourdough");
    assert!(fetched.last_updated_on.is_some());

    let entries = querier
        .get_audit_log_entries_for_item(item.id)
        .await
        .unwrap_or_default();
    assert!(entries.iter().any(|entry| matches!(
        &entry.event,
        AuditEvent::ItemUpdated { changes, .. }
            if changes.len() == 1 && changes[0].field_name == "details"
    )));
}

#[tokio::test]
async fn items_with_ids_keep_requested_order() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let querier = PostgresQuerier::new(pool);
    let user = create_user(&querier).await;
    let account = create_account(&querier, user.id).await;
    let first = create_item(&querier, account.id, user.id, "first").await;
    let second = create_item(&querier, account.id, user.id, "second").await;
    let third = create_item(&querier, account.id, user.id, "third").await;

    let fetched = querier
        .get_items_with_ids(account.id, 2, &[third.id, first.id, second.id])
        .await;
    assert!(fetched.is_ok());
    let ids = fetched
        .unwrap_or_default()
        .into_iter()
        .map(|item| item.id)
        .collect::<Vec<ItemId>>();
    assert_eq!(ids, vec![third.id, first.id]);
}

#[tokio::test]
async fn failed_audit_insert_rolls_back_the_mutation() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let querier = PostgresQuerier::new(pool);
    let user = create_user(&querier).await;
    let account = create_account(&querier, user.id).await;

    let insert = build_insert_query(
        &ITEMS,
        vec![
            ("external_id", "orphaned-item".into()),
            ("name", "orphan".into()),
            ("details", "".into()),
            ("belongs_to_account", account.id.as_database().into()),
        ],
    );
    let broken_audit = Statement {
        sql: "INSERT INTO audit_log (event_type) VALUES ($1)".to_owned(),
        args: vec!["item_created".into()],
    };

    let pending = querier.begin_write("create item").await;
    assert!(pending.is_ok());
    let inserted = pending
        .unwrap_or_else(|_| unreachable!())
        .insert(insert)
        .await;
    assert!(inserted.is_ok());
    let (pending, _) = inserted.unwrap_or_else(|_| unreachable!());

    let audited = pending.insert_audit(broken_audit).await;
    assert!(matches!(audited, Err(AppError::Audit { .. })));

    let listed = querier.get_items(account.id, None).await;
    assert!(listed.is_ok());
    assert!(listed.unwrap_or_else(|_| unreachable!()).data.is_empty());
}

#[tokio::test]
async fn account_creation_adds_default_owner_membership() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let querier = PostgresQuerier::new(pool);
    let user = create_user(&querier).await;
    let account = create_account(&querier, user.id).await;

    assert!(matches!(
        querier.user_is_member_of_account(user.id, account.id).await,
        Ok(true)
    ));
    let default_account = querier.get_default_account_id_for_user(user.id).await;
    assert!(matches!(default_account, Ok(id) if id == account.id));

    let duplicate = querier
        .add_user_to_account(&fake_add_user_to_account_input(user.id, account.id), user.id)
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let events = querier
        .get_audit_log_entries_for_account(account.id)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|entry| entry.event.event_type())
        .collect::<Vec<_>>();
    assert_eq!(events, vec!["account_created", "user_added_to_account"]);
}

#[tokio::test]
async fn marking_a_default_account_clears_the_previous_one() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let querier = PostgresQuerier::new(pool);
    let user = create_user(&querier).await;
    let first = create_account(&querier, user.id).await;
    let second = create_account(&querier, user.id).await;

    let marked = querier
        .mark_account_as_user_default(user.id, second.id, user.id)
        .await;
    assert!(matches!(marked, Ok(1)));

    let memberships = querier
        .get_memberships_for_user(user.id)
        .await
        .unwrap_or_default();
    let defaults = memberships
        .iter()
        .filter(|membership| membership.default_account)
        .map(|membership| membership.belongs_to_account)
        .collect::<Vec<_>>();
    assert_eq!(defaults, vec![second.id]);
    assert_ne!(defaults[0], first.id);

    let stranger = create_user(&querier).await;
    let refused = querier
        .mark_account_as_user_default(stranger.id, first.id, stranger.id)
        .await;
    assert!(matches!(refused, Ok(0)));
}

#[tokio::test]
async fn ownership_transfer_requires_the_current_owner() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let querier = PostgresQuerier::new(pool);
    let owner = create_user(&querier).await;
    let successor = create_user(&querier).await;
    let account = create_account(&querier, owner.id).await;

    let added = querier
        .add_user_to_account(
            &fake_add_user_to_account_input(successor.id, account.id),
            owner.id,
        )
        .await;
    assert!(added.is_ok());

    let wrong_owner = TransferAccountOwnershipInput {
        current_owner: successor.id,
        new_owner: owner.id,
        reason: "mistake".to_owned(),
    };
    assert!(matches!(
        querier
            .transfer_account_ownership(account.id, owner.id, &wrong_owner)
            .await,
        Ok(0)
    ));

    let transfer = TransferAccountOwnershipInput {
        current_owner: owner.id,
        new_owner: successor.id,
        reason: "handover".to_owned(),
    };
    assert!(matches!(
        querier
            .transfer_account_ownership(account.id, owner.id, &transfer)
            .await,
        Ok(1)
    ));

    assert!(querier.get_account(account.id, successor.id).await.is_ok());
    assert!(matches!(
        querier.get_account(account.id, owner.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn archiving_a_user_archives_memberships() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let querier = PostgresQuerier::new(pool);
    let user = create_user(&querier).await;
    let account = create_account(&querier, user.id).await;

    assert!(matches!(querier.archive_user(user.id, user.id).await, Ok(1)));
    assert!(matches!(querier.user_exists(user.id).await, Ok(false)));
    assert!(matches!(
        querier.user_is_member_of_account(user.id, account.id).await,
        Ok(false)
    ));

    let events = querier
        .get_audit_log_entries_for_user(user.id)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|entry| entry.event.event_type())
        .collect::<Vec<_>>();
    assert_eq!(
        events,
        vec![
            "user_created",
            "user_added_to_account",
            "user_archived",
            "user_removed_from_account",
        ]
    );
}

#[tokio::test]
async fn username_search_matches_prefix_literally() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let querier = PostgresQuerier::new(pool);
    let user = create_user(&querier).await;
    let prefix: String = user.username.chars().take(user.username.len() - 1).collect();

    let found = querier.search_for_users_by_username(&prefix).await;
    assert!(found.is_ok());
    assert!(
        found
            .unwrap_or_default()
            .iter()
            .any(|candidate| candidate.id == user.id)
    );

    let wildcard = querier.search_for_users_by_username("%%%").await;
    assert!(wildcard.is_ok());
    assert!(wildcard.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn streaming_export_closes_the_channel() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let querier = PostgresQuerier::new(pool);
    let user = create_user(&querier).await;
    let account = create_account(&querier, user.id).await;
    create_item(&querier, account.id, user.id, "exported").await;

    let (sender, mut receiver) = tokio::sync::mpsc::channel(4);
    assert!(querier.get_all_items(sender, 50).await.is_ok());

    // Ends only once every batch task dropped its sender.
    while let Some(batch) = receiver.recv().await {
        assert!(!batch.is_empty());
    }

    let (sender, _receiver) = tokio::sync::mpsc::channel(1);
    let rejected = querier.get_all_items(sender, 0).await;
    assert!(matches!(rejected, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn streaming_an_empty_table_closes_the_channel_without_batches() {
    let Some((scoped, schema)) = isolated_schema_pool().await else {
        return;
    };

    let querier = PostgresQuerier::new(scoped.clone());

    let (item_sender, mut item_receiver) = tokio::sync::mpsc::channel(1);
    let items_streamed = querier.get_all_items(item_sender, 10).await;
    let first_item_batch = item_receiver.recv().await;

    let (entry_sender, mut entry_receiver) = tokio::sync::mpsc::channel(1);
    let entries_streamed = querier.get_all_audit_log_entries(entry_sender, 1).await;
    let first_entry_batch = entry_receiver.recv().await;

    drop_schema(scoped, &schema).await;

    assert!(items_streamed.is_ok());
    assert!(first_item_batch.is_none());
    assert!(entries_streamed.is_ok());
    assert!(first_entry_batch.is_none());
}

#[tokio::test]
async fn export_ranges_follow_ids_from_the_first_row() {
    let Some((scoped, schema)) = isolated_schema_pool().await else {
        return;
    };

    let querier = PostgresQuerier::new(scoped.clone());
    let user = create_user(&querier).await;
    let account = create_account(&querier, user.id).await;
    let mut items = Vec::new();
    for name in ["first", "second", "third", "fourth"] {
        items.push(create_item(&querier, account.id, user.id, name).await);
    }
    for item in &items[..2] {
        let archived = querier.archive_item(item.id, account.id, user.id).await;
        assert!(matches!(archived, Ok(1)));
    }

    // Two live rows make one range of two ids, starting at the lowest id.
    let (sender, mut receiver) = tokio::sync::mpsc::channel(4);
    let streamed = querier.get_all_items(sender, 2).await;
    let mut exported = Vec::new();
    while let Some(batch) = receiver.recv().await {
        exported.extend(batch.into_iter().map(|item| item.id));
    }
    exported.sort();

    drop_schema(scoped, &schema).await;

    assert!(streamed.is_ok());
    assert_eq!(exported, vec![items[0].id, items[1].id]);
}

#[tokio::test]
async fn audit_log_listing_is_paginated() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let querier = PostgresQuerier::new(pool);
    create_user(&querier).await;

    let filter = QueryFilter {
        limit: 1,
        ..QueryFilter::default()
    };
    let page = querier.get_audit_log_entries(Some(&filter)).await;
    assert!(page.is_ok());
    let page = page.unwrap_or_else(|_| unreachable!());
    assert_eq!(page.data.len(), 1);
    assert!(page.pagination.total_count >= 1);
    assert_eq!(page.pagination.limit, 1);

    let first = page.data[0].id;
    let fetched = querier.get_audit_log_entry(first).await;
    assert!(matches!(fetched, Ok(entry) if entry.id == first));
}
