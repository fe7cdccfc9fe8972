/// Static description of one entity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    /// Table name.
    pub name: &'static str,
    /// Selected columns, in row decoding order.
    pub columns: &'static [&'static str],
    /// Column naming the owning row, for tenant-scoped tables.
    pub ownership_column: Option<&'static str>,
    /// Archivable tables carry `archived_on` and `last_updated_on`.
    pub archivable: bool,
}

/// `users`.
pub const USERS: TableSpec = TableSpec {
    name: "users",
    columns: &[
        "id",
        "external_id",
        "username",
        "avatar_src",
        "hashed_password",
        "requires_password_change",
        "password_last_changed_on",
        "two_factor_secret",
        "two_factor_secret_verified_on",
        "service_admin_permissions",
        "reputation",
        "reputation_explanation",
        "created_on",
        "last_updated_on",
        "archived_on",
    ],
    ownership_column: None,
    archivable: true,
};

/// `account_subscription_plans`.
pub const ACCOUNT_SUBSCRIPTION_PLANS: TableSpec = TableSpec {
    name: "account_subscription_plans",
    columns: &[
        "id",
        "external_id",
        "name",
        "description",
        "price",
        "period_days",
        "created_on",
        "last_updated_on",
        "archived_on",
    ],
    ownership_column: None,
    archivable: true,
};

/// `accounts`, owned by a user.
pub const ACCOUNTS: TableSpec = TableSpec {
    name: "accounts",
    columns: &[
        "id",
        "external_id",
        "name",
        "billing_status",
        "contact_email",
        "contact_phone",
        "payment_processor_customer_id",
        "subscription_plan_id",
        "default_user_permissions",
        "created_on",
        "last_updated_on",
        "archived_on",
        "belongs_to_user",
    ],
    ownership_column: Some("belongs_to_user"),
    archivable: true,
};

/// `account_user_memberships`, owned by an account.
pub const ACCOUNT_USER_MEMBERSHIPS: TableSpec = TableSpec {
    name: "account_user_memberships",
    columns: &[
        "id",
        "belongs_to_user",
        "belongs_to_account",
        "user_account_permissions",
        "default_account",
        "created_on",
        "last_updated_on",
        "archived_on",
    ],
    ownership_column: Some("belongs_to_account"),
    archivable: true,
};

/// `api_clients`, owned by a user.
pub const API_CLIENTS: TableSpec = TableSpec {
    name: "api_clients",
    columns: &[
        "id",
        "external_id",
        "name",
        "client_id",
        "secret_key",
        "created_on",
        "last_updated_on",
        "archived_on",
        "belongs_to_user",
    ],
    ownership_column: Some("belongs_to_user"),
    archivable: true,
};

/// `webhooks`, owned by an account.
pub const WEBHOOKS: TableSpec = TableSpec {
    name: "webhooks",
    columns: &[
        "id",
        "external_id",
        "name",
        "content_type",
        "url",
        "method",
        "events",
        "data_types",
        "topics",
        "created_on",
        "last_updated_on",
        "archived_on",
        "belongs_to_account",
    ],
    ownership_column: Some("belongs_to_account"),
    archivable: true,
};

/// `items`, owned by an account.
pub const ITEMS: TableSpec = TableSpec {
    name: "items",
    columns: &[
        "id",
        "external_id",
        "name",
        "details",
        "created_on",
        "last_updated_on",
        "archived_on",
        "belongs_to_account",
    ],
    ownership_column: Some("belongs_to_account"),
    archivable: true,
};

/// `audit_log`. Append-only: never updated or archived.
pub const AUDIT_LOG: TableSpec = TableSpec {
    name: "audit_log",
    columns: &["id", "event_type", "context", "created_on"],
    ownership_column: None,
    archivable: false,
};
