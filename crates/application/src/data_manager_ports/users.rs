use async_trait::async_trait;
use todo_core::{AppResult, UserId};
use todo_domain::{
    AuditLogEntry, FieldChangeSummary, ListPage, QueryFilter, User, UserRegistrationInput,
    UserReputationUpdateInput,
};

/// Storage port for users.
#[async_trait]
pub trait UserDataManager: Send + Sync {
    /// Returns whether a live user exists.
    async fn user_exists(&self, user_id: UserId) -> AppResult<bool>;

    /// Returns a live user.
    async fn get_user(&self, user_id: UserId) -> AppResult<User>;

    /// Returns a live user by exact username.
    async fn get_user_by_username(&self, username: &str) -> AppResult<User>;

    /// Returns live users whose username starts with `query`.
    async fn search_for_users_by_username(&self, query: &str) -> AppResult<Vec<User>>;

    /// Counts every live user.
    async fn get_all_users_count(&self) -> AppResult<u64>;

    /// Lists users. Admin listing, no ownership.
    async fn get_users(&self, filter: Option<&QueryFilter>) -> AppResult<ListPage<User>>;

    /// Registers a user. The audit entry is attributed to the new user.
    async fn create_user(&self, input: &UserRegistrationInput) -> AppResult<User>;

    /// Persists an updated profile and its audit entry.
    async fn update_user(
        &self,
        updated: &User,
        changed_by: UserId,
        changes: Vec<FieldChangeSummary>,
    ) -> AppResult<u64>;

    /// Replaces the password hash and clears the forced-change flag.
    async fn update_user_password(&self, user_id: UserId, new_hash: &str) -> AppResult<u64>;

    /// Changes a user's standing. Admin action.
    async fn update_user_reputation(
        &self,
        input: &UserReputationUpdateInput,
        changed_by: UserId,
    ) -> AppResult<u64>;

    /// Archives a user and every membership the user holds.
    async fn archive_user(&self, user_id: UserId, archived_by: UserId) -> AppResult<u64>;

    /// Returns audit entries mentioning the user as subject.
    async fn get_audit_log_entries_for_user(&self, user_id: UserId)
    -> AppResult<Vec<AuditLogEntry>>;
}
