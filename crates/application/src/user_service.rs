//! User registration and self-service profile operations.
//!
//! Passwords arrive already hashed; hashing and session issuance live
//! outside this crate.

use std::sync::Arc;

use todo_core::{AppError, AppResult, UserId};
use todo_domain::{
    AuditLogEntry, ServiceAdminPermission, User, UserRegistrationInput, UserUpdateInput,
    validate_username,
};

use crate::Actor;
use crate::data_manager_ports::UserDataManager;

/// Shortest prefix accepted by username search.
pub const USERNAME_SEARCH_MIN_LENGTH: usize = 3;

/// Application service for user records.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserDataManager>,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(users: Arc<dyn UserDataManager>) -> Self {
        Self { users }
    }

    /// Registers a new user.
    pub async fn register(&self, input: UserRegistrationInput) -> AppResult<User> {
        input.validate()?;
        self.users.create_user(&input).await
    }

    /// Returns the acting user.
    pub async fn current_user(&self, actor: &Actor) -> AppResult<User> {
        self.users.get_user(actor.user_id()).await
    }

    /// Finds users whose name starts with `query`.
    pub async fn search_by_username(&self, query: &str) -> AppResult<Vec<User>> {
        let query = query.trim();
        if query.chars().count() < USERNAME_SEARCH_MIN_LENGTH {
            return Err(AppError::Validation(format!(
                "username search needs at least {USERNAME_SEARCH_MIN_LENGTH} characters"
            )));
        }

        self.users.search_for_users_by_username(query).await
    }

    /// Updates the acting user's profile.
    pub async fn update_profile(&self, actor: &Actor, input: UserUpdateInput) -> AppResult<User> {
        input.validate()?;

        let mut user = self.users.get_user(actor.user_id()).await?;
        let changes = user.update(input);
        if changes.is_empty() {
            return Ok(user);
        }

        let affected = self
            .users
            .update_user(&user, actor.user_id(), changes)
            .await?;
        if affected == 0 {
            return Err(AppError::NotFound(format!(
                "user '{}' was not found",
                actor.user_id()
            )));
        }

        Ok(user)
    }

    /// Replaces the acting user's password hash.
    pub async fn change_password(&self, actor: &Actor, new_hash: &str) -> AppResult<()> {
        if new_hash.trim().is_empty() {
            return Err(AppError::Validation(
                "password hash must not be empty".to_owned(),
            ));
        }

        let affected = self
            .users
            .update_user_password(actor.user_id(), new_hash)
            .await?;
        if affected == 0 {
            return Err(AppError::NotFound(format!(
                "user '{}' was not found",
                actor.user_id()
            )));
        }

        Ok(())
    }

    /// Archives the acting user and every membership the user holds.
    pub async fn archive_self(&self, actor: &Actor) -> AppResult<()> {
        let affected = self
            .users
            .archive_user(actor.user_id(), actor.user_id())
            .await?;
        if affected == 0 {
            return Err(AppError::NotFound(format!(
                "user '{}' was not found",
                actor.user_id()
            )));
        }

        Ok(())
    }

    /// Returns audit entries about `user_id`.
    ///
    /// Users may read their own trail; others need `read_audit_log`.
    pub async fn user_audit_log(
        &self,
        actor: &Actor,
        user_id: UserId,
    ) -> AppResult<Vec<AuditLogEntry>> {
        if user_id != actor.user_id() {
            actor.require_service_admin_permission(ServiceAdminPermission::ReadAuditLog)?;
        }

        self.users.get_audit_log_entries_for_user(user_id).await
    }

    /// Checks whether `username` is well-formed and unclaimed.
    pub async fn username_is_available(&self, username: &str) -> AppResult<bool> {
        validate_username(username)?;

        match self.users.get_user_by_username(username).await {
            Ok(_) => Ok(false),
            Err(error) if error.is_not_found() => Ok(true),
            Err(error) => Err(error),
        }
    }
}
