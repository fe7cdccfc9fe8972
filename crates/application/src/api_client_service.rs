//! API client issuance and revocation.

use std::sync::Arc;

use todo_core::{ApiClientId, AppError, AppResult};
use todo_domain::{
    AccountUserPermission, ApiClient, ApiClientCreationInput, AuditLogEntry, ListPage,
    QueryFilter,
};

use crate::Actor;
use crate::data_manager_ports::ApiClientDataManager;

/// Application service for the acting user's API clients.
#[derive(Clone)]
pub struct ApiClientService {
    api_clients: Arc<dyn ApiClientDataManager>,
}

impl ApiClientService {
    /// Creates a new API client service.
    #[must_use]
    pub fn new(api_clients: Arc<dyn ApiClientDataManager>) -> Self {
        Self { api_clients }
    }

    /// Looks up a client by its public id, for credential checks.
    pub async fn find_by_client_id(&self, client_id: &str) -> AppResult<ApiClient> {
        if client_id.trim().is_empty() {
            return Err(AppError::Validation("client id must not be empty".to_owned()));
        }

        self.api_clients.get_api_client_by_client_id(client_id).await
    }

    /// Returns one of the actor's clients.
    pub async fn get_api_client(
        &self,
        actor: &Actor,
        api_client_id: ApiClientId,
    ) -> AppResult<ApiClient> {
        self.api_clients
            .get_api_client_by_database_id(api_client_id, actor.user_id())
            .await
    }

    /// Lists the actor's clients.
    pub async fn list_api_clients(
        &self,
        actor: &Actor,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<ApiClient>> {
        self.api_clients
            .get_api_clients(actor.user_id(), filter)
            .await
    }

    /// Issues a client owned by the actor.
    pub async fn create_api_client(
        &self,
        actor: &Actor,
        mut input: ApiClientCreationInput,
    ) -> AppResult<ApiClient> {
        actor.require_account_permission(AccountUserPermission::ManageApiClients)?;
        input.belongs_to_user = actor.user_id();
        input.validate()?;

        self.api_clients
            .create_api_client(&input, actor.user_id())
            .await
    }

    /// Revokes one of the actor's clients.
    pub async fn archive_api_client(
        &self,
        actor: &Actor,
        api_client_id: ApiClientId,
    ) -> AppResult<()> {
        actor.require_account_permission(AccountUserPermission::ManageApiClients)?;

        let affected = self
            .api_clients
            .archive_api_client(api_client_id, actor.user_id(), actor.user_id())
            .await?;
        if affected == 0 {
            return Err(AppError::NotFound(format!(
                "api client '{api_client_id}' was not found"
            )));
        }

        Ok(())
    }

    /// Returns the audit trail of one of the actor's clients.
    pub async fn api_client_audit_log(
        &self,
        actor: &Actor,
        api_client_id: ApiClientId,
    ) -> AppResult<Vec<AuditLogEntry>> {
        self.api_clients
            .get_api_client_by_database_id(api_client_id, actor.user_id())
            .await?;

        self.api_clients
            .get_audit_log_entries_for_api_client(api_client_id)
            .await
    }
}
