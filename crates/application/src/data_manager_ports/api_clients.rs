use async_trait::async_trait;
use todo_core::{ApiClientId, AppResult, UserId};
use todo_domain::{ApiClient, ApiClientCreationInput, AuditLogEntry, ListPage, QueryFilter};

/// Storage port for API clients.
#[async_trait]
pub trait ApiClientDataManager: Send + Sync {
    /// Returns a live client by its public client id.
    async fn get_api_client_by_client_id(&self, client_id: &str) -> AppResult<ApiClient>;

    /// Returns a live client owned by the user.
    async fn get_api_client_by_database_id(
        &self,
        api_client_id: ApiClientId,
        user_id: UserId,
    ) -> AppResult<ApiClient>;

    /// Counts every live client.
    async fn get_all_api_clients_count(&self) -> AppResult<u64>;

    /// Streams every client in batches.
    async fn get_all_api_clients(
        &self,
        results: super::BatchSender<ApiClient>,
        batch_size: u16,
    ) -> AppResult<()>;

    /// Lists the user's clients.
    async fn get_api_clients(
        &self,
        user_id: UserId,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<ApiClient>>;

    /// Creates a client and its audit entry.
    async fn create_api_client(
        &self,
        input: &ApiClientCreationInput,
        created_by: UserId,
    ) -> AppResult<ApiClient>;

    /// Archives a client owned by the user.
    async fn archive_api_client(
        &self,
        api_client_id: ApiClientId,
        user_id: UserId,
        archived_by: UserId,
    ) -> AppResult<u64>;

    /// Returns audit entries mentioning the client.
    async fn get_audit_log_entries_for_api_client(
        &self,
        api_client_id: ApiClientId,
    ) -> AppResult<Vec<AuditLogEntry>>;
}
