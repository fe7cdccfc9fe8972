use async_trait::async_trait;
use todo_application::{ApiClientDataManager, BatchSender};
use todo_core::{ApiClientId, AppResult, UserId};
use todo_domain::{
    ApiClient, ApiClientCreationInput, AuditEvent, AuditLogEntry, AuditSubject, ListPage,
    QueryFilter,
};
use uuid::Uuid;

use super::PostgresQuerier;
use super::reads::{fetch_audit_entries, fetch_count, fetch_entity, fetch_list};
use super::rows::ApiClientRow;
use crate::query_builder::{
    API_CLIENTS, ListScope, SqlValue, build_archive_query, build_get_all_count_query,
    build_get_matching_query, build_get_query, build_insert_query,
};

#[async_trait]
impl ApiClientDataManager for PostgresQuerier {
    #[tracing::instrument(skip_all)]
    async fn get_api_client_by_client_id(&self, client_id: &str) -> AppResult<ApiClient> {
        fetch_entity::<ApiClientRow>(
            &self.pool,
            build_get_matching_query(&API_CLIENTS, vec![("client_id", client_id.into())]),
            "API client",
        )
        .await
    }

    #[tracing::instrument(skip_all, fields(api_client_id = %api_client_id, user_id = %user_id))]
    async fn get_api_client_by_database_id(
        &self,
        api_client_id: ApiClientId,
        user_id: UserId,
    ) -> AppResult<ApiClient> {
        fetch_entity::<ApiClientRow>(
            &self.pool,
            build_get_query(
                &API_CLIENTS,
                api_client_id.as_database(),
                Some(user_id.as_database()),
            ),
            &format!("API client '{api_client_id}'"),
        )
        .await
    }

    #[tracing::instrument(skip_all)]
    async fn get_all_api_clients_count(&self) -> AppResult<u64> {
        fetch_count(
            &self.pool,
            build_get_all_count_query(&API_CLIENTS),
            "count API clients",
        )
        .await
    }

    #[tracing::instrument(skip_all, fields(batch_size = batch_size))]
    async fn get_all_api_clients(
        &self,
        results: BatchSender<ApiClient>,
        batch_size: u16,
    ) -> AppResult<()> {
        self.stream_all::<ApiClientRow>(API_CLIENTS, results, batch_size)
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
    async fn get_api_clients(
        &self,
        user_id: UserId,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<ApiClient>> {
        fetch_list::<ApiClientRow>(
            &self.pool,
            &API_CLIENTS,
            ListScope::Owner(user_id.as_database()),
            filter,
            "list API clients",
        )
        .await
    }

    #[tracing::instrument(
        skip_all,
        fields(owner = %input.belongs_to_user, created_by = %created_by)
    )]
    async fn create_api_client(
        &self,
        input: &ApiClientCreationInput,
        created_by: UserId,
    ) -> AppResult<ApiClient> {
        let external_id = Uuid::new_v4().to_string();
        let statement = build_insert_query(
            &API_CLIENTS,
            vec![
                ("external_id", external_id.clone().into()),
                ("name", input.name.clone().into()),
                ("client_id", input.client_id.clone().into()),
                ("secret_key", SqlValue::Bytes(input.secret_key.clone())),
                ("belongs_to_user", input.belongs_to_user.as_database().into()),
            ],
        );

        let (pending, inserted) = self
            .begin_write("create API client")
            .await?
            .insert(statement)
            .await?;
        let (pending, api_client_id) = pending
            .check(ApiClientId::from_database(inserted.id))
            .await?;

        pending
            .record(&AuditEvent::ApiClientCreated {
                performed_by: created_by,
                api_client_id,
            })
            .await?
            .commit()
            .await?;

        Ok(ApiClient {
            id: api_client_id,
            external_id,
            name: input.name.clone(),
            client_id: input.client_id.clone(),
            secret_key: input.secret_key.clone(),
            created_on: inserted.created_on,
            last_updated_on: None,
            archived_on: None,
            belongs_to_user: input.belongs_to_user,
        })
    }

    #[tracing::instrument(
        skip_all,
        fields(api_client_id = %api_client_id, user_id = %user_id, archived_by = %archived_by)
    )]
    async fn archive_api_client(
        &self,
        api_client_id: ApiClientId,
        user_id: UserId,
        archived_by: UserId,
    ) -> AppResult<u64> {
        self.execute_audited(
            "archive API client",
            build_archive_query(
                &API_CLIENTS,
                api_client_id.as_database(),
                Some(user_id.as_database()),
            ),
            AuditEvent::ApiClientArchived {
                performed_by: archived_by,
                api_client_id,
            },
        )
        .await
    }

    #[tracing::instrument(skip_all, fields(api_client_id = %api_client_id))]
    async fn get_audit_log_entries_for_api_client(
        &self,
        api_client_id: ApiClientId,
    ) -> AppResult<Vec<AuditLogEntry>> {
        fetch_audit_entries(&self.pool, AuditSubject::ApiClient(api_client_id)).await
    }
}
