use async_trait::async_trait;
use todo_application::{AuditLogEntryDataManager, BatchSender};
use todo_core::{AppResult, AuditLogEntryId};
use todo_domain::{AuditLogEntry, ListPage, QueryFilter};

use super::PostgresQuerier;
use super::reads::{fetch_count, fetch_entity, fetch_list};
use super::rows::AuditLogRow;
use crate::query_builder::{AUDIT_LOG, ListScope, build_get_all_count_query, build_get_query};

#[async_trait]
impl AuditLogEntryDataManager for PostgresQuerier {
    #[tracing::instrument(skip_all, fields(entry_id = %entry_id))]
    async fn get_audit_log_entry(&self, entry_id: AuditLogEntryId) -> AppResult<AuditLogEntry> {
        fetch_entity::<AuditLogRow>(
            &self.pool,
            build_get_query(&AUDIT_LOG, entry_id.as_database(), None),
            &format!("audit log entry '{entry_id}'"),
        )
        .await
    }

    #[tracing::instrument(skip_all)]
    async fn get_all_audit_log_entries_count(&self) -> AppResult<u64> {
        fetch_count(
            &self.pool,
            build_get_all_count_query(&AUDIT_LOG),
            "count audit log entries",
        )
        .await
    }

    #[tracing::instrument(skip_all, fields(batch_size = batch_size))]
    async fn get_all_audit_log_entries(
        &self,
        results: BatchSender<AuditLogEntry>,
        batch_size: u16,
    ) -> AppResult<()> {
        self.stream_all::<AuditLogRow>(AUDIT_LOG, results, batch_size)
            .await
    }

    #[tracing::instrument(
        skip_all,
        fields(
            page = filter.map(QueryFilter::effective_page),
            limit = filter.map(QueryFilter::effective_limit),
        )
    )]
    async fn get_audit_log_entries(
        &self,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<AuditLogEntry>> {
        fetch_list::<AuditLogRow>(
            &self.pool,
            &AUDIT_LOG,
            ListScope::Admin,
            filter,
            "list audit log entries",
        )
        .await
    }
}
