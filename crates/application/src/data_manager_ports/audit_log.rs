use async_trait::async_trait;
use todo_core::{AppResult, AuditLogEntryId};
use todo_domain::{AuditLogEntry, ListPage, QueryFilter};

use super::BatchSender;

/// Read port for the append-only audit log.
#[async_trait]
pub trait AuditLogEntryDataManager: Send + Sync {
    /// Returns one entry.
    async fn get_audit_log_entry(&self, entry_id: AuditLogEntryId) -> AppResult<AuditLogEntry>;

    /// Counts every entry.
    async fn get_all_audit_log_entries_count(&self) -> AppResult<u64>;

    /// Streams every entry in batches.
    async fn get_all_audit_log_entries(
        &self,
        results: BatchSender<AuditLogEntry>,
        batch_size: u16,
    ) -> AppResult<()>;

    /// Lists entries. Entries are never archived.
    async fn get_audit_log_entries(
        &self,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<AuditLogEntry>>;
}
