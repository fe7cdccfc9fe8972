//! Service-wide audit log reads.

use std::sync::Arc;

use todo_core::{AppResult, AuditLogEntryId};
use todo_domain::{AuditLogEntry, ListPage, QueryFilter, ServiceAdminPermission};

use crate::Actor;
use crate::data_manager_ports::AuditLogEntryDataManager;

/// Read access to the full audit log for service administrators.
#[derive(Clone)]
pub struct AuditLogService {
    audit_log: Arc<dyn AuditLogEntryDataManager>,
}

impl AuditLogService {
    /// Creates a new audit log service.
    #[must_use]
    pub fn new(audit_log: Arc<dyn AuditLogEntryDataManager>) -> Self {
        Self { audit_log }
    }

    /// Returns one entry.
    pub async fn get_entry(
        &self,
        actor: &Actor,
        entry_id: AuditLogEntryId,
    ) -> AppResult<AuditLogEntry> {
        actor.require_service_admin_permission(ServiceAdminPermission::ReadAuditLog)?;
        self.audit_log.get_audit_log_entry(entry_id).await
    }

    /// Lists entries.
    pub async fn list_entries(
        &self,
        actor: &Actor,
        filter: Option<&QueryFilter>,
    ) -> AppResult<ListPage<AuditLogEntry>> {
        actor.require_service_admin_permission(ServiceAdminPermission::ReadAuditLog)?;
        self.audit_log.get_audit_log_entries(filter).await
    }

    /// Counts every entry.
    pub async fn count_entries(&self, actor: &Actor) -> AppResult<u64> {
        actor.require_service_admin_permission(ServiceAdminPermission::ReadAuditLog)?;
        self.audit_log.get_all_audit_log_entries_count().await
    }
}
