use std::io::{self, Write};
use std::str::FromStr;

use serde::Serialize;
use todo_application::{
    AccountDataManager, ApiClientDataManager, AuditLogEntryDataManager, ItemDataManager,
    WebhookDataManager,
};
use todo_core::{AppError, AppResult};
use todo_infrastructure::PostgresQuerier;
use tokio::sync::mpsc;

// Batches buffered between the fetch tasks and the writer.
const CHANNEL_CAPACITY: usize = 4;

/// Tables that support full streaming export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    Items,
    Webhooks,
    Accounts,
    ApiClients,
    AuditLog,
}

impl ExportTarget {
    const ALL: [Self; 5] = [
        Self::Items,
        Self::Webhooks,
        Self::Accounts,
        Self::ApiClients,
        Self::AuditLog,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Items => "items",
            Self::Webhooks => "webhooks",
            Self::Accounts => "accounts",
            Self::ApiClients => "api_clients",
            Self::AuditLog => "audit_log",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|target| target.name()).collect()
    }
}

impl FromStr for ExportTarget {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|target| target.name() == value)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "unknown export entity '{value}', expected one of: {}",
                    Self::names().join(", ")
                ))
            })
    }
}

/// Streams every row of `target` to stdout and returns the row count.
pub async fn run(
    querier: &PostgresQuerier,
    target: ExportTarget,
    batch_size: u16,
) -> AppResult<u64> {
    match target {
        ExportTarget::Items => {
            let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
            querier.get_all_items(sender, batch_size).await?;
            drain(receiver, target).await
        }
        ExportTarget::Webhooks => {
            let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
            querier.get_all_webhooks(sender, batch_size).await?;
            drain(receiver, target).await
        }
        ExportTarget::Accounts => {
            let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
            querier.get_all_accounts(sender, batch_size).await?;
            drain(receiver, target).await
        }
        ExportTarget::ApiClients => {
            let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
            querier.get_all_api_clients(sender, batch_size).await?;
            drain(receiver, target).await
        }
        ExportTarget::AuditLog => {
            let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
            querier.get_all_audit_log_entries(sender, batch_size).await?;
            drain(receiver, target).await
        }
    }
}

async fn drain<T: Serialize>(
    mut receiver: mpsc::Receiver<Vec<T>>,
    target: ExportTarget,
) -> AppResult<u64> {
    let mut rows = 0_u64;
    let mut batches = 0_u64;

    while let Some(batch) = receiver.recv().await {
        batches += 1;
        write_lines(&mut io::stdout().lock(), &batch)?;
        rows += batch.len() as u64;
        tracing::debug!(entity = target.name(), batch = batches, size = batch.len(), "exported batch");
    }

    tracing::info!(entity = target.name(), batches, "all export batches received");
    Ok(rows)
}

fn write_lines<T: Serialize>(writer: &mut impl Write, rows: &[T]) -> AppResult<()> {
    for row in rows {
        serde_json::to_writer(&mut *writer, row).map_err(|error| {
            AppError::Internal(format!("failed to serialize export row: {error}"))
        })?;
        writer
            .write_all(b"\n")
            .map_err(|error| AppError::Internal(format!("failed to write export row: {error}")))?;
    }

    Ok(())
}
