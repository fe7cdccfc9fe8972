//! Full-table export in id-range batches.

use std::future::Future;

use todo_application::BatchSender;
use todo_core::{AppError, AppResult};
use tracing::Instrument;

use super::PostgresQuerier;
use super::binding::id_argument;
use super::reads::{fetch_count, fetch_entities};
use super::rows::EntityRow;
use crate::query_builder::{TableSpec, build_batch_range_query, build_get_all_count_query};

impl PostgresQuerier {
    /// Counts live rows, then spawns one fetch per `batch_size` id range.
    ///
    /// Returns once every batch is dispatched. Batch failures are logged and
    /// empty ranges send nothing. The channel closes after the last batch
    /// task drops its sender, or immediately when the table is empty.
    ///
    /// Batches are id ranges `(b * batch_size, (b + 1) * batch_size]`, one per
    /// `batch_size` live rows, and the ranges themselves ignore archival. When
    /// archived rows hold low ids, those rows are streamed and live rows past
    /// the last range are not.
    pub(super) async fn stream_all<R: EntityRow>(
        &self,
        table: TableSpec,
        results: BatchSender<R::Entity>,
        batch_size: u16,
    ) -> AppResult<()> {
        if batch_size == 0 {
            return Err(AppError::Validation(
                "batch size must be greater than zero".to_owned(),
            ));
        }

        let count = fetch_count(
            &self.pool,
            build_get_all_count_query(&table),
            "count rows for export",
        )
        .await?;
        if count == 0 {
            return Ok(());
        }

        let batch_size = u64::from(batch_size);
        let batches = count.div_ceil(batch_size);
        tracing::debug!(table = table.name, count, batches, "dispatching export batches");

        for batch in 0..batches {
            let begin_id = batch * batch_size;
            let end_id = begin_id + batch_size + 1;
            let statement =
                build_batch_range_query(&table, id_argument(begin_id), id_argument(end_id));
            let pool = self.pool.clone();
            let sender = results.clone();

            let task = async move {
                match fetch_entities::<R>(&pool, statement, "fetch export batch").await {
                    Ok(rows) if rows.is_empty() => {}
                    Ok(rows) => {
                        if sender.send(rows).await.is_err() {
                            tracing::debug!(
                                table = table.name,
                                begin_id,
                                "export receiver dropped"
                            );
                        }
                    }
                    Err(error) => {
                        tracing::error!(
                            table = table.name,
                            begin_id,
                            end_id,
                            error = %error,
                            "failed to fetch export batch"
                        );
                    }
                }
            };
            spawn_in_current_span(task);
        }

        Ok(())
    }
}

// Batch failures are logged from the task, so it carries the caller's span.
fn spawn_in_current_span<F>(task: F) -> tokio::task::JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(task.instrument(tracing::Span::current()))
}
