//! Putting every table back to its snapshot

use futures::{StreamExt, TryStreamExt, stream};
use pristine_core::{PristineError, Transaction};
use pristine_templates::{Operation, TemplateContext};

use crate::{AutoIncrementEntry, AutoIncrementMap, RestoreConfig, RestoreError, RestoreOrder, Result, SqlRunner};

pub struct RestoreOrchestrator<'a> {
    sql: &'a SqlRunner,
    config: &'a RestoreConfig,
}

impl<'a> RestoreOrchestrator<'a> {
    pub fn new(sql: &'a SqlRunner, config: &'a RestoreConfig) -> Self {
        Self { sql, config }
    }

    /// Restore the tables of `order`, returning how many counters were reset
    #[tracing::instrument(skip_all, fields(tables = order.tables().len(), sequential = order.is_sequential()))]
    pub async fn restore_all(
        &self,
        tx: &dyn Transaction,
        order: &RestoreOrder,
        auto_increments: &AutoIncrementMap,
    ) -> Result<usize> {
        match order {
            RestoreOrder::Sequential(tables) => {
                let mut reset = 0;
                for table in tables {
                    reset += self.restore_table(tx, table, entries_of(auto_increments, table)).await?;
                }
                Ok(reset)
            }
            RestoreOrder::Concurrent(tables) => {
                let resets: Vec<usize> = stream::iter(tables)
                    .map(|table| self.restore_table(tx, table, entries_of(auto_increments, table)))
                    .buffer_unordered(self.config.concurrency)
                    .try_collect()
                    .await?;
                Ok(resets.into_iter().sum())
            }
        }
    }

    /// Empty `table`, refill it from its snapshot, then reset its counters
    pub async fn restore_table(
        &self,
        tx: &dyn Transaction,
        table: &str,
        entries: &[AutoIncrementEntry],
    ) -> Result<usize> {
        let snapshot = self.config.snapshot_name(table);
        let ctx = TemplateContext::default()
            .with_table(table)
            .with_snapshot(&snapshot);
        let failed = |source: PristineError| RestoreError::Restore {
            table: table.to_string(),
            source,
        };

        let truncate = self.sql.render(Operation::TruncateTable, &ctx)?;
        self.sql.execute(tx, &truncate).await.map_err(failed)?;

        let refill = self.sql.render(Operation::RestoreData, &ctx)?;
        let rows = self.sql.execute(tx, &refill).await.map_err(failed)?;

        for entry in entries {
            let reset_ctx = TemplateContext::default()
                .with_table(table)
                .with_column(&entry.column)
                .with_sequence(&entry.sequence, entry.restart_index);
            let reset = self
                .sql
                .render(Operation::ResetAutoIncrementColumn, &reset_ctx)?;
            self.sql.execute(tx, &reset).await.map_err(failed)?;
        }

        tracing::debug!(%table, rows, sequences = entries.len(), "table restored");
        Ok(entries.len())
    }
}

fn entries_of<'m>(auto_increments: &'m AutoIncrementMap, table: &str) -> &'m [AutoIncrementEntry] {
    auto_increments
        .get(table)
        .map(Vec::as_slice)
        .unwrap_or_default()
}
