//! Copying each table's rows aside at initialization

use std::collections::BTreeSet;

use futures::{StreamExt, TryStreamExt, stream};
use pristine_core::Transaction;
use pristine_templates::{Operation, TemplateContext};

use crate::{RestoreConfig, RestoreError, Result, SqlRunner};

pub struct SnapshotManager<'a> {
    sql: &'a SqlRunner,
    config: &'a RestoreConfig,
}

impl<'a> SnapshotManager<'a> {
    pub fn new(sql: &'a SqlRunner, config: &'a RestoreConfig) -> Self {
        Self { sql, config }
    }

    /// Replace the snapshot of `table` with a copy of its current rows
    pub async fn create_temp_table(&self, tx: &dyn Transaction, table: &str) -> Result<()> {
        let snapshot = self.config.snapshot_name(table);
        let ctx = TemplateContext::default()
            .with_table(table)
            .with_snapshot(&snapshot);
        let rendered = self.sql.render(Operation::CreateTempTable, &ctx)?;
        self.sql
            .execute(tx, &rendered)
            .await
            .map_err(|source| RestoreError::Snapshot {
                table: table.to_string(),
                source,
            })?;
        tracing::debug!(%table, %snapshot, "snapshot created");
        Ok(())
    }

    /// Snapshot every table, up to `concurrency` at a time; the first failure wins
    #[tracing::instrument(skip_all, fields(tables = tables.len()))]
    pub async fn create_all(&self, tx: &dyn Transaction, tables: &BTreeSet<String>) -> Result<usize> {
        let created: Vec<()> = stream::iter(tables)
            .map(|table| self.create_temp_table(tx, table))
            .buffer_unordered(self.config.concurrency)
            .try_collect()
            .await?;
        Ok(created.len())
    }
}
