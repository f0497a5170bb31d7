//! Listing the user tables of the target schema

use std::collections::BTreeSet;

use pristine_core::{Row, Transaction};
use pristine_templates::{Operation, TemplateContext};

use crate::{RestoreConfig, RestoreError, Result, SqlRunner};

pub struct TableDiscoverer<'a> {
    sql: &'a SqlRunner,
    config: &'a RestoreConfig,
}

impl<'a> TableDiscoverer<'a> {
    pub fn new(sql: &'a SqlRunner, config: &'a RestoreConfig) -> Self {
        Self { sql, config }
    }

    /// Names of every user table, leaving out our own snapshots
    #[tracing::instrument(skip_all)]
    pub async fn detect_tables(&self, tx: &dyn Transaction) -> Result<BTreeSet<String>> {
        let rendered = self
            .sql
            .render(Operation::GetTables, &TemplateContext::default())?;
        let rows = self
            .sql
            .query(tx, &rendered)
            .await
            .map_err(|source| RestoreError::CatalogQuery {
                operation: Operation::GetTables,
                source,
            })?;

        let tables: BTreeSet<String> = rows
            .iter()
            .filter_map(table_name)
            .filter(|name| {
                let snapshot = self.config.is_snapshot(name);
                if snapshot {
                    tracing::trace!(table = %name, "skipping snapshot table");
                }
                !snapshot
            })
            .collect();

        tracing::debug!(count = tables.len(), "detected tables");
        Ok(tables)
    }
}

/// The `table_name` column of a catalog row, or its first column
pub(crate) fn table_name(row: &Row) -> Option<String> {
    row.get_by_name("table_name")
        .or_else(|| row.get(0))
        .and_then(|value| value.as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pristine_core::Value;

    #[test]
    fn test_table_name_prefers_named_column() {
        let row = Row::new(
            vec!["level".into(), "TABLE_NAME".into()],
            vec![Value::Int64(0), Value::String("users".into())],
        );
        assert_eq!(table_name(&row).as_deref(), Some("users"));

        let positional = Row::new(vec!["name".into()], vec![Value::String("orders".into())]);
        assert_eq!(table_name(&positional).as_deref(), Some("orders"));

        let null = Row::new(vec!["table_name".into()], vec![Value::Null]);
        assert_eq!(table_name(&null), None);
    }
}
