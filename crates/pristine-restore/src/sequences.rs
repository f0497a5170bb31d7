//! Finding auto-increment columns and where their counters should restart

use std::collections::{BTreeMap, BTreeSet};

use pristine_core::{Transaction, Value};
use pristine_templates::{Operation, TemplateContext};
use serde::Serialize;

use crate::{RestoreError, Result, SqlRunner};

/// A counter to put back after a table is repopulated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoIncrementEntry {
    pub table: String,
    pub column: String,
    pub sequence: String,
    /// Value handed to the dialect's reset statement
    pub restart_index: i64,
}

/// Table name → its auto-increment counters
pub type AutoIncrementMap = BTreeMap<String, Vec<AutoIncrementEntry>>;

pub struct AutoIncrementTracker<'a> {
    sql: &'a SqlRunner,
    offset: i64,
}

impl<'a> AutoIncrementTracker<'a> {
    pub fn new(sql: &'a SqlRunner, offset: i64) -> Self {
        Self { sql, offset }
    }

    /// Counters of every table in `tables`, visiting one table at a time.
    /// Tables without any are left out of the map.
    #[tracing::instrument(skip_all, fields(tables = tables.len()))]
    pub async fn detect_tables_with_auto_increment(
        &self,
        tx: &dyn Transaction,
        tables: &BTreeSet<String>,
    ) -> Result<AutoIncrementMap> {
        let mut map = AutoIncrementMap::new();
        for table in tables {
            let entries = self.entries_for(tx, table).await?;
            if !entries.is_empty() {
                map.insert(table.clone(), entries);
            }
        }
        Ok(map)
    }

    async fn entries_for(&self, tx: &dyn Transaction, table: &str) -> Result<Vec<AutoIncrementEntry>> {
        let ctx = TemplateContext::default().with_table(table);
        let rendered = self
            .sql
            .render(Operation::GetColumnsWithAutoIncrement, &ctx)?;
        let rows = self
            .sql
            .query(tx, &rendered)
            .await
            .map_err(|source| RestoreError::CatalogQuery {
                operation: Operation::GetColumnsWithAutoIncrement,
                source,
            })?;

        let mut entries = Vec::new();
        for row in &rows {
            let Some(column) = row
                .get_by_name("column_name")
                .or_else(|| row.get(0))
                .and_then(Value::as_str)
            else {
                continue;
            };
            let default = row
                .get_by_name("column_default")
                .or_else(|| row.get(1))
                .and_then(Value::as_str)
                .unwrap_or_default();
            let Some(sequence) = extract_sequence_name(default) else {
                tracing::debug!(%table, %column, %default, "no sequence name in column default, skipping");
                continue;
            };

            let max = self.max_column_index(tx, table, column).await?;
            let entry = AutoIncrementEntry {
                table: table.to_string(),
                column: column.to_string(),
                sequence,
                restart_index: max + self.offset,
            };
            tracing::debug!(%table, %column, sequence = %entry.sequence, restart_index = entry.restart_index, "tracking auto-increment column");
            entries.push(entry);
        }
        Ok(entries)
    }

    async fn max_column_index(&self, tx: &dyn Transaction, table: &str, column: &str) -> Result<i64> {
        let ctx = TemplateContext::default()
            .with_table(table)
            .with_column(column);
        let rendered = self.sql.render(Operation::GetMaxColumnIndex, &ctx)?;
        let rows = self
            .sql
            .query(tx, &rendered)
            .await
            .map_err(|source| RestoreError::CatalogQuery {
                operation: Operation::GetMaxColumnIndex,
                source,
            })?;

        // empty tables report NULL
        Ok(rows
            .first()
            .and_then(|row| row.get_by_name("max_index").or_else(|| row.get(0)))
            .and_then(Value::as_i64)
            .unwrap_or(0))
    }
}

/// The first single-quoted name in a column default, with `''` unescaped
///
/// `nextval('seq_users_id'::regclass)` yields `seq_users_id`.
pub fn extract_sequence_name(default: &str) -> Option<String> {
    let (_, rest) = default.split_once('\'')?;
    let mut name = String::new();
    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\'' {
            name.push(c);
        } else if chars.next_if_eq(&'\'').is_some() {
            name.push('\'');
        } else {
            return (!name.is_empty()).then_some(name);
        }
    }
    // unterminated literal
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::postgres("nextval('seq_users_id'::regclass)", Some("seq_users_id"))]
    #[case::quoted_identifier(r#"nextval('"Users_id_seq"'::regclass)"#, Some(r#""Users_id_seq""#))]
    #[case::table_name("'orders'", Some("orders"))]
    #[case::escaped_quote("nextval('it''s_seq')", Some("it's_seq"))]
    #[case::first_wins("f('a', 'b')", Some("a"))]
    #[case::no_quotes("autoincrement", None)]
    #[case::empty_literal("nextval('')", None)]
    #[case::unterminated("nextval('seq", None)]
    #[case::blank("", None)]
    fn test_extract_sequence_name(#[case] default: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_sequence_name(default).as_deref(), expected);
    }
}
