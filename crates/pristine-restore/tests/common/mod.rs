//! Shared helpers for the restore test suites

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use pristine_core::{
    Connection, PristineError, QueryResult, Result, Row, StatementResult, Transaction, Value,
};
use pristine_restore::RestoreConfig;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Templates of the `mock` dialect: each operation renders to a short,
/// recognisable statement
pub const MOCK_CONFIG: &str = r#"
dialect = "mock"
concurrency = 4

[policy]
foreign_keys_disableable = true
sequence_offset = 1

[templates.mock]
getTables = "TABLES"
dependencyTree = "TREE"
createTempTable = "SNAPSHOT {{ table }} AS {{ snapshot }}"
getColumnsWithAutoIncrement = "AUTO COLUMNS {{ table }}"
getMaxColumnIndex = "MAX {{ table }}.{{ column }}"
truncateTable = "TRUNCATE {{ table }}"
restoreData = "RESTORE {{ table }} FROM {{ snapshot }}"
resetAutoIncrementColumn = "RESET {{ sequence }} TO {{ restart_index }}"
"foreignKey.disable" = "FK OFF"
"foreignKey.enable" = "FK ON"
"#;

pub fn mock_config() -> RestoreConfig {
    RestoreConfig::from_toml_str(MOCK_CONFIG).expect("mock config should parse")
}

pub fn table_rows(names: &[&str]) -> Vec<Row> {
    names
        .iter()
        .map(|name| Row::new(vec!["table_name".into()], vec![Value::String(name.to_string())]))
        .collect()
}

pub fn tree_rows(levels: &[(&str, i64)]) -> Vec<Row> {
    levels
        .iter()
        .map(|(name, level)| {
            Row::new(
                vec!["table_name".into(), "level".into()],
                vec![Value::String(name.to_string()), Value::Int64(*level)],
            )
        })
        .collect()
}

pub fn auto_column_rows(columns: &[(&str, &str)]) -> Vec<Row> {
    columns
        .iter()
        .map(|(column, default)| {
            Row::new(
                vec!["column_name".into(), "column_default".into()],
                vec![Value::String(column.to_string()), Value::String(default.to_string())],
            )
        })
        .collect()
}

pub fn max_row(value: Value) -> Vec<Row> {
    vec![Row::new(vec!["max_index".into()], vec![value])]
}

#[derive(Default)]
struct MockState {
    log: Vec<String>,
    responses: HashMap<String, Vec<Row>>,
    failures: Vec<String>,
}

/// A connection that records every statement and answers from a script
///
/// `BEGIN`, `COMMIT` and `ROLLBACK` are recorded alongside the statements.
/// Each statement yields to the executor once, so concurrently driven
/// statements interleave.
#[derive(Clone, Default)]
pub struct RecordingConnection {
    state: Arc<Mutex<MockState>>,
}

impl RecordingConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows returned for statements equal to `sql`
    pub fn respond(&self, sql: &str, rows: Vec<Row>) -> &Self {
        self.state.lock().responses.insert(sql.to_string(), rows);
        self
    }

    /// Make statements equal to `sql` fail
    pub fn fail_on(&self, sql: &str) -> &Self {
        self.state.lock().failures.push(sql.to_string());
        self
    }

    pub fn log(&self) -> Vec<String> {
        self.state.lock().log.clone()
    }

    pub fn clear_log(&self) {
        self.state.lock().log.clear();
    }

    /// Position of `sql` in the log
    pub fn position(&self, sql: &str) -> Option<usize> {
        self.state.lock().log.iter().position(|s| s == sql)
    }

    async fn run(&self, sql: &str) -> Result<Vec<Row>> {
        self.state.lock().log.push(sql.to_string());
        tokio::task::yield_now().await;

        let state = self.state.lock();
        if state.failures.iter().any(|f| f == sql) {
            return Err(PristineError::Query(format!("scripted failure: {sql}")));
        }
        Ok(state.responses.get(sql).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl Connection for RecordingConnection {
    fn driver_name(&self) -> &str {
        "recording"
    }

    async fn execute(&self, sql: &str, _params: &[Value]) -> Result<StatementResult> {
        let rows = self.run(sql).await?;
        Ok(StatementResult {
            affected_rows: rows.len() as u64,
        })
    }

    async fn query(&self, sql: &str, _params: &[Value]) -> Result<QueryResult> {
        let mut result = QueryResult::empty();
        result.rows = self.run(sql).await?;
        Ok(result)
    }

    async fn begin_transaction(&self) -> Result<Box<dyn Transaction>> {
        self.state.lock().log.push("BEGIN".into());
        Ok(Box::new(RecordingTransaction { conn: self.clone() }))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    fn is_closed(&self) -> bool {
        false
    }
}

pub struct RecordingTransaction {
    conn: RecordingConnection,
}

#[async_trait]
impl Transaction for RecordingTransaction {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.conn.state.lock().log.push("COMMIT".into());
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.conn.state.lock().log.push("ROLLBACK".into());
        Ok(())
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.conn.query(sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        self.conn.execute(sql, params).await
    }
}
