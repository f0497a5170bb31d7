//! SQL dialect identification
//!
//! Connections report a dialect id string (`Connection::dialect_id`); the rest
//! of the workspace works with `DatabaseKind`. Unknown ids are kept verbatim in
//! `DatabaseKind::Other` so configuration can still supply behaviour for them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The SQL dialect a connection speaks
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DatabaseKind {
    /// PostgreSQL
    Postgres,
    /// MySQL
    MySql,
    /// MariaDB
    MariaDb,
    /// Microsoft SQL Server
    SqlServer,
    /// SQLite
    Sqlite,
    /// Any other dialect, identified by its lowercase id
    Other(String),
}

impl DatabaseKind {
    /// Resolve a driver or dialect id (e.g. "postgresql", "mssql") to a kind
    pub fn from_id(id: &str) -> Self {
        match id.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => DatabaseKind::Postgres,
            "mysql" => DatabaseKind::MySql,
            "mariadb" => DatabaseKind::MariaDb,
            "mssql" | "sqlserver" | "sql_server" => DatabaseKind::SqlServer,
            "sqlite" | "sqlite3" => DatabaseKind::Sqlite,
            other => {
                tracing::debug!(dialect = %other, "unrecognized dialect id");
                DatabaseKind::Other(other.to_string())
            }
        }
    }

    /// Canonical id, used as the key for per-dialect configuration
    pub fn id(&self) -> &str {
        match self {
            DatabaseKind::Postgres => "postgres",
            DatabaseKind::MySql => "mysql",
            DatabaseKind::MariaDb => "mariadb",
            DatabaseKind::SqlServer => "mssql",
            DatabaseKind::Sqlite => "sqlite",
            DatabaseKind::Other(id) => id,
        }
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl From<String> for DatabaseKind {
    fn from(id: String) -> Self {
        DatabaseKind::from_id(&id)
    }
}

impl From<&str> for DatabaseKind {
    fn from(id: &str) -> Self {
        DatabaseKind::from_id(id)
    }
}

impl From<DatabaseKind> for String {
    fn from(kind: DatabaseKind) -> Self {
        kind.id().to_string()
    }
}
