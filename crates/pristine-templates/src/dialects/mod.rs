//! Built-in statement templates, one module per dialect

mod mssql;
mod mysql;
mod postgres;
mod sqlite;

use crate::Operation;
use pristine_core::DatabaseKind;

/// The templates shipped for `kind`; empty for dialects without built-ins
pub(crate) fn builtin_templates(kind: &DatabaseKind) -> &'static [(Operation, &'static str)] {
    match kind {
        DatabaseKind::Postgres => postgres::TEMPLATES,
        DatabaseKind::MySql | DatabaseKind::MariaDb => mysql::TEMPLATES,
        DatabaseKind::SqlServer => mssql::TEMPLATES,
        DatabaseKind::Sqlite => sqlite::TEMPLATES,
        DatabaseKind::Other(_) => &[],
    }
}
