//! Pristine Templates - MiniJinja-based per-dialect SQL statements
//!
//! The restore engine never writes SQL itself. Every step it performs is an
//! [`Operation`] that this crate resolves to a dialect-specific template and
//! renders with the identifiers involved (table, snapshot, column, sequence).
//!
//! ## Features
//!
//! - **SQL Filters**: `sqlquote` for literals, `identifier` for dialect-quoted names
//! - **Built-in dialects**: PostgreSQL, MySQL/MariaDB, SQL Server, SQLite
//! - **Overrides**: any operation of any dialect can be replaced from configuration,
//!   which is also how dialects without built-in templates are added
//! - **Multi-statement templates**: statements are separated by a line holding only `;;`
//!
//! ## Example
//!
//! ```rust,ignore
//! use pristine_core::DatabaseKind;
//! use pristine_templates::{Operation, TemplateCatalog, TemplateContext};
//!
//! let catalog = TemplateCatalog::builtin(&DatabaseKind::Postgres);
//! let sql = catalog.render(
//!     Operation::TruncateTable,
//!     &TemplateContext::default().with_table("users"),
//! )?;
//! assert_eq!(sql.statements, vec![r#"DELETE FROM "users""#]);
//! ```

mod catalog;
mod dialects;
mod engine;
mod error;
mod filters;
mod operation;

pub use catalog::{RenderedSql, TemplateCatalog, TemplateContext, TemplateOverrides};
pub use engine::TemplateEngine;
pub use error::{Result, TemplateError};
pub use filters::{QuoteStyle, SqlFilters};
pub use operation::Operation;
