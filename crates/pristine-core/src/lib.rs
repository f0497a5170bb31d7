//! Pristine Core - connection contracts shared by the restore engine and drivers
//!
//! This crate provides the fundamental traits and types that all other
//! Pristine crates depend on. It defines:
//!
//! - `Connection` - Trait for database connections
//! - `Transaction` - Trait for transaction-scoped statement execution
//! - `DatabaseKind` - The SQL dialect a connection speaks
//! - Common types like `Value`, `Row`, `QueryResult`, etc.

mod connection;
mod dialect;
mod error;
mod types;

pub use connection::*;
pub use dialect::*;
pub use error::*;
pub use types::*;
