//! Error types for snapshot and restore operations

use pristine_core::PristineError;
use pristine_templates::{Operation, TemplateError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RestoreError {
    /// A metadata query (tables, dependencies, sequences) failed
    #[error("catalog query `{operation}` failed: {source}")]
    CatalogQuery {
        operation: Operation,
        #[source]
        source: PristineError,
    },

    /// Creating the snapshot copy of a table failed
    #[error("failed to snapshot table `{table}`: {source}")]
    Snapshot {
        table: String,
        #[source]
        source: PristineError,
    },

    /// Truncating, repopulating or resetting the sequences of a table failed
    #[error("failed to restore table `{table}`: {source}")]
    Restore {
        table: String,
        #[source]
        source: PristineError,
    },

    #[error("failed to toggle foreign key enforcement: {0}")]
    ForeignKeys(#[source] PristineError),

    #[error("transaction error: {0}")]
    Transaction(#[source] PristineError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RestoreError>;
