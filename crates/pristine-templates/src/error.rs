//! Template errors

use crate::Operation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("no `{operation}` template for dialect `{dialect}`")]
    Missing { operation: Operation, dialect: String },

    #[error("unknown operation name `{0}`")]
    UnknownOperation(String),

    #[error("template overrides `{first}` and `{second}` both name dialect `{dialect}`")]
    DuplicateDialect {
        dialect: String,
        first: String,
        second: String,
    },

    #[error("failed to render `{operation}` template: {source}")]
    Render {
        operation: Operation,
        #[source]
        source: minijinja::Error,
    },
}

pub type Result<T> = std::result::Result<T, TemplateError>;
