//! Rendering operations and running them inside a transaction

use pristine_core::{PristineError, Row, Transaction};
use pristine_templates::{Operation, RenderedSql, TemplateCatalog, TemplateContext};

use crate::Result;

/// Runs the dialect's statement templates against an open transaction
///
/// Values are rendered into the SQL text through the template filters, so
/// every statement is sent without bind parameters.
pub struct SqlRunner {
    catalog: TemplateCatalog,
}

impl SqlRunner {
    pub fn new(catalog: TemplateCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn render(&self, operation: Operation, context: &TemplateContext<'_>) -> Result<RenderedSql> {
        Ok(self.catalog.render(operation, context)?)
    }

    /// Execute every statement of `sql`, returning the rows of the last one
    pub async fn query(
        &self,
        tx: &dyn Transaction,
        sql: &RenderedSql,
    ) -> std::result::Result<Vec<Row>, PristineError> {
        let Some((last, leading)) = sql.statements.split_last() else {
            return Ok(Vec::new());
        };
        for statement in leading {
            tx.execute(statement, &[]).await?;
        }
        tracing::trace!(operation = %sql.operation, sql = %last, "query");
        Ok(tx.query(last, &[]).await?.rows)
    }

    /// Execute every statement of `sql` for its side effects
    pub async fn execute(
        &self,
        tx: &dyn Transaction,
        sql: &RenderedSql,
    ) -> std::result::Result<u64, PristineError> {
        let mut affected = 0;
        for statement in &sql.statements {
            tracing::trace!(operation = %sql.operation, sql = %statement, "execute");
            affected += tx.execute(statement, &[]).await?.affected_rows;
        }
        Ok(affected)
    }
}

/// Commit `tx` if `outcome` succeeded, otherwise roll it back
///
/// A failed rollback is logged; the error that caused it is returned.
pub(crate) async fn finish<T>(tx: Box<dyn Transaction>, outcome: Result<T>) -> Result<T> {
    match outcome {
        Ok(value) => {
            tx.commit().await.map_err(crate::RestoreError::Transaction)?;
            Ok(value)
        }
        Err(e) => {
            tracing::warn!(error = %e, "rolling back");
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(error = %rollback_err, "rollback failed");
            }
            Err(e)
        }
    }
}
