//! Per-dialect behaviour: foreign-key handling and sequence offsets

use async_trait::async_trait;
use pristine_core::{DatabaseKind, Transaction};
use pristine_templates::{Operation, TemplateContext};
use serde::{Deserialize, Serialize};

use crate::{RestoreError, RestoreOrder, RestorePlan, Result, SqlRunner};

/// What a dialect can do while its data is being replaced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialectPolicy {
    /// Foreign-key enforcement can be switched off with plain statements
    pub foreign_keys_disableable: bool,
    /// Added to the highest value in use to get a sequence's restart point
    pub sequence_offset: i64,
}

impl DialectPolicy {
    pub fn for_dialect(kind: &DatabaseKind) -> Self {
        match kind {
            // setval(.., n, false) and AUTO_INCREMENT = n both hand out n next
            DatabaseKind::Postgres | DatabaseKind::MySql | DatabaseKind::MariaDb => Self {
                foreign_keys_disableable: true,
                sequence_offset: 1,
            },
            // RESEED n hands out n + 1 next
            DatabaseKind::SqlServer => Self {
                foreign_keys_disableable: true,
                sequence_offset: 0,
            },
            DatabaseKind::Sqlite | DatabaseKind::Other(_) => Self::default(),
        }
    }

    /// The foreign-key strategy matching this policy
    pub fn foreign_key_manager(&self) -> Box<dyn ForeignKeyManager> {
        if self.foreign_keys_disableable {
            Box::new(EnforcedForeignKeys)
        } else {
            Box::new(NoForeignKeyToggle)
        }
    }
}

/// How a dialect keeps foreign keys out of the way during a restore
#[async_trait]
pub trait ForeignKeyManager: Send + Sync {
    async fn disable_foreign_keys(&self, sql: &SqlRunner, tx: &dyn Transaction) -> Result<()>;

    async fn enable_foreign_keys(&self, sql: &SqlRunner, tx: &dyn Transaction) -> Result<()>;

    /// Dependency-sorted plans must run one table at a time
    fn restore_order(&self, plan: RestorePlan) -> RestoreOrder {
        if plan.sorted {
            RestoreOrder::Sequential(plan.tables)
        } else {
            RestoreOrder::Concurrent(plan.tables)
        }
    }
}

/// Runs the dialect's `foreignKey.disable` / `foreignKey.enable` templates
#[derive(Debug, Clone, Copy)]
pub struct EnforcedForeignKeys;

impl EnforcedForeignKeys {
    async fn toggle(&self, sql: &SqlRunner, tx: &dyn Transaction, operation: Operation) -> Result<()> {
        let rendered = sql.render(operation, &TemplateContext::default())?;
        sql.execute(tx, &rendered)
            .await
            .map_err(RestoreError::ForeignKeys)?;
        tracing::debug!(%operation, "toggled foreign key enforcement");
        Ok(())
    }
}

#[async_trait]
impl ForeignKeyManager for EnforcedForeignKeys {
    async fn disable_foreign_keys(&self, sql: &SqlRunner, tx: &dyn Transaction) -> Result<()> {
        self.toggle(sql, tx, Operation::DisableForeignKeys).await
    }

    async fn enable_foreign_keys(&self, sql: &SqlRunner, tx: &dyn Transaction) -> Result<()> {
        self.toggle(sql, tx, Operation::EnableForeignKeys).await
    }
}

/// Leaves enforcement on; the restore relies on dependency order instead
#[derive(Debug, Clone, Copy)]
pub struct NoForeignKeyToggle;

#[async_trait]
impl ForeignKeyManager for NoForeignKeyToggle {
    async fn disable_foreign_keys(&self, _sql: &SqlRunner, _tx: &dyn Transaction) -> Result<()> {
        Ok(())
    }

    async fn enable_foreign_keys(&self, _sql: &SqlRunner, _tx: &dyn Transaction) -> Result<()> {
        Ok(())
    }
}
