//! The public entry point: snapshot once, restore many times

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pristine_core::{Connection, DatabaseKind, Transaction};
use pristine_templates::{Operation, TemplateCatalog};

use crate::sql::finish;
use crate::{
    AutoIncrementMap, AutoIncrementTracker, DependencyResolver, DialectPolicy, ForeignKeyManager,
    RestoreConfig, RestoreError, RestoreOrchestrator, Result, SnapshotManager, SqlRunner,
    TableDiscoverer,
};

/// Operations every dialect must provide a template for
const REQUIRED_OPERATIONS: [Operation; 8] = [
    Operation::GetTables,
    Operation::DependencyTree,
    Operation::CreateTempTable,
    Operation::GetColumnsWithAutoIncrement,
    Operation::GetMaxColumnIndex,
    Operation::TruncateTable,
    Operation::RestoreData,
    Operation::ResetAutoIncrementColumn,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub tables: usize,
    pub auto_increment_columns: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    pub tables: usize,
    /// Tables were restored one at a time in dependency order
    pub sorted: bool,
    pub sequences_reset: usize,
    pub elapsed: Duration,
}

/// Snapshots the tables of a database and puts them back on demand
///
/// ```ignore
/// let mut restorer = DataRestorer::new(connection, RestoreConfig::default())?;
/// restorer.init().await?;
/// // ... run a test that writes to the database ...
/// restorer.restore_data().await?;
/// ```
///
/// Snapshots are temporary tables, so `init` and every `restore_data` must
/// use the same database session.
pub struct DataRestorer {
    connection: Arc<dyn Connection>,
    config: RestoreConfig,
    dialect: DatabaseKind,
    policy: DialectPolicy,
    sql: SqlRunner,
    foreign_keys: Box<dyn ForeignKeyManager>,
    tables: BTreeSet<String>,
    auto_increments: AutoIncrementMap,
}

impl DataRestorer {
    pub fn new(connection: Arc<dyn Connection>, config: RestoreConfig) -> Result<Self> {
        config.validate()?;

        let dialect = match (&config.dialect, connection.dialect_id()) {
            (Some(dialect), _) => dialect.clone(),
            (None, Some(id)) => DatabaseKind::from_id(id),
            (None, None) => {
                return Err(RestoreError::Config(format!(
                    "the {} driver does not report a dialect; set `dialect` in the config",
                    connection.driver_name()
                )));
            }
        };
        let policy = config
            .policy
            .unwrap_or_else(|| DialectPolicy::for_dialect(&dialect));

        let catalog = TemplateCatalog::with_overrides(&dialect, &config.templates)?;
        let mut missing: Vec<Operation> = REQUIRED_OPERATIONS
            .into_iter()
            .filter(|op| !catalog.contains(*op))
            .collect();
        if policy.foreign_keys_disableable {
            missing.extend(
                [Operation::DisableForeignKeys, Operation::EnableForeignKeys]
                    .into_iter()
                    .filter(|op| !catalog.contains(*op)),
            );
        }
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|op| op.name()).collect();
            return Err(RestoreError::Config(format!(
                "no template for {} in dialect `{}`",
                names.join(", "),
                dialect.id()
            )));
        }

        tracing::debug!(dialect = %dialect, ?policy, "data restorer ready");
        Ok(Self {
            connection,
            foreign_keys: policy.foreign_key_manager(),
            config,
            dialect,
            policy,
            sql: SqlRunner::new(catalog),
            tables: BTreeSet::new(),
            auto_increments: AutoIncrementMap::new(),
        })
    }

    pub fn dialect(&self) -> &DatabaseKind {
        &self.dialect
    }

    pub fn policy(&self) -> &DialectPolicy {
        &self.policy
    }

    pub fn config(&self) -> &RestoreConfig {
        &self.config
    }

    /// Tables known to the restorer
    pub fn tables(&self) -> &BTreeSet<String> {
        &self.tables
    }

    /// Counters recorded by the last `init`
    pub fn auto_increments(&self) -> &AutoIncrementMap {
        &self.auto_increments
    }

    /// Snapshot every table and record where each counter restarts
    ///
    /// Running it again replaces the snapshots and counters with the current
    /// state. Nothing is kept if any step fails.
    #[tracing::instrument(skip(self), fields(dialect = %self.dialect))]
    pub async fn init(&mut self) -> Result<InitReport> {
        let started = Instant::now();
        let tx = self.begin().await?;
        let outcome = self.init_in(tx.as_ref()).await;
        let (tables, auto_increments) = finish(tx, outcome).await?;

        let report = InitReport {
            tables: tables.len(),
            auto_increment_columns: auto_increments.values().map(Vec::len).sum(),
            elapsed: started.elapsed(),
        };
        self.tables = tables;
        self.auto_increments = auto_increments;

        tracing::info!(
            tables = report.tables,
            auto_increment_columns = report.auto_increment_columns,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "snapshots created"
        );
        Ok(report)
    }

    /// Put every table back to its state at the last `init`
    ///
    /// Runs in one transaction: on failure no table is changed.
    #[tracing::instrument(skip(self), fields(dialect = %self.dialect))]
    pub async fn restore_data(&mut self) -> Result<RestoreReport> {
        let started = Instant::now();
        let tx = self.begin().await?;
        let outcome = self.restore_in(tx.as_ref()).await;
        let (detected, tables, sorted, sequences_reset) = finish(tx, outcome).await?;

        if let Some(detected) = detected {
            self.tables = detected;
        }
        let report = RestoreReport {
            tables,
            sorted,
            sequences_reset,
            elapsed: started.elapsed(),
        };

        tracing::info!(
            tables = report.tables,
            sorted = report.sorted,
            sequences_reset = report.sequences_reset,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "data restored"
        );
        Ok(report)
    }

    /// Look for tables again, adding new ones to the set
    ///
    /// Returns how many tables were added. New tables have no snapshot until
    /// the next `init`.
    #[tracing::instrument(skip(self), fields(dialect = %self.dialect))]
    pub async fn detect_tables(&mut self) -> Result<usize> {
        let tx = self.begin().await?;
        let outcome = self.discoverer().detect_tables(tx.as_ref()).await;
        let detected = finish(tx, outcome).await?;

        let before = self.tables.len();
        self.tables.extend(detected);
        Ok(self.tables.len() - before)
    }

    async fn begin(&self) -> Result<Box<dyn Transaction>> {
        self.connection
            .begin_transaction()
            .await
            .map_err(RestoreError::Transaction)
    }

    async fn init_in(&self, tx: &dyn Transaction) -> Result<(BTreeSet<String>, AutoIncrementMap)> {
        let mut tables = self.tables.clone();
        tables.extend(self.discoverer().detect_tables(tx).await?);

        let snapshots = SnapshotManager::new(&self.sql, &self.config);
        let tracker = AutoIncrementTracker::new(&self.sql, self.policy.sequence_offset);
        let (_, auto_increments) = futures::try_join!(
            snapshots.create_all(tx, &tables),
            tracker.detect_tables_with_auto_increment(tx, &tables),
        )?;

        Ok((tables, auto_increments))
    }

    async fn restore_in(
        &self,
        tx: &dyn Transaction,
    ) -> Result<(Option<BTreeSet<String>>, usize, bool, usize)> {
        let detected = if self.tables.is_empty() {
            tracing::info!("no known tables, detecting before restore");
            Some(self.discoverer().detect_tables(tx).await?)
        } else {
            None
        };
        let tables = detected.as_ref().unwrap_or(&self.tables);

        self.foreign_keys
            .disable_foreign_keys(&self.sql, tx)
            .await?;

        let plan = DependencyResolver::new(&self.sql)
            .sorted_dependency_tables(tx, tables)
            .await?;
        let sorted = plan.sorted;
        let order = self.foreign_keys.restore_order(plan);
        let sequences_reset = RestoreOrchestrator::new(&self.sql, &self.config)
            .restore_all(tx, &order, &self.auto_increments)
            .await?;

        self.foreign_keys.enable_foreign_keys(&self.sql, tx).await?;

        Ok((detected, order.tables().len(), sorted, sequences_reset))
    }

    fn discoverer(&self) -> TableDiscoverer<'_> {
        TableDiscoverer::new(&self.sql, &self.config)
    }
}
