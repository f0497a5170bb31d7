//! Engine configuration, loadable from TOML

use std::path::Path;

use pristine_core::DatabaseKind;
use pristine_templates::{TemplateCatalog, TemplateOverrides};
use serde::{Deserialize, Serialize};

use crate::{DialectPolicy, RestoreError, Result};

pub const DEFAULT_SNAPSHOT_PREFIX: &str = "pristine_snapshot_";
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Settings for a [`DataRestorer`](crate::DataRestorer)
///
/// ```toml
/// dialect = "postgres"
/// snapshot_prefix = "snap_"
/// concurrency = 4
///
/// [templates.postgres]
/// truncateTable = "TRUNCATE {{ table | identifier }} CASCADE"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestoreConfig {
    /// Dialect to use instead of the one the connection reports
    pub dialect: Option<DatabaseKind>,
    /// Prefix of the snapshot table created for each live table
    pub snapshot_prefix: String,
    /// Upper bound on per-table statements in flight at once
    pub concurrency: usize,
    /// Replaces the built-in foreign-key and sequence behaviour of the dialect
    pub policy: Option<DialectPolicy>,
    /// Dialect id → operation name → SQL template
    pub templates: TemplateOverrides,
}

impl Default for RestoreConfig {
    fn default() -> Self {
        Self {
            dialect: None,
            snapshot_prefix: DEFAULT_SNAPSHOT_PREFIX.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            policy: None,
            templates: TemplateOverrides::new(),
        }
    }
}

impl RestoreConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| RestoreError::Config(format!("invalid restore config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading restore config");
        let contents = std::fs::read_to_string(path).map_err(|e| {
            RestoreError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(RestoreError::Config(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.snapshot_prefix.is_empty() {
            return Err(RestoreError::Config(
                "snapshot_prefix must not be empty".to_string(),
            ));
        }
        if !self
            .snapshot_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(RestoreError::Config(format!(
                "snapshot_prefix `{}` may only contain ASCII letters, digits and underscores",
                self.snapshot_prefix
            )));
        }
        TemplateCatalog::validate_overrides(&self.templates)?;
        Ok(())
    }

    /// Name of the snapshot holding the rows of `table`
    pub fn snapshot_name(&self, table: &str) -> String {
        format!("{}{}", self.snapshot_prefix, table)
    }

    pub fn is_snapshot(&self, table: &str) -> bool {
        table.starts_with(&self.snapshot_prefix)
    }
}
