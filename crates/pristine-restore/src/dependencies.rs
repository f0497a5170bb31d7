//! Ordering tables so that referenced tables are restored first

use std::collections::{BTreeSet, HashSet};

use pristine_core::Transaction;
use pristine_templates::{Operation, TemplateContext};

use crate::discover::table_name;
use crate::{RestoreError, Result, SqlRunner};

/// Tables to restore and whether their order matters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestorePlan {
    pub tables: Vec<String>,
    /// `true` when `tables` follows foreign-key dependencies
    pub sorted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOrder {
    /// One table after another, in the given order
    Sequential(Vec<String>),
    /// No known relation between tables; any interleaving is fine
    Concurrent(Vec<String>),
}

impl RestoreOrder {
    pub fn tables(&self) -> &[String] {
        match self {
            Self::Sequential(tables) | Self::Concurrent(tables) => tables,
        }
    }

    pub fn is_sequential(&self) -> bool {
        matches!(self, Self::Sequential(_))
    }
}

pub struct DependencyResolver<'a> {
    sql: &'a SqlRunner,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(sql: &'a SqlRunner) -> Self {
        Self { sql }
    }

    #[tracing::instrument(skip_all, fields(known = known.len()))]
    pub async fn sorted_dependency_tables(
        &self,
        tx: &dyn Transaction,
        known: &BTreeSet<String>,
    ) -> Result<RestorePlan> {
        let rendered = self
            .sql
            .render(Operation::DependencyTree, &TemplateContext::default())?;
        let rows = self
            .sql
            .query(tx, &rendered)
            .await
            .map_err(|source| RestoreError::CatalogQuery {
                operation: Operation::DependencyTree,
                source,
            })?;

        let tree: Vec<String> = rows.iter().filter_map(table_name).collect();
        let plan = plan_from_tree(tree, known);
        tracing::debug!(tables = plan.tables.len(), sorted = plan.sorted, "resolved restore order");
        Ok(plan)
    }
}

/// Build the plan from the table names of the dependency tree, in tree order
///
/// An empty tree means the database reports no dependency metadata. Names
/// outside `known` are dropped; known tables the tree never reaches, such as
/// members of a reference cycle, go last.
pub(crate) fn plan_from_tree(tree: Vec<String>, known: &BTreeSet<String>) -> RestorePlan {
    if tree.is_empty() {
        return RestorePlan {
            tables: known.iter().cloned().collect(),
            sorted: false,
        };
    }

    let mut seen = HashSet::with_capacity(known.len());
    let mut tables = Vec::with_capacity(known.len());
    for name in tree {
        if known.contains(&name) && seen.insert(name.clone()) {
            tables.push(name);
        }
    }

    let unreached: Vec<&String> = known.iter().filter(|name| !seen.contains(*name)).collect();
    if !unreached.is_empty() {
        tracing::debug!(?unreached, "tables missing from the dependency tree go last");
        tables.extend(unreached.into_iter().cloned());
    }

    RestorePlan {
        tables,
        sorted: true,
    }
}
