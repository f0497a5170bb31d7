use std::fmt;
use std::str::FromStr;

use crate::TemplateError;

/// A named step of the snapshot/restore cycle that resolves to dialect SQL
///
/// The names are the keys used in template override configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    /// List user tables: rows with a `table_name` column
    GetTables,
    /// Level-annotated dependency listing: rows with `table_name` and `level`
    DependencyTree,
    /// Drop and recreate the snapshot copy of `table` as `snapshot`
    CreateTempTable,
    /// Columns of `table` backed by a sequence: `column_name`, `column_default`
    GetColumnsWithAutoIncrement,
    /// `MAX(column)` of `table` as `max_index`
    GetMaxColumnIndex,
    /// Remove every row of `table`
    TruncateTable,
    /// Copy the rows of `snapshot` back into `table`
    RestoreData,
    /// Restart `sequence` so its next value follows `restart_index`
    ResetAutoIncrementColumn,
    DisableForeignKeys,
    EnableForeignKeys,
}

impl Operation {
    pub const ALL: [Operation; 10] = [
        Operation::GetTables,
        Operation::DependencyTree,
        Operation::CreateTempTable,
        Operation::GetColumnsWithAutoIncrement,
        Operation::GetMaxColumnIndex,
        Operation::TruncateTable,
        Operation::RestoreData,
        Operation::ResetAutoIncrementColumn,
        Operation::DisableForeignKeys,
        Operation::EnableForeignKeys,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::GetTables => "getTables",
            Operation::DependencyTree => "dependencyTree",
            Operation::CreateTempTable => "createTempTable",
            Operation::GetColumnsWithAutoIncrement => "getColumnsWithAutoIncrement",
            Operation::GetMaxColumnIndex => "getMaxColumnIndex",
            Operation::TruncateTable => "truncateTable",
            Operation::RestoreData => "restoreData",
            Operation::ResetAutoIncrementColumn => "resetAutoIncrementColumn",
            Operation::DisableForeignKeys => "foreignKey.disable",
            Operation::EnableForeignKeys => "foreignKey.enable",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = TemplateError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == name)
            .ok_or_else(|| TemplateError::UnknownOperation(name.to_string()))
    }
}
