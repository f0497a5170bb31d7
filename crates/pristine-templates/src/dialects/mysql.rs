//! MySQL and MariaDB statements
//!
//! `TRUNCATE` and `ALTER TABLE` commit implicitly, so rows are removed with
//! `DELETE`. Auto-increment counters belong to the table itself: the catalog
//! query reports the table name, quoted, as the "sequence".
//!
//! Resetting a counter still needs `ALTER TABLE`, so restores on MySQL are
//! not atomic across tables: tables already restored stay committed when a
//! later one fails.

use crate::Operation;

pub(crate) const TEMPLATES: &[(Operation, &str)] = &[
    (
        Operation::GetTables,
        "SELECT table_name AS table_name
FROM information_schema.tables
WHERE table_schema = DATABASE()
  AND table_type = 'BASE TABLE'
ORDER BY table_name",
    ),
    (
        Operation::DependencyTree,
        "WITH RECURSIVE fk (child, parent) AS (
    SELECT table_name, referenced_table_name
    FROM information_schema.referential_constraints
    WHERE constraint_schema = DATABASE()
      AND table_name <> referenced_table_name
),
tree (table_name, level) AS (
    SELECT t.table_name, 0
    FROM information_schema.tables t
    WHERE t.table_schema = DATABASE()
      AND t.table_type = 'BASE TABLE'
      AND NOT EXISTS (SELECT 1 FROM fk WHERE fk.child = t.table_name)
    UNION ALL
    SELECT fk.child, tree.level + 1
    FROM fk
    JOIN tree ON fk.parent = tree.table_name
    WHERE tree.level < 64
)
SELECT table_name, MAX(level) AS level
FROM tree
GROUP BY table_name
ORDER BY level, table_name",
    ),
    (
        Operation::CreateTempTable,
        "DROP TEMPORARY TABLE IF EXISTS {{ snapshot | identifier }}
;;
CREATE TEMPORARY TABLE {{ snapshot | identifier }} AS SELECT * FROM {{ table | identifier }}",
    ),
    (
        Operation::GetColumnsWithAutoIncrement,
        "SELECT column_name AS column_name,
       CONCAT('''', table_name, '''') AS column_default
FROM information_schema.columns
WHERE table_schema = DATABASE()
  AND table_name = {{ table | sqlquote }}
  AND extra LIKE '%auto_increment%'",
    ),
    (
        Operation::GetMaxColumnIndex,
        "SELECT MAX({{ column | identifier }}) AS max_index FROM {{ table | identifier }}",
    ),
    (
        Operation::TruncateTable,
        "DELETE FROM {{ table | identifier }}",
    ),
    (
        Operation::RestoreData,
        "INSERT INTO {{ table | identifier }} SELECT * FROM {{ snapshot | identifier }}",
    ),
    (
        Operation::ResetAutoIncrementColumn,
        "ALTER TABLE {{ sequence | identifier }} AUTO_INCREMENT = {{ restart_index }}",
    ),
    (
        Operation::DisableForeignKeys,
        "SET FOREIGN_KEY_CHECKS = 0",
    ),
    (
        Operation::EnableForeignKeys,
        "SET FOREIGN_KEY_CHECKS = 1",
    ),
];
