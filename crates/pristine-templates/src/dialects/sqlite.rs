//! SQLite statements
//!
//! Snapshots live in the connection's `temp` schema. `PRAGMA foreign_keys`
//! is a no-op inside a transaction, so there are no foreign-key templates.
//! Instead `truncateTable` defers foreign-key checks to commit, which lets a
//! parent be emptied while its children still point at it.
//! `AUTOINCREMENT` counters are rows of `sqlite_sequence` keyed by table name.

use crate::Operation;

pub(crate) const TEMPLATES: &[(Operation, &str)] = &[
    (
        Operation::GetTables,
        "SELECT name AS table_name
FROM main.sqlite_master
WHERE type = 'table'
  AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'
ORDER BY name",
    ),
    (
        Operation::DependencyTree,
        "WITH RECURSIVE
fk (child, parent) AS (
    SELECT m.name, f.\"table\"
    FROM main.sqlite_master AS m, pragma_foreign_key_list(m.name) AS f
    WHERE m.type = 'table'
      AND m.name <> f.\"table\"
),
tree (table_name, level) AS (
    SELECT name, 0
    FROM main.sqlite_master
    WHERE type = 'table'
      AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'
      AND name NOT IN (SELECT child FROM fk)
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
        "DROP TABLE IF EXISTS temp.{{ snapshot | identifier }}
;;
CREATE TEMP TABLE {{ snapshot | identifier }} AS SELECT * FROM main.{{ table | identifier }}",
    ),
    (
        Operation::GetColumnsWithAutoIncrement,
        "SELECT p.name AS column_name,
       '''' || m.name || '''' AS column_default
FROM main.sqlite_master AS m, pragma_table_info(m.name) AS p
WHERE m.type = 'table'
  AND m.name = {{ table | sqlquote }}
  AND p.pk > 0
  AND upper(m.sql) LIKE '%AUTOINCREMENT%'",
    ),
    (
        Operation::GetMaxColumnIndex,
        "SELECT MAX({{ column | identifier }}) AS max_index FROM main.{{ table | identifier }}",
    ),
    (
        Operation::TruncateTable,
        "PRAGMA defer_foreign_keys = ON
;;
DELETE FROM main.{{ table | identifier }}",
    ),
    (
        Operation::RestoreData,
        "INSERT INTO main.{{ table | identifier }} SELECT * FROM temp.{{ snapshot | identifier }}",
    ),
    (
        Operation::ResetAutoIncrementColumn,
        "UPDATE main.sqlite_sequence SET seq = {{ restart_index }} WHERE name = {{ sequence | sqlquote }}",
    ),
];
