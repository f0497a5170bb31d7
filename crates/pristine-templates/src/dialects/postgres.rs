//! PostgreSQL statements
//!
//! Snapshots are session-local temporary tables. Foreign keys are switched off
//! through `session_replication_role`, which suppresses the FK triggers for the
//! rest of the transaction; rows are therefore removed with `DELETE` because
//! `TRUNCATE` checks references regardless of the role.

use crate::Operation;

pub(crate) const TEMPLATES: &[(Operation, &str)] = &[
    (
        Operation::GetTables,
        "SELECT tablename::text AS table_name
FROM pg_catalog.pg_tables
WHERE schemaname = current_schema()
ORDER BY tablename",
    ),
    (
        Operation::DependencyTree,
        "WITH RECURSIVE fk (child, parent) AS (
    SELECT child.relname::text, parent.relname::text
    FROM pg_catalog.pg_constraint c
    JOIN pg_catalog.pg_class child ON child.oid = c.conrelid
    JOIN pg_catalog.pg_class parent ON parent.oid = c.confrelid
    JOIN pg_catalog.pg_namespace n ON n.oid = child.relnamespace
    WHERE c.contype = 'f'
      AND n.nspname = current_schema()
      AND c.conrelid <> c.confrelid
),
tree (table_name, level) AS (
    SELECT t.tablename::text, 0
    FROM pg_catalog.pg_tables t
    WHERE t.schemaname = current_schema()
      AND NOT EXISTS (SELECT 1 FROM fk WHERE fk.child = t.tablename::text)
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
        "DROP TABLE IF EXISTS pg_temp.{{ snapshot | identifier }}
;;
CREATE TEMPORARY TABLE {{ snapshot | identifier }} AS SELECT * FROM {{ table | identifier }}",
    ),
    (
        Operation::GetColumnsWithAutoIncrement,
        "SELECT column_name::text AS column_name,
       COALESCE(
           column_default,
           '''' || pg_get_serial_sequence(
               quote_ident(table_schema) || '.' || quote_ident(table_name),
               column_name
           ) || ''''
       ) AS column_default
FROM information_schema.columns
WHERE table_schema = current_schema()
  AND table_name = {{ table | sqlquote }}
  AND (column_default LIKE 'nextval(%' OR is_identity = 'YES')
ORDER BY ordinal_position",
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
        "INSERT INTO {{ table | identifier }} OVERRIDING SYSTEM VALUE
SELECT * FROM {{ snapshot | identifier }}",
    ),
    (
        Operation::ResetAutoIncrementColumn,
        "SELECT setval({{ sequence | sqlquote }}::regclass, {{ restart_index }}, false)",
    ),
    (
        Operation::DisableForeignKeys,
        "SET LOCAL session_replication_role = 'replica'",
    ),
    (
        Operation::EnableForeignKeys,
        "SET LOCAL session_replication_role = 'origin'",
    ),
];
