//! SQL Server statements
//!
//! Snapshots are `#` temporary tables. Identity columns need
//! `IDENTITY_INSERT` while repopulating, and the explicit column list that
//! comes with it, so `restoreData` builds its statement dynamically.

use crate::Operation;

pub(crate) const TEMPLATES: &[(Operation, &str)] = &[
    (
        Operation::GetTables,
        "SELECT t.name AS table_name
FROM sys.tables t
WHERE t.schema_id = SCHEMA_ID()
  AND t.is_ms_shipped = 0
ORDER BY t.name",
    ),
    (
        Operation::DependencyTree,
        "WITH fk (child, parent) AS (
    SELECT CAST(OBJECT_NAME(f.parent_object_id) AS NVARCHAR(128)),
           CAST(OBJECT_NAME(f.referenced_object_id) AS NVARCHAR(128))
    FROM sys.foreign_keys f
    WHERE f.parent_object_id <> f.referenced_object_id
      AND OBJECT_SCHEMA_NAME(f.parent_object_id) = SCHEMA_NAME()
),
tree (table_name, level) AS (
    SELECT CAST(t.name AS NVARCHAR(128)), 0
    FROM sys.tables t
    WHERE t.schema_id = SCHEMA_ID()
      AND t.is_ms_shipped = 0
      AND NOT EXISTS (SELECT 1 FROM fk WHERE fk.child = t.name)
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
        "IF OBJECT_ID({{ ('tempdb..#' ~ snapshot) | sqlquote }}) IS NOT NULL DROP TABLE {{ ('#' ~ snapshot) | identifier }}
;;
SELECT * INTO {{ ('#' ~ snapshot) | identifier }} FROM {{ table | identifier }}",
    ),
    (
        Operation::GetColumnsWithAutoIncrement,
        "SELECT c.name AS column_name,
       '''' + OBJECT_NAME(c.object_id) + '''' AS column_default
FROM sys.identity_columns c
WHERE c.object_id = OBJECT_ID({{ table | sqlquote }})",
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
        "DECLARE @columns NVARCHAR(MAX) = STUFF((
    SELECT ',' + QUOTENAME(c.name)
    FROM sys.columns c
    WHERE c.object_id = OBJECT_ID({{ table | sqlquote }})
      AND c.is_computed = 0
    ORDER BY c.column_id
    FOR XML PATH('')
), 1, 1, '');
DECLARE @sql NVARCHAR(MAX) = N'INSERT INTO {{ (table | identifier) | replace(\"'\", \"''\") }} ('
    + @columns + N') SELECT ' + @columns
    + N' FROM {{ (('#' ~ snapshot) | identifier) | replace(\"'\", \"''\") }}';
IF OBJECTPROPERTY(OBJECT_ID({{ table | sqlquote }}), 'TableHasIdentity') = 1
    SET @sql = N'SET IDENTITY_INSERT {{ (table | identifier) | replace(\"'\", \"''\") }} ON; '
        + @sql
        + N'; SET IDENTITY_INSERT {{ (table | identifier) | replace(\"'\", \"''\") }} OFF;';
EXEC sp_executesql @sql;",
    ),
    (
        Operation::ResetAutoIncrementColumn,
        "DBCC CHECKIDENT ({{ sequence | sqlquote }}, RESEED, {{ restart_index }})",
    ),
    (
        Operation::DisableForeignKeys,
        "DECLARE @sql NVARCHAR(MAX) = N'';
SELECT @sql += N'ALTER TABLE ' + QUOTENAME(SCHEMA_NAME(schema_id)) + N'.' + QUOTENAME(name)
    + N' NOCHECK CONSTRAINT ALL; '
FROM sys.tables
WHERE is_ms_shipped = 0;
EXEC sp_executesql @sql;",
    ),
    (
        Operation::EnableForeignKeys,
        "DECLARE @sql NVARCHAR(MAX) = N'';
SELECT @sql += N'ALTER TABLE ' + QUOTENAME(SCHEMA_NAME(schema_id)) + N'.' + QUOTENAME(name)
    + N' WITH CHECK CHECK CONSTRAINT ALL; '
FROM sys.tables
WHERE is_ms_shipped = 0;
EXEC sp_executesql @sql;",
    ),
];
