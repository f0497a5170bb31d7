//! Operation × dialect → SQL lookup table

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use pristine_core::DatabaseKind;
use serde::Serialize;

use crate::dialects::builtin_templates;
use crate::{Operation, QuoteStyle, Result, TemplateEngine, TemplateError};

/// Replacement templates: dialect id → operation name → SQL template
pub type TemplateOverrides = BTreeMap<String, BTreeMap<String, String>>;

/// Line that separates statements inside one template
const STATEMENT_SEPARATOR: &str = ";;";

/// Identifiers and values a template may refer to
///
/// Unset fields are not exposed to the template at all, so referencing them
/// is a render error rather than an empty string.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TemplateContext<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart_index: Option<i64>,
}

impl<'a> TemplateContext<'a> {
    pub fn with_table(mut self, table: &'a str) -> Self {
        self.table = Some(table);
        self
    }

    pub fn with_snapshot(mut self, snapshot: &'a str) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn with_column(mut self, column: &'a str) -> Self {
        self.column = Some(column);
        self
    }

    pub fn with_sequence(mut self, sequence: &'a str, restart_index: i64) -> Self {
        self.sequence = Some(sequence);
        self.restart_index = Some(restart_index);
        self
    }
}

/// Statements produced by rendering one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSql {
    pub operation: Operation,
    pub statements: Vec<String>,
}

impl RenderedSql {
    /// A template that renders to nothing is a deliberate no-op
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// The statement templates of one dialect
pub struct TemplateCatalog {
    dialect: DatabaseKind,
    templates: HashMap<Operation, Cow<'static, str>>,
    engine: TemplateEngine,
}

impl TemplateCatalog {
    /// Catalog holding only the built-in templates of `dialect`
    pub fn builtin(dialect: &DatabaseKind) -> Self {
        let templates = builtin_templates(dialect)
            .iter()
            .map(|(op, sql)| (*op, Cow::Borrowed(*sql)))
            .collect();

        Self {
            dialect: dialect.clone(),
            templates,
            engine: TemplateEngine::new(QuoteStyle::for_dialect(dialect)),
        }
    }

    /// Built-in templates of `dialect`, with the overrides configured for it
    /// taking precedence. Overrides for other dialects are ignored.
    pub fn with_overrides(dialect: &DatabaseKind, overrides: &TemplateOverrides) -> Result<Self> {
        let mut catalog = Self::builtin(dialect);
        let matching = overrides
            .iter()
            .filter(|(key, _)| DatabaseKind::from_id(key) == *dialect);
        for (_, operations) in matching {
            for (name, sql) in operations {
                let operation: Operation = name.parse()?;
                tracing::debug!(dialect = %dialect, operation = %operation, "overriding statement template");
                catalog.templates.insert(operation, Cow::Owned(sql.clone()));
            }
        }
        Ok(catalog)
    }

    /// Check that every override names a known operation, and that no two
    /// dialect keys (`pg` and `postgres`, say) resolve to the same dialect
    pub fn validate_overrides(overrides: &TemplateOverrides) -> Result<()> {
        let mut seen: HashMap<DatabaseKind, &str> = HashMap::new();
        for (key, operations) in overrides {
            if let Some(first) = seen.insert(DatabaseKind::from_id(key), key) {
                return Err(TemplateError::DuplicateDialect {
                    dialect: DatabaseKind::from_id(key).id().to_string(),
                    first: first.to_string(),
                    second: key.clone(),
                });
            }
            for name in operations.keys() {
                name.parse::<Operation>()?;
            }
        }
        Ok(())
    }

    pub fn dialect(&self) -> &DatabaseKind {
        &self.dialect
    }

    pub fn contains(&self, operation: Operation) -> bool {
        self.templates.contains_key(&operation)
    }

    pub fn template(&self, operation: Operation) -> Option<&str> {
        self.templates.get(&operation).map(|sql| sql.as_ref())
    }

    /// Render `operation` into the statements to execute, in order
    pub fn render(&self, operation: Operation, context: &TemplateContext<'_>) -> Result<RenderedSql> {
        let template = self
            .template(operation)
            .ok_or_else(|| TemplateError::Missing {
                operation,
                dialect: self.dialect.id().to_string(),
            })?;

        let sql = self
            .engine
            .render_with(template, context)
            .map_err(|source| TemplateError::Render { operation, source })?;

        Ok(RenderedSql {
            operation,
            statements: split_statements(&sql),
        })
    }
}

fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in sql.lines() {
        if line.trim() == STATEMENT_SEPARATOR {
            statements.push(std::mem::take(&mut current));
        } else {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }
    statements.push(current);

    statements
        .into_iter()
        .map(|statement| statement.trim().to_string())
        .filter(|statement| !statement.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const REQUIRED: [Operation; 8] = [
        Operation::GetTables,
        Operation::DependencyTree,
        Operation::CreateTempTable,
        Operation::GetColumnsWithAutoIncrement,
        Operation::GetMaxColumnIndex,
        Operation::TruncateTable,
        Operation::RestoreData,
        Operation::ResetAutoIncrementColumn,
    ];

    #[rstest]
    #[case::postgres(DatabaseKind::Postgres, true)]
    #[case::mysql(DatabaseKind::MySql, true)]
    #[case::mariadb(DatabaseKind::MariaDb, true)]
    #[case::mssql(DatabaseKind::SqlServer, true)]
    #[case::sqlite(DatabaseKind::Sqlite, false)]
    fn test_builtin_dialects_cover_every_step(
        #[case] dialect: DatabaseKind,
        #[case] has_foreign_key_toggle: bool,
    ) {
        let catalog = TemplateCatalog::builtin(&dialect);
        for operation in REQUIRED {
            assert!(catalog.contains(operation), "{dialect} lacks {operation}");
        }
        assert_eq!(
            catalog.contains(Operation::DisableForeignKeys),
            has_foreign_key_toggle
        );
        assert_eq!(
            catalog.contains(Operation::EnableForeignKeys),
            has_foreign_key_toggle
        );
    }

    #[rstest]
    #[case::postgres(DatabaseKind::Postgres)]
    #[case::mysql(DatabaseKind::MySql)]
    #[case::mssql(DatabaseKind::SqlServer)]
    #[case::sqlite(DatabaseKind::Sqlite)]
    fn test_builtin_templates_render_with_full_context(#[case] dialect: DatabaseKind) {
        let catalog = TemplateCatalog::builtin(&dialect);
        let ctx = TemplateContext::default()
            .with_table("users")
            .with_snapshot("pristine_snapshot_users")
            .with_column("id")
            .with_sequence("users_id_seq", 43);
        for operation in Operation::ALL {
            if catalog.contains(operation) {
                let rendered = catalog.render(operation, &ctx).unwrap();
                assert!(!rendered.is_empty(), "{dialect} {operation} rendered nothing");
            }
        }
    }

    #[test]
    fn test_create_temp_table_splits_into_statements() {
        let catalog = TemplateCatalog::builtin(&DatabaseKind::Sqlite);
        let ctx = TemplateContext::default()
            .with_table("users")
            .with_snapshot("snap_users");
        let rendered = catalog.render(Operation::CreateTempTable, &ctx).unwrap();
        assert_eq!(
            rendered.statements,
            vec![
                r#"DROP TABLE IF EXISTS temp."snap_users""#.to_string(),
                r#"CREATE TEMP TABLE "snap_users" AS SELECT * FROM main."users""#.to_string(),
            ]
        );
    }

    #[test]
    fn test_postgres_sequence_reset() {
        let catalog = TemplateCatalog::builtin(&DatabaseKind::Postgres);
        let ctx = TemplateContext::default().with_sequence("seq_users_id", 43);
        let rendered = catalog
            .render(Operation::ResetAutoIncrementColumn, &ctx)
            .unwrap();
        assert_eq!(
            rendered.statements,
            vec!["SELECT setval('seq_users_id'::regclass, 43, false)".to_string()]
        );
    }

    #[test]
    fn test_mysql_quotes_with_backticks() {
        let catalog = TemplateCatalog::builtin(&DatabaseKind::MySql);
        let ctx = TemplateContext::default().with_table("order`s");
        let rendered = catalog.render(Operation::TruncateTable, &ctx).unwrap();
        assert_eq!(rendered.statements, vec!["DELETE FROM `order``s`".to_string()]);
    }

    #[test]
    fn test_missing_context_is_a_render_error() {
        let catalog = TemplateCatalog::builtin(&DatabaseKind::Postgres);
        let ctx = TemplateContext::default().with_table("users");
        let err = catalog
            .render(Operation::GetMaxColumnIndex, &ctx)
            .unwrap_err();
        assert!(matches!(
            err,
            TemplateError::Render {
                operation: Operation::GetMaxColumnIndex,
                ..
            }
        ));
    }

    #[test]
    fn test_overrides_apply_to_their_dialect_only() {
        let overrides: TemplateOverrides = BTreeMap::from([(
            "postgres".to_string(),
            BTreeMap::from([(
                "truncateTable".to_string(),
                "TRUNCATE {{ table | identifier }} CASCADE".to_string(),
            )]),
        )]);

        let postgres = TemplateCatalog::with_overrides(&DatabaseKind::Postgres, &overrides).unwrap();
        let ctx = TemplateContext::default().with_table("users");
        assert_eq!(
            postgres
                .render(Operation::TruncateTable, &ctx)
                .unwrap()
                .statements,
            vec![r#"TRUNCATE "users" CASCADE"#.to_string()]
        );

        let sqlite = TemplateCatalog::with_overrides(&DatabaseKind::Sqlite, &overrides).unwrap();
        assert_eq!(
            sqlite.render(Operation::TruncateTable, &ctx).unwrap().statements,
            vec![
                "PRAGMA defer_foreign_keys = ON".to_string(),
                r#"DELETE FROM main."users""#.to_string(),
            ]
        );
    }

    #[test]
    fn test_override_keys_accept_dialect_aliases() {
        let overrides: TemplateOverrides = BTreeMap::from([(
            "PG".to_string(),
            BTreeMap::from([(
                "truncateTable".to_string(),
                "TRUNCATE {{ table | identifier }}".to_string(),
            )]),
        )]);
        TemplateCatalog::validate_overrides(&overrides).unwrap();

        let postgres = TemplateCatalog::with_overrides(&DatabaseKind::Postgres, &overrides).unwrap();
        let ctx = TemplateContext::default().with_table("users");
        assert_eq!(
            postgres
                .render(Operation::TruncateTable, &ctx)
                .unwrap()
                .statements,
            vec![r#"TRUNCATE "users""#.to_string()]
        );
    }

    #[test]
    fn test_two_keys_for_one_dialect_are_rejected() {
        let overrides: TemplateOverrides = BTreeMap::from([
            ("pg".to_string(), BTreeMap::new()),
            ("postgres".to_string(), BTreeMap::new()),
        ]);
        assert!(matches!(
            TemplateCatalog::validate_overrides(&overrides),
            Err(TemplateError::DuplicateDialect { dialect, first, second })
                if dialect == "postgres" && first == "pg" && second == "postgres"
        ));
    }

    #[test]
    fn test_unknown_override_operation_is_rejected() {
        let overrides: TemplateOverrides = BTreeMap::from([(
            "mysql".to_string(),
            BTreeMap::from([("dropEverything".to_string(), "DROP DATABASE x".to_string())]),
        )]);
        assert!(matches!(
            TemplateCatalog::validate_overrides(&overrides),
            Err(TemplateError::UnknownOperation(name)) if name == "dropEverything"
        ));
    }

    #[test]
    fn test_other_dialects_start_empty() {
        let catalog = TemplateCatalog::builtin(&DatabaseKind::Other("duckdb".into()));
        let err = catalog
            .render(Operation::GetTables, &TemplateContext::default())
            .unwrap_err();
        assert!(matches!(err, TemplateError::Missing { dialect, .. } if dialect == "duckdb"));
    }

    #[test]
    fn test_split_statements_drops_blank_parts() {
        let sql = indoc! {"
            SET a = 1
            ;;

            ;;
              SET b = 2
        "};
        assert_eq!(
            split_statements(sql),
            vec!["SET a = 1".to_string(), "SET b = 2".to_string()]
        );
        assert!(split_statements("   ").is_empty());
    }
}
