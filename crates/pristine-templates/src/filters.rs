//! Custom SQL filters for MiniJinja

use minijinja::Environment;
use pristine_core::DatabaseKind;

/// How a dialect delimits identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    /// ANSI `"name"`
    DoubleQuote,
    /// MySQL `` `name` ``
    Backtick,
    /// SQL Server `[name]`
    Bracket,
}

impl QuoteStyle {
    pub fn for_dialect(kind: &DatabaseKind) -> Self {
        match kind {
            DatabaseKind::MySql | DatabaseKind::MariaDb => QuoteStyle::Backtick,
            DatabaseKind::SqlServer => QuoteStyle::Bracket,
            DatabaseKind::Postgres | DatabaseKind::Sqlite | DatabaseKind::Other(_) => {
                QuoteStyle::DoubleQuote
            }
        }
    }
}

/// SQL-specific filters
pub struct SqlFilters;

impl SqlFilters {
    /// Quote a string for SQL
    pub fn sqlquote(value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// Quote an identifier (table/column name)
    pub fn identifier(value: &str, style: QuoteStyle) -> String {
        match style {
            QuoteStyle::DoubleQuote => format!("\"{}\"", value.replace('"', "\"\"")),
            QuoteStyle::Backtick => format!("`{}`", value.replace('`', "``")),
            QuoteStyle::Bracket => format!("[{}]", value.replace(']', "]]")),
        }
    }
}

/// Register all SQL filters with a MiniJinja environment
pub fn register_filters(env: &mut Environment, style: QuoteStyle) {
    env.add_filter("sqlquote", |value: String| SqlFilters::sqlquote(&value));
    env.add_filter("identifier", move |value: String| {
        SqlFilters::identifier(&value, style)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlquote() {
        assert_eq!(SqlFilters::sqlquote("hello"), "'hello'");
        assert_eq!(SqlFilters::sqlquote("it's"), "'it''s'");
    }

    #[test]
    fn test_identifier() {
        assert_eq!(
            SqlFilters::identifier("users", QuoteStyle::DoubleQuote),
            "\"users\""
        );
        assert_eq!(
            SqlFilters::identifier("user\"name", QuoteStyle::DoubleQuote),
            "\"user\"\"name\""
        );
        assert_eq!(
            SqlFilters::identifier("order`s", QuoteStyle::Backtick),
            "`order``s`"
        );
        assert_eq!(
            SqlFilters::identifier("a]b", QuoteStyle::Bracket),
            "[a]]b]"
        );
    }

    #[test]
    fn test_quote_style_follows_dialect() {
        assert_eq!(
            QuoteStyle::for_dialect(&DatabaseKind::MariaDb),
            QuoteStyle::Backtick
        );
        assert_eq!(
            QuoteStyle::for_dialect(&DatabaseKind::SqlServer),
            QuoteStyle::Bracket
        );
        assert_eq!(
            QuoteStyle::for_dialect(&DatabaseKind::Other("duckdb".into())),
            QuoteStyle::DoubleQuote
        );
    }
}
