//! Template engine using MiniJinja

use minijinja::{Environment, UndefinedBehavior};

use crate::filters::{QuoteStyle, register_filters};

/// SQL template engine
///
/// Undefined variables are errors: a template that mentions `column` must
/// never render silently for an operation that has no column.
pub struct TemplateEngine {
    env: Environment<'static>,
    style: QuoteStyle,
}

impl TemplateEngine {
    /// Create a new template engine quoting identifiers in the given style
    pub fn new(style: QuoteStyle) -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        // Register custom SQL filters
        register_filters(&mut env, style);

        Self { env, style }
    }

    pub fn quote_style(&self) -> QuoteStyle {
        self.style
    }

    /// Render a SQL template with a serde-serializable context
    pub fn render_with<T: serde::Serialize>(
        &self,
        template: &str,
        context: &T,
    ) -> Result<String, minijinja::Error> {
        self.env.render_str(template, context)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new(QuoteStyle::DoubleQuote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_render_quotes_identifiers() {
        let engine = TemplateEngine::new(QuoteStyle::Bracket);
        let ctx = HashMap::from([("table", "order details")]);
        let sql = engine
            .render_with("DELETE FROM {{ table | identifier }}", &ctx)
            .unwrap();
        assert_eq!(sql, "DELETE FROM [order details]");
    }

    #[test]
    fn test_undefined_variables_fail() {
        let engine = TemplateEngine::default();
        let ctx = HashMap::from([("table", "users")]);
        let result = engine.render_with("SELECT MAX({{ column | identifier }}) FROM t", &ctx);
        assert!(result.is_err());
    }
}
