//! Jinja environment setup for Squashpack SQL migrations

use crate::context::MigrationContext;
use crate::error::{JinjaError, JinjaResult};
use crate::functions::{
    ident_filter, literal_filter, make_error_fn, make_from_json_fn, make_log_fn, make_to_json_fn,
    make_var_fn, make_warn_fn, vars_to_values, WarningCapture,
};
use minijinja::{Environment, UndefinedBehavior};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Jinja templating environment for Squashpack
pub struct JinjaEnvironment<'a> {
    env: Environment<'a>,
    warning_capture: WarningCapture,
}

impl<'a> JinjaEnvironment<'a> {
    /// Create a new Jinja environment with variables from config
    pub fn new(vars: &HashMap<String, serde_yaml::Value>) -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        let warning_capture: WarningCapture = Arc::new(Mutex::new(Vec::new()));

        env.add_function("var", make_var_fn(vars_to_values(vars)));
        env.add_function("log", make_log_fn());
        env.add_function("error", make_error_fn());
        env.add_function("warn", make_warn_fn(warning_capture.clone()));
        env.add_function("from_json", make_from_json_fn());
        env.add_function("to_json", make_to_json_fn());
        env.add_filter("to_json", make_to_json_fn());
        env.add_filter("ident", ident_filter);
        env.add_filter("literal", literal_filter);

        Self {
            env,
            warning_capture,
        }
    }

    /// Parse a template without rendering it
    pub fn check_syntax(&self, template: &str) -> JinjaResult<()> {
        self.env
            .template_from_str(template)
            .map(|_| ())
            .map_err(|e| JinjaError::SyntaxError(e.to_string()))
    }

    /// Render a template string with the migration's globals
    pub fn render(&self, template: &str, ctx: &MigrationContext) -> JinjaResult<String> {
        self.clear_warnings();
        let result = self
            .env
            .render_str(template, ctx)
            .map_err(JinjaError::from)?;
        Ok(result)
    }

    /// Warnings emitted through `warn()` during the last render
    pub fn warnings(&self) -> Vec<String> {
        self.warning_capture
            .lock()
            .map(|w| w.clone())
            .unwrap_or_default()
    }

    fn clear_warnings(&self) {
        if let Ok(mut warnings) = self.warning_capture.lock() {
            warnings.clear();
        }
    }
}

impl Default for JinjaEnvironment<'_> {
    fn default() -> Self {
        Self::new(&HashMap::new())
    }
}

#[cfg(test)]
#[path = "environment_test.rs"]
mod tests;
