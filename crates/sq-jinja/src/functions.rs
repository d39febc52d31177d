//! Template functions and filters available to SQL migrations

use minijinja::value::Value;
use minijinja::{Error, ErrorKind};
use sq_core::sql_utils::{escape_sql_string, quote_qualified};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Captured warnings from warn() calls
pub(crate) type WarningCapture = Arc<Mutex<Vec<String>>>;

/// Create the var() function that retrieves variables from config
///
/// Usage in templates:
/// ```jinja
/// {{ var('owner_role') }}
/// {{ var('missing', 'default_value') }}
/// ```
pub(crate) fn make_var_fn(
    vars: HashMap<String, Value>,
) -> impl Fn(&str, Option<Value>) -> Result<Value, Error> + Send + Sync + Clone + 'static {
    move |name: &str, default: Option<Value>| match vars.get(name) {
        Some(value) => Ok(value.clone()),
        None => default.ok_or_else(|| {
            Error::new(
                ErrorKind::UndefinedError,
                format!("variable '{}' is not defined and no default provided", name),
            )
        }),
    }
}

/// Template values for the `vars` section of `squashpack.yml`
pub(crate) fn vars_to_values(vars: &HashMap<String, serde_yaml::Value>) -> HashMap<String, Value> {
    vars.iter()
        .map(|(name, value)| (name.clone(), Value::from_serialize(value)))
        .collect()
}

/// `log(msg)`: info-level log line, renders as nothing
pub(crate) fn make_log_fn() -> impl Fn(&str) -> String + Send + Sync + Clone + 'static {
    |msg: &str| {
        log::info!("[jinja:log] {}", msg);
        String::new()
    }
}

/// Create the `error(msg)` function that aborts rendering.
///
/// Usage in templates:
/// ```jinja
/// {% if schema == "public" %}{{ error("refusing to write into public") }}{% endif %}
/// ```
pub(crate) fn make_error_fn(
) -> impl Fn(&str) -> Result<String, Error> + Send + Sync + Clone + 'static {
    |msg: &str| Err(Error::new(ErrorKind::InvalidOperation, msg.to_string()))
}

/// `warn(msg)`: records a warning for [`JinjaEnvironment::warnings`].
///
/// [`JinjaEnvironment::warnings`]: crate::JinjaEnvironment::warnings
pub(crate) fn make_warn_fn(
    capture: WarningCapture,
) -> impl Fn(&str) -> Result<String, Error> + Send + Sync + Clone + 'static {
    move |msg: &str| {
        let mut warnings = capture.lock().map_err(|e| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("warning mutex poisoned: {e}"),
            )
        })?;
        warnings.push(msg.to_string());
        Ok(String::new())
    }
}

/// Create the `from_json(str)` function to parse a JSON string.
///
/// Usage in templates:
/// ```jinja
/// {% set roles = from_json('["anon", "authenticated"]') %}
/// ```
pub(crate) fn make_from_json_fn(
) -> impl Fn(&str) -> Result<Value, Error> + Send + Sync + Clone + 'static {
    |s: &str| {
        let parsed: serde_json::Value = serde_json::from_str(s).map_err(|e| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("from_json parse error: {}", e),
            )
        })?;
        Ok(Value::from_serialize(&parsed))
    }
}

/// `to_json(value)`, also registered as the `to_json` filter
pub(crate) fn make_to_json_fn(
) -> impl Fn(Value) -> Result<String, Error> + Send + Sync + Clone + 'static {
    |val: Value| {
        serde_json::to_string(&val).map_err(|e| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("to_json serialization error: {}", e),
            )
        })
    }
}

/// `{{ "app.node" | ident }}` -> `"app"."node"`
pub(crate) fn ident_filter(name: &str) -> String {
    quote_qualified(name)
}

/// `{{ "it's" | literal }}` -> `'it''s'`
pub(crate) fn literal_filter(value: &str) -> String {
    format!("'{}'", escape_sql_string(value))
}

#[cfg(test)]
#[path = "functions_test.rs"]
mod tests;
