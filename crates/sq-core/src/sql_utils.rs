//! SQL identifier quoting utilities
//!
//! Used by the schema-definition layer to build DDL from declarative
//! definitions without splicing raw identifiers into statements.

/// Double-quote an identifier, doubling embedded quotes.
///
/// ```
/// use sq_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("node"), r#""node""#);
/// assert_eq!(quote_ident(r#"odd"name"#), r#""odd""name""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote each dot-separated component of `app.node`-style names.
///
/// ```
/// use sq_core::sql_utils::quote_qualified;
/// assert_eq!(quote_qualified("node"), r#""node""#);
/// assert_eq!(quote_qualified("app.node"), r#""app"."node""#);
/// ```
pub fn quote_qualified(name: &str) -> String {
    name.split('.')
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(".")
}

/// Qualify `name` with `schema` unless it already carries its own schema.
///
/// # Examples
/// ```
/// use sq_core::sql_utils::qualify_in_schema;
/// assert_eq!(qualify_in_schema("app", "node"), r#""app"."node""#);
/// assert_eq!(qualify_in_schema("app", "public.node"), r#""public"."node""#);
/// ```
pub fn qualify_in_schema(schema: &str, name: &str) -> String {
    if name.contains('.') {
        quote_qualified(name)
    } else {
        format!("{}.{}", quote_ident(schema), quote_ident(name))
    }
}

/// Escape text for a single-quoted literal. Not for identifiers.
pub fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("node"), r#""node""#);
        assert_eq!(quote_ident(r#"odd"name"#), r#""odd""name""#);
        // dots are literal here
        assert_eq!(quote_ident("app.node"), r#""app.node""#);
    }

    #[test]
    fn test_quote_qualified() {
        assert_eq!(quote_qualified("app.node"), r#""app"."node""#);
    }

    #[test]
    fn test_qualify_in_schema() {
        assert_eq!(qualify_in_schema("app", "node"), r#""app"."node""#);
        assert_eq!(qualify_in_schema("app", "other.node"), r#""other"."node""#);
    }

    #[test]
    fn test_escape_sql_string() {
        assert_eq!(escape_sql_string("hello"), "hello");
        assert_eq!(escape_sql_string("it's"), "it''s");
    }
}
