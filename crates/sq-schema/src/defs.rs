//! Declarative schema definitions and their SQL rendering
//!
//! Each definition renders to one or more complete statements (terminated by
//! `;`) relative to a target schema. Names that already carry a schema
//! (`other.node`) keep it; bare names are placed in the target schema.

use crate::error::{SchemaError, SchemaResult};
use serde::Deserialize;
use sq_core::sql_utils::{qualify_in_schema, quote_ident};
use std::fmt;

/// Column of a [`TableDef`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnDef {
    pub name: String,

    /// SQL type, written verbatim (`uuid`, `text`, `timestamptz`)
    #[serde(rename = "type")]
    pub data_type: String,

    #[serde(default)]
    pub primary_key: bool,

    #[serde(default)]
    pub not_null: bool,

    /// Default expression, written verbatim
    #[serde(default)]
    pub default: Option<String>,

    /// Referenced table, optionally with a column: `member` or `member(id)`
    #[serde(default)]
    pub references: Option<String>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            primary_key: false,
            not_null: false,
            default: None,
            references: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn default_to(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    pub fn references(mut self, target: impl Into<String>) -> Self {
        self.references = Some(target.into());
        self
    }

    fn render(&self, schema: &str) -> String {
        let mut out = format!("{} {}", quote_ident(&self.name), self.data_type);
        if self.primary_key {
            out.push_str(" PRIMARY KEY");
        }
        if self.not_null {
            out.push_str(" NOT NULL");
        }
        if let Some(default) = &self.default {
            out.push_str(" DEFAULT ");
            out.push_str(default);
        }
        if let Some(target) = &self.references {
            out.push_str(" REFERENCES ");
            out.push_str(&render_reference(schema, target));
        }
        out
    }
}

/// `member(id)` -> `"schema"."member"("id")`
fn render_reference(schema: &str, target: &str) -> String {
    match target.split_once('(') {
        Some((table, rest)) => {
            let column = rest.trim_end_matches(')').trim();
            format!(
                "{}({})",
                qualify_in_schema(schema, table.trim()),
                quote_ident(column)
            )
        }
        None => qualify_in_schema(schema, target.trim()),
    }
}

/// `CREATE TABLE`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableDef {
    pub name: String,

    pub columns: Vec<ColumnDef>,

    /// Column groups that get a `UNIQUE (...)` constraint
    #[serde(default)]
    pub unique: Vec<Vec<String>>,

    /// Emit `ALTER TABLE ... ENABLE ROW LEVEL SECURITY` after creation
    #[serde(default)]
    pub row_level_security: bool,

    #[serde(default)]
    pub if_not_exists: bool,
}

impl TableDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            unique: Vec::new(),
            row_level_security: false,
            if_not_exists: false,
        }
    }

    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    pub fn unique<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unique.push(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn row_level_security(mut self) -> Self {
        self.row_level_security = true;
        self
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    pub fn to_sql(&self, schema: &str) -> SchemaResult<Vec<String>> {
        require_name("table", &self.name)?;
        if self.columns.is_empty() {
            return Err(SchemaError::invalid(
                "table",
                &self.name,
                "at least one column is required",
            ));
        }
        for group in &self.unique {
            if group.is_empty() {
                return Err(SchemaError::invalid(
                    "table",
                    &self.name,
                    "unique constraint has no columns",
                ));
            }
            if let Some(missing) = group
                .iter()
                .find(|c| !self.columns.iter().any(|col| &col.name == *c))
            {
                return Err(SchemaError::invalid(
                    "table",
                    &self.name,
                    format!("unique constraint references unknown column '{missing}'"),
                ));
            }
        }

        let table = qualify_in_schema(schema, &self.name);
        let mut body: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("  {}", c.render(schema)))
            .collect();
        for group in &self.unique {
            let cols: Vec<String> = group.iter().map(|c| quote_ident(c)).collect();
            body.push(format!("  UNIQUE ({})", cols.join(", ")));
        }

        let mut statements = vec![format!(
            "CREATE TABLE {}{} (\n{}\n);",
            if self.if_not_exists {
                "IF NOT EXISTS "
            } else {
                ""
            },
            table,
            body.join(",\n")
        )];
        if self.row_level_security {
            statements.push(format!("ALTER TABLE {table} ENABLE ROW LEVEL SECURITY;"));
        }
        Ok(statements)
    }
}

/// `CREATE VIEW`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewDef {
    pub name: String,

    /// The view's `SELECT`, without a trailing semicolon
    pub query: String,

    #[serde(default)]
    pub or_replace: bool,

    /// Run the view with the privileges of the querying role
    #[serde(default = "default_true")]
    pub security_invoker: bool,
}

impl ViewDef {
    pub fn new(name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            query: query.into(),
            or_replace: false,
            security_invoker: true,
        }
    }

    pub fn to_sql(&self, schema: &str) -> SchemaResult<Vec<String>> {
        require_name("view", &self.name)?;
        let query = self.query.trim().trim_end_matches(';').trim_end();
        if query.is_empty() {
            return Err(SchemaError::invalid("view", &self.name, "query is empty"));
        }

        let view = qualify_in_schema(schema, &self.name);
        let mut statements = vec![format!(
            "CREATE {}VIEW {} AS\n{};",
            if self.or_replace { "OR REPLACE " } else { "" },
            view,
            query
        )];
        if self.security_invoker {
            statements.push(format!("ALTER VIEW {view} SET (security_invoker = on);"));
        }
        Ok(statements)
    }
}

/// Argument of a [`FunctionDef`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionArg {
    pub name: String,

    #[serde(rename = "type")]
    pub data_type: String,

    #[serde(default)]
    pub default: Option<String>,
}

impl FunctionArg {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            default: None,
        }
    }
}

/// `CREATE FUNCTION`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionDef {
    pub name: String,

    #[serde(default)]
    pub args: Vec<FunctionArg>,

    #[serde(default = "default_returns")]
    pub returns: String,

    #[serde(default = "default_language")]
    pub language: String,

    /// plpgsql `DECLARE` entries; a missing trailing `;` is added
    #[serde(default)]
    pub declare: Vec<String>,

    pub body: String,

    #[serde(default)]
    pub security_definer: bool,

    /// Emit `DROP FUNCTION IF EXISTS ... CASCADE` first
    #[serde(default = "default_true")]
    pub drop_existing: bool,
}

impl FunctionDef {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            returns: default_returns(),
            language: default_language(),
            declare: Vec::new(),
            body: body.into(),
            security_definer: false,
            drop_existing: true,
        }
    }

    pub fn arg(mut self, arg: FunctionArg) -> Self {
        self.args.push(arg);
        self
    }

    pub fn returns(mut self, returns: impl Into<String>) -> Self {
        self.returns = returns.into();
        self
    }

    pub fn security_definer(mut self) -> Self {
        self.security_definer = true;
        self
    }

    /// Argument type list used to identify the function in `DROP FUNCTION`
    fn signature_types(&self) -> String {
        self.args
            .iter()
            .map(|a| a.data_type.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn to_sql(&self, schema: &str) -> SchemaResult<Vec<String>> {
        require_name("function", &self.name)?;
        if self.body.trim().is_empty() {
            return Err(SchemaError::invalid("function", &self.name, "body is empty"));
        }
        let plpgsql = self.language.eq_ignore_ascii_case("plpgsql");
        if !self.declare.is_empty() && !plpgsql {
            return Err(SchemaError::invalid(
                "function",
                &self.name,
                format!("declare is only supported for plpgsql, not {}", self.language),
            ));
        }

        let function = qualify_in_schema(schema, &self.name);
        let mut statements = Vec::new();
        if self.drop_existing {
            statements.push(format!(
                "DROP FUNCTION IF EXISTS {}({}) CASCADE;",
                function,
                self.signature_types()
            ));
        }

        let args: Vec<String> = self
            .args
            .iter()
            .map(|a| match &a.default {
                Some(default) => {
                    format!("{} {} DEFAULT {}", quote_ident(&a.name), a.data_type, default)
                }
                None => format!("{} {}", quote_ident(&a.name), a.data_type),
            })
            .collect();

        let mut sql = format!(
            "CREATE FUNCTION {}({})\nRETURNS {}\nLANGUAGE {}\n",
            function,
            args.join(", "),
            self.returns,
            self.language
        );
        if self.security_definer {
            sql.push_str("SECURITY DEFINER\n");
        }
        sql.push_str("AS $$\n");
        if plpgsql {
            if !self.declare.is_empty() {
                sql.push_str("DECLARE\n");
                for item in &self.declare {
                    let item = item.trim();
                    sql.push_str("  ");
                    sql.push_str(item);
                    if !item.ends_with(';') {
                        sql.push(';');
                    }
                    sql.push('\n');
                }
            }
            sql.push_str("BEGIN\n");
            sql.push_str(&indent(self.body.trim()));
            sql.push_str("\nEND;\n");
        } else {
            sql.push_str(self.body.trim());
            sql.push('\n');
        }
        sql.push_str("$$;");
        statements.push(sql);
        Ok(statements)
    }
}

/// Trigger firing time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriggerTiming {
    #[serde(alias = "before")]
    Before,
    #[serde(alias = "after")]
    After,
}

impl fmt::Display for TriggerTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerTiming::Before => write!(f, "BEFORE"),
            TriggerTiming::After => write!(f, "AFTER"),
        }
    }
}

/// Row event a trigger fires on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriggerEvent {
    #[serde(alias = "insert")]
    Insert,
    #[serde(alias = "update")]
    Update,
    #[serde(alias = "delete")]
    Delete,
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerEvent::Insert => write!(f, "INSERT"),
            TriggerEvent::Update => write!(f, "UPDATE"),
            TriggerEvent::Delete => write!(f, "DELETE"),
        }
    }
}

/// Row trigger backed by a generated plpgsql trigger function.
///
/// For table `node`, timing `BEFORE` and name `touch`, the function is
/// `trigger_node_before_touch_fn` and one trigger per event is created as
/// `trigger_node_before_touch_<event>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerDef {
    pub name: String,

    pub table: String,

    pub timing: TriggerTiming,

    pub events: Vec<TriggerEvent>,

    #[serde(default)]
    pub declare: Vec<String>,

    /// plpgsql body of the trigger function; must return `NEW`, `OLD` or `NULL`
    pub body: String,
}

impl TriggerDef {
    pub fn new(
        name: impl Into<String>,
        table: impl Into<String>,
        timing: TriggerTiming,
        events: Vec<TriggerEvent>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            timing,
            events,
            declare: Vec::new(),
            body: body.into(),
        }
    }

    fn base_name(&self) -> String {
        let table = self.table.rsplit('.').next().unwrap_or(&self.table);
        format!("trigger_{}_{}_{}", table, self.timing, self.name).to_lowercase()
    }

    pub fn to_sql(&self, schema: &str) -> SchemaResult<Vec<String>> {
        require_name("trigger", &self.name)?;
        if self.table.trim().is_empty() {
            return Err(SchemaError::invalid("trigger", &self.name, "table is empty"));
        }
        if self.events.is_empty() {
            return Err(SchemaError::invalid(
                "trigger",
                &self.name,
                "at least one event is required",
            ));
        }

        let base = self.base_name();
        let function = FunctionDef {
            name: format!("{base}_fn"),
            args: Vec::new(),
            returns: "TRIGGER".to_string(),
            language: default_language(),
            declare: self.declare.clone(),
            body: self.body.clone(),
            security_definer: false,
            drop_existing: true,
        };
        let function_name = qualify_in_schema(schema, &function.name);
        let table = qualify_in_schema(schema, &self.table);

        let mut statements = function.to_sql(schema)?;
        for event in &self.events {
            let trigger = format!("{}_{}", base, event.to_string().to_lowercase());
            statements.push(format!(
                "CREATE TRIGGER {} {} {} ON {} FOR EACH ROW EXECUTE FUNCTION {}();",
                quote_ident(&trigger),
                self.timing,
                event,
                table,
                function_name
            ));
        }
        Ok(statements)
    }
}

/// Command a row-level security policy applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PolicyCommand {
    #[default]
    #[serde(alias = "all")]
    All,
    #[serde(alias = "select")]
    Select,
    #[serde(alias = "insert")]
    Insert,
    #[serde(alias = "update")]
    Update,
    #[serde(alias = "delete")]
    Delete,
}

impl fmt::Display for PolicyCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PolicyCommand::All => "ALL",
            PolicyCommand::Select => "SELECT",
            PolicyCommand::Insert => "INSERT",
            PolicyCommand::Update => "UPDATE",
            PolicyCommand::Delete => "DELETE",
        };
        write!(f, "{s}")
    }
}

/// `CREATE POLICY`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyDef {
    pub name: String,

    pub table: String,

    /// `AS PERMISSIVE` when true, `AS RESTRICTIVE` otherwise
    #[serde(default = "default_true")]
    pub permissive: bool,

    #[serde(default)]
    pub command: PolicyCommand,

    /// Role names, written verbatim; empty means `PUBLIC`
    #[serde(default)]
    pub roles: Vec<String>,

    /// `USING` expression; defaults to `true` except for `INSERT` policies
    #[serde(default)]
    pub using: Option<String>,

    #[serde(default)]
    pub with_check: Option<String>,
}

impl PolicyDef {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            permissive: true,
            command: PolicyCommand::All,
            roles: Vec::new(),
            using: None,
            with_check: None,
        }
    }

    pub fn to_sql(&self, schema: &str) -> SchemaResult<Vec<String>> {
        require_name("policy", &self.name)?;
        if self.table.trim().is_empty() {
            return Err(SchemaError::invalid("policy", &self.name, "table is empty"));
        }

        let using = match (self.command, &self.using) {
            (PolicyCommand::Insert, Some(_)) => {
                return Err(SchemaError::invalid(
                    "policy",
                    &self.name,
                    "INSERT policies only accept with_check",
                ))
            }
            (PolicyCommand::Insert, None) => None,
            (_, Some(expr)) => Some(expr.trim().to_string()),
            (_, None) => Some("true".to_string()),
        };
        if self.with_check.is_some()
            && matches!(self.command, PolicyCommand::Select | PolicyCommand::Delete)
        {
            return Err(SchemaError::invalid(
                "policy",
                &self.name,
                format!("{} policies do not accept with_check", self.command),
            ));
        }

        let roles = if self.roles.is_empty() {
            "PUBLIC".to_string()
        } else {
            self.roles.join(", ")
        };

        let mut sql = format!(
            "CREATE POLICY {} ON {}\nAS {}\nFOR {}\nTO {}",
            quote_ident(&self.name),
            qualify_in_schema(schema, &self.table),
            if self.permissive {
                "PERMISSIVE"
            } else {
                "RESTRICTIVE"
            },
            self.command,
            roles
        );
        if let Some(using) = using {
            sql.push_str(&format!("\nUSING ({using})"));
        }
        if let Some(check) = &self.with_check {
            sql.push_str(&format!("\nWITH CHECK ({})", check.trim()));
        }
        sql.push(';');
        Ok(vec![sql])
    }
}

fn require_name(kind: &'static str, name: &str) -> SchemaResult<()> {
    if name.trim().is_empty() {
        return Err(SchemaError::invalid(kind, name, "name is empty"));
    }
    Ok(())
}

fn indent(body: &str) -> String {
    body.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("  {}", line.trim_end())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn default_true() -> bool {
    true
}

fn default_returns() -> String {
    "void".to_string()
}

fn default_language() -> String {
    "plpgsql".to_string()
}

#[cfg(test)]
#[path = "defs_test.rs"]
mod tests;
