//! Schema operations as data
//!
//! [`SchemaOp`] is the externally tagged form used by YAML migrations:
//!
//! ```yaml
//! up:
//!   - create_schema: { name: app }
//!   - create_table:
//!       name: node
//!       columns:
//!         - { name: id, type: uuid, primary_key: true }
//!   - sql: ALTER TABLE app.node ADD COLUMN name text;
//! ```

use crate::defs::{FunctionDef, PolicyDef, TableDef, TriggerDef, ViewDef};
use crate::error::{SchemaError, SchemaResult};
use serde::Deserialize;
use sq_core::sql_utils::{qualify_in_schema, quote_ident};

/// `CREATE SCHEMA`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateSchemaDef {
    pub name: String,

    #[serde(default = "default_true")]
    pub if_not_exists: bool,
}

/// `DROP TABLE | VIEW | SCHEMA`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DropDef {
    pub name: String,

    #[serde(default)]
    pub cascade: bool,
}

/// `DROP FUNCTION`, identified by its argument types
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DropFunctionDef {
    pub name: String,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub cascade: bool,
}

/// One declarative schema operation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaOp {
    CreateSchema(CreateSchemaDef),
    CreateTable(TableDef),
    CreateView(ViewDef),
    CreateFunction(FunctionDef),
    CreateTrigger(TriggerDef),
    CreatePolicy(PolicyDef),
    DropTable(DropDef),
    DropView(DropDef),
    DropFunction(DropFunctionDef),
    DropSchema(DropDef),
    /// Raw SQL, executed as a single statement
    Sql(String),
}

impl SchemaOp {
    /// Operation name as written in YAML
    pub fn kind(&self) -> &'static str {
        match self {
            SchemaOp::CreateSchema(_) => "create_schema",
            SchemaOp::CreateTable(_) => "create_table",
            SchemaOp::CreateView(_) => "create_view",
            SchemaOp::CreateFunction(_) => "create_function",
            SchemaOp::CreateTrigger(_) => "create_trigger",
            SchemaOp::CreatePolicy(_) => "create_policy",
            SchemaOp::DropTable(_) => "drop_table",
            SchemaOp::DropView(_) => "drop_view",
            SchemaOp::DropFunction(_) => "drop_function",
            SchemaOp::DropSchema(_) => "drop_schema",
            SchemaOp::Sql(_) => "sql",
        }
    }

    /// Render the statements this operation executes against `schema`.
    pub fn to_sql(&self, schema: &str) -> SchemaResult<Vec<String>> {
        match self {
            SchemaOp::CreateSchema(def) => {
                require_name("schema", &def.name)?;
                Ok(vec![format!(
                    "CREATE SCHEMA {}{};",
                    if def.if_not_exists {
                        "IF NOT EXISTS "
                    } else {
                        ""
                    },
                    quote_ident(&def.name)
                )])
            }
            SchemaOp::CreateTable(def) => def.to_sql(schema),
            SchemaOp::CreateView(def) => def.to_sql(schema),
            SchemaOp::CreateFunction(def) => def.to_sql(schema),
            SchemaOp::CreateTrigger(def) => def.to_sql(schema),
            SchemaOp::CreatePolicy(def) => def.to_sql(schema),
            SchemaOp::DropTable(def) => drop_statement("TABLE", schema, def),
            SchemaOp::DropView(def) => drop_statement("VIEW", schema, def),
            SchemaOp::DropFunction(def) => {
                require_name("function", &def.name)?;
                Ok(vec![format!(
                    "DROP FUNCTION IF EXISTS {}({}){};",
                    qualify_in_schema(schema, &def.name),
                    def.args.join(", "),
                    cascade(def.cascade)
                )])
            }
            SchemaOp::DropSchema(def) => {
                require_name("schema", &def.name)?;
                Ok(vec![format!(
                    "DROP SCHEMA IF EXISTS {}{};",
                    quote_ident(&def.name),
                    cascade(def.cascade)
                )])
            }
            SchemaOp::Sql(sql) => {
                let sql = sql.trim();
                if sql.is_empty() {
                    return Err(SchemaError::invalid("sql", "", "statement is empty"));
                }
                Ok(vec![sql.to_string()])
            }
        }
    }
}

fn drop_statement(object: &'static str, schema: &str, def: &DropDef) -> SchemaResult<Vec<String>> {
    require_name("drop", &def.name)?;
    Ok(vec![format!(
        "DROP {} IF EXISTS {}{};",
        object,
        qualify_in_schema(schema, &def.name),
        cascade(def.cascade)
    )])
}

fn cascade(enabled: bool) -> &'static str {
    if enabled {
        " CASCADE"
    } else {
        ""
    }
}

fn require_name(kind: &'static str, name: &str) -> SchemaResult<()> {
    if name.trim().is_empty() {
        return Err(SchemaError::invalid(kind, name, "name is empty"));
    }
    Ok(())
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
#[path = "op_test.rs"]
mod tests;
