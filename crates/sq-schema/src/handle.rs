//! Driver-backed, schema-scoped handle handed to migrations

use crate::defs::{FunctionDef, PolicyDef, TableDef, TriggerDef, ViewDef};
use crate::error::{SchemaError, SchemaResult};
use crate::op::{CreateSchemaDef, SchemaOp};
use sq_driver::{CompiledQuery, Driver, QueryResult};

/// Entry point migrations use to change the schema.
///
/// Every method compiles its statements and executes them on the driver one
/// at a time, in order. With a capturing driver this records the SQL; with a
/// real driver it applies it.
pub struct SchemaHandle<'d> {
    driver: &'d mut dyn Driver,
    schema: String,
}

impl<'d> SchemaHandle<'d> {
    pub fn new(driver: &'d mut dyn Driver, schema: impl Into<String>) -> Self {
        Self {
            driver,
            schema: schema.into(),
        }
    }

    /// Schema that bare object names resolve into
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Execute one raw statement
    pub fn execute(&mut self, sql: impl Into<String>) -> SchemaResult<QueryResult> {
        let query = CompiledQuery::new(sql);
        Ok(self.driver.execute_compiled(&query)?)
    }

    /// A handle on the same driver scoped to another schema
    pub fn with_schema(&mut self, schema: impl Into<String>) -> SchemaHandle<'_> {
        SchemaHandle {
            driver: &mut *self.driver,
            schema: schema.into(),
        }
    }

    /// Run `f` inside a driver transaction.
    ///
    /// Commits when `f` succeeds. When it fails the transaction is rolled back
    /// and `f`'s error is returned; a rollback failure is only logged.
    pub fn transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<SchemaError>,
    {
        self.driver.begin_transaction().map_err(SchemaError::from)?;
        match f(self) {
            Ok(value) => {
                self.driver
                    .commit_transaction()
                    .map_err(SchemaError::from)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = self.driver.rollback_transaction() {
                    log::warn!("rollback failed on {}: {}", self.driver.driver_type(), rollback);
                }
                Err(err)
            }
        }
    }

    /// `CREATE SCHEMA IF NOT EXISTS`
    pub fn create_schema(&mut self, name: &str) -> SchemaResult<()> {
        self.apply(&SchemaOp::CreateSchema(CreateSchemaDef {
            name: name.to_string(),
            if_not_exists: true,
        }))
    }

    pub fn create_table(&mut self, table: &TableDef) -> SchemaResult<()> {
        let statements = table.to_sql(&self.schema)?;
        self.run(statements)
    }

    pub fn create_view(&mut self, view: &ViewDef) -> SchemaResult<()> {
        let statements = view.to_sql(&self.schema)?;
        self.run(statements)
    }

    pub fn create_function(&mut self, function: &FunctionDef) -> SchemaResult<()> {
        let statements = function.to_sql(&self.schema)?;
        self.run(statements)
    }

    pub fn create_trigger(&mut self, trigger: &TriggerDef) -> SchemaResult<()> {
        let statements = trigger.to_sql(&self.schema)?;
        self.run(statements)
    }

    pub fn create_policy(&mut self, policy: &PolicyDef) -> SchemaResult<()> {
        let statements = policy.to_sql(&self.schema)?;
        self.run(statements)
    }

    /// Execute a declarative operation
    pub fn apply(&mut self, op: &SchemaOp) -> SchemaResult<()> {
        log::trace!("applying {} in schema {}", op.kind(), self.schema);
        let statements = op.to_sql(&self.schema)?;
        self.run(statements)
    }

    fn run(&mut self, statements: Vec<String>) -> SchemaResult<()> {
        for sql in statements {
            self.execute(sql)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for SchemaHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaHandle")
            .field("driver", &self.driver.driver_type())
            .field("schema", &self.schema)
            .finish()
    }
}

#[cfg(test)]
#[path = "handle_test.rs"]
mod tests;
