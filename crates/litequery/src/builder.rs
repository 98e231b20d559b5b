//! Statement builder.
//!
//! [`QueryBuilder`] holds a base SELECT/DELETE statement plus the conditions
//! added through [`and`](QueryBuilder::and) / [`or`](QueryBuilder::or).
//! Conditions are joined strictly left to right with the operator of the call
//! that added them; there is no grouping, so
//! `and("a", 1)?.or("b", 2)?.and("c", 3)?` renders `a = ? OR b = ? AND c = ?`
//! and SQLite applies its own precedence (AND before OR).
//!
//! The builder stays usable after [`build`](QueryBuilder::build): calling more
//! `and`/`or` changes what the next `build` returns. Clone it to keep a
//! snapshot.
//!
//! # Example
//!
//! ```
//! use litequery::Value;
//!
//! let qb = litequery::select("users")
//!     .and("age__gte", 18)?
//!     .or("name__contains", "an")?;
//!
//! assert_eq!(qb.build(), "SELECT * FROM users WHERE age >= ? OR name LIKE ?");
//! assert_eq!(qb.values(), &[Value::from(18), Value::from("%an%")][..]);
//! # Ok::<(), litequery::QbError>(())
//! ```

use std::fmt;

use crate::config::BuilderConfig;
use crate::db::Executor;
use crate::error::{QbError, QbResult};
use crate::lookup::compile_with;
use crate::row::{FromRow, Row};
use crate::value::Value;

/// Kind of base statement a builder renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Delete,
}

/// Boolean operator placed before a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BoolOp::And => "AND",
            BoolOp::Or => "OR",
        }
    }
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fluent SELECT/DELETE builder with lookup-based WHERE conditions.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    /// SQL up to, not including, WHERE
    base: String,
    kind: Option<StatementKind>,
    /// First entry bare, later entries prefixed with `AND `/`OR `
    conditions: Vec<String>,
    /// Bound values in placeholder order
    values: Vec<Value>,
    config: BuilderConfig,
}

impl QueryBuilder {
    /// Create an empty builder. Pick a base with `select*` or `delete_from`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how conditions are compiled.
    pub fn with_config(mut self, config: BuilderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    // ==================== Base statement ====================

    /// Base `SELECT * FROM table`. Replaces any previous base.
    pub fn select(mut self, table: &str) -> Self {
        self.set_select(table, "*".to_string());
        self
    }

    /// Base `SELECT <columns> FROM table`. Replaces any previous base.
    pub fn select_from<S: AsRef<str>>(mut self, table: &str, columns: &[S]) -> QbResult<Self> {
        if columns.is_empty() {
            return Err(QbError::EmptyColumnList);
        }
        let cols = columns
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(", ");
        self.set_select(table, cols);
        Ok(self)
    }

    /// Base `DELETE FROM table`. Replaces any previous base.
    ///
    /// Without conditions this deletes every row.
    pub fn delete_from(mut self, table: &str) -> Self {
        self.base = format!("DELETE FROM {table}");
        self.kind = Some(StatementKind::Delete);
        self
    }

    fn set_select(&mut self, table: &str, cols: String) {
        self.base = format!("SELECT {cols} FROM {table}");
        self.kind = Some(StatementKind::Select);
    }

    // ==================== Conditions ====================

    /// Add a condition joined with `AND`.
    ///
    /// Errors from compiling `field` / `value` are returned here, not at build.
    pub fn and(self, field: &str, value: impl Into<Value>) -> QbResult<Self> {
        self.push_condition(BoolOp::And, field, value.into())
    }

    /// Add a condition joined with `OR`.
    pub fn or(self, field: &str, value: impl Into<Value>) -> QbResult<Self> {
        self.push_condition(BoolOp::Or, field, value.into())
    }

    fn push_condition(mut self, op: BoolOp, field: &str, value: Value) -> QbResult<Self> {
        let (clause, values) = compile_with(field, value, &self.config)?.into_parts();
        if self.conditions.is_empty() {
            self.conditions.push(clause);
        } else {
            self.conditions.push(format!("{op} {clause}"));
        }
        self.values.extend(values);
        Ok(self)
    }

    // ==================== Build ====================

    /// Render the SQL. Idempotent and non-consuming.
    pub fn build(&self) -> String {
        if self.conditions.is_empty() {
            return self.base.clone();
        }
        format!("{} WHERE {}", self.base, self.conditions.join(" "))
    }

    /// Alias for [`build`](Self::build).
    pub fn to_sql(&self) -> String {
        self.build()
    }

    /// Bound values, in the order their placeholders appear in [`build`](Self::build).
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Rendered conditions, operator-prefixed after the first.
    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    pub fn is_filtered(&self) -> bool {
        !self.conditions.is_empty()
    }

    pub fn statement_kind(&self) -> Option<StatementKind> {
        self.kind
    }

    /// Check builder state before execution.
    pub fn validate(&self) -> QbResult<()> {
        if self.kind.is_none() {
            return Err(QbError::MissingStatement);
        }
        Ok(())
    }

    /// Consume the builder into SQL and bound values.
    pub fn into_parts(self) -> (String, Vec<Value>) {
        let sql = self.build();
        (sql, self.values)
    }

    // ==================== Execution ====================

    /// Execute and return all rows (empty for DELETE).
    pub async fn fetch_all(&self, conn: &impl Executor) -> QbResult<Vec<Row>> {
        self.validate()?;
        conn.query(&self.build(), &self.values).await
    }

    /// Execute and map all rows to `T`.
    pub async fn fetch_all_as<T: FromRow>(&self, conn: &impl Executor) -> QbResult<Vec<T>> {
        let rows = self.fetch_all(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute and return the first row, if any.
    pub async fn fetch_optional(&self, conn: &impl Executor) -> QbResult<Option<Row>> {
        self.validate()?;
        conn.query_opt(&self.build(), &self.values).await
    }

    /// Execute and return the affected row count (rows produced, for SELECT).
    pub async fn execute(&self, conn: &impl Executor) -> QbResult<u64> {
        self.validate()?;
        conn.execute(&self.build(), &self.values).await
    }
}

impl fmt::Display for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}
