//! # litequery
//!
//! A small fluent query builder for SQLite.
//!
//! ## Features
//!
//! - **Field lookups**: filters are written `column__lookup` (`age__gte`,
//!   `name__contains`, `id__in`, `expired__isnull`, ...)
//! - **Bound values only**: values always go through `?` placeholders, never
//!   into the SQL text
//! - **Explicit operators**: `and` / `or` are applied left to right, in call order
//! - **Explicit connection**: execution goes through a [`Database`] handle you
//!   pass in, not process-wide state
//!
//! ## Example
//!
//! ```
//! use litequery::Value;
//!
//! let qb = litequery::select_from("items", &["id", "name"])?
//!     .and("id__in", vec![1, 2, 3])?;
//!
//! assert_eq!(qb.build(), "SELECT id, name FROM items WHERE id IN (?, ?, ?)");
//! assert_eq!(qb.values(), &[Value::from(1), Value::from(2), Value::from(3)][..]);
//! # Ok::<(), litequery::QbError>(())
//! ```
//!
//! Executing against SQLite:
//!
//! ```ignore
//! let db = litequery::Database::open("app.db")?;
//! let deleted = litequery::delete_from("sessions")
//!     .and("expired__isnull", false)?
//!     .execute(&db)
//!     .await?;
//! ```

pub mod builder;
pub mod config;
pub mod db;
pub mod error;
pub mod lookup;
pub mod prelude;
pub mod row;
pub mod value;

pub use builder::{BoolOp, QueryBuilder, StatementKind};
pub use config::{BuilderConfig, DatabaseConfig, UnknownLookup};
pub use db::{Database, Executor};
pub use error::{QbError, QbResult};
pub use lookup::{Condition, FieldSpec, Lookup, compile};
pub use row::{FromRow, Row};
pub use value::{FromValue, Value};

/// Create a `SELECT * FROM table` builder.
///
/// # Example
/// ```
/// let qb = litequery::select("t");
/// assert_eq!(qb.build(), "SELECT * FROM t");
/// ```
pub fn select(table: &str) -> QueryBuilder {
    QueryBuilder::new().select(table)
}

/// Create a `SELECT <columns> FROM table` builder.
///
/// Fails with [`QbError::EmptyColumnList`] when `columns` is empty.
pub fn select_from<S: AsRef<str>>(table: &str, columns: &[S]) -> QbResult<QueryBuilder> {
    QueryBuilder::new().select_from(table, columns)
}

/// Create a `DELETE FROM table` builder.
pub fn delete_from(table: &str) -> QueryBuilder {
    QueryBuilder::new().delete_from(table)
}
