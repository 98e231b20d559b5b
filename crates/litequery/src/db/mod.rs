//! Database collaborator.
//!
//! [`Database`] is an explicit, cloneable handle to one SQLite connection.
//! Statements run on tokio's blocking pool so callers can `.await` them.
//! Builders execute through the [`Executor`] trait, so tests and callers can
//! supply their own implementation.
//!
//! # Example
//!
//! ```ignore
//! use litequery::{Database, select};
//!
//! let db = Database::open("app.db")?;
//! let rows = select("users").and("age__gte", 18)?.fetch_all(&db).await?;
//! db.close().await?;
//! ```

mod connection;
mod executor;
mod trace;

pub use connection::Database;
pub use executor::Executor;
