//! Convenient imports for typical `litequery` usage.
//!
//! ```ignore
//! use litequery::prelude::*;
//! ```

pub use crate::{
    Database, Executor, FromRow, QbError, QbResult, QueryBuilder, Row, Value, delete_from, select,
    select_from,
};
