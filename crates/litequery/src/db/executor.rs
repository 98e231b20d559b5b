//! Execution trait the builders run through.

use crate::error::QbResult;
use crate::row::Row;
use crate::value::Value;

/// Something that can run a SQL string with `?` placeholders.
///
/// Errors from the underlying engine are returned as-is; implementations must
/// not retry.
pub trait Executor: Send + Sync {
    /// Execute a statement and return all rows.
    ///
    /// Statements that produce no rows (DELETE) return an empty vector.
    fn query(
        &self,
        sql: &str,
        values: &[Value],
    ) -> impl std::future::Future<Output = QbResult<Vec<Row>>> + Send;

    /// Execute a statement and return the first row, if any.
    ///
    /// The default implementation calls [`Executor::query`] and keeps the first row.
    fn query_opt(
        &self,
        sql: &str,
        values: &[Value],
    ) -> impl std::future::Future<Output = QbResult<Option<Row>>> + Send {
        async move {
            let rows = self.query(sql, values).await?;
            Ok(rows.into_iter().next())
        }
    }

    /// Execute a statement and return the rows it changed.
    ///
    /// For a row-returning statement this is the number of rows produced.
    fn execute(
        &self,
        sql: &str,
        values: &[Value],
    ) -> impl std::future::Future<Output = QbResult<u64>> + Send;
}
