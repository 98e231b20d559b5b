use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use rusqlite::{Connection, OpenFlags, params_from_iter};

use super::executor::Executor;
use super::trace::{Completion, SqlTrace};
use crate::config::DatabaseConfig;
use crate::error::{QbError, QbResult};
use crate::row::Row;
use crate::value::Value;

/// Handle to a single SQLite connection.
///
/// Clones share the same connection. The connection lives until [`close`](Self::close)
/// is called or the last clone is dropped.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Option<Connection>>>,
    config: Arc<DatabaseConfig>,
    trace: SqlTrace,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.config.path)
            .field("open", &self.is_open())
            .finish()
    }
}

impl Database {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> QbResult<Self> {
        Self::open_with_config(DatabaseConfig::new(path))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> QbResult<Self> {
        Self::open_with_config(DatabaseConfig::in_memory())
    }

    pub fn open_with_config(config: DatabaseConfig) -> QbResult<Self> {
        let flags = if config.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX
        } else {
            OpenFlags::default()
        };
        let opened = if config.is_in_memory() {
            Connection::open_in_memory_with_flags(flags)
        } else {
            Connection::open_with_flags(&config.path, flags)
        };
        let conn = opened
            .map_err(|e| QbError::Connection(format!("{}: {e}", config.path.display())))?;
        if let Some(timeout) = config.busy_timeout {
            conn.busy_timeout(timeout)?;
        }

        tracing::debug!(
            target: "litequery.db",
            path = %config.path.display(),
            read_only = config.read_only,
            "opened database"
        );

        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
            trace: SqlTrace::from_config(&config),
            config: Arc::new(config),
        })
    }

    /// Open using `LITEQUERY_*` environment variables.
    pub fn open_from_env() -> QbResult<Self> {
        Self::open_with_config(DatabaseConfig::from_env())
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Whether the connection is still open.
    ///
    /// This takes the connection lock on the calling thread, so it blocks
    /// while a statement is running.
    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    /// Close the connection for every clone of this handle.
    ///
    /// Runs on the blocking pool and waits for an in-flight statement to
    /// finish. Calling this on an already closed handle is a no-op.
    pub async fn close(&self) -> QbResult<()> {
        let conn = Arc::clone(&self.conn);
        let closed = tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().unwrap_or_else(PoisonError::into_inner);
            let Some(conn) = guard.take() else {
                return Ok(false);
            };
            match conn.close() {
                Ok(()) => Ok(true),
                Err((conn, err)) => {
                    *guard = Some(conn);
                    Err(QbError::from(err))
                }
            }
        })
        .await
        .map_err(|e| QbError::Task(e.to_string()))??;

        if closed {
            tracing::debug!(target: "litequery.db", path = %self.config.path.display(), "closed database");
        }
        Ok(())
    }

    /// Run a script of `;`-separated statements without parameters.
    pub async fn execute_batch(&self, sql: &str) -> QbResult<()> {
        let sql = sql.to_string();
        self.run(move |conn| conn.execute_batch(&sql).map_err(QbError::from))
            .await
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the connection on the blocking pool.
    async fn run<T, F>(&self, f: F) -> QbResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> QbResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().unwrap_or_else(PoisonError::into_inner);
            let conn = guard.as_ref().ok_or(QbError::ConnectionClosed)?;
            f(conn)
        })
        .await
        .map_err(|e| QbError::Task(e.to_string()))?
    }

    async fn traced<T, F>(
        &self,
        kind: &'static str,
        sql: &str,
        values: &[Value],
        outcome: fn(&T) -> Completion,
        f: F,
    ) -> QbResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, &str, &[Value]) -> QbResult<T> + Send + 'static,
    {
        self.trace.before(kind, sql, values.len());
        let start = Instant::now();
        let sql = sql.to_string();
        let values = values.to_vec();
        let result = self.run(move |conn| f(conn, &sql, &values)).await;
        match &result {
            Ok(out) => self.trace.finished(kind, outcome(out), start.elapsed()),
            Err(err) => self.trace.failed(kind, err, start.elapsed()),
        }
        result
    }
}

fn query_rows(conn: &Connection, sql: &str, values: &[Value]) -> QbResult<Vec<Row>> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Arc<[String]> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();
    let mut rows = stmt.query(params_from_iter(values.iter()))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(columns.len());
        for i in 0..columns.len() {
            cells.push(Value::from(row.get_ref(i)?));
        }
        out.push(Row::new(Arc::clone(&columns), cells));
    }
    Ok(out)
}

/// Row-returning statements are stepped to completion and report the number
/// of rows produced. Anything else reports the rows changed by this statement.
fn execute_statement(conn: &Connection, sql: &str, values: &[Value]) -> QbResult<u64> {
    let mut stmt = conn.prepare(sql)?;
    if stmt.column_count() > 0 {
        let mut rows = stmt.query(params_from_iter(values.iter()))?;
        let mut produced = 0u64;
        while rows.next()?.is_some() {
            produced += 1;
        }
        return Ok(produced);
    }
    let affected = stmt.execute(params_from_iter(values.iter()))?;
    Ok(affected as u64)
}

impl Executor for Database {
    async fn query(&self, sql: &str, values: &[Value]) -> QbResult<Vec<Row>> {
        self.traced(
            "query",
            sql,
            values,
            |rows: &Vec<Row>| Completion::Rows(rows.len()),
            query_rows,
        )
        .await
    }

    async fn execute(&self, sql: &str, values: &[Value]) -> QbResult<u64> {
        self.traced(
            "execute",
            sql,
            values,
            |n: &u64| Completion::Affected(*n),
            execute_statement,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.is_open());
        db.close().await.unwrap();
        db.close().await.unwrap();
        assert!(!db.is_open());
    }

    #[tokio::test]
    async fn test_closed_handle_rejects_statements() {
        let db = Database::open_in_memory().unwrap();
        let other = db.clone();
        db.close().await.unwrap();
        let err = other.query("SELECT 1", &[]).await.unwrap_err();
        assert!(err.is_connection_closed());
    }

    #[tokio::test]
    async fn test_query_reads_columns_and_values() {
        let db = Database::open_in_memory().unwrap();
        let rows = db
            .query("SELECT ? AS n, ? AS s, NULL AS z", &[Value::Integer(2), Value::from("x")])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].columns(), &["n".to_string(), "s".to_string(), "z".to_string()][..]);
        assert_eq!(rows[0].values(), &[Value::Integer(2), Value::from("x"), Value::Null][..]);
    }

    #[tokio::test]
    async fn test_list_value_fails_to_bind() {
        let db = Database::open_in_memory().unwrap();
        let err = db
            .query("SELECT ?", &[Value::from(vec![1, 2])])
            .await
            .unwrap_err();
        assert!(err.is_sqlite());
    }

    #[tokio::test]
    async fn test_execute_counts_only_this_statement() {
        let db = Database::open_in_memory().unwrap();
        db.execute_batch("CREATE TABLE t (id INTEGER); INSERT INTO t VALUES (1), (2);")
            .await
            .unwrap();

        // nothing written, so the INSERT's count must not leak through
        let affected = db
            .execute("DELETE FROM t WHERE id = ?", &[Value::from(99)])
            .await
            .unwrap();
        assert_eq!(affected, 0);

        let produced = db
            .execute("SELECT * FROM t WHERE id = ?", &[Value::from(99)])
            .await
            .unwrap();
        assert_eq!(produced, 0);

        let produced = db.execute("SELECT * FROM t", &[]).await.unwrap();
        assert_eq!(produced, 2);
    }

    #[tokio::test]
    async fn test_busy_timeout_is_applied() {
        let config = DatabaseConfig::in_memory().with_busy_timeout(std::time::Duration::from_millis(250));
        let db = Database::open_with_config(config).unwrap();
        let rows = db.query("PRAGMA busy_timeout", &[]).await.unwrap();
        assert_eq!(rows[0].get_index(0), Some(&Value::Integer(250)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_close_waits_for_running_statement() {
        let db = Database::open_in_memory().unwrap();
        let running = {
            let db = db.clone();
            tokio::spawn(async move {
                db.query(
                    "WITH RECURSIVE c(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM c WHERE x < 2000000) \
                     SELECT count(*) AS n FROM c",
                    &[],
                )
                .await
            })
        };
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        db.close().await.unwrap();

        let rows = running.await.unwrap().unwrap();
        assert_eq!(rows[0].get("n"), Some(&Value::Integer(2_000_000)));
        assert!(!db.is_open());
    }
}
