use std::time::Duration;

use tracing::Level;

use crate::config::DatabaseConfig;
use crate::error::QbError;

const TARGET: &str = "litequery.sql";

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN  => tracing::warn!($($field)*),
            Level::INFO  => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

/// What a finished statement reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Completion {
    /// Rows returned by a query.
    Rows(usize),
    /// Rows changed (or produced, for row-returning statements) by an execute.
    Affected(u64),
}

/// Emits one event per executed statement, plus one on completion.
#[derive(Debug, Clone)]
pub(crate) struct SqlTrace {
    level: Level,
    max_sql_length: Option<usize>,
}

impl SqlTrace {
    pub(crate) fn from_config(config: &DatabaseConfig) -> Self {
        Self {
            level: config.log_level,
            max_sql_length: config.max_sql_length,
        }
    }

    fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    pub(crate) fn before(&self, kind: &'static str, sql: &str, param_count: usize) {
        let sql = self.truncate_sql(sql);
        emit_at_level!(
            self.level,
            target: TARGET,
            kind,
            param_count,
            sql = %sql,
            "executing statement"
        );
    }

    pub(crate) fn finished(&self, kind: &'static str, outcome: Completion, elapsed: Duration) {
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        match outcome {
            Completion::Rows(rows) => emit_at_level!(
                self.level,
                target: TARGET,
                kind,
                rows,
                elapsed_ms,
                "statement finished"
            ),
            Completion::Affected(affected) => emit_at_level!(
                self.level,
                target: TARGET,
                kind,
                affected,
                elapsed_ms,
                "statement finished"
            ),
        }
    }

    pub(crate) fn failed(&self, kind: &'static str, err: &QbError, elapsed: Duration) {
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        tracing::warn!(target: TARGET, kind, elapsed_ms, error = %err, "statement failed");
    }
}
