//! Builder and database configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

/// Path SQLite interprets as a private in-memory database.
pub const MEMORY_PATH: &str = ":memory:";

/// Environment variable holding the database path for [`DatabaseConfig::from_env`].
pub const ENV_DATABASE: &str = "LITEQUERY_DATABASE";
/// Environment variable holding the busy timeout in milliseconds.
pub const ENV_BUSY_TIMEOUT_MS: &str = "LITEQUERY_BUSY_TIMEOUT_MS";
/// Environment variable that opens the database read-only when set to
/// `1`, `true`, `yes` or `on` (any case).
pub const ENV_READ_ONLY: &str = "LITEQUERY_READ_ONLY";

/// What to do with a lookup suffix that is not recognized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownLookup {
    /// Fail with [`QbError::UnsupportedLookup`](crate::QbError::UnsupportedLookup).
    #[default]
    Reject,
    /// Compile as `column = ?`, dropping the suffix (logged at WARN).
    Exact,
}

/// Configuration for how conditions are compiled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuilderConfig {
    pub unknown_lookup: UnknownLookup,
}

impl BuilderConfig {
    /// Create a configuration with defaults (unknown lookups rejected).
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject unknown lookup suffixes.
    pub fn strict() -> Self {
        Self {
            unknown_lookup: UnknownLookup::Reject,
        }
    }

    /// Treat unknown lookup suffixes as exact matches.
    pub fn lenient() -> Self {
        Self {
            unknown_lookup: UnknownLookup::Exact,
        }
    }

    pub fn with_unknown_lookup(mut self, policy: UnknownLookup) -> Self {
        self.unknown_lookup = policy;
        self
    }
}

/// Configuration for opening a [`Database`](crate::Database).
///
/// Defaults to a private in-memory database, read-write, no busy timeout,
/// SQL logged at DEBUG and truncated to 200 bytes.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database file path, or `:memory:`.
    pub path: PathBuf,
    /// Open the file read-only.
    pub read_only: bool,
    /// How long SQLite waits on a locked database before failing.
    pub busy_timeout: Option<Duration>,
    /// Level of the per-statement tracing event.
    pub log_level: Level,
    /// Truncate logged SQL (in bytes, on a char boundary). `None` disables truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(MEMORY_PATH),
            read_only: false,
            busy_timeout: None,
            log_level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }
}

impl DatabaseConfig {
    /// Create a configuration for the database file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Create a configuration for a private in-memory database.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Read the configuration from `LITEQUERY_*` environment variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = match var(ENV_DATABASE) {
            Some(path) if !path.is_empty() => Self::new(path),
            _ => Self::in_memory(),
        };
        if let Some(ms) = var(ENV_BUSY_TIMEOUT_MS).and_then(|v| v.trim().parse::<u64>().ok()) {
            config.busy_timeout = Some(Duration::from_millis(ms));
        }
        if let Some(v) = var(ENV_READ_ONLY) {
            config.read_only = parse_flag(&v);
        }
        config
    }

    pub fn is_in_memory(&self) -> bool {
        self.path.as_path() == Path::new(MEMORY_PATH)
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = Some(timeout);
        self
    }

    /// Override the tracing event level for executed statements.
    pub fn with_log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    /// Set maximum SQL length to log.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation in logs.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }
}

fn parse_flag(value: &str) -> bool {
    let value = value.trim();
    ["1", "true", "yes", "on"]
        .iter()
        .any(|accepted| value.eq_ignore_ascii_case(accepted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_config_defaults_to_reject() {
        assert_eq!(BuilderConfig::new().unknown_lookup, UnknownLookup::Reject);
        assert_eq!(BuilderConfig::lenient().unknown_lookup, UnknownLookup::Exact);
    }

    #[test]
    fn test_database_config_defaults() {
        let config = DatabaseConfig::default();
        assert!(config.is_in_memory());
        assert!(!config.read_only);
        assert_eq!(config.max_sql_length, Some(200));
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn test_database_config_setters() {
        let config = DatabaseConfig::new("app.db")
            .read_only(true)
            .with_busy_timeout(Duration::from_millis(250))
            .with_log_level(Level::INFO)
            .no_truncate();
        assert!(!config.is_in_memory());
        assert!(config.read_only);
        assert_eq!(config.busy_timeout, Some(Duration::from_millis(250)));
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.max_sql_length, None);
    }

    fn vars<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn test_from_vars_reads_every_setting() {
        let config = DatabaseConfig::from_vars(vars(&[
            (ENV_DATABASE, "/tmp/app.db"),
            (ENV_BUSY_TIMEOUT_MS, "1500"),
            (ENV_READ_ONLY, "True"),
        ]));
        assert_eq!(config.path, PathBuf::from("/tmp/app.db"));
        assert_eq!(config.busy_timeout, Some(Duration::from_millis(1500)));
        assert!(config.read_only);
    }

    #[test]
    fn test_from_vars_defaults_when_unset_or_invalid() {
        let config = DatabaseConfig::from_vars(vars(&[]));
        assert!(config.is_in_memory());
        assert_eq!(config.busy_timeout, None);
        assert!(!config.read_only);

        let config = DatabaseConfig::from_vars(vars(&[
            (ENV_DATABASE, ""),
            (ENV_BUSY_TIMEOUT_MS, "soon"),
            (ENV_READ_ONLY, "nope"),
        ]));
        assert!(config.is_in_memory());
        assert_eq!(config.busy_timeout, None);
        assert!(!config.read_only);
    }

    #[test]
    fn test_read_only_flag_ignores_case() {
        for accepted in ["1", "true", "True", "TRUE", "yes", "YES", "on", " On "] {
            assert!(parse_flag(accepted), "{accepted:?} should enable read-only");
        }
        for rejected in ["0", "false", "False", "off", "", "2"] {
            assert!(!parse_flag(rejected), "{rejected:?} should not enable read-only");
        }
    }
}
