//! Database configuration.
//!
//! Built explicitly and handed to [`Database::new`](crate::Database::new);
//! there is no process-wide connection or config singleton.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable naming the SQLite file.
pub const ENV_DB_PATH: &str = "STOCKROOM_DB_PATH";
/// Environment variable overriding the pool size.
pub const ENV_MAX_CONNECTIONS: &str = "STOCKROOM_DB_MAX_CONNECTIONS";
/// Environment variable overriding the lock wait, in milliseconds.
pub const ENV_BUSY_TIMEOUT_MS: &str = "STOCKROOM_DB_BUSY_TIMEOUT_MS";

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/stockroom/stock.db")
///     .max_connections(8)
///     .busy_timeout(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 8
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// How long to wait for a pooled connection.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// How long a unit of work waits for the write lock before failing
    /// with a retryable busy error.
    /// Default: 5 seconds
    pub busy_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a configuration for the given database file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 8,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// In-memory database (for testing).
    ///
    /// Single connection: every unit of work is serialized by the pool, and
    /// the database lives as long as that connection.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// Loads configuration from the environment.
    ///
    /// `STOCKROOM_DB_PATH` defaults to `./stockroom.db`; numeric overrides
    /// that fail to parse are reported rather than ignored.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = env::var(ENV_DB_PATH).unwrap_or_else(|_| "./stockroom.db".to_string());
        let mut config = DbConfig::new(path);

        if let Some(max) = parse_var::<u32>(ENV_MAX_CONNECTIONS)? {
            if max == 0 {
                return Err(ConfigError::InvalidValue(ENV_MAX_CONNECTIONS.to_string()));
            }
            config.max_connections = max;
        }

        if let Some(ms) = parse_var::<u64>(ENV_BUSY_TIMEOUT_MS)? {
            config.busy_timeout = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(None),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .busy_timeout(Duration::from_millis(250));

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
        assert!(config.run_migrations);
    }

    #[test]
    fn test_in_memory_uses_single_connection() {
        let config = DbConfig::in_memory();
        assert_eq!(config.max_connections, 1);
        assert_eq!(config.database_path, PathBuf::from(":memory:"));
    }

    // One test touches the process environment so parallel tests don't race.
    #[test]
    fn test_from_env() {
        env::set_var(ENV_DB_PATH, "/tmp/stockroom-env.db");
        env::set_var(ENV_MAX_CONNECTIONS, "12");
        env::set_var(ENV_BUSY_TIMEOUT_MS, "1500");

        let config = DbConfig::from_env().unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/stockroom-env.db"));
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.busy_timeout, Duration::from_millis(1500));

        env::set_var(ENV_MAX_CONNECTIONS, "lots");
        let err = DbConfig::from_env().unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for STOCKROOM_DB_MAX_CONNECTIONS");

        env::set_var(ENV_MAX_CONNECTIONS, "0");
        assert!(DbConfig::from_env().is_err());

        env::remove_var(ENV_DB_PATH);
        env::remove_var(ENV_MAX_CONNECTIONS);
        env::remove_var(ENV_BUSY_TIMEOUT_MS);
    }
}
