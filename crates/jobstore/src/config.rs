//! Store configuration.

use crate::error::{OrmError, OrmResult};
use std::time::Duration;

const DEFAULT_POOL_SIZE: usize = 16;
const DEFAULT_MAX_LOGGED_SQL_LENGTH: usize = 200;

/// Connection and executor settings.
///
/// ```ignore
/// let config = StoreConfig::from_env()?
///     .query_timeout(Duration::from_secs(5))
///     .slow_query_threshold(Duration::from_millis(250));
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// `postgres://` connection string.
    pub database_url: String,
    /// Maximum number of pooled connections.
    pub max_pool_size: usize,
    /// Per-statement timeout applied by [`crate::TracingClient`].
    pub query_timeout: Option<Duration>,
    /// Statements slower than this are logged at `warn`.
    pub slow_query_threshold: Option<Duration>,
    /// Truncate logged SQL to this many bytes. `None` means no truncation.
    pub max_logged_sql_length: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: DEFAULT_POOL_SIZE,
            query_timeout: None,
            slow_query_threshold: None,
            max_logged_sql_length: Some(DEFAULT_MAX_LOGGED_SQL_LENGTH),
        }
    }
}

impl StoreConfig {
    /// Create a new configuration with defaults.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Self::default()
        }
    }

    /// Read settings from the environment.
    ///
    /// - `DATABASE_URL` (required)
    /// - `JOBSTORE_POOL_SIZE`
    /// - `JOBSTORE_QUERY_TIMEOUT_MS`
    /// - `JOBSTORE_SLOW_QUERY_MS`
    pub fn from_env() -> OrmResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> OrmResult<Self> {
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| OrmError::Connection("DATABASE_URL is not set".to_string()))?;
        let mut config = Self::new(database_url);

        if let Some(size) = lookup("JOBSTORE_POOL_SIZE") {
            config.max_pool_size = parse_number("JOBSTORE_POOL_SIZE", &size)?;
        }
        if let Some(ms) = lookup("JOBSTORE_QUERY_TIMEOUT_MS") {
            config.query_timeout = Some(Duration::from_millis(parse_number(
                "JOBSTORE_QUERY_TIMEOUT_MS",
                &ms,
            )?));
        }
        if let Some(ms) = lookup("JOBSTORE_SLOW_QUERY_MS") {
            config.slow_query_threshold = Some(Duration::from_millis(parse_number(
                "JOBSTORE_SLOW_QUERY_MS",
                &ms,
            )?));
        }
        Ok(config)
    }

    /// Set the maximum pool size.
    pub fn max_pool_size(mut self, size: usize) -> Self {
        self.max_pool_size = size;
        self
    }

    /// Set the per-statement timeout.
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    /// Set the slow query threshold.
    pub fn slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    /// Set maximum SQL length to log.
    pub fn max_logged_sql_length(mut self, len: usize) -> Self {
        self.max_logged_sql_length = Some(len);
        self
    }

    /// Log SQL untruncated.
    pub fn no_truncate(mut self) -> Self {
        self.max_logged_sql_length = None;
        self
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> OrmResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| OrmError::Connection(format!("{key} must be a non-negative integer, got '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = StoreConfig::new("postgres://localhost/jobs");
        assert_eq!(config.max_pool_size, 16);
        assert_eq!(config.query_timeout, None);
        assert_eq!(config.max_logged_sql_length, Some(200));
    }

    #[test]
    fn reads_environment() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/jobs"),
            ("JOBSTORE_POOL_SIZE", "4"),
            ("JOBSTORE_QUERY_TIMEOUT_MS", "1500"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "postgres://db/jobs");
        assert_eq!(config.max_pool_size, 4);
        assert_eq!(config.query_timeout, Some(Duration::from_millis(1500)));
        assert_eq!(config.slow_query_threshold, None);
    }

    #[test]
    fn missing_url_is_an_error() {
        assert!(matches!(
            StoreConfig::from_lookup(lookup(&[])),
            Err(OrmError::Connection(_))
        ));
    }

    #[test]
    fn malformed_number_is_an_error() {
        let result = StoreConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/jobs"),
            ("JOBSTORE_POOL_SIZE", "many"),
        ]));
        assert!(result.is_err());
    }
}
