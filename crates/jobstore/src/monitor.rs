//! Statement logging for any [`GenericClient`].
//!
//! [`TracingClient`] wraps a client and emits one `tracing` event per
//! statement on the `jobstore.sql` target: the SQL text actually sent, the
//! number of bound parameters, the elapsed time, and the outcome. Bound values
//! are never logged.
//!
//! ```rust,ignore
//! use jobstore::{StoreConfig, TracingClient};
//!
//! let client = TracingClient::new(pool.get().await?).with_config(&config);
//! let companies = jobstore::company::find_all(&client, &filter).await?;
//! ```

use crate::client::GenericClient;
use crate::config::StoreConfig;
use crate::error::{OrmError, OrmResult};
use std::time::{Duration, Instant};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// The type of SQL operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    Other,
}

impl QueryType {
    /// Detect query type from the leading keyword.
    pub fn from_sql(sql: &str) -> Self {
        fn starts_with_keyword(s: &str, keyword: &str) -> bool {
            match s.get(0..keyword.len()) {
                Some(prefix) => prefix.eq_ignore_ascii_case(keyword),
                None => false,
            }
        }

        let trimmed = sql.trim_start();
        if starts_with_keyword(trimmed, "SELECT") || starts_with_keyword(trimmed, "WITH") {
            QueryType::Select
        } else if starts_with_keyword(trimmed, "INSERT") {
            QueryType::Insert
        } else if starts_with_keyword(trimmed, "UPDATE") {
            QueryType::Update
        } else if starts_with_keyword(trimmed, "DELETE") {
            QueryType::Delete
        } else {
            QueryType::Other
        }
    }
}

/// A [`GenericClient`] that logs every statement and optionally enforces a timeout.
#[derive(Debug, Clone)]
pub struct TracingClient<C> {
    client: C,
    query_timeout: Option<Duration>,
    slow_query_threshold: Option<Duration>,
    max_sql_length: Option<usize>,
}

impl<C: GenericClient> TracingClient<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            query_timeout: None,
            slow_query_threshold: None,
            max_sql_length: StoreConfig::default().max_logged_sql_length,
        }
    }

    /// Take timeout, slow-query, and truncation settings from `config`.
    pub fn with_config(mut self, config: &StoreConfig) -> Self {
        self.query_timeout = config.query_timeout;
        self.slow_query_threshold = config.slow_query_threshold;
        self.max_sql_length = config.max_logged_sql_length;
        self
    }

    /// Set the query timeout.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    /// Set the slow query threshold.
    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    /// The wrapped client.
    pub fn inner(&self) -> &C {
        &self.client
    }

    pub fn into_inner(self) -> C {
        self.client
    }

    fn display_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)).into(),
            _ => sql.into(),
        }
    }

    async fn with_timeout<T, F>(&self, future: F) -> OrmResult<T>
    where
        F: std::future::Future<Output = OrmResult<T>> + Send,
    {
        match self.query_timeout {
            Some(timeout) => tokio::time::timeout(timeout, future)
                .await
                .map_err(|_| OrmError::Timeout(timeout))?,
            None => future.await,
        }
    }

    fn report<T>(
        &self,
        sql: &str,
        param_count: usize,
        elapsed: Duration,
        result: &OrmResult<T>,
        rows: impl FnOnce(&T) -> u64,
    ) {
        let query_type = QueryType::from_sql(sql);
        let sql = self.display_sql(sql);
        match result {
            Ok(value) => {
                let rows = rows(value);
                tracing::debug!(
                    target: "jobstore.sql",
                    ?query_type,
                    param_count,
                    elapsed_ms = elapsed.as_millis() as u64,
                    rows,
                    sql = %sql,
                );
            }
            Err(err) => tracing::debug!(
                target: "jobstore.sql",
                ?query_type,
                param_count,
                elapsed_ms = elapsed.as_millis() as u64,
                error = %err,
                sql = %sql,
            ),
        }

        if let Some(threshold) = self.slow_query_threshold {
            if elapsed > threshold {
                tracing::warn!(
                    target: "jobstore.sql",
                    ?query_type,
                    elapsed_ms = elapsed.as_millis() as u64,
                    threshold_ms = threshold.as_millis() as u64,
                    sql = %sql,
                    "slow query"
                );
            }
        }
    }
}

impl<C: GenericClient> GenericClient for TracingClient<C> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<Vec<Row>> {
        let start = Instant::now();
        let result = self.with_timeout(self.client.query(sql, params)).await;
        self.report(sql, params.len(), start.elapsed(), &result, |rows| {
            rows.len() as u64
        });
        result
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<u64> {
        let start = Instant::now();
        let result = self.with_timeout(self.client.execute(sql, params)).await;
        self.report(sql, params.len(), start.elapsed(), &result, |n| *n);
        result
    }
}
