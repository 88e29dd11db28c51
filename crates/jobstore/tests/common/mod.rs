#![allow(dead_code)]

use jobstore::{GenericClient, OrmError, OrmResult};
use std::io;
use std::sync::{Arc, Mutex};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// A statement as it reached the executor.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub sql: String,
    pub params: Vec<String>,
}

/// Executor that records statements and returns no rows.
#[derive(Debug, Default)]
pub struct RecordingClient {
    statements: Mutex<Vec<Recorded>>,
    fail_with: Option<String>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record statements but fail each one with a connection error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn statements(&self) -> Vec<Recorded> {
        self.statements.lock().unwrap().clone()
    }

    pub fn last(&self) -> Recorded {
        self.statements().pop().expect("no statement was executed")
    }

    fn record(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<()> {
        self.statements.lock().unwrap().push(Recorded {
            sql: sql.to_string(),
            params: params.iter().map(|p| format!("{p:?}")).collect(),
        });
        match &self.fail_with {
            Some(message) => Err(OrmError::Connection(message.clone())),
            None => Ok(()),
        }
    }
}

impl GenericClient for RecordingClient {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<Vec<Row>> {
        self.record(sql, params)?;
        Ok(Vec::new())
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<u64> {
        self.record(sql, params)?;
        Ok(0)
    }
}

/// Buffer that collects formatted `tracing` output.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    /// Install a DEBUG-level subscriber writing into a fresh buffer for the
    /// current thread. Events are captured until the guard is dropped.
    pub fn capture() -> (Self, tracing::subscriber::DefaultGuard) {
        let buffer = Self::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        (buffer, tracing::subscriber::set_default(subscriber))
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
