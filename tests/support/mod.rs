//! Recording connections for lock tests.
//!
//! The mocks log every statement they are asked to run so tests can assert
//! on the exact SQL and its order.

#![allow(dead_code)]

use std::error::Error;
use std::fmt;

use pg_advisory_lock::{AsyncConnection, Connection, LockError};

pub const POSTGRES: &str = "postgres::client::Client";
pub const TOKIO_POSTGRES: &str = "tokio_postgres::client::Client";
pub const SQLX: &str = "sqlx_postgres::connection::PgConnection";

/// lock_id("key")
pub const KEY_ID: i64 = 948743577643725528;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockError(pub String);

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mock connection: {}", self.0)
    }
}

impl Error for MockError {}

#[derive(Debug)]
pub struct MockConnection {
    pub interface: &'static str,
    pub statements: Vec<String>,
    /// Result of `pg_try_advisory_*` calls.
    pub try_lock_result: bool,
    /// Result of `pg_advisory_unlock*` calls.
    pub unlock_result: bool,
    /// Fail every statement with this message.
    pub fail: Option<&'static str>,
    /// Fail only statements containing this text.
    pub fail_on: Option<&'static str>,
}

impl MockConnection {
    pub fn new(interface: &'static str) -> Self {
        MockConnection {
            interface,
            statements: Vec::new(),
            try_lock_result: true,
            unlock_result: true,
            fail: None,
            fail_on: None,
        }
    }

    fn record(&mut self, sql: &str) -> Result<(), MockError> {
        self.statements.push(sql.to_string());
        if let Some(msg) = self.fail {
            return Err(MockError(msg.to_string()));
        }
        match self.fail_on {
            Some(pattern) if sql.contains(pattern) => {
                Err(MockError(format!("{} failed", pattern)))
            }
            _ => Ok(()),
        }
    }

    fn scalar(&self, sql: &str) -> bool {
        if sql.contains("unlock") {
            self.unlock_result
        } else {
            self.try_lock_result
        }
    }
}

impl Connection for MockConnection {
    type Error = MockError;

    fn interface(&self) -> &str {
        self.interface
    }

    fn execute(&mut self, sql: &str) -> Result<(), MockError> {
        self.record(sql)
    }

    fn fetch_bool(&mut self, sql: &str) -> Result<bool, MockError> {
        self.record(sql)?;
        Ok(self.scalar(sql))
    }
}

impl AsyncConnection for MockConnection {
    type Error = MockError;

    fn interface(&self) -> &str {
        self.interface
    }

    async fn execute(&mut self, sql: &str) -> Result<(), MockError> {
        tokio::task::yield_now().await;
        self.record(sql)
    }

    async fn fetch_bool(&mut self, sql: &str) -> Result<bool, MockError> {
        tokio::task::yield_now().await;
        self.record(sql)?;
        Ok(self.scalar(sql))
    }
}

pub fn lock_sql(function: &str) -> String {
    format!("SELECT pg_catalog.{}({})", function, KEY_ID)
}

/// Error type for closures run under a lock.
#[derive(Debug)]
pub enum AppError {
    Lock(LockError),
    Inner(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Lock(e) => write!(f, "lock error: {}", e),
            AppError::Inner(msg) => f.write_str(msg),
        }
    }
}

impl Error for AppError {}

impl From<LockError> for AppError {
    fn from(err: LockError) -> Self {
        AppError::Lock(err)
    }
}
