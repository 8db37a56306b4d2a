//! Backend adapters and resolution.
//!
//! Each [`Backend`] variant speaks to one family of Postgres drivers. A
//! variant only supports the calling convention its driver offers: the
//! blocking `postgres` client, or the async `tokio_postgres` and `sqlx`
//! clients. Asking a backend for the other convention fails with
//! [`LockError::NotImplemented`].

#[cfg(feature = "postgres")]
mod postgres;
#[cfg(feature = "sqlx")]
mod sqlx;
#[cfg(feature = "tokio-postgres")]
mod tokio_postgres;

use std::fmt;

use tracing::debug;

use crate::connection::{AsyncConnection, Connection};
use crate::scope::statement;
use crate::{LockError, LockState};

/// Interface name that asks for detection from the connection.
pub const AUTO: &str = "auto";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// `tokio_postgres::Client`; async only.
    TokioPostgres,
    /// `sqlx::PgConnection`; async only.
    Sqlx,
    /// `postgres::Client`; blocking only.
    Postgres,
}

impl Backend {
    /// Detection order. `postgres` is a substring of `tokio_postgres` and of
    /// `sqlx_postgres`, so it has to come last.
    pub const DETECTION_ORDER: [Backend; 3] =
        [Backend::TokioPostgres, Backend::Sqlx, Backend::Postgres];

    pub fn name(&self) -> &'static str {
        match self {
            Backend::TokioPostgres => "tokio_postgres",
            Backend::Sqlx => "sqlx",
            Backend::Postgres => "postgres",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::DETECTION_ORDER
            .into_iter()
            .find(|backend| backend.name() == name)
    }

    /// Find the backend whose name appears in a connection's interface.
    pub fn detect(connection_interface: &str) -> Option<Self> {
        Self::DETECTION_ORDER
            .into_iter()
            .find(|backend| connection_interface.contains(backend.name()))
    }

    /// Resolve the backend for an `interface` setting, detecting it from
    /// `connection_interface` when the setting is `"auto"`.
    pub fn resolve(interface: &str, connection_interface: &str) -> Result<Self, LockError> {
        let backend = if interface == AUTO {
            Self::detect(connection_interface).ok_or_else(|| {
                LockError::UnsupportedInterface(
                    "Cannot determine database interface, \
                     try specifying it with the interface keyword"
                        .to_string(),
                )
            })?
        } else {
            Self::from_name(interface).ok_or_else(|| {
                LockError::UnsupportedInterface(format!(
                    "Unsupported database interface '{}'",
                    interface
                ))
            })?
        };

        debug!(
            interface,
            connection = connection_interface,
            backend = backend.name(),
            "resolved advisory lock backend"
        );
        Ok(backend)
    }

    /// Whether the backend drives a blocking connection.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Backend::Postgres)
    }

    fn unsupported(&self, operation: &str) -> LockError {
        LockError::NotImplemented(format!(
            "{} interface does not support {}()",
            self.name(),
            operation
        ))
    }

    // ========================================================================
    // Blocking calls
    // ========================================================================

    /// Take the lock. A blocking call always reports `true`; a non-blocking
    /// call reports whether the database granted the lock.
    pub fn acquire<C>(&self, conn: &mut C, lock: &LockState, block: bool) -> Result<bool, LockError>
    where
        C: Connection,
    {
        if !self.is_blocking() {
            return Err(self.unsupported("acquire"));
        }

        let sql = statement(lock.functions().lock(block), lock.lock_id());
        if block {
            // the blocking functions return void
            conn.execute(&sql).map_err(LockError::database)?;
            Ok(true)
        } else {
            conn.fetch_bool(&sql).map_err(LockError::database)
        }
    }

    /// Unlock, reporting whether the session actually held the lock.
    pub fn release<C>(&self, conn: &mut C, lock: &LockState) -> Result<bool, LockError>
    where
        C: Connection,
    {
        if !self.is_blocking() {
            return Err(self.unsupported("release"));
        }

        let sql = statement(lock.functions().unlock, lock.lock_id());
        conn.fetch_bool(&sql).map_err(LockError::database)
    }

    /// Roll the connection back if the lock asks for it.
    pub fn handle_error<C>(&self, conn: &mut C, lock: &LockState) -> Result<(), LockError>
    where
        C: Connection,
    {
        if !self.is_blocking() {
            return Err(self.unsupported("handle_error"));
        }

        if lock.rollback_on_error() {
            conn.rollback().map_err(LockError::database)?;
        }
        Ok(())
    }

    // ========================================================================
    // Suspendable calls
    // ========================================================================

    pub async fn acquire_async<C>(
        &self,
        conn: &mut C,
        lock: &LockState,
        block: bool,
    ) -> Result<bool, LockError>
    where
        C: AsyncConnection,
    {
        if self.is_blocking() {
            return Err(self.unsupported("acquire_async"));
        }

        let sql = statement(lock.functions().lock(block), lock.lock_id());
        if block {
            conn.execute(&sql).await.map_err(LockError::database)?;
            Ok(true)
        } else {
            conn.fetch_bool(&sql).await.map_err(LockError::database)
        }
    }

    pub async fn release_async<C>(&self, conn: &mut C, lock: &LockState) -> Result<bool, LockError>
    where
        C: AsyncConnection,
    {
        if self.is_blocking() {
            return Err(self.unsupported("release_async"));
        }

        let sql = statement(lock.functions().unlock, lock.lock_id());
        conn.fetch_bool(&sql).await.map_err(LockError::database)
    }

    pub async fn handle_error_async<C>(&self, conn: &mut C, lock: &LockState) -> Result<(), LockError>
    where
        C: AsyncConnection,
    {
        if self.is_blocking() {
            return Err(self.unsupported("handle_error_async"));
        }

        if lock.rollback_on_error() {
            conn.rollback().await.map_err(LockError::database)?;
        }
        Ok(())
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
