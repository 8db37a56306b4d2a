use std::error::Error;
use std::future::Future;

/// A blocking database session a [`Lock`](crate::Lock) can run statements on.
///
/// Implementations exist for `postgres::Client` behind the `postgres`
/// feature. Wrappers around other clients implement the three statement
/// methods and, when their type path does not name the driver, override
/// [`interface`](Connection::interface).
pub trait Connection {
    type Error: Error + Send + Sync + 'static;

    /// The technology this connection belongs to, used for backend detection.
    fn interface(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Run a statement, discarding any result.
    fn execute(&mut self, sql: &str) -> Result<(), Self::Error>;

    /// Run a query returning a single boolean.
    fn fetch_bool(&mut self, sql: &str) -> Result<bool, Self::Error>;

    /// Roll back the current transaction.
    fn rollback(&mut self) -> Result<(), Self::Error> {
        self.execute("ROLLBACK")
    }
}

/// The suspendable counterpart of [`Connection`], used by
/// [`SuspendableLock`](crate::SuspendableLock).
pub trait AsyncConnection: Send {
    type Error: Error + Send + Sync + 'static;

    /// The technology this connection belongs to, used for backend detection.
    fn interface(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn execute(&mut self, sql: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn fetch_bool(&mut self, sql: &str) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    fn rollback(&mut self) -> impl Future<Output = Result<(), Self::Error>> + Send {
        self.execute("ROLLBACK")
    }
}
