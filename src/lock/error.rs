use std::error::Error;
use std::fmt;

/// Error type for advisory lock operations.
#[derive(Debug)]
pub enum LockError {
    /// The lock is already held by this lock instance.
    Acquire(String),
    /// The database reported that no lock was held at release time.
    Release(String),
    /// No backend could be resolved for the connection.
    UnsupportedInterface(String),
    /// The resolved backend cannot perform the requested operation.
    NotImplemented(String),
    /// Invalid lock options.
    Config(String),
    /// The connection failed while running a lock statement.
    Database(Box<dyn Error + Send + Sync>),
}

impl LockError {
    pub(crate) fn already_held(key: &str, scope: impl fmt::Display) -> Self {
        LockError::Acquire(format!(
            "Lock for '{}' is already held by this {} scope",
            key, scope
        ))
    }

    pub(crate) fn not_held(key: &str, scope: impl fmt::Display) -> Self {
        LockError::Release(format!(
            "Lock for '{}' was not held by this {} scope",
            key, scope
        ))
    }

    pub(crate) fn database<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        LockError::Database(Box::new(err))
    }
}

impl fmt::Display for LockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockError::Acquire(msg)
            | LockError::Release(msg)
            | LockError::UnsupportedInterface(msg)
            | LockError::NotImplemented(msg) => f.write_str(msg),
            LockError::Config(msg) => write!(f, "invalid lock options: {}", msg),
            LockError::Database(e) => write!(f, "database error: {}", e),
        }
    }
}

impl Error for LockError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LockError::Database(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LockError {
    fn from(err: serde_json::Error) -> Self {
        LockError::Config(err.to_string())
    }
}
