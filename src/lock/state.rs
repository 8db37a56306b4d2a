use tracing::warn;

use super::LockError;
use crate::backend::Backend;
use crate::key::lock_id;
use crate::scope::{LockFunctions, Scope};
use crate::LockOptions;

/// Configuration and hold state shared by [`Lock`](crate::Lock) and
/// [`SuspendableLock`](crate::SuspendableLock).
///
/// `held` is a local view of the database's lock table. It is updated only
/// after the database confirms an acquire or release.
#[derive(Debug, Clone)]
pub struct LockState {
    key: String,
    lock_id: i64,
    interface: String,
    scope: Scope,
    shared: bool,
    rollback_on_error: bool,
    functions: LockFunctions,
    held: bool,
    ref_count: u32,
    backend: Option<Backend>,
}

impl LockState {
    pub(crate) fn new(key: String, options: LockOptions) -> Self {
        LockState {
            lock_id: lock_id(&key),
            functions: LockFunctions::new(options.scope, options.shared),
            key,
            interface: options.interface,
            scope: options.scope,
            shared: options.shared,
            rollback_on_error: options.rollback_on_error,
            held: false,
            ref_count: 0,
            backend: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn lock_id(&self) -> i64 {
        self.lock_id
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn shared(&self) -> bool {
        self.shared
    }

    pub fn rollback_on_error(&self) -> bool {
        self.rollback_on_error
    }

    pub fn functions(&self) -> &LockFunctions {
        &self.functions
    }

    pub fn locked(&self) -> bool {
        self.held
    }

    pub fn ref_count(&self) -> u32 {
        self.ref_count
    }

    /// The resolved backend, if resolution has happened yet.
    pub fn backend(&self) -> Option<Backend> {
        self.backend
    }

    /// Resolve the backend once and reuse it afterwards.
    pub(crate) fn resolve_backend(&mut self, connection_interface: &str) -> Result<Backend, LockError> {
        if let Some(backend) = self.backend {
            return Ok(backend);
        }
        let backend = Backend::resolve(&self.interface, connection_interface)?;
        self.backend = Some(backend);
        Ok(backend)
    }

    pub(crate) fn check_acquire(&self) -> Result<(), LockError> {
        if self.held {
            return Err(LockError::already_held(&self.key, self.scope));
        }
        Ok(())
    }

    /// Record the outcome of an acquire and pass it through.
    pub(crate) fn acquired(&mut self, acquired: bool) -> bool {
        if acquired {
            self.held = true;
            self.ref_count += 1;
        }
        acquired
    }

    /// Record the outcome of a release. A release the database did not
    /// confirm leaves the state untouched.
    pub(crate) fn released(&mut self, released: bool) -> Result<bool, LockError> {
        if !released {
            warn!(
                key = %self.key,
                lock_id = self.lock_id,
                scope = %self.scope,
                "database reports advisory lock was not held"
            );
            return Err(LockError::not_held(&self.key, self.scope));
        }
        self.ref_count = 0;
        self.held = false;
        Ok(true)
    }
}
