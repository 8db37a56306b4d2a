use std::error::Error;
use std::fmt;

use tracing::{debug, warn};

use super::{LockError, LockState};
use crate::backend::Backend;
use crate::connection::Connection;
use crate::LockOptions;

/// A blocking advisory lock over a borrowed connection.
///
/// ```ignore
/// let mut lock = Lock::new(&mut client, "orders:42");
/// lock.scoped(|client| -> Result<(), LockError> {
///     // critical section
///     Ok(())
/// })?;
/// ```
pub struct Lock<'c, C: Connection> {
    connection: &'c mut C,
    state: LockState,
}

impl<'c, C: Connection> Lock<'c, C> {
    /// Create a session-scoped exclusive lock with backend auto-detection.
    pub fn new(connection: &'c mut C, key: impl fmt::Display) -> Self {
        Self::with_options(connection, key, LockOptions::default())
    }

    pub fn with_options(connection: &'c mut C, key: impl fmt::Display, options: LockOptions) -> Self {
        Lock {
            connection,
            state: LockState::new(key.to_string(), options),
        }
    }

    /// Configuration and hold state.
    pub fn state(&self) -> &LockState {
        &self.state
    }

    pub fn key(&self) -> &str {
        self.state.key()
    }

    pub fn lock_id(&self) -> i64 {
        self.state.lock_id()
    }

    pub fn locked(&self) -> bool {
        self.state.locked()
    }

    pub fn ref_count(&self) -> u32 {
        self.state.ref_count()
    }

    pub fn shared(&self) -> bool {
        self.state.shared()
    }

    pub fn connection(&self) -> &C {
        &*self.connection
    }

    /// The borrowed connection, for statements run while the lock is held.
    pub fn connection_mut(&mut self) -> &mut C {
        &mut *self.connection
    }

    /// Block until the lock is granted.
    pub fn acquire(&mut self) -> Result<bool, LockError> {
        self.acquire_with(true)
    }

    /// Take the lock only if it is free right now.
    pub fn try_acquire(&mut self) -> Result<bool, LockError> {
        self.acquire_with(false)
    }

    /// Take the lock, waiting for it when `block` is set.
    ///
    /// Acquiring a lock this instance already holds is an error rather than a
    /// nested acquire.
    pub fn acquire_with(&mut self, block: bool) -> Result<bool, LockError> {
        self.state.check_acquire()?;
        let backend = self.backend()?;
        let acquired = backend.acquire(&mut *self.connection, &self.state, block)?;

        debug!(
            key = %self.state.key(),
            lock_id = self.state.lock_id(),
            scope = %self.state.scope(),
            block,
            acquired,
            "advisory lock acquire"
        );
        Ok(self.state.acquired(acquired))
    }

    /// Release the lock. Returns `false` when this instance does not hold it.
    pub fn release(&mut self) -> Result<bool, LockError> {
        if !self.state.locked() {
            return Ok(false);
        }
        let backend = self.backend()?;
        let released = backend.release(&mut *self.connection, &self.state)?;

        debug!(
            key = %self.state.key(),
            lock_id = self.state.lock_id(),
            released,
            "advisory lock release"
        );
        self.state.released(released)
    }

    /// Apply the rollback-on-error policy for a failure inside the critical
    /// section. Lock state is not touched.
    pub fn handle_error(&mut self, error: &dyn Error) -> Result<(), LockError> {
        debug!(
            key = %self.state.key(),
            rollback = self.state.rollback_on_error(),
            %error,
            "handling error under advisory lock"
        );
        self.rollback_hook()
    }

    /// Run `f` while holding the lock.
    ///
    /// The lock is taken in blocking mode. When `f` fails, the error hook
    /// runs, then the lock is released, and `f`'s error is returned even if
    /// either of those steps fails. A panic in `f` runs the same two steps
    /// while unwinding.
    pub fn scoped<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut C) -> Result<T, E>,
        E: Error + From<LockError>,
    {
        self.acquire()?;

        let mut guard = UnwindGuard {
            lock: &mut *self,
            armed: true,
        };
        let outcome = f(&mut *guard.lock.connection);
        guard.armed = false;
        drop(guard);

        match outcome {
            Ok(value) => {
                self.release()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(hook) = self.handle_error(&err) {
                    warn!(key = %self.state.key(), error = %hook, "error hook failed");
                }
                if let Err(release) = self.release() {
                    warn!(key = %self.state.key(), error = %release, "release after error failed");
                }
                Err(err)
            }
        }
    }

    fn rollback_hook(&mut self) -> Result<(), LockError> {
        let backend = self.backend()?;
        backend.handle_error(&mut *self.connection, &self.state)
    }

    fn backend(&mut self) -> Result<Backend, LockError> {
        self.state.resolve_backend(self.connection.interface())
    }
}

/// Runs the error hook and the release if dropped while still armed, which
/// only happens when the scoped body unwinds.
struct UnwindGuard<'a, 'c, C: Connection> {
    lock: &'a mut Lock<'c, C>,
    armed: bool,
}

impl<C: Connection> Drop for UnwindGuard<'_, '_, C> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!(key = %self.lock.state.key(), "scoped body panicked");
        if let Err(hook) = self.lock.rollback_hook() {
            warn!(key = %self.lock.state.key(), error = %hook, "error hook failed");
        }
        if let Err(release) = self.lock.release() {
            warn!(key = %self.lock.state.key(), error = %release, "release after panic failed");
        }
    }
}

impl<C: Connection> fmt::Debug for Lock<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lock")
            .field("connection", &self.connection.interface())
            .field("state", &self.state)
            .finish()
    }
}
