use std::error::Error;
use std::fmt;
use std::future::Future;

use futures::future::BoxFuture;
use tracing::{debug, warn};

use super::{LockError, LockState};
use crate::backend::Backend;
use crate::connection::AsyncConnection;
use crate::LockOptions;

/// The async counterpart of [`Lock`](crate::Lock).
///
/// Every database round-trip is an await point; the state rules are the same
/// as for the blocking lock.
///
/// ```ignore
/// let mut lock = SuspendableLock::new(&mut client, "orders:42");
/// lock.scoped(|client| {
///     async move {
///         client.batch_execute("UPDATE orders SET state = 'paid'").await?;
///         Ok::<_, AppError>(())
///     }
///     .boxed()
/// })
/// .await?;
/// ```
pub struct SuspendableLock<'c, C: AsyncConnection> {
    connection: &'c mut C,
    state: LockState,
}

impl<'c, C: AsyncConnection> SuspendableLock<'c, C> {
    pub fn new(connection: &'c mut C, key: impl fmt::Display) -> Self {
        Self::with_options(connection, key, LockOptions::default())
    }

    pub fn with_options(connection: &'c mut C, key: impl fmt::Display, options: LockOptions) -> Self {
        SuspendableLock {
            connection,
            state: LockState::new(key.to_string(), options),
        }
    }

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

    pub async fn acquire(&mut self) -> Result<bool, LockError> {
        self.acquire_with(true).await
    }

    pub async fn try_acquire(&mut self) -> Result<bool, LockError> {
        self.acquire_with(false).await
    }

    pub async fn acquire_with(&mut self, block: bool) -> Result<bool, LockError> {
        self.state.check_acquire()?;
        let backend = self.backend()?;
        let acquired = backend
            .acquire_async(&mut *self.connection, &self.state, block)
            .await?;

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

    pub async fn release(&mut self) -> Result<bool, LockError> {
        if !self.state.locked() {
            return Ok(false);
        }
        let backend = self.backend()?;
        let released = backend
            .release_async(&mut *self.connection, &self.state)
            .await?;

        debug!(
            key = %self.state.key(),
            lock_id = self.state.lock_id(),
            released,
            "advisory lock release"
        );
        self.state.released(released)
    }

    /// Apply the rollback-on-error policy. `error` is only logged, so the
    /// returned future does not borrow it.
    pub fn handle_error(
        &mut self,
        error: &dyn Error,
    ) -> impl Future<Output = Result<(), LockError>> + Send + '_ {
        debug!(
            key = %self.state.key(),
            rollback = self.state.rollback_on_error(),
            %error,
            "handling error under advisory lock"
        );
        let backend = self.backend();
        let connection = &mut *self.connection;
        let state = &self.state;
        async move {
            let backend = backend?;
            backend.handle_error_async(connection, state).await
        }
    }

    /// Run the future built by `f` while holding the lock. Error handling
    /// matches [`Lock::scoped`](crate::Lock::scoped).
    ///
    /// Dropping the returned future before it completes (a timeout, a lost
    /// `select!` branch, a panic in the body) skips the error hook and the
    /// release, and the lock stays marked as held. Call
    /// [`release`](Self::release) afterwards to give it back.
    pub async fn scoped<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: for<'a> FnOnce(&'a mut C) -> BoxFuture<'a, Result<T, E>>,
        E: Error + From<LockError>,
    {
        self.acquire().await?;

        let outcome = f(&mut *self.connection).await;
        match outcome {
            Ok(value) => {
                self.release().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(hook) = self.handle_error(&err).await {
                    warn!(key = %self.state.key(), error = %hook, "error hook failed");
                }
                if let Err(release) = self.release().await {
                    warn!(key = %self.state.key(), error = %release, "release after error failed");
                }
                Err(err)
            }
        }
    }

    fn backend(&mut self) -> Result<Backend, LockError> {
        self.state.resolve_backend(self.connection.interface())
    }
}

impl<C: AsyncConnection> fmt::Debug for SuspendableLock<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuspendableLock")
            .field("connection", &self.connection.interface())
            .field("state", &self.state)
            .finish()
    }
}
