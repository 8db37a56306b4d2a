//! Mutual exclusion across processes using PostgreSQL advisory locks.
//!
//! A [`Lock`] (blocking) or [`SuspendableLock`] (async) wraps a borrowed
//! database connection and a key. The key is hashed into the integer id the
//! `pg_advisory_*` functions take, and the lock state lives in the database;
//! the types here only track whether this instance believes it holds it.
//!
//! Driver support is behind features: `postgres`, `tokio-postgres` and
//! `sqlx`. Any other client can be used by implementing [`Connection`] or
//! [`AsyncConnection`].

pub mod backend;
mod connection;
mod key;
mod lock;
mod options;
mod scope;

pub use backend::Backend;
pub use connection::{AsyncConnection, Connection};
pub use key::lock_id;
pub use lock::{Lock, LockError, LockState, SuspendableLock};
pub use options::LockOptions;
pub use scope::{statement, LockFunctions, Scope};
