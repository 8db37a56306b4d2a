mod error;
#[allow(clippy::module_inception)]
mod lock;
mod state;
mod suspendable;

pub use error::LockError;
pub use lock::Lock;
pub use state::LockState;
pub use suspendable::SuspendableLock;
