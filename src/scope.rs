use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::LockError;

/// Lifetime of an advisory lock.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Held until released or the session ends.
    #[default]
    Session,
    /// Held until the surrounding transaction commits or rolls back.
    Transaction,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Session => "session",
            Scope::Transaction => "transaction",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = LockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "session" => Ok(Scope::Session),
            "transaction" => Ok(Scope::Transaction),
            other => Err(LockError::Config(format!("unknown lock scope '{}'", other))),
        }
    }
}

/// The advisory lock functions a lock calls, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockFunctions {
    pub blocking: &'static str,
    pub nonblocking: &'static str,
    pub unlock: &'static str,
}

impl LockFunctions {
    pub fn new(scope: Scope, shared: bool) -> Self {
        // transaction locks have no unlock of their own; the session one is used
        match (scope, shared) {
            (Scope::Session, false) => LockFunctions {
                blocking: "pg_advisory_lock",
                nonblocking: "pg_try_advisory_lock",
                unlock: "pg_advisory_unlock",
            },
            (Scope::Session, true) => LockFunctions {
                blocking: "pg_advisory_lock_shared",
                nonblocking: "pg_try_advisory_lock_shared",
                unlock: "pg_advisory_unlock_shared",
            },
            (Scope::Transaction, false) => LockFunctions {
                blocking: "pg_advisory_xact_lock",
                nonblocking: "pg_try_advisory_xact_lock",
                unlock: "pg_advisory_unlock",
            },
            (Scope::Transaction, true) => LockFunctions {
                blocking: "pg_advisory_xact_lock_shared",
                nonblocking: "pg_try_advisory_xact_lock_shared",
                unlock: "pg_advisory_unlock_shared",
            },
        }
    }

    /// The lock function for the requested mode.
    pub fn lock(&self, block: bool) -> &'static str {
        if block {
            self.blocking
        } else {
            self.nonblocking
        }
    }
}

/// Render the statement that calls `function` for `lock_id`.
pub fn statement(function: &str, lock_id: i64) -> String {
    format!("SELECT pg_catalog.{}({})", function, lock_id)
}
