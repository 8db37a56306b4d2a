use serde::{Deserialize, Serialize};

use crate::backend::AUTO;
use crate::{LockError, Scope};

/// Construction options for [`Lock`](crate::Lock) and
/// [`SuspendableLock`](crate::SuspendableLock).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockOptions {
    /// Backend name, or `"auto"` to detect it from the connection.
    pub interface: String,
    pub scope: Scope,
    /// Take a shared lock instead of an exclusive one.
    pub shared: bool,
    /// Roll the connection back when a scoped block fails.
    pub rollback_on_error: bool,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            interface: AUTO.to_string(),
            scope: Scope::Session,
            shared: false,
            rollback_on_error: true,
        }
    }
}

impl LockOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, LockError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = interface.into();
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_shared(mut self, shared: bool) -> Self {
        self.shared = shared;
        self
    }

    pub fn with_rollback_on_error(mut self, rollback: bool) -> Self {
        self.rollback_on_error = rollback;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = LockOptions::default();
        assert_eq!(options.interface, "auto");
        assert_eq!(options.scope, Scope::Session);
        assert!(!options.shared);
        assert!(options.rollback_on_error);
    }

    #[test]
    fn builder_methods() {
        let options = LockOptions::new()
            .with_interface("postgres")
            .with_scope(Scope::Transaction)
            .with_shared(true)
            .with_rollback_on_error(false);

        assert_eq!(options.interface, "postgres");
        assert_eq!(options.scope, Scope::Transaction);
        assert!(options.shared);
        assert!(!options.rollback_on_error);
    }

    #[test]
    fn from_json_fills_missing_fields() {
        let options = LockOptions::from_json(r#"{"scope": "transaction"}"#).unwrap();
        assert_eq!(options.scope, Scope::Transaction);
        assert_eq!(options.interface, "auto");
        assert!(options.rollback_on_error);
    }

    #[test]
    fn from_json_rejects_unknown_scope() {
        let err = LockOptions::from_json(r#"{"scope": "global"}"#).unwrap_err();
        assert!(matches!(err, LockError::Config(_)));
    }
}
