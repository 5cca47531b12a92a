//! Session registry port
//!
//! Answers "is this user's session still live?" for the liveness gate.

/// Registry of active exploration sessions, keyed by user name.
pub trait SessionRegistryPort: Send + Sync {
    fn is_active(&self, user_name: &str) -> bool;

    fn activate(&self, user_name: &str);

    fn deactivate(&self, user_name: &str);
}
