//! In-process session registry
//!
//! Tracks which operators currently have a live session. The liveness gate
//! polls it; the controller and the transport flip it.

use scout_application::SessionRegistryPort;
use std::collections::HashSet;
use std::sync::RwLock;
use tracing::debug;

#[derive(Default)]
pub struct InMemorySessionRegistry {
    active: RwLock<HashSet<String>>,
}

impl InMemorySessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_users(&self) -> Vec<String> {
        let mut users: Vec<String> = self
            .active
            .read()
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        users.sort();
        users
    }
}

impl SessionRegistryPort for InMemorySessionRegistry {
    fn is_active(&self, user_name: &str) -> bool {
        self.active
            .read()
            .map(|set| set.contains(user_name))
            .unwrap_or(false)
    }

    fn activate(&self, user_name: &str) {
        if let Ok(mut set) = self.active.write() {
            set.insert(user_name.to_string());
            debug!("Session registered for {}", user_name);
        }
    }

    fn deactivate(&self, user_name: &str) {
        if let Ok(mut set) = self.active.write()
            && set.remove(user_name)
        {
            debug!("Session unregistered for {}", user_name);
        }
    }
}
