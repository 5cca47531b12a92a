//! Sensitive-flow context.
//!
//! While an authentication sequence is in progress, URL changes are part
//! of the flow (login → 2FA → dashboard) rather than new discoveries.

use serde::{Deserialize, Serialize};

/// Flow type recorded when a sensitive flow starts.
pub const LOGIN_FLOW: &str = "login";

/// Edge produced by applying a decision's flow flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowTransition {
    Unchanged,
    /// false → true
    Entered,
    /// true → false
    Exited,
}

/// Invariant: when `is_in_sensitive_flow` is true, `start_url` and
/// `flow_start_step` are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowContext {
    pub is_in_sensitive_flow: bool,
    pub flow_type: Option<String>,
    pub start_url: Option<String>,
    pub flow_start_step: Option<u32>,
}

impl FlowContext {
    /// Apply the decision's flag. `None` leaves the context untouched.
    pub fn apply(&mut self, flag: Option<bool>, current_url: &str, step: u32) -> FlowTransition {
        let Some(in_flow) = flag else {
            return FlowTransition::Unchanged;
        };

        match (self.is_in_sensitive_flow, in_flow) {
            (false, true) => {
                self.is_in_sensitive_flow = true;
                self.flow_type = Some(LOGIN_FLOW.to_string());
                self.start_url = Some(current_url.to_string());
                self.flow_start_step = Some(step);
                FlowTransition::Entered
            }
            (true, false) => {
                self.is_in_sensitive_flow = false;
                FlowTransition::Exited
            }
            _ => FlowTransition::Unchanged,
        }
    }
}
