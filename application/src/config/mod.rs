//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`ExplorationConfig`]: what one session explores (user, objective, start URL)
//! - [`ExecutionParams`]: loop control (step cap, timeouts, queue priorities)

pub mod execution_params;
pub mod exploration_config;

pub use execution_params::ExecutionParams;
pub use exploration_config::ExplorationConfig;
