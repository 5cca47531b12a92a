//! Presentation layer for scout
//!
//! This crate contains CLI definitions, event formatters and the
//! operator console used while a session runs.

pub mod cli;
pub mod operator;
pub mod output;

// Re-export commonly used types
pub use cli::commands::{Cli, OutputFormat};
pub use operator::{ConsoleAction, ConsoleLoop, OperatorCommand, OperatorConsole};
pub use output::console::{ConsoleFormatter, JsonFormatter};
pub use output::formatter::{EventFormatter, formatter_for};
