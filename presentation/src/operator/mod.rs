//! Operator console: stdin commands and chat for a running session

mod command;
mod console;

pub use command::OperatorCommand;
pub use console::{ConsoleAction, ConsoleLoop, OperatorConsole};
