//! Output formatter trait

use crate::cli::commands::OutputFormat;
use crate::output::console::{ConsoleFormatter, JsonFormatter};
use scout_application::ExplorationEvent;

/// Trait for turning exploration events into printable lines
pub trait EventFormatter: Send + Sync {
    /// Format one event. `None` means the event is not shown.
    fn format(&self, event: &ExplorationEvent) -> Option<String>;
}

/// Pick the formatter for the requested output format.
pub fn formatter_for(format: OutputFormat, quiet: bool) -> Box<dyn EventFormatter> {
    match format {
        OutputFormat::Text => Box::new(ConsoleFormatter::new(quiet)),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}
