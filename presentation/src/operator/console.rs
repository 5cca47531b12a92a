//! Operator console
//!
//! Reads stdin line by line and maps each command onto the exploration
//! controller of one user.

use super::command::OperatorCommand;
use colored::Colorize;
use scout_application::{EventPayload, ExplorationController, ExplorationEvent, InputResponse};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// What the caller's event loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleAction {
    Continue,
    Stop,
}

/// Exit rule of the operator loop.
///
/// A completed session stays parked for chat, so completion alone never
/// ends the loop. It ends on `/stop`, on ctrl-c, or once stdin is closed
/// and the session has completed.
#[derive(Debug)]
pub struct ConsoleLoop {
    stdin_open: bool,
    completed: bool,
}

impl Default for ConsoleLoop {
    fn default() -> Self {
        Self {
            stdin_open: true,
            completed: false,
        }
    }
}

impl ConsoleLoop {
    pub fn stdin_open(&self) -> bool {
        self.stdin_open
    }

    pub fn on_event(&mut self, event: &ExplorationEvent) -> ConsoleAction {
        if matches!(event.payload, EventPayload::SessionCompleted { .. }) {
            self.completed = true;
        }
        self.next_action()
    }

    pub fn on_stdin_closed(&mut self) -> ConsoleAction {
        self.stdin_open = false;
        self.next_action()
    }

    fn next_action(&self) -> ConsoleAction {
        if self.completed && !self.stdin_open {
            ConsoleAction::Stop
        } else {
            ConsoleAction::Continue
        }
    }
}

pub struct OperatorConsole {
    controller: Arc<ExplorationController>,
    user_name: String,
}

impl OperatorConsole {
    pub fn new(controller: Arc<ExplorationController>, user_name: impl Into<String>) -> Self {
        Self {
            controller,
            user_name: user_name.into(),
        }
    }

    /// Spawn a task forwarding stdin lines into a channel.
    ///
    /// The channel closes at EOF.
    pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if tx.send(line).await.is_err() {
                    break;
                }
            }
        });
        rx
    }

    /// Handle one console line.
    ///
    /// Chat replies and navigation notices arrive through the event stream,
    /// so only failures are printed here.
    pub async fn handle_line(&self, line: &str) -> ConsoleAction {
        let Some(command) = OperatorCommand::parse(line) else {
            return ConsoleAction::Continue;
        };

        match command {
            OperatorCommand::Input(values) => {
                self.submit(InputResponse::Values(values)).await;
            }
            OperatorCommand::Skip => {
                self.submit(InputResponse::Skipped).await;
            }
            OperatorCommand::Stop => return ConsoleAction::Stop,
            OperatorCommand::Help => println!("{}", OperatorCommand::help_text()),
            OperatorCommand::Chat(text) => {
                let controller = self.controller.clone();
                let user_name = self.user_name.clone();
                // Chat waits for the loop to pause; keep the console responsive.
                tokio::spawn(async move {
                    if let Err(e) = controller.send_chat_message(&user_name, &text).await {
                        eprintln!("{} {}", "chat failed:".red().bold(), e);
                    }
                });
            }
            OperatorCommand::Invalid(msg) => eprintln!("{}", msg.yellow()),
        }
        ConsoleAction::Continue
    }

    async fn submit(&self, response: InputResponse) {
        if !self
            .controller
            .submit_user_input(&self.user_name, response)
            .await
        {
            eprintln!("{}", "No input request is pending".yellow());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed() -> ExplorationEvent {
        ExplorationEvent::new(
            "alice",
            EventPayload::SessionCompleted {
                objective_achieved: false,
                total_pages_discovered: 3,
                total_actions_executed: 7,
                duration_seconds: 12,
            },
        )
    }

    #[test]
    fn test_completion_keeps_console_open_for_chat() {
        let mut state = ConsoleLoop::default();
        assert_eq!(state.on_event(&completed()), ConsoleAction::Continue);
        assert!(state.stdin_open());
    }

    #[test]
    fn test_stdin_close_after_completion_stops() {
        let mut state = ConsoleLoop::default();
        state.on_event(&completed());
        assert_eq!(state.on_stdin_closed(), ConsoleAction::Stop);
    }

    #[test]
    fn test_stdin_close_while_running_waits_for_completion() {
        let mut state = ConsoleLoop::default();
        assert_eq!(state.on_stdin_closed(), ConsoleAction::Continue);
        assert!(!state.stdin_open());
        assert_eq!(state.on_event(&completed()), ConsoleAction::Stop);
    }
}
