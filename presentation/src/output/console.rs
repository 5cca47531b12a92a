//! Console output for exploration events

use crate::output::formatter::EventFormatter;
use colored::Colorize;
use scout_application::{ChatRole, EventPayload, ExplorationEvent, PageScope};
use scout_domain::truncate;

const TEXT_WIDTH: usize = 120;

/// Formats events as colored one-line summaries
pub struct ConsoleFormatter {
    /// Only the chat exchange, input prompts and the final result
    quiet: bool,
}

impl ConsoleFormatter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Banner printed once when a session starts or resumes
    pub fn header(title: &str, objective: &str, start_url: &str) -> String {
        let line = "=".repeat(60);
        format!(
            "{}\n{:^60}\n{}\n{} {}\n{} {}\n",
            line.cyan(),
            title.bold(),
            line.cyan(),
            "Objective:".cyan().bold(),
            objective,
            "Start URL:".cyan().bold(),
            start_url
        )
    }

    fn is_essential(payload: &EventPayload) -> bool {
        matches!(
            payload,
            EventPayload::InputRequested { .. }
                | EventPayload::SessionCompleted { .. }
                | EventPayload::ChatMessage { .. }
                | EventPayload::ChatError { .. }
        )
    }

    fn page_tag(page: &PageScope) -> String {
        format!("[{} #{}]", page.url, page.step_number)
            .dimmed()
            .to_string()
    }

    fn format_payload(payload: &EventPayload) -> String {
        match payload {
            EventPayload::PageStarted { page, priority } => format!(
                "\n{} {} {}",
                "▶ Page".cyan().bold(),
                page.url.bold(),
                format!("(priority {})", priority).dimmed()
            ),
            EventPayload::PageCompleted {
                page,
                steps_executed,
                successful_steps,
            } => format!(
                "{} {} {}",
                "✓ Page done".green(),
                page.url,
                format!("({}/{} steps succeeded)", successful_steps, steps_executed).dimmed()
            ),
            EventPayload::DecisionMade { page, decision } => format!(
                "  {} {} {}",
                Self::page_tag(page),
                decision.action.tool().as_str().yellow(),
                truncate(&decision.reasoning, TEXT_WIDTH).dimmed()
            ),
            EventPayload::ToolStarted {
                page,
                tool,
                instruction,
            } => format!(
                "  {} {} {}",
                Self::page_tag(page),
                format!("→ {}", tool).yellow(),
                truncate(instruction, TEXT_WIDTH)
            ),
            EventPayload::ToolCompleted { page, step } => {
                let mark = if step.success {
                    "✓".green()
                } else {
                    "✗".red()
                };
                format!(
                    "  {} {} {}",
                    Self::page_tag(page),
                    mark,
                    truncate(&step.result, TEXT_WIDTH)
                )
            }
            EventPayload::ActResult {
                page,
                success,
                url_changed,
                new_url,
                queued,
            } => {
                let status = if *success {
                    "act ok".green()
                } else {
                    "act failed".red()
                };
                let mut line = format!("  {} {}", Self::page_tag(page), status);
                if *url_changed && let Some(url) = new_url {
                    line.push_str(&format!(" → {}", url));
                    if *queued {
                        line.push_str(&format!(" {}", "(queued)".dimmed()));
                    }
                }
                line
            }
            EventPayload::InputRequested {
                page,
                inputs,
                timeout_seconds,
            } => {
                let mut out = format!(
                    "\n{} {} {}\n",
                    "? Input needed".magenta().bold(),
                    Self::page_tag(page),
                    format!("(answer within {}s)", timeout_seconds).dimmed()
                );
                for spec in inputs {
                    out.push_str(&format!(
                        "    {} {}: {}\n",
                        spec.key.bold(),
                        format!("[{}]", spec.input_type).dimmed(),
                        spec.prompt
                    ));
                }
                let keys: Vec<String> = inputs.iter().map(|s| format!("{}=...", s.key)).collect();
                out.push_str(&format!(
                    "    {} /input {}   or   /skip",
                    "reply:".dimmed(),
                    keys.join(" ")
                ));
                out
            }
            EventPayload::InputReceived {
                page,
                keys,
                skipped,
            } => {
                if *skipped {
                    format!("  {} {}", Self::page_tag(page), "input skipped".yellow())
                } else {
                    format!(
                        "  {} input received: {}",
                        Self::page_tag(page),
                        keys.join(", ")
                    )
                }
            }
            EventPayload::StandbyCompleted {
                page,
                waited_seconds,
            } => format!(
                "  {} waited {}s",
                Self::page_tag(page),
                waited_seconds
            ),
            EventPayload::UrlDiscovered { url, priority, .. } => format!(
                "  {} {} {}",
                "+ discovered".blue(),
                url,
                format!("(priority {})", priority).dimmed()
            ),
            EventPayload::SessionCompleted {
                objective_achieved,
                total_pages_discovered,
                total_actions_executed,
                duration_seconds,
            } => {
                let verdict = if *objective_achieved {
                    "Objective achieved".green().bold()
                } else {
                    "Objective not achieved".yellow().bold()
                };
                format!(
                    "\n{}\n{}\n  pages discovered: {}\n  actions executed: {}\n  duration: {}s\n{}",
                    "=".repeat(60).cyan(),
                    verdict,
                    total_pages_discovered,
                    total_actions_executed,
                    duration_seconds,
                    "=".repeat(60).cyan()
                )
            }
            EventPayload::EnrichmentStarted { url, .. } => {
                format!("  {} {}", "… enriching".dimmed(), url.dimmed())
            }
            EventPayload::EnrichmentUpdated { url, artifact } => format!(
                "  {} {} {}",
                "◆ enrichment".blue(),
                url,
                format!("(rev {}, step {})", artifact.revision, artifact.step_number).dimmed()
            ),
            EventPayload::ChatMessage { role, text } => match role {
                ChatRole::User => format!("{} {}", "you:".bold(), text),
                ChatRole::Assistant => format!("{} {}", "scout:".cyan().bold(), text),
            },
            EventPayload::ChatNavigated {
                request_type,
                url,
                queued,
            } => {
                let mut line = format!(
                    "  {} {} {}",
                    "↪ chat navigation".cyan(),
                    url,
                    format!("({})", request_type).dimmed()
                );
                if *queued {
                    line.push_str(&format!(" {}", "(queued)".dimmed()));
                }
                line
            }
            EventPayload::ChatError { message } => {
                format!("{} {}", "chat error:".red().bold(), message)
            }
        }
    }
}

impl EventFormatter for ConsoleFormatter {
    fn format(&self, event: &ExplorationEvent) -> Option<String> {
        if self.quiet && !Self::is_essential(&event.payload) {
            return None;
        }
        Some(Self::format_payload(&event.payload))
    }
}

/// Formats events as JSON lines
pub struct JsonFormatter;

impl EventFormatter for JsonFormatter {
    fn format(&self, event: &ExplorationEvent) -> Option<String> {
        serde_json::to_string(event).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_domain::{InputSpec, InputType};

    fn event(payload: EventPayload) -> ExplorationEvent {
        ExplorationEvent::new("alice", payload)
    }

    fn page() -> PageScope {
        PageScope::new("https://example.com/login", "example-com_login_abc", 3)
    }

    #[test]
    fn test_input_request_lists_keys_and_reply_hint() {
        colored::control::set_override(false);
        let out = ConsoleFormatter::new(false)
            .format(&event(EventPayload::InputRequested {
                page: page(),
                inputs: vec![
                    InputSpec::new("email", InputType::Email, "Your email"),
                    InputSpec::new("password", InputType::Password, "Your password"),
                ],
                timeout_seconds: 300,
            }))
            .unwrap();
        assert!(out.contains("email"));
        assert!(out.contains("Your password"));
        assert!(out.contains("/input email=... password=..."));
        assert!(out.contains("300s"));
    }

    #[test]
    fn test_quiet_hides_step_noise() {
        let quiet = ConsoleFormatter::new(true);
        let noisy = event(EventPayload::StandbyCompleted {
            page: page(),
            waited_seconds: 2,
        });
        assert!(quiet.format(&noisy).is_none());

        let done = event(EventPayload::SessionCompleted {
            objective_achieved: true,
            total_pages_discovered: 4,
            total_actions_executed: 9,
            duration_seconds: 12,
        });
        assert!(quiet.format(&done).is_some());
    }

    #[test]
    fn test_act_result_shows_queued_navigation() {
        colored::control::set_override(false);
        let out = ConsoleFormatter::new(false)
            .format(&event(EventPayload::ActResult {
                page: page(),
                success: true,
                url_changed: true,
                new_url: Some("https://example.com/pricing".to_string()),
                queued: true,
            }))
            .unwrap();
        assert!(out.contains("https://example.com/pricing"));
        assert!(out.contains("(queued)"));
    }

    #[test]
    fn test_json_formatter_emits_tagged_object() {
        let line = JsonFormatter
            .format(&event(EventPayload::ChatError {
                message: "classifier down".to_string(),
            }))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["type"], "chat_error");
        assert_eq!(value["user_name"], "alice");
        assert_eq!(value["message"], "classifier down");
    }
}
