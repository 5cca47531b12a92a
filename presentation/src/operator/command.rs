//! Operator command parsing
//!
//! Lines starting with `/` are commands; everything else is a chat message.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    /// `/input key=value ...`
    Input(HashMap<String, String>),
    /// `/skip`
    Skip,
    /// `/stop`, `/quit`, `/q`
    Stop,
    /// `/help`, `/h`, `/?`
    Help,
    /// Free text
    Chat(String),
    /// Unknown command or malformed arguments, with a message for the operator
    Invalid(String),
}

impl OperatorCommand {
    /// Parse one console line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Some(OperatorCommand::Chat(line.to_string()));
        };

        let (name, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        let command = match name {
            "input" | "i" => match parse_assignments(args) {
                Ok(values) if !values.is_empty() => OperatorCommand::Input(values),
                Ok(_) => OperatorCommand::Invalid("usage: /input key=value ...".to_string()),
                Err(msg) => OperatorCommand::Invalid(msg),
            },
            "skip" => OperatorCommand::Skip,
            "stop" | "quit" | "q" => OperatorCommand::Stop,
            "help" | "h" | "?" => OperatorCommand::Help,
            other => OperatorCommand::Invalid(format!(
                "Unknown command: /{}. Type /help for available commands",
                other
            )),
        };
        Some(command)
    }

    pub fn help_text() -> &'static str {
        "Commands:\n  /input key=value ...  Answer the pending input request (quote values with spaces)\n  /skip                 Decline the pending input request\n  /stop, /quit, /q      Stop the session\n  /help, /h, /?         Show this help\n  <text>                Chat message: pauses exploration, answers, resumes"
    }
}

/// Split `a=1 b="two words"` into a map.
fn parse_assignments(args: &str) -> Result<HashMap<String, String>, String> {
    let mut values = HashMap::new();
    for token in tokenize(args)? {
        let Some((key, value)) = token.split_once('=') else {
            return Err(format!("expected key=value, got '{}'", token));
        };
        if key.is_empty() {
            return Err(format!("missing key in '{}'", token));
        }
        values.insert(key.to_string(), value.to_string());
    }
    Ok(values)
}

fn tokenize(args: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in args.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if in_quotes {
        return Err("unterminated quote".to_string());
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_chat() {
        assert_eq!(
            OperatorCommand::parse("  what is on this page? "),
            Some(OperatorCommand::Chat("what is on this page?".to_string()))
        );
        assert_eq!(OperatorCommand::parse("   "), None);
    }

    #[test]
    fn test_input_assignments() {
        let Some(OperatorCommand::Input(values)) =
            OperatorCommand::parse(r#"/input email=a@b.c name="Ada Lovelace" token=x=y"#)
        else {
            panic!("expected input command");
        };
        assert_eq!(values["email"], "a@b.c");
        assert_eq!(values["name"], "Ada Lovelace");
        assert_eq!(values["token"], "x=y");
    }

    #[test]
    fn test_malformed_input_is_invalid() {
        assert!(matches!(
            OperatorCommand::parse("/input"),
            Some(OperatorCommand::Invalid(_))
        ));
        assert!(matches!(
            OperatorCommand::parse("/input email"),
            Some(OperatorCommand::Invalid(_))
        ));
        assert!(matches!(
            OperatorCommand::parse(r#"/input name="open"#),
            Some(OperatorCommand::Invalid(_))
        ));
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(OperatorCommand::parse("/skip"), Some(OperatorCommand::Skip));
        assert_eq!(OperatorCommand::parse("/q"), Some(OperatorCommand::Stop));
        assert_eq!(OperatorCommand::parse("/?"), Some(OperatorCommand::Help));
        assert!(matches!(
            OperatorCommand::parse("/models"),
            Some(OperatorCommand::Invalid(msg)) if msg.contains("/models")
        ));
    }
}
