//! Recognition of direct-navigation instructions.
//!
//! `act` instructions such as `"Navigate to https://example.com/docs"` are
//! executed as a plain navigation instead of going through the browser
//! agent. Only an absolute http(s) URL or an absolute path qualifies, so
//! phrases like `"open the menu"` are left to the agent.

use crate::page::identity::resolve_against;
use regex::Regex;
use std::sync::LazyLock;

static NAVIGATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^\s*(?:navigate\s+to|go\s+to|open)\s+["'<]?((?:https?://|/)[^\s"'>]*)["'>]?\s*\.?\s*$"#)
        .expect("navigate pattern is valid")
});

/// Extract the navigation target from an instruction, resolved against
/// the current page URL.
pub fn parse_navigate_instruction(instruction: &str, current_url: &str) -> Option<String> {
    let caps = NAVIGATE_RE.captures(instruction)?;
    let target = caps.get(1)?.as_str().trim_end_matches('.');
    resolve_against(current_url, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://example.com/docs";

    #[test]
    fn test_absolute_url() {
        assert_eq!(
            parse_navigate_instruction("Navigate to https://example.com/pricing/", BASE).as_deref(),
            Some("https://example.com/pricing")
        );
    }

    #[test]
    fn test_relative_path_and_variants() {
        assert_eq!(
            parse_navigate_instruction("go to /login", BASE).as_deref(),
            Some("https://example.com/login")
        );
        assert_eq!(
            parse_navigate_instruction("OPEN 'https://example.com/a'.", BASE).as_deref(),
            Some("https://example.com/a")
        );
    }

    #[test]
    fn test_non_navigation_instructions() {
        assert_eq!(parse_navigate_instruction("Click the Pricing link", BASE), None);
        assert_eq!(parse_navigate_instruction("open the menu", BASE), None);
        assert_eq!(
            parse_navigate_instruction("navigate to https://example.com and click login", BASE),
            None
        );
    }
}
