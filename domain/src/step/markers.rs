//! Result strings with embedded markers.
//!
//! The decision collaborator only sees the previous step's `result` text,
//! so each outcome spells out its URL/queue/skip state as `KEY=value`
//! pairs that can be matched without looking at a screenshot.

pub const URL_CHANGED_FALSE: &str = "URL_CHANGED=false";
pub const URL_CHANGED_QUEUED: &str = "URL_CHANGED=true, QUEUED=true";
pub const URL_CHANGED_NOT_QUEUED: &str = "URL_CHANGED=true, QUEUED=false";
pub const INPUT_SKIPPED: &str = "INPUT_SKIPPED=true";

/// Act succeeded and the browser stayed on the same page.
pub fn stayed_on_page(result: &str, url: &str) -> String {
    format!(
        "{} | Stayed on same page ({}). [{}]",
        result, url, URL_CHANGED_FALSE
    )
}

/// Act navigated away; the new page was queued and the browser returned.
pub fn navigated_and_queued(result: &str, new_url: &str, original_url: &str) -> String {
    format!(
        "{} | Navigation to {} was queued for later exploration; returned to {}. [{}]",
        result, new_url, original_url, URL_CHANGED_QUEUED
    )
}

/// Act navigated away during a sensitive flow; browser stays on the new page.
pub fn navigated_in_flow(result: &str, new_url: &str) -> String {
    format!(
        "{} | Now on {} (sensitive flow in progress, not queued). [{}]",
        result, new_url, URL_CHANGED_NOT_QUEUED
    )
}

/// The user declined to provide the requested inputs.
pub fn input_skipped(keys: &[String]) -> String {
    format!(
        "User skipped input for [{}]. Do not request these inputs again; continue without them. [{}]",
        keys.join(", "),
        INPUT_SKIPPED
    )
}

/// The user provided the requested inputs.
pub fn input_received(keys: &[String]) -> String {
    format!(
        "User provided values for [{}]; they are available in stored inputs.",
        keys.join(", ")
    )
}
