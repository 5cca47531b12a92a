//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// How exploration events are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Colored one-line summaries
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// CLI arguments for scout
#[derive(Parser, Debug)]
#[command(name = "scout")]
#[command(author, version, about = "Queue-driven web exploration driven by an objective")]
#[command(long_about = r#"
Scout explores a web application page by page toward an objective.

Each page runs a step loop: a decision collaborator looks at a screenshot
and picks one tool (act, request_input, standby). Navigations discovered
along the way are queued by priority and explored in turn.

While a session runs, stdin is an operator console:
  /input key=value ...   Answer a pending input request
  /skip                  Decline a pending input request
  /stop                  Stop the session
  /help                  Show commands
  anything else          Chat message (pauses, answers, resumes)

Configuration files are loaded from (in priority order):
1. --config <path>                  Explicit config file
2. ./scout.toml                     Project-level config
3. ~/.config/scout/config.toml      Global config
Environment variables prefixed SCOUT_ override all files
(e.g. SCOUT_EXPLORATION__MAX_PAGES_TO_EXPLORE=5).

Example:
  scout "Find the pricing of the team plan" https://example.com
  scout --explore --max-pages 20 "Map the documentation" https://docs.example.com
  scout --resume --user alice
"#)]
pub struct Cli {
    /// What the exploration should accomplish
    pub objective: Option<String>,

    /// URL the exploration starts from
    pub start_url: Option<String>,

    /// Session owner; one session runs per user
    #[arg(short, long, value_name = "NAME")]
    pub user: Option<String>,

    /// Breadth-first discovery instead of a single-objective run
    #[arg(long)]
    pub explore: bool,

    /// Upper bound on pages the session will visit
    #[arg(long, value_name = "N")]
    pub max_pages: Option<usize>,

    /// Extra context handed to the decision collaborator
    #[arg(long, value_name = "TEXT")]
    pub context: Option<String>,

    /// Allow the session to go through login flows
    #[arg(long)]
    pub can_login: bool,

    /// Resume the persisted session of --user instead of starting one
    #[arg(long)]
    pub resume: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print the final result
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
