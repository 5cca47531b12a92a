//! CLI entrypoint for scout
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, anyhow, bail};
use clap::Parser;
use colored::Colorize;
use scout_application::{
    ChannelEventSink, Collaborators, CompositeEventSink, EventSink, ExplorationController,
    ExplorationEvent,
};
use scout_infrastructure::{
    ConfigLoader, FileConfig, FileSessionStore, HttpBrowser, HttpChatClassifier,
    HttpDecisionProvider, HttpEnrichmentProvider, InMemorySessionRegistry, JsonClient,
    JsonlEventLog,
};
use scout_presentation::{
    Cli, ConsoleAction, ConsoleFormatter, ConsoleLoop, EventFormatter, OperatorCommand,
    OperatorConsole, OutputFormat, formatter_for,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    apply_cli_overrides(&mut config, &cli);

    let _log_guard = init_logging(&config, cli.verbose);
    info!("Starting scout");

    let issues = config.validate();
    for issue in &issues {
        if issue.is_error() {
            eprintln!("{}", issue.to_string().red());
        } else {
            eprintln!("{}", issue.to_string().yellow());
        }
    }
    if issues.iter().any(|i| i.is_error()) {
        bail!("Configuration is invalid");
    }

    let user_name = cli
        .user
        .clone()
        .unwrap_or_else(|| config.exploration.user_name.clone());

    // === Dependency Injection ===
    let store = Arc::new(FileSessionStore::new(&config.storage.base_dir));
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ExplorationEvent>();
    let mut sinks: Vec<Arc<dyn EventSink>> = vec![Arc::new(ChannelEventSink::new(event_tx))];
    if config.logging.event_log {
        let path = event_log_path(&config, &store, &user_name);
        match JsonlEventLog::new(&path) {
            Some(log) => sinks.push(Arc::new(log)),
            None => warn!("Event log disabled: could not open {}", path.display()),
        }
    }

    let collaborators = &config.collaborators;
    let timeout = collaborators.request_timeout();
    let deps = Collaborators {
        browser: Arc::new(HttpBrowser::new(JsonClient::new(
            &collaborators.browser_url,
            timeout,
        )?)),
        decision: Arc::new(HttpDecisionProvider::new(JsonClient::new(
            &collaborators.decision_url,
            timeout,
        )?)),
        chat: Arc::new(HttpChatClassifier::new(JsonClient::new(
            &collaborators.chat_url,
            timeout,
        )?)),
        enrichment: Arc::new(HttpEnrichmentProvider::new(JsonClient::new(
            &collaborators.enrichment_url,
            timeout,
        )?)),
        store,
        registry: Arc::new(InMemorySessionRegistry::new()),
        events: Arc::new(CompositeEventSink::new(sinks)),
    };
    let controller = Arc::new(ExplorationController::new(
        deps,
        config.exploration.execution_params(),
    ));

    let engine = if cli.resume {
        match controller.recover(&user_name).await? {
            Some(engine) => engine,
            None => {
                println!("Nothing to resume for {}", user_name);
                return Ok(());
            }
        }
    } else {
        let session = config.exploration.session_config(
            Some(user_name.as_str()),
            cli.objective.as_deref(),
            cli.start_url.as_deref(),
        );
        if session.objective.trim().is_empty() {
            bail!("Objective is required. Pass it as the first argument or set exploration.objective.");
        }
        if session.start_url.trim().is_empty() {
            bail!("Start URL is required. Pass it as the second argument or set exploration.start_url.");
        }
        controller.start(session).await?
    };

    let formatter = formatter_for(cli.output, cli.quiet);
    if cli.output == OutputFormat::Text && !cli.quiet {
        let title = if cli.resume {
            "Scout - Resumed Exploration"
        } else {
            "Scout - Exploration"
        };
        let session = engine.config();
        println!(
            "{}",
            ConsoleFormatter::header(title, &session.objective, &session.start_url)
        );
        println!("{}\n", OperatorCommand::help_text().dimmed());
    }

    let console = OperatorConsole::new(controller.clone(), &user_name);
    let mut stdin_rx = OperatorConsole::spawn_stdin_reader();
    let mut state = ConsoleLoop::default();

    // A completed session stays parked for chat until /stop, ctrl-c or EOF
    loop {
        tokio::select! {
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                print_event(formatter.as_ref(), &event);
                if state.on_event(&event) == ConsoleAction::Stop {
                    break;
                }
            }
            line = stdin_rx.recv(), if state.stdin_open() => match line {
                Some(line) => {
                    if console.handle_line(&line).await == ConsoleAction::Stop {
                        controller.stop(&user_name).await;
                        drain_events(formatter.as_ref(), &mut event_rx);
                        break;
                    }
                }
                None => {
                    if state.on_stdin_closed() == ConsoleAction::Stop {
                        break;
                    }
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping sessions");
                controller.stop_all().await;
                drain_events(formatter.as_ref(), &mut event_rx);
                break;
            }
        }
    }

    Ok(())
}

fn apply_cli_overrides(config: &mut FileConfig, cli: &Cli) {
    let exploration = &mut config.exploration;
    if cli.explore {
        exploration.is_exploration = true;
    }
    if let Some(max_pages) = cli.max_pages {
        exploration.max_pages_to_explore = max_pages;
    }
    if let Some(context) = &cli.context {
        exploration.additional_context = Some(context.clone());
    }
    if cli.can_login {
        exploration.can_login = true;
    }
}

/// Initialize logging based on verbosity level, with an optional rolling
/// file next to the console output.
fn init_logging(config: &FileConfig, verbose: u8) -> Option<WorkerGuard> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = match &config.logging.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, &config.logging.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}

fn event_log_path(config: &FileConfig, store: &FileSessionStore, user_name: &str) -> PathBuf {
    match &config.logging.directory {
        Some(dir) => dir.join(format!("{}.events.jsonl", user_name)),
        None => store.session_dir(user_name).join("events.jsonl"),
    }
}

fn print_event(formatter: &dyn EventFormatter, event: &ExplorationEvent) {
    if let Some(line) = formatter.format(event) {
        println!("{}", line);
    }
}

fn drain_events(
    formatter: &dyn EventFormatter,
    rx: &mut mpsc::UnboundedReceiver<ExplorationEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        print_event(formatter, &event);
    }
}
