//! CLI entrypoint for tool-relay
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod commands;
mod output;
mod progress;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use colored::Colorize;
use commands::{ClassifyArgs, Cli, Command, OutputFormat, RunArgs};
use output::ConsoleFormatter;
use progress::ConsoleProgress;
use relay_application::{
    Attribution, CompletionSignalHandler, ConversationLogger, ConversationOrchestrator,
    ConversationProgress, ConversationRequest, ErrorRecoveryEngine, ExecutionRegistry,
    NoConversationProgress, RelayConfig, ToolInvokerPort, ToolResultManager,
};
use relay_domain::{CompletionSignal, ConversationId, ToolCallContext, ToolDefinition, ToolError};
use relay_infrastructure::{
    ConfigLoader, FileConfig, JsonHistoryStore, JsonlConversationLogger, ReplayGateway,
    ReplayScript, TracingEventSink, demo_tools,
};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // === Load Configuration ===
    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    file_config.validate().context("Invalid configuration")?;

    let log_file = cli
        .log_file
        .clone()
        .or_else(|| file_config.logging.log_file.clone());
    let _guard = init_tracing(cli.verbose, log_file.as_deref())?;

    info!("Starting tool-relay");

    match &cli.command {
        Command::Run(args) => run_conversation(&cli, args, &file_config).await,
        Command::Classify(args) => {
            classify_error(args, &file_config.to_relay_config())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Config { sources } => {
            show_config(&cli, &file_config, *sources)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Initialize logging based on verbosity level, optionally teeing to a file.
///
/// The returned guard flushes the file writer on drop.
fn init_tracing(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow!("Invalid log file path: {}", path.display()))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

async fn run_conversation(cli: &Cli, args: &RunArgs, file_config: &FileConfig) -> Result<ExitCode> {
    let mut relay = file_config.to_relay_config();
    if let Some(max_rounds) = args.max_rounds {
        let params = relay.orchestrator().clone().with_max_rounds(max_rounds);
        relay = relay.with_orchestrator(params);
    }
    if args.sequential {
        relay = relay.with_sequential_tools();
    }

    // === Dependency Injection ===
    let script = ReplayScript::from_file(&args.script)
        .with_context(|| format!("Failed to load replay script {}", args.script.display()))?;
    let gateway = Arc::new(ReplayGateway::new(script));
    let tools = Arc::new(demo_tools());
    let cache = Arc::new(ToolResultManager::new(relay.cache().clone()));
    let recovery = Arc::new(ErrorRecoveryEngine::new(relay.recovery().clone()));
    let registry =
        ExecutionRegistry::with_event_sink(relay.registry().clone(), Arc::new(TracingEventSink));

    let history_store = args
        .history
        .clone()
        .or_else(|| file_config.logging.history_file.clone())
        .map(JsonHistoryStore::new);
    if let Some(store) = &history_store {
        let records = store.load()?;
        let restored = registry
            .restore(records)
            .context("Failed to restore execution history")?;
        info!(restored, path = %store.path().display(), "Loaded execution history");
    }

    let logger: Option<Arc<dyn ConversationLogger>> = args
        .conversation_log
        .clone()
        .or_else(|| file_config.logging.conversation_log.clone())
        .and_then(|path| {
            let logger = JsonlConversationLogger::new(&path);
            if logger.is_none() {
                warn!(path = %path.display(), "Could not open conversation log; continuing without it");
            }
            logger
        })
        .map(|logger| Arc::new(logger) as Arc<dyn ConversationLogger>);

    let mut orchestrator =
        ConversationOrchestrator::new(gateway, tools, cache, recovery, registry.clone())
            .with_params(relay.orchestrator().clone());
    if let Some(logger) = &logger {
        orchestrator = orchestrator.with_conversation_logger(logger.clone());
    }

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; cancelling conversation");
            interrupt.cancel();
        }
    });

    // JSON output keeps stdout for the final document only
    let silent = cli.quiet || args.output == OutputFormat::Json;
    let progress: Box<dyn ConversationProgress> = if silent {
        Box::new(NoConversationProgress)
    } else {
        Box::new(ConsoleProgress)
    };

    let outcome = orchestrator
        .run(
            ConversationRequest::new(args.intent.as_str()),
            progress.as_ref(),
            &cancel,
        )
        .await?;

    let attributions = match &args.signals {
        Some(path) => {
            let mut handler = CompletionSignalHandler::new(registry.clone());
            if let Some(logger) = &logger {
                handler = handler.with_conversation_logger(logger.clone());
            }
            apply_signals(&handler, path)?
        }
        None => Vec::new(),
    };

    if cancel.is_cancelled() {
        let cancelled = registry.shutdown();
        if !cancelled.is_empty() {
            warn!(count = cancelled.len(), "Cancelled active executions");
        }
    }
    if let Some(store) = &history_store {
        store.save_snapshot(registry.snapshot())?;
        info!(path = %store.path().display(), "Saved execution history");
    }

    match args.output {
        OutputFormat::Text => {
            println!();
            print!("{}", ConsoleFormatter::outcome(&outcome));
            if args.signals.is_some() {
                print!("{}", ConsoleFormatter::attributions(&attributions));
            }
        }
        OutputFormat::Json => {
            let document = serde_json::json!({
                "outcome": outcome,
                "attributions": attributions,
                "active_executions": registry.active_executions(),
            });
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
    }

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn apply_signals(handler: &CompletionSignalHandler, path: &Path) -> Result<Vec<Option<Attribution>>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read signals file {}", path.display()))?;
    let signals: Vec<CompletionSignal> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid signals file {}", path.display()))?;
    Ok(signals.into_iter().map(|s| handler.handle(s)).collect())
}

fn classify_error(args: &ClassifyArgs, relay: &RelayConfig) -> Result<()> {
    let available: Vec<ToolDefinition> = if args.available.is_empty() {
        demo_tools().tool_spec().all().to_vec()
    } else {
        args.available
            .iter()
            .map(|name| ToolDefinition::new(name.as_str(), ""))
            .collect()
    };

    let error = ToolError::new(args.tool.as_str(), "cli", args.error.as_str())
        .with_retry_count(args.retry_count);
    let context = ToolCallContext::new(ConversationId::generate(), "classify").with_tools(available);

    let engine = ErrorRecoveryEngine::new(relay.recovery().clone());
    let classification = engine.classify_error(&error, &context);
    let action = engine.generate_recovery_action(&classification, &error, &context);
    let suggestions = engine.get_recovery_suggestions(&classification, &error, &context);

    match args.output {
        OutputFormat::Text => print!(
            "{}",
            ConsoleFormatter::classification(&classification, &action, &suggestions)
        ),
        OutputFormat::Json => {
            let document = serde_json::json!({
                "classification": classification,
                "action": action,
                "suggestions": suggestions,
            });
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
    }
    Ok(())
}

fn show_config(cli: &Cli, file_config: &FileConfig, sources_only: bool) -> Result<()> {
    println!("{}", "Configuration sources:".cyan().bold());
    if cli.no_config {
        println!("  (disabled by --no-config)");
    } else {
        for source in ConfigLoader::config_sources(cli.config.as_deref()) {
            println!("  {}", source);
        }
    }

    if !sources_only {
        println!();
        println!("{}", "Effective configuration:".cyan().bold());
        print!("{}", toml::to_string_pretty(file_config)?);
    }
    Ok(())
}
