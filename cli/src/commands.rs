//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, colored when the terminal supports it
    Text,
    /// Machine-readable JSON
    Json,
}

/// CLI arguments for tool-relay
#[derive(Parser, Debug)]
#[command(name = "tool-relay")]
#[command(author, version, about = "Tool-calling conversation orchestrator with error recovery")]
#[command(long_about = r#"
tool-relay drives a round-based conversation between a model and a set of tools.
Failed tool calls are classified and recovered (retry, fallback, degradation) or
halted for the user; delegated work is tracked until its completion signal arrives.

Configuration files are loaded from (in priority order):
1. TOOL_RELAY_* environment variables (e.g. TOOL_RELAY_ORCHESTRATOR__MAX_ROUNDS=3)
2. --config <path>          Explicit config file
3. ./tool-relay.toml        Project-level config
4. ~/.config/tool-relay/config.toml   Global config

Examples:
  tool-relay run --script demo.json "Summarize README.md"
  tool-relay classify "Permission denied: /etc/shadow" --tool read_file
  tool-relay config
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Also write diagnostics to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a scripted conversation against the demo tools
    Run(RunArgs),

    /// Classify a tool error and show the planned recovery
    Classify(ClassifyArgs),

    /// Show configuration sources and the effective configuration
    Config {
        /// Only list the configuration sources
        #[arg(long)]
        sources: bool,
    },
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// The user's request
    pub intent: String,

    /// Replay script (JSON) standing in for the model
    #[arg(short, long, value_name = "PATH")]
    pub script: PathBuf,

    /// Completion signals (JSON array) to apply after the conversation
    #[arg(long, value_name = "PATH")]
    pub signals: Option<PathBuf>,

    /// Override the round ceiling
    #[arg(long, value_name = "N")]
    pub max_rounds: Option<u32>,

    /// Invoke the calls of a round one at a time
    #[arg(long)]
    pub sequential: bool,

    /// Write a JSONL conversation transcript
    #[arg(long, value_name = "PATH")]
    pub conversation_log: Option<PathBuf>,

    /// Load and save execution history here
    #[arg(long, value_name = "PATH")]
    pub history: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(clap::Args, Debug)]
pub struct ClassifyArgs {
    /// Error text reported by the tool
    pub error: String,

    /// Name of the failing tool
    #[arg(long, default_value = "tool")]
    pub tool: String,

    /// Tools available as fallbacks (defaults to the demo tools)
    #[arg(long = "available", value_name = "TOOL")]
    pub available: Vec<String>,

    /// Retries already made for this call
    #[arg(long, default_value_t = 0)]
    pub retry_count: u32,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::parse_from([
            "tool-relay",
            "-vv",
            "run",
            "--script",
            "demo.json",
            "--max-rounds",
            "3",
            "--sequential",
            "do it",
        ]);
        assert_eq!(cli.verbose, 2);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.intent, "do it");
        assert_eq!(args.max_rounds, Some(3));
        assert!(args.sequential);
        assert_eq!(args.output, OutputFormat::Text);
    }

    #[test]
    fn test_parse_classify() {
        let cli = Cli::parse_from([
            "tool-relay",
            "classify",
            "rate limit exceeded",
            "--tool",
            "search",
            "--available",
            "search",
            "--available",
            "grep",
            "-o",
            "json",
        ]);
        let Command::Classify(args) = cli.command else {
            panic!("expected classify");
        };
        assert_eq!(args.tool, "search");
        assert_eq!(args.available, vec!["search", "grep"]);
        assert_eq!(args.output, OutputFormat::Json);
    }
}
