//! Console progress for conversations

use colored::Colorize;
use relay_application::ConversationProgress;
use relay_domain::{RecoveryResult, ToolCallStatus};
use std::io::Write;

/// Streams model text to stdout and tool activity to stderr.
pub struct ConsoleProgress;

impl ConsoleProgress {
    fn status_label(status: &ToolCallStatus) -> colored::ColoredString {
        match status {
            ToolCallStatus::Succeeded => "ok".green(),
            ToolCallStatus::Cached => "cached".cyan(),
            ToolCallStatus::Delegated => "delegated".blue(),
            ToolCallStatus::Recovered => "recovered".yellow(),
            ToolCallStatus::Halted => "halted".red().bold(),
            ToolCallStatus::Skipped => "skipped".dimmed(),
        }
    }
}

impl ConversationProgress for ConsoleProgress {
    fn on_round_start(&self, round: u32, max_rounds: u32) {
        eprintln!("\n{}", format!("── Round {}/{} ──", round, max_rounds).dimmed());
    }

    fn on_text(&self, chunk: &str) {
        print!("{}", chunk);
        let _ = std::io::stdout().flush();
    }

    fn on_tool_call(&self, tool_name: &str, args_preview: &str) {
        if args_preview.is_empty() {
            eprintln!("\n  {} {}", "→".cyan(), tool_name.bold());
        } else {
            eprintln!("\n  {} {} {}", "→".cyan(), tool_name.bold(), args_preview.dimmed());
        }
    }

    fn on_tool_result(&self, tool_name: &str, status: &ToolCallStatus) {
        eprintln!("  {} {} [{}]", "←".cyan(), tool_name, Self::status_label(status));
    }

    fn on_recovery(&self, tool_name: &str, result: &RecoveryResult) {
        eprintln!(
            "  {} {}: {}",
            "↻".yellow(),
            tool_name,
            result.narrative().yellow()
        );
    }

    fn on_final_summary(&self) {
        eprintln!("\n{}", "Round limit reached; asking for a final answer".yellow());
    }

    fn on_halt(&self, message: &str) {
        eprintln!("\n{}\n{}", "Stopped: needs your attention".red().bold(), message);
    }
}
