//! Formatting of command results

use colored::Colorize;
use relay_application::{Attribution, ConversationOutcome, StopReason};
use relay_domain::{ErrorClassification, RecoveryAction, ToolCallStatus};

pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn outcome(outcome: &ConversationOutcome) -> String {
        let mut out = String::new();
        out.push_str(&Self::header("Conversation"));
        out.push_str(&format!("{} {}\n", "Id:".cyan().bold(), outcome.conversation_id));
        out.push_str(&format!("{} {}\n", "Stop:".cyan().bold(), Self::stop_reason(&outcome.stop_reason)));
        out.push_str(&format!(
            "{} {} ({} with tools)\n",
            "Rounds:".cyan().bold(),
            outcome.rounds.len(),
            outcome.tool_rounds()
        ));
        out.push_str(&format!("{} {}\n", "Tool errors:".cyan().bold(), outcome.error_count));

        let calls: Vec<_> = outcome.tool_calls().collect();
        if !calls.is_empty() {
            out.push_str(&format!("\n{}\n", "Tool calls:".cyan().bold()));
            for call in calls {
                let status = Self::call_status(&call.status);
                out.push_str(&format!(
                    "  {:<16} {:<10} {} attempt(s), {}ms\n",
                    call.tool_name, status, call.attempts, call.duration_ms
                ));
            }
        }

        if let StopReason::Halted { user_message } = &outcome.stop_reason {
            out.push_str(&format!("\n{}\n{}\n", "Action needed:".red().bold(), user_message));
        }

        out.push_str(&format!("\n{}\n{}\n", "Final answer:".cyan().bold(), outcome.final_text));
        out
    }

    pub fn attributions(attributions: &[Option<Attribution>]) -> String {
        let mut out = Self::header("Completion signals");
        for (i, attribution) in attributions.iter().enumerate() {
            match attribution {
                Some(a) => out.push_str(&format!(
                    "  #{} → {} [{}] via {}\n",
                    i + 1,
                    a.execution.id,
                    a.execution.status.as_str(),
                    a.method.as_str()
                )),
                None => out.push_str(&format!("  #{} → {}\n", i + 1, "unattributed".yellow())),
            }
        }
        out
    }

    pub fn classification(
        classification: &ErrorClassification,
        action: &RecoveryAction,
        suggestions: &[String],
    ) -> String {
        let mut out = Self::header("Classification");
        out.push_str(&format!("{} {}\n", "Kind:".cyan().bold(), classification.kind));
        out.push_str(&format!(
            "{} {}\n",
            "Severity:".cyan().bold(),
            classification.severity.as_str()
        ));
        out.push_str(&format!(
            "{} {}\n",
            "Recoverable:".cyan().bold(),
            classification.recoverable
        ));
        out.push_str(&format!(
            "{} {:.2}\n",
            "Confidence:".cyan().bold(),
            classification.confidence
        ));
        out.push_str(&format!(
            "\n{} {} ({})\n",
            "Action:".cyan().bold(),
            action.strategy.as_str(),
            action.description
        ));
        if let Some(options) = &action.fallback_options {
            out.push_str(&format!("{} {}\n", "Fallbacks:".cyan().bold(), options.join(", ")));
        }
        if !suggestions.is_empty() {
            out.push_str(&format!("\n{}\n", "Suggestions:".cyan().bold()));
            for s in suggestions {
                out.push_str(&format!("  * {}\n", s));
            }
        }
        out
    }

    fn call_status(status: &ToolCallStatus) -> colored::ColoredString {
        match status {
            ToolCallStatus::Succeeded => "ok".green(),
            ToolCallStatus::Cached => "cached".green(),
            ToolCallStatus::Delegated => "delegated".blue(),
            ToolCallStatus::Recovered => "recovered".yellow(),
            ToolCallStatus::Halted => "halted".red(),
            ToolCallStatus::Skipped => "skipped".dimmed(),
        }
    }

    fn stop_reason(reason: &StopReason) -> colored::ColoredString {
        match reason {
            StopReason::Completed => "completed".green(),
            StopReason::RoundCeiling => "round limit (final summary)".green(),
            StopReason::Halted { .. } => "halted".red().bold(),
            StopReason::Cancelled => "cancelled".yellow(),
            StopReason::ModelError { message } => format!("model error: {}", message).red(),
        }
    }

    fn header(title: &str) -> String {
        format!("\n{}\n", format!("=== {} ===", title).bold())
    }
}
