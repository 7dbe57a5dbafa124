//! Conversation transcript written as JSON lines.
//!
//! One line per [`ConversationEvent`]:
//!
//! ```text
//! {"seq":3,"type":"recovery","timestamp":"2026-01-05T10:00:00.120Z","conversation_id":"c-1","round":1,"tool":"read_file",...}
//! ```
//!
//! `seq` counts the lines written by one logger, so interleaved events from
//! the orchestrator and the completion handler keep their write order even
//! when timestamps collide. Object payloads are flattened into the line;
//! anything else lands under `data`.

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use relay_application::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Serialize)]
struct TranscriptLine<'a> {
    seq: u64,
    #[serde(rename = "type")]
    event_type: &'a str,
    timestamp: String,
    #[serde(flatten)]
    body: LineBody<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum LineBody<'a> {
    Fields(&'a Map<String, Value>),
    Data { data: &'a Value },
}

impl<'a> LineBody<'a> {
    fn of(payload: &'a Value) -> Self {
        match payload {
            Value::Object(fields) => LineBody::Fields(fields),
            other => LineBody::Data { data: other },
        }
    }
}

struct Transcript {
    writer: BufWriter<File>,
    next_seq: u64,
}

/// Appends conversation events to a transcript file.
pub struct JsonlConversationLogger {
    transcript: Mutex<Transcript>,
    path: PathBuf,
}

impl JsonlConversationLogger {
    /// Open `path` for appending, creating it and its parent directories.
    ///
    /// Returns `None` when the file cannot be opened; callers run without a
    /// transcript in that case.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(path = %parent.display(), "Could not create transcript directory: {}", e);
            return None;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .inspect_err(|e| warn!(path = %path.display(), "Could not open transcript: {}", e))
            .ok()?;

        Some(Self {
            transcript: Mutex::new(Transcript {
                writer: BufWriter::new(file),
                next_seq: 1,
            }),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn line(event: &ConversationEvent, seq: u64, at: DateTime<Utc>) -> serde_json::Result<String> {
        serde_json::to_string(&TranscriptLine {
            seq,
            event_type: event.event_type,
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            body: LineBody::of(&event.payload),
        })
    }
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let mut transcript = self.transcript.lock();
        let line = match Self::line(&event, transcript.next_seq, Utc::now()) {
            Ok(line) => line,
            Err(e) => {
                warn!(event = event.event_type, "Could not serialize transcript line: {}", e);
                return;
            }
        };

        match writeln!(transcript.writer, "{}", line).and_then(|_| transcript.writer.flush()) {
            Ok(()) => transcript.next_seq += 1,
            Err(e) => warn!(path = %self.path.display(), "Could not write transcript line: {}", e),
        }
    }
}

impl Drop for JsonlConversationLogger {
    fn drop(&mut self) {
        let _ = self.transcript.lock().writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_application::ports::conversation_logger::event_types;
    use serde_json::json;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_lines_carry_sequence_and_flattened_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("run.conversation.jsonl");
        let logger = JsonlConversationLogger::new(&path).unwrap();

        logger.log(ConversationEvent::new(
            event_types::TOOL_CALL,
            json!({
                "conversation_id": "c-1",
                "round": 1,
                "tool": "read_file",
                "input": {"path": "foo.rs"}
            }),
        ));
        logger.log(ConversationEvent::new(
            event_types::RECOVERY,
            json!({"conversation_id": "c-1", "tool": "read_file", "strategy": "RETRY"}),
        ));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["seq"], 1);
        assert_eq!(lines[1]["seq"], 2);
        assert_eq!(lines[0]["type"], "tool_call");
        assert_eq!(lines[0]["conversation_id"], "c-1");
        assert_eq!(lines[0]["input"]["path"], "foo.rs");
        assert_eq!(lines[1]["strategy"], "RETRY");
        assert!(lines[1]["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_scalar_payload_goes_under_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("simple.jsonl");
        let logger = JsonlConversationLogger::new(&path).unwrap();

        logger.log(ConversationEvent::new(event_types::HALTED, json!("just a string")));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines[0]["type"], "halted");
        assert_eq!(lines[0]["data"], "just a string");
    }

    #[test]
    fn test_line_uses_given_timestamp() {
        let at = DateTime::parse_from_rfc3339("2026-01-05T10:00:00.120Z")
            .unwrap()
            .with_timezone(&Utc);
        let event = ConversationEvent::new(event_types::ROUND_STARTED, json!({"round": 4}));
        let line: Value =
            serde_json::from_str(&JsonlConversationLogger::line(&event, 7, at).unwrap()).unwrap();
        assert_eq!(
            line,
            json!({
                "seq": 7,
                "type": "round_started",
                "timestamp": "2026-01-05T10:00:00.120Z",
                "round": 4
            })
        );
    }

    #[test]
    fn test_reopening_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("append.jsonl");

        for round in 1..=2 {
            let logger = JsonlConversationLogger::new(&path).unwrap();
            logger.log(ConversationEvent::new(
                event_types::ROUND_STARTED,
                json!({ "round": round }),
            ));
        }

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["round"], 2);
    }

    #[test]
    fn test_unopenable_path_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        assert!(JsonlConversationLogger::new(blocker.join("log.jsonl")).is_none());
    }
}
