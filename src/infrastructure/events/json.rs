//! JSON Event Sink
//!
//! Writes run events as NDJSON for CI/automation consumption.

use std::io::{self, Write};
use std::sync::Mutex;

use crate::domain::entities::RunOutcome;
use crate::domain::ports::{RunEvent, RunEventSink};

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    writer: Mutex<Box<dyn Write + Send>>,
    command: &'static str,
}

impl JsonEventSink {
    pub fn stdout() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stdout())),
            command: "generate",
        }
    }

    /// Sink writing to a custom writer (for testing)
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            command: "generate",
        }
    }

    /// Tag events with another command name
    pub fn for_command(mut self, command: &'static str) -> Self {
        self.command = command;
        self
    }

    fn write_event(&self, event: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }
}

impl RunEventSink for JsonEventSink {
    fn on_event(&self, event: RunEvent) {
        let json = match event {
            RunEvent::Started { run_id } => serde_json::json!({
                "event": "start",
                "command": self.command,
                "run_id": run_id.as_str(),
            }),

            RunEvent::Recovered {
                run_id,
                rolled_back,
            } => serde_json::json!({
                "event": "recovered",
                "command": self.command,
                "run_id": run_id.as_str(),
                "rolled_back": rolled_back,
            }),

            RunEvent::Scanned {
                mockup_count,
                output_count,
            } => serde_json::json!({
                "event": "scanned",
                "command": self.command,
                "mockups": mockup_count,
                "outputs": output_count,
            }),

            RunEvent::Planned {
                generate,
                update,
                remove,
                report_only,
            } => serde_json::json!({
                "event": "planned",
                "command": self.command,
                "generate": generate,
                "update": update,
                "remove": remove,
                "report_only": report_only,
            }),

            RunEvent::StepStarted { index, key, kind } => serde_json::json!({
                "event": "item_start",
                "command": self.command,
                "index": index,
                "slug": key.to_string(),
                "step": kind.as_str(),
            }),

            RunEvent::FileCommitted {
                index,
                key,
                kind,
                path,
            } => serde_json::json!({
                "event": "item_written",
                "command": self.command,
                "index": index,
                "slug": key.to_string(),
                "kind": kind.as_str(),
                "path": path,
            }),

            RunEvent::StepFinished {
                index,
                key,
                action,
                reason,
            } => serde_json::json!({
                "event": "item_done",
                "command": self.command,
                "index": index,
                "slug": key.to_string(),
                "action": action.as_str(),
                "reason": reason.map(|r| r.as_str()),
            }),

            RunEvent::StepFailed { index, key, error } => serde_json::json!({
                "event": "item_error",
                "command": self.command,
                "index": index,
                "slug": key.to_string(),
                "error": error,
            }),

            RunEvent::RollbackStarted { run_id, entries } => serde_json::json!({
                "event": "rollback_start",
                "command": self.command,
                "run_id": run_id.as_str(),
                "entries": entries,
            }),

            RunEvent::RolledBack { run_id, restored } => serde_json::json!({
                "event": "rolled_back",
                "command": self.command,
                "run_id": run_id.as_str(),
                "restored": restored,
            }),

            RunEvent::Completed {
                run_id,
                outcome,
                exit_code,
                generated,
                updated,
                removed,
                skipped,
                failed,
            } => {
                let status = match (outcome, failed) {
                    (RunOutcome::RolledBack, _) => "rolled-back",
                    (RunOutcome::Committed, 0) if exit_code == 0 => "success",
                    _ => "partial",
                };
                serde_json::json!({
                    "event": "complete",
                    "command": self.command,
                    "run_id": run_id.as_str(),
                    "status": status,
                    "exit_code": exit_code,
                    "generated": generated,
                    "updated": updated,
                    "removed": removed,
                    "skipped": skipped,
                    "failed": failed,
                })
            }
        };

        self.write_event(json);
    }
}
