//! Output Rendering
//!
//! Renders plans, run results, rollbacks and the ledger as text or JSON.
//! Renderers return strings; commands decide where they go.

use std::fmt::Write as _;

use crate::application::{GenerateResult, Prepared, Recovery};
use crate::domain::entities::{Action, LatestState, RunRecord, Severity};
use crate::domain::services::StepKind;
use crate::domain::value_objects::RunId;

/// Output format for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for scripting
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Icons for output rendering
struct Icons {
    check: &'static str,
    cross: &'static str,
    write: &'static str,
    skip: &'static str,
    trash: &'static str,
    warn: &'static str,
}

impl Icons {
    fn unicode() -> Self {
        Self {
            check: "✓",
            cross: "✗",
            write: "→",
            skip: "○",
            trash: "🗑",
            warn: "⚠",
        }
    }

    fn ascii() -> Self {
        Self {
            check: "[OK]",
            cross: "[FAIL]",
            write: "->",
            skip: "[ ]",
            trash: "[DEL]",
            warn: "[!]",
        }
    }
}

/// Renders every command's result
pub trait Renderer {
    fn plan(&self, prepared: &Prepared) -> String;
    fn run(&self, result: &GenerateResult) -> String;
    fn recovery(&self, run_id: &RunId, recovery: &Recovery) -> String;
    fn ledger(&self, latest: &LatestState, rebuilt: bool) -> String;
}

/// Text renderer
pub struct TextRenderer {
    /// Whether to use unicode
    pub unicode: bool,
    /// Verbosity level
    pub verbose: u8,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            unicode: true,
            verbose: 0,
        }
    }
}

impl TextRenderer {
    fn icons(&self) -> Icons {
        if self.unicode {
            Icons::unicode()
        } else {
            Icons::ascii()
        }
    }

    fn section(out: &mut String, title: &str, lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        let _ = writeln!(out, "  {} ({}):", title, lines.len());
        for line in lines {
            let _ = writeln!(out, "    {}", line);
        }
    }

    fn record_line(&self, icon: &str, record: &RunRecord) -> String {
        let mut line = format!("{} {}", icon, record.key);
        if let Some(reason) = record.reason {
            let _ = write!(line, " ({})", reason);
        }
        for error in &record.errors {
            let _ = write!(line, "\n        {}: {}", error.kind, error.message);
        }
        line
    }
}

impl Renderer for TextRenderer {
    fn plan(&self, prepared: &Prepared) -> String {
        let icons = self.icons();
        let plan = &prepared.plan;
        let mut out = String::new();

        let _ = writeln!(
            out,
            "Plan: {} mockups, {} steps",
            prepared.scan.inventory.len(),
            plan.len()
        );
        let _ = writeln!(
            out,
            "  {} generate, {} update, {} remove, {} report-only",
            plan.count(StepKind::Generate),
            plan.count(StepKind::Update),
            plan.count(StepKind::Remove),
            plan.count(StepKind::ReportOnly)
        );

        if plan.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{} Nothing to do", icons.check);
            return out;
        }

        let _ = writeln!(out);
        for step in plan.steps() {
            let icon = match step.kind {
                StepKind::Generate | StepKind::Update => icons.write,
                StepKind::Remove => icons.trash,
                StepKind::ReportOnly if step.severity() >= Severity::Warning => icons.warn,
                StepKind::ReportOnly => icons.skip,
            };
            let mut line = format!("  {} {:<11} {}", icon, step.kind.as_str(), step.key);
            match step.reason {
                Some(reason) => {
                    let _ = write!(line, " ({})", reason);
                }
                None => {
                    let _ = write!(line, " ({})", step.decision);
                }
            }
            let _ = writeln!(out, "{}", line);
            if let Some(violation) = &step.violation {
                let _ = writeln!(out, "      {} {}", icons.cross, violation);
            }
            if self.verbose > 0 {
                for artifact in &step.artifacts {
                    let _ = writeln!(out, "      {}", artifact.recorded.path);
                }
            }
        }

        let warnings = prepared.warnings();
        if !warnings.is_empty() {
            let _ = writeln!(out);
            Self::section(&mut out, "Warnings", &warnings);
        }
        out
    }

    fn run(&self, result: &GenerateResult) -> String {
        let icons = self.icons();
        let log = &result.log;
        let mut out = String::new();

        for recovered in &result.recovered {
            let what = if recovered.rolled_back {
                "rolled back"
            } else {
                "finalized"
            };
            let _ = writeln!(
                out,
                "{} Recovered interrupted run {} ({})",
                icons.warn, recovered.run_id, what
            );
        }

        if result.rolled_back() {
            let _ = writeln!(out, "{} Generate Rolled Back", icons.cross);
        } else if result.is_success() && !result.has_changes() {
            let _ = writeln!(out, "{} Already Up-to-date", icons.check);
        } else if result.is_success() {
            let _ = writeln!(out, "{} Generate Complete", icons.check);
        } else {
            let _ = writeln!(out, "{} Generate Finished With Problems", icons.warn);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "  Run: {}", log.run_id);
        let _ = writeln!(out, "  Log: {}", result.log_path.display());
        if let Some(cause) = &log.rollback_cause {
            let _ = writeln!(out, "  Cause: {}: {}", cause.kind, cause.message);
        }
        let _ = writeln!(
            out,
            "  {} mockups, {} records",
            log.discovered.len(),
            log.records.len()
        );
        let _ = writeln!(out);

        let by_action = |action: Action, icon: &str| -> Vec<String> {
            log.records
                .iter()
                .filter(|r| r.action == action)
                .map(|r| self.record_line(icon, r))
                .collect()
        };

        Self::section(&mut out, "Generated", &by_action(Action::Generated, icons.write));
        Self::section(&mut out, "Updated", &by_action(Action::Updated, icons.write));
        Self::section(&mut out, "Removed", &by_action(Action::Removed, icons.trash));
        Self::section(&mut out, "Rolled back", &by_action(Action::RolledBack, icons.skip));
        Self::section(&mut out, "Failed", &by_action(Action::Failed, icons.cross));

        let skipped: Vec<String> = log
            .records
            .iter()
            .filter(|r| r.action == Action::Skipped)
            .filter(|r| self.verbose > 0 || r.is_problem())
            .map(|r| {
                let icon = if r.is_problem() { icons.warn } else { icons.skip };
                self.record_line(icon, r)
            })
            .collect();
        Self::section(&mut out, "Skipped", &skipped);

        if !log.warnings.is_empty() {
            let _ = writeln!(out);
            Self::section(&mut out, "Warnings", &log.warnings);
        }
        out
    }

    fn recovery(&self, run_id: &RunId, recovery: &Recovery) -> String {
        let icons = self.icons();
        let mut out = String::new();
        match recovery {
            Recovery::RolledBack(report) => {
                let _ = writeln!(out, "{} Rolled back run {}", icons.check, run_id);
                let _ = writeln!(out);
                let restored: Vec<String> = report
                    .restored
                    .iter()
                    .map(|p| format!("{} {}", icons.write, p))
                    .collect();
                let removed: Vec<String> = report
                    .removed
                    .iter()
                    .map(|p| format!("{} {}", icons.trash, p))
                    .collect();
                Self::section(&mut out, "Restored", &restored);
                Self::section(&mut out, "Removed", &removed);
                if report.touched() == 0 {
                    let _ = writeln!(out, "  No files needed restoring");
                }
            }
            Recovery::Finalized => {
                let _ = writeln!(
                    out,
                    "{} Run {} had committed; its leftover journal was removed",
                    icons.check, run_id
                );
            }
            Recovery::AlreadyFinalized => {
                let _ = writeln!(
                    out,
                    "{} Run {} is finalized; nothing to roll back",
                    icons.skip, run_id
                );
            }
            Recovery::Unknown => {
                let _ = writeln!(out, "{} Unknown run {}", icons.cross, run_id);
            }
        }
        out
    }

    fn ledger(&self, latest: &LatestState, rebuilt: bool) -> String {
        let icons = self.icons();
        let mut out = String::new();

        if rebuilt {
            let _ = writeln!(out, "{} Ledger rebuilt from run logs", icons.check);
        } else {
            let _ = writeln!(out, "Ledger");
        }
        match &latest.last_run {
            Some(run_id) => {
                let _ = writeln!(out, "  Last run: {}", run_id);
            }
            None => {
                let _ = writeln!(out, "  No runs recorded");
                return out;
            }
        }
        let _ = writeln!(out, "  {} keys", latest.len());
        let _ = writeln!(out);

        for (key, record) in &latest.records {
            let mut line = format!(
                "  {:<24} {:<12} {} files",
                key.to_string(),
                record.action.as_str(),
                record.artifacts.len()
            );
            if let Some(reason) = record.reason {
                let _ = write!(line, " ({})", reason);
            }
            let _ = writeln!(out, "{}", line.trim_end());
            if self.verbose > 0 {
                for artifact in &record.artifacts {
                    let _ = writeln!(
                        out,
                        "      {} {}",
                        artifact.path,
                        artifact.content_fingerprint.short()
                    );
                }
            }
        }
        out
    }
}

/// JSON renderer
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn plan(&self, prepared: &Prepared) -> String {
        let steps: Vec<serde_json::Value> = prepared
            .plan
            .steps()
            .iter()
            .map(|step| {
                serde_json::json!({
                    "key": step.key.to_string(),
                    "kind": step.kind.as_str(),
                    "decision": step.decision.as_str(),
                    "reason": step.reason.map(|r| r.as_str()),
                    "violation": step.violation,
                    "artifacts": step
                        .artifacts
                        .iter()
                        .map(|a| a.recorded.path.clone())
                        .collect::<Vec<_>>(),
                })
            })
            .collect();

        let json = serde_json::json!({
            "event": "plan",
            "mockups": prepared.scan.inventory.len(),
            "generate": prepared.plan.count(StepKind::Generate),
            "update": prepared.plan.count(StepKind::Update),
            "remove": prepared.plan.count(StepKind::Remove),
            "report_only": prepared.plan.count(StepKind::ReportOnly),
            "steps": steps,
            "warnings": prepared.warnings(),
        });
        serde_json::to_string_pretty(&json).unwrap_or_default()
    }

    fn run(&self, result: &GenerateResult) -> String {
        // One NDJSON line after the event stream
        let json = serde_json::json!({
            "event": "summary",
            "run_id": result.log.run_id.as_str(),
            "log": result.log_path.display().to_string(),
            "exit_code": result.exit_code(),
            "recovered": result
                .recovered
                .iter()
                .map(|r| serde_json::json!({
                    "run_id": r.run_id.as_str(),
                    "rolled_back": r.rolled_back,
                }))
                .collect::<Vec<_>>(),
        });
        json.to_string()
    }

    fn recovery(&self, run_id: &RunId, recovery: &Recovery) -> String {
        let json = match recovery {
            Recovery::RolledBack(report) => serde_json::json!({
                "event": "rollback",
                "run_id": run_id.as_str(),
                "status": "rolled-back",
                "restored": report.restored,
                "removed": report.removed,
            }),
            Recovery::Finalized => serde_json::json!({
                "event": "rollback",
                "run_id": run_id.as_str(),
                "status": "finalized",
            }),
            Recovery::AlreadyFinalized => serde_json::json!({
                "event": "rollback",
                "run_id": run_id.as_str(),
                "status": "already-finalized",
            }),
            Recovery::Unknown => serde_json::json!({
                "event": "rollback",
                "run_id": run_id.as_str(),
                "status": "unknown",
            }),
        };
        // One line: it follows the NDJSON rollback events on stdout.
        serde_json::to_string(&json).unwrap_or_default()
    }

    fn ledger(&self, latest: &LatestState, rebuilt: bool) -> String {
        let json = serde_json::json!({
            "event": "ledger",
            "rebuilt": rebuilt,
            "state": latest,
        });
        serde_json::to_string_pretty(&json).unwrap_or_default()
    }
}

/// Create a renderer based on format
pub fn create_renderer(format: OutputFormat, unicode: bool, verbose: u8) -> Box<dyn Renderer> {
    match format {
        OutputFormat::Text => Box::new(TextRenderer { unicode, verbose }),
        OutputFormat::Json => Box::new(JsonRenderer),
    }
}
