//! JSON Ledger Repository
//!
//! Persists run logs at `<state_dir>/runs/agent-run-<id>.json` and the
//! latest-state index at `<state_dir>/latest.json`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::domain::entities::{LatestState, RunLog};
use crate::domain::ports::{LedgerError, LedgerRepository, LedgerResult};
use crate::domain::value_objects::RunId;

pub const RUNS_DIR: &str = "runs";
pub const LATEST_FILE: &str = "latest.json";

pub struct JsonLedgerRepository {
    state_dir: PathBuf,
}

impl JsonLedgerRepository {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
        }
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn runs_dir(&self) -> PathBuf {
        self.state_dir.join(RUNS_DIR)
    }

    pub fn latest_path(&self) -> PathBuf {
        self.state_dir.join(LATEST_FILE)
    }

    pub fn run_path(&self, id: &RunId) -> PathBuf {
        self.runs_dir().join(id.log_file_name())
    }
}

impl LedgerRepository for JsonLedgerRepository {
    fn append_run(&self, log: &RunLog) -> LedgerResult<PathBuf> {
        let path = self.run_path(&log.run_id);
        let temp = write_temp(&path, log)?;
        temp.persist_noclobber(&path).map_err(|e| {
            if e.error.kind() == std::io::ErrorKind::AlreadyExists {
                LedgerError::AlreadyRecorded(log.run_id.clone())
            } else {
                LedgerError::Io(e.error)
            }
        })?;
        Ok(path)
    }

    fn load_run(&self, id: &RunId) -> LedgerResult<Option<RunLog>> {
        read_json(&self.run_path(id))
    }

    fn list_runs(&self) -> LedgerResult<Vec<RunId>> {
        let dir = self.runs_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if let Some(id) = entry
                .file_name()
                .to_str()
                .and_then(RunId::from_log_file_name)
            {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn load_latest(&self) -> LedgerResult<LatestState> {
        Ok(read_json(&self.latest_path())?.unwrap_or_default())
    }

    fn save_latest(&self, state: &LatestState) -> LedgerResult<()> {
        let path = self.latest_path();
        let temp = write_temp(&path, state)?;
        temp.persist(&path).map_err(|e| LedgerError::Io(e.error))?;
        Ok(())
    }

    fn run_exists(&self, id: &RunId) -> bool {
        self.run_path(id).is_file()
    }
}

fn write_temp<T: Serialize>(path: &Path, value: &T) -> LedgerResult<NamedTempFile> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;
    let json = serde_json::to_string_pretty(value).map_err(|e| LedgerError::InvalidFormat {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(json.as_bytes())?;
    temp.write_all(b"\n")?;
    temp.as_file().sync_all()?;
    Ok(temp)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> LedgerResult<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(LedgerError::Io(e)),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| LedgerError::InvalidFormat {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{
        Action, Decision, RunOptionsRecord, RunOutcome, RunRecord, LEDGER_VERSION,
    };
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn log(second: u32, action: Action) -> RunLog {
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, second).unwrap();
        RunLog {
            version: LEDGER_VERSION,
            run_id: RunId::from_time(at),
            started_at: at,
            finished_at: at,
            outcome: RunOutcome::Committed,
            rollback_cause: None,
            options: RunOptionsRecord::default(),
            discovered: Vec::new(),
            records: vec![RunRecord {
                key: "home".parse().unwrap(),
                decision: Decision::New,
                action,
                reason: None,
                started_at: at,
                finished_at: at,
                mockup_fingerprint: None,
                artifacts: Vec::new(),
                errors: Vec::new(),
            }],
            mockup_tree_verified: true,
            warnings: Vec::new(),
            exit_code: 0,
        }
    }

    #[test]
    fn load_missing_latest_returns_empty() {
        let dir = tempdir().unwrap();
        let repo = JsonLedgerRepository::new(dir.path());
        assert!(repo.load_latest().unwrap().is_empty());
        assert!(repo.list_runs().unwrap().is_empty());
    }

    #[test]
    fn append_and_load_run() {
        let dir = tempdir().unwrap();
        let repo = JsonLedgerRepository::new(dir.path());
        let log = log(1, Action::Generated);

        let path = repo.append_run(&log).unwrap();
        assert!(path.ends_with("runs/agent-run-20261016T120001000Z.json"));
        assert!(repo.run_exists(&log.run_id));
        assert_eq!(repo.load_run(&log.run_id).unwrap(), Some(log));
    }

    #[test]
    fn append_is_append_only() {
        let dir = tempdir().unwrap();
        let repo = JsonLedgerRepository::new(dir.path());
        let log = log(1, Action::Generated);

        repo.append_run(&log).unwrap();
        let err = repo.append_run(&log).unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyRecorded(_)));
    }

    #[test]
    fn list_runs_is_sorted_and_ignores_other_files() {
        let dir = tempdir().unwrap();
        let repo = JsonLedgerRepository::new(dir.path());
        repo.append_run(&log(3, Action::Generated)).unwrap();
        repo.append_run(&log(1, Action::Generated)).unwrap();
        fs::write(repo.runs_dir().join("notes.txt"), "x").unwrap();

        let ids: Vec<_> = repo
            .list_runs()
            .unwrap()
            .into_iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(ids, vec!["20261016T120001000Z", "20261016T120003000Z"]);
    }

    #[test]
    fn rebuild_latest_replays_runs() {
        let dir = tempdir().unwrap();
        let repo = JsonLedgerRepository::new(dir.path());
        repo.append_run(&log(1, Action::Generated)).unwrap();
        repo.append_run(&log(2, Action::Updated)).unwrap();

        let state = repo.rebuild_latest().unwrap();
        assert_eq!(
            state.prior(&"home".parse().unwrap()).unwrap().action,
            Action::Updated
        );
        assert_eq!(repo.load_latest().unwrap(), state);
    }

    #[test]
    fn corrupted_latest_is_an_error() {
        let dir = tempdir().unwrap();
        let repo = JsonLedgerRepository::new(dir.path());
        fs::write(repo.latest_path(), "{ not json").unwrap();

        let err = repo.load_latest().unwrap_err();
        assert!(matches!(err, LedgerError::InvalidFormat { .. }));
        assert!(err.to_string().contains("latest.json"));
    }
}
