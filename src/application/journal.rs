//! Commit journal
//!
//! Write-ahead record of every output path a run touches. Before a staged
//! file is moved into place (or an orphan removed), the target's prior state
//! is saved under `<state_dir>/journal/<run-id>/`: a byte-for-byte backup if
//! the file existed, or a marker that it did not. The journal is deleted once
//! the run log is written, so a journal that survives a crash means the run
//! never committed.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::ports::{FileSystem, FsError};
use crate::domain::value_objects::{Fingerprint, RunId};
use crate::error::{MocksmithError, MocksmithResult};

pub const JOURNAL_DIR: &str = "journal";
const JOURNAL_FILE: &str = "journal.json";
const BACKUP_DIR: &str = "backups";

/// What a path looked like before the run touched it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum PriorState {
    Absent,
    Existed {
        /// Backup file name inside the journal's backup directory
        backup: String,
        fingerprint: Fingerprint,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub seq: usize,
    /// Path relative to the output root
    pub path: String,
    pub prior: PriorState,
    /// Directories created for this path, outermost first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub created_dirs: Vec<String>,
}

/// On-disk journal document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalDocument {
    pub run_id: RunId,
    pub output_root: PathBuf,
    pub entries: Vec<JournalEntry>,
}

/// Journal for one run
///
/// Nothing is written to disk until the first entry is recorded.
pub struct CommitJournal<'a> {
    fs: &'a dyn FileSystem,
    dir: PathBuf,
    doc: JournalDocument,
}

impl<'a> CommitJournal<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        state_dir: &Path,
        run_id: RunId,
        output_root: &Path,
    ) -> Self {
        Self {
            fs,
            dir: journal_dir(state_dir, &run_id),
            doc: JournalDocument {
                run_id,
                output_root: output_root.to_path_buf(),
                entries: Vec::new(),
            },
        }
    }

    pub fn run_id(&self) -> &RunId {
        &self.doc.run_id
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.doc.entries
    }

    pub fn is_empty(&self) -> bool {
        self.doc.entries.is_empty()
    }

    /// Whether a path already has its prior state recorded in this run
    pub fn covers(&self, rel_path: &str) -> bool {
        self.doc.entries.iter().any(|e| e.path == rel_path)
    }

    /// Record the prior state of `rel_path` before it is changed.
    ///
    /// The first record for a path wins: it is the pre-run state. The
    /// journal file is persisted before this returns.
    pub fn record_prior(&mut self, rel_path: &str) -> MocksmithResult<()> {
        if self.covers(rel_path) {
            return Ok(());
        }

        let target = self.doc.output_root.join(rel_path);
        let seq = self.doc.entries.len();

        let prior = match self.fs.read(&target) {
            Ok(bytes) => {
                let backup = format!("{:04}.bak", seq);
                self.fs
                    .write(&self.dir.join(BACKUP_DIR).join(&backup), &bytes)
                    .map_err(|e| self.journal_error(rel_path, e))?;
                PriorState::Existed {
                    backup,
                    fingerprint: Fingerprint::from_bytes(&bytes),
                }
            }
            Err(e) if e.is_not_found() => PriorState::Absent,
            Err(e) => return Err(self.journal_error(rel_path, e)),
        };

        let created_dirs = self.missing_dirs(rel_path);

        self.doc.entries.push(JournalEntry {
            seq,
            path: rel_path.to_string(),
            prior,
            created_dirs,
        });
        self.persist()
    }

    /// Drop the journal after the run log is durable.
    pub fn finalize(self) -> MocksmithResult<()> {
        remove_journal(self.fs, &self.dir)
    }

    fn missing_dirs(&self, rel_path: &str) -> Vec<String> {
        let mut dirs = Vec::new();
        let mut current = String::new();
        let mut segments: Vec<&str> = rel_path.split('/').collect();
        segments.pop();
        for segment in segments {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(segment);
            if !self.fs.exists(&self.doc.output_root.join(&current)) {
                dirs.push(current.clone());
            }
        }
        dirs
    }

    fn persist(&self) -> MocksmithResult<()> {
        let json = serde_json::to_vec_pretty(&self.doc)
            .map_err(|e| MocksmithError::Ledger(format!("cannot encode journal: {}", e)))?;
        self.fs
            .write(&self.dir.join(JOURNAL_FILE), &json)
            .map_err(|e| self.journal_error(JOURNAL_FILE, e))
    }

    fn journal_error(&self, rel_path: &str, err: FsError) -> MocksmithError {
        MocksmithError::Commit {
            slug: String::new(),
            path: PathBuf::from(rel_path),
            message: format!("cannot journal prior state: {}", err),
        }
    }
}

/// `<state_dir>/journal/<run-id>`
pub fn journal_dir(state_dir: &Path, run_id: &RunId) -> PathBuf {
    state_dir.join(JOURNAL_DIR).join(run_id.as_str())
}

/// Backup file path for an entry
pub fn backup_path(state_dir: &Path, run_id: &RunId, backup: &str) -> PathBuf {
    journal_dir(state_dir, run_id).join(BACKUP_DIR).join(backup)
}

/// Load a run's journal, if one exists.
pub fn load_journal(
    fs: &dyn FileSystem,
    state_dir: &Path,
    run_id: &RunId,
) -> MocksmithResult<Option<JournalDocument>> {
    let path = journal_dir(state_dir, run_id).join(JOURNAL_FILE);
    match fs.read(&path) {
        Ok(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            MocksmithError::Ledger(format!("corrupted journal {}: {}", path.display(), e))
        }),
        Err(e) if e.is_not_found() => {
            // A directory without a journal file never recorded an entry.
            let dir = journal_dir(state_dir, run_id);
            if fs.is_dir(&dir) {
                remove_journal(fs, &dir)?;
            }
            Ok(None)
        }
        Err(e) => Err(MocksmithError::Ledger(format!(
            "cannot read journal {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Run ids with a journal directory left behind.
pub fn pending_journals(fs: &dyn FileSystem, state_dir: &Path) -> MocksmithResult<Vec<RunId>> {
    let root = state_dir.join(JOURNAL_DIR);
    let dirs = match fs.list_dirs(&root) {
        Ok(dirs) => dirs,
        Err(e) if e.is_not_found() => return Ok(Vec::new()),
        Err(e) => {
            return Err(MocksmithError::Ledger(format!(
                "cannot list journals in {}: {}",
                root.display(),
                e
            )))
        }
    };

    let mut ids: Vec<RunId> = dirs
        .iter()
        .filter_map(|dir| dir.file_name()?.to_str()?.parse().ok())
        .collect();
    ids.sort();
    Ok(ids)
}

pub(crate) fn remove_journal(fs: &dyn FileSystem, dir: &Path) -> MocksmithResult<()> {
    match fs.remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.is_not_found() => Ok(()),
        Err(e) => Err(MocksmithError::Ledger(format!(
            "cannot remove journal {}: {}",
            dir.display(),
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::fs::LocalFs;
    use std::fs;
    use tempfile::tempdir;

    fn run_id() -> RunId {
        "20261016T101530000Z".parse().unwrap()
    }

    #[test]
    fn nothing_is_written_before_first_entry() {
        let dir = tempdir().unwrap();
        let state = dir.path().join(".mocksmith");
        let local = LocalFs::new();
        let journal = CommitJournal::new(&local, &state, run_id(), dir.path());
        assert!(journal.is_empty());
        assert!(!state.join(JOURNAL_DIR).exists());
        assert!(pending_journals(&local, &state).unwrap().is_empty());
    }

    #[test]
    fn records_backup_and_absence() {
        let dir = tempdir().unwrap();
        let state = dir.path().join(".mocksmith");
        let out = dir.path().join("out");
        fs::create_dir_all(out.join("src")).unwrap();
        fs::write(out.join("src/A.tsx"), "old").unwrap();

        let local = LocalFs::new();
        let mut journal = CommitJournal::new(&local, &state, run_id(), &out);
        journal.record_prior("src/A.tsx").unwrap();
        journal.record_prior("src/pages/b/B.tsx").unwrap();
        journal.record_prior("src/A.tsx").unwrap();

        assert_eq!(journal.entries().len(), 2);
        match &journal.entries()[0].prior {
            PriorState::Existed { backup, fingerprint } => {
                let saved = fs::read(backup_path(&state, &run_id(), backup)).unwrap();
                assert_eq!(saved, b"old");
                assert_eq!(fingerprint, &Fingerprint::from_content("old"));
            }
            other => panic!("unexpected prior state {:?}", other),
        }
        assert_eq!(journal.entries()[1].prior, PriorState::Absent);
        assert_eq!(
            journal.entries()[1].created_dirs,
            vec!["src/pages", "src/pages/b"]
        );

        let loaded = load_journal(&local, &state, &run_id()).unwrap().unwrap();
        assert_eq!(loaded.entries, journal.entries());
        assert_eq!(pending_journals(&local, &state).unwrap(), vec![run_id()]);
    }

    #[test]
    fn finalize_removes_journal() {
        let dir = tempdir().unwrap();
        let state = dir.path().join(".mocksmith");
        let local = LocalFs::new();
        let mut journal = CommitJournal::new(&local, &state, run_id(), dir.path());
        journal.record_prior("a.tsx").unwrap();
        journal.finalize().unwrap();

        assert!(pending_journals(&local, &state).unwrap().is_empty());
        assert!(load_journal(&local, &state, &run_id()).unwrap().is_none());
    }

    #[test]
    fn pending_journals_ignores_foreign_entries() {
        let dir = tempdir().unwrap();
        let state = dir.path().join(".mocksmith");
        let root = state.join(JOURNAL_DIR);
        fs::create_dir_all(root.join(run_id().as_str())).unwrap();
        fs::create_dir_all(root.join("20200101T000000000Z")).unwrap();
        fs::create_dir_all(root.join("not-a-run")).unwrap();
        fs::write(root.join("20210101T000000000Z"), "file").unwrap();

        let older: RunId = "20200101T000000000Z".parse().unwrap();
        assert_eq!(
            pending_journals(&LocalFs::new(), &state).unwrap(),
            vec![older, run_id()]
        );
    }

    #[test]
    fn corrupted_journal_is_an_error() {
        let dir = tempdir().unwrap();
        let state = dir.path().join(".mocksmith");
        let jdir = journal_dir(&state, &run_id());
        fs::create_dir_all(&jdir).unwrap();
        fs::write(jdir.join(JOURNAL_FILE), "{").unwrap();
        assert!(load_journal(&LocalFs::new(), &state, &run_id()).is_err());
    }
}
