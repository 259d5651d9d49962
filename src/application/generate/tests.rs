//! Tests for the generate use case

use std::cell::Cell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use super::*;
use crate::application::journal::CommitJournal;
use crate::domain::entities::{Action, RunOutcome, SkipReason};
use crate::domain::entities::ArtifactKind;
use crate::domain::policies::{GenerationPolicy, SlugRule};
use crate::domain::ports::{
    FileSystem, FsError, FsResult, LedgerRepository, NoopEventSink, PolicyScopeConfirmation,
    RunEvent, RunEventSink,
};
use crate::domain::services::CompositionRules;
use crate::domain::value_objects::{Fingerprint, PathRules, RunId};
use crate::infrastructure::{
    FetchBindingGenerator, FsMockupScanner, HtmlMockupParser, JsonLedgerRepository, LocalFs,
    TsxEmitter,
};

struct Harness {
    dir: TempDir,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("mockups")).unwrap();
        Self { dir }
    }

    fn mockups(&self) -> PathBuf {
        self.dir.path().join("mockups")
    }

    fn out(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    fn state(&self) -> PathBuf {
        self.dir.path().join(".mocksmith")
    }

    fn write_mockup(&self, rel: &str, content: &str) {
        let path = self.mockups().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn collaborators(&self) -> Collaborators {
        Collaborators {
            source: Box::new(FsMockupScanner::new(
                self.mockups(),
                PathRules::empty(),
                CompositionRules::default(),
                vec!["mobile".to_string(), "dark".to_string()],
            )),
            parser: Box::new(HtmlMockupParser::new(self.mockups())),
            emitter: Box::new(TsxEmitter::new()),
            bindings: Box::new(FetchBindingGenerator::default()),
        }
    }

    fn ledger(&self) -> JsonLedgerRepository {
        JsonLedgerRepository::new(self.state())
    }

    fn options(&self, policy: GenerationPolicy) -> GenerateOptions {
        GenerateOptions::new(self.out(), self.state()).with_policy(policy)
    }

    fn run_with<FS: FileSystem>(&self, fs: FS, options: &GenerateOptions) -> RunResult {
        GenerateUseCase::new(self.ledger(), fs, self.collaborators()).execute(
            options,
            Arc::new(NoopEventSink),
            Arc::new(PolicyScopeConfirmation),
        )
    }

    fn run(&self, policy: GenerationPolicy) -> GenerateResult {
        self.run_with(LocalFs::new(), &self.options(policy)).unwrap()
    }

    /// Every file under the output root with its bytes
    fn snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        let mut files = BTreeMap::new();
        collect(&self.out(), &self.out(), &mut files);
        files
    }
}

type RunResult = crate::error::MocksmithResult<GenerateResult>;

fn collect(root: &Path, dir: &Path, files: &mut BTreeMap<String, Vec<u8>>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect(root, &path, files);
        } else {
            let rel = path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/");
            files.insert(rel, fs::read(&path).unwrap());
        }
    }
}

fn allow_update() -> GenerationPolicy {
    GenerationPolicy {
        allow_update: true,
        ..Default::default()
    }
}

fn only(selectors: &[&str]) -> GenerationPolicy {
    GenerationPolicy {
        only: selectors.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

fn action_of(result: &GenerateResult, key: &str) -> (Action, Option<SkipReason>) {
    let record = result
        .log
        .records
        .iter()
        .find(|r| r.key.to_string() == key)
        .unwrap_or_else(|| panic!("no record for {}", key));
    (record.action, record.reason)
}

enum Fault {
    /// Fail the Nth rename into the output tree
    Rename(usize),
    /// Fail the Nth write below the staging directory
    StagingWrite(usize),
    /// Raise the flag during the Nth rename, then let it through
    CancelOnRename(usize, Arc<AtomicBool>),
}

/// File system that injects one fault at an exact point
struct FailingFs {
    inner: LocalFs,
    fault: Fault,
    renames: Cell<usize>,
    staging_writes: Cell<usize>,
}

impl FailingFs {
    fn with(fault: Fault) -> Self {
        Self {
            inner: LocalFs::new(),
            fault,
            renames: Cell::new(0),
            staging_writes: Cell::new(0),
        }
    }

    fn failing_rename(n: usize) -> Self {
        Self::with(Fault::Rename(n))
    }
}

impl FileSystem for FailingFs {
    fn read(&self, path: &Path) -> FsResult<Vec<u8>> {
        self.inner.read(path)
    }

    fn write(&self, path: &Path, content: &[u8]) -> FsResult<()> {
        if path.components().any(|c| c.as_os_str() == "staging") {
            let n = self.staging_writes.get() + 1;
            self.staging_writes.set(n);
            if matches!(self.fault, Fault::StagingWrite(at) if at == n) {
                return Err(FsError::Other("disk full".to_string()));
            }
        }
        self.inner.write(path, content)
    }

    fn rename(&self, from: &Path, to: &Path) -> FsResult<()> {
        let n = self.renames.get() + 1;
        self.renames.set(n);
        match &self.fault {
            Fault::Rename(at) if *at == n => {
                return Err(FsError::Other("injected rename failure".to_string()));
            }
            Fault::CancelOnRename(at, flag) if *at == n => flag.store(true, Ordering::SeqCst),
            _ => {}
        }
        self.inner.rename(from, to)
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }

    fn remove(&self, path: &Path) -> FsResult<()> {
        self.inner.remove(path)
    }

    fn remove_dir(&self, path: &Path) -> FsResult<()> {
        self.inner.remove_dir(path)
    }

    fn remove_dir_all(&self, path: &Path) -> FsResult<()> {
        self.inner.remove_dir_all(path)
    }

    fn create_dir_all(&self, path: &Path) -> FsResult<()> {
        self.inner.create_dir_all(path)
    }

    fn list_dirs(&self, path: &Path) -> FsResult<Vec<PathBuf>> {
        self.inner.list_dirs(path)
    }

    fn hash(&self, path: &Path) -> FsResult<Fingerprint> {
        self.inner.hash(path)
    }
}

struct RecordingSink {
    events: Mutex<Vec<RunEvent>>,
}

impl RunEventSink for RecordingSink {
    fn on_event(&self, event: RunEvent) {
        self.events.lock().unwrap().push(event);
    }
}

// === First run ===

#[test]
fn first_run_generates_pages_and_routes() {
    let h = Harness::new();
    h.write_mockup("home.html", "<main><h1>Home</h1></main>");
    h.write_mockup("about.html", "<main><h1>About</h1></main>");

    let result = h.run(GenerationPolicy::default());

    assert_eq!(result.exit_code(), 0);
    assert_eq!(result.log.outcome, RunOutcome::Committed);
    assert_eq!(result.count(Action::Generated), 2);
    assert!(h.out().join("src/pages/home/HomePage.tsx").is_file());
    assert!(h.out().join("src/pages/about/AboutPage.tsx").is_file());

    let registry = fs::read_to_string(h.out().join("src/routes.generated.ts")).unwrap();
    assert!(registry.contains("// mocksmith:route about"));
    assert!(registry.contains("// mocksmith:route home"));

    assert!(result.log_path.is_file());
    assert!(result.log.mockup_tree_verified);
    assert!(!h.state().join("journal").join(result.log.run_id.as_str()).exists());
    assert!(!h.state().join("staging").exists());
    assert_eq!(h.ledger().load_latest().unwrap().len(), 2);
}

#[test]
fn second_run_is_idempotent() {
    let h = Harness::new();
    h.write_mockup("home.html", "<main><h1>Home</h1></main>");
    h.write_mockup("shop/cart.html", "<main><p>Cart</p></main>");
    h.write_mockup("shop/cart.css", "main { color: red; }");

    h.run(GenerationPolicy::default());
    let before = h.snapshot();

    let second = h.run(allow_update());

    assert_eq!(second.exit_code(), 0);
    assert!(!second.has_changes());
    assert_eq!(action_of(&second, "home"), (Action::Skipped, Some(SkipReason::UpToDate)));
    assert_eq!(action_of(&second, "shop/cart"), (Action::Skipped, Some(SkipReason::UpToDate)));
    assert_eq!(h.snapshot(), before);
}

// === Policy gating ===

#[test]
fn changed_mockup_needs_update_permission() {
    let h = Harness::new();
    h.write_mockup("home.html", "<main><h1>Home</h1></main>");
    h.run(GenerationPolicy::default());
    let before = h.snapshot();

    h.write_mockup("home.html", "<main><h1>Welcome</h1></main>");

    let gated = h.run(GenerationPolicy::default());
    assert_eq!(gated.exit_code(), 1);
    assert_eq!(
        action_of(&gated, "home"),
        (Action::Skipped, Some(SkipReason::UpdateNotPermitted))
    );
    assert_eq!(h.snapshot(), before);

    let allowed = h.run(allow_update());
    assert_eq!(allowed.exit_code(), 0);
    assert_eq!(action_of(&allowed, "home"), (Action::Updated, None));
    let page = fs::read_to_string(h.out().join("src/pages/home/HomePage.tsx")).unwrap();
    assert!(page.contains("Welcome"));
}

#[test]
fn only_filter_scopes_the_run() {
    let h = Harness::new();
    h.write_mockup("b.html", "<main>B</main>");
    h.run(GenerationPolicy::default());
    let before = h.snapshot();

    h.write_mockup("a.html", "<main>A</main>");
    let result = h.run(only(&["b"]));

    assert_eq!(result.exit_code(), 0);
    assert_eq!(h.snapshot(), before);
    assert_eq!(action_of(&result, "a"), (Action::Skipped, Some(SkipReason::OutOfScope)));
    assert_eq!(action_of(&result, "b"), (Action::Skipped, Some(SkipReason::OutOfScope)));
}

#[test]
fn variant_without_base_generates_nothing() {
    let h = Harness::new();
    h.write_mockup("checkout-mobile.html", "<main>Pay</main>");

    let result = h.run(GenerationPolicy::default());

    assert_eq!(result.exit_code(), 1);
    assert_eq!(
        action_of(&result, "checkout@mobile"),
        (Action::Skipped, Some(SkipReason::VariantWithoutBase))
    );
    assert!(h.snapshot().is_empty());
}

#[test]
fn variant_with_base_gets_its_own_component() {
    let h = Harness::new();
    h.write_mockup("checkout.html", "<main>Pay</main>");
    h.write_mockup("checkout-mobile.html", "<main>Pay here</main>");

    let result = h.run(GenerationPolicy::default());

    assert_eq!(result.exit_code(), 0);
    assert_eq!(action_of(&result, "checkout@mobile"), (Action::Generated, None));
    assert!(h
        .out()
        .join("src/components/checkout/CheckoutMobile.tsx")
        .is_file());
}

// === Rollback ===

#[test]
fn commit_failure_restores_output_tree_exactly() {
    let h = Harness::new();
    h.write_mockup("a.html", "<main>A</main>");
    h.run(GenerationPolicy::default());
    let before = h.snapshot();

    h.write_mockup("a.html", "<main>A2</main>");
    h.write_mockup("b.html", "<main>B</main>");
    h.write_mockup("c.html", "<main>C</main>");

    // b's page and route commit, then c's page fails.
    let result = h
        .run_with(FailingFs::failing_rename(3), &h.options(allow_update()))
        .unwrap();

    assert_eq!(result.exit_code(), 3);
    assert!(result.rolled_back());
    assert_eq!(result.log.rollback_cause.as_ref().unwrap().kind, "commit-error");
    assert_eq!(action_of(&result, "b"), (Action::RolledBack, None));
    assert_eq!(action_of(&result, "c").0, Action::Failed);
    assert_eq!(action_of(&result, "a"), (Action::Skipped, Some(SkipReason::Aborted)));
    assert_eq!(h.snapshot(), before);
    assert!(!h.state().join("journal").join(result.log.run_id.as_str()).exists());

    // The ledger still describes the restored tree, so a clean run succeeds.
    let retry = h.run(allow_update());
    assert_eq!(retry.exit_code(), 0);
    assert_eq!(retry.count(Action::Generated), 2);
    assert_eq!(retry.count(Action::Updated), 1);
}

#[test]
fn cancelled_run_writes_nothing() {
    let h = Harness::new();
    h.write_mockup("a.html", "<main>A</main>");

    let options = h
        .options(GenerationPolicy::default())
        .with_cancel(Arc::new(AtomicBool::new(true)));
    let result = h.run_with(LocalFs::new(), &options).unwrap();

    assert_eq!(result.exit_code(), 3);
    assert_eq!(result.log.rollback_cause.as_ref().unwrap().kind, "cancelled");
    assert_eq!(action_of(&result, "a"), (Action::Skipped, Some(SkipReason::Aborted)));
    assert!(h.snapshot().is_empty());
}

#[test]
fn cancel_during_only_step_rolls_it_back() {
    let h = Harness::new();
    h.write_mockup("home.html", "<main>Home</main>");

    let cancel = Arc::new(AtomicBool::new(false));
    let options = h
        .options(GenerationPolicy::default())
        .with_cancel(cancel.clone());
    let fs = FailingFs::with(Fault::CancelOnRename(1, cancel.clone()));
    let result = h.run_with(fs, &options).unwrap();

    assert!(cancel.load(Ordering::SeqCst));
    assert_eq!(result.exit_code(), 3);
    assert_eq!(result.log.outcome, RunOutcome::RolledBack);
    assert_eq!(result.log.rollback_cause.as_ref().unwrap().kind, "cancelled");
    assert_eq!(action_of(&result, "home"), (Action::RolledBack, None));
    assert!(h.snapshot().is_empty());
}

#[test]
fn cancel_between_steps_restores_output_tree_exactly() {
    let h = Harness::new();
    h.write_mockup("a.html", "<main>A</main>");
    h.run(GenerationPolicy::default());
    let before = h.snapshot();

    h.write_mockup("a.html", "<main>A2</main>");
    h.write_mockup("b.html", "<main>B</main>");
    h.write_mockup("c.html", "<main>C</main>");

    // Generates run first: b commits, then the loop sees the flag before c.
    let cancel = Arc::new(AtomicBool::new(false));
    let options = h.options(allow_update()).with_cancel(cancel.clone());
    let fs = FailingFs::with(Fault::CancelOnRename(1, cancel));
    let result = h.run_with(fs, &options).unwrap();

    assert_eq!(result.exit_code(), 3);
    assert_eq!(result.log.rollback_cause.as_ref().unwrap().kind, "cancelled");
    assert_eq!(action_of(&result, "b"), (Action::RolledBack, None));
    assert_eq!(action_of(&result, "c"), (Action::Skipped, Some(SkipReason::Aborted)));
    assert_eq!(action_of(&result, "a"), (Action::Skipped, Some(SkipReason::Aborted)));
    assert_eq!(h.snapshot(), before);
    assert!(!h.state().join("journal").join(result.log.run_id.as_str()).exists());
}

#[test]
fn elapsed_timeout_rolls_back_before_any_write() {
    let h = Harness::new();
    h.write_mockup("a.html", "<main>A</main>");
    h.run(GenerationPolicy::default());
    let before = h.snapshot();
    h.write_mockup("a.html", "<main>A2</main>");

    let options = h
        .options(allow_update())
        .with_timeout(Some(std::time::Duration::ZERO));
    let result = h.run_with(LocalFs::new(), &options).unwrap();

    assert_eq!(result.exit_code(), 3);
    assert_eq!(result.log.rollback_cause.as_ref().unwrap().kind, "cancelled");
    assert_eq!(action_of(&result, "a"), (Action::Skipped, Some(SkipReason::Aborted)));
    assert_eq!(h.snapshot(), before);
}

#[test]
fn staging_failure_in_step_leaves_no_partial_write() {
    let h = Harness::new();
    h.write_mockup("home.html", "<main>Home</main>");
    h.run(GenerationPolicy::default());
    let before = h.snapshot();
    assert_eq!(before.len(), 2);

    // Page-only now: the route entry has to be retired from the registry,
    // and staging that retirement fails.
    h.write_mockup("home.html", "<main>Home v2</main>");
    let mut policy = allow_update();
    policy.rules.insert(
        "home".to_string(),
        SlugRule {
            kinds: vec![ArtifactKind::Page],
            ..Default::default()
        },
    );
    let fs = FailingFs::with(Fault::StagingWrite(2));
    let result = h.run_with(fs, &h.options(policy.clone())).unwrap();

    assert_eq!(result.log.outcome, RunOutcome::Committed);
    assert_eq!(result.exit_code(), 1);
    let record = result
        .log
        .records
        .iter()
        .find(|r| r.key.to_string() == "home")
        .unwrap();
    assert_eq!(record.action, Action::Failed);
    assert_eq!(record.errors[0].kind, "staging-error");
    assert_eq!(h.snapshot(), before);

    // The ledger still matches the tree, so the page updates without a prompt.
    let retry = h.run(policy);
    assert_eq!(retry.exit_code(), 0);
    assert_eq!(action_of(&retry, "home"), (Action::Updated, None));
    let registry = fs::read_to_string(h.out().join("src/routes.generated.ts")).unwrap();
    assert!(!registry.contains("mocksmith:route home"));
}

#[test]
fn interrupted_journal_is_rolled_back_on_next_run() {
    let h = Harness::new();
    h.write_mockup("a.html", "<main>A</main>");
    fs::create_dir_all(h.out()).unwrap();

    let crashed: RunId = "20200101T000000000Z".parse().unwrap();
    let local = LocalFs::new();
    let mut journal = CommitJournal::new(&local, &h.state(), crashed.clone(), &h.out());
    journal.record_prior("stray.tsx").unwrap();
    fs::write(h.out().join("stray.tsx"), "half-written").unwrap();

    let result = h.run(GenerationPolicy::default());

    assert_eq!(
        result.recovered,
        vec![RecoveredRun {
            run_id: crashed,
            rolled_back: true
        }]
    );
    assert!(!h.out().join("stray.tsx").exists());
    assert_eq!(result.exit_code(), 0);
}

// === Manual edits and orphans ===

#[test]
fn hand_edited_output_is_not_overwritten() {
    let h = Harness::new();
    h.write_mockup("home.html", "<main>Home</main>");
    h.run(GenerationPolicy::default());

    let page = h.out().join("src/pages/home/HomePage.tsx");
    fs::write(&page, "// mine\n").unwrap();
    h.write_mockup("home.html", "<main>Home v2</main>");

    let result = h.run(allow_update());

    assert_eq!(result.exit_code(), 1);
    assert_eq!(action_of(&result, "home"), (Action::Skipped, Some(SkipReason::ManualEdit)));
    assert_eq!(fs::read_to_string(&page).unwrap(), "// mine\n");
}

#[test]
fn orphans_are_reported_unless_removal_is_enabled() {
    let h = Harness::new();
    h.write_mockup("old.html", "<main>Old</main>");
    h.write_mockup("home.html", "<main>Home</main>");
    h.run(GenerationPolicy::default());
    fs::remove_file(h.mockups().join("old.html")).unwrap();

    let reported = h.run(GenerationPolicy::default());
    assert_eq!(reported.exit_code(), 1);
    assert_eq!(action_of(&reported, "old"), (Action::Skipped, Some(SkipReason::Orphaned)));
    assert!(h.out().join("src/pages/old/OldPage.tsx").exists());

    let removed = h.run(GenerationPolicy {
        allow_orphan_removal: true,
        ..Default::default()
    });
    assert_eq!(removed.exit_code(), 0);
    assert_eq!(action_of(&removed, "old"), (Action::Removed, None));
    assert!(!h.out().join("src/pages/old/OldPage.tsx").exists());
    let registry = fs::read_to_string(h.out().join("src/routes.generated.ts")).unwrap();
    assert!(!registry.contains("mocksmith:route old"));
    assert!(registry.contains("mocksmith:route home"));
}

#[test]
fn untracked_file_at_target_is_a_staging_error() {
    let h = Harness::new();
    h.write_mockup("home.html", "<main>Home</main>");
    h.write_mockup("about.html", "<main>About</main>");
    fs::create_dir_all(h.out().join("src/pages/home")).unwrap();
    fs::write(h.out().join("src/pages/home/HomePage.tsx"), "handwritten").unwrap();

    let result = h.run(GenerationPolicy::default());

    assert_eq!(result.exit_code(), 1);
    assert_eq!(action_of(&result, "home").0, Action::Failed);
    assert_eq!(action_of(&result, "about"), (Action::Generated, None));
    assert_eq!(
        fs::read_to_string(h.out().join("src/pages/home/HomePage.tsx")).unwrap(),
        "handwritten"
    );
}

#[test]
fn parse_error_is_isolated_to_its_slug() {
    let h = Harness::new();
    h.write_mockup("good.html", "<main>Good</main>");
    h.write_mockup("bad.html", "<main>Bad</main>");
    h.write_mockup("bad.json", "{ not json");

    let result = h.run(GenerationPolicy::default());

    assert_eq!(result.exit_code(), 1);
    let bad = result.log.records.iter().find(|r| r.key.to_string() == "bad").unwrap();
    assert_eq!(bad.action, Action::Failed);
    assert_eq!(bad.errors[0].kind, "parse-error");
    assert_eq!(action_of(&result, "good"), (Action::Generated, None));
}

// === Determinism and events ===

#[test]
fn identical_trees_produce_identical_output() {
    let a = Harness::new();
    let b = Harness::new();
    for i in 0..50 {
        let markup =
            format!("<main><h1>Page {i}</h1><section data-component=\"hero\">Hi</section></main>");
        a.write_mockup(&format!("p{i:02}.html"), &markup);
        b.write_mockup(&format!("p{i:02}.html"), &markup);
    }

    let ra = a.run(GenerationPolicy::default());
    let rb = b.run(GenerationPolicy::default());

    assert_eq!(ra.count(Action::Generated), 50);
    assert_eq!(a.snapshot(), b.snapshot());
    let keys = |r: &GenerateResult| {
        r.log
            .records
            .iter()
            .map(|r| r.key.to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(keys(&ra), keys(&rb));
}

#[test]
fn events_bracket_the_run() {
    let h = Harness::new();
    h.write_mockup("home.html", "<main>Home</main>");
    let sink = Arc::new(RecordingSink {
        events: Mutex::new(Vec::new()),
    });

    GenerateUseCase::new(h.ledger(), LocalFs::new(), h.collaborators())
        .execute(
            &h.options(GenerationPolicy::default()),
            sink.clone(),
            Arc::new(PolicyScopeConfirmation),
        )
        .unwrap();

    let events = sink.events.lock().unwrap();
    assert!(matches!(events.first(), Some(RunEvent::Started { .. })));
    assert!(matches!(
        events.last(),
        Some(RunEvent::Completed {
            exit_code: 0,
            generated: 1,
            ..
        })
    ));
    assert!(events.iter().any(|e| matches!(
        e,
        RunEvent::FileCommitted { path, .. } if path == "src/pages/home/HomePage.tsx"
    )));
}
