//! Test environment builder for isolated mocksmith runs.
//!
//! Provides `TestEnv` - a temp project directory with a `mockups/` tree,
//! an optional `mocksmith.toml`, and helpers to run the CLI inside it.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

/// Result of running a mocksmith CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// Parse stdout as NDJSON, skipping blank lines
    pub fn json_lines(&self) -> Vec<Value> {
        self.stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| {
                serde_json::from_str(l).unwrap_or_else(|e| panic!("not JSON ({}): {}", e, l))
            })
            .collect()
    }
}

/// Isolated project directory for one test.
pub struct TestEnv {
    pub project_root: TempDir,
    mocksmith_bin: PathBuf,
}

impl TestEnv {
    /// Create a new TestEnvBuilder
    pub fn builder() -> TestEnvBuilder {
        TestEnvBuilder::new()
    }

    /// Get path relative to project root
    pub fn project_path(&self, relative: &str) -> PathBuf {
        self.project_root.path().join(relative)
    }

    /// Run mocksmith in the project root
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    /// Run mocksmith in the project root with extra env vars
    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let mut cmd = Command::new(&self.mocksmith_bin);
        cmd.current_dir(self.project_root.path())
            .args(args)
            .env_remove("RUST_LOG")
            .env_remove("MOCKSMITH_MOCKUP_ROOT")
            .env_remove("MOCKSMITH_OUTPUT_ROOT")
            .env_remove("MOCKSMITH_ALLOW_UPDATE");

        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute mocksmith");
        output_to_result(output)
    }

    /// Write (or overwrite) a mockup file under `mockups/`
    pub fn write_mockup(&self, relative_path: &str, content: &str) {
        self.write_project_file(&format!("mockups/{}", relative_path), content);
    }

    pub fn remove_mockup(&self, relative_path: &str) {
        std::fs::remove_file(self.project_path(&format!("mockups/{}", relative_path)))
            .expect("Failed to remove mockup");
    }

    /// Write a file to the project directory
    pub fn write_project_file(&self, relative_path: &str, content: &str) {
        let full_path = self.project_path(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directories");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
    }

    /// Read a generated file's content
    pub fn read_generated(&self, relative_path: &str) -> String {
        std::fs::read_to_string(self.project_path(relative_path))
            .unwrap_or_else(|e| panic!("Failed to read generated file {}: {}", relative_path, e))
    }

    /// Run logs in `.mocksmith/runs`, oldest first
    pub fn run_logs(&self) -> Vec<PathBuf> {
        let dir = self.project_path(".mocksmith/runs");
        let mut logs: Vec<PathBuf> = std::fs::read_dir(&dir)
            .map(|entries| entries.flatten().map(|e| e.path()).collect())
            .unwrap_or_default();
        logs.sort();
        logs
    }

    /// Parse the newest run log
    pub fn latest_run_log(&self) -> Value {
        let path = self
            .run_logs()
            .pop()
            .expect("expected at least one run log");
        let content = std::fs::read_to_string(&path).expect("Failed to read run log");
        serde_json::from_str(&content).expect("run log is not JSON")
    }

    /// Every file under `dir`, relative and sorted, with contents
    pub fn snapshot(&self, dir: &str) -> Vec<(String, String)> {
        let root = self.project_path(dir);
        let mut files: Vec<(String, String)> = super::list_all_files(&root)
            .into_iter()
            .map(|path| {
                let rel = Path::new(&path)
                    .strip_prefix(&root)
                    .map(|p| p.to_string_lossy().replace('\\', "/"))
                    .unwrap_or_else(|_| path.clone());
                let content = std::fs::read_to_string(&path).unwrap_or_default();
                (rel, content)
            })
            .collect();
        files.sort();
        files
    }
}

fn output_to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

/// Builder for TestEnv with fluent API
#[derive(Default)]
pub struct TestEnvBuilder {
    mockups: Vec<(String, String)>,
    config: Option<String>,
}

impl TestEnvBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file under `mockups/`
    pub fn with_mockup(mut self, name: &str, content: &str) -> Self {
        self.mockups.push((name.to_string(), content.to_string()));
        self
    }

    /// Write `mocksmith.toml` with this content
    pub fn with_config(mut self, toml: &str) -> Self {
        self.config = Some(toml.to_string());
        self
    }

    /// Build the TestEnv
    pub fn build(self) -> TestEnv {
        let project_root = TempDir::new().expect("Failed to create project temp dir");
        let env = TestEnv {
            project_root,
            mocksmith_bin: PathBuf::from(env!("CARGO_BIN_EXE_mocksmith")),
        };

        std::fs::create_dir_all(env.project_path("mockups")).expect("Failed to create mockups");
        for (name, content) in &self.mockups {
            env.write_mockup(name, content);
        }
        if let Some(config) = &self.config {
            env.write_project_file("mocksmith.toml", config);
        }
        env
    }
}
