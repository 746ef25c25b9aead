//! Git repository management and setup utilities
//!
//! Provides functions for creating test repositories with workflow branches
//! and for running the flow-navigator binary against them in isolation.

#![allow(dead_code)]

use assert_cmd::prelude::*;
use flow_navigator::core::error::{FlowNavigatorError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A temporary repository plus a separate home for settings and caches.
/// Both TempDirs must be kept alive for the duration of the test.
pub struct TestRepo {
    pub temp_dir: TempDir,
    pub home: TempDir,
    pub path: PathBuf,
}

impl TestRepo {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config_home(&self) -> PathBuf {
        self.home.path().join("config")
    }

    pub fn cache_home(&self) -> PathBuf {
        self.home.path().join("cache")
    }

    /// The binary, run inside the repository with isolated XDG directories.
    pub fn command(&self) -> anyhow::Result<Command> {
        let mut cmd = Command::cargo_bin("flow-navigator")?;
        cmd.current_dir(&self.path)
            .env("XDG_CONFIG_HOME", self.config_home())
            .env("XDG_CACHE_HOME", self.cache_home())
            .env("NO_COLOR", "1");
        Ok(cmd)
    }

    /// Write `settings.json` where the binary will look for it.
    pub fn write_settings(&self, json: &str) -> Result<()> {
        let dir = self.config_home().join("flow-navigator");
        fs::create_dir_all(&dir)?;
        fs::write(dir.join("settings.json"), json)?;
        Ok(())
    }
}

/// Run a git command in `repo_path`, failing the setup if git does.
pub fn git(repo_path: &Path, args: &[&str]) -> Result<()> {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()
        .map_err(FlowNavigatorError::Io)?;
    if !output.status.success() {
        return Err(FlowNavigatorError::external_command_failed(format!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        )));
    }
    Ok(())
}

/// Sets up a fresh git repository on `main` for testing
pub fn setup_test_repo() -> Result<TestRepo> {
    let temp_dir = TempDir::new()?;
    let home = TempDir::new()?;
    let repo_path = temp_dir.path().to_path_buf();

    git(&repo_path, &["init", "--initial-branch=main"])?;
    git(&repo_path, &["config", "user.name", "Test User"])?;
    git(&repo_path, &["config", "user.email", "test@example.com"])?;

    Ok(TestRepo {
        temp_dir,
        home,
        path: repo_path,
    })
}

/// Sets up a repository with an initial commit on `main` and a `develop` branch
pub fn setup_test_repo_with_develop() -> Result<TestRepo> {
    let repo = setup_test_repo()?;

    create_file(&repo.path, "initial.txt", "initial content\n")?;
    git(&repo.path, &["add", "initial.txt"])?;
    git(&repo.path, &["commit", "-m", "Initial commit"])?;
    git(&repo.path, &["branch", "develop"])?;

    Ok(repo)
}

pub fn create_file(repo_path: &Path, filename: &str, content: &str) -> Result<()> {
    fs::write(repo_path.join(filename), content)?;
    Ok(())
}

pub fn create_branch(repo_path: &Path, name: &str) -> Result<()> {
    git(repo_path, &["branch", name])
}

pub fn checkout(repo_path: &Path, name: &str) -> Result<()> {
    git(repo_path, &["checkout", "-q", name])
}

pub fn set_config(repo_path: &Path, key: &str, value: &str) -> Result<()> {
    git(repo_path, &["config", key, value])
}
