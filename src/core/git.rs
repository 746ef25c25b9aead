//! Read-only repository queries and workflow configuration access.
//!
//! This module wraps `git2` behind [`GitRepo`] and exposes the two collaborators
//! the core consumes from the repository:
//! - [`GitBranchReader`]: current branch, branch existence and listing
//! - [`GitConfigStore`]: the `gitflow.` configuration namespace
//!
//! Nothing here mutates refs. The only writes are configuration values.
//! git2 handles are not shared across tasks: every async query reopens the
//! repository on a blocking thread.

use crate::core::error::{FlowNavigatorError, Result};
use crate::core::store::{normalize_key, ConfigStore};
use crate::core::sync::BranchReader;
use async_trait::async_trait;
use git2::{BranchType, ConfigLevel, ErrorCode, Repository};
use std::path::{Path, PathBuf};

pub struct GitRepo {
    repo: Repository,
}

impl GitRepo {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path).map_err(|e| {
            log::debug!("Repository discovery failed: {e}");
            FlowNavigatorError::NotARepository
        })?;
        Ok(GitRepo { repo })
    }

    /// The `.git` directory.
    pub fn get_repo_path(&self) -> PathBuf {
        self.repo.path().to_path_buf()
    }

    pub fn get_workdir(&self) -> Result<PathBuf> {
        self.repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or(FlowNavigatorError::NotARepository)
    }

    /// Short name of the checked-out branch. Unborn branches report the name
    /// HEAD points at; a detached HEAD reports `HEAD`.
    pub fn get_current_branch(&self) -> Result<String> {
        match self.repo.head() {
            Ok(head) if head.is_branch() => head
                .shorthand()
                .map(str::to_string)
                .ok_or(FlowNavigatorError::NotARepository),
            Ok(_) => Ok("HEAD".to_string()),
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                let head = self.repo.find_reference("HEAD")?;
                let target = head
                    .symbolic_target()
                    .ok_or(FlowNavigatorError::NotARepository)?;
                Ok(target
                    .strip_prefix("refs/heads/")
                    .unwrap_or(target)
                    .to_string())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn branch_exists(&self, name: &str) -> Result<bool> {
        let name = name.strip_prefix("refs/heads/").unwrap_or(name);
        match self.repo.find_branch(name, BranchType::Local) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Local branch names starting with `prefix`, sorted.
    pub fn get_local_branches(&self, prefix: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for branch in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            if let Some(name) = branch.name()? {
                if name.starts_with(prefix) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn get_config_entries(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        let config = self.repo.config()?;
        let prefix = prefix.to_ascii_lowercase();
        let mut found = Vec::new();
        let mut entries = config.entries(None)?;
        while let Some(entry) = entries.next() {
            let entry = entry?;
            let (Some(name), Some(value)) = (entry.name(), entry.value()) else {
                continue;
            };
            if name.to_ascii_lowercase().starts_with(&prefix) {
                found.push((normalize_key(name), value.to_string()));
            }
        }
        Ok(found)
    }

    pub fn get_config_value(&self, key: &str) -> Result<Option<String>> {
        let config = self.repo.config()?;
        match config.get_string(key) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write a key into the repository-local configuration file.
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<()> {
        let mut local = self.repo.config()?.open_level(ConfigLevel::Local)?;
        local.set_str(key, value)?;
        Ok(())
    }
}

async fn with_repo<T, F>(path: &Path, query: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&GitRepo) -> Result<T> + Send + 'static,
{
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let repo = GitRepo::open(&path)?;
        query(&repo)
    })
    .await
    .map_err(|e| FlowNavigatorError::Io(std::io::Error::other(e)))?
}

/// Branch queries against a repository on disk.
#[derive(Debug, Clone)]
pub struct GitBranchReader {
    path: PathBuf,
}

impl GitBranchReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl BranchReader for GitBranchReader {
    async fn current_branch_name(&self) -> Result<String> {
        with_repo(&self.path, |repo| {
            repo.get_current_branch()
                .map_err(|_| FlowNavigatorError::NotARepository)
        })
        .await
    }

    async fn branch_exists(&self, full_ref_name: &str) -> Result<bool> {
        let name = full_ref_name.to_string();
        with_repo(&self.path, move |repo| repo.branch_exists(&name)).await
    }

    async fn list_branches(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = prefix.to_string();
        with_repo(&self.path, move |repo| repo.get_local_branches(&prefix)).await
    }
}

/// The workflow configuration as stored in git config.
#[derive(Debug, Clone)]
pub struct GitConfigStore {
    path: PathBuf,
}

impl GitConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigStore for GitConfigStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        GitRepo::open(&self.path)?.get_config_value(key)
    }

    fn entries(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        GitRepo::open(&self.path)?.get_config_entries(prefix)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        log::debug!("Setting {key} = {value}");
        GitRepo::open(&self.path)?.set_config_value(key, value)
    }
}
