//! Last-known branch state on disk.
//!
//! Every refresh driven from the command line writes the published
//! [`UiStateSnapshot`] and its flags to
//! `<cache dir>/flow-navigator/<md5 of repo path>/state.json`, so shell prompts
//! and editor integrations can read the state without opening the repository.
//! The cache is write-mostly: nothing in the core reads it back to make
//! decisions, and a failed write is logged rather than fatal.
//!
//! # Public API
//! - [`StateCache`]: the serialized snapshot with its timestamp
//! - [`save_snapshot`] / [`load_snapshot_from`]: cache file access
//! - [`get_cache_dir`]: per-repository cache directory

use crate::core::dirs::get_cache_directory;
use crate::core::error::{FlowNavigatorError, Result};
use crate::core::sync::UiStateSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const CACHE_FILE: &str = "state.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateCache {
    pub snapshot: UiStateSnapshot,
    pub flags: BTreeMap<String, bool>,
    pub last_updated: DateTime<Utc>,
    pub repo_path: PathBuf,
}

impl StateCache {
    pub fn new(repo_path: PathBuf, snapshot: UiStateSnapshot) -> Self {
        Self {
            flags: snapshot.flags(),
            snapshot,
            last_updated: Utc::now(),
            repo_path,
        }
    }
}

/// `<cache root>/<md5 of repo path>`.
pub fn get_cache_dir(cache_root: &Path, repo_path: &Path) -> PathBuf {
    let repo_hash = format!("{:x}", md5::compute(repo_path.to_string_lossy().as_bytes()));
    log::debug!("get_cache_dir: repo_path = {repo_path:?}, repo_hash = {repo_hash}");
    cache_root.join(repo_hash)
}

/// Write the snapshot under the default cache root.
pub fn save_snapshot(repo_path: &Path, snapshot: &UiStateSnapshot) -> Result<PathBuf> {
    save_snapshot_in(&get_cache_directory()?, repo_path, snapshot)
}

pub fn save_snapshot_in(
    cache_root: &Path,
    repo_path: &Path,
    snapshot: &UiStateSnapshot,
) -> Result<PathBuf> {
    let cache_dir = get_cache_dir(cache_root, repo_path);
    fs::create_dir_all(&cache_dir).map_err(|e| {
        log::error!("Failed to create cache directory '{}': {}", cache_dir.display(), e);
        FlowNavigatorError::cache_directory_creation_failed(&cache_dir, e)
    })?;

    let cache_file = cache_dir.join(CACHE_FILE);
    let cache = StateCache::new(repo_path.to_path_buf(), snapshot.clone());
    let json = serde_json::to_string_pretty(&cache)?;
    fs::write(&cache_file, json).map_err(|e| {
        log::error!("Failed to write cache file '{}': {}", cache_file.display(), e);
        FlowNavigatorError::cache_write_failed(&cache_file, e)
    })?;

    log::debug!("Cached branch state at {}", cache_file.display());
    Ok(cache_file)
}

/// Read the last snapshot written for `repo_path` under `cache_root`, if any.
pub fn load_snapshot_from(cache_root: &Path, repo_path: &Path) -> Result<Option<StateCache>> {
    let cache_file = get_cache_dir(cache_root, repo_path).join(CACHE_FILE);
    if !cache_file.exists() {
        log::debug!("No cached state at {}", cache_file.display());
        return Ok(None);
    }

    let content = fs::read_to_string(&cache_file)?;
    let cache = serde_json::from_str(&content)
        .map_err(|e| FlowNavigatorError::cache_parse_failed(&cache_file, e))?;
    Ok(Some(cache))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::{BranchKind, BranchState};
    use tempfile::TempDir;

    fn snapshot() -> UiStateSnapshot {
        UiStateSnapshot {
            current: BranchState {
                kind: BranchKind::Topic("feature".to_string()),
                short_name: "login".to_string(),
                full_ref_name: "feature/login".to_string(),
            },
            exists_by_kind: [("feature".to_string(), true), ("release".to_string(), false)]
                .into_iter()
                .collect(),
        }
    }

    #[test]
    fn test_cache_dir_is_stable_per_repository() {
        let root = Path::new("/tmp/cache");
        let a = get_cache_dir(root, Path::new("/work/a"));
        assert_eq!(a, get_cache_dir(root, Path::new("/work/a")));
        assert_ne!(a, get_cache_dir(root, Path::new("/work/b")));
        assert!(a.starts_with(root));
    }

    #[test]
    fn test_save_then_load() -> anyhow::Result<()> {
        let cache_root = TempDir::new()?;
        let repo_path = Path::new("/work/project");

        let written = save_snapshot_in(cache_root.path(), repo_path, &snapshot())?;
        assert!(written.ends_with("state.json"));

        let cache = load_snapshot_from(cache_root.path(), repo_path)?
            .ok_or_else(|| anyhow::anyhow!("cache missing"))?;
        assert_eq!(cache.snapshot, snapshot());
        assert_eq!(cache.repo_path, repo_path);
        assert_eq!(cache.flags.get("isOnFeatureBranch"), Some(&true));
        assert_eq!(cache.flags.get("releasesExist"), Some(&false));
        Ok(())
    }

    #[test]
    fn test_load_missing_cache() -> anyhow::Result<()> {
        let cache_root = TempDir::new()?;
        assert!(load_snapshot_from(cache_root.path(), Path::new("/nowhere"))?.is_none());
        Ok(())
    }

    #[test]
    fn test_corrupt_cache_is_a_parse_error() -> anyhow::Result<()> {
        let cache_root = TempDir::new()?;
        let repo_path = Path::new("/work/project");
        let dir = get_cache_dir(cache_root.path(), repo_path);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join("state.json"), "{ not json")?;

        let result = load_snapshot_from(cache_root.path(), repo_path);
        assert!(matches!(result, Err(FlowNavigatorError::CacheParseFailed { .. })));
        Ok(())
    }
}
