//! Keeping the published branch state in step with the repository.
//!
//! The repository is changed behind our back (terminals, other tools, manual
//! checkouts), so the state is never cached. [`StateSynchronizer::refresh`]
//! re-reads the current branch, classifies it, queries every topic kind
//! concurrently, and publishes a fresh [`UiStateSnapshot`] on a watch channel.
//! The newest published snapshot always wins.
//!
//! A refresh never fails. If the current branch cannot be read, the degraded
//! snapshot (unknown branch, nothing exists) is published. If one kind's query
//! fails, that kind counts as having no branches and the others are unaffected.

use crate::core::classifier::{classify_current, BranchKind, BranchState};
use crate::core::error::Result;
use crate::core::registry::BranchTypeRegistry;
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;

/// Read-only branch queries.
#[async_trait]
pub trait BranchReader: Send + Sync {
    /// Short name of the checked-out branch. Fails with `NotARepository`.
    async fn current_branch_name(&self) -> Result<String>;

    async fn branch_exists(&self, full_ref_name: &str) -> Result<bool>;

    /// Local branches whose names start with `prefix`.
    async fn list_branches(&self, prefix: &str) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiStateSnapshot {
    pub current: BranchState,
    /// One entry per registered topic kind.
    pub exists_by_kind: BTreeMap<String, bool>,
}

impl UiStateSnapshot {
    /// The conservative state: unknown branch, no branches of any kind.
    pub fn degraded(registry: &BranchTypeRegistry) -> Self {
        Self {
            current: BranchState::unknown(""),
            exists_by_kind: registry
                .topic_types()
                .map(|t| (t.name.clone(), false))
                .collect(),
        }
    }

    pub fn current_kind(&self) -> &BranchKind {
        &self.current.kind
    }

    pub fn exists(&self, kind: &str) -> bool {
        self.exists_by_kind.get(kind).copied().unwrap_or(false)
    }

    /// Named flags for visibility gating: `isOnTopicBranch`, `isOn<Kind>Branch`
    /// and `<kind>sExist` for every topic kind.
    pub fn flags(&self) -> BTreeMap<String, bool> {
        let mut flags = BTreeMap::new();
        flags.insert("isOnTopicBranch".to_string(), self.current.kind.is_topic());
        for (kind, exists) in &self.exists_by_kind {
            let on_kind = self.current.kind.topic_name() == Some(kind.as_str());
            flags.insert(format!("isOn{}Branch", capitalize(kind)), on_kind);
            flags.insert(format!("{kind}sExist"), *exists);
        }
        flags
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub struct StateSynchronizer {
    registry: Arc<BranchTypeRegistry>,
    reader: Arc<dyn BranchReader>,
    publisher: watch::Sender<UiStateSnapshot>,
}

impl StateSynchronizer {
    pub fn new(registry: Arc<BranchTypeRegistry>, reader: Arc<dyn BranchReader>) -> Self {
        let (publisher, _) = watch::channel(UiStateSnapshot::degraded(&registry));
        Self {
            registry,
            reader,
            publisher,
        }
    }

    /// Receive every snapshot published from now on.
    pub fn subscribe(&self) -> watch::Receiver<UiStateSnapshot> {
        self.publisher.subscribe()
    }

    /// The last published snapshot.
    pub fn latest(&self) -> UiStateSnapshot {
        self.publisher.borrow().clone()
    }

    /// Recompute and publish the snapshot. Never fails.
    pub async fn refresh(&self) -> UiStateSnapshot {
        let snapshot = match classify_current(self.reader.as_ref(), &self.registry).await {
            Ok(current) => UiStateSnapshot {
                current,
                exists_by_kind: self.query_existence().await,
            },
            Err(e) => {
                log::warn!("Branch state unavailable, publishing degraded state: {e}");
                UiStateSnapshot::degraded(&self.registry)
            }
        };

        self.publisher.send_replace(snapshot.clone());
        log::debug!(
            "Published state: current={} ({}), {} kinds",
            snapshot.current.short_name,
            snapshot.current.kind,
            snapshot.exists_by_kind.len()
        );
        snapshot
    }

    async fn query_existence(&self) -> BTreeMap<String, bool> {
        let queries = self.registry.topic_types().map(|config| async move {
            let exists = match self.reader.list_branches(&config.prefix).await {
                Ok(branches) => !branches.is_empty(),
                Err(e) => {
                    log::warn!("Listing {} branches failed, counting none: {e}", config.name);
                    false
                }
            };
            (config.name.clone(), exists)
        });
        join_all(queries).await.into_iter().collect()
    }
}
