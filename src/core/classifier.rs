//! Classification of the checked-out branch.
//!
//! [`classify`] is a pure function from a ref name to a [`BranchState`]. Topic
//! prefixes are tested in registration order, then base branch names (with
//! `main`/`master` treated as one trunk), and anything else is `Unknown`.
//! A `BranchState` is recomputed on every query and never cached.

use crate::core::error::Result;
use crate::core::registry::{BranchTypeRegistry, TRUNK_ALIASES};
use crate::core::sync::BranchReader;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", content = "name", rename_all = "lowercase")]
pub enum BranchKind {
    /// A registered topic kind, e.g. `feature`
    Topic(String),
    /// A registered base kind, e.g. `main`
    Base(String),
    Unknown,
}

impl BranchKind {
    pub fn name(&self) -> &str {
        match self {
            BranchKind::Topic(name) | BranchKind::Base(name) => name,
            BranchKind::Unknown => "unknown",
        }
    }

    pub fn topic_name(&self) -> Option<&str> {
        match self {
            BranchKind::Topic(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_topic(&self) -> bool {
        matches!(self, BranchKind::Topic(_))
    }
}

impl fmt::Display for BranchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchState {
    pub kind: BranchKind,
    pub short_name: String,
    pub full_ref_name: String,
}

impl BranchState {
    pub fn unknown(ref_name: impl Into<String>) -> Self {
        let ref_name = ref_name.into();
        Self {
            kind: BranchKind::Unknown,
            short_name: ref_name.clone(),
            full_ref_name: ref_name,
        }
    }
}

/// Classify a ref name against the registry. Accepts both `feature/x` and
/// `refs/heads/feature/x`.
pub fn classify(current_ref_name: &str, registry: &BranchTypeRegistry) -> BranchState {
    let name = current_ref_name
        .strip_prefix("refs/heads/")
        .unwrap_or(current_ref_name);

    for config in registry.topic_types() {
        if let Some(short_name) = name.strip_prefix(config.prefix.as_str()) {
            if !short_name.is_empty() {
                return BranchState {
                    kind: BranchKind::Topic(config.name.clone()),
                    short_name: short_name.to_string(),
                    full_ref_name: name.to_string(),
                };
            }
        }
    }

    for config in registry.base_types() {
        let branch = config.base_branch_name();
        let is_trunk_alias = config.parent.is_none()
            && TRUNK_ALIASES.contains(&branch)
            && TRUNK_ALIASES.contains(&name);
        if name == branch || is_trunk_alias {
            return BranchState {
                kind: BranchKind::Base(config.name.clone()),
                short_name: name.to_string(),
                full_ref_name: name.to_string(),
            };
        }
    }

    BranchState::unknown(name)
}

/// Read the current branch and classify it. Fails with `NotARepository` when the
/// reader cannot produce a current branch.
pub async fn classify_current(
    reader: &dyn BranchReader,
    registry: &BranchTypeRegistry,
) -> Result<BranchState> {
    let current = reader.current_branch_name().await?;
    let state = classify(&current, registry);
    log::debug!("Classified '{}' as {}", current, state.kind);
    Ok(state)
}
