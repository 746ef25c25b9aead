//! Data-driven registry of workflow branch types.
//!
//! Branch kinds are not a fixed enumeration: each kind is a [`BranchTypeConfig`]
//! keyed by name and held in a [`BranchTypeRegistry`] in registration order.
//! The registry is loaded once from the persisted workflow configuration and
//! validated at load time, so classification never has to work around an
//! ambiguous setup.
//!
//! # Configuration layouts
//! - `gitflow.branch.<name>.<field>`: one entry per field, `type` is `base` or `topic`
//! - Legacy: `gitflow.branch.{master,main,develop} = <branch>` and
//!   `gitflow.prefix.<kind> = <prefix>` applied on top of the preset
//! - No workflow configuration at all: the preset

use crate::core::error::{FlowNavigatorError, Result};
use crate::core::store::{parse_bool, ConfigStore, NAMESPACE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Legacy aliases accepted for the trunk branch.
pub const TRUNK_ALIASES: [&str; 2] = ["main", "master"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchRole {
    /// Long-lived branch such as main or develop
    Base,
    /// Short-lived branch with a prefix, such as feature/login
    Topic,
}

/// How changes are integrated between a branch and its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    Merge,
    Rebase,
    Squash,
}

impl MergeStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            MergeStrategy::Merge => "merge",
            MergeStrategy::Rebase => "rebase",
            MergeStrategy::Squash => "squash",
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "merge" | "none" => Ok(MergeStrategy::Merge),
            "rebase" => Ok(MergeStrategy::Rebase),
            "squash" => Ok(MergeStrategy::Squash),
            other => Err(format!("unknown merge strategy '{other}'")),
        }
    }
}

/// Authoritative default behavior for one branch kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchTypeConfig {
    pub name: String,
    pub role: BranchRole,
    pub parent: Option<String>,
    pub start_point: Option<String>,
    pub upstream_strategy: MergeStrategy,
    /// Never `Squash`; checked at load time.
    pub downstream_strategy: MergeStrategy,
    pub auto_update: bool,
    /// Topic prefix such as `feature/`. Empty for base kinds.
    pub prefix: String,
    pub creates_tag: bool,
    pub tag_prefix: String,
    pub delete_remote_by_default: bool,
    /// Branch a base kind lives on when it differs from the kind name.
    pub branch_name: Option<String>,
}

impl BranchTypeConfig {
    pub fn base(name: impl Into<String>, parent: Option<&str>) -> Self {
        Self {
            name: name.into(),
            role: BranchRole::Base,
            parent: parent.map(str::to_string),
            start_point: None,
            upstream_strategy: MergeStrategy::Merge,
            downstream_strategy: MergeStrategy::Merge,
            auto_update: false,
            prefix: String::new(),
            creates_tag: false,
            tag_prefix: String::new(),
            delete_remote_by_default: false,
            branch_name: None,
        }
    }

    pub fn topic(name: impl Into<String>, parent: &str) -> Self {
        let name = name.into();
        Self {
            prefix: format!("{name}/"),
            role: BranchRole::Topic,
            ..Self::base(name, Some(parent))
        }
    }

    pub fn is_topic(&self) -> bool {
        self.role == BranchRole::Topic
    }

    /// The long-lived branch a base kind refers to.
    pub fn base_branch_name(&self) -> &str {
        self.branch_name.as_deref().unwrap_or(&self.name)
    }

    /// Full branch name for a topic short name, `prefix + short_name`.
    pub fn full_name(&self, short_name: &str) -> String {
        format!("{}{}", self.prefix, short_name)
    }

    fn with_tags(mut self, tag: bool) -> Self {
        self.creates_tag = tag;
        self
    }

    fn with_downstream(mut self, strategy: MergeStrategy) -> Self {
        self.downstream_strategy = strategy;
        self
    }
}

/// Words the command line already uses. A topic type with one of these names
/// could never be addressed as `<kind> <action>`.
pub const RESERVED_NAMES: &[&str] = &[
    "finish", "delete", "rebase", "update", "rename", "publish", "continue", "abort", "state",
    "watch", "types", "help",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchTypeRegistry {
    types: Vec<BranchTypeConfig>,
}

impl BranchTypeRegistry {
    /// Build a registry, rejecting duplicates, dangling parents and prefixes
    /// that could match the same branch.
    pub fn new(types: Vec<BranchTypeConfig>) -> Result<Self> {
        for (i, config) in types.iter().enumerate() {
            if types[..i].iter().any(|other| other.name == config.name) {
                return Err(FlowNavigatorError::invalid_branch_config(
                    &config.name,
                    "defined more than once",
                ));
            }
            if config.downstream_strategy == MergeStrategy::Squash {
                return Err(FlowNavigatorError::invalid_branch_config(
                    &config.name,
                    "downstream strategy cannot be squash",
                ));
            }
            if let Some(parent) = &config.parent {
                if !types.iter().any(|t| &t.name == parent) {
                    return Err(FlowNavigatorError::invalid_branch_config(
                        &config.name,
                        format!("parent '{parent}' is not a registered branch type"),
                    ));
                }
            }
            if config.is_topic() && config.prefix.is_empty() {
                return Err(FlowNavigatorError::invalid_branch_config(
                    &config.name,
                    "topic branch types need a prefix",
                ));
            }
            if config.is_topic() && RESERVED_NAMES.contains(&config.name.as_str()) {
                return Err(FlowNavigatorError::invalid_branch_config(
                    &config.name,
                    "name is taken by a built-in command",
                ));
            }
        }

        let topics: Vec<_> = types.iter().filter(|t| t.is_topic()).collect();
        for (i, first) in topics.iter().enumerate() {
            for second in &topics[i + 1..] {
                if first.prefix.starts_with(&second.prefix)
                    || second.prefix.starts_with(&first.prefix)
                {
                    return Err(FlowNavigatorError::ambiguous_prefix(
                        &first.prefix,
                        &second.prefix,
                    ));
                }
            }
        }

        Ok(Self { types })
    }

    /// The classic layout: main and develop, then feature, bugfix, release,
    /// hotfix and support.
    pub fn preset() -> Self {
        Self {
            types: preset_types(),
        }
    }

    /// Load branch types from the persisted workflow configuration.
    pub fn load(store: &dyn ConfigStore) -> Result<Self> {
        let entries = store.entries(NAMESPACE)?;
        let mut typed: Vec<(String, Vec<(String, String)>)> = Vec::new();
        let mut legacy_bases: Vec<(String, String)> = Vec::new();
        let mut legacy_prefixes: Vec<(String, String)> = Vec::new();

        for (key, value) in entries {
            let rest = &key[NAMESPACE.len()..];
            if let Some(branch) = rest.strip_prefix("branch.") {
                match branch.rsplit_once('.') {
                    Some((name, field)) => {
                        match typed.iter_mut().find(|(n, _)| n == name) {
                            Some((_, fields)) => fields.push((field.to_string(), value)),
                            None => typed.push((name.to_string(), vec![(field.to_string(), value)])),
                        }
                    }
                    None => legacy_bases.push((branch.to_string(), value)),
                }
            } else if let Some(kind) = rest.strip_prefix("prefix.") {
                legacy_prefixes.push((kind.to_string(), value));
            }
        }

        if typed.is_empty() {
            log::debug!(
                "No branch type definitions found, using preset with {} legacy overrides",
                legacy_bases.len() + legacy_prefixes.len()
            );
            return Self::new(apply_legacy(preset_types(), &legacy_bases, &legacy_prefixes));
        }

        let types = typed
            .into_iter()
            .map(|(name, fields)| parse_type(name, &fields))
            .collect::<Result<Vec<_>>>()?;
        log::debug!("Loaded {} branch types from configuration", types.len());
        Self::new(types)
    }

    pub fn get(&self, name: &str) -> Option<&BranchTypeConfig> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Look up any registered kind, failing with `UnknownBranchType`.
    pub fn require(&self, name: &str) -> Result<&BranchTypeConfig> {
        self.get(name)
            .ok_or_else(|| FlowNavigatorError::unknown_branch_type(name))
    }

    /// Look up a topic kind. Base kinds have no start/finish lifecycle and are
    /// reported as unknown topic types.
    pub fn topic(&self, name: &str) -> Result<&BranchTypeConfig> {
        match self.get(name) {
            Some(config) if config.is_topic() => Ok(config),
            _ => Err(FlowNavigatorError::unknown_branch_type(name)),
        }
    }

    /// All kinds in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &BranchTypeConfig> {
        self.types.iter()
    }

    pub fn topic_types(&self) -> impl Iterator<Item = &BranchTypeConfig> {
        self.types.iter().filter(|t| t.is_topic())
    }

    pub fn base_types(&self) -> impl Iterator<Item = &BranchTypeConfig> {
        self.types.iter().filter(|t| !t.is_topic())
    }
}

fn preset_types() -> Vec<BranchTypeConfig> {
    vec![
        BranchTypeConfig::base("main", None),
        BranchTypeConfig {
            auto_update: true,
            ..BranchTypeConfig::base("develop", Some("main"))
        },
        BranchTypeConfig::topic("feature", "develop").with_downstream(MergeStrategy::Rebase),
        BranchTypeConfig::topic("bugfix", "develop").with_downstream(MergeStrategy::Rebase),
        BranchTypeConfig {
            start_point: Some("develop".to_string()),
            ..BranchTypeConfig::topic("release", "main").with_tags(true)
        },
        BranchTypeConfig::topic("hotfix", "main").with_tags(true),
        BranchTypeConfig::topic("support", "main"),
    ]
}

fn apply_legacy(
    mut types: Vec<BranchTypeConfig>,
    bases: &[(String, String)],
    prefixes: &[(String, String)],
) -> Vec<BranchTypeConfig> {
    for (role, branch) in bases {
        let kind = if TRUNK_ALIASES.contains(&role.as_str()) {
            "main"
        } else {
            role.as_str()
        };
        if let Some(config) = types.iter_mut().find(|t| t.name == kind && !t.is_topic()) {
            config.branch_name = Some(branch.clone());
        }
    }
    for (kind, prefix) in prefixes {
        if kind == "versiontag" {
            for config in types.iter_mut().filter(|t| t.creates_tag) {
                config.tag_prefix = prefix.clone();
            }
        } else if let Some(config) = types.iter_mut().find(|t| &t.name == kind && t.is_topic()) {
            config.prefix = prefix.clone();
        }
    }
    types
}

fn parse_type(name: String, fields: &[(String, String)]) -> Result<BranchTypeConfig> {
    let field = |key: &str| {
        fields
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.trim().to_string())
    };
    let flag = |key: &str| -> Result<bool> {
        match field(key) {
            Some(value) => parse_bool(&value).ok_or_else(|| {
                FlowNavigatorError::invalid_branch_config(
                    &name,
                    format!("'{key}' is not a boolean: '{value}'"),
                )
            }),
            None => Ok(false),
        }
    };
    let strategy = |key: &str| -> Result<MergeStrategy> {
        match field(key) {
            Some(value) => value
                .parse()
                .map_err(|reason: String| FlowNavigatorError::invalid_branch_config(&name, reason)),
            None => Ok(MergeStrategy::Merge),
        }
    };

    let role = match field("type").as_deref() {
        Some("base") => BranchRole::Base,
        Some("topic") => BranchRole::Topic,
        Some(other) => {
            return Err(FlowNavigatorError::invalid_branch_config(
                &name,
                format!("unknown branch type '{other}'"),
            ))
        }
        None => {
            return Err(FlowNavigatorError::invalid_branch_config(
                &name,
                "missing 'type' entry",
            ))
        }
    };

    let prefix = match role {
        BranchRole::Topic => field("prefix").unwrap_or_else(|| format!("{name}/")),
        BranchRole::Base => String::new(),
    };

    Ok(BranchTypeConfig {
        role,
        parent: field("parent").filter(|p| !p.is_empty()),
        start_point: field("startpoint").filter(|p| !p.is_empty()),
        upstream_strategy: strategy("upstreamstrategy")?,
        downstream_strategy: strategy("downstreamstrategy")?,
        auto_update: flag("autoupdate")?,
        prefix,
        creates_tag: flag("tag")?,
        tag_prefix: field("tagprefix").unwrap_or_default(),
        delete_remote_by_default: flag("deleteremote")?,
        branch_name: None,
        name,
    })
}
