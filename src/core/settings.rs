//! User settings and per-operation overrides.
//!
//! Settings are read from `settings.json` in the flow-navigator configuration
//! directory. They carry the active remote, the delete-remote-on-finish
//! preference, and [`OperationOverride`]s keyed by branch kind and operation.
//!
//! Every override field is a [`Setting`]: either unset, which is spelled
//! `"use-git-config"` in the file or simply omitted, or a concrete value.
//! Unset always defers to the next lower layer.
//!
//! ```json
//! {
//!   "remote": "upstream",
//!   "overrides": {
//!     "feature": { "finish": { "merge": "rebase", "retention": "keep-local" } },
//!     "release": { "finish": { "signTag": true, "promptForTagMessage": true } }
//!   }
//! }
//! ```

use crate::core::dirs::get_config_directory;
use crate::core::error::{FlowNavigatorError, Result};
use crate::core::registry::MergeStrategy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Sentinel meaning "defer to the next lower layer".
pub const USE_GIT_CONFIG: &str = "use-git-config";

/// A value that may defer to a lower precedence layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting<T> {
    UseGitConfig,
    Value(T),
}

impl<T> Default for Setting<T> {
    fn default() -> Self {
        Setting::UseGitConfig
    }
}

impl<T: Clone> Setting<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Setting::UseGitConfig => None,
            Setting::Value(value) => Some(value),
        }
    }
}

impl<T> From<Option<T>> for Setting<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Setting::UseGitConfig, Setting::Value)
    }
}

impl<T: Serialize> Serialize for Setting<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Setting::UseGitConfig => serializer.serialize_str(USE_GIT_CONFIG),
            Setting::Value(value) => value.serialize(serializer),
        }
    }
}

#[derive(Deserialize)]
enum Sentinel {
    #[serde(rename = "use-git-config")]
    UseGitConfig,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SettingRepr<T> {
    Sentinel(Sentinel),
    Null(()),
    Value(T),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Setting<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match SettingRepr::deserialize(deserializer)? {
            SettingRepr::Sentinel(Sentinel::UseGitConfig) | SettingRepr::Null(()) => {
                Setting::UseGitConfig
            }
            SettingRepr::Value(value) => Setting::Value(value),
        })
    }
}

/// The operations that take persisted overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Start,
    Finish,
    Update,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Start => "start",
            Operation::Finish => "finish",
            Operation::Update => "update",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens to the topic branch after a finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetentionMode {
    Delete,
    Keep,
    KeepLocal,
    KeepRemote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FastForwardMode {
    NoFf,
    Ff,
}

impl std::str::FromStr for RetentionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "delete" => Ok(RetentionMode::Delete),
            "keep" => Ok(RetentionMode::Keep),
            "keep-local" | "keeplocal" => Ok(RetentionMode::KeepLocal),
            "keep-remote" | "keepremote" => Ok(RetentionMode::KeepRemote),
            other => Err(format!(
                "unknown retention mode '{other}' (expected delete, keep, keep-local or keep-remote)"
            )),
        }
    }
}

/// Optional overrides for one (kind, operation) pair. Fields irrelevant to an
/// operation are ignored by the resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OperationOverride {
    pub merge: Setting<MergeStrategy>,
    pub tag: Setting<bool>,
    pub sign_tag: Setting<bool>,
    /// File the tag message is read from when no message is given.
    pub tag_message_file: Setting<String>,
    pub prompt_for_tag_message: Setting<bool>,
    pub retention: Setting<RetentionMode>,
    pub force_delete: Setting<bool>,
    pub fetch: Setting<bool>,
    pub fast_forward: Setting<FastForwardMode>,
    pub preserve_merges: Setting<bool>,
}

/// Choices made for a single invocation, the highest precedence layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplicitChoice {
    pub overrides: OperationOverride,
    /// Start point for `start`, overriding the kind's configured start point
    pub base_ref: Option<String>,
    pub tag_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub remote: String,
    /// Overrides every kind's delete-remote default when set
    pub delete_remote_on_finish: Option<bool>,
    pub interactive: bool,
    pub refresh_debounce_ms: u64,
    pub overrides: BTreeMap<String, BTreeMap<Operation, OperationOverride>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            delete_remote_on_finish: None,
            interactive: true,
            refresh_debounce_ms: 250,
            overrides: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Load `settings.json` from the configuration directory, falling back to
    /// defaults when it does not exist.
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        Self::load_from(&path)
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(get_config_directory()?.join("settings.json"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| FlowNavigatorError::settings_read_failed(path, e))?;
        let settings: Settings = serde_json::from_str(&content).map_err(|e| {
            log::error!("Failed to parse settings file '{}': {}", path.display(), e);
            FlowNavigatorError::settings_parse_failed(path, e)
        })?;

        log::debug!(
            "Loaded settings from {} ({} kinds with overrides)",
            path.display(),
            settings.overrides.len()
        );
        Ok(settings)
    }

    /// Persisted override for a (kind, operation) pair; empty when none.
    pub fn operation_override(&self, kind: &str, operation: Operation) -> OperationOverride {
        self.overrides
            .get(kind)
            .and_then(|ops| ops.get(&operation))
            .cloned()
            .unwrap_or_default()
    }

    pub fn refresh_debounce(&self) -> Duration {
        Duration::from_millis(self.refresh_debounce_ms)
    }
}
