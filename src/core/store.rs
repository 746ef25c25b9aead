//! Key/value access to the persisted workflow configuration.
//!
//! The workflow tool keeps its configuration in git config under the `gitflow.`
//! namespace. [`ConfigStore`] is the narrow interface the registry loader reads
//! through and the pre-command hooks write through. [`crate::core::git::GitConfigStore`]
//! is the git2-backed implementation; [`MemoryConfigStore`] keeps entries in memory
//! in insertion order and is what unit tests and dry runs use.

use crate::core::error::Result;
use parking_lot::Mutex;

/// Reserved namespace for every key this crate reads or writes.
pub const NAMESPACE: &str = "gitflow.";

pub trait ConfigStore: Send + Sync {
    /// Look up a single key. Missing keys are `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// All entries whose normalized key starts with `prefix`, in storage order.
    fn entries(&self, prefix: &str) -> Result<Vec<(String, String)>>;

    /// Write a key at repository level. Must be idempotent.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Normalize a git config key the way git does: the section and the variable
/// name are case-insensitive, a subsection keeps its case.
pub fn normalize_key(key: &str) -> String {
    match (key.find('.'), key.rfind('.')) {
        (Some(first), Some(last)) if first != last => format!(
            "{}{}{}",
            key[..first].to_ascii_lowercase(),
            &key[first..last],
            key[last..].to_ascii_lowercase()
        ),
        _ => key.to_ascii_lowercase(),
    }
}

/// Parse a git config boolean (`true/yes/on/1`, `false/no/off/0`, empty).
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" | "" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    entries: Mutex<Vec<(String, String)>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `(key, value)` pairs, keeping their order.
    pub fn with_entries<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(key, value)| (normalize_key(key.as_ref()), value.into()))
            .collect();
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let key = normalize_key(key);
        // Last value wins, as with multi-level git config.
        Ok(self
            .entries
            .lock()
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.clone()))
    }

    fn entries(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        let prefix = prefix.to_ascii_lowercase();
        Ok(self
            .entries
            .lock()
            .iter()
            .filter(|(k, _)| k.to_ascii_lowercase().starts_with(&prefix))
            .cloned()
            .collect())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let key = normalize_key(key);
        let mut entries = self.entries.lock();
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => entries.push((key, value.to_string())),
        }
        Ok(())
    }
}
