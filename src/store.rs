//! Recently used values for command variables.
//!
//! Each variable keeps up to [`MAX_RECENT`] values, most recent first. The store can be backed by a
//! JSON file (`{"name": ["newest", "older", ...]}`) that is rewritten after every change.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// How many values are remembered per variable.
pub const MAX_RECENT: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    path: Option<PathBuf>,
    values: BTreeMap<String, Vec<String>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Export<'a> {
    config_path: Option<&'a Path>,
    timestamp: String,
    variables: &'a BTreeMap<String, Vec<String>>,
}

impl VariableStore {
    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the store backed by `path`.
    ///
    /// A missing file gives an empty store. An unreadable or malformed file is logged and also
    /// gives an empty store; it will be overwritten by the next change.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match Self::read_file(&path) {
            Ok(values) => values,
            Err(e) => {
                warn!("could not load variables from {}: {e:#}", path.display());
                BTreeMap::new()
            }
        };
        Self {
            path: Some(path),
            values,
        }
    }

    fn read_file(path: &Path) -> Result<BTreeMap<String, Vec<String>>> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let data = fs::read_to_string(path)
            .with_context(|| format!("can't read {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("invalid JSON in {}", path.display()))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the store to its file. In-memory stores do nothing.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let data = serde_json::to_string_pretty(&self.values)?;
        fs::write(path, data).with_context(|| format!("can't write {}", path.display()))
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            warn!("could not save variables: {e:#}");
        }
    }

    /// Recent values for `name`, most recent first.
    pub fn options(&self, name: &str) -> &[String] {
        self.values.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Names and their recent values, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Make `value` the most recent value of `name`.
    ///
    /// An earlier occurrence of the same value is removed first, and the list is cut to
    /// [`MAX_RECENT`] entries.
    pub fn record(&mut self, name: &str, value: &str) {
        let values = self.values.entry(name.to_string()).or_default();
        values.retain(|v| v != value);
        values.insert(0, value.to_string());
        values.truncate(MAX_RECENT);
        debug!(variable = name, "recorded value");
        self.persist();
    }

    /// Add a new variable. Returns `false` (and changes nothing) when it already exists.
    pub fn add_variable(&mut self, name: &str, initial: Vec<String>) -> bool {
        if self.values.contains_key(name) {
            return false;
        }
        info!(variable = name, count = initial.len(), "added variable");
        self.values.insert(name.to_string(), initial);
        self.persist();
        true
    }

    pub fn remove_variable(&mut self, name: &str) -> bool {
        if self.values.remove(name).is_none() {
            return false;
        }
        self.persist();
        true
    }

    /// Forget one value. A variable left without values is removed entirely.
    pub fn remove_value(&mut self, name: &str, value: &str) -> bool {
        let Some(values) = self.values.get_mut(name) else {
            return false;
        };
        let Some(index) = values.iter().position(|v| v == value) else {
            return false;
        };
        values.remove(index);
        if values.is_empty() {
            self.values.remove(name);
        }
        self.persist();
        true
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.persist();
    }

    /// Write a snapshot `{configPath, timestamp, variables}` to `output`.
    pub fn export(&self, output: &Path) -> Result<()> {
        let export = Export {
            config_path: self.path(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            variables: &self.values,
        };
        let data = serde_json::to_string_pretty(&export)?;
        fs::write(output, data).with_context(|| format!("can't write {}", output.display()))
    }

    /// Seed the store from a `.env` style file and return how many values were added.
    ///
    /// Values already known for a variable are skipped; new ones go to the front.
    pub fn load_env_file(&mut self, path: &Path) -> Result<usize> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("can't read environment file {}", path.display()))?;

        let mut added = 0;
        for (key, value) in parse_env(&content) {
            let values = self.values.entry(key).or_default();
            if !values.contains(&value) {
                values.insert(0, value);
                values.truncate(MAX_RECENT);
                added += 1;
            }
        }

        if added > 0 {
            self.persist();
        }
        info!(file = %path.display(), added, "loaded environment file");
        Ok(added)
    }
}

/// Parse `KEY=VALUE` lines.
///
/// Blank lines and `#` comments are skipped, keys must look like shell identifiers, and one pair
/// of matching surrounding quotes (single or double) is stripped from the value. Later lines win
/// over earlier lines with the same key.
pub fn parse_env(content: &str) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((key, value)) = trimmed.split_once('=') else {
            continue;
        };
        if !is_identifier(key) {
            continue;
        }
        let value = strip_quotes(value).to_string();
        match pairs.iter_mut().find(|(k, _)| k == key) {
            Some(pair) => pair.1 = value,
            None => pairs.push((key.to_string(), value)),
        }
    }
    pairs
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
