//! Persisted mapping of group name to its ordered program entries.
//!
//! Every mutation is written straight back to disk. A failed write is logged and
//! the in-memory state is kept, so the caller never loses its edit.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::model::{AppEntry, Group};

/// Either shape an entry may have on disk.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum StoredEntry {
    Legacy(String),
    Entry {
        path: String,
        #[serde(default = "default_enabled")]
        enabled: bool,
    },
}

fn default_enabled() -> bool {
    true
}

impl From<StoredEntry> for AppEntry {
    fn from(stored: StoredEntry) -> Self {
        match stored {
            StoredEntry::Legacy(path) => AppEntry::enabled(path),
            StoredEntry::Entry { path, enabled } => AppEntry::new(path, enabled),
        }
    }
}

/// Parses a store document, accepting legacy bare-string entries.
pub fn parse_groups(content: &str) -> Result<Vec<Group>> {
    let document: Map<String, Value> =
        serde_json::from_str(content).context("groups file is not a JSON object")?;

    document
        .into_iter()
        .map(|(name, value)| {
            let stored: Vec<StoredEntry> = serde_json::from_value(value)
                .with_context(|| format!("invalid entries for group '{}'", name))?;
            Ok(Group {
                name,
                entries: stored.into_iter().map(AppEntry::from).collect(),
            })
        })
        .collect()
}

/// Renders groups in the current `{path, enabled}` shape, keeping group order.
pub fn render_groups(groups: &[Group]) -> Result<String> {
    let mut document = Map::new();
    for group in groups {
        let entries = serde_json::to_value(&group.entries)
            .with_context(|| format!("failed to serialize group '{}'", group.name))?;
        document.insert(group.name.clone(), entries);
    }
    serde_json::to_string_pretty(&Value::Object(document)).context("failed to serialize groups")
}

pub struct GroupStore {
    path: PathBuf,
    groups: Vec<Group>,
}

impl GroupStore {
    /// Loads the store at `path`; a missing file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let groups = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read groups file {}", path.display()))?;
            parse_groups(&content)
                .with_context(|| format!("failed to parse groups file {}", path.display()))?
        } else {
            log::info!("No groups file at {}, starting empty", path.display());
            Vec::new()
        };
        Ok(Self { path, groups })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.group(name).is_some()
    }

    /// Index of the first entry in `group` whose path is exactly `path`.
    pub fn position(&self, group: &str, path: &str) -> Option<usize> {
        self.group(group)?.entries.iter().position(|e| e.path == path)
    }

    pub fn save(&self) -> Result<()> {
        let content = render_groups(&self.groups)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("failed to create groups directory")?;
        }
        fs::write(&self.path, content)
            .with_context(|| format!("failed to write groups file {}", self.path.display()))?;
        Ok(())
    }

    fn autosave(&self) {
        match self.save() {
            Ok(()) => log::debug!("Saved {} group(s) to {}", self.groups.len(), self.path.display()),
            Err(err) => log::error!("Auto-save failed: {:#}", err),
        }
    }

    fn group_mut(&mut self, name: &str) -> Result<&mut Group> {
        self.groups
            .iter_mut()
            .find(|g| g.name == name)
            .ok_or_else(|| anyhow!("group '{}' does not exist", name))
    }

    fn entry_mut(&mut self, group: &str, index: usize) -> Result<&mut AppEntry> {
        let group = self.group_mut(group)?;
        let name = group.name.clone();
        group
            .entries
            .get_mut(index)
            .ok_or_else(|| anyhow!("group '{}' has no entry #{}", name, index))
    }

    fn check_new_name(&self, name: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            bail!("group name must not be empty");
        }
        if self.contains(name) {
            bail!("group '{}' already exists", name);
        }
        Ok(name.to_string())
    }

    pub fn create_group(&mut self, name: &str) -> Result<()> {
        let name = self.check_new_name(name)?;
        self.groups.push(Group::new(name));
        self.autosave();
        Ok(())
    }

    pub fn delete_group(&mut self, name: &str) -> Result<Group> {
        let index = self
            .groups
            .iter()
            .position(|g| g.name == name)
            .ok_or_else(|| anyhow!("group '{}' does not exist", name))?;
        let removed = self.groups.remove(index);
        self.autosave();
        Ok(removed)
    }

    /// Renames in place, so the group keeps its position.
    pub fn rename_group(&mut self, old: &str, new: &str) -> Result<()> {
        if !self.contains(old) {
            bail!("group '{}' does not exist", old);
        }
        if new.trim() == old {
            bail!("group '{}' already has that name", old);
        }
        let new = self.check_new_name(new)?;
        self.group_mut(old)?.name = new;
        self.autosave();
        Ok(())
    }

    /// Copies `source` under `new`, with every entry enabled.
    pub fn copy_group(&mut self, source: &str, new: &str) -> Result<()> {
        let new = self.check_new_name(new)?;
        let entries = self
            .group(source)
            .ok_or_else(|| anyhow!("group '{}' does not exist", source))?
            .entries
            .iter()
            .map(|e| AppEntry::enabled(e.path.clone()))
            .collect();
        self.groups.push(Group { name: new, entries });
        self.autosave();
        Ok(())
    }

    pub fn add_entry(&mut self, group: &str, path: &str) -> Result<()> {
        self.group_mut(group)?.entries.push(AppEntry::enabled(path));
        self.autosave();
        Ok(())
    }

    pub fn remove_entry(&mut self, group: &str, index: usize) -> Result<AppEntry> {
        let target = self.group_mut(group)?;
        if index >= target.entries.len() {
            bail!("group '{}' has no entry #{}", group, index);
        }
        let removed = target.entries.remove(index);
        self.autosave();
        Ok(removed)
    }

    /// Flips the enabled flag and returns the new value.
    pub fn toggle_entry(&mut self, group: &str, index: usize) -> Result<bool> {
        let entry = self.entry_mut(group, index)?;
        entry.enabled = !entry.enabled;
        let enabled = entry.enabled;
        self.autosave();
        Ok(enabled)
    }

    pub fn set_entry_enabled(&mut self, group: &str, index: usize, enabled: bool) -> Result<()> {
        self.entry_mut(group, index)?.enabled = enabled;
        self.autosave();
        Ok(())
    }
}
