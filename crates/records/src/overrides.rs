// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Local field-level edits layered over remote records.
//!
//! The store is one JSON object on disk: identifier to field patch. It is read
//! once at open and rewritten whole on every change.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use diagnostics::*;
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::error::Result;
use crate::record::Patch;

/// Field names renamed over time: (legacy, current).
pub const LEGACY_FIELD_ALIASES: &[(&str, &str)] = &[("OBsElectronico", "OBsElectrónico")];

type Patches = BTreeMap<String, Patch>;

pub struct OverrideStore {
    path: PathBuf,
    aliases: Vec<(String, String)>,
    patches: Mutex<Patches>,
}

impl OverrideStore {
    /// Load the store at `path`. A missing or unreadable file starts empty.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let aliases = LEGACY_FIELD_ALIASES
            .iter()
            .map(|(legacy, current)| (legacy.to_string(), current.to_string()))
            .collect();
        Self::open_with_aliases(path, aliases)
    }

    pub fn open_with_aliases<P: AsRef<Path>>(path: P, aliases: Vec<(String, String)>) -> Self {
        let path = path.as_ref().to_path_buf();
        let patches = load_patches(&path);
        Self {
            path,
            aliases,
            patches: Mutex::new(patches),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, Patches> {
        self.patches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The stored patch for `id`, empty when there is none.
    ///
    /// A legacy field name is renamed in place when its replacement is absent.
    pub fn get_patch(&self, id: &str) -> Patch {
        let mut patches = self.lock();
        let Some(patch) = patches.get_mut(id) else {
            return Patch::new();
        };
        for (legacy, current) in &self.aliases {
            if patch.contains_key(current) {
                continue;
            }
            if let Some(value) = patch.remove(legacy) {
                let _ = patch.insert(current.clone(), value);
            }
        }
        patch.clone()
    }

    /// Merge `patch` into the stored patch for `id` and write the store.
    ///
    /// Incoming legacy field names are stored under their current name.
    pub fn set_patch(&self, id: &str, patch: Patch) -> Result<()> {
        {
            let mut patches = self.lock();
            let entry = patches.entry(id.to_string()).or_default();
            for (field, value) in patch {
                let field = self
                    .aliases
                    .iter()
                    .find(|(legacy, _)| *legacy == field)
                    .map(|(_, current)| current.clone())
                    .unwrap_or(field);
                let _ = entry.insert(field, value);
            }
        }
        self.persist()
    }

    pub fn ids(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Atomically rewrite the whole store: temp file in the same directory, then rename.
    pub fn persist(&self) -> Result<()> {
        let patches = self.lock();
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let tmp = NamedTempFile::new_in(&dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, &*patches)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        let _ = tmp.persist(&self.path).map_err(|e| e.error)?;

        let count = patches.len();
        let path = self.path.display().to_string();
        debug!("Persisted {count} overrides to {path}");
        Ok(())
    }
}

fn load_patches(path: &Path) -> Patches {
    let shown = path.display().to_string();
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No override file at {shown}, starting empty");
            return Patches::new();
        }
        Err(e) => {
            let reason = e.to_string();
            warn!("Cannot read override file {shown}, starting empty: {reason}");
            return Patches::new();
        }
    };
    if text.trim().is_empty() {
        return Patches::new();
    }
    match serde_json::from_str::<BTreeMap<String, BTreeMap<String, Value>>>(&text) {
        Ok(raw) => raw
            .into_iter()
            .map(|(id, fields)| {
                let patch = fields
                    .into_iter()
                    .filter_map(|(field, value)| value_text(value).map(|v| (field, v)))
                    .collect();
                (id, patch)
            })
            .collect(),
        Err(e) => {
            let reason = e.to_string();
            warn!("Override file {shown} is corrupt, starting empty: {reason}");
            Patches::new()
        }
    }
}

fn value_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(pairs: &[(&str, &str)]) -> Patch {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_missing_file_starts_empty() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = OverrideStore::open(dir.path().join("overrides.json"));
        assert!(store.get_patch("R-1").is_empty());
        assert!(store.ids().is_empty());
        Ok(())
    }

    #[test]
    fn test_corrupt_file_starts_empty() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("overrides.json");
        fs::write(&path, "{ not json")?;
        let store = OverrideStore::open(&path);
        assert!(store.ids().is_empty());

        fs::write(&path, "[1, 2, 3]")?;
        assert!(OverrideStore::open(&path).ids().is_empty());
        Ok(())
    }

    #[test]
    fn test_set_patch_merges_and_survives_reopen() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("overrides.json");

        let store = OverrideStore::open(&path);
        store.set_patch("R-1", patch(&[("Cliente", "Acme"), ("Marca", "X")]))?;
        store.set_patch("R-1", patch(&[("Marca", "Y")]))?;

        let reopened = OverrideStore::open(&path);
        assert_eq!(reopened.get_patch("R-1"), patch(&[("Cliente", "Acme"), ("Marca", "Y")]));
        Ok(())
    }

    #[test]
    fn test_legacy_field_migrates_on_read() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("overrides.json");
        fs::write(
            &path,
            r#"{"R-1": {"OBsElectronico": "ok", "Horas": 3}, "R-2": {"OBsElectronico": "old", "OBsElectrónico": "new"}}"#,
        )?;
        let store = OverrideStore::open(&path);

        assert_eq!(store.get_patch("R-1"), patch(&[("OBsElectrónico", "ok"), ("Horas", "3")]));
        // already migrated: legacy key left as is
        assert_eq!(store.get_patch("R-2").get("OBsElectrónico").map(String::as_str), Some("new"));
        Ok(())
    }

    #[test]
    fn test_incoming_legacy_field_is_stored_under_current_name() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = OverrideStore::open(dir.path().join("overrides.json"));
        store.set_patch("R-1", patch(&[("OBsElectrónico", "first")]))?;
        store.set_patch("R-1", patch(&[("OBsElectronico", "second")]))?;
        assert_eq!(store.get_patch("R-1"), patch(&[("OBsElectrónico", "second")]));
        Ok(())
    }
}
