// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Idempotent folder creation and file upsert in a hierarchical store.
//!
//! Search-then-act is not atomic. Two writers racing on the same name may both
//! create; the next upsert keeps the first match and removes the others.

use std::sync::Arc;

use diagnostics::*;
use remote::{HierarchicalStore, Query, RemoteObject, RetryExecutor};
use serde::Serialize;

use crate::error::Result;
use crate::sanitize::sanitize_name;

/// Structural folder that logical paths may carry in front of the root.
pub const DEFAULT_PATH_PREFIX: &str = "04. Reportes";

const FOLDER_PAGE_SIZE: u32 = 1;
const UPSERT_PAGE_SIZE: u32 = 100;
const LOOKUP_PAGE_SIZE: u32 = 50;

/// A generated document to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl PlacedFile {
    pub fn new<N: Into<String>, M: Into<String>>(name: N, mime_type: M, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// What [`PathUpsertEngine::upsert_file`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpsertOutcome {
    pub file_id: String,
    /// Sanitized name the file is stored under
    pub name: String,
    pub created: bool,
    pub duplicates_removed: usize,
    pub duplicates_kept: usize,
}

enum UpsertState {
    Searching,
    Updating(Vec<RemoteObject>),
    CleaningDuplicates {
        file_id: String,
        duplicates: Vec<RemoteObject>,
    },
    Creating,
    Done(UpsertOutcome),
}

/// Every store call goes through the retry executor.
pub struct PathUpsertEngine {
    drive: Arc<dyn HierarchicalStore>,
    retry: RetryExecutor,
    prefix: String,
}

impl PathUpsertEngine {
    pub fn new(drive: Arc<dyn HierarchicalStore>, retry: RetryExecutor) -> Self {
        Self {
            drive,
            retry,
            prefix: DEFAULT_PATH_PREFIX.to_string(),
        }
    }

    pub fn with_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Id of the folder `name` under `parent_id`, created if missing.
    pub fn ensure_folder(&self, parent_id: &str, name: &str) -> Result<String> {
        let safe = sanitize_name(name);
        let query = Query::folder_named(parent_id, &safe);
        let found = self
            .retry
            .execute("files.list", || self.drive.list(&query, FOLDER_PAGE_SIZE))?;
        if let Some(folder) = found.into_iter().next() {
            return Ok(folder.id);
        }
        let id = self
            .retry
            .execute("files.create", || self.drive.create_folder(parent_id, &safe))?;
        info!("Created folder {safe} ({id}) under {parent_id}");
        Ok(id)
    }

    /// Walk `segments` from `root_id`, creating missing folders. Returns the last folder id.
    pub fn ensure_path<S: AsRef<str>>(&self, root_id: &str, segments: &[S]) -> Result<String> {
        let mut parent = root_id.to_string();
        for segment in segments {
            parent = self.ensure_folder(&parent, segment.as_ref())?;
        }
        Ok(parent)
    }

    /// Create or replace the file named `file.name` under `parent_id`.
    ///
    /// With several same-named files the first is updated and the rest are
    /// deleted. Failed deletes are logged and otherwise ignored.
    pub fn upsert_file(&self, parent_id: &str, file: &PlacedFile) -> Result<UpsertOutcome> {
        let name = sanitize_name(&file.name);
        let query = Query::any_named(parent_id, &name);
        let mut state = UpsertState::Searching;
        loop {
            state = match state {
                UpsertState::Searching => {
                    let mut matches = self
                        .retry
                        .execute("files.list", || self.drive.list(&query, UPSERT_PAGE_SIZE))?;
                    matches.retain(|o| !o.is_folder());
                    if matches.is_empty() {
                        UpsertState::Creating
                    } else {
                        UpsertState::Updating(matches)
                    }
                }
                UpsertState::Updating(matches) => {
                    let mut matches = matches.into_iter();
                    let Some(first) = matches.next() else {
                        state = UpsertState::Creating;
                        continue;
                    };
                    self.retry.execute("files.update", || {
                        self.drive.update_content(&first.id, &file.mime_type, &file.bytes)
                    })?;
                    let file_id = first.id;
                    info!("Updated {name} ({file_id}) under {parent_id}");

                    let duplicates: Vec<RemoteObject> = matches.collect();
                    if duplicates.is_empty() {
                        UpsertState::Done(UpsertOutcome {
                            file_id,
                            name: name.clone(),
                            created: false,
                            duplicates_removed: 0,
                            duplicates_kept: 0,
                        })
                    } else {
                        UpsertState::CleaningDuplicates { file_id, duplicates }
                    }
                }
                UpsertState::CleaningDuplicates { file_id, duplicates } => {
                    let mut removed = 0;
                    for duplicate in &duplicates {
                        let dup_id = duplicate.id.as_str();
                        match self.retry.execute("files.delete", || self.drive.delete(dup_id)) {
                            Ok(()) => removed += 1,
                            Err(e) => {
                                let reason = e.to_string();
                                warn!("Could not delete duplicate {name} ({dup_id}), keeping it: {reason}");
                            }
                        }
                    }
                    UpsertState::Done(UpsertOutcome {
                        file_id,
                        name: name.clone(),
                        created: false,
                        duplicates_removed: removed,
                        duplicates_kept: duplicates.len() - removed,
                    })
                }
                UpsertState::Creating => UpsertState::Done(self.create(parent_id, &name, file)?),
                UpsertState::Done(outcome) => break Ok(outcome),
            };
        }
    }

    fn create(&self, parent_id: &str, name: &str, file: &PlacedFile) -> Result<UpsertOutcome> {
        let file_id = self.retry.execute("files.create", || {
            self.drive
                .create_file(parent_id, name, &file.mime_type, &file.bytes)
        })?;
        info!("Created {name} ({file_id}) under {parent_id}");
        Ok(UpsertOutcome {
            file_id,
            name: name.to_string(),
            created: true,
            duplicates_removed: 0,
            duplicates_kept: 0,
        })
    }

    /// Locate the object a logical path names under `root_id`, without creating anything.
    ///
    /// Every segment but the last must be a folder; the last may be anything.
    /// The first match at each level wins.
    pub fn resolve_path(&self, root_id: &str, path: &str) -> Result<Option<String>> {
        let normalized = normalize_path(path, &self.prefix);
        let parts: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();
        if parts.is_empty() {
            return Ok(None);
        }

        let mut parent = root_id.to_string();
        for (i, part) in parts.iter().copied().enumerate() {
            let query = if i + 1 == parts.len() {
                Query::any_named(&parent, part)
            } else {
                Query::folder_named(&parent, part)
            };
            let found = self
                .retry
                .execute("files.list", || self.drive.list(&query, LOOKUP_PAGE_SIZE))?;
            match found.into_iter().next() {
                Some(object) => parent = object.id,
                None => {
                    debug!("Path segment {part} not found under {parent}");
                    return Ok(None);
                }
            }
        }
        Ok(Some(parent))
    }

    pub fn get(&self, object_id: &str) -> Result<RemoteObject> {
        Ok(self.retry.execute("files.get", || self.drive.get(object_id))?)
    }

    pub fn download(&self, file_id: &str) -> Result<Vec<u8>> {
        Ok(self
            .retry
            .execute("files.download", || self.drive.download(file_id))?)
    }
}

/// Unify separators, trim slashes, and drop everything up to and including
/// the structural `prefix` folder (case-insensitive).
pub fn normalize_path(path: &str, prefix: &str) -> String {
    let unified = path.replace('\\', "/");
    let trimmed = unified.trim().trim_matches('/');
    let prefix = prefix.trim().trim_matches('/');
    if prefix.is_empty() {
        return trimmed.to_string();
    }

    let key = format!("{}/", prefix.to_ascii_lowercase());
    let lower = trimmed.to_ascii_lowercase();
    let rest = if lower.starts_with(&key) {
        &trimmed[key.len()..]
    } else if let Some(at) = lower.find(&format!("/{key}")) {
        &trimmed[at + 1 + key.len()..]
    } else {
        trimmed
    };
    rest.trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_structural_prefix() {
        let p = DEFAULT_PATH_PREFIX;
        assert_eq!(normalize_path(".../04. Reportes/ClientX/R-1/photo.jpg", p), "ClientX/R-1/photo.jpg");
        assert_eq!(normalize_path("/04. reportes/ClientX/a.jpg", p), "ClientX/a.jpg");
        assert_eq!(normalize_path(r"Mi Unidad\04. Reportes\ClientX\a.jpg", p), "ClientX/a.jpg");
        assert_eq!(normalize_path(" ClientX/a.jpg/ ", p), "ClientX/a.jpg");
        assert_eq!(normalize_path("x04. Reportes/a.jpg", p), "x04. Reportes/a.jpg");
        assert_eq!(normalize_path("04. Reportes/a.jpg", ""), "04. Reportes/a.jpg");
    }
}
