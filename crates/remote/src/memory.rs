// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory implementations of the remote services.
//!
//! These behave like the real services for the calls this workspace makes:
//! ragged rows, trailing-cell trimming, store-order listings, duplicate names
//! under one parent. Failures can be queued by HTTP status to exercise retry
//! and degradation paths.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use crate::a1::RangeRef;
use crate::error::{RemoteError, Result};
use crate::hierarchy::{FOLDER_MIME, HierarchicalStore, RemoteObject, SHORTCUT_MIME, ShortcutDetails};
use crate::query::{ObjectKind, Query};
use crate::tabular::{SheetProperties, SpreadsheetMeta, TabularService, ValueRows};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
struct SheetsState {
    title: String,
    tabs: BTreeMap<String, (i64, ValueRows)>,
    failures: VecDeque<u16>,
    values_calls: usize,
    meta_calls: usize,
}

/// Spreadsheet held in memory. Row 1 of each tab is `rows[0]`.
#[derive(Default)]
pub struct MemorySheets {
    state: Mutex<SheetsState>,
}

impl MemorySheets {
    pub fn new(title: &str) -> Self {
        Self {
            state: Mutex::new(SheetsState {
                title: title.to_string(),
                ..Default::default()
            }),
        }
    }

    /// Replace the whole content of tab `title`, creating it with `sheet_id` if missing.
    pub fn set_tab(&self, title: &str, sheet_id: i64, rows: Vec<Vec<&str>>) {
        let rows = rows
            .into_iter()
            .map(|r| r.into_iter().map(str::to_string).collect())
            .collect();
        lock(&self.state)
            .tabs
            .insert(title.to_string(), (sheet_id, rows));
    }

    /// Make the next call (of any kind) fail with `status`.
    pub fn fail_next(&self, status: u16) {
        lock(&self.state).failures.push_back(status);
    }

    pub fn values_calls(&self) -> usize {
        lock(&self.state).values_calls
    }

    pub fn meta_calls(&self) -> usize {
        lock(&self.state).meta_calls
    }
}

fn take_failure(failures: &mut VecDeque<u16>, what: &str) -> Result<()> {
    match failures.pop_front() {
        Some(status) => Err(RemoteError::http(status, what, "injected failure")),
        None => Ok(()),
    }
}

impl TabularService for MemorySheets {
    fn values_get(&self, _spreadsheet_id: &str, range: &str) -> Result<ValueRows> {
        let mut state = lock(&self.state);
        state.values_calls += 1;
        take_failure(&mut state.failures, range)?;

        let parsed = RangeRef::parse(range)
            .ok_or_else(|| RemoteError::http(400, range, "Unable to parse range"))?;
        let (_, rows) = state
            .tabs
            .get(&parsed.sheet)
            .ok_or_else(|| RemoteError::http(400, range, "Unable to parse range"))?;

        let end = parsed.end.unwrap_or(parsed.start);
        let first_row = parsed.start.row.unwrap_or(1).max(1) - 1;
        let last_row = end.row.map(|r| r.saturating_sub(1));
        let first_col = parsed.start.column.unwrap_or(0);
        let last_col = end.column;

        let mut out: ValueRows = Vec::new();
        for (i, row) in rows.iter().enumerate().skip(first_row) {
            if last_row.is_some_and(|last| i > last) {
                break;
            }
            let mut cells: Vec<String> = row
                .iter()
                .enumerate()
                .filter(|(c, _)| *c >= first_col && last_col.is_none_or(|last| *c <= last))
                .map(|(_, v)| v.clone())
                .collect();
            while cells.last().is_some_and(|c| c.is_empty()) {
                cells.pop();
            }
            out.push(cells);
        }
        while out.last().is_some_and(|r| r.is_empty()) {
            out.pop();
        }
        Ok(out)
    }

    fn spreadsheet_meta(&self, _spreadsheet_id: &str) -> Result<SpreadsheetMeta> {
        let mut state = lock(&self.state);
        state.meta_calls += 1;
        take_failure(&mut state.failures, "spreadsheets.get")?;
        Ok(SpreadsheetMeta {
            title: state.title.clone(),
            sheets: state
                .tabs
                .iter()
                .map(|(title, (sheet_id, _))| SheetProperties {
                    sheet_id: *sheet_id,
                    title: title.clone(),
                })
                .collect(),
        })
    }
}

struct Stored {
    object: RemoteObject,
    content: Vec<u8>,
}

/// Counts of calls made against a [`MemoryDrive`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveCalls {
    pub list: usize,
    pub create_folder: usize,
    pub create_file: usize,
    pub update: usize,
    pub delete: usize,
    pub get: usize,
    pub download: usize,
}

#[derive(Default)]
struct DriveState {
    objects: Vec<Stored>,
    next_id: u64,
    failures: VecDeque<u16>,
    delete_failure: Option<u16>,
    calls: DriveCalls,
}

impl DriveState {
    fn insert(&mut self, object: RemoteObject, content: Vec<u8>) -> String {
        self.next_id += 1;
        let id = format!("obj-{:04}", self.next_id);
        let mut object = object;
        object.id = id.clone();
        self.objects.push(Stored { object, content });
        id
    }

    fn find(&self, id: &str) -> Option<&Stored> {
        self.objects.iter().find(|s| s.object.id == id)
    }
}

/// Folder/file store held in memory. Listing order is insertion order.
#[derive(Default)]
pub struct MemoryDrive {
    state: Mutex<DriveState>,
}

impl MemoryDrive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a folder without any duplicate check, for test setup.
    pub fn insert_folder(&self, parent_id: &str, name: &str) -> String {
        lock(&self.state).insert(
            RemoteObject {
                name: name.to_string(),
                mime_type: FOLDER_MIME.to_string(),
                parents: vec![parent_id.to_string()],
                ..Default::default()
            },
            Vec::new(),
        )
    }

    /// Add a file without any duplicate check, for test setup.
    pub fn insert_file(&self, parent_id: &str, name: &str, mime_type: &str, content: &[u8]) -> String {
        lock(&self.state).insert(
            RemoteObject {
                name: name.to_string(),
                mime_type: mime_type.to_string(),
                parents: vec![parent_id.to_string()],
                ..Default::default()
            },
            content.to_vec(),
        )
    }

    pub fn insert_shortcut(&self, parent_id: &str, name: &str, target_id: &str) -> String {
        lock(&self.state).insert(
            RemoteObject {
                name: name.to_string(),
                mime_type: SHORTCUT_MIME.to_string(),
                parents: vec![parent_id.to_string()],
                shortcut_details: Some(ShortcutDetails {
                    target_id: Some(target_id.to_string()),
                }),
                ..Default::default()
            },
            Vec::new(),
        )
    }

    /// Direct children of `parent_id`, in insertion order.
    pub fn children(&self, parent_id: &str) -> Vec<RemoteObject> {
        lock(&self.state)
            .objects
            .iter()
            .filter(|s| s.object.parents.iter().any(|p| p == parent_id))
            .map(|s| s.object.clone())
            .collect()
    }

    /// Children of `parent_id` called `name`.
    pub fn named(&self, parent_id: &str, name: &str) -> Vec<RemoteObject> {
        self.children(parent_id)
            .into_iter()
            .filter(|o| o.name == name)
            .collect()
    }

    pub fn content(&self, id: &str) -> Option<Vec<u8>> {
        lock(&self.state).find(id).map(|s| s.content.clone())
    }

    pub fn len(&self) -> usize {
        lock(&self.state).objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make the next call (of any kind) fail with `status`.
    pub fn fail_next(&self, status: u16) {
        lock(&self.state).failures.push_back(status);
    }

    /// Make every delete fail with `status` until cleared with `None`.
    pub fn fail_deletes(&self, status: Option<u16>) {
        lock(&self.state).delete_failure = status;
    }

    pub fn calls(&self) -> DriveCalls {
        lock(&self.state).calls
    }
}

impl HierarchicalStore for MemoryDrive {
    fn list(&self, query: &Query, page_size: u32) -> Result<Vec<RemoteObject>> {
        let mut state = lock(&self.state);
        state.calls.list += 1;
        take_failure(&mut state.failures, "files.list")?;
        Ok(state
            .objects
            .iter()
            .map(|s| &s.object)
            .filter(|o| o.name == query.name())
            .filter(|o| o.parents.iter().any(|p| p == query.parent_id()))
            .filter(|o| query.kind() == ObjectKind::Any || o.is_folder())
            .take(page_size as usize)
            .cloned()
            .collect())
    }

    fn create_folder(&self, parent_id: &str, name: &str) -> Result<String> {
        {
            let mut state = lock(&self.state);
            state.calls.create_folder += 1;
            take_failure(&mut state.failures, "files.create")?;
        }
        Ok(self.insert_folder(parent_id, name))
    }

    fn create_file(&self, parent_id: &str, name: &str, mime_type: &str, content: &[u8]) -> Result<String> {
        {
            let mut state = lock(&self.state);
            state.calls.create_file += 1;
            take_failure(&mut state.failures, "files.create")?;
        }
        Ok(self.insert_file(parent_id, name, mime_type, content))
    }

    fn update_content(&self, file_id: &str, mime_type: &str, content: &[u8]) -> Result<()> {
        let mut state = lock(&self.state);
        state.calls.update += 1;
        take_failure(&mut state.failures, "files.update")?;
        let stored = state
            .objects
            .iter_mut()
            .find(|s| s.object.id == file_id)
            .ok_or_else(|| RemoteError::http(404, file_id, "File not found"))?;
        stored.object.mime_type = mime_type.to_string();
        stored.content = content.to_vec();
        Ok(())
    }

    fn delete(&self, object_id: &str) -> Result<()> {
        let mut state = lock(&self.state);
        state.calls.delete += 1;
        take_failure(&mut state.failures, "files.delete")?;
        if let Some(status) = state.delete_failure {
            return Err(RemoteError::http(status, object_id, "delete refused"));
        }
        let before = state.objects.len();
        state.objects.retain(|s| s.object.id != object_id);
        if state.objects.len() == before {
            return Err(RemoteError::http(404, object_id, "File not found"));
        }
        Ok(())
    }

    fn get(&self, object_id: &str) -> Result<RemoteObject> {
        let mut state = lock(&self.state);
        state.calls.get += 1;
        take_failure(&mut state.failures, "files.get")?;
        state
            .find(object_id)
            .map(|s| s.object.clone())
            .ok_or_else(|| RemoteError::http(404, object_id, "File not found"))
    }

    fn download(&self, file_id: &str) -> Result<Vec<u8>> {
        let mut state = lock(&self.state);
        state.calls.download += 1;
        take_failure(&mut state.failures, "files.get_media")?;
        state
            .find(file_id)
            .map(|s| s.content.clone())
            .ok_or_else(|| RemoteError::http(404, file_id, "File not found"))
    }
}
