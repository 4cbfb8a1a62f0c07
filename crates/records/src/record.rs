// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field-name to value overrides for one record.
pub type Patch = BTreeMap<String, String>;

/// One spreadsheet row keyed by header name.
///
/// Missing fields read as the empty string, so callers never have to tell
/// "absent" apart from "blank".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zip a header row with a data row. Short rows pad with "".
    pub fn from_row(headers: &[String], row: &[String]) -> Self {
        let fields = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), remote::cell(row, i).to_string()))
            .collect();
        Self { fields }
    }

    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Absent, empty, or whitespace only.
    pub fn is_blank(&self, field: &str) -> bool {
        self.get(field).trim().is_empty()
    }

    pub fn set<K: Into<String>, V: Into<String>>(&mut self, field: K, value: V) {
        let _ = self.fields.insert(field.into(), value.into());
    }

    /// Set `field` only when it is blank. Returns whether a value was written.
    pub fn fill_blank(&mut self, field: &str, value: &str) -> bool {
        if value.is_empty() || !self.is_blank(field) {
            return false;
        }
        self.set(field, value);
        true
    }

    /// Unconditionally overlay every entry of `patch`.
    pub fn apply(&mut self, patch: &Patch) {
        for (field, value) in patch {
            self.set(field.as_str(), value.as_str());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
