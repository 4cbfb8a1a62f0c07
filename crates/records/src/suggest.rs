// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::store::RecordStore;
use crate::ttl::TtlCell;

pub const DEFAULT_SUGGESTION_LIMIT: usize = 20;

/// Identifier autocomplete over a cached copy of the identifier column.
pub struct IdSuggester {
    records: Arc<RecordStore>,
    ids: TtlCell<Arc<Vec<String>>>,
}

impl IdSuggester {
    pub fn new(records: Arc<RecordStore>, ttl: Duration) -> Self {
        Self {
            records,
            ids: TtlCell::new(ttl),
        }
    }

    pub fn suggest(&self, query: &str) -> Result<Vec<String>> {
        let ids = self
            .ids
            .get_or_refresh(false, || self.records.all_ids().map(Arc::new))?;
        Ok(rank(&ids, query, DEFAULT_SUGGESTION_LIMIT))
    }
}

/// Newest first: prefix matches, then substring matches, case-insensitive.
pub fn rank(ids: &[String], query: &str, limit: usize) -> Vec<String> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return Vec::new();
    }

    let mut prefix = Vec::new();
    let mut contains = Vec::new();
    let mut seen = HashSet::new();
    for id in ids.iter().rev() {
        if !seen.insert(id.as_str()) {
            continue;
        }
        let lower = id.to_lowercase();
        if lower.starts_with(&q) {
            prefix.push(id.clone());
        } else if lower.contains(&q) {
            contains.push(id.clone());
        }
    }
    prefix.into_iter().chain(contains).take(limit).collect()
}
