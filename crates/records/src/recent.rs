// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use diagnostics::*;

use crate::error::Result;
use crate::record::Record;
use crate::resolver::RecordResolver;
use crate::ttl::TtlCell;

/// One resolved identifier in the recent list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentEntry {
    pub id: String,
    pub record: Record,
}

impl RecentEntry {
    /// `NombreEquipo`, or else `Marca Modelo`.
    pub fn display_name(&self) -> String {
        let name = self.record.get("NombreEquipo").trim();
        if !name.is_empty() {
            return name.to_string();
        }
        [self.record.get("Marca").trim(), self.record.get("Modelo").trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn client(&self) -> &str {
        self.record.get("Cliente").trim()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentList {
    pub entries: Vec<RecentEntry>,
    /// Served from an older cached scan because a fresh one failed
    pub stale: bool,
}

#[derive(Clone)]
struct Scan {
    n: usize,
    entries: Vec<RecentEntry>,
}

/// Most recent unique identifiers, each resolved, cached for a TTL.
pub struct RecentIndexCache {
    resolver: Arc<RecordResolver>,
    cache: TtlCell<Scan>,
}

impl RecentIndexCache {
    pub fn new(resolver: Arc<RecordResolver>, ttl: Duration) -> Self {
        Self {
            resolver,
            cache: TtlCell::new(ttl),
        }
    }

    pub fn get_recent(&self, n: usize, force_refresh: bool) -> Result<RecentList> {
        if !force_refresh {
            if let Some(scan) = self.cache.get().filter(|s| s.n == n) {
                return Ok(RecentList {
                    entries: scan.entries,
                    stale: false,
                });
            }
        }

        match self.scan(n) {
            Ok(entries) => {
                self.cache.set(Scan {
                    n,
                    entries: entries.clone(),
                });
                Ok(RecentList { entries, stale: false })
            }
            Err(e) => match self.cache.get_stale() {
                Some(previous) => {
                    let reason = e.to_string();
                    warn!("Recent list refresh failed, serving cached list: {reason}");
                    let mut entries = previous.entries;
                    entries.truncate(n);
                    Ok(RecentList { entries, stale: true })
                }
                None => Err(e),
            },
        }
    }

    fn scan(&self, n: usize) -> Result<Vec<RecentEntry>> {
        let ids = self.resolver.records().all_ids()?;
        let recent = recent_ids(&ids, n);
        let count = recent.len();
        debug!("Resolving {count} recent identifiers");

        let mut entries = Vec::with_capacity(recent.len());
        for id in recent {
            if let Some(record) = self.resolver.resolve(&id)? {
                entries.push(RecentEntry { id, record });
            }
        }
        Ok(entries)
    }
}

/// Up to `n` unique identifiers, newest (bottom of the column) first.
pub fn recent_ids(ids: &[String], n: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for id in ids.iter().rev() {
        if out.len() >= n {
            break;
        }
        if id.is_empty() || !seen.insert(id.as_str()) {
            continue;
        }
        out.push(id.clone());
    }
    out
}
