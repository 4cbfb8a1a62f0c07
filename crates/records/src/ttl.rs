// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! A single cached value with a time-to-live.
//!
//! The slot is guarded by a mutex that stays held while a refresh runs, so
//! concurrent callers wait for one load instead of all hitting the remote
//! service.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

struct Entry<T> {
    value: T,
    loaded_at: Instant,
}

pub struct TtlCell<T> {
    ttl: Duration,
    slot: Mutex<Option<Entry<T>>>,
}

impl<T: Clone> TtlCell<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, Option<Entry<T>>> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn fresh(&self, entry: &Entry<T>) -> bool {
        entry.loaded_at.elapsed() < self.ttl
    }

    /// The cached value if it is younger than the TTL.
    pub fn get(&self) -> Option<T> {
        self.lock()
            .as_ref()
            .filter(|e| self.fresh(e))
            .map(|e| e.value.clone())
    }

    /// The cached value regardless of age.
    pub fn get_stale(&self) -> Option<T> {
        self.lock().as_ref().map(|e| e.value.clone())
    }

    /// True when nothing is cached or the cached value has outlived the TTL.
    pub fn is_expired(&self) -> bool {
        self.lock().as_ref().is_none_or(|e| !self.fresh(e))
    }

    pub fn set(&self, value: T) {
        *self.lock() = Some(Entry {
            value,
            loaded_at: Instant::now(),
        });
    }

    pub fn invalidate(&self) {
        *self.lock() = None;
    }

    /// Return the fresh cached value, or run `load` and cache its result.
    ///
    /// `force` skips the freshness check. A failed load leaves the previous
    /// value in place.
    pub fn get_or_refresh<E, F>(&self, force: bool, load: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let mut slot = self.lock();
        if !force {
            if let Some(entry) = slot.as_ref().filter(|e| self.fresh(e)) {
                return Ok(entry.value.clone());
            }
        }
        let value = load()?;
        *slot = Some(Entry {
            value: value.clone(),
            loaded_at: Instant::now(),
        });
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_fresh_value_is_served_without_loading() {
        let cell = TtlCell::new(Duration::from_secs(300));
        let loads = Cell::new(0);
        let load = || -> Result<u32, ()> {
            loads.set(loads.get() + 1);
            Ok(7)
        };

        assert_eq!(cell.get_or_refresh(false, load), Ok(7));
        assert_eq!(cell.get_or_refresh(false, load), Ok(7));
        assert_eq!(loads.get(), 1);
        assert!(!cell.is_expired());

        assert_eq!(cell.get_or_refresh(true, load), Ok(7));
        assert_eq!(loads.get(), 2);
    }

    #[test]
    fn test_zero_ttl_always_expires() {
        let cell = TtlCell::new(Duration::ZERO);
        cell.set("a".to_string());
        assert!(cell.is_expired());
        assert_eq!(cell.get(), None);
        assert_eq!(cell.get_stale().as_deref(), Some("a"));
    }

    #[test]
    fn test_failed_load_keeps_previous_value() {
        let cell = TtlCell::new(Duration::ZERO);
        cell.set(1);
        let result: Result<i32, &str> = cell.get_or_refresh(false, || Err("down"));
        assert_eq!(result, Err("down"));
        assert_eq!(cell.get_stale(), Some(1));

        cell.invalidate();
        assert_eq!(cell.get_stale(), None);
    }
}
