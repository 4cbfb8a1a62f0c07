// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Client catalog: a secondary tab keyed by client identifier, loaded whole.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use diagnostics::*;

use crate::error::Result;
use crate::record::Record;
use crate::source::SheetSource;
use crate::ttl::TtlCell;

pub const DEFAULT_CATALOG_TAB: &str = "Clientes";
pub const CLIENT_ID_FIELD: &str = "ID_Cliente";

pub const NAME_FIELD: &str = "NombreCliente";
pub const ADDRESS_FIELD: &str = "Direccion";
pub const CONTACT_FIELD: &str = "CorreoAutorizado";
pub const ROUND_FIELD: &str = "RondaSeleccionadaCliente";
pub const REPORTS_URL_FIELD: &str = "URL_Reportes";

/// How to find the catalog tab: explicit title first, then numeric tab id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogTab {
    pub title: Option<String>,
    pub sheet_id: Option<i64>,
}

/// One catalog row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogRecord {
    fields: Record,
}

impl CatalogRecord {
    pub fn new(fields: Record) -> Self {
        Self { fields }
    }

    pub fn client_id(&self) -> &str {
        self.fields.get(CLIENT_ID_FIELD).trim()
    }

    pub fn name(&self) -> &str {
        self.fields.get(NAME_FIELD)
    }

    pub fn address(&self) -> &str {
        self.fields.get(ADDRESS_FIELD)
    }

    pub fn authorized_contact(&self) -> &str {
        self.fields.get(CONTACT_FIELD)
    }

    pub fn round(&self) -> &str {
        self.fields.get(ROUND_FIELD)
    }

    pub fn reports_url(&self) -> &str {
        self.fields.get(REPORTS_URL_FIELD)
    }

    pub fn fields(&self) -> &Record {
        &self.fields
    }
}

/// Loaded catalog contents.
#[derive(Debug, Default)]
pub struct CatalogSnapshot {
    pub tab: String,
    pub headers: Vec<String>,
    pub by_id: HashMap<String, CatalogRecord>,
}

pub struct CatalogStore {
    source: SheetSource,
    tab: CatalogTab,
    cache: TtlCell<Arc<CatalogSnapshot>>,
}

impl CatalogStore {
    pub fn new(source: SheetSource, tab: CatalogTab, ttl: Duration) -> Self {
        Self {
            source,
            tab,
            cache: TtlCell::new(ttl),
        }
    }

    /// Title of the catalog tab. A failed metadata lookup falls back to the default.
    pub fn resolve_tab_title(&self) -> String {
        if let Some(title) = self.tab.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            return title.to_string();
        }
        if let Some(sheet_id) = self.tab.sheet_id {
            match self.source.meta() {
                Ok(meta) => {
                    if let Some(title) = meta.title_by_id(sheet_id) {
                        return title.to_string();
                    }
                    warn!("No tab with id {sheet_id}, using {DEFAULT_CATALOG_TAB}");
                }
                Err(e) => {
                    let reason = e.to_string();
                    warn!("Tab lookup for id {sheet_id} failed, using {DEFAULT_CATALOG_TAB}: {reason}");
                }
            }
        }
        DEFAULT_CATALOG_TAB.to_string()
    }

    /// Catalog entry for `client_id`.
    ///
    /// A failed load caches an empty catalog for the full TTL, so lookups
    /// during an outage degrade to `None` instead of reloading per record.
    pub fn get_by_client_id(&self, client_id: &str) -> Option<CatalogRecord> {
        let key = client_id.trim();
        if key.is_empty() {
            return None;
        }
        let Ok(snapshot) = self.cache.get_or_refresh(false, || self.load_or_empty());
        snapshot.by_id.get(key).cloned()
    }

    /// Reload the whole tab regardless of age.
    pub fn refresh(&self) -> Result<Arc<CatalogSnapshot>> {
        self.cache.get_or_refresh(true, || self.load())
    }

    pub fn is_expired(&self) -> bool {
        self.cache.is_expired()
    }

    fn load_or_empty(&self) -> std::result::Result<Arc<CatalogSnapshot>, Infallible> {
        Ok(self.load().unwrap_or_else(|e| {
            let reason = e.to_string();
            warn!("Client catalog unavailable, continuing without it: {reason}");
            Arc::new(CatalogSnapshot::default())
        }))
    }

    fn load(&self) -> Result<Arc<CatalogSnapshot>> {
        let tab = self.resolve_tab_title();
        debug!("Loading client catalog from {tab}");
        let headers: Vec<String> = self
            .source
            .values(&format!("{tab}!A1:ZZ1"))?
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();
        let rows = self.source.values(&format!("{tab}!A2:ZZ"))?;

        let mut by_id = HashMap::new();
        if let Some(key_index) = headers.iter().position(|h| h == CLIENT_ID_FIELD) {
            for row in &rows {
                let key = remote::cell(row, key_index).trim();
                if key.is_empty() {
                    continue;
                }
                let record = CatalogRecord::new(Record::from_row(&headers, row));
                let _ = by_id.insert(key.to_string(), record);
            }
        } else {
            warn!("Catalog tab {tab} has no {CLIENT_ID_FIELD} column");
        }

        let count = by_id.len();
        debug!("Loaded {count} catalog entries from {tab}");
        Ok(Arc::new(CatalogSnapshot { tab, headers, by_id }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remote::memory::MemorySheets;
    use remote::{RetryExecutor, RetryPolicy};

    fn store(sheets: Arc<MemorySheets>, tab: CatalogTab) -> CatalogStore {
        let source = SheetSource::new(sheets, RetryExecutor::new(RetryPolicy::immediate(1)), "sheet");
        CatalogStore::new(source, tab, Duration::from_secs(300))
    }

    fn catalog_rows() -> Vec<Vec<&'static str>> {
        vec![
            vec!["ID_Cliente", "NombreCliente", "Direccion", "CorreoAutorizado"],
            vec!["C-1", "Acme Corp", "Calle 1", "ops@acme.test"],
            vec!["", "Sin id", "x"],
            vec![" C-2 ", "Beta"],
        ]
    }

    #[test]
    fn test_bulk_load_keyed_by_client_id() -> Result<()> {
        let sheets = Arc::new(MemorySheets::new("Servicios"));
        sheets.set_tab("Clientes", 7, catalog_rows());
        let s = store(sheets.clone(), CatalogTab::default());

        let acme = s.get_by_client_id("C-1").expect("C-1");
        assert_eq!(acme.name(), "Acme Corp");
        assert_eq!(acme.authorized_contact(), "ops@acme.test");
        assert_eq!(acme.round(), "");

        let beta = s.get_by_client_id("C-2").expect("C-2");
        assert_eq!(beta.client_id(), "C-2");
        assert_eq!(beta.address(), "");
        assert!(s.get_by_client_id("C-9").is_none());
        assert!(s.get_by_client_id("  ").is_none());

        // header + rows, once
        assert_eq!(sheets.values_calls(), 2);
        let _ = s.refresh()?;
        assert_eq!(sheets.values_calls(), 4);
        Ok(())
    }

    #[test]
    fn test_failed_load_is_cached_as_empty() -> Result<()> {
        let sheets = Arc::new(MemorySheets::new("Servicios"));
        sheets.set_tab("Clientes", 7, catalog_rows());
        let s = store(sheets.clone(), CatalogTab::default());

        sheets.fail_next(503);
        sheets.fail_next(503);
        assert!(s.get_by_client_id("C-1").is_none());
        let calls = sheets.values_calls();
        assert!(s.get_by_client_id("C-1").is_none());
        assert!(s.get_by_client_id("C-2").is_none());
        assert_eq!(sheets.values_calls(), calls);

        // an explicit refresh picks the catalog back up
        assert_eq!(s.refresh()?.by_id.len(), 2);
        assert!(s.get_by_client_id("C-1").is_some());
        Ok(())
    }

    #[test]
    fn test_tab_title_by_numeric_id() {
        let sheets = Arc::new(MemorySheets::new("Servicios"));
        sheets.set_tab("Mis Clientes", 42, catalog_rows());
        let s = store(
            sheets,
            CatalogTab {
                title: None,
                sheet_id: Some(42),
            },
        );
        assert_eq!(s.resolve_tab_title(), "Mis Clientes");
    }

    #[test]
    fn test_tab_title_precedence_and_fallback() {
        let sheets = Arc::new(MemorySheets::new("Servicios"));
        sheets.set_tab("Mis Clientes", 42, catalog_rows());

        let explicit = store(
            sheets.clone(),
            CatalogTab {
                title: Some("Otra".into()),
                sheet_id: Some(42),
            },
        );
        assert_eq!(explicit.resolve_tab_title(), "Otra");

        let unknown = store(
            sheets.clone(),
            CatalogTab {
                title: None,
                sheet_id: Some(99),
            },
        );
        assert_eq!(unknown.resolve_tab_title(), DEFAULT_CATALOG_TAB);

        sheets.fail_next(403);
        let failing = store(
            sheets,
            CatalogTab {
                title: None,
                sheet_id: Some(42),
            },
        );
        assert_eq!(failing.resolve_tab_title(), DEFAULT_CATALOG_TAB);
    }
}
