// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use diagnostics::*;

use crate::catalog::{
    ADDRESS_FIELD, CONTACT_FIELD, CatalogRecord, CatalogStore, NAME_FIELD, REPORTS_URL_FIELD, ROUND_FIELD,
};
use crate::error::Result;
use crate::overrides::OverrideStore;
use crate::record::Record;
use crate::store::RecordStore;

/// Record field holding the foreign key into the catalog.
pub const CLIENT_LINK_FIELD: &str = "ID_Cliente";

/// Catalog field copied into a blank record field: (catalog, record).
pub const CATALOG_FILLS: [(&str, &str); 5] = [
    (NAME_FIELD, "Cliente"),
    (ADDRESS_FIELD, "Direccion"),
    (CONTACT_FIELD, "CorreoAutorizado"),
    (ROUND_FIELD, "Ronda"),
    (REPORTS_URL_FIELD, "URL_Reportes"),
];

/// Merges a data row, its catalog entry and local overrides into one record.
///
/// Precedence is override, then catalog fill, then the raw row. Catalog values
/// only ever fill blank fields.
pub struct RecordResolver {
    records: Arc<RecordStore>,
    catalog: Arc<CatalogStore>,
    overrides: Arc<OverrideStore>,
}

impl RecordResolver {
    pub fn new(records: Arc<RecordStore>, catalog: Arc<CatalogStore>, overrides: Arc<OverrideStore>) -> Self {
        Self {
            records,
            catalog,
            overrides,
        }
    }

    pub fn records(&self) -> &Arc<RecordStore> {
        &self.records
    }

    pub fn overrides(&self) -> &Arc<OverrideStore> {
        &self.overrides
    }

    pub fn resolve(&self, id: &str) -> Result<Option<Record>> {
        let Some(mut record) = self.records.get_by_id(id)? else {
            return Ok(None);
        };

        let client_id = record.get(CLIENT_LINK_FIELD).trim().to_string();
        if !client_id.is_empty() {
            match self.catalog.get_by_client_id(&client_id) {
                Some(entry) => {
                    let filled = fill_from_catalog(&mut record, &entry);
                    debug!("Filled {filled} fields of {id} from catalog entry {client_id}");
                }
                None => debug!("No catalog entry for {client_id}"),
            }
        }

        let patch = self.overrides.get_patch(id.trim());
        record.apply(&patch);
        Ok(Some(record))
    }
}

/// Copy catalog defaults into blank record fields. Returns how many were filled.
pub fn fill_from_catalog(record: &mut Record, entry: &CatalogRecord) -> usize {
    CATALOG_FILLS
        .iter()
        .filter(|(from, to)| record.fill_blank(to, entry.fields().get(from)))
        .count()
}
