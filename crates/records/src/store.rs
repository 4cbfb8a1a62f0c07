// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use diagnostics::*;

use crate::column::{ColumnRef, ColumnResolver};
use crate::error::Result;
use crate::record::Record;

/// Header of the identifier column in the data tab.
pub const DEFAULT_ID_FIELD: &str = "ID_Reporte";

/// Rows of the data tab, looked up by identifier.
///
/// The tab is an append-only log: an identifier may occur on several rows and
/// the last one is authoritative.
pub struct RecordStore {
    columns: Arc<ColumnResolver>,
    id_field: String,
}

impl RecordStore {
    pub fn new(columns: Arc<ColumnResolver>) -> Self {
        Self::with_id_field(columns, DEFAULT_ID_FIELD)
    }

    pub fn with_id_field<S: Into<String>>(columns: Arc<ColumnResolver>, id_field: S) -> Self {
        Self {
            columns,
            id_field: id_field.into(),
        }
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    pub fn columns(&self) -> &ColumnResolver {
        &self.columns
    }

    pub fn id_column(&self) -> Result<ColumnRef> {
        self.columns.resolve_column(&self.id_field)
    }

    /// The identifier column, trimmed, one entry per data row.
    ///
    /// Entry `i` belongs to sheet row `i + 2`. Blank rows stay in place as "".
    pub fn id_column_values(&self) -> Result<Vec<String>> {
        let column = self.id_column()?;
        let rows = self.columns.source().values(&column.range)?;
        Ok(rows
            .iter()
            .map(|row| remote::cell(row, 0).trim().to_string())
            .collect())
    }

    /// Every non-empty identifier, top to bottom, repeats included.
    pub fn all_ids(&self) -> Result<Vec<String>> {
        Ok(self
            .id_column_values()?
            .into_iter()
            .filter(|id| !id.is_empty())
            .collect())
    }

    /// The last row whose identifier equals `id`, zipped with the header row.
    pub fn get_by_id(&self, id: &str) -> Result<Option<Record>> {
        let wanted = id.trim();
        if wanted.is_empty() {
            return Ok(None);
        }
        let values = self.id_column_values()?;
        let Some(position) = values.iter().rposition(|v| v == wanted) else {
            debug!("Identifier {wanted} not found");
            return Ok(None);
        };
        let row_number = position + 2;
        debug!("Identifier {wanted} found at row {row_number}");

        let headers = self.columns.headers()?;
        let range = format!("{}!A{row_number}:ZZ{row_number}", self.columns.tab());
        let row = self
            .columns
            .source()
            .values(&range)?
            .into_iter()
            .next()
            .unwrap_or_default();

        let mut record = Record::from_row(&headers, &row);
        if record.is_blank(&self.id_field) {
            record.set(self.id_field.as_str(), wanted);
        }
        Ok(Some(record))
    }
}
