// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;

use crate::error::Result;
use crate::store::RecordStore;

const SAMPLE: usize = 5;

/// Diagnostic snapshot of the data tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetProbe {
    pub spreadsheet_title: String,
    pub tab: String,
    pub headers: Vec<String>,
    pub id_field: String,
    pub id_index: usize,
    pub id_letter: String,
    pub id_range: String,
    pub id_count: usize,
    pub first_ids: Vec<String>,
    pub last_ids: Vec<String>,
}

/// Read the title, a fresh header row and the identifier column.
pub fn probe(records: &RecordStore) -> Result<SheetProbe> {
    let columns = records.columns();
    let meta = columns.source().meta()?;
    let headers = columns.refresh_headers()?;
    let id_column = records.id_column()?;
    let ids = records.all_ids()?;

    Ok(SheetProbe {
        spreadsheet_title: meta.title,
        tab: columns.tab().to_string(),
        headers,
        id_field: records.id_field().to_string(),
        id_index: id_column.index,
        id_letter: id_column.letter,
        id_range: id_column.range,
        id_count: ids.len(),
        first_ids: ids.iter().take(SAMPLE).cloned().collect(),
        last_ids: ids[ids.len().saturating_sub(SAMPLE)..].to_vec(),
    })
}
