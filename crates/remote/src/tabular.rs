// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Tabular service boundary: values addressed by `SheetTitle!A1:ZZ` range expressions.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Rows returned for a range. Trailing empty cells and rows may be missing.
pub type ValueRows = Vec<Vec<String>>;

/// One tab inside a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    pub sheet_id: i64,
    pub title: String,
}

/// Spreadsheet-level metadata used for tab lookup by numeric id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpreadsheetMeta {
    pub title: String,
    pub sheets: Vec<SheetProperties>,
}

impl SpreadsheetMeta {
    /// Title of the tab whose numeric id is `sheet_id`.
    pub fn title_by_id(&self, sheet_id: i64) -> Option<&str> {
        self.sheets
            .iter()
            .find(|s| s.sheet_id == sheet_id)
            .map(|s| s.title.as_str())
    }
}

/// Read access to a spreadsheet service. Each method is exactly one remote call.
pub trait TabularService: Send + Sync {
    /// Read the cells of `range` in spreadsheet `spreadsheet_id`.
    fn values_get(&self, spreadsheet_id: &str, range: &str) -> Result<ValueRows>;

    /// Read the spreadsheet title and the list of tabs.
    fn spreadsheet_meta(&self, spreadsheet_id: &str) -> Result<SpreadsheetMeta>;
}

/// Cell `index` of `row`, or "" for ragged rows.
pub fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}
