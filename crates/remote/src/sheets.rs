// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Sheets v4 implementation of [`TabularService`].

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::http::{Transport, join_segments};
use crate::tabular::{SheetProperties, SpreadsheetMeta, TabularService, ValueRows};

pub const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4";

const META_FIELDS: &str = "properties(title),sheets(properties(sheetId,title))";

/// Blocking Sheets API client
pub struct SheetsClient {
    transport: Transport,
    base_url: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct SpreadsheetResponse {
    #[serde(default)]
    properties: Option<TitleOnly>,
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct TitleOnly {
    #[serde(default)]
    title: String,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

impl SheetsClient {
    pub fn new(transport: Transport) -> Self {
        Self {
            transport,
            base_url: SHEETS_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> Result<url::Url> {
        join_segments(&self.base_url, &["spreadsheets", spreadsheet_id, "values", range])
    }

    fn meta_url(&self, spreadsheet_id: &str) -> Result<url::Url> {
        let mut url = join_segments(&self.base_url, &["spreadsheets", spreadsheet_id])?;
        url.query_pairs_mut().append_pair("fields", META_FIELDS);
        Ok(url)
    }
}

impl TabularService for SheetsClient {
    fn values_get(&self, spreadsheet_id: &str, range: &str) -> Result<ValueRows> {
        let url = self.values_url(spreadsheet_id, range)?;
        let body: ValueRange = self.transport.send_json(self.transport.get(url))?;
        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    fn spreadsheet_meta(&self, spreadsheet_id: &str) -> Result<SpreadsheetMeta> {
        let url = self.meta_url(spreadsheet_id)?;
        let body: SpreadsheetResponse = self.transport.send_json(self.transport.get(url))?;
        Ok(SpreadsheetMeta {
            title: body.properties.map(|p| p.title).unwrap_or_default(),
            sheets: body.sheets.into_iter().map(|s| s.properties).collect(),
        })
    }
}

/// Formatted values arrive as strings; anything else is rendered as JSON text.
fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
