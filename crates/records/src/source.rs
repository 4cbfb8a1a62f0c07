// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use remote::{RetryExecutor, SpreadsheetMeta, TabularService, ValueRows};

use crate::error::Result;

/// One spreadsheet behind a tabular service, with every read retried.
#[derive(Clone)]
pub struct SheetSource {
    service: Arc<dyn TabularService>,
    retry: RetryExecutor,
    spreadsheet_id: String,
}

impl SheetSource {
    pub fn new<S: Into<String>>(service: Arc<dyn TabularService>, retry: RetryExecutor, spreadsheet_id: S) -> Self {
        Self {
            service,
            retry,
            spreadsheet_id: spreadsheet_id.into(),
        }
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn values(&self, range: &str) -> Result<ValueRows> {
        Ok(self
            .retry
            .execute("values.get", || self.service.values_get(&self.spreadsheet_id, range))?)
    }

    pub fn meta(&self) -> Result<SpreadsheetMeta> {
        Ok(self
            .retry
            .execute("spreadsheets.get", || self.service.spreadsheet_meta(&self.spreadsheet_id))?)
    }
}
