// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Logical field name to physical column, driven by the sheet's header row.

use std::sync::LazyLock;
use std::time::Duration;

use diagnostics::*;
use regex::Regex;

pub use remote::a1::{index_to_letter, letter_to_index};

use crate::error::Result;
use crate::source::SheetSource;
use crate::ttl::TtlCell;

#[allow(clippy::unwrap_used)]
static RANGE_COLUMN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!([A-Z]+)2:([A-Z]+)?").unwrap());

/// Where a logical field lives in the data tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    /// Zero-based column index
    pub index: usize,
    pub letter: String,
    /// Data cells of the column, e.g. `Reportes!C2:C`
    pub range: String,
}

pub struct ColumnResolver {
    source: SheetSource,
    tab: String,
    default_range: String,
    headers: TtlCell<Vec<String>>,
}

impl ColumnResolver {
    pub fn new<T: Into<String>, R: Into<String>>(
        source: SheetSource,
        tab: T,
        default_range: R,
        ttl: Duration,
    ) -> Self {
        Self {
            source,
            tab: tab.into(),
            default_range: default_range.into(),
            headers: TtlCell::new(ttl),
        }
    }

    pub fn tab(&self) -> &str {
        &self.tab
    }

    pub fn source(&self) -> &SheetSource {
        &self.source
    }

    /// Header row, served from cache while fresh.
    pub fn headers(&self) -> Result<Vec<String>> {
        self.load_headers(false)
    }

    pub fn refresh_headers(&self) -> Result<Vec<String>> {
        self.load_headers(true)
    }

    fn load_headers(&self, force: bool) -> Result<Vec<String>> {
        self.headers.get_or_refresh(force, || {
            let range = format!("{}!A1:ZZ1", self.tab);
            debug!("Loading header row from {range}");
            let rows = self.source.values(&range)?;
            let headers: Vec<String> = rows
                .into_iter()
                .next()
                .unwrap_or_default()
                .into_iter()
                .map(|h| h.trim().to_string())
                .collect();
            let count = headers.len();
            debug!("Header row has {count} columns");
            Ok(headers)
        })
    }

    pub fn column_range(&self, letter: &str) -> String {
        format!("{}!{letter}2:{letter}", self.tab)
    }

    /// Locate `logical_name` in the header row.
    ///
    /// Unknown names fall back to the column of the configured default range,
    /// then to column A.
    pub fn resolve_column(&self, logical_name: &str) -> Result<ColumnRef> {
        let headers = self.headers()?;
        let wanted = logical_name.trim();
        let index = match headers.iter().position(|h| h == wanted) {
            Some(index) => index,
            None => {
                let fallback = self.default_column();
                let letter = index_to_letter(fallback);
                debug!("Column {wanted} not in headers, using {letter}");
                fallback
            }
        };
        let letter = index_to_letter(index);
        Ok(ColumnRef {
            index,
            range: self.column_range(&letter),
            letter,
        })
    }

    fn default_column(&self) -> usize {
        RANGE_COLUMN
            .captures(&self.default_range)
            .and_then(|c| c.get(1))
            .and_then(|m| letter_to_index(m.as_str()))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remote::memory::MemorySheets;
    use remote::{RetryExecutor, RetryPolicy};
    use std::sync::Arc;

    fn resolver(sheets: Arc<MemorySheets>, default_range: &str) -> ColumnResolver {
        let source = SheetSource::new(sheets, RetryExecutor::new(RetryPolicy::immediate(2)), "sheet");
        ColumnResolver::new(source, "Reportes", default_range, Duration::from_secs(300))
    }

    fn sheets() -> Arc<MemorySheets> {
        let sheets = Arc::new(MemorySheets::new("Servicios"));
        sheets.set_tab(
            "Reportes",
            0,
            vec![vec!["Fecha", " ID_Reporte ", "Cliente"], vec!["2025-01-01", "R-1", "Acme"]],
        );
        sheets
    }

    #[test]
    fn test_resolves_header_position() -> Result<()> {
        let r = resolver(sheets(), "Reportes!A2:A");
        let col = r.resolve_column("ID_Reporte")?;
        assert_eq!(col.index, 1);
        assert_eq!(col.letter, "B");
        assert_eq!(col.range, "Reportes!B2:B");
        Ok(())
    }

    #[test]
    fn test_headers_are_cached() -> Result<()> {
        let sheets = sheets();
        let r = resolver(sheets.clone(), "Reportes!A2:A");
        let _ = r.resolve_column("ID_Reporte")?;
        let _ = r.resolve_column("Cliente")?;
        assert_eq!(sheets.values_calls(), 1);

        let _ = r.refresh_headers()?;
        assert_eq!(sheets.values_calls(), 2);
        Ok(())
    }

    #[test]
    fn test_unknown_name_uses_default_range() -> Result<()> {
        let r = resolver(sheets(), "Reportes!D2:D");
        let col = r.resolve_column("Nope")?;
        assert_eq!(col.index, 3);
        assert_eq!(col.range, "Reportes!D2:D");
        Ok(())
    }

    #[test]
    fn test_unparseable_default_range_uses_first_column() -> Result<()> {
        let r = resolver(sheets(), "whatever");
        let col = r.resolve_column("Nope")?;
        assert_eq!((col.index, col.letter.as_str()), (0, "A"));
        Ok(())
    }

    #[test]
    fn test_header_failure_propagates() {
        let sheets = sheets();
        sheets.fail_next(403);
        let r = resolver(sheets, "Reportes!A2:A");
        assert!(r.resolve_column("ID_Reporte").is_err());
    }
}
