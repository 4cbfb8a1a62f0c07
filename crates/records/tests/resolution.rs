// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use records::{
    CatalogStore, CatalogTab, ColumnResolver, IdSuggester, OverrideStore, Patch, RecentIndexCache, RecordResolver,
    RecordStore, SheetSource, probe,
};
use remote::memory::MemorySheets;
use remote::{RetryExecutor, RetryPolicy};
use tempfile::TempDir;

const TTL: Duration = Duration::from_secs(300);

struct Fixture {
    sheets: Arc<MemorySheets>,
    records: Arc<RecordStore>,
    overrides: Arc<OverrideStore>,
    resolver: Arc<RecordResolver>,
    _dir: TempDir,
}

fn report_rows() -> Vec<Vec<&'static str>> {
    vec![
        vec!["ID_Reporte", "ID_Cliente", "Cliente", "Marca", "Direccion"],
        vec!["R-001", "C-1", "", "Grundfos"],
        vec!["R-002", "", "Beta", "Pedrollo"],
        vec!["R-003", "C-1", "", "Evans"],
        // sheet row 5
        vec!["R-100", "C-1", "Acme", "Old", "Calle Vieja"],
        vec!["R-004"],
        vec![],
        vec!["R-002", "", "Beta", "Pedrollo 2"],
        // sheet row 9
        vec![" R-100 ", "C-1", "", "New", "Calle Propia"],
    ]
}

fn catalog_rows() -> Vec<Vec<&'static str>> {
    vec![
        vec!["ID_Cliente", "NombreCliente", "Direccion", "RondaSeleccionadaCliente"],
        vec!["C-1", "Acme Catalog", "Calle Catalogo", "Ronda 3"],
    ]
}

fn fixture_with(catalog_tab: CatalogTab) -> Result<Fixture> {
    let sheets = Arc::new(MemorySheets::new("Servicios"));
    sheets.set_tab("Reportes", 0, report_rows());
    sheets.set_tab("Clientes", 11, catalog_rows());

    let source = SheetSource::new(sheets.clone(), RetryExecutor::new(RetryPolicy::immediate(2)), "sheet-1");
    let columns = Arc::new(ColumnResolver::new(source.clone(), "Reportes", "Reportes!A2:A", TTL));
    let records = Arc::new(RecordStore::new(columns));
    let catalog = Arc::new(CatalogStore::new(source, catalog_tab, TTL));

    let dir = tempfile::tempdir()?;
    let overrides = Arc::new(OverrideStore::open(dir.path().join("overrides.json")));
    let resolver = Arc::new(RecordResolver::new(records.clone(), catalog, overrides.clone()));
    Ok(Fixture {
        sheets,
        records,
        overrides,
        resolver,
        _dir: dir,
    })
}

fn fixture() -> Result<Fixture> {
    fixture_with(CatalogTab::default())
}

fn patch(pairs: &[(&str, &str)]) -> Patch {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_last_matching_row_wins() -> Result<()> {
    let f = fixture()?;
    let record = f.records.get_by_id("R-100")?.expect("R-100 present");
    assert_eq!(record.get("Marca"), "New");
    assert_eq!(record.get("Cliente"), "");
    assert_eq!(record.get("ID_Reporte").trim(), "R-100");

    let record = f.records.get_by_id("R-002")?.expect("R-002 present");
    assert_eq!(record.get("Marca"), "Pedrollo 2");
    // ragged row: trailing cell missing
    assert_eq!(record.get("Direccion"), "");
    Ok(())
}

#[test]
fn test_unknown_and_blank_ids_are_not_found() -> Result<()> {
    let f = fixture()?;
    assert!(f.records.get_by_id("R-999")?.is_none());
    assert!(f.records.get_by_id("r-100")?.is_none());
    assert!(f.records.get_by_id("   ")?.is_none());
    assert!(f.resolver.resolve("R-999")?.is_none());
    Ok(())
}

#[test]
fn test_end_to_end_precedence() -> Result<()> {
    let f = fixture()?;

    // Row 9 has a blank Cliente, so the catalog fills it; Direccion is populated and stays.
    let merged = f.resolver.resolve("R-100")?.expect("resolved");
    assert_eq!(merged.get("Cliente"), "Acme Catalog");
    assert_eq!(merged.get("Direccion"), "Calle Propia");
    assert_eq!(merged.get("Ronda"), "Ronda 3");

    f.overrides.set_patch("R-100", patch(&[("Cliente", "Acme Corp")]))?;
    let merged = f.resolver.resolve("R-100")?.expect("resolved");
    assert_eq!(merged.get("Cliente"), "Acme Corp");
    assert_eq!(merged.get("Marca"), "New");
    Ok(())
}

#[test]
fn test_override_wins_over_populated_row_field() -> Result<()> {
    let f = fixture()?;
    f.overrides.set_patch("R-002", patch(&[("Cliente", "Beta SA"), ("Nota", "x")]))?;
    let merged = f.resolver.resolve("R-002")?.expect("resolved");
    assert_eq!(merged.get("Cliente"), "Beta SA");
    assert_eq!(merged.get("Nota"), "x");
    Ok(())
}

#[test]
fn test_catalog_failure_degrades_to_unenriched_record() -> Result<()> {
    let f = fixture_with(CatalogTab {
        title: Some("NoSuchTab".into()),
        sheet_id: None,
    })?;
    f.overrides.set_patch("R-100", patch(&[("Marca", "Patched")]))?;

    let merged = f.resolver.resolve("R-100")?.expect("resolved");
    assert_eq!(merged.get("Cliente"), "");
    assert_eq!(merged.get("Marca"), "Patched");
    Ok(())
}

#[test]
fn test_unavailable_catalog_is_loaded_once_per_ttl() -> Result<()> {
    let healthy = fixture()?;
    let healthy_list = RecentIndexCache::new(healthy.resolver.clone(), TTL).get_recent(10, false)?;

    let missing = fixture_with(CatalogTab {
        title: Some("Missing".into()),
        sheet_id: None,
    })?;
    let list = RecentIndexCache::new(missing.resolver.clone(), TTL).get_recent(10, false)?;
    assert_eq!(list.entries.len(), healthy_list.entries.len());
    assert!(!list.stale);

    // a healthy catalog costs two reads, the missing one a single failed read
    assert_eq!(missing.sheets.values_calls(), healthy.sheets.values_calls() - 1);

    let calls = missing.sheets.values_calls();
    assert!(missing.resolver.resolve("R-001")?.is_some());
    assert!(missing.resolver.resolve("R-003")?.is_some());
    let per_resolve = healthy_resolve_cost(&healthy)?;
    assert_eq!(missing.sheets.values_calls(), calls + 2 * per_resolve);
    Ok(())
}

fn healthy_resolve_cost(f: &Fixture) -> Result<usize> {
    let before = f.sheets.values_calls();
    let _ = f.resolver.resolve("R-001")?;
    Ok(f.sheets.values_calls() - before)
}

#[test]
fn test_record_store_failure_propagates_after_retries() -> Result<()> {
    let f = fixture()?;
    for _ in 0..3 {
        f.sheets.fail_next(503);
    }
    let err = f.resolver.resolve("R-100").expect_err("exhausted retries");
    assert!(err.is_transient());
    Ok(())
}

#[test]
fn test_transient_failure_is_retried() -> Result<()> {
    let f = fixture()?;
    f.sheets.fail_next(429);
    f.sheets.fail_next(500);
    assert!(f.resolver.resolve("R-100")?.is_some());
    Ok(())
}

#[test]
fn test_recent_is_unique_and_newest_first() -> Result<()> {
    let f = fixture()?;
    let recent = RecentIndexCache::new(f.resolver.clone(), TTL);

    let list = recent.get_recent(10, false)?;
    assert!(!list.stale);
    let ids: Vec<&str> = list.entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["R-100", "R-002", "R-004", "R-003", "R-001"]);
    assert_eq!(list.entries[0].client(), "Acme Catalog");

    let top = recent.get_recent(2, false)?;
    assert_eq!(top.entries.len(), 2);
    Ok(())
}

#[test]
fn test_recent_served_from_cache_within_ttl() -> Result<()> {
    let f = fixture()?;
    let recent = RecentIndexCache::new(f.resolver.clone(), TTL);
    let _ = recent.get_recent(10, false)?;
    let calls = f.sheets.values_calls();

    let _ = recent.get_recent(10, false)?;
    assert_eq!(f.sheets.values_calls(), calls);

    let _ = recent.get_recent(10, true)?;
    assert!(f.sheets.values_calls() > calls);
    Ok(())
}

#[test]
fn test_recent_falls_back_to_stale_list() -> Result<()> {
    let f = fixture()?;
    let recent = RecentIndexCache::new(f.resolver.clone(), Duration::ZERO);
    let first = recent.get_recent(10, false)?;

    f.sheets.fail_next(403);
    let second = recent.get_recent(3, false)?;
    assert!(second.stale);
    assert_eq!(second.entries, first.entries[..3].to_vec());
    Ok(())
}

#[test]
fn test_recent_without_cache_surfaces_failure() -> Result<()> {
    let f = fixture()?;
    let recent = RecentIndexCache::new(f.resolver.clone(), TTL);
    f.sheets.fail_next(403);
    assert!(recent.get_recent(10, true).is_err());
    Ok(())
}

#[test]
fn test_suggestions_use_cached_ids() -> Result<()> {
    let f = fixture()?;
    let suggester = IdSuggester::new(f.records.clone(), TTL);
    assert_eq!(suggester.suggest("r-00")?, ["R-002", "R-004", "R-003", "R-001"]);
    let calls = f.sheets.values_calls();
    assert_eq!(suggester.suggest("100")?, ["R-100"]);
    assert_eq!(f.sheets.values_calls(), calls);
    Ok(())
}

#[test]
fn test_probe_snapshot() -> Result<()> {
    let f = fixture()?;
    let p = probe(&f.records)?;
    assert_eq!(p.spreadsheet_title, "Servicios");
    assert_eq!(p.id_letter, "A");
    assert_eq!(p.id_range, "Reportes!A2:A");
    assert_eq!(p.id_count, 7);
    assert_eq!(p.first_ids, ["R-001", "R-002", "R-003", "R-100", "R-004"]);
    assert_eq!(p.last_ids, ["R-003", "R-100", "R-004", "R-002", "R-100"]);
    Ok(())
}
