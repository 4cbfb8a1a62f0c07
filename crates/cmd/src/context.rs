// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Wiring of the resolution and placement graph from an [`AppConfig`].

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use placement::{AssetResolver, PathUpsertEngine, ReportPlacer};
use records::{
    CatalogStore, CatalogTab, ColumnResolver, IdSuggester, OverrideStore, RecentIndexCache, RecordResolver,
    RecordStore, SheetSource,
};
use remote::{DriveClient, HierarchicalStore, RetryExecutor, SheetsClient, TabularService, Transport};

use crate::config::AppConfig;

pub struct AppContext {
    pub config: AppConfig,
    pub records: Arc<RecordStore>,
    pub overrides: Arc<OverrideStore>,
    pub resolver: Arc<RecordResolver>,
    pub recent: RecentIndexCache,
    pub suggester: IdSuggester,
    pub engine: Arc<PathUpsertEngine>,
    pub assets: AssetResolver,
}

impl AppContext {
    /// Build against the real services using the configured access token.
    pub fn connect(config: AppConfig) -> Result<Self> {
        let token = config
            .access_token
            .clone()
            .context("No access token configured (set REPORTES_ACCESS_TOKEN)")?;

        let mut sheets = SheetsClient::new(Transport::new(&token)?);
        if let Some(url) = &config.sheets_base_url {
            sheets = sheets.with_base_url(url.as_str());
        }
        let mut drive = DriveClient::new(Transport::new(&token)?);
        if config.drive_base_url.is_some() || config.drive_upload_url.is_some() {
            drive = drive.with_base_urls(
                config
                    .drive_base_url
                    .clone()
                    .unwrap_or_else(|| remote::DRIVE_BASE_URL.to_string()),
                config
                    .drive_upload_url
                    .clone()
                    .unwrap_or_else(|| remote::DRIVE_UPLOAD_URL.to_string()),
            );
        }
        Ok(Self::with_services(config, Arc::new(sheets), Arc::new(drive)))
    }

    pub fn with_services(
        config: AppConfig,
        sheets: Arc<dyn TabularService>,
        drive: Arc<dyn HierarchicalStore>,
    ) -> Self {
        let retry = RetryExecutor::new(config.retry_policy());
        let source = SheetSource::new(sheets, retry.clone(), config.sheet_id.as_str());

        let columns = Arc::new(ColumnResolver::new(
            source.clone(),
            config.tab.as_str(),
            config.id_range(),
            config.header_ttl(),
        ));
        let records = Arc::new(RecordStore::with_id_field(columns, config.id_field.as_str()));
        let catalog = Arc::new(CatalogStore::new(
            source,
            CatalogTab {
                title: config.clientes_tab.clone(),
                sheet_id: config.clientes_gid,
            },
            config.catalog_ttl(),
        ));
        let overrides = Arc::new(OverrideStore::open(&config.overrides_path));
        let resolver = Arc::new(RecordResolver::new(records.clone(), catalog, overrides.clone()));
        let recent = RecentIndexCache::new(resolver.clone(), config.recent_ttl());
        let suggester = IdSuggester::new(records.clone(), config.suggest_ttl());

        let engine = Arc::new(PathUpsertEngine::new(drive, retry).with_prefix(config.path_prefix.as_str()));
        let assets = AssetResolver::new(engine.clone(), config.root_id.clone());

        Self {
            config,
            records,
            overrides,
            resolver,
            recent,
            suggester,
            engine,
            assets,
        }
    }

    /// Report placer, with `backup_dir` taking precedence over the configured one.
    pub fn placer(&self, backup_dir: Option<PathBuf>) -> ReportPlacer {
        ReportPlacer::new(self.engine.clone(), self.config.root_id.clone())
            .with_backup_dir(backup_dir.or_else(|| self.config.backup_dir.clone()))
    }
}
