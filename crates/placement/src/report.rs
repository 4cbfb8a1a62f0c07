// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Placement of a generated report under the reports root.
//!
//! One document goes to two folders:
//!
//! - `<Cliente>/<ID>/<file>`
//! - `<Cliente>/Reportes[/Ronda N]/<file>`

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use diagnostics::*;
use records::Record;
use regex::Regex;
use serde::Serialize;

use crate::engine::{PathUpsertEngine, PlacedFile, UpsertOutcome};
use crate::error::{PlacementError, Result};
use crate::sanitize::sanitize_name;

pub const PDF_MIME: &str = "application/pdf";
pub const DEFAULT_CLIENT_FOLDER: &str = "Sin Cliente";
pub const REPORTS_FOLDER: &str = "Reportes";
const DEFAULT_DOCUMENT_NAME: &str = "Reporte";

#[allow(clippy::unwrap_used)]
static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// `Ronda N` from the first digit run of `value`.
pub fn normalize_round(value: &str) -> Option<String> {
    DIGITS
        .find(value.trim())
        .map(|m| format!("Ronda {}", m.as_str()))
}

/// `<NombreEquipo|Reporte> - <ID>.pdf`, with `/` replaced by `-`.
pub fn report_filename(equipment_name: &str, id: &str) -> String {
    let name = match equipment_name.trim() {
        "" => DEFAULT_DOCUMENT_NAME,
        name => name,
    };
    format!("{} - {id}.pdf", name.replace('/', "-"))
}

/// Where a report goes, derived from its merged record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTarget {
    pub id: String,
    /// Sanitized client folder name
    pub client: String,
    pub round: Option<String>,
    pub file_name: String,
}

impl ReportTarget {
    pub fn from_record(id: &str, record: &Record) -> Self {
        let id = id.trim();
        let client = match record.get("Cliente").trim() {
            "" => DEFAULT_CLIENT_FOLDER.to_string(),
            client => sanitize_name(client),
        };
        Self {
            id: id.to_string(),
            client,
            round: normalize_round(record.get("Ronda")),
            file_name: report_filename(record.get("NombreEquipo"), id),
        }
    }

    /// Folder segments of the per-identifier destination.
    pub fn id_folder(&self) -> Vec<String> {
        vec![self.client.clone(), self.id.clone()]
    }

    /// Folder segments of the per-round destination.
    pub fn reports_folder(&self) -> Vec<String> {
        let mut segments = vec![self.client.clone(), REPORTS_FOLDER.to_string()];
        segments.extend(self.round.clone());
        segments
    }
}

/// Result of placing one report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportPlacement {
    pub id_path: String,
    pub id_copy: UpsertOutcome,
    pub reports_path: String,
    pub reports_copy: UpsertOutcome,
    pub backup: Option<PathBuf>,
}

pub struct ReportPlacer {
    engine: Arc<PathUpsertEngine>,
    root_id: Option<String>,
    backup_dir: Option<PathBuf>,
}

impl ReportPlacer {
    pub fn new(engine: Arc<PathUpsertEngine>, root_id: Option<String>) -> Self {
        Self {
            engine,
            root_id: root_id.filter(|r| !r.trim().is_empty()),
            backup_dir: None,
        }
    }

    pub fn with_backup_dir<P: Into<PathBuf>>(mut self, dir: Option<P>) -> Self {
        self.backup_dir = dir.map(Into::into);
        self
    }

    /// Store `bytes` at both destinations, then write the local backup.
    ///
    /// Any failure surfaces; the caller still holds the document.
    pub fn place(&self, target: &ReportTarget, bytes: &[u8]) -> Result<ReportPlacement> {
        let root_id = self
            .root_id
            .as_deref()
            .ok_or_else(|| PlacementError::NotConfigured("reports root folder id".to_string()))?;
        let file = PlacedFile::new(target.file_name.as_str(), PDF_MIME, bytes.to_vec());

        let id_segments = target.id_folder();
        let id_parent = self.engine.ensure_path(root_id, &id_segments)?;
        let id_copy = self.engine.upsert_file(&id_parent, &file)?;

        let reports_segments = target.reports_folder();
        let reports_parent = self.engine.ensure_path(root_id, &reports_segments)?;
        let reports_copy = self.engine.upsert_file(&reports_parent, &file)?;

        let backup = match &self.backup_dir {
            Some(dir) => Some(write_backup(dir, &target.client, &id_copy.name, bytes)?),
            None => None,
        };

        let id = target.id.as_str();
        info!("Placed report {id} in two folders");
        Ok(ReportPlacement {
            id_path: display_path(&id_segments, &id_copy.name),
            id_copy,
            reports_path: display_path(&reports_segments, &reports_copy.name),
            reports_copy,
            backup,
        })
    }
}

fn display_path(segments: &[String], file_name: &str) -> String {
    let mut parts: Vec<String> = segments.iter().map(|s| sanitize_name(s)).collect();
    parts.push(file_name.to_string());
    parts.join("/")
}

fn write_backup(dir: &Path, client: &str, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let folder = dir.join(client);
    fs::create_dir_all(&folder)?;
    let path = folder.join(file_name);
    fs::write(&path, bytes)?;
    let shown = path.display().to_string();
    debug!("Wrote backup copy {shown}");
    Ok(path)
}
