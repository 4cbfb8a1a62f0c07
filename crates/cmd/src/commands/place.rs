// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use diagnostics::*;
use placement::ReportTarget;

use crate::context::AppContext;

/// Upload the rendered document for `id` to both destination folders.
///
/// The document on disk is left untouched, so a failed placement can be retried.
pub fn place_command(
    ctx: &AppContext,
    id: &str,
    document: &Path,
    backup_dir: Option<PathBuf>,
    out: &mut dyn Write,
) -> Result<()> {
    let id = id.trim();
    let bytes =
        std::fs::read(document).with_context(|| format!("Failed to read document {}", document.display()))?;

    let Some(record) = ctx
        .resolver
        .resolve(id)
        .with_context(|| format!("Failed to resolve {id}"))?
    else {
        bail!("Record {id} not found");
    };

    let target = ReportTarget::from_record(id, &record);
    let shown = document.display().to_string();
    debug!("Placing {shown} as {id}");
    let placed = ctx.placer(backup_dir).place(&target, &bytes).with_context(|| {
        format!(
            "Failed to place report {id}; the document is still available at {}",
            document.display()
        )
    })?;

    writeln!(out, "{}", placed.id_path)?;
    writeln!(out, "{}", placed.reports_path)?;
    if let Some(backup) = &placed.backup {
        writeln!(out, "{}", backup.display())?;
    }
    let removed = placed.id_copy.duplicates_removed + placed.reports_copy.duplicates_removed;
    if removed > 0 {
        writeln!(out, "removed {removed} duplicate(s)")?;
    }
    Ok(())
}
