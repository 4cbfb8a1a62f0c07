// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;

use anyhow::{Context, Result};
use diagnostics::*;

use crate::context::AppContext;

/// Print the merged record for `id`, or a not-found line.
pub fn show_command(ctx: &AppContext, id: &str, json: bool, out: &mut dyn Write) -> Result<()> {
    let id = id.trim();
    debug!("Resolving {id}");
    let Some(record) = ctx
        .resolver
        .resolve(id)
        .with_context(|| format!("Failed to resolve {id}"))?
    else {
        writeln!(out, "{id}: not found")?;
        return Ok(());
    };

    if json {
        serde_json::to_writer_pretty(&mut *out, &record)?;
        writeln!(out)?;
        return Ok(());
    }

    let width = record.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    for (field, value) in record.iter() {
        writeln!(out, "{field:<width$}  {value}")?;
    }
    Ok(())
}
