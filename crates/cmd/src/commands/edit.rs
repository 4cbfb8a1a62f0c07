// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;

use anyhow::{Context, Result, bail};
use diagnostics::*;
use records::Patch;

use crate::context::AppContext;

/// Parse `FIELD=VALUE` arguments into a patch.
///
/// Blank field names are rejected. Blank values are dropped, so an edit never
/// erases a sheet value.
pub fn parse_assignments<S: AsRef<str>>(assignments: &[S]) -> Result<Patch> {
    let mut patch = Patch::new();
    for assignment in assignments {
        let assignment = assignment.as_ref();
        let Some((field, value)) = assignment.split_once('=') else {
            bail!("Expected FIELD=VALUE, got '{assignment}'");
        };
        let field = field.trim();
        if field.is_empty() {
            bail!("Missing field name in '{assignment}'");
        }
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        _ = patch.insert(field.to_string(), value.to_string());
    }
    Ok(patch)
}

/// Merge local corrections into the override patch of an existing record.
pub fn edit_command<S: AsRef<str>>(
    ctx: &AppContext,
    id: &str,
    assignments: &[S],
    out: &mut dyn Write,
) -> Result<()> {
    let id = id.trim();
    let patch = parse_assignments(assignments)?;
    if patch.is_empty() {
        writeln!(out, "{id}: nothing to change")?;
        return Ok(());
    }

    if ctx
        .records
        .get_by_id(id)
        .with_context(|| format!("Failed to look up {id}"))?
        .is_none()
    {
        bail!("Record {id} not found");
    }

    let count = patch.len();
    ctx.overrides
        .set_patch(id, patch)
        .with_context(|| format!("Failed to save corrections for {id}"))?;
    info!("Saved {count} corrections for {id}");
    writeln!(out, "{id}: saved {count} field(s)")?;
    Ok(())
}
