// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;

use anyhow::{Context, Result};

use crate::context::AppContext;

pub fn probe_command(ctx: &AppContext, json: bool, out: &mut dyn Write) -> Result<()> {
    let probe = records::probe(&ctx.records).context("Failed to probe the spreadsheet")?;
    if json {
        serde_json::to_writer_pretty(&mut *out, &probe)?;
        writeln!(out)?;
        return Ok(());
    }
    writeln!(out, "spreadsheet: {}", probe.spreadsheet_title)?;
    writeln!(out, "tab:         {}", probe.tab)?;
    writeln!(out, "headers:     {}", probe.headers.join(", "))?;
    writeln!(
        out,
        "id column:   {} at {} (index {}, {})",
        probe.id_field, probe.id_letter, probe.id_index, probe.id_range
    )?;
    writeln!(out, "ids:         {}", probe.id_count)?;
    writeln!(out, "first:       {}", probe.first_ids.join(", "))?;
    writeln!(out, "last:        {}", probe.last_ids.join(", "))?;
    Ok(())
}
