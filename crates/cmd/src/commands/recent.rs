// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;

use anyhow::{Context, Result};

use crate::context::AppContext;

pub fn recent_command(ctx: &AppContext, count: usize, refresh: bool, out: &mut dyn Write) -> Result<()> {
    let list = ctx
        .recent
        .get_recent(count, refresh)
        .context("Failed to list recent reports")?;
    if list.stale {
        writeln!(out, "(showing cached list; refresh failed)")?;
    }
    if list.entries.is_empty() {
        writeln!(out, "no reports")?;
    }
    for entry in &list.entries {
        writeln!(out, "{}\t{}\t{}", entry.id, entry.display_name(), entry.client())?;
    }
    Ok(())
}
