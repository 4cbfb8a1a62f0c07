// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;

use anyhow::{Context, Result};

use crate::context::AppContext;

pub fn suggest_command(ctx: &AppContext, query: &str, out: &mut dyn Write) -> Result<()> {
    let ids = ctx
        .suggester
        .suggest(query)
        .context("Failed to load identifiers")?;
    for id in ids {
        writeln!(out, "{id}")?;
    }
    Ok(())
}
