// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;

use anyhow::{Context, Result};

use crate::context::AppContext;

/// Print the remote id a logical path names under the reports root.
pub fn resolve_path_command(ctx: &AppContext, path: &str, out: &mut dyn Write) -> Result<()> {
    let root = ctx
        .config
        .root_id
        .as_deref()
        .filter(|r| !r.trim().is_empty())
        .context("No reports root configured (set REPORTES_ROOT_ID)")?;
    match ctx
        .engine
        .resolve_path(root, path)
        .with_context(|| format!("Failed to resolve {path}"))?
    {
        Some(id) => writeln!(out, "{id}")?,
        None => writeln!(out, "{path}: not found")?,
    }
    Ok(())
}
