// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::context::AppContext;

/// Write the referenced image to `output`; unresolvable references write the placeholder.
pub fn fetch_asset_command(ctx: &AppContext, reference: &str, output: &Path, out: &mut dyn Write) -> Result<()> {
    let asset = ctx.assets.fetch(reference);
    std::fs::write(output, &asset.bytes).with_context(|| format!("Failed to write {}", output.display()))?;
    let kind = if asset.placeholder {
        "placeholder".to_string()
    } else {
        asset.mime_type
    };
    writeln!(out, "wrote {} bytes ({kind}) to {}", asset.bytes.len(), output.display())?;
    Ok(())
}
