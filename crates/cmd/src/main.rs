// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use cmd::commands;
use cmd::config::load_config;
use cmd::context::AppContext;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "reportes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// YAML configuration file; REPORTES_* variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the merged record for an identifier
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// List the most recent reports
    Recent {
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
        /// Rescan the sheet even if the cached list is fresh
        #[arg(long)]
        refresh: bool,
    },
    /// Suggest identifiers matching a partial query
    Suggest { query: String },
    /// Save local corrections as FIELD=VALUE pairs
    Edit {
        id: String,
        #[arg(required = true)]
        assignments: Vec<String>,
    },
    /// Upload a rendered report to its client folders
    Place {
        id: String,
        document: PathBuf,
        /// Also keep a local copy under this directory
        #[arg(long)]
        backup_dir: Option<PathBuf>,
    },
    /// Look up the remote id of a path under the reports root
    ResolvePath { path: String },
    /// Download an image reference, or the placeholder if it cannot be fetched
    FetchAsset {
        reference: String,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Describe the spreadsheet layout and identifier column
    Probe {
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    diagnostics::init_diagnostics();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let ctx = AppContext::connect(config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Show { id, json } => commands::show_command(&ctx, &id, json, &mut out)?,
        Commands::Recent { count, refresh } => commands::recent_command(&ctx, count, refresh, &mut out)?,
        Commands::Suggest { query } => commands::suggest_command(&ctx, &query, &mut out)?,
        Commands::Edit { id, assignments } => commands::edit_command(&ctx, &id, assignments.as_slice(), &mut out)?,
        Commands::Place {
            id,
            document,
            backup_dir,
        } => commands::place_command(&ctx, &id, &document, backup_dir, &mut out)?,
        Commands::ResolvePath { path } => commands::resolve_path_command(&ctx, &path, &mut out)?,
        Commands::FetchAsset { reference, output } => {
            commands::fetch_asset_command(&ctx, &reference, &output, &mut out)?
        }
        Commands::Probe { json } => commands::probe_command(&ctx, json, &mut out)?,
    }
    out.flush()?;
    Ok(())
}
