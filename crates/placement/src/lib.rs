// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Placement of generated documents in a hierarchical store
//!
//! - [`PathUpsertEngine`]: folder-by-folder path creation, file upsert with
//!   duplicate cleanup, and read-only logical path lookup
//! - [`ReportPlacer`]: the two report destinations plus an optional local backup
//! - [`AssetResolver`]: image references to bytes, with a placeholder fallback

mod asset;
mod engine;
mod error;
mod report;
mod sanitize;

pub use asset::{Asset, AssetResolver, TRANSPARENT_PNG, extract_file_id};
pub use engine::{DEFAULT_PATH_PREFIX, PathUpsertEngine, PlacedFile, UpsertOutcome, normalize_path};
pub use error::{PlacementError, Result};
pub use report::{
    DEFAULT_CLIENT_FOLDER, PDF_MIME, REPORTS_FOLDER, ReportPlacement, ReportPlacer, ReportTarget, normalize_round,
    report_filename,
};
pub use sanitize::{PLACEHOLDER_NAME, sanitize_name};
