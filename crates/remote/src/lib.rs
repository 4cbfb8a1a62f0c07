// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Remote-service boundary for the reportes workspace
//!
//! Two services sit behind traits so the resolution and placement layers can
//! run against either the real APIs or in-memory stand-ins:
//!
//! - **TabularService**: spreadsheet values addressed by `Title!A1:ZZ` ranges
//! - **HierarchicalStore**: folders and files linked by parent ids, queried by name
//!
//! Every remote call is meant to be wrapped by a [`RetryExecutor`], which retries
//! the transient failure class (rate limits, 5xx, timeouts) with jittered
//! exponential backoff.
//!
//! # Implementations
//!
//! - [`SheetsClient`] / [`DriveClient`]: blocking HTTP clients over an
//!   already-issued bearer token
//! - [`memory::MemorySheets`] / [`memory::MemoryDrive`]: in-memory, with
//!   injectable failures and call counters

pub mod a1;
mod drive;
mod error;
mod hierarchy;
mod http;
pub mod memory;
pub mod query;
mod retry;
mod sheets;
mod tabular;

pub use drive::{DRIVE_BASE_URL, DRIVE_UPLOAD_URL, DriveClient};
pub use error::{RemoteError, Result};
pub use hierarchy::{FOLDER_MIME, HierarchicalStore, RemoteObject, SHORTCUT_MIME, ShortcutDetails};
pub use http::Transport;
pub use query::{ObjectKind, Query};
pub use retry::{JitteredBackoff, RetryExecutor, RetryPolicy};
pub use sheets::{SHEETS_BASE_URL, SheetsClient};
pub use tabular::{SheetProperties, SpreadsheetMeta, TabularService, ValueRows, cell};
