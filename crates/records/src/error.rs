// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use remote::RemoteError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecordError>;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RecordError {
    /// True when the underlying remote failure was transient and retries ran out.
    pub fn is_transient(&self) -> bool {
        matches!(self, RecordError::Remote(e) if e.is_transient())
    }
}
