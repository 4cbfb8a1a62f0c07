// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use remote::RemoteError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlacementError>;

#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Local backup failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not configured: {0}")]
    NotConfigured(String),
}
