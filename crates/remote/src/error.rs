// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for calls to the tabular and hierarchical services

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RemoteError>;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("HTTP {status} from {url}: {body}")]
    Http {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected response: {0}")]
    Unexpected(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl RemoteError {
    pub fn http<U: Into<String>, B: Into<String>>(status: u16, url: U, body: B) -> Self {
        RemoteError::Http {
            status,
            url: url.into(),
            body: body.into(),
        }
    }

    /// Rate limits, server-side failures, timeouts and refused connections.
    /// Everything else is a caller or data problem and must not be retried.
    pub fn is_transient(&self) -> bool {
        match self {
            RemoteError::Http { status, .. } => *status == 429 || (500..=599).contains(status),
            RemoteError::Timeout(_) | RemoteError::Unavailable(_) => true,
            RemoteError::Transport(_)
            | RemoteError::Decode(_)
            | RemoteError::Unexpected(_)
            | RemoteError::Url(_) => false,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RemoteError::Timeout(e.to_string())
        } else if e.is_connect() {
            RemoteError::Unavailable(e.to_string())
        } else if let Some(status) = e.status() {
            let url = e.url().map(|u| u.to_string()).unwrap_or_default();
            RemoteError::http(status.as_u16(), url, e.to_string())
        } else {
            RemoteError::Transport(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(RemoteError::http(429, "u", "slow down").is_transient());
        assert!(RemoteError::http(500, "u", "").is_transient());
        assert!(RemoteError::http(503, "u", "").is_transient());
        assert!(RemoteError::Timeout("t".into()).is_transient());
        assert!(RemoteError::Unavailable("refused".into()).is_transient());

        assert!(!RemoteError::http(403, "u", "forbidden").is_transient());
        assert!(!RemoteError::http(404, "u", "").is_transient());
        assert!(!RemoteError::Unexpected("shape".into()).is_transient());
    }

    #[test]
    fn test_display_includes_status() {
        let err = RemoteError::http(503, "https://example/x", "backend down");
        assert_eq!(err.status(), Some(503));
        assert!(err.to_string().contains("HTTP 503"));
    }
}
