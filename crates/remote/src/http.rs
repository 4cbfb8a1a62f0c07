// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Blocking HTTP plumbing shared by the Sheets and Drive clients.

use std::time::Duration;

use reqwest::blocking::{RequestBuilder, Response};
use url::Url;

use crate::error::{RemoteError, Result};

const TIMEOUT_SECONDS: u64 = 60;

/// Authenticated blocking HTTP transport.
///
/// Holds an already-issued bearer token; acquiring and refreshing it is the
/// caller's job.
#[derive(Clone)]
pub struct Transport {
    http_client: reqwest::blocking::Client,
    token: String,
}

impl Transport {
    pub fn new<S: Into<String>>(access_token: S) -> Result<Self> {
        let http_client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECONDS))
            .build()?;
        Ok(Self {
            http_client,
            token: access_token.into(),
        })
    }

    pub fn get(&self, url: Url) -> RequestBuilder {
        self.http_client.get(url).bearer_auth(&self.token)
    }

    pub fn post(&self, url: Url) -> RequestBuilder {
        self.http_client.post(url).bearer_auth(&self.token)
    }

    pub fn patch(&self, url: Url) -> RequestBuilder {
        self.http_client.patch(url).bearer_auth(&self.token)
    }

    pub fn delete(&self, url: Url) -> RequestBuilder {
        self.http_client.delete(url).bearer_auth(&self.token)
    }

    /// Send and fail on any non-success status.
    pub fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send()?;
        check_status(response)
    }

    /// Send and parse the body as JSON.
    pub fn send_json<T>(&self, request: RequestBuilder) -> Result<T>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let response = self.send(request)?;
        let text = response.text()?;
        Ok(serde_json::from_str(&text)?)
    }
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = response
        .text()
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(RemoteError::http(status.as_u16(), url, body))
}

/// `base` with extra path segments appended, each percent-encoded.
pub fn join_segments(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base)?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| RemoteError::Unexpected(format!("base URL cannot hold a path: {base}")))?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}
