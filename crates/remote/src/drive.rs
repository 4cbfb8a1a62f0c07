// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Drive v3 implementation of [`HierarchicalStore`].

use rand::Rng;
use rand::distributions::Alphanumeric;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::json;

use crate::error::Result;
use crate::hierarchy::{FOLDER_MIME, HierarchicalStore, RemoteObject};
use crate::http::{Transport, join_segments};
use crate::query::Query;

pub const DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";
pub const DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3";

const LIST_FIELDS: &str = "files(id,name,mimeType,parents)";
const GET_FIELDS: &str = "id,name,mimeType,parents,shortcutDetails/targetId";

/// Blocking Drive API client
pub struct DriveClient {
    transport: Transport,
    base_url: String,
    upload_url: String,
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<RemoteObject>,
}

#[derive(Deserialize)]
struct Created {
    id: String,
}

impl DriveClient {
    pub fn new(transport: Transport) -> Self {
        Self {
            transport,
            base_url: DRIVE_BASE_URL.to_string(),
            upload_url: DRIVE_UPLOAD_URL.to_string(),
        }
    }

    pub fn with_base_urls<S: Into<String>, U: Into<String>>(mut self, base_url: S, upload_url: U) -> Self {
        self.base_url = base_url.into();
        self.upload_url = upload_url.into();
        self
    }

    fn list_url(&self, query: &Query, page_size: u32) -> Result<url::Url> {
        let mut url = join_segments(&self.base_url, &["files"])?;
        url.query_pairs_mut()
            .append_pair("q", &query.to_filter())
            .append_pair("spaces", "drive")
            .append_pair("fields", LIST_FIELDS)
            .append_pair("pageSize", &page_size.to_string());
        Ok(url)
    }

    fn file_url(&self, file_id: &str) -> Result<url::Url> {
        join_segments(&self.base_url, &["files", file_id])
    }

    fn upload_file_url(&self, file_id: Option<&str>, upload_type: &str) -> Result<url::Url> {
        let mut url = match file_id {
            Some(id) => join_segments(&self.upload_url, &["files", id])?,
            None => join_segments(&self.upload_url, &["files"])?,
        };
        url.query_pairs_mut()
            .append_pair("uploadType", upload_type)
            .append_pair("fields", "id");
        Ok(url)
    }
}

impl HierarchicalStore for DriveClient {
    fn list(&self, query: &Query, page_size: u32) -> Result<Vec<RemoteObject>> {
        let url = self.list_url(query, page_size)?;
        let list: FileList = self.transport.send_json(self.transport.get(url))?;
        Ok(list.files)
    }

    fn create_folder(&self, parent_id: &str, name: &str) -> Result<String> {
        let mut url = join_segments(&self.base_url, &["files"])?;
        url.query_pairs_mut().append_pair("fields", "id");
        let body = json!({
            "name": name,
            "mimeType": FOLDER_MIME,
            "parents": [parent_id],
        });
        let request = self
            .transport
            .post(url)
            .header(CONTENT_TYPE, "application/json; charset=UTF-8")
            .body(serde_json::to_vec(&body)?);
        let created: Created = self.transport.send_json(request)?;
        Ok(created.id)
    }

    fn create_file(
        &self,
        parent_id: &str,
        name: &str,
        mime_type: &str,
        content: &[u8],
    ) -> Result<String> {
        let url = self.upload_file_url(None, "multipart")?;
        let metadata = json!({
            "name": name,
            "mimeType": mime_type,
            "parents": [parent_id],
        });
        let boundary = new_boundary();
        let body = multipart_related(&boundary, &serde_json::to_vec(&metadata)?, mime_type, content);
        let request = self
            .transport
            .post(url)
            .header(CONTENT_TYPE, format!("multipart/related; boundary={boundary}"))
            .body(body);
        let created: Created = self.transport.send_json(request)?;
        Ok(created.id)
    }

    fn update_content(&self, file_id: &str, mime_type: &str, content: &[u8]) -> Result<()> {
        let url = self.upload_file_url(Some(file_id), "media")?;
        let request = self
            .transport
            .patch(url)
            .header(CONTENT_TYPE, mime_type)
            .body(content.to_vec());
        self.transport.send(request)?;
        Ok(())
    }

    fn delete(&self, object_id: &str) -> Result<()> {
        let url = self.file_url(object_id)?;
        self.transport.send(self.transport.delete(url))?;
        Ok(())
    }

    fn get(&self, object_id: &str) -> Result<RemoteObject> {
        let mut url = self.file_url(object_id)?;
        url.query_pairs_mut().append_pair("fields", GET_FIELDS);
        self.transport.send_json(self.transport.get(url))
    }

    fn download(&self, file_id: &str) -> Result<Vec<u8>> {
        let mut url = self.file_url(file_id)?;
        url.query_pairs_mut().append_pair("alt", "media");
        let response = self.transport.send(self.transport.get(url))?;
        Ok(response.bytes()?.to_vec())
    }
}

fn new_boundary() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect();
    format!("reportes-{suffix}")
}

/// Body for a `multipart/related` upload: JSON metadata part, then the media part.
fn multipart_related(boundary: &str, metadata: &[u8], mime_type: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(metadata.len() + content.len() + 256);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata);
    body.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Type: {mime_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}
