// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Hierarchical store boundary: folders and files linked to their parents by id.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::query::Query;

pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
pub const SHORTCUT_MIME: &str = "application/vnd.google-apps.shortcut";

/// Object metadata as listed by the store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut_details: Option<ShortcutDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutDetails {
    #[serde(default)]
    pub target_id: Option<String>,
}

impl RemoteObject {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME
    }

    /// Id of the object a shortcut points at, if this is a shortcut.
    pub fn shortcut_target(&self) -> Option<&str> {
        if self.mime_type != SHORTCUT_MIME {
            return None;
        }
        self.shortcut_details
            .as_ref()
            .and_then(|d| d.target_id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

/// Folder/file store operations. Each method is exactly one remote call.
pub trait HierarchicalStore: Send + Sync {
    /// Objects matching `query`, at most `page_size` of them, in store order.
    fn list(&self, query: &Query, page_size: u32) -> Result<Vec<RemoteObject>>;

    /// Create a folder named `name` under `parent_id`; returns the new id.
    fn create_folder(&self, parent_id: &str, name: &str) -> Result<String>;

    /// Create a file with content under `parent_id`; returns the new id.
    fn create_file(&self, parent_id: &str, name: &str, mime_type: &str, content: &[u8])
    -> Result<String>;

    /// Replace the content of an existing file, keeping its id.
    fn update_content(&self, file_id: &str, mime_type: &str, content: &[u8]) -> Result<()>;

    fn delete(&self, object_id: &str) -> Result<()>;

    /// Metadata for one object, including shortcut details.
    fn get(&self, object_id: &str) -> Result<RemoteObject>;

    fn download(&self, file_id: &str) -> Result<Vec<u8>>;
}
