// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Image references in documents: Drive URLs or logical paths under the root.
//!
//! Resolution never fails. Anything that cannot be fetched becomes a
//! transparent 1x1 PNG.

use std::sync::{Arc, LazyLock};

use diagnostics::*;
use regex::Regex;

use crate::engine::PathUpsertEngine;
use crate::error::Result;

/// 1x1 transparent PNG.
pub const TRANSPARENT_PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\x00\x00\x00\x01\x00\x00\x00\x01\
\x08\x06\x00\x00\x00\x1f\x15\xc4\x89\x00\x00\x00\x0bIDATx\x9cc``\x00\x00\x00\x02\x00\x01\
\xe2!\xbc3\x00\x00\x00\x00IEND\xaeB`\x82";

const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

#[allow(clippy::unwrap_used)]
static FILE_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"drive\.google\.com/file/d/([a-zA-Z0-9_-]+)",
        r"drive\.google\.com/open\?id=([a-zA-Z0-9_-]+)",
        r"drive\.google\.com/uc\?id=([a-zA-Z0-9_-]+)",
        r"[?&]id=([a-zA-Z0-9_-]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// File id embedded in a Drive sharing URL.
pub fn extract_file_id(reference: &str) -> Option<String> {
    FILE_ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(reference))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub name: String,
    pub placeholder: bool,
}

impl Asset {
    pub fn placeholder() -> Self {
        Self {
            bytes: TRANSPARENT_PNG.to_vec(),
            mime_type: "image/png".to_string(),
            name: "placeholder.png".to_string(),
            placeholder: true,
        }
    }
}

pub struct AssetResolver {
    engine: Arc<PathUpsertEngine>,
    root_id: Option<String>,
}

impl AssetResolver {
    pub fn new(engine: Arc<PathUpsertEngine>, root_id: Option<String>) -> Self {
        Self {
            engine,
            root_id: root_id.filter(|r| !r.trim().is_empty()),
        }
    }

    /// Bytes of the referenced image, or the placeholder.
    pub fn fetch(&self, reference: &str) -> Asset {
        let reference = reference.trim();
        if reference.is_empty() {
            return Asset::placeholder();
        }
        match self.try_fetch(reference) {
            Ok(Some(asset)) => asset,
            Ok(None) => {
                debug!("Asset {reference} not found, using placeholder");
                Asset::placeholder()
            }
            Err(e) => {
                let reason = e.to_string();
                warn!("Asset {reference} could not be fetched, using placeholder: {reason}");
                Asset::placeholder()
            }
        }
    }

    /// File id for `reference`: from the URL itself, or by walking the path.
    pub fn locate(&self, reference: &str) -> Result<Option<String>> {
        if let Some(id) = extract_file_id(reference) {
            return Ok(Some(id));
        }
        match &self.root_id {
            Some(root) => self.engine.resolve_path(root, reference),
            None => Ok(None),
        }
    }

    fn try_fetch(&self, reference: &str) -> Result<Option<Asset>> {
        let Some(id) = self.locate(reference)? else {
            return Ok(None);
        };
        let mut meta = self.engine.get(&id)?;
        if let Some(target) = meta.shortcut_target().map(str::to_string) {
            debug!("Following shortcut {id} to {target}");
            meta = self.engine.get(&target)?;
        }

        let bytes = self.engine.download(&meta.id)?;
        if bytes.is_empty() {
            return Ok(None);
        }
        let mime_type = if meta.mime_type.is_empty() {
            DEFAULT_IMAGE_MIME.to_string()
        } else {
            meta.mime_type
        };
        Ok(Some(Asset {
            bytes,
            mime_type,
            name: meta.name,
            placeholder: false,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_file_id() {
        assert_eq!(
            extract_file_id("https://drive.google.com/file/d/1AbC_d-9/view?usp=sharing").as_deref(),
            Some("1AbC_d-9")
        );
        assert_eq!(extract_file_id("https://drive.google.com/open?id=XyZ").as_deref(), Some("XyZ"));
        assert_eq!(extract_file_id("https://drive.google.com/uc?id=abc&export=view").as_deref(), Some("abc"));
        assert_eq!(extract_file_id("https://example.test/img?size=2&id=q_1").as_deref(), Some("q_1"));
        assert_eq!(extract_file_id("04. Reportes/Acme/R-1/foto.jpg"), None);
    }

    #[test]
    fn test_placeholder_is_png() {
        assert!(TRANSPARENT_PNG.starts_with(b"\x89PNG\r\n\x1a\n"));
        assert!(TRANSPARENT_PNG.ends_with(b"IEND\xaeB`\x82"));
        assert_eq!(TRANSPARENT_PNG.len(), 68);
        assert!(Asset::placeholder().placeholder);
    }
}
