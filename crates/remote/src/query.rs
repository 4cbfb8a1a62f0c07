// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Typed filter expressions for the hierarchical store.
//!
//! Names are escaped when rendered, so a name can never terminate the quoted
//! literal and inject extra clauses.

use crate::hierarchy::FOLDER_MIME;

/// What kind of object a query matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Folder,
    Any,
}

/// Lookup of objects by exact name directly under one parent, excluding trashed ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    name: String,
    parent_id: String,
    kind: ObjectKind,
}

impl Query {
    /// Folders called `name` under `parent_id`.
    pub fn folder_named(parent_id: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent_id: parent_id.to_string(),
            kind: ObjectKind::Folder,
        }
    }

    /// Files or folders called `name` under `parent_id`.
    pub fn any_named(parent_id: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent_id: parent_id.to_string(),
            kind: ObjectKind::Any,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Render as a store filter expression.
    pub fn to_filter(&self) -> String {
        let mut q = format!(
            "name='{}' and '{}' in parents and trashed=false",
            escape_literal(&self.name),
            escape_literal(&self.parent_id)
        );
        if self.kind == ObjectKind::Folder {
            q.push_str(&format!(" and mimeType='{FOLDER_MIME}'"));
        }
        q
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_filter())
    }
}

/// Escape a value for a single-quoted filter literal.
pub fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_query() {
        let q = Query::folder_named("root123", "Acme");
        assert_eq!(
            q.to_filter(),
            "name='Acme' and 'root123' in parents and trashed=false \
             and mimeType='application/vnd.google-apps.folder'"
        );
    }

    #[test]
    fn test_any_query_has_no_mime_clause() {
        let q = Query::any_named("p", "photo.jpg");
        assert_eq!(q.to_filter(), "name='photo.jpg' and 'p' in parents and trashed=false");
    }

    #[test]
    fn test_quotes_cannot_break_out() {
        let q = Query::any_named("p", "O'Brien' or name!='x");
        let filter = q.to_filter();
        assert!(filter.starts_with("name='O\\'Brien\\' or name!=\\'x' and"));
    }

    #[test]
    fn test_backslash_is_escaped_first() {
        assert_eq!(escape_literal(r"a\'b"), r"a\\\'b");
    }
}
