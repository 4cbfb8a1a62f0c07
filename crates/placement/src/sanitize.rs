// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::LazyLock;

use regex::Regex;

/// Substituted when nothing is left of a name after sanitizing.
pub const PLACEHOLDER_NAME: &str = "Sin nombre";

#[allow(clippy::unwrap_used)]
static ILLEGAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|]+"#).unwrap());

/// Make `name` safe as a folder or file name in the remote store.
///
/// Each run of `\ / : * ? " < > |` becomes one `-`, then surrounding
/// whitespace is trimmed. Empty and dot-only names become the placeholder.
pub fn sanitize_name(name: &str) -> String {
    let replaced = ILLEGAL.replace_all(name, "-");
    let trimmed = replaced.trim();
    if trimmed.chars().all(|c| c == '.') {
        PLACEHOLDER_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_illegal_characters_become_dashes() {
        assert_eq!(sanitize_name("My/Client:Co"), "My-Client-Co");
        assert_eq!(sanitize_name(r#"a\b*c?d"e<f>g|h"#), "a-b-c-d-e-f-g-h");
        assert_eq!(sanitize_name("a//::b"), "a-b");
        assert_eq!(sanitize_name("  Acme SA  "), "Acme SA");
        assert_eq!(sanitize_name("O'Brien"), "O'Brien");
    }

    #[test]
    fn test_empty_becomes_placeholder() {
        assert_eq!(sanitize_name(""), PLACEHOLDER_NAME);
        assert_eq!(sanitize_name("   "), PLACEHOLDER_NAME);
        assert_eq!(sanitize_name("/"), "-");
    }

    #[test]
    fn test_dot_names_become_placeholder() {
        assert_eq!(sanitize_name(".."), PLACEHOLDER_NAME);
        assert_eq!(sanitize_name(" . "), PLACEHOLDER_NAME);
        assert_eq!(sanitize_name("..."), PLACEHOLDER_NAME);
        assert_eq!(sanitize_name("../x"), "..-x");
        assert_eq!(sanitize_name("S.A."), "S.A.");
    }
}
