// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Process-wide logging for the reportes workspace.
//!
//! Usage:
//! - Set REPORTES_LOG=off (default) - no logs
//! - Set REPORTES_LOG=error|warn|info|debug - minimum level written to stderr

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable consulted by [`init_diagnostics`].
pub const LOG_ENV: &str = "REPORTES_LOG";

static INIT: Once = Once::new();

/// Map a `REPORTES_LOG` value to a minimum level, `None` meaning logging is off.
///
/// Unknown values fall back to `Info`.
pub fn parse_level(value: &str) -> Option<emit::Level> {
    match value.trim().to_ascii_lowercase().as_str() {
        "off" | "" => None,
        "debug" => Some(emit::Level::Debug),
        "info" => Some(emit::Level::Info),
        "warn" => Some(emit::Level::Warn),
        "error" => Some(emit::Level::Error),
        _ => Some(emit::Level::Info),
    }
}

/// Initialize diagnostics based on the REPORTES_LOG environment variable.
///
/// Safe to call multiple times; only the first call installs an emitter.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let log_level = std::env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());

        let Some(level) = parse_level(&log_level) else {
            return;
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        // The runtime lives for the whole process.
        std::mem::forget(rt);
    });
}

// Re-exported directly (not wrapped in macro_rules!) so that template
// interpolation like "{attempt}" resolves caller locals without hygiene issues.
pub use emit::{debug, error, info, warn};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_safe_to_call_multiple_times() {
        init_diagnostics();
        init_diagnostics();
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("off"), None);
        assert_eq!(parse_level(""), None);
        assert_eq!(parse_level("DEBUG"), Some(emit::Level::Debug));
        assert_eq!(parse_level("warn"), Some(emit::Level::Warn));
        assert_eq!(parse_level("chatty"), Some(emit::Level::Info));
    }

    #[test]
    fn test_macros_compile() {
        let attempt = 2usize;
        info!("Test message");
        debug!("Debug message with {value}", value: 42);
        warn!("Retrying after attempt {attempt}");
        error!("Error message");
    }
}
