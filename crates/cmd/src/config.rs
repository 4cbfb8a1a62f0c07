// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Application configuration: YAML file, then `REPORTES_*` environment overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use remote::RetryPolicy;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TAB: &str = "Reportes";
pub const DEFAULT_OVERRIDES_PATH: &str = "/tmp/reportes_overrides.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub base_delay_ms: u64,
    pub jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 4,
            base_delay_ms: 500,
            jitter_ms: 250,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub sheet_id: String,
    pub tab: String,
    /// Defaults to `<tab>!A2:A`
    pub id_range: Option<String>,
    pub id_field: String,
    pub clientes_tab: Option<String>,
    pub clientes_gid: Option<i64>,
    pub recent_ttl_secs: u64,
    pub header_ttl_secs: u64,
    pub catalog_ttl_secs: u64,
    pub suggest_ttl_secs: u64,
    pub root_id: Option<String>,
    pub path_prefix: String,
    pub overrides_path: PathBuf,
    pub access_token: Option<String>,
    pub backup_dir: Option<PathBuf>,
    pub sheets_base_url: Option<String>,
    pub drive_base_url: Option<String>,
    pub drive_upload_url: Option<String>,
    pub retry: RetryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sheet_id: String::new(),
            tab: DEFAULT_TAB.to_string(),
            id_range: None,
            id_field: records::DEFAULT_ID_FIELD.to_string(),
            clientes_tab: None,
            clientes_gid: None,
            recent_ttl_secs: 120,
            header_ttl_secs: 300,
            catalog_ttl_secs: 300,
            suggest_ttl_secs: 180,
            root_id: None,
            path_prefix: placement::DEFAULT_PATH_PREFIX.to_string(),
            overrides_path: PathBuf::from(DEFAULT_OVERRIDES_PATH),
            access_token: None,
            backup_dir: None,
            sheets_base_url: None,
            drive_base_url: None,
            drive_upload_url: None,
            retry: RetryConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn id_range(&self) -> String {
        match self.id_range.as_deref().map(str::trim) {
            Some(range) if !range.is_empty() => range.to_string(),
            _ => format!("{}!A2:A", self.tab),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retry.max_retries,
            base_delay: Duration::from_millis(self.retry.base_delay_ms),
            max_jitter: Duration::from_millis(self.retry.jitter_ms),
        }
    }

    pub fn recent_ttl(&self) -> Duration {
        Duration::from_secs(self.recent_ttl_secs)
    }

    pub fn header_ttl(&self) -> Duration {
        Duration::from_secs(self.header_ttl_secs)
    }

    pub fn catalog_ttl(&self) -> Duration {
        Duration::from_secs(self.catalog_ttl_secs)
    }

    pub fn suggest_ttl(&self) -> Duration {
        Duration::from_secs(self.suggest_ttl_secs)
    }
}

/// Load configuration from an optional YAML file, apply the process
/// environment, and validate.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => AppConfig::default(),
    };
    apply_env(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config)?;
    Ok(config)
}

pub fn read_config_file(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

pub fn parse_config(yaml: &str) -> Result<AppConfig> {
    serde_yaml_ng::from_str(yaml).with_context(|| "Failed to parse YAML configuration")
}

/// Overlay `REPORTES_*` variables read through `lookup`. Blank values are ignored.
pub fn apply_env<F>(config: &mut AppConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| {
        lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    if let Some(v) = get("REPORTES_SHEET_ID") {
        config.sheet_id = v;
    }
    if let Some(v) = get("REPORTES_TAB") {
        config.tab = v;
    }
    if let Some(v) = get("REPORTES_IDRANGE") {
        config.id_range = Some(v);
    }
    if let Some(v) = get("REPORTES_CLIENTES_TAB") {
        config.clientes_tab = Some(v);
    }
    if let Some(v) = get("REPORTES_CLIENTES_GID") {
        config.clientes_gid = Some(
            v.parse()
                .with_context(|| format!("REPORTES_CLIENTES_GID is not a number: {v}"))?,
        );
    }
    if let Some(v) = get("REPORTES_LAST10_TTL") {
        config.recent_ttl_secs = v
            .parse()
            .with_context(|| format!("REPORTES_LAST10_TTL is not a number of seconds: {v}"))?;
    }
    if let Some(v) = get("REPORTES_ROOT_ID") {
        config.root_id = Some(v);
    }
    if let Some(v) = get("REPORTES_OVERRIDES_PATH") {
        config.overrides_path = PathBuf::from(v);
    }
    if let Some(v) = get("REPORTES_ACCESS_TOKEN") {
        config.access_token = Some(v);
    }
    if let Some(v) = get("REPORTES_BACKUP_DIR") {
        config.backup_dir = Some(PathBuf::from(v));
    }
    Ok(())
}

pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.sheet_id.trim().is_empty() {
        anyhow::bail!("sheet_id cannot be empty (set REPORTES_SHEET_ID)");
    }
    if config.tab.trim().is_empty() {
        anyhow::bail!("tab cannot be empty");
    }
    if config.retry.max_retries == 0 {
        anyhow::bail!("retry.max_retries must be greater than 0");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.tab, "Reportes");
        assert_eq!(config.id_range(), "Reportes!A2:A");
        assert_eq!(config.recent_ttl(), Duration::from_secs(120));
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.overrides_path, PathBuf::from("/tmp/reportes_overrides.json"));
    }

    #[test]
    fn test_parse_yaml_with_partial_fields() -> Result<()> {
        let config = parse_config(
            r#"
sheet_id: "abc123"
tab: Servicios
clientes_gid: 42
retry:
  max_retries: 2
"#,
        )?;
        assert_eq!(config.sheet_id, "abc123");
        assert_eq!(config.id_range(), "Servicios!A2:A");
        assert_eq!(config.clientes_gid, Some(42));
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.retry.base_delay_ms, 500);
        assert_eq!(config.header_ttl_secs, 300);
        Ok(())
    }

    #[test]
    fn test_unknown_yaml_field_is_rejected() {
        assert!(parse_config("sheet_idd: x\n").is_err());
    }

    #[test]
    fn test_env_overrides_file_values() -> Result<()> {
        let mut config = parse_config("sheet_id: from-file\nroot_id: r0\n")?;
        let vars = env(&[
            ("REPORTES_SHEET_ID", "from-env"),
            ("REPORTES_IDRANGE", "Reportes!C2:C"),
            ("REPORTES_CLIENTES_GID", "7"),
            ("REPORTES_LAST10_TTL", "30"),
            ("REPORTES_ROOT_ID", "  "),
            ("REPORTES_BACKUP_DIR", "/var/backups/reportes"),
        ]);
        apply_env(&mut config, |k| vars.get(k).cloned())?;

        assert_eq!(config.sheet_id, "from-env");
        assert_eq!(config.id_range(), "Reportes!C2:C");
        assert_eq!(config.clientes_gid, Some(7));
        assert_eq!(config.recent_ttl_secs, 30);
        assert_eq!(config.root_id.as_deref(), Some("r0"));
        assert_eq!(config.backup_dir, Some(PathBuf::from("/var/backups/reportes")));
        Ok(())
    }

    #[test]
    fn test_bad_numeric_env_is_an_error() {
        let mut config = AppConfig::default();
        let vars = env(&[("REPORTES_LAST10_TTL", "soon")]);
        assert!(apply_env(&mut config, |k| vars.get(k).cloned()).is_err());
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        assert!(validate_config(&config).is_err());

        config.sheet_id = "abc".into();
        assert!(validate_config(&config).is_ok());

        config.retry.max_retries = 0;
        assert!(validate_config(&config).is_err());

        config.retry.max_retries = 1;
        config.tab = " ".into();
        assert!(validate_config(&config).is_err());
    }
}
