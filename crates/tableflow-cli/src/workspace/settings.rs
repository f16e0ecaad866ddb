use std::time::Duration;

use serde::{Deserialize, Serialize};
use tableflow_catalog::HttpOptions;

use super::atomic::write_bytes_atomic;
use super::{WorkspacePaths, WorkspaceResult};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "TABLEFLOW_API_KEY";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// JSON lines appended to `logs/cli.log`.
    Json,
    /// Human-readable lines on stderr.
    #[default]
    Compact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceSettings {
    pub api_base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Resolved from the organization endpoint when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    pub timeout_secs: u64,
    pub log_format: LogFormat,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        let http = HttpOptions::default();
        Self {
            api_base_url: http.base_url,
            api_key: None,
            workspace_id: None,
            timeout_secs: http.timeout.as_secs(),
            log_format: LogFormat::default(),
        }
    }
}

impl WorkspaceSettings {
    /// API key from the environment, falling back to the stored one.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_with(std::env::var(API_KEY_ENV).ok())
    }

    fn api_key_with(&self, from_env: Option<String>) -> Option<String> {
        from_env
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone())
    }

    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            base_url: self.api_base_url.clone(),
            api_key: self.api_key(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Settings from disk, or defaults when the workspace was never initialized.
pub fn load_settings(paths: &WorkspacePaths) -> WorkspaceResult<WorkspaceSettings> {
    let path = paths.settings_path();
    if !path.exists() {
        return Ok(WorkspaceSettings::default());
    }
    let content = std::fs::read_to_string(&path)?;
    Ok(toml::from_str(&content)?)
}

pub fn load_or_create_settings(paths: &WorkspacePaths) -> WorkspaceResult<WorkspaceSettings> {
    if paths.settings_path().exists() {
        return load_settings(paths);
    }

    let settings = WorkspaceSettings::default();
    save_settings(paths, &settings)?;
    Ok(settings)
}

pub fn save_settings(paths: &WorkspacePaths, settings: &WorkspaceSettings) -> WorkspaceResult<()> {
    let path = paths.settings_path();
    let encoded = toml::to_string_pretty(settings)?;
    write_bytes_atomic(&path, encoded.as_bytes())
}
