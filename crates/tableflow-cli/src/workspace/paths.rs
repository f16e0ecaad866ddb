use std::path::{Path, PathBuf};

use super::{WorkspaceError, WorkspaceResult};

/// Workspace directory used when `--workspace-dir` is not given.
pub const DEFAULT_WORKSPACE_DIR: &str = ".tableflow";

#[derive(Debug, Clone)]
pub struct WorkspacePaths {
    pub root: PathBuf,
    pub config_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub logs_dir: PathBuf,
}

impl WorkspacePaths {
    pub fn new(root: PathBuf) -> Self {
        let config_dir = root.join("config");
        let cache_dir = root.join("cache");
        let logs_dir = root.join("logs");
        Self {
            root,
            config_dir,
            cache_dir,
            logs_dir,
        }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join("settings.toml")
    }

    pub fn cli_log_path(&self) -> PathBuf {
        self.logs_dir.join("cli.log")
    }

    /// Cached catalog for one workspace. Path separators in the id are
    /// replaced so the file always lands inside the cache directory.
    pub fn catalog_cache_path(&self, workspace_id: &str) -> PathBuf {
        let file_id: String = workspace_id
            .chars()
            .map(|ch| match ch {
                '/' | '\\' | ':' => '_',
                other => other,
            })
            .collect();
        self.cache_dir.join(format!("catalog-{file_id}.json"))
    }

    pub fn is_initialized(&self) -> bool {
        self.settings_path().is_file()
    }

    pub fn ensure_dirs(&self) -> WorkspaceResult<()> {
        create_if_missing(&self.root)?;
        create_if_missing(&self.config_dir)?;
        create_if_missing(&self.cache_dir)?;
        create_if_missing(&self.logs_dir)?;
        Ok(())
    }
}

fn create_if_missing(path: &Path) -> WorkspaceResult<()> {
    if path.exists() {
        return Ok(());
    }
    std::fs::create_dir_all(path).map_err(WorkspaceError::from)
}
