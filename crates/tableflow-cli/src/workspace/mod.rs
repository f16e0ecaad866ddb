mod atomic;
mod paths;
mod settings;

pub use atomic::{write_bytes_atomic, write_json_atomic};
pub use paths::{DEFAULT_WORKSPACE_DIR, WorkspacePaths};
pub use settings::{
    API_KEY_ENV, LogFormat, WorkspaceSettings, load_or_create_settings, load_settings,
    save_settings,
};

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),
    #[error("toml encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error("invalid workspace state: {0}")]
    Invalid(String),
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
