use std::path::{Path, PathBuf};

use async_trait::async_trait;

use tableflow_core::{CapabilityCatalog, Error, Result, validate_catalog};

use crate::adapter::CatalogSource;

/// Catalog source reading a JSON document from disk.
///
/// The same document is served for every workspace.
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn fetch(&self, workspace_id: &str) -> Result<CapabilityCatalog> {
        tracing::debug!(
            event = "catalog_file_read",
            path = %self.path.display(),
            workspace_id = %workspace_id
        );
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|err| Error::Fetch(format!("{}: {err}", self.path.display())))?;
        let catalog: CapabilityCatalog = serde_json::from_str(&contents)
            .map_err(|err| Error::InvalidCatalog(format!("{}: {err}", self.path.display())))?;
        validate_catalog(&catalog)?;
        Ok(catalog)
    }
}

/// In-memory catalog source.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogSource {
    catalog: CapabilityCatalog,
}

impl StaticCatalogSource {
    pub fn new(catalog: CapabilityCatalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch(&self, _workspace_id: &str) -> Result<CapabilityCatalog> {
        Ok(self.catalog.clone())
    }
}
