use async_trait::async_trait;

use tableflow_core::{CapabilityCatalog, Result};

/// Trait implemented by sources that can supply a workspace capability catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Returns the source identifier (e.g. `http`).
    fn name(&self) -> &'static str;

    /// Fetch the catalog for a workspace.
    async fn fetch(&self, workspace_id: &str) -> Result<CapabilityCatalog>;
}
