use tableflow_core::CapabilityCatalog;

use crate::adapter::CatalogSource;

/// Load state of a workspace catalog as seen by an editing session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CatalogState {
    #[default]
    Pending,
    Loaded(CapabilityCatalog),
    /// The source failed; the message is kept for diagnostics only.
    Failed(String),
}

impl CatalogState {
    pub fn is_pending(&self) -> bool {
        matches!(self, CatalogState::Pending)
    }

    pub fn loaded(&self) -> Option<&CapabilityCatalog> {
        match self {
            CatalogState::Loaded(catalog) => Some(catalog),
            _ => None,
        }
    }

    /// The loaded catalog, or an empty one while pending or after a failure.
    pub fn into_catalog(self) -> CapabilityCatalog {
        match self {
            CatalogState::Loaded(catalog) => catalog,
            CatalogState::Pending | CatalogState::Failed(_) => CapabilityCatalog::empty(),
        }
    }
}

impl From<CatalogState> for CapabilityCatalog {
    fn from(state: CatalogState) -> Self {
        state.into_catalog()
    }
}

/// Fetch a workspace catalog, absorbing failures into [`CatalogState::Failed`].
pub async fn load(source: &dyn CatalogSource, workspace_id: &str) -> CatalogState {
    match source.fetch(workspace_id).await {
        Ok(catalog) => {
            tracing::info!(
                event = "catalog_loaded",
                source = source.name(),
                workspace_id = %workspace_id,
                data_types = catalog.len()
            );
            CatalogState::Loaded(catalog)
        }
        Err(err) => {
            tracing::warn!(
                event = "catalog_unavailable",
                source = source.name(),
                workspace_id = %workspace_id,
                error = %err
            );
            CatalogState::Failed(err.to_string())
        }
    }
}
