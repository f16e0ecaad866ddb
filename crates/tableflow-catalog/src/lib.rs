//! Capability catalog adapters.
//!
//! Sources fetch the per-workspace catalog; [`load`] turns any failure into
//! a [`CatalogState::Failed`] so editors keep working with an empty catalog.

pub mod adapter;
pub mod file;
pub mod http;
pub mod options;
pub mod state;

pub use adapter::CatalogSource;
pub use file::{FileCatalogSource, StaticCatalogSource};
pub use http::{HttpCatalogSource, Organization, Workspace};
pub use options::HttpOptions;
pub use state::{CatalogState, load};

pub use tableflow_core::CapabilityCatalog;
