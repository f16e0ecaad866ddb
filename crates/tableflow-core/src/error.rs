use thiserror::Error;

/// Core error type shared across tableflow crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The capability endpoint or file could not be read.
    #[error("fetch error: {0}")]
    Fetch(String),
    /// The capability catalog violates internal invariants.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
}

/// Convenience alias for results returned by tableflow crates.
pub type Result<T> = std::result::Result<T, Error>;
