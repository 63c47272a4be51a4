//! Error types for the regbot core library.
//!
//! Record storage failures have their own [`crate::store::StoreError`].

use thiserror::Error;

/// Result type alias using the regbot core [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Startup errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// Settings file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}
