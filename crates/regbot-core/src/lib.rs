//! regbot Core Library
//!
//! Shared functionality for the regbot server:
//! - Configuration resolution (defaults, settings file, environment)
//! - Registration record model
//! - File-per-record store
//! - Common error types

pub mod config;
pub mod error;
pub mod record;
pub mod store;
pub mod tracing_init;

pub use config::Config;
pub use error::{Error, Result};
pub use record::{Registration, RegistrationPayload, RegistrationStatus};
pub use store::{RecordStore, StoreError};
