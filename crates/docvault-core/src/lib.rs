//! Docvault Core Library
//!
//! Domain models, error types, configuration and filename sanitization shared by
//! every docvault component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod sanitize;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, DocvaultConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use sanitize::{sanitize_filename, sanitize_storage_path};
pub use storage_types::StorageBackend;
