//! Docvault Storage Library
//!
//! Object storage abstraction for uploaded documents, with S3-compatible and
//! local filesystem backends.
//!
//! # Storage key format
//!
//! Every object lives under its owner's namespace:
//!
//! `{user_id}/{unix_millis}-{sanitized_filename}`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use docvault_core::StorageBackend;
pub use factory::create_storage;
pub use keys::{generate_document_key, is_owned_by};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ByteStream, Storage, StorageError, StorageResult};
