//! Database repositories for data access layer
//
// Document records (one row per stored upload)
pub mod document;

pub use document::{DocumentRepository, PgDocumentRepository};
