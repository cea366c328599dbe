//! Docvault Database Library
//!
//! Record store access for uploaded documents.

pub mod db;

pub use db::{DocumentRepository, PgDocumentRepository};
