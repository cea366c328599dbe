pub mod document_create;
pub mod document_download;
pub mod document_get;
pub mod document_upload;
pub mod extract_text;
pub mod health;
