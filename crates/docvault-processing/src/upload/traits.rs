use docvault_core::Config;

/// Limits applied to every upload.
pub trait UploadConfig: Send + Sync {
    fn max_file_size(&self) -> usize;
    fn allowed_extensions(&self) -> &[String];
    fn allowed_content_types(&self) -> &[String];
}

impl UploadConfig for Config {
    fn max_file_size(&self) -> usize {
        self.max_document_size_bytes()
    }

    fn allowed_extensions(&self) -> &[String] {
        self.document_allowed_extensions()
    }

    fn allowed_content_types(&self) -> &[String] {
        self.document_allowed_content_types()
    }
}
