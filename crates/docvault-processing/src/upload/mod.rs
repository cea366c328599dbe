//! Upload pipeline: validate → extract → store.

pub mod pipeline;
pub mod traits;
pub mod types;

pub use pipeline::{extract_with_timeout, upload_pipeline};
pub use traits::UploadConfig;
pub use types::UploadOutcome;
