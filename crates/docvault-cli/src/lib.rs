use std::path::Path;

use anyhow::Context;
use docvault_processing::{ExtractionOrchestrator, ExtractionResult, UploadedFile};
use serde::Serialize;

/// JSON shape printed by `extract --json`.
#[derive(Debug, Serialize)]
pub struct ExtractOutput {
    pub filename: String,
    pub format: String,
    pub size_bytes: usize,
    #[serde(rename = "extractedText")]
    pub extracted_text: String,
}

impl ExtractOutput {
    pub fn new(filename: String, size_bytes: usize, result: ExtractionResult) -> Self {
        Self {
            filename,
            format: result.format.to_string(),
            size_bytes,
            extracted_text: result.text,
        }
    }
}

/// Read a local file and run it through the extraction orchestrator.
pub async fn extract_file(
    orchestrator: &ExtractionOrchestrator,
    path: &Path,
) -> anyhow::Result<ExtractOutput> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file = UploadedFile::new(data, filename.clone(), "application/octet-stream");
    let size_bytes = file.size();
    let result = orchestrator.extract_text(&file).await?;

    Ok(ExtractOutput::new(filename, size_bytes, result))
}

/// Initialize tracing for the CLI. Output goes to stderr so stdout stays clean.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}
