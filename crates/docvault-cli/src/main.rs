//! Docvault CLI: extract text from local PDF/DOCX files and preview the
//! storage-safe names the service would use.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use docvault_cli::{extract_file, init_tracing};
use docvault_core::{sanitize_filename, sanitize_storage_path};
use docvault_processing::ExtractionOrchestrator;

#[derive(Parser)]
#[command(name = "docvault", about = "Docvault document tools")]
struct Cli {
    /// Log extraction details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the plain text of a PDF or DOCX file
    Extract {
        /// Path to the file
        file: PathBuf,
        /// Print a JSON object instead of the bare text
        #[arg(long)]
        json: bool,
    },
    /// Print the sanitized form of a filename
    Sanitize {
        /// Filename as supplied by a user
        name: String,
    },
    /// Print the sanitized form of a storage path
    SanitizePath {
        /// Slash-separated path, optionally starting with an owner UUID
        path: String,
    },
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Extract { file, json } => {
            let output = extract_file(&ExtractionOrchestrator::new(), &file).await?;
            if json {
                let out = serde_json::to_string_pretty(&output).context("Serialize output")?;
                println!("{}", out);
            } else {
                if output.extracted_text.trim().is_empty() {
                    tracing::warn!(filename = %output.filename, "No extractable text found");
                }
                println!("{}", output.extracted_text);
            }
        }
        Commands::Sanitize { name } => {
            println!("{}", sanitize_filename(&name));
        }
        Commands::SanitizePath { path } => {
            println!("{}", sanitize_storage_path(&path));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
