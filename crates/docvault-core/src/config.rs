//! Configuration module
//!
//! Environment-driven settings for the API: server, database, identity provider,
//! storage backend and document upload limits.

use std::env;

use crate::constants::{
    DEFAULT_EXTRACTION_TIMEOUT_SECS, DEFAULT_MAX_DOCUMENT_SIZE_MB, DOCX_CONTENT_TYPE,
    OCTET_STREAM_CONTENT_TYPE, PDF_CONTENT_TYPE,
};
use crate::storage_types::StorageBackend;

const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_HTTP_CONCURRENCY_LIMIT: usize = 256;
const DEFAULT_LOCAL_STORAGE_PATH: &str = "./data/documents";
const DEFAULT_LOCAL_STORAGE_BASE_URL: &str = "http://localhost:3000/files";
const MIN_JWT_SECRET_LEN: usize = 32;

/// Full service configuration
#[derive(Clone, Debug)]
pub struct DocvaultConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub http_concurrency_limit: usize,
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Identity provider
    pub jwt_secret: String,
    pub jwt_audience: Option<String>,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, Supabase, etc.)
    pub local_storage_path: String,
    pub local_storage_base_url: String,
    // Document uploads
    pub max_document_size_bytes: usize,
    pub document_allowed_extensions: Vec<String>,
    pub document_allowed_content_types: Vec<String>,
    pub extraction_timeout_secs: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<DocvaultConfig>);

impl Config {
    fn inner(&self) -> &DocvaultConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.inner().environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = DocvaultConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().cors_origins
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.inner().http_concurrency_limit
    }

    pub fn environment(&self) -> &str {
        &self.inner().environment
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().db_timeout_seconds
    }

    pub fn jwt_secret(&self) -> &str {
        &self.inner().jwt_secret
    }

    pub fn jwt_audience(&self) -> Option<&str> {
        self.inner().jwt_audience.as_deref()
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.inner().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> &str {
        &self.inner().local_storage_path
    }

    pub fn local_storage_base_url(&self) -> &str {
        &self.inner().local_storage_base_url
    }

    pub fn max_document_size_bytes(&self) -> usize {
        self.inner().max_document_size_bytes
    }

    pub fn document_allowed_extensions(&self) -> &[String] {
        &self.inner().document_allowed_extensions
    }

    pub fn document_allowed_content_types(&self) -> &[String] {
        &self.inner().document_allowed_content_types
    }

    pub fn extraction_timeout_secs(&self) -> u64 {
        self.inner().extraction_timeout_secs
    }
}

fn is_production_env(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl DocvaultConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        // Missing .env is fine; real deployments inject the environment directly
        let _ = dotenvy::dotenv();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse::<StorageBackend>()?,
            Err(_) => StorageBackend::Local,
        };

        let config = DocvaultConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            http_concurrency_limit: env::var("HTTP_CONCURRENCY_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|limit| *limit > 0)
                .unwrap_or(DEFAULT_HTTP_CONCURRENCY_LIMIT),
            environment,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            jwt_audience: env::var("JWT_AUDIENCE").ok().filter(|s| !s.is_empty()),
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| DEFAULT_LOCAL_STORAGE_PATH.to_string()),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_LOCAL_STORAGE_BASE_URL.to_string()),
            max_document_size_bytes: env::var("MAX_DOCUMENT_SIZE_MB")
                .unwrap_or_else(|_| DEFAULT_MAX_DOCUMENT_SIZE_MB.to_string())
                .parse::<usize>()
                .unwrap_or(DEFAULT_MAX_DOCUMENT_SIZE_MB)
                * 1024
                * 1024,
            document_allowed_extensions: parse_list(
                &env::var("DOCUMENT_ALLOWED_EXTENSIONS").unwrap_or_else(|_| "pdf,docx".to_string()),
            ),
            document_allowed_content_types: parse_list(
                &env::var("DOCUMENT_ALLOWED_CONTENT_TYPES")
                    .unwrap_or_else(|_| {
                        format!(
                            "{},{},{}",
                            PDF_CONTENT_TYPE, DOCX_CONTENT_TYPE, OCTET_STREAM_CONTENT_TYPE
                        )
                    }),
            ),
            extraction_timeout_secs: env::var("EXTRACTION_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_EXTRACTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_EXTRACTION_TIMEOUT_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            ));
        }

        if !self.database_url.starts_with("postgresql://")
            && !self.database_url.starts_with("postgres://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.max_document_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_DOCUMENT_SIZE_MB must be greater than 0"));
        }

        if self.extraction_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "EXTRACTION_TIMEOUT_SECS must be greater than 0"
            ));
        }

        if let Some(ext) = self
            .document_allowed_extensions
            .iter()
            .find(|ext| !matches!(ext.as_str(), "pdf" | "docx"))
        {
            return Err(anyhow::anyhow!(
                "DOCUMENT_ALLOWED_EXTENSIONS contains '{}'; only pdf and docx can be extracted",
                ext
            ));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.trim().is_empty() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must not be empty when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}
