#![allow(dead_code)]

pub mod auth;
pub mod fixtures;

use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::Utc;
use docvault_api::setup::routes::setup_routes;
use docvault_api::AppState;
use docvault_core::models::{DocumentRecord, NewDocument};
use docvault_core::{AppError, Config, DocvaultConfig, StorageBackend};
use docvault_db::DocumentRepository;
use docvault_storage::{LocalStorage, Storage};
use tempfile::TempDir;
use tokio::sync::Mutex;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";

/// Returns the versioned API path.
/// Usage: `api_path("/documents")` -> `/api/v0/documents`.
pub fn api_path(path: &str) -> String {
    docvault_api::constants::api_path(path)
}

/// Record store kept in memory, ordered the way the Postgres store orders.
#[derive(Default)]
pub struct InMemoryDocumentRepository {
    records: Mutex<Vec<DocumentRecord>>,
}

impl InMemoryDocumentRepository {
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn create(&self, new_document: NewDocument) -> Result<DocumentRecord, AppError> {
        let now = Utc::now();
        let record = DocumentRecord {
            id: Uuid::new_v4(),
            user_id: new_document.user_id,
            file_path: new_document.file_path,
            original_filename: new_document.original_filename,
            extracted_text: new_document.extracted_text,
            uploaded_at: now,
            created_at: now,
        };
        self.records.lock().await.push(record.clone());
        Ok(record)
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<DocumentRecord>, AppError> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .find(|r| r.id == id && r.user_id == user_id)
            .cloned())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DocumentRecord>, AppError> {
        let records = self.records.lock().await;
        let mut owned: Vec<DocumentRecord> = records
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(b.id.cmp(&a.id)));
        Ok(owned
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

/// Record store whose inserts always fail.
pub struct FailingDocumentRepository;

#[async_trait]
impl DocumentRepository for FailingDocumentRepository {
    async fn create(&self, _new_document: NewDocument) -> Result<DocumentRecord, AppError> {
        Err(AppError::Internal("connection reset by peer".to_string()))
    }

    async fn get(&self, _user_id: Uuid, _id: Uuid) -> Result<Option<DocumentRecord>, AppError> {
        Ok(None)
    }

    async fn list_for_user(
        &self,
        _user_id: Uuid,
        _limit: i64,
        _offset: i64,
    ) -> Result<Vec<DocumentRecord>, AppError> {
        Ok(Vec::new())
    }
}

/// Test application state
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<dyn Storage>,
    pub temp_dir: TempDir,
}

impl TestApp {
    /// Get the HTTP test client
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Number of files currently in local storage, across all namespaces.
    pub fn stored_file_count(&self) -> usize {
        fn count(dir: &std::path::Path) -> usize {
            std::fs::read_dir(dir)
                .map(|entries| {
                    entries
                        .flatten()
                        .map(|entry| {
                            let path = entry.path();
                            if path.is_dir() {
                                count(&path)
                            } else {
                                1
                            }
                        })
                        .sum()
                })
                .unwrap_or(0)
        }
        count(self.temp_dir.path())
    }
}

/// Setup a test application backed by an in-memory record store
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(Arc::new(InMemoryDocumentRepository::default())).await
}

/// Setup a test application with a caller-provided record store
pub async fn setup_test_app_with(documents: Arc<dyn DocumentRepository>) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(temp_dir.path(), "http://localhost:3000/files".to_string())
            .await
            .expect("Failed to create local storage"),
    );

    let config = create_test_config(temp_dir.path().to_string_lossy().into_owned());
    let state = Arc::new(AppState::new(config.clone(), storage.clone(), documents));

    let app = setup_routes(&config, state).expect("Failed to build routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        storage,
        temp_dir,
    }
}

/// Create test configuration
pub fn create_test_config(local_storage_path: String) -> Config {
    Config(Box::new(DocvaultConfig {
        server_port: 3000,
        cors_origins: vec!["*".to_string()],
        http_concurrency_limit: 16,
        environment: "test".to_string(),
        database_url: "postgresql://unused".to_string(),
        db_max_connections: 1,
        db_timeout_seconds: 5,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        jwt_audience: None,
        storage_backend: StorageBackend::Local,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        local_storage_path,
        local_storage_base_url: "http://localhost:3000/files".to_string(),
        max_document_size_bytes: 1024 * 1024,
        document_allowed_extensions: vec!["pdf".to_string(), "docx".to_string()],
        document_allowed_content_types: vec![
            "application/pdf".to_string(),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document".to_string(),
            "application/octet-stream".to_string(),
        ],
        extraction_timeout_secs: 30,
    }))
}
