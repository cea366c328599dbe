use async_trait::async_trait;
use docvault_core::{
    models::{DocumentRecord, NewDocument},
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Record store for uploaded documents.
///
/// Every read is scoped to the owning user. Records are inserted once and
/// never updated.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn create(&self, document: NewDocument) -> Result<DocumentRecord, AppError>;

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<DocumentRecord>, AppError>;

    /// Newest upload first.
    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DocumentRecord>, AppError>;
}

/// Postgres-backed repository for the `documents` table
#[derive(Clone)]
pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    #[tracing::instrument(skip(self, document), fields(db.table = "documents", db.operation = "insert", user_id = %document.user_id))]
    async fn create(&self, document: NewDocument) -> Result<DocumentRecord, AppError> {
        let record = sqlx::query_as::<Postgres, DocumentRecord>(
            r#"
            INSERT INTO documents (user_id, file_path, original_filename, extracted_text)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, file_path, original_filename, extracted_text, uploaded_at, created_at
            "#,
        )
        .bind(document.user_id)
        .bind(&document.file_path)
        .bind(&document.original_filename)
        .bind(&document.extracted_text)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select", db.record_id = %id))]
    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<DocumentRecord>, AppError> {
        let record = sqlx::query_as::<Postgres, DocumentRecord>(
            "SELECT id, user_id, file_path, original_filename, extracted_text, uploaded_at, created_at FROM documents WHERE user_id = $1 AND id = $2",
        )
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select"))]
    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DocumentRecord>, AppError> {
        let records = sqlx::query_as::<Postgres, DocumentRecord>(
            r#"
            SELECT id, user_id, file_path, original_filename, extracted_text, uploaded_at, created_at
            FROM documents
            WHERE user_id = $1
            ORDER BY uploaded_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
