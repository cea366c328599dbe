use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::constants::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};

/// One uploaded document as held by the record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DocumentRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_path: String,
    pub original_filename: String,
    pub extracted_text: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Values needed to insert a new record. Timestamps and id come from the store.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub user_id: Uuid,
    pub file_path: String,
    pub original_filename: String,
    pub extracted_text: Option<String>,
}

impl NewDocument {
    /// Build an insert, storing empty extracted text as NULL.
    pub fn new(
        user_id: Uuid,
        file_path: impl Into<String>,
        original_filename: impl Into<String>,
        extracted_text: Option<String>,
    ) -> Self {
        NewDocument {
            user_id,
            file_path: file_path.into(),
            original_filename: original_filename.into(),
            extracted_text: extracted_text.filter(|t| !t.is_empty()),
        }
    }
}

/// Body of `POST /documents/records`, for objects the client already stored.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDocumentRequest {
    #[validate(length(min = 1, max = 1024))]
    pub file_path: String,
    #[validate(length(min = 1, max = 255))]
    pub original_filename: String,
    pub extracted_text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub file_path: String,
    pub original_filename: String,
    pub extracted_text: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl From<DocumentRecord> for DocumentResponse {
    fn from(doc: DocumentRecord) -> Self {
        DocumentResponse {
            id: doc.id,
            file_path: doc.file_path,
            original_filename: doc.original_filename,
            extracted_text: doc.extracted_text,
            uploaded_at: doc.uploaded_at,
        }
    }
}

/// Listing entry. The text itself is left out, only its length is reported.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub file_path: String,
    pub original_filename: String,
    pub text_length: usize,
    pub uploaded_at: DateTime<Utc>,
}

impl From<DocumentRecord> for DocumentSummary {
    fn from(doc: DocumentRecord) -> Self {
        DocumentSummary {
            id: doc.id,
            text_length: doc
                .extracted_text
                .as_deref()
                .map(|t| t.chars().count())
                .unwrap_or(0),
            file_path: doc.file_path,
            original_filename: doc.original_filename,
            uploaded_at: doc.uploaded_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExtractTextResponse {
    #[serde(rename = "extractedText")]
    pub extracted_text: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListDocumentsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListDocumentsQuery {
    /// Clamp paging values into the accepted range.
    pub fn resolve(&self) -> (i64, i64) {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}
