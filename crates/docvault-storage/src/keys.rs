//! Shared key generation for storage backends.
//!
//! Key format: `{user_id}/{unix_millis}-{sanitized_filename}`.

use chrono::Utc;
use docvault_core::sanitize_storage_path;
use uuid::Uuid;

/// Generate the storage key for a new upload, stamped with the current time.
pub fn generate_document_key(user_id: Uuid, original_filename: &str) -> String {
    generate_document_key_at(user_id, original_filename, Utc::now().timestamp_millis())
}

/// Generate a storage key for a fixed timestamp.
///
/// The whole key is run through the path sanitizer, so a filename that
/// contains `/` cannot introduce extra segments.
pub fn generate_document_key_at(user_id: Uuid, original_filename: &str, millis: i64) -> String {
    let name = original_filename.replace('/', "-");
    sanitize_storage_path(&format!("{}/{}-{}", user_id, millis, name))
}

/// Whether `key` sits inside `user_id`'s namespace.
pub fn is_owned_by(user_id: Uuid, key: &str) -> bool {
    match key.split_once('/') {
        Some((owner, rest)) => {
            !rest.is_empty()
                && !key.contains("..")
                && Uuid::parse_str(owner).map(|id| id == user_id).unwrap_or(false)
        }
        None => false,
    }
}
