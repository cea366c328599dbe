use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use uuid::Uuid;

use super::TEST_JWT_SECRET;

/// Test user data
pub struct TestUser {
    pub user_id: Uuid,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// A fresh user with a token valid for one hour.
pub fn test_user() -> TestUser {
    let user_id = Uuid::new_v4();
    TestUser {
        user_id,
        token: mint_token(user_id, 3600, TEST_JWT_SECRET),
    }
}

/// Sign an HS256 access token for `user_id` expiring `ttl_secs` from now.
/// A negative ttl yields an already expired token.
pub fn mint_token(user_id: Uuid, ttl_secs: i64, secret: &str) -> String {
    let now = Utc::now().timestamp();
    let claims = json!({
        "sub": user_id.to_string(),
        "iat": now,
        "exp": now + ttl_secs,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to sign test token")
}
