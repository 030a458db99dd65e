//! MCP API keys: generation, hashing and the bearer-token guard.

use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::AppState;
use super::v1::ErrorResponse;
use crate::db::utils::current_timestamp;
use crate::db::{ApiKeyRepository, Database};
use crate::mcp::FamilyScope;

/// Every key starts with this marker.
pub const API_KEY_PREFIX: &str = "fml_";

/// A freshly generated key. `key` is shown to the user once, never stored.
#[derive(Debug, Clone)]
pub struct GeneratedKey {
    pub key: String,
    pub prefix: String,
    pub hash: String,
}

/// Generate `fml_<8 chars>_<32 chars>` from random bytes.
pub fn generate_api_key() -> GeneratedKey {
    let mut rng = rand::thread_rng();
    let mut prefix_bytes = [0u8; 6];
    let mut secret_bytes = [0u8; 24];
    rng.fill(&mut prefix_bytes);
    rng.fill(&mut secret_bytes);

    let prefix = URL_SAFE_NO_PAD.encode(prefix_bytes);
    let secret = URL_SAFE_NO_PAD.encode(secret_bytes);
    let key = format!("{API_KEY_PREFIX}{prefix}_{secret}");
    let hash = hash_api_key(&key);

    GeneratedKey { key, prefix, hash }
}

/// Hex SHA-256 of the full plaintext key.
pub fn hash_api_key(key: &str) -> String {
    Sha256::digest(key.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn unauthorized(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

/// Reject requests without an active, unexpired `Authorization: Bearer` key.
///
/// Accepted requests carry the key's [`FamilyScope`] in their extensions.
pub async fn require_api_key<D: Database + 'static>(
    State(state): State<AppState<D>>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| token.starts_with(API_KEY_PREFIX))
        .ok_or_else(|| unauthorized("Missing or malformed API key"))?;

    let key = state
        .db()
        .api_keys()
        .find_by_hash(&hash_api_key(token))
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
        })?
        .filter(|key| key.is_active)
        .ok_or_else(|| unauthorized("Invalid API key"))?;

    let now = current_timestamp();
    if key.expires_at.as_deref().is_some_and(|expires| expires <= now.as_str()) {
        debug!(key_id = %key.id, "Rejected expired API key");
        return Err(unauthorized("API key has expired"));
    }

    if let Err(e) = state.db().api_keys().touch(&key.id, &now).await {
        warn!(key_id = %key.id, error = %e, "Failed to record API key use");
    }

    request
        .extensions_mut()
        .insert(FamilyScope::new(key.family_id));

    Ok(next.run(request).await)
}
