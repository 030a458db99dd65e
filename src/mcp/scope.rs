//! The family an MCP request may act on.

use axum::http::request::Parts;
use rmcp::ErrorData as McpError;
use serde_json::json;

/// Family of the API key that authenticated the request.
///
/// The API key guard stores it in the HTTP request extensions; tools read it
/// back from the request parts rmcp hands them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyScope {
    family_id: String,
}

impl FamilyScope {
    pub fn new(family_id: impl Into<String>) -> Self {
        Self {
            family_id: family_id.into(),
        }
    }

    pub fn family_id(&self) -> &str {
        &self.family_id
    }

    /// Scope stored on the request by the API key guard.
    pub fn from_parts(parts: &Parts) -> Result<Self, McpError> {
        parts.extensions.get::<FamilyScope>().cloned().ok_or_else(|| {
            McpError::invalid_request(
                "unauthenticated",
                Some(json!({"error": "Request was not authenticated with an API key"})),
            )
        })
    }

    /// Refuse anything that belongs to another family.
    pub fn check(&self, family_id: &str) -> Result<(), McpError> {
        if self.family_id == family_id {
            Ok(())
        } else {
            Err(McpError::invalid_params(
                "outside_family",
                Some(json!({"error": "This API key cannot access another family's data"})),
            ))
        }
    }
}
