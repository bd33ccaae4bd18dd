use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Request Bodies
// ============================================================================

/// POST /cart/{uid}
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub sku_id: String,
    pub quantity: u32,
    pub added_at: i64,
}

/// PATCH /cart/{uid}/{skuId}
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateCartItemRequest {
    pub quantity: u32,
}

// ============================================================================
// Repository Error Type
// ============================================================================

/// Failure of a cart repository call. `Display` is the bare human-readable
/// message so it can be shown to the user unchanged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// The request never produced a response.
    #[error("{0}")]
    Network(String),
    /// The server answered with an error or an unreadable body.
    #[error("{message}")]
    Server { status: u16, message: String },
    /// The cart or line does not exist on the server.
    #[error("{0}")]
    NotFound(String),
    /// The request was rejected as malformed.
    #[error("{0}")]
    Validation(String),
}

impl RepositoryError {
    /// Build a server error the way the storefront client words it.
    pub fn from_http_response(status: u16, reason: &str, url: &str, body: &str) -> Self {
        Self::Server {
            status,
            message: format!("API Error {} {} at {}: {}", status, reason, url, body),
        }
    }

    pub fn network(url: &str, cause: impl std::fmt::Display) -> Self {
        Self::Network(format!("Network error when fetching {}: {}", url, cause))
    }

    pub fn message(&self) -> &str {
        match self {
            RepositoryError::Network(message)
            | RepositoryError::Server { message, .. }
            | RepositoryError::NotFound(message)
            | RepositoryError::Validation(message) => message,
        }
    }
}
