// --- File: crates/sellerhub_shopee/src/error.rs ---
use crate::signer::SignatureError;
use sellerhub_common::{external_service_error, HttpStatusCode, SellerHubError};
use sellerhub_db::DbError;
use thiserror::Error;

/// Shopee integration error types.
#[derive(Error, Debug)]
pub enum ShopeeError {
    /// Partner, shop credentials or another required record is missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller input failed validation before anything was sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Signature error: {0}")]
    Signature(#[from] SignatureError),

    /// The provider answered with a non-empty `error` field or a non-success status
    #[error("Shopee API returned an error: {error} - {message} (request_id: {request_id})")]
    Provider {
        error: String,
        message: String,
        request_id: String,
    },

    /// Network failure, timeout or unreadable body
    #[error("Shopee API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response envelope was fine but its payload did not decode
    #[error("Failed to parse Shopee API response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A wire record could not be turned into a domain entity
    #[error("Mapping failed: {0}")]
    Mapping(String),

    #[error("Persistence error: {0}")]
    Persistence(DbError),

    /// Refreshing an expired access token failed; the stored credentials are untouched
    #[error("Token refresh for shop {shop_id} failed: {source}")]
    RefreshFailed {
        shop_id: String,
        #[source]
        source: Box<ShopeeError>,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Shopee configuration error: {0}")]
    Config(String),
}

impl ShopeeError {
    pub fn provider(
        error: impl Into<String>,
        message: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        ShopeeError::Provider {
            error: error.into(),
            message: message.into(),
            request_id: request_id.into(),
        }
    }

    /// `Some(code)` for provider-reported failures.
    pub fn provider_code(&self) -> Option<&str> {
        match self {
            ShopeeError::Provider { error, .. } => Some(error),
            ShopeeError::RefreshFailed { source, .. } => source.provider_code(),
            _ => None,
        }
    }
}

impl From<DbError> for ShopeeError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(msg) => ShopeeError::NotFound(msg),
            other => ShopeeError::Persistence(other),
        }
    }
}

impl From<ShopeeError> for SellerHubError {
    fn from(err: ShopeeError) -> Self {
        match err {
            ShopeeError::NotFound(msg) => SellerHubError::NotFoundError(msg),
            ShopeeError::InvalidInput(msg) => SellerHubError::ValidationError(msg),
            ShopeeError::Signature(e) => SellerHubError::ValidationError(e.to_string()),
            ShopeeError::Provider {
                error,
                message,
                request_id,
            } => external_service_error(
                "Shopee API",
                format!("{}: {} (request_id: {})", error, message, request_id),
            ),
            ShopeeError::Transport(e) => SellerHubError::from(e),
            ShopeeError::Decode(e) => {
                SellerHubError::ParseError(format!("Shopee response parse error: {}", e))
            }
            ShopeeError::Mapping(msg) => SellerHubError::ParseError(msg),
            ShopeeError::Persistence(e) => SellerHubError::from(e),
            ShopeeError::RefreshFailed { shop_id, source } => match SellerHubError::from(*source) {
                SellerHubError::ExternalServiceError {
                    service_name,
                    message,
                } => SellerHubError::ExternalServiceError {
                    service_name,
                    message: format!("token refresh for shop {}: {}", shop_id, message),
                },
                other => other,
            },
            ShopeeError::Cancelled => {
                SellerHubError::CancelledError("Shopee operation cancelled".to_string())
            }
            ShopeeError::Config(msg) => SellerHubError::ConfigError(msg),
        }
    }
}

impl HttpStatusCode for ShopeeError {
    fn status_code(&self) -> u16 {
        match self {
            ShopeeError::NotFound(_) => 404,
            ShopeeError::InvalidInput(_) => 400,
            ShopeeError::Signature(_) => 400,
            ShopeeError::Provider { .. } => 502,
            ShopeeError::Transport(e) if e.is_timeout() => 504,
            ShopeeError::Transport(_) => 502,
            ShopeeError::Decode(_) => 502,
            ShopeeError::Mapping(_) => 502,
            ShopeeError::Persistence(DbError::Conflict(_)) => 409,
            ShopeeError::Persistence(_) => 500,
            ShopeeError::RefreshFailed { source, .. } => source.status_code(),
            ShopeeError::Cancelled => 499,
            ShopeeError::Config(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_map_to_bad_gateway() {
        let err = ShopeeError::provider("error_auth", "invalid token", "req-1");
        assert_eq!(err.status_code(), 502);
        assert_eq!(err.provider_code(), Some("error_auth"));

        let boundary = SellerHubError::from(err);
        assert_eq!(boundary.status_code(), 502);
        assert!(boundary.to_string().contains("error_auth"));
    }

    #[test]
    fn refresh_failure_keeps_inner_classification() {
        let err = ShopeeError::RefreshFailed {
            shop_id: "5501".to_string(),
            source: Box::new(ShopeeError::provider("error_param", "bad refresh", "r")),
        };
        assert_eq!(err.status_code(), 502);
        assert_eq!(err.provider_code(), Some("error_param"));
        assert!(SellerHubError::from(err).to_string().contains("shop 5501"));
    }

    #[test]
    fn db_not_found_becomes_not_found() {
        let err = ShopeeError::from(DbError::NotFound("order X".into()));
        assert!(matches!(err, ShopeeError::NotFound(_)));
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn cancelled_and_signature_statuses() {
        assert_eq!(ShopeeError::Cancelled.status_code(), 499);
        let sig = ShopeeError::from(SignatureError::InvalidScope("x".into()));
        assert_eq!(sig.status_code(), 400);
        assert_eq!(SellerHubError::from(sig).status_code(), 400);
    }
}
