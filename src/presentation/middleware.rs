//! HTTP middleware: admission control, admin gating, error mapping, logging

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::application::credential::ValidateApiKeyUseCase;
use crate::application::errors::ApplicationError;
use crate::config::TierQuotasConfig;
use crate::domain::credential::{ApiKeyHash, CredentialError, Tier};
use crate::domain::lookup::LookupError;
use crate::infrastructure::rate_limiter::{FixedWindowLimiter, RateLimitKey, RateLimitResult};
use crate::presentation::models::ErrorResponse;

/// Identity resolved by admission control, carried as a request extension.
///
/// `key_hash` is None for anonymous callers; `rate_key` is the key the
/// fixed-window counter was charged under.
#[derive(Debug, Clone)]
pub struct RequestIdentity {
    pub key_hash: Option<ApiKeyHash>,
    pub tier: Tier,
    pub request_limit: u32,
    pub rate_key: RateLimitKey,
}

/// Shared state for the admission middleware
pub struct AdmissionState {
    pub validate: Arc<ValidateApiKeyUseCase>,
    pub limiter: Arc<FixedWindowLimiter>,
    pub quotas: TierQuotasConfig,
    pub enabled: bool,
}

/// Extract a presented API key: X-API-Key first, then Authorization
fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-api-key")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get(axum::http::header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|s| {
                    let s = s.trim();
                    s.strip_prefix("Bearer ")
                        .or_else(|| s.strip_prefix("token "))
                        .map(|rest| rest.trim().to_string())
                })
                .filter(|s| !s.is_empty())
        })
}

/// Best-effort client IP for proxied requests
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| "unknown-ip".to_string())
}

fn apply_rate_limit_headers(headers: &mut HeaderMap, result: &RateLimitResult) {
    headers.insert("x-ratelimit-limit", HeaderValue::from(result.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(result.remaining));

    // Reset is advertised as an ISO timestamp, not a raw epoch value.
    let reset = chrono::DateTime::from_timestamp(result.reset_at as i64, 0)
        .unwrap_or_else(Utc::now)
        .to_rfc3339();
    if let Ok(val) = HeaderValue::from_str(&reset) {
        headers.insert("x-ratelimit-reset", val);
    }
}

/// Admission control: resolve the caller's identity, then charge the
/// fixed-window counter before the request reaches a handler.
///
/// A presented-but-invalid key is rejected outright rather than being
/// downgraded to anonymous access.
pub async fn admission_middleware(
    State(state): State<Arc<AdmissionState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = match extract_api_key(request.headers()) {
        Some(key) => match state.validate.execute(&key).await {
            Ok(validation) => RequestIdentity {
                rate_key: RateLimitKey::ApiKey(validation.key_hash.as_str().to_string()),
                key_hash: Some(validation.key_hash),
                tier: validation.tier,
                request_limit: validation.request_limit,
            },
            Err(e) => return credential_error_to_response(e),
        },
        None => RequestIdentity {
            key_hash: None,
            tier: Tier::Free,
            request_limit: Tier::Free.requests_per_window(&state.quotas),
            rate_key: RateLimitKey::Ip(client_ip(request.headers())),
        },
    };

    if !state.enabled {
        request.extensions_mut().insert(identity);
        return next.run(request).await;
    }

    let result = state
        .limiter
        .check_and_increment(&identity.rate_key, identity.request_limit)
        .await;

    if !result.allowed {
        let retry_after = result.retry_after.unwrap_or(0);
        tracing::warn!(
            tier = %identity.tier,
            retry_after,
            "Rate limit exceeded"
        );

        let mut response = (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse {
                code: "RATE_LIMIT_EXCEEDED".to_string(),
                message: format!(
                    "Rate limit exceeded. Please retry after {} seconds.",
                    retry_after
                ),
                details: Some(serde_json::json!({
                    "retry_after": retry_after,
                    "limit": result.limit,
                    "tier": identity.tier.as_str(),
                })),
                request_id: Uuid::new_v4(),
                timestamp: Utc::now(),
            }),
        )
            .into_response();

        apply_rate_limit_headers(response.headers_mut(), &result);
        if let Ok(val) = HeaderValue::from_str(&retry_after.to_string()) {
            response.headers_mut().insert("retry-after", val);
        }
        return response;
    }

    request.extensions_mut().insert(identity);
    let mut response = next.run(request).await;
    apply_rate_limit_headers(response.headers_mut(), &result);
    response
}

/// Shared state for the admin guard
pub struct AdminGuardState {
    pub admin_key: Option<String>,
}

/// Gate admin endpoints behind the configured shared secret.
/// Unconfigured deployments hide the endpoints entirely.
pub async fn admin_guard(
    State(state): State<Arc<AdminGuardState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.admin_key.as_deref() else {
        return error_response(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found",
            None,
        );
    };

    let presented = request
        .headers()
        .get("x-admin-key")
        .and_then(|h| h.to_str().ok());

    if presented != Some(expected) {
        return error_response(
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "Invalid or missing admin key",
            None,
        );
    }

    next.run(request).await
}

/// Rewrite the bare timeout rejection emitted by the timeout layer into the
/// standard error envelope. Must sit outside the timeout layer; nothing else
/// in the stack produces a 408.
pub async fn timeout_envelope_middleware(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    if response.status() != StatusCode::REQUEST_TIMEOUT {
        return response;
    }

    tracing::warn!("Request exceeded the global timeout");
    error_response(
        StatusCode::REQUEST_TIMEOUT,
        "TIMEOUT",
        "Request exceeded the global timeout",
        None,
    )
}

/// Request logging middleware with timing and request ID
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = Uuid::new_v4();
    let start_time = Instant::now();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        "Processing request"
    );

    let response = next.run(request).await;
    let duration = start_time.elapsed();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %response.status(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}

fn error_response(
    status: StatusCode,
    code: &str,
    message: &str,
    details: Option<serde_json::Value>,
) -> Response {
    (
        status,
        Json(ErrorResponse {
            code: code.to_string(),
            message: message.to_string(),
            details,
            request_id: Uuid::new_v4(),
            timestamp: Utc::now(),
        }),
    )
        .into_response()
}

fn credential_error_to_response(error: CredentialError) -> Response {
    let (status, code, message) = match &error {
        CredentialError::NotFound | CredentialError::Inactive => (
            StatusCode::UNAUTHORIZED,
            "INVALID_API_KEY",
            "Invalid or inactive API key",
        ),
        CredentialError::QuotaExceeded => (
            StatusCode::TOO_MANY_REQUESTS,
            "QUOTA_EXCEEDED",
            "API key usage quota exhausted",
        ),
        CredentialError::InvalidTier { .. } => {
            (StatusCode::BAD_REQUEST, "INVALID_TIER", "Unknown tier")
        }
        CredentialError::Storage { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "Internal server error",
        ),
    };

    tracing::warn!(error = %error, http_status = %status, "Credential check failed");
    error_response(status, code, message, None)
}

/// Convert ApplicationError to an HTTP response
pub fn application_error_to_response(error: ApplicationError) -> Response {
    let (status, code, message) = match &error {
        ApplicationError::Credential(inner) => return credential_error_to_response(inner.clone()),
        ApplicationError::Lookup(LookupError::EmptyName) => (
            StatusCode::BAD_REQUEST,
            "EMPTY_NAME",
            "Name must not be empty",
        ),
        ApplicationError::Lookup(LookupError::Storage { .. }) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "ORIGIN_UNAVAILABLE",
            "Name data source is unavailable",
        ),
    };

    tracing::error!(
        error = %error,
        http_status = %status,
        error_code = code,
        "Application error mapped to HTTP response"
    );

    error_response(status, code, message, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_api_key_prefers_dedicated_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("nl_abc"));
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer nl_def"),
        );
        assert_eq!(extract_api_key(&headers), Some("nl_abc".to_string()));
    }

    #[test]
    fn test_extract_api_key_from_authorization() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("token nl_def"),
        );
        assert_eq!(extract_api_key(&headers), Some("nl_def".to_string()));
    }

    #[test]
    fn test_extract_api_key_absent() {
        assert_eq!(extract_api_key(&HeaderMap::new()), None);
    }

    #[test]
    fn test_client_ip_takes_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers), "203.0.113.9");
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip_then_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.7"));
        assert_eq!(client_ip(&headers), "198.51.100.7");

        assert_eq!(client_ip(&HeaderMap::new()), "unknown-ip");
    }
}
