//! Admin endpoints: key management, cache control, rate limit resets

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use uuid::Uuid;

use crate::app::AppState;
use crate::infrastructure::rate_limiter::RateLimitKey;
use crate::presentation::middleware::application_error_to_response;
use crate::presentation::models::{
    ApiKeyResponse, CacheStatsResponse, ClearCacheResponse, CreateApiKeyRequest,
    DeactivateApiKeyRequest, ErrorResponse, ResetRateLimitRequest, WarmCacheResponse,
};

/// POST /api/v1/admin/api-keys
pub async fn create_api_key(
    State(state): State<AppState>,
    Json(request): Json<CreateApiKeyRequest>,
) -> Response {
    match state
        .create_api_key
        .execute(request.name, request.tier)
        .await
    {
        Ok(issued) => (
            StatusCode::CREATED,
            Json(ApiKeyResponse {
                id: issued.id,
                api_key: issued.plaintext_key,
                masked_key: issued.masked_key,
                tier: issued.tier,
                request_limit: issued.request_limit,
            }),
        )
            .into_response(),
        Err(e) => application_error_to_response(e.into()),
    }
}

/// DELETE /api/v1/admin/api-keys
pub async fn deactivate_api_key(
    State(state): State<AppState>,
    Json(request): Json<DeactivateApiKeyRequest>,
) -> Response {
    match state.deactivate_api_key.execute(&request.api_key).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => application_error_to_response(e.into()),
    }
}

/// POST /api/v1/admin/cache/warm
pub async fn warm_cache(State(state): State<AppState>) -> Response {
    match state.lookup_service.warm_cache().await {
        Ok(warmed) => Json(WarmCacheResponse { warmed }).into_response(),
        Err(e) => application_error_to_response(e.into()),
    }
}

/// POST /api/v1/admin/cache/clear
pub async fn clear_cache(State(state): State<AppState>) -> Response {
    let removed = state.cache.clear().await;
    Json(ClearCacheResponse { removed }).into_response()
}

/// GET /api/v1/admin/cache/stats
pub async fn cache_stats(State(state): State<AppState>) -> Response {
    let stats = state.cache.stats().await;
    Json(CacheStatsResponse {
        l1_entries: stats.l1_entries,
        l2_entries: stats.l2_entries,
    })
    .into_response()
}

/// POST /api/v1/admin/rate-limit/reset
///
/// Resets the fixed-window counter for exactly one key kind.
pub async fn reset_rate_limit(
    State(state): State<AppState>,
    Json(request): Json<ResetRateLimitRequest>,
) -> Response {
    let key = match (request.api_key, request.ip) {
        (Some(api_key), None) => {
            RateLimitKey::ApiKey(state.key_generator.hash_key(&api_key).as_str().to_string())
        }
        (None, Some(ip)) => RateLimitKey::Ip(ip),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    code: "INVALID_RESET_TARGET".to_string(),
                    message: "Provide exactly one of api_key or ip".to_string(),
                    details: None,
                    request_id: Uuid::new_v4(),
                    timestamp: Utc::now(),
                }),
            )
                .into_response();
        }
    };

    match state.limiter.reset(&key).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(message) => {
            tracing::error!(error = %message, "Failed to reset rate limit counter");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "Failed to reset rate limit counter".to_string(),
                    details: None,
                    request_id: Uuid::new_v4(),
                    timestamp: Utc::now(),
                }),
            )
                .into_response()
        }
    }
}
