//! Name lookup endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use uuid::Uuid;

use crate::app::AppState;
use crate::presentation::middleware::{RequestIdentity, application_error_to_response};
use crate::presentation::models::{
    BatchLookupRequest, BatchLookupResponse, ErrorResponse, LookupResponse,
};

/// GET /api/v1/names/{name}
pub async fn get_name(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(name): Path<String>,
) -> Response {
    let outcome = match state.lookup_service.lookup(&name).await {
        Ok(outcome) => outcome,
        Err(e) => return application_error_to_response(e.into()),
    };

    // Origin hits count against the credential's usage quota; cache hits do not.
    if !outcome.cache_hit
        && let Some(key_hash) = identity.key_hash
    {
        let record_usage = state.record_usage.clone();
        tokio::spawn(async move {
            record_usage.execute(&key_hash).await;
        });
    }

    let cache_status = if outcome.cache_hit { "HIT" } else { "MISS" };
    let mut response = Json(LookupResponse::from_lookup(
        outcome.result,
        outcome.cache_hit,
    ))
    .into_response();
    response
        .headers_mut()
        .insert("x-cache", HeaderValue::from_static(cache_status));
    response
}

/// POST /api/v1/names/batch
pub async fn lookup_batch(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Json(request): Json<BatchLookupRequest>,
) -> Response {
    let max = state.config.lookup.max_batch_size;
    if request.names.is_empty() || request.names.len() > max {
        // The request never reached the origin; refund the admission hit.
        state.limiter.decrement(&identity.rate_key).await;

        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                code: "INVALID_BATCH".to_string(),
                message: format!("Batch must contain between 1 and {} names", max),
                details: Some(serde_json::json!({ "received": request.names.len() })),
                request_id: Uuid::new_v4(),
                timestamp: Utc::now(),
            }),
        )
            .into_response();
    }

    let outcome = state.lookup_service.lookup_batch(&request.names).await;

    if outcome.origin_misses > 0
        && let Some(key_hash) = identity.key_hash
    {
        let record_usage = state.record_usage.clone();
        let misses = outcome.origin_misses;
        tokio::spawn(async move {
            for _ in 0..misses {
                record_usage.execute(&key_hash).await;
            }
        });
    }

    let results = outcome
        .results
        .into_iter()
        .map(|item| LookupResponse::from_lookup(item.result, item.cache_hit))
        .collect();

    Json(BatchLookupResponse {
        results,
        error_count: outcome.error_count,
    })
    .into_response()
}
