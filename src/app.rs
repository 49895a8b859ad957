//! Application setup and wiring

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;

use crate::application::credential::{
    CreateApiKeyUseCase, DeactivateApiKeyUseCase, RecordUsageUseCase, ValidateApiKeyUseCase,
};
use crate::application::lookup::LookupService;
use crate::config::{CacheStorageBackend, Config};
use crate::infrastructure::auth::{ApiKeyGenerator, SqlxCredentialRepository};
use crate::infrastructure::cache::{CacheLayer, CacheStore, InMemoryCacheStore, SqlxCacheStore};
use crate::infrastructure::lookup::SqlxNameRepository;
use crate::infrastructure::rate_limiter::{FixedWindowLimiter, InMemoryCounterStorage};
use crate::presentation::middleware::{AdminGuardState, AdmissionState};
use crate::presentation::routes::create_router;

/// Shared state handed to the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub lookup_service: Arc<LookupService>,
    pub cache: Arc<CacheLayer>,
    pub limiter: Arc<FixedWindowLimiter>,
    pub record_usage: Arc<RecordUsageUseCase>,
    pub create_api_key: Arc<CreateApiKeyUseCase>,
    pub deactivate_api_key: Arc<DeactivateApiKeyUseCase>,
    pub key_generator: ApiKeyGenerator,
}

/// Handle returned from create_app for graceful shutdown coordination
pub struct AppHandle {
    pub router: Router,
    pub shutdown_token: CancellationToken,
}

/// Spawns the periodic expired-entry sweep for both cache tiers
fn spawn_cache_cleanup(
    cache: Arc<CacheLayer>,
    interval_seconds: u64,
    shutdown_token: CancellationToken,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));
        // Skip the immediate first tick.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let (l1_removed, l2_removed) = cache.clean_expired().await;
                    if l1_removed > 0 || l2_removed > 0 {
                        tracing::debug!(l1_removed, l2_removed, "Cache cleanup completed");
                    }
                }
                _ = shutdown_token.cancelled() => {
                    tracing::info!("Cache cleanup task shutting down");
                    break;
                }
            }
        }
    });
}

/// Spawns the periodic sweep of lapsed rate limit counters
fn spawn_limiter_cleanup(
    limiter: Arc<FixedWindowLimiter>,
    interval_seconds: u64,
    shutdown_token: CancellationToken,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    limiter.cleanup().await;
                }
                _ = shutdown_token.cancelled() => {
                    tracing::info!("Rate limiter cleanup task shutting down");
                    break;
                }
            }
        }
    });
}

/// Wire up the full application: database pool, cache tiers, rate limiter,
/// use cases, routes, and background tasks.
pub async fn create_app(config: Config) -> Result<AppHandle, Box<dyn std::error::Error>> {
    let config = Arc::new(config);
    let shutdown_token = CancellationToken::new();

    let pool = Arc::new(
        PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .acquire_timeout(Duration::from_secs(config.database.connect_timeout_seconds))
            .connect(&config.database.url)
            .await?,
    );

    let store: Arc<dyn CacheStore> = match config.cache.storage_backend {
        CacheStorageBackend::Postgres => Arc::new(SqlxCacheStore::new(pool.clone())),
        CacheStorageBackend::Memory => {
            tracing::info!("Using in-memory L2 cache store");
            Arc::new(InMemoryCacheStore::new())
        }
    };

    let cache = Arc::new(CacheLayer::new(
        config.cache.key_prefix.clone(),
        config.cache.l1_max_entries,
        store,
    ));

    let name_repository = Arc::new(SqlxNameRepository::new(pool.clone()));
    let credential_repository = Arc::new(SqlxCredentialRepository::new(pool.clone()));

    let key_generator =
        ApiKeyGenerator::new(config.auth.key_prefix.clone(), config.auth.key_length);

    let lookup_service = Arc::new(LookupService::new(
        cache.clone(),
        name_repository,
        &config.cache,
        &config.lookup,
    ));

    let limiter = Arc::new(FixedWindowLimiter::new(
        Arc::new(InMemoryCounterStorage::new()),
        "ratelimit",
        config.rate_limit.window_seconds,
    ));

    let validate_api_key = Arc::new(ValidateApiKeyUseCase::new(
        credential_repository.clone(),
        key_generator.clone(),
        &config.auth,
    ));
    let record_usage = Arc::new(RecordUsageUseCase::new(credential_repository.clone()));
    let create_api_key = Arc::new(CreateApiKeyUseCase::new(
        credential_repository.clone(),
        key_generator.clone(),
        config.rate_limit.tiers.clone(),
    ));
    let deactivate_api_key = Arc::new(DeactivateApiKeyUseCase::new(
        credential_repository,
        key_generator.clone(),
    ));

    spawn_cache_cleanup(
        cache.clone(),
        config.cache.clean_interval_seconds,
        shutdown_token.clone(),
    );
    spawn_limiter_cleanup(
        limiter.clone(),
        config.rate_limit.cleanup_interval_seconds,
        shutdown_token.clone(),
    );

    let admission = Arc::new(AdmissionState {
        validate: validate_api_key,
        limiter: limiter.clone(),
        quotas: config.rate_limit.tiers.clone(),
        enabled: config.rate_limit.enabled,
    });

    let admin_guard_state = Arc::new(AdminGuardState {
        admin_key: config.auth.admin_key.clone(),
    });

    let state = AppState {
        config,
        lookup_service,
        cache,
        limiter,
        record_usage,
        create_api_key,
        deactivate_api_key,
        key_generator,
    };

    let router = create_router(state, admission, admin_guard_state);

    Ok(AppHandle {
        router,
        shutdown_token,
    })
}
