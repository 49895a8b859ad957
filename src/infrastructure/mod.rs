//! Infrastructure layer: cache tiers, rate limiting, and repository implementations

pub mod auth;
pub mod cache;
pub mod lookup;
pub mod rate_limiter;
