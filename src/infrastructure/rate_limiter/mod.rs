//! Tiered fixed-window rate limiting
//!
//! Admission control for the lookup API. Every request is counted against a
//! per-credential (or per-IP) window; the limiter fails open when its storage
//! backend is unavailable.

pub mod fixed_window;
pub mod storage;
pub mod types;

pub use fixed_window::FixedWindowLimiter;
pub use storage::{InMemoryCounterStorage, RateCounterStorage};
pub use types::{FixedWindowState, RateLimitKey, RateLimitResult};
