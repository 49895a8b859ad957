//! NameLens - gender and romanization lookup API for given names
//!
//! A cache-first lookup service: every request flows through credential
//! validation, tiered rate limiting, a two-tier cache, and only then the
//! origin data source.

pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod presentation;

pub use app::{AppHandle, AppState, create_app};
pub use config::Config;
pub use logging::init_tracing;
