//! Lookup use cases

pub mod service;

pub use service::{BatchOutcome, LookupOutcome, LookupService};
