//! Common test utilities shared by the integration test suites

pub mod factories;
pub mod mocks;

#[allow(unused_imports)]
pub use factories::*;
#[allow(unused_imports)]
pub use mocks::*;
