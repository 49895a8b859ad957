//! Origin name data infrastructure

pub mod name_repository;

pub use name_repository::SqlxNameRepository;
