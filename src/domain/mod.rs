//! Domain layer: entities, value objects, and repository interfaces

pub mod credential;
pub mod lookup;
