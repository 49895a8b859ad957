//! Name lookup domain: records, results, and the origin interface

pub mod entities;
pub mod errors;
pub mod repositories;
pub mod value_objects;

pub use entities::NameRecord;
pub use errors::LookupError;
pub use repositories::INameRepository;
pub use value_objects::{Gender, NameLookup};
