//! Lookup value objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Gender associated with a given name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MALE" => Ok(Gender::Male),
            "FEMALE" => Ok(Gender::Female),
            "UNKNOWN" => Ok(Gender::Unknown),
            other => Err(format!("Unknown gender: {}", other)),
        }
    }
}

/// Result of a single name lookup, cacheable as an opaque payload.
///
/// `confidence` is 1.0 for a direct origin match and 0.0 for not-found or
/// per-item failures in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameLookup {
    pub name: String,
    pub gender: Gender,
    pub english_name: Option<String>,
    pub confidence: f32,
}

impl NameLookup {
    /// Zero-confidence result for an unknown or failed name
    pub fn unknown(name: &str) -> Self {
        Self {
            name: name.to_string(),
            gender: Gender::Unknown,
            english_name: None,
            confidence: 0.0,
        }
    }
}
