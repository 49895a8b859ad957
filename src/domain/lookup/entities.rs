//! Lookup domain entities

use serde::{Deserialize, Serialize};

use super::value_objects::{Gender, NameLookup};

/// A name record from the origin data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameRecord {
    pub name: String,
    pub gender: Gender,
    pub english_name: Option<String>,
    /// Ranking key used by cache warming to pick the hottest records
    pub popularity: i64,
}

impl NameRecord {
    /// Convert to a full-confidence lookup result
    pub fn into_lookup(self) -> NameLookup {
        NameLookup {
            name: self.name,
            gender: self.gender,
            english_name: self.english_name,
            confidence: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_into_lookup() {
        let record = NameRecord {
            name: "علی".to_string(),
            gender: Gender::Male,
            english_name: Some("ali".to_string()),
            popularity: 9000,
        };
        let lookup = record.into_lookup();
        assert_eq!(lookup.gender, Gender::Male);
        assert_eq!(lookup.confidence, 1.0);
        assert_eq!(lookup.english_name.as_deref(), Some("ali"));
    }
}
