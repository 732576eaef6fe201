//! Result type definitions

use crate::query::scalar_to_string;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Identifier of a hit, as returned by the service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HitId {
    Integer(i64),
    /// Ids outside the `i64` range, or fractional ids
    Number(Number),
    Text(String),
}

impl fmt::Display for HitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(id) => write!(f, "{}", id),
            Self::Number(id) => write!(f, "{}", id),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for HitId {
    fn from(id: i64) -> Self {
        Self::Integer(id)
    }
}

impl From<&str> for HitId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for HitId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

/// A single hit from the search service.
///
/// Apart from `id`, the fields are whatever the service returned; no schema
/// is imposed on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub id: HitId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Hit {
    pub fn new(id: impl Into<HitId>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Add a field to the hit
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title").and_then(Value::as_str)
    }

    /// The `type` field rendered as text; numbers and booleans are stringified
    pub fn record_type(&self) -> Option<String> {
        self.get("type").and_then(scalar_to_string)
    }
}

/// A `{ type => id }` pointer to the record a hit stands for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    pub record_type: String,
    pub id: HitId,
}

impl Record {
    pub fn new(record_type: impl Into<String>, id: impl Into<HitId>) -> Self {
        Self {
            record_type: record_type.into(),
            id: id.into(),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.record_type, &self.id)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hit_keeps_open_fields() {
        let hit: Hit =
            serde_json::from_value(json!({"id": 1, "title": "Foobar", "type": "cat", "year": 1977}))
                .unwrap();
        assert_eq!(hit.id, HitId::Integer(1));
        assert_eq!(hit.title(), Some("Foobar"));
        assert_eq!(hit.record_type().as_deref(), Some("cat"));
        assert_eq!(hit.get("year"), Some(&json!(1977)));
        assert_eq!(hit.get("missing"), None);
        assert!(!hit.fields.contains_key("id"));
    }

    #[test]
    fn test_scalar_record_type_is_stringified() {
        let hit: Hit = serde_json::from_value(json!({"id": 1, "type": 5})).unwrap();
        assert_eq!(hit.record_type().as_deref(), Some("5"));

        let hit: Hit = serde_json::from_value(json!({"id": 1, "type": {"name": "cat"}})).unwrap();
        assert_eq!(hit.record_type(), None);
    }

    #[test]
    fn test_text_id() {
        let hit: Hit = serde_json::from_value(json!({"id": "tt0076759"})).unwrap();
        assert_eq!(hit.id, HitId::from("tt0076759"));
        assert_eq!(hit.id.to_string(), "tt0076759");
    }

    #[test]
    fn test_wide_and_fractional_ids() {
        let hit: Hit = serde_json::from_value(json!({"id": u64::MAX})).unwrap();
        assert!(matches!(hit.id, HitId::Number(_)));
        assert_eq!(hit.id.to_string(), "18446744073709551615");

        let hit: Hit = serde_json::from_value(json!({"id": 1.5})).unwrap();
        assert_eq!(hit.id.to_string(), "1.5");
        assert_eq!(serde_json::to_value(&hit).unwrap(), json!({"id": 1.5}));
    }

    #[test]
    fn test_hit_serializes_flat() {
        let hit = Hit::new(2i64).with_field("title", "Foobar2").with_field("type", "dog");
        assert_eq!(
            serde_json::to_value(&hit).unwrap(),
            json!({"id": 2, "title": "Foobar2", "type": "dog"})
        );
    }

    #[test]
    fn test_record_serializes_as_single_entry() {
        let record = Record::new("MediaFile", 1i64);
        assert_eq!(serde_json::to_value(&record).unwrap(), json!({"MediaFile": 1}));
    }
}
