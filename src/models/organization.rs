use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single coaching institute's tenant record.
///
/// Fields beyond `id` and `name` vary between deployments and are kept as-is
/// in `metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl Organization {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_is_flattened() {
        let org: Organization = serde_json::from_value(json!({
            "id": "org1",
            "name": "Acme",
            "city": "Pune",
            "branches": 3
        }))
        .unwrap();

        assert_eq!(org.id, "org1");
        assert_eq!(org.name, "Acme");
        assert_eq!(org.metadata.get("city"), Some(&json!("Pune")));
        assert_eq!(org.metadata.get("branches"), Some(&json!(3)));
    }

    #[test]
    fn test_metadata_serializes_alongside_fields() {
        let org = Organization::new("org1", "Acme").with_metadata("city", json!("Pune"));

        assert_eq!(
            serde_json::to_value(&org).unwrap(),
            json!({ "id": "org1", "name": "Acme", "city": "Pune" })
        );
    }
}
