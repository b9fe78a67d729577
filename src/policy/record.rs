// SPDX-License-Identifier: MIT

//! Applicant records
//!
//! A record is a flat JSON object mapping field names to text or numbers.
//! Absent keys and `null` both count as missing.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::rule::Scalar;

/// The data object tested against a policy
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: HashMap<String, Value>,
}

/// Result of looking a field up in a record
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Key absent or `null`
    Missing,
    /// Boolean, array or object
    Unsupported,
    Found(Scalar),
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from a JSON object; `None` for any other JSON value
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self {
                fields: map.into_iter().collect(),
            }),
            _ => None,
        }
    }

    /// Set a field, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Builder form of [`Record::insert`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Resolve a field to a comparable scalar
    pub fn lookup(&self, key: &str) -> Lookup {
        match self.fields.get(key) {
            None | Some(Value::Null) => Lookup::Missing,
            Some(Value::String(s)) => Lookup::Found(Scalar::Text(s.clone())),
            Some(Value::Number(n)) => match n.as_f64() {
                Some(f) => Lookup::Found(Scalar::Number(f)),
                None => Lookup::Unsupported,
            },
            Some(_) => Lookup::Unsupported,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_scalars() {
        let record = Record::new()
            .with("region", "Fes")
            .with("chiffre_affaires", 150000);

        assert_eq!(record.lookup("region"), Lookup::Found(Scalar::from("Fes")));
        assert_eq!(
            record.lookup("chiffre_affaires"),
            Lookup::Found(Scalar::Number(150000.0))
        );
    }

    #[test]
    fn test_absent_and_null_are_missing() {
        let record = Record::new().with("secteur_activite", Value::Null);

        assert_eq!(record.lookup("secteur_activite"), Lookup::Missing);
        assert_eq!(record.lookup("nonexistent"), Lookup::Missing);
    }

    #[test]
    fn test_non_scalar_values_are_unsupported() {
        let record = Record::new()
            .with("flag", true)
            .with("tags", json!(["a", "b"]))
            .with("nested", json!({"a": 1}));

        assert_eq!(record.lookup("flag"), Lookup::Unsupported);
        assert_eq!(record.lookup("tags"), Lookup::Unsupported);
        assert_eq!(record.lookup("nested"), Lookup::Unsupported);
    }

    #[test]
    fn test_deserialize_from_object() {
        let record: Record = serde_json::from_value(json!({
            "type_applicant": "physique",
            "annee_creation": 2023
        }))
        .unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(
            record.lookup("type_applicant"),
            Lookup::Found(Scalar::from("physique"))
        );
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        assert!(Record::from_json(json!([1, 2])).is_none());
        assert!(Record::from_json(json!({"a": 1})).is_some());
    }

    #[test]
    fn test_insert_overwrites() {
        let mut record = Record::new();
        assert!(record.is_empty());
        record.insert("region", "Fes");
        record.insert("region", "Rabat");
        assert_eq!(record.len(), 1);
        assert_eq!(record.lookup("region"), Lookup::Found(Scalar::from("Rabat")));
    }
}
