// SPDX-License-Identifier: MIT

//! Field catalogue
//!
//! Descriptive metadata about the record fields a policy may test. The
//! evaluator does not need it; the authoring tool and the validator do.

use serde::{Deserialize, Serialize};

use super::rule::{Operator, Scalar};

/// Set of fields available to policy authors
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FieldCatalogue {
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

/// How a record attribute may be compared
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    #[serde(alias = "value_kind")]
    pub value_kind: ValueKind,
    /// Enumeration for categorical fields, in display order
    #[serde(default, alias = "values", alias = "allowed_values")]
    pub allowed_values: Vec<AllowedValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AllowedValue {
    pub name: String,
    pub label: String,
}

/// Supported value kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// One of an enumerated set of names
    Categorical,
    Numeric,
    Text,
}

static CATEGORICAL_OPERATORS: [Operator; 4] =
    [Operator::Eq, Operator::NotEq, Operator::In, Operator::NotIn];

static NUMERIC_OPERATORS: [Operator; 9] = [
    Operator::Eq,
    Operator::NotEq,
    Operator::Lt,
    Operator::Lte,
    Operator::Gt,
    Operator::Gte,
    Operator::Between,
    Operator::In,
    Operator::NotIn,
];

static TEXT_OPERATORS: [Operator; 12] = [
    Operator::Eq,
    Operator::NotEq,
    Operator::Lt,
    Operator::Lte,
    Operator::Gt,
    Operator::Gte,
    Operator::Contains,
    Operator::DoesNotContain,
    Operator::StartsWith,
    Operator::EndsWith,
    Operator::In,
    Operator::NotIn,
];

impl ValueKind {
    pub const ALL: [ValueKind; 3] = [ValueKind::Categorical, ValueKind::Numeric, ValueKind::Text];

    /// Operators that make sense for this kind
    pub fn operators(&self) -> &'static [Operator] {
        match self {
            ValueKind::Categorical => &CATEGORICAL_OPERATORS,
            ValueKind::Numeric => &NUMERIC_OPERATORS,
            ValueKind::Text => &TEXT_OPERATORS,
        }
    }

    pub fn admits(&self, operator: &Operator) -> bool {
        self.operators().contains(operator)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Categorical => "categorical",
            ValueKind::Numeric => "numeric",
            ValueKind::Text => "text",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, label: impl Into<String>, value_kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            value_kind,
            allowed_values: Vec::new(),
        }
    }

    pub fn with_values(mut self, values: &[(&str, &str)]) -> Self {
        self.allowed_values = values
            .iter()
            .map(|(name, label)| AllowedValue {
                name: name.to_string(),
                label: label.to_string(),
            })
            .collect();
        self
    }

    /// Whether a literal belongs to the enumeration. Fields without an
    /// enumeration accept anything.
    pub fn allows(&self, value: &Scalar) -> bool {
        if self.allowed_values.is_empty() {
            return true;
        }
        let text = value.to_string();
        self.allowed_values.iter().any(|v| v.name == text)
    }
}

impl FieldCatalogue {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
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

    #[test]
    fn test_catalogue_deserialize() {
        let yaml = r#"
            fields:
              - name: region
                label: Région
                valueKind: categorical
                allowedValues:
                  - { name: Tanger, label: Tanger-Tétouan-Al Hoceïma }
                  - { name: Fes, label: Fès-Meknès }
              - name: chiffre_affaires
                label: Chiffre d'affaires
                valueKind: numeric
        "#;
        let catalogue: FieldCatalogue = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(catalogue.len(), 2);
        let region = catalogue.get("region").unwrap();
        assert_eq!(region.value_kind, ValueKind::Categorical);
        assert_eq!(region.allowed_values[1].name, "Fes");
        assert!(catalogue.get("chiffre_affaires").unwrap().allowed_values.is_empty());
        assert!(catalogue.get("sexe").is_none());
    }

    #[test]
    fn test_values_alias() {
        let json = serde_json::json!({
            "fields": [{
                "name": "sexe",
                "label": "Sexe",
                "value_kind": "categorical",
                "values": [{ "name": "Homme", "label": "Homme" }]
            }]
        });
        let catalogue: FieldCatalogue = serde_json::from_value(json).unwrap();
        assert_eq!(catalogue.fields[0].allowed_values.len(), 1);
    }

    #[test]
    fn test_operators_by_kind() {
        assert!(ValueKind::Categorical.admits(&Operator::In));
        assert!(!ValueKind::Categorical.admits(&Operator::Gt));
        assert!(ValueKind::Numeric.admits(&Operator::Between));
        assert!(!ValueKind::Numeric.admits(&Operator::Contains));
        assert!(ValueKind::Text.admits(&Operator::StartsWith));
        assert!(!ValueKind::Text.admits(&Operator::Between));
        for kind in ValueKind::ALL {
            assert!(!kind.admits(&Operator::Unknown("like".to_string())));
        }
    }

    #[test]
    fn test_allows() {
        let sexe = FieldDescriptor::new("sexe", "Sexe", ValueKind::Categorical)
            .with_values(&[("Homme", "Homme"), ("Femme", "Femme")]);
        assert!(sexe.allows(&Scalar::from("Femme")));
        assert!(!sexe.allows(&Scalar::from("femme")));

        let annee = FieldDescriptor::new("annee_creation", "Année de création", ValueKind::Numeric);
        assert!(annee.allows(&Scalar::Number(2023.0)));
    }
}
