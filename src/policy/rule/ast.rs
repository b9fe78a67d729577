// SPDX-License-Identifier: MIT

//! Policy tree types
//!
//! The serialized shape is the one emitted by the policy authoring tool:
//! groups are `{ "combinator": "and", "rules": [...] }` and predicates are
//! `{ "field": "region", "operator": "in", "value": ["Tanger", "Fes"] }`.
//! Extra keys such as `id` are ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A node of the policy tree
///
/// A JSON object carrying a `combinator` is a group, anything else is a
/// predicate.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RuleNode {
    Group(RuleGroup),
    Predicate(Predicate),
}

/// Internal node combining its children with AND / OR
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RuleGroup {
    pub combinator: Combinator,
    #[serde(default)]
    pub rules: Vec<RuleNode>,
}

/// Leaf comparison between one record field and a literal
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Predicate {
    pub field: String,
    pub operator: Operator,
    #[serde(default)]
    pub value: RuleValue,
}

/// How a group combines its children
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum Combinator {
    And,
    Or,
    /// Anything else found on the wire; evaluates to false
    Unknown(String),
}

/// Comparison operators
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    /// =
    Eq,
    /// !=
    NotEq,
    /// <
    Lt,
    /// <=
    Lte,
    /// >
    Gt,
    /// >=
    Gte,
    Contains,
    DoesNotContain,
    StartsWith,
    EndsWith,
    In,
    NotIn,
    Between,
    /// Operator name not understood by the engine
    Unknown(String),
}

/// A single literal, as found in predicates and records
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

/// Right-hand side of a predicate
///
/// `in` / `notIn` expect a list, `between` expects `"min,max"` or a
/// two-element list, every other operator expects a scalar.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RuleValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
    /// `null`, booleans, objects or lists holding them; never satisfied
    Other(Value),
}

impl RuleGroup {
    pub fn new(combinator: Combinator, rules: Vec<RuleNode>) -> Self {
        Self { combinator, rules }
    }

    pub fn and(rules: Vec<RuleNode>) -> Self {
        Self::new(Combinator::And, rules)
    }

    pub fn or(rules: Vec<RuleNode>) -> Self {
        Self::new(Combinator::Or, rules)
    }

    /// Number of predicates in the whole tree, nested groups included
    pub fn predicate_count(&self) -> usize {
        let mut count = 0;
        let mut pending: Vec<&RuleGroup> = vec![self];
        while let Some(group) = pending.pop() {
            for node in &group.rules {
                match node {
                    RuleNode::Group(inner) => pending.push(inner),
                    RuleNode::Predicate(_) => count += 1,
                }
            }
        }
        count
    }
}

impl Predicate {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<RuleValue>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }
}

impl From<RuleGroup> for RuleNode {
    fn from(group: RuleGroup) -> Self {
        RuleNode::Group(group)
    }
}

impl From<Predicate> for RuleNode {
    fn from(predicate: Predicate) -> Self {
        RuleNode::Predicate(predicate)
    }
}

impl Combinator {
    pub fn as_str(&self) -> &str {
        match self {
            Combinator::And => "and",
            Combinator::Or => "or",
            Combinator::Unknown(name) => name,
        }
    }
}

impl From<String> for Combinator {
    fn from(name: String) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "and" => Combinator::And,
            "or" => Combinator::Or,
            _ => Combinator::Unknown(name),
        }
    }
}

impl From<Combinator> for String {
    fn from(combinator: Combinator) -> Self {
        match combinator {
            Combinator::Unknown(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Operator {
    /// Every operator the engine evaluates, in authoring-tool order
    pub const KNOWN: [Operator; 13] = [
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
        Operator::Between,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Contains => "contains",
            Operator::DoesNotContain => "doesNotContain",
            Operator::StartsWith => "startsWith",
            Operator::EndsWith => "endsWith",
            Operator::In => "in",
            Operator::NotIn => "notIn",
            Operator::Between => "between",
            Operator::Unknown(name) => name,
        }
    }

    /// `in` and `notIn` take a list of values
    pub fn is_membership(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }

    /// Shape of value the operator expects, for diagnostics
    pub fn expected_value(&self) -> &'static str {
        match self {
            Operator::In | Operator::NotIn => "a list of values",
            Operator::Between => "a \"min,max\" range",
            _ => "a single value",
        }
    }
}

impl From<String> for Operator {
    fn from(name: String) -> Self {
        Operator::KNOWN
            .iter()
            .find(|op| op.as_str() == name)
            .cloned()
            .unwrap_or(Operator::Unknown(name))
    }
}

impl From<&str> for Operator {
    fn from(name: &str) -> Self {
        Operator::from(name.to_string())
    }
}

impl From<Operator> for String {
    fn from(operator: Operator) -> Self {
        match operator {
            Operator::Unknown(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numbers print in their canonical decimal form, text prints as is
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => f.write_str(&super::reconcile::canonical_text(*n)),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl Default for RuleValue {
    fn default() -> Self {
        RuleValue::Scalar(Scalar::Text(String::new()))
    }
}

impl From<Scalar> for RuleValue {
    fn from(scalar: Scalar) -> Self {
        RuleValue::Scalar(scalar)
    }
}

impl From<f64> for RuleValue {
    fn from(n: f64) -> Self {
        RuleValue::Scalar(Scalar::Number(n))
    }
}

impl From<&str> for RuleValue {
    fn from(s: &str) -> Self {
        RuleValue::Scalar(Scalar::from(s))
    }
}

impl From<String> for RuleValue {
    fn from(s: String) -> Self {
        RuleValue::Scalar(Scalar::Text(s))
    }
}

impl From<Vec<Scalar>> for RuleValue {
    fn from(items: Vec<Scalar>) -> Self {
        RuleValue::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operator_round_trips_through_name() {
        for op in Operator::KNOWN.iter() {
            assert_eq!(Operator::from(op.as_str()), *op);
        }
    }

    #[test]
    fn test_unknown_operator_keeps_name() {
        let op = Operator::from("matches");
        assert_eq!(op, Operator::Unknown("matches".to_string()));
        assert_eq!(op.to_string(), "matches");
    }

    #[test]
    fn test_combinator_is_case_insensitive() {
        assert_eq!(Combinator::from("AND".to_string()), Combinator::And);
        assert_eq!(Combinator::from("Or".to_string()), Combinator::Or);
        assert_eq!(
            Combinator::from("xor".to_string()),
            Combinator::Unknown("xor".to_string())
        );
    }

    #[test]
    fn test_deserialize_nested_tree() {
        let tree: RuleGroup = serde_json::from_value(json!({
            "id": "root",
            "combinator": "and",
            "rules": [
                { "id": "r1", "field": "region", "operator": "in", "value": ["Tanger", "Fes"] },
                {
                    "combinator": "or",
                    "rules": [
                        { "field": "chiffre_affaires", "operator": ">=", "value": 100000 },
                        { "field": "sexe", "operator": "=", "value": "Femme" }
                    ]
                }
            ]
        }))
        .unwrap();

        assert_eq!(tree.combinator, Combinator::And);
        assert_eq!(tree.rules.len(), 2);
        assert_eq!(
            tree.rules[0],
            RuleNode::Predicate(Predicate::new(
                "region",
                Operator::In,
                vec![Scalar::from("Tanger"), Scalar::from("Fes")]
            ))
        );
        match &tree.rules[1] {
            RuleNode::Group(inner) => {
                assert_eq!(inner.combinator, Combinator::Or);
                assert_eq!(
                    inner.rules[0],
                    RuleNode::Predicate(Predicate::new(
                        "chiffre_affaires",
                        Operator::Gte,
                        100000.0
                    ))
                );
            }
            RuleNode::Predicate(_) => panic!("Expected nested group"),
        }
    }

    #[test]
    fn test_numeric_string_stays_text() {
        let predicate: Predicate =
            serde_json::from_value(json!({ "field": "x", "operator": "=", "value": "5" })).unwrap();
        assert_eq!(predicate.value, RuleValue::Scalar(Scalar::Text("5".into())));
    }

    #[test]
    fn test_missing_value_defaults_to_empty_text() {
        let predicate: Predicate =
            serde_json::from_value(json!({ "field": "x", "operator": "=" })).unwrap();
        assert_eq!(predicate.value, RuleValue::default());
    }

    #[test]
    fn test_unsupported_values_are_kept() {
        let tree: RuleGroup = serde_json::from_value(json!({
            "combinator": "or",
            "rules": [
                { "field": "a", "operator": "=", "value": null },
                { "field": "b", "operator": "=", "value": true },
                { "field": "c", "operator": "in", "value": ["x", false] },
                { "field": "region", "operator": "=", "value": "Fes" }
            ]
        }))
        .unwrap();

        assert_eq!(tree.predicate_count(), 4);
        match &tree.rules[2] {
            RuleNode::Predicate(p) => {
                assert_eq!(p.value, RuleValue::Other(json!(["x", false])))
            }
            RuleNode::Group(_) => panic!("Expected predicate"),
        }
    }

    #[test]
    fn test_membership_operators() {
        assert!(Operator::In.is_membership());
        assert!(Operator::NotIn.is_membership());
        assert!(!Operator::Eq.is_membership());
        assert_eq!(Operator::Between.expected_value(), "a \"min,max\" range");
    }

    #[test]
    fn test_group_without_rules_is_empty() {
        let group: RuleGroup = serde_json::from_value(json!({ "combinator": "or" })).unwrap();
        assert!(group.rules.is_empty());
    }

    #[test]
    fn test_serialize_uses_wire_names() {
        let group = RuleGroup::and(vec![Predicate::new("x", Operator::NotIn, vec![
            Scalar::from(1.0),
            Scalar::from("a"),
        ])
        .into()]);
        assert_eq!(
            serde_json::to_value(&group).unwrap(),
            json!({
                "combinator": "and",
                "rules": [{ "field": "x", "operator": "notIn", "value": [1.0, "a"] }]
            })
        );
    }

    #[test]
    fn test_predicate_count_includes_nested_groups() {
        let tree = RuleGroup::and(vec![
            Predicate::new("a", Operator::Eq, 1.0).into(),
            RuleGroup::or(vec![
                Predicate::new("b", Operator::Eq, 2.0).into(),
                RuleGroup::and(vec![]).into(),
                Predicate::new("c", Operator::Eq, 3.0).into(),
            ])
            .into(),
        ]);
        assert_eq!(tree.predicate_count(), 3);
        assert_eq!(RuleGroup::and(vec![RuleGroup::or(vec![]).into()]).predicate_count(), 0);
    }

    #[test]
    fn test_scalar_display() {
        assert_eq!(Scalar::from(150000.0).to_string(), "150000");
        assert_eq!(Scalar::from(1.5).to_string(), "1.5");
        assert_eq!(Scalar::from("Fes").to_string(), "Fes");
    }
}
