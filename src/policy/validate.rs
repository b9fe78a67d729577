// SPDX-License-Identifier: MIT

//! Static checks of a policy against a field catalogue
//!
//! Validation never changes how a policy evaluates; it points authors at
//! nodes that would silently evaluate to false.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use super::catalogue::{FieldCatalogue, ValueKind};
use super::rule::{
    parse_number, render_path, Combinator, Operator, Predicate, Range, RuleGroup, RuleNode,
    RuleValue, Scalar, DEFAULT_MAX_DEPTH,
};

/// A problem found in a policy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyIssue {
    pub path: String,
    #[serde(flatten)]
    pub kind: IssueKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    #[error("policy defines no criteria and can never be satisfied")]
    EmptyPolicy,

    #[error("group has no rules")]
    EmptyGroup,

    #[error("unknown combinator '{combinator}'")]
    UnknownCombinator { combinator: String },

    #[error("unknown operator '{operator}'")]
    UnknownOperator { operator: String },

    #[error("field '{field}' is not in the catalogue")]
    UnknownField { field: String },

    #[error("operator '{operator}' does not apply to {value_kind} field '{field}'")]
    OperatorNotApplicable {
        field: String,
        operator: String,
        value_kind: ValueKind,
    },

    #[error("'{value}' is not an allowed value of field '{field}'")]
    ValueNotAllowed { field: String, value: String },

    #[error("operator '{operator}' expects a list of values")]
    ExpectedList { operator: String },

    #[error("operator '{operator}' expects a single value")]
    ExpectedScalar { operator: String },

    #[error("'{value}' is not a valid \"min,max\" range")]
    InvalidRange { value: String },

    #[error("numeric field '{field}' is compared with non-numeric '{value}'")]
    ExpectedNumber { field: String, value: String },

    #[error("group nesting exceeds {limit} levels")]
    TooDeep { limit: usize },
}

impl fmt::Display for PolicyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "root: {}", self.kind)
        } else {
            write!(f, "{}: {}", self.path, self.kind)
        }
    }
}

/// Checks policies against a catalogue
///
/// With an empty catalogue only structural checks run.
pub struct PolicyValidator<'a> {
    catalogue: &'a FieldCatalogue,
    max_depth: usize,
}

impl<'a> PolicyValidator<'a> {
    pub fn new(catalogue: &'a FieldCatalogue) -> Self {
        Self {
            catalogue,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// All issues, in tree order
    pub fn validate(&self, policy: &RuleGroup) -> Vec<PolicyIssue> {
        let mut issues = Vec::new();
        if policy.predicate_count() == 0 {
            issues.push(PolicyIssue {
                path: String::new(),
                kind: IssueKind::EmptyPolicy,
            });
            return issues;
        }

        // Explicit stack; children are pushed in reverse to keep tree order
        let mut pending: Vec<(Vec<usize>, &RuleNode)> = Vec::new();
        self.check_group(policy, &[], 0, &mut pending, &mut issues);

        while let Some((path, node)) = pending.pop() {
            match node {
                RuleNode::Group(group) => {
                    let depth = path.len();
                    self.check_group(group, &path, depth, &mut pending, &mut issues);
                }
                RuleNode::Predicate(predicate) => {
                    for kind in self.check_predicate(predicate) {
                        issues.push(PolicyIssue {
                            path: render_path(&path),
                            kind,
                        });
                    }
                }
            }
        }
        issues
    }

    fn check_group<'t>(
        &self,
        group: &'t RuleGroup,
        path: &[usize],
        depth: usize,
        pending: &mut Vec<(Vec<usize>, &'t RuleNode)>,
        issues: &mut Vec<PolicyIssue>,
    ) {
        let mut report = |kind| {
            issues.push(PolicyIssue {
                path: render_path(path),
                kind,
            })
        };

        if depth > self.max_depth {
            report(IssueKind::TooDeep {
                limit: self.max_depth,
            });
            return;
        }
        if let Combinator::Unknown(name) = &group.combinator {
            report(IssueKind::UnknownCombinator {
                combinator: name.clone(),
            });
        }
        if group.rules.is_empty() {
            report(IssueKind::EmptyGroup);
        }

        for (i, node) in group.rules.iter().enumerate().rev() {
            let mut child = path.to_vec();
            child.push(i);
            pending.push((child, node));
        }
    }

    fn check_predicate(&self, predicate: &Predicate) -> Vec<IssueKind> {
        let mut issues = Vec::new();
        let op = &predicate.operator;

        // shape of the value
        match (op, &predicate.value) {
            (Operator::Unknown(name), _) => {
                issues.push(IssueKind::UnknownOperator {
                    operator: name.clone(),
                });
                return issues;
            }
            (Operator::Between, value) => {
                if Range::parse(value).is_none() {
                    issues.push(IssueKind::InvalidRange {
                        value: describe(value),
                    });
                }
            }
            (op, RuleValue::List(_)) if op.is_membership() => {}
            (op, _) if op.is_membership() => {
                issues.push(IssueKind::ExpectedList {
                    operator: op.to_string(),
                });
            }
            (_, RuleValue::Scalar(_)) => {}
            (_, RuleValue::List(_) | RuleValue::Other(_)) => {
                issues.push(IssueKind::ExpectedScalar {
                    operator: op.to_string(),
                });
            }
        }

        if self.catalogue.is_empty() {
            return issues;
        }
        let Some(field) = self.catalogue.get(&predicate.field) else {
            issues.push(IssueKind::UnknownField {
                field: predicate.field.clone(),
            });
            return issues;
        };

        if !field.value_kind.admits(op) {
            issues.push(IssueKind::OperatorNotApplicable {
                field: field.name.clone(),
                operator: op.to_string(),
                value_kind: field.value_kind,
            });
        }

        for literal in literals(op, &predicate.value) {
            match field.value_kind {
                ValueKind::Categorical if !field.allows(literal) => {
                    issues.push(IssueKind::ValueNotAllowed {
                        field: field.name.clone(),
                        value: literal.to_string(),
                    });
                }
                ValueKind::Numeric => {
                    if let Scalar::Text(text) = literal {
                        if parse_number(text).is_none() {
                            issues.push(IssueKind::ExpectedNumber {
                                field: field.name.clone(),
                                value: text.clone(),
                            });
                        }
                    }
                }
                _ => {}
            }
        }
        issues
    }
}

/// Literals to check against the field; ranges are covered by `InvalidRange`
fn literals<'v>(op: &Operator, value: &'v RuleValue) -> Vec<&'v Scalar> {
    match (op, value) {
        (Operator::Between, _) | (_, RuleValue::Other(_)) => Vec::new(),
        (_, RuleValue::Scalar(scalar)) => vec![scalar],
        (_, RuleValue::List(items)) => items.iter().collect(),
    }
}

fn describe(value: &RuleValue) -> String {
    match value {
        RuleValue::Scalar(scalar) => scalar.to_string(),
        RuleValue::List(items) => format!(
            "[{}]",
            items
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ),
        RuleValue::Other(value) => value.to_string(),
    }
}

/// Validate with the default depth limit
pub fn validate(policy: &RuleGroup, catalogue: &FieldCatalogue) -> Vec<PolicyIssue> {
    PolicyValidator::new(catalogue).validate(policy)
}
