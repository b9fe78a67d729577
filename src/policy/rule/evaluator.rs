// SPDX-License-Identifier: MIT

//! Policy evaluator
//!
//! Walks a policy tree against a record and produces a [`Verdict`].
//! Evaluation never fails: malformed nodes count as unsatisfied and are
//! reported as diagnostics next to the boolean.

use std::cmp::Ordering;

use super::ast::{Combinator, Operator, Predicate, RuleGroup, RuleNode, RuleValue, Scalar};
use super::diagnostics::{render_path, Diagnostic, DiagnosticKind, Verdict};
use super::range::Range;
use super::reconcile::{parse_number, reconcile, NotANumber, Reconciled};
use crate::policy::record::{Lookup, Record};

/// Group nesting allowed before a subtree is cut off
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Evaluates policies against records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluator {
    max_depth: usize,
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Verdict for a whole policy.
    ///
    /// A policy without a single predicate anywhere in its tree is never
    /// eligible, whatever its combinator.
    pub fn evaluate_policy(&self, policy: &RuleGroup, record: &Record) -> Verdict {
        if policy.predicate_count() == 0 {
            return Verdict::new(false, Vec::new());
        }
        self.evaluate_group(policy, record)
    }

    /// Verdict for a group taken on its own: an empty `and` is true
    pub fn evaluate_group(&self, group: &RuleGroup, record: &Record) -> Verdict {
        let mut walk = Walk::new(record, self.max_depth);
        let eligible = walk.group(group, 0);
        Verdict::new(eligible, walk.diagnostics)
    }

    pub fn evaluate_predicate(&self, predicate: &Predicate, record: &Record) -> Verdict {
        let mut walk = Walk::new(record, self.max_depth);
        let satisfied = walk.predicate(predicate);
        Verdict::new(satisfied, walk.diagnostics)
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluate a policy with the default evaluator
pub fn evaluate_policy(policy: &RuleGroup, record: &Record) -> Verdict {
    Evaluator::new().evaluate_policy(policy, record)
}

/// Evaluate a group with the default evaluator, dropping diagnostics
pub fn evaluate_group(group: &RuleGroup, record: &Record) -> bool {
    Evaluator::new().evaluate_group(group, record).eligible
}

/// Evaluate a single predicate, dropping diagnostics
pub fn evaluate_predicate(predicate: &Predicate, record: &Record) -> bool {
    Evaluator::new()
        .evaluate_predicate(predicate, record)
        .eligible
}

/// State of one evaluation: the record, the current node path and the
/// diagnostics collected so far
struct Walk<'a> {
    record: &'a Record,
    max_depth: usize,
    path: Vec<usize>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Walk<'a> {
    fn new(record: &'a Record, max_depth: usize) -> Self {
        Self {
            record,
            max_depth,
            path: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn report(&mut self, kind: DiagnosticKind) {
        self.diagnostics.push(Diagnostic {
            path: render_path(&self.path),
            kind,
        });
    }

    fn group(&mut self, group: &RuleGroup, depth: usize) -> bool {
        if depth > self.max_depth {
            self.report(DiagnosticKind::DepthExceeded {
                limit: self.max_depth,
            });
            return false;
        }

        // Every child is visited so that all diagnostics surface; the
        // result is the same as with short-circuiting.
        match &group.combinator {
            Combinator::And => {
                let mut all = true;
                for (i, node) in group.rules.iter().enumerate() {
                    all &= self.child(i, node, depth);
                }
                all
            }
            Combinator::Or => {
                let mut any = false;
                for (i, node) in group.rules.iter().enumerate() {
                    any |= self.child(i, node, depth);
                }
                any
            }
            Combinator::Unknown(name) => {
                self.report(DiagnosticKind::UnknownCombinator {
                    combinator: name.clone(),
                });
                false
            }
        }
    }

    fn child(&mut self, index: usize, node: &RuleNode, depth: usize) -> bool {
        self.path.push(index);
        let result = match node {
            RuleNode::Group(group) => self.group(group, depth + 1),
            RuleNode::Predicate(predicate) => self.predicate(predicate),
        };
        self.path.pop();
        result
    }

    fn predicate(&mut self, predicate: &Predicate) -> bool {
        let value = match self.record.lookup(&predicate.field) {
            Lookup::Missing => return false,
            Lookup::Unsupported => {
                self.report(DiagnosticKind::UnsupportedRecordValue {
                    field: predicate.field.clone(),
                });
                return false;
            }
            Lookup::Found(value) => value,
        };

        match (&predicate.operator, &predicate.value) {
            (Operator::Unknown(name), _) => {
                self.report(DiagnosticKind::UnknownOperator {
                    operator: name.clone(),
                });
                false
            }
            (op, RuleValue::Other(_)) => {
                self.malformed(op);
                false
            }
            (Operator::In, RuleValue::List(items)) => items.contains(&value),
            (Operator::NotIn, RuleValue::List(items)) => !items.contains(&value),
            (Operator::Between, range) => self.between(predicate, &value, range),
            (op, _) if op.is_membership() => {
                self.malformed(op);
                false
            }
            (op, RuleValue::Scalar(literal)) => match reconcile(&value, literal) {
                Ok(pair) => compare(op, &pair),
                Err(NotANumber) => {
                    self.not_a_number(predicate, &value);
                    false
                }
            },
            (op, RuleValue::List(_)) => {
                self.malformed(op);
                false
            }
        }
    }

    fn between(&mut self, predicate: &Predicate, value: &Scalar, range: &RuleValue) -> bool {
        let Some(range) = Range::parse(range) else {
            self.malformed(&predicate.operator);
            return false;
        };

        let n = match value {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(text) => parse_number(text),
        };
        match n {
            Some(n) => range.contains(n),
            None => {
                self.not_a_number(predicate, value);
                false
            }
        }
    }

    fn malformed(&mut self, operator: &Operator) {
        self.report(DiagnosticKind::MalformedValue {
            operator: operator.to_string(),
            expected: operator.expected_value().to_string(),
        });
    }

    fn not_a_number(&mut self, predicate: &Predicate, value: &Scalar) {
        self.report(DiagnosticKind::NotANumber {
            field: predicate.field.clone(),
            value: value.to_string(),
        });
    }
}

/// Apply a scalar operator to a reconciled pair
fn compare(op: &Operator, pair: &Reconciled<'_>) -> bool {
    match op {
        Operator::Eq => pair.equals(),
        Operator::NotEq => !pair.equals(),
        Operator::Lt => pair.ordering() == Some(Ordering::Less),
        Operator::Lte => matches!(pair.ordering(), Some(Ordering::Less | Ordering::Equal)),
        Operator::Gt => pair.ordering() == Some(Ordering::Greater),
        Operator::Gte => matches!(
            pair.ordering(),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Operator::Contains => {
            let (a, b) = pair.texts();
            a.contains(&*b)
        }
        Operator::DoesNotContain => {
            let (a, b) = pair.texts();
            !a.contains(&*b)
        }
        Operator::StartsWith => {
            let (a, b) = pair.texts();
            a.starts_with(&*b)
        }
        Operator::EndsWith => {
            let (a, b) = pair.texts();
            a.ends_with(&*b)
        }
        // resolved in Walk::predicate before reconciliation
        Operator::In | Operator::NotIn | Operator::Between | Operator::Unknown(_) => false,
    }
}
