// SPDX-License-Identifier: MIT

//! Eligibility rule engine
//!
//! A policy is a tree of groups and predicates:
//! - `{ "combinator": "and", "rules": [...] }` - all children must hold
//! - `{ "combinator": "or", "rules": [...] }` - at least one child must hold
//! - `{ "field": "region", "operator": "in", "value": ["Tanger", "Fes"] }`
//!
//! Before an operator runs, the record value and the literal are reconciled
//! to the same kind (see [`reconcile`]).

mod ast;
mod diagnostics;
mod evaluator;
mod range;
mod reconcile;

pub use ast::{Combinator, Operator, Predicate, RuleGroup, RuleNode, RuleValue, Scalar};
pub use diagnostics::{render_path, Diagnostic, DiagnosticKind, Verdict};
pub use evaluator::{
    evaluate_group, evaluate_policy, evaluate_predicate, Evaluator, DEFAULT_MAX_DEPTH,
};
pub use range::Range;
pub use reconcile::{canonical_text, parse_number, reconcile, NotANumber, Reconciled};
