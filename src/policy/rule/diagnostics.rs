// SPDX-License-Identifier: MIT

//! Evaluation results and the non-fatal diagnostics attached to them

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Outcome of evaluating a policy against a record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub eligible: bool,
    /// Malformed nodes met on the way; informational only
    pub diagnostics: Vec<Diagnostic>,
}

/// A malformed node encountered during evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Location of the node, e.g. `rules[1].rules[0]`; empty for the root
    pub path: String,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    #[error("unknown operator '{operator}'")]
    UnknownOperator { operator: String },

    #[error("unknown combinator '{combinator}'")]
    UnknownCombinator { combinator: String },

    #[error("operator '{operator}' expects {expected}")]
    MalformedValue { operator: String, expected: String },

    #[error("value '{value}' of field '{field}' is not a number")]
    NotANumber { field: String, value: String },

    #[error("field '{field}' holds a value that is neither text nor a number")]
    UnsupportedRecordValue { field: String },

    #[error("group nesting exceeds {limit} levels")]
    DepthExceeded { limit: usize },
}

impl Verdict {
    pub fn new(eligible: bool, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            eligible,
            diagnostics,
        }
    }

    /// True when evaluation met no malformed node
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "root: {}", self.kind)
        } else {
            write!(f, "{}: {}", self.path, self.kind)
        }
    }
}

/// Render child indices as `rules[0].rules[2]`
pub fn render_path(indices: &[usize]) -> String {
    indices
        .iter()
        .map(|i| format!("rules[{}]", i))
        .collect::<Vec<_>>()
        .join(".")
}
