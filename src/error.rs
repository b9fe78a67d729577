// SPDX-License-Identifier: MIT

//! Typed errors for eligibility-rs
//!
//! Evaluation itself never fails; these cover loading, configuration and
//! the outer surfaces (CLI, HTTP server).

use thiserror::Error;

use crate::policy::validate::PolicyIssue;

/// Top-level error type
#[derive(Debug, Error)]
pub enum EligibilityError {
    /// Configuration errors (invalid environment values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input file does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Input parsed but has the wrong shape (e.g. a record that is not an object)
    #[error("Invalid {what}: {message}")]
    InvalidInput { what: String, message: String },

    /// Policy failed validation
    #[error("Policy has {} issue(s)", .0.len())]
    InvalidPolicy(Vec<PolicyIssue>),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, EligibilityError>;

impl EligibilityError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            what: what.into(),
            message: message.into(),
        }
    }
}
