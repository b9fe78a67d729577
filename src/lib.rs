// SPDX-License-Identifier: MIT

//! Eligibility policy evaluation
//!
//! Evaluates applicant records against nested AND/OR policies of
//! comparison predicates. See [`policy::rule`] for the engine.

pub mod config;
pub mod error;
pub mod policy;
pub mod server;

pub use error::{EligibilityError, Result};
