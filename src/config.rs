// SPDX-License-Identifier: MIT

//! Runtime settings read from the environment
//!
//! | Variable | Default |
//! |---|---|
//! | `ELIGIBILITY_MAX_DEPTH` | 64 |
//! | `ELIGIBILITY_CATALOGUE` | unset |
//! | `ELIGIBILITY_PORT` | 3000 |

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{EligibilityError, Result};
use crate::policy::rule::DEFAULT_MAX_DEPTH;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Group nesting limit for evaluation and validation
    pub max_depth: usize,
    /// Field catalogue file, if any
    pub catalogue: Option<PathBuf>,
    /// HTTP port for `serve`
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            catalogue: None,
            port: DEFAULT_PORT,
        }
    }
}

impl Settings {
    /// Read settings from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            max_depth: parse_var(&lookup, "ELIGIBILITY_MAX_DEPTH")?.unwrap_or(defaults.max_depth),
            catalogue: lookup("ELIGIBILITY_CATALOGUE")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
            port: parse_var(&lookup, "ELIGIBILITY_PORT")?.unwrap_or(defaults.port),
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            EligibilityError::config(format!("{} must be a number, got '{}'", key, raw))
        }),
    }
}
