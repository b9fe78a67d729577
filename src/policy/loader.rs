//! Policy loader - JSON / YAML file loading and parsing
//!
//! Policies, records and field catalogues are read from files whose
//! extension picks the format: `.yaml` / `.yml` for YAML, anything else
//! for JSON.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::catalogue::FieldCatalogue;
use super::record::Record;
use super::rule::RuleGroup;
use crate::error::{EligibilityError, Result};

/// Serialization format of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Format::Yaml
            }
            _ => Format::Json,
        }
    }
}

/// Loads policies, records and catalogues from files
pub struct PolicyLoader;

impl PolicyLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a policy tree
    pub fn load_policy<P: AsRef<Path>>(&self, path: P) -> Result<RuleGroup> {
        let path = path.as_ref();
        Self::parse(&Self::read(path)?, Format::from_path(path))
    }

    /// Load an applicant record; the document must be a flat object
    pub fn load_record<P: AsRef<Path>>(&self, path: P) -> Result<Record> {
        let path = path.as_ref();
        Self::parse_record(&Self::read(path)?, Format::from_path(path))
    }

    /// Load a field catalogue
    pub fn load_catalogue<P: AsRef<Path>>(&self, path: P) -> Result<FieldCatalogue> {
        let path = path.as_ref();
        Self::parse(&Self::read(path)?, Format::from_path(path))
    }

    /// Parse a policy from a JSON string
    pub fn parse_policy_json(content: &str) -> Result<RuleGroup> {
        Self::parse(content, Format::Json)
    }

    /// Parse a policy from a YAML string
    pub fn parse_policy_yaml(content: &str) -> Result<RuleGroup> {
        Self::parse(content, Format::Yaml)
    }

    pub fn parse_record(content: &str, format: Format) -> Result<Record> {
        let value: Value = Self::parse(content, format)?;
        Record::from_json(value)
            .ok_or_else(|| EligibilityError::invalid_input("record", "expected a JSON object"))
    }

    /// Deserialize any document in the given format
    pub fn parse<T: DeserializeOwned>(content: &str, format: Format) -> Result<T> {
        let parsed = match format {
            Format::Json => serde_json::from_str(content)?,
            Format::Yaml => serde_yaml::from_str(content)?,
        };
        Ok(parsed)
    }

    fn read(path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => EligibilityError::FileNotFound(path.display().to_string()),
            _ => EligibilityError::Io(e),
        })
    }
}

impl Default for PolicyLoader {
    fn default() -> Self {
        Self::new()
    }
}
