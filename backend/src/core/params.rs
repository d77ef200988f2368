//! Parameter lookup
//!
//! Agents read their behavioral parameters from a tree of named attributes
//! (doubles, integers, strings) and nested groups. Paths are dot-separated,
//! e.g. `workforce.jobContracts.min`.
//!
//! The tree is a plain JSON value; this module does not know about any
//! scenario file format.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Configuration errors
///
/// Always fatal: a misconfigured model has no meaningful automatic recovery.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing parameter: {path}")]
    MissingParameter { path: String },

    #[error("Parameter {path} has wrong type: expected {expected}")]
    InvalidType { path: String, expected: &'static str },

    #[error("Parameter {path} is invalid: {reason}")]
    InvalidValue { path: String, reason: String },

    #[error("Unknown phase: {phase}")]
    UnknownPhase { phase: String },

    #[error("Phase {phase} is not supported by sector {sector} (role {role})")]
    UnsupportedPhase {
        phase: String,
        sector: String,
        role: String,
    },

    #[error("Unknown sector: {name}")]
    UnknownSector { name: String },

    #[error("Unknown role: {role}")]
    UnknownRole { role: String },

    #[error("Duplicate sector: {name}")]
    DuplicateSector { name: String },

    #[error("Sector {name} has no agents")]
    EmptySector { name: String },

    #[error("Sector {sector} must have role {expected}, found {found}")]
    WrongSectorRole {
        sector: String,
        expected: String,
        found: String,
    },
}

/// `InvalidValue` at `path` unless `ok`
pub fn ensure(ok: bool, path: &str, reason: &str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            path: path.to_string(),
            reason: reason.to_string(),
        })
    }
}

/// A group of named parameters
///
/// # Example
/// ```
/// use macro_simulator_core_rs::Parameters;
/// use serde_json::json;
///
/// let params = Parameters::new(json!({
///     "workforce": { "wage": 10, "jobContracts": { "min": 6, "max": 18 } }
/// }));
///
/// assert_eq!(params.get_i64("workforce.wage").unwrap(), 10);
/// let contracts = params.get("workforce.jobContracts").unwrap();
/// assert_eq!(contracts.get_usize("max").unwrap(), 18);
/// assert!(params.get_f64("pricing.initialMarkup").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters {
    root: Value,

    /// Path of this group from the top of the tree (for diagnostics)
    #[serde(skip)]
    prefix: String,
}

impl Parameters {
    pub fn new(root: Value) -> Self {
        Self {
            root,
            prefix: String::new(),
        }
    }

    /// Empty parameter group
    pub fn empty() -> Self {
        Self::new(Value::Object(Default::default()))
    }

    fn full_path(&self, path: &str) -> String {
        if self.prefix.is_empty() {
            path.to_string()
        } else {
            format!("{}.{}", self.prefix, path)
        }
    }

    fn lookup(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.root, |node, segment| node.get(segment))
            .filter(|value| !value.is_null())
    }

    fn require(&self, path: &str) -> Result<&Value, ConfigError> {
        self.lookup(path).ok_or_else(|| ConfigError::MissingParameter {
            path: self.full_path(path),
        })
    }

    /// True if the attribute or group exists
    pub fn contains(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    /// Nested group at `path`
    pub fn get(&self, path: &str) -> Result<Parameters, ConfigError> {
        let value = self.require(path)?;
        if !value.is_object() {
            return Err(ConfigError::InvalidType {
                path: self.full_path(path),
                expected: "group",
            });
        }
        Ok(Parameters {
            root: value.clone(),
            prefix: self.full_path(path),
        })
    }

    pub fn get_f64(&self, path: &str) -> Result<f64, ConfigError> {
        self.require(path)?
            .as_f64()
            .ok_or_else(|| ConfigError::InvalidType {
                path: self.full_path(path),
                expected: "number",
            })
    }

    pub fn get_i64(&self, path: &str) -> Result<i64, ConfigError> {
        self.require(path)?
            .as_i64()
            .ok_or_else(|| ConfigError::InvalidType {
                path: self.full_path(path),
                expected: "integer",
            })
    }

    pub fn get_usize(&self, path: &str) -> Result<usize, ConfigError> {
        self.require(path)?
            .as_u64()
            .map(|v| v as usize)
            .ok_or_else(|| ConfigError::InvalidType {
                path: self.full_path(path),
                expected: "non-negative integer",
            })
    }

    pub fn get_str(&self, path: &str) -> Result<&str, ConfigError> {
        self.require(path)?
            .as_str()
            .ok_or_else(|| ConfigError::InvalidType {
                path: self.full_path(path),
                expected: "string",
            })
    }

    pub fn get_bool(&self, path: &str) -> Result<bool, ConfigError> {
        self.require(path)?
            .as_bool()
            .ok_or_else(|| ConfigError::InvalidType {
                path: self.full_path(path),
                expected: "boolean",
            })
    }

    /// Optional number; a present attribute of the wrong type is still an error
    pub fn get_f64_or(&self, path: &str, default: f64) -> Result<f64, ConfigError> {
        if self.contains(path) {
            self.get_f64(path)
        } else {
            Ok(default)
        }
    }

    pub fn get_i64_or(&self, path: &str, default: i64) -> Result<i64, ConfigError> {
        if self.contains(path) {
            self.get_i64(path)
        } else {
            Ok(default)
        }
    }

    pub fn get_usize_or(&self, path: &str, default: usize) -> Result<usize, ConfigError> {
        if self.contains(path) {
            self.get_usize(path)
        } else {
            Ok(default)
        }
    }

    pub fn get_str_or<'a>(&'a self, path: &str, default: &'a str) -> Result<&'a str, ConfigError> {
        if self.contains(path) {
            self.get_str(path)
        } else {
            Ok(default)
        }
    }

    pub fn get_bool_or(&self, path: &str, default: bool) -> Result<bool, ConfigError> {
        if self.contains(path) {
            self.get_bool(path)
        } else {
            Ok(default)
        }
    }

    /// Underlying JSON tree
    pub fn as_value(&self) -> &Value {
        &self.root
    }
}
