//! Declarative YAML scenarios

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{E2eError, E2eResult};

/// A complete scenario parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Unique name for this scenario
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Tags for filtering
    #[serde(default)]
    pub tags: Vec<String>,

    /// Steps to execute in order
    pub steps: Vec<Step>,
}

/// A single step in a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Send one HTTP request and check the response
    Request {
        /// Label used in results; defaults to "METHOD path"
        #[serde(default)]
        name: Option<String>,
        #[serde(default = "default_method")]
        method: String,
        path: String,
        /// JSON body
        #[serde(default)]
        json: Option<Value>,
        /// urlencoded body
        #[serde(default)]
        form: Option<BTreeMap<String, String>>,
        #[serde(default)]
        headers: BTreeMap<String, String>,
        #[serde(default)]
        expect: Expect,
        /// variable name -> "/json/pointer" or "header:<name>"
        #[serde(default)]
        capture: BTreeMap<String, String>,
    },

    /// Wait for a fixed amount of time (use sparingly)
    Sleep { ms: u64 },

    /// Log a message (for debugging)
    Log { message: String },
}

fn default_method() -> String {
    "GET".to_string()
}

/// Checks applied to a response. Empty means "anything goes".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Expect {
    #[serde(default)]
    pub status: Option<u16>,

    /// JSON pointer -> expected value
    #[serde(default)]
    pub json: BTreeMap<String, Value>,

    #[serde(default)]
    pub body_contains: Vec<String>,

    /// Header name -> expected substring
    #[serde(default)]
    pub header: BTreeMap<String, String>,

    /// Expected `Location` of a 3xx response
    #[serde(default)]
    pub redirect_to: Option<String>,
}

impl Step {
    /// Short label for logs and results
    pub fn label(&self) -> String {
        match self {
            Step::Request {
                name: Some(name), ..
            } => name.clone(),
            Step::Request { method, path, .. } => format!("{} {}", method.to_uppercase(), path),
            Step::Sleep { ms } => format!("sleep {}ms", ms),
            Step::Log { .. } => "log".to_string(),
        }
    }
}

impl Scenario {
    /// Parse a scenario from a YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        serde_yaml::from_str(yaml).map_err(E2eError::from)
    }

    /// Parse a scenario from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| E2eError::SpecParse(format!("{}: {}", path.display(), e)))
    }

    /// Load every scenario under a directory, sorted by file path
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut paths: Vec<_> = walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
            .map(|e| e.into_path())
            .collect();
        paths.sort();

        paths.iter().map(|p| Self::from_file(p)).collect()
    }

    /// Filter scenarios by tag
    pub fn filter_by_tag<'a>(scenarios: &'a [Self], tag: &str) -> Vec<&'a Self> {
        scenarios.iter().filter(|s| s.tags.iter().any(|t| t == tag)).collect()
    }
}

// ============================================================================
// Variables
// ============================================================================

/// Values captured from earlier responses, referenced as `{{name}}`.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    values: BTreeMap<String, String>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Replace every `{{name}}` in `input`. Unknown names are an error.
    pub fn substitute(&self, input: &str) -> E2eResult<String> {
        let mut out = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                // Unterminated; keep it literally
                out.push_str(&rest[start..]);
                return Ok(out);
            };
            let name = after[..end].trim();
            let value = self
                .get(name)
                .ok_or_else(|| E2eError::UnknownVariable(name.to_string()))?;
            out.push_str(value);
            rest = &after[end + 2..];
        }

        out.push_str(rest);
        Ok(out)
    }

    /// Substitute inside every string of a JSON value.
    pub fn substitute_value(&self, value: &Value) -> E2eResult<Value> {
        Ok(match value {
            Value::String(s) => Value::String(self.substitute(s)?),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|v| self.substitute_value(v))
                    .collect::<E2eResult<_>>()?,
            ),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| self.substitute_value(v).map(|v| (k.clone(), v)))
                    .collect::<E2eResult<_>>()?,
            ),
            other => other.clone(),
        })
    }
}
