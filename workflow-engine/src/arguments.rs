//! Argument normalization: the `omitted | string | list | map` variant
//! that an action's `arguments` field may take in YAML/JSON/XML, reduced
//! to the serialized JSON string passed across the dispatch boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The parsed, not-yet-serialized shape of an action's `arguments` field.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Arguments {
    Omitted,
    String(String),
    List(Vec<Value>),
    Map(serde_json::Map<String, Value>),
}

impl Default for Arguments {
    fn default() -> Self {
        Arguments::Omitted
    }
}

impl Arguments {
    /// Produces the serialized JSON string passed to the target actor, per
    /// the spec.md §4.2 normalization table.
    pub fn serialize(&self) -> String {
        match self {
            Arguments::Omitted => "[]".to_string(),
            Arguments::String(s) => {
                serde_json::to_string(&vec![s.clone()]).unwrap_or_else(|_| "[]".to_string())
            }
            Arguments::List(items) => {
                if items.is_empty() {
                    "[]".to_string()
                } else {
                    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
                }
            }
            Arguments::Map(map) => {
                serde_json::to_string(&Value::Object(map.clone())).unwrap_or_else(|_| "{}".to_string())
            }
        }
    }

    /// Builds an `Arguments::List` from plain strings — the shape the XML
    /// parser produces from `<arguments><arg>a</arg><arg>b</arg></arguments>`.
    pub fn from_strings(items: Vec<String>) -> Self {
        Arguments::List(items.into_iter().map(Value::String).collect())
    }

    pub fn from_single_string(s: impl Into<String>) -> Self {
        Arguments::String(s.into())
    }
}
