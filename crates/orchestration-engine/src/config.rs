//! Engine configuration.
//!
//! Hosts pass their editor settings as JSON; every field has a default so
//! partial documents are accepted.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::Position;

/// Layout and naming settings used by extraction and inlining.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Base name for functions created by extraction.
    #[serde(default = "default_function_base_name")]
    pub function_base_name: String,
    /// Whether extraction creates a Result node.
    #[serde(default = "default_true")]
    pub add_result_node: bool,
    /// Initial position of a new function's Entry node.
    #[serde(default)]
    pub entry_position: Position,
    /// Offset of a new Result node from its Entry node.
    #[serde(default = "default_result_offset")]
    pub result_offset: Position,
    /// Horizontal gap used when placing Entry/Result next to body nodes.
    #[serde(default = "default_node_spacing")]
    pub node_spacing: f64,
    /// Maximum number of undo snapshots.
    #[serde(default = "default_undo_limit")]
    pub undo_limit: usize,
}

fn default_function_base_name() -> String {
    "NewFunction".to_string()
}

fn default_true() -> bool {
    true
}

fn default_result_offset() -> Position {
    (300.0, 0.0)
}

fn default_node_spacing() -> f64 {
    250.0
}

fn default_undo_limit() -> usize {
    100
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            function_base_name: default_function_base_name(),
            add_result_node: true,
            entry_position: (0.0, 0.0),
            result_offset: default_result_offset(),
            node_spacing: default_node_spacing(),
            undo_limit: default_undo_limit(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.function_base_name, "NewFunction");
        assert!(config.add_result_node);
        assert_eq!(config.result_offset, (300.0, 0.0));
        assert_eq!(config.node_spacing, 250.0);
    }

    #[test]
    fn test_partial_document() {
        let config = EngineConfig::from_json(r#"{"functionBaseName": "Helper", "nodeSpacing": 180.0}"#)
            .unwrap();
        assert_eq!(config.function_base_name, "Helper");
        assert_eq!(config.node_spacing, 180.0);
        assert!(config.add_result_node);
        assert_eq!(config.undo_limit, 100);
    }

    #[test]
    fn test_empty_document_matches_default() {
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_invalid_document() {
        assert!(EngineConfig::from_json("{\"undoLimit\": \"many\"}").is_err());
    }
}
