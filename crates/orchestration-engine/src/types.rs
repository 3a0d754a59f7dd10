//! Core types for orchestration graphs
//!
//! These types define pins, value types and connections. Nodes, graphs
//! and functions live in [`crate::orchestration`].

use serde::{Deserialize, Serialize};

/// Unique identifier for a node, unique across the whole orchestration
pub type NodeId = u64;

/// Position in the editor canvas (x, y)
pub type Position = (f64, f64);

/// The value type carried by a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Accepts any value (also used by execution pins)
    Any,
    /// Boolean value
    Boolean,
    /// Integer value
    Integer,
    /// Floating point value
    Float,
    /// Text string
    String,
    /// 2D vector
    Vector2,
    /// 3D vector
    Vector3,
    /// Object reference
    Object,
    /// Array of values
    Array,
}

/// Direction of a pin on a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinDirection {
    Input,
    Output,
}

impl PinDirection {
    /// Get the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            PinDirection::Input => PinDirection::Output,
            PinDirection::Output => PinDirection::Input,
        }
    }

    /// Lowercase label used in messages
    pub fn label(self) -> &'static str {
        match self {
            PinDirection::Input => "input",
            PinDirection::Output => "output",
        }
    }
}

/// Whether a pin carries control flow or a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinKind {
    /// Control-flow sequencing
    Execution,
    /// Value flow
    Data,
}

/// Definition of a pin on a node
///
/// Direction is implied by whether the pin sits in a node's input or
/// output list. Neither direction nor kind changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pin {
    /// Pin name (shown in the editor, used as argument name)
    pub name: String,
    /// Execution or data
    pub kind: PinKind,
    /// Value type (always `Any` for execution pins)
    pub value_type: ValueType,
}

impl Pin {
    /// Create an execution pin
    pub fn exec(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PinKind::Execution,
            value_type: ValueType::Any,
        }
    }

    /// Create a data pin
    pub fn data(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            kind: PinKind::Data,
            value_type,
        }
    }

    /// Check if this is an execution pin
    pub fn is_execution(&self) -> bool {
        self.kind == PinKind::Execution
    }
}

/// A connection from an output pin to an input pin
///
/// The orchestration's connection list is the single source of truth;
/// per-pin views are derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Source node ID
    pub from_node: NodeId,
    /// Source output port index
    pub from_port: usize,
    /// Target node ID
    pub to_node: NodeId,
    /// Target input port index
    pub to_port: usize,
}

impl Connection {
    /// Create a new connection
    pub fn new(from_node: NodeId, from_port: usize, to_node: NodeId, to_port: usize) -> Self {
        Self {
            from_node,
            from_port,
            to_node,
            to_port,
        }
    }

    /// Check whether either endpoint is the given node
    pub fn touches(&self, node_id: NodeId) -> bool {
        self.from_node == node_id || self.to_node == node_id
    }
}

impl std::fmt::Display for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{}",
            self.from_node, self.from_port, self.to_node, self.to_port
        )
    }
}
