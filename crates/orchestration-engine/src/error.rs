//! Error types for the orchestration engine

use thiserror::Error;

use crate::types::NodeId;

/// Result type alias using ScriptEngineError
pub type Result<T> = std::result::Result<T, ScriptEngineError>;

/// Errors that can occur while editing an orchestration
#[derive(Debug, Error)]
pub enum ScriptEngineError {
    /// Selection is empty or contains a node that cannot be moved
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// More than one execution wire crosses the selection boundary
    #[error(
        "Cannot collapse to function with more than one external execution wire \
         ({inbound} inbound, {outbound} outbound)"
    )]
    TooManyBoundaryExecutionEdges { inbound: usize, outbound: usize },

    /// Outbound crossing set exceeds one execution and one data wire
    #[error("Cannot output more than one execution and one data pin ({0} outbound wires)")]
    TooManyBoundaryOutputs(usize),

    /// The function or its backing graph could not be created
    #[error("Function creation failed: {0}")]
    FunctionCreationFailed(String),

    /// The entry node of a new function could not be created
    #[error("Failed to create function entry node for function '{0}'")]
    EntryNodeCreationFailed(String),

    /// Node id does not resolve
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Node id is already taken
    #[error("Node id already in use: {0}")]
    DuplicateNodeId(NodeId),

    /// The node id allocator ran out of ids
    #[error("Node id space exhausted")]
    NodeIdExhausted,

    /// Function name does not resolve
    #[error("Function not found: {0}")]
    FunctionNotFound(String),

    /// Graph name does not resolve
    #[error("Graph not found: {0}")]
    GraphNotFound(String),

    /// A graph with this name already exists
    #[error("Graph already exists: {0}")]
    GraphExists(String),

    /// Connection endpoint does not reference an existing pin
    #[error("Pin not found: node {node} {direction} port {port}")]
    PinNotFound {
        node: NodeId,
        direction: &'static str,
        port: usize,
    },

    /// Connection endpoints belong to different graphs
    #[error("Cannot connect node {from} to node {to}: they are in different graphs")]
    CrossGraphConnection { from: NodeId, to: NodeId },

    /// Connection already exists
    #[error("Connection already exists: {0}")]
    DuplicateConnection(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Compression error
    #[error("Compression error: {0}")]
    Compression(String),
}

impl ScriptEngineError {
    /// Create an invalid selection error with a message
    pub fn invalid_selection(msg: impl Into<String>) -> Self {
        Self::InvalidSelection(msg.into())
    }

    /// Whether the error was raised by a precondition check (no mutation happened)
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::InvalidSelection(_)
                | Self::TooManyBoundaryExecutionEdges { .. }
                | Self::TooManyBoundaryOutputs(_)
                | Self::FunctionCreationFailed(_)
                | Self::EntryNodeCreationFailed(_)
        )
    }
}
