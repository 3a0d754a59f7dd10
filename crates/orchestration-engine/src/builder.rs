//! Fluent builder for orchestrations
//!
//! Provides a compact API for constructing orchestrations programmatically,
//! mostly for host import code and tests.

use crate::error::Result;
use crate::orchestration::{GraphKind, Node, Orchestration, DEFAULT_EVENT_GRAPH};
use crate::types::{Connection, NodeId, Pin, Position};

/// Fluent builder for orchestrations
///
/// Nodes are added to the current graph (initially the default event
/// graph) with explicit ids. Connections are applied at `build` time, so
/// they may reference nodes added later.
///
/// # Example
///
/// ```ignore
/// let orchestration = OrchestrationBuilder::new("player")
///     .add_node(1, "on_ready", (0.0, 0.0))
///     .output(Pin::exec("then"))
///     .add_node(2, "print", (200.0, 0.0))
///     .input(Pin::exec("exec"))
///     .connect(1, 0, 2, 0)
///     .build()?;
/// ```
pub struct OrchestrationBuilder {
    name: String,
    graphs: Vec<(String, GraphKind)>,
    nodes: Vec<(String, Node)>,
    connections: Vec<Connection>,
    current_graph: String,
}

impl OrchestrationBuilder {
    /// Create a builder whose current graph is the default event graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            graphs: Vec::new(),
            nodes: Vec::new(),
            connections: Vec::new(),
            current_graph: DEFAULT_EVENT_GRAPH.to_string(),
        }
    }

    /// Add an event graph and make it current
    pub fn add_graph(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.graphs.push((name.clone(), GraphKind::Event));
        self.current_graph = name;
        self
    }

    /// Add a generic node to the current graph
    pub fn add_node(mut self, id: NodeId, node_type: impl Into<String>, position: Position) -> Self {
        self.nodes
            .push((self.current_graph.clone(), Node::new(id, node_type, position)));
        self
    }

    /// Add an input pin to the most recently added node
    pub fn input(mut self, pin: Pin) -> Self {
        if let Some((_, node)) = self.nodes.last_mut() {
            node.inputs.push(pin);
        }
        self
    }

    /// Add an output pin to the most recently added node
    pub fn output(mut self, pin: Pin) -> Self {
        if let Some((_, node)) = self.nodes.last_mut() {
            node.outputs.push(pin);
        }
        self
    }

    /// Mark the most recently added node as not duplicable
    pub fn non_duplicable(mut self) -> Self {
        if let Some((_, node)) = self.nodes.last_mut() {
            node.can_duplicate = false;
        }
        self
    }

    /// Connect an output port to an input port
    pub fn connect(mut self, from_node: NodeId, from_port: usize, to_node: NodeId, to_port: usize) -> Self {
        self.connections
            .push(Connection::new(from_node, from_port, to_node, to_port));
        self
    }

    /// Build the orchestration, checking every node and connection
    pub fn build(self) -> Result<Orchestration> {
        let mut orchestration = Orchestration::with_event_graph(self.name);
        for (name, kind) in self.graphs {
            orchestration.add_graph(name, kind)?;
        }
        for (graph, node) in self.nodes {
            orchestration.insert_node(&graph, node)?;
        }
        for connection in self.connections {
            orchestration.link(connection)?;
        }
        Ok(orchestration)
    }
}
