//! The orchestration graph model.
//!
//! Nodes live in an arena keyed by id. Connections are stored once, in
//! insertion order, in a single list that is the source of truth; per-pin
//! views ([`PinIndex`]) are derived from it on demand.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::types::{Argument, Function, Graph, GraphKind, Node, NodeKind};
use crate::error::{Result, ScriptEngineError};
use crate::types::{Connection, NodeId, Pin, PinDirection, Position, ValueType};

/// Nodes created while setting up a new function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionNodes {
    pub entry: NodeId,
    pub result: Option<NodeId>,
}

/// An orchestration (one script): peer graphs, functions, the node arena
/// and the canonical connection list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Orchestration {
    /// Script name.
    pub name: String,
    /// Peer graphs in creation order.
    graphs: Vec<Graph>,
    /// Functions in creation order.
    #[serde(default)]
    functions: Vec<Function>,
    /// Node arena.
    nodes: BTreeMap<NodeId, Node>,
    /// Canonical connection list (insertion order).
    #[serde(default)]
    connections: Vec<Connection>,
    /// Next id handed out by the allocator. Never decreases.
    next_node_id: NodeId,
}

impl Orchestration {
    /// Create an empty orchestration with no graphs.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            graphs: Vec::new(),
            functions: Vec::new(),
            nodes: BTreeMap::new(),
            connections: Vec::new(),
            next_node_id: 1,
        }
    }

    /// Create an orchestration with the default event graph.
    pub fn with_event_graph(name: impl Into<String>) -> Self {
        let mut orchestration = Self::new(name);
        orchestration
            .graphs
            .push(Graph::new(super::types::DEFAULT_EVENT_GRAPH, GraphKind::Event));
        orchestration
    }

    // =========================================================================
    // Graphs
    // =========================================================================

    /// Get all graphs.
    pub fn graphs(&self) -> &[Graph] {
        &self.graphs
    }

    /// Get a graph by name.
    pub fn graph(&self, name: &str) -> Option<&Graph> {
        self.graphs.iter().find(|g| g.name == name)
    }

    fn graph_mut(&mut self, name: &str) -> Result<&mut Graph> {
        self.graphs
            .iter_mut()
            .find(|g| g.name == name)
            .ok_or_else(|| ScriptEngineError::GraphNotFound(name.to_string()))
    }

    /// Check if a graph exists.
    pub fn has_graph(&self, name: &str) -> bool {
        self.graph(name).is_some()
    }

    /// Add an empty graph.
    pub fn add_graph(&mut self, name: impl Into<String>, kind: GraphKind) -> Result<()> {
        let name = name.into();
        if self.has_graph(&name) {
            return Err(ScriptEngineError::GraphExists(name));
        }
        self.graphs.push(Graph::new(name, kind));
        Ok(())
    }

    /// Remove a graph, its nodes, their connections and any function bound
    /// to it.
    pub fn remove_graph(&mut self, name: &str) -> Result<Graph> {
        let index = self
            .graphs
            .iter()
            .position(|g| g.name == name)
            .ok_or_else(|| ScriptEngineError::GraphNotFound(name.to_string()))?;
        let graph = self.graphs.remove(index);

        let removed: HashSet<NodeId> = graph.nodes.iter().copied().collect();
        for node_id in &removed {
            self.nodes.remove(node_id);
        }
        self.connections
            .retain(|c| !removed.contains(&c.from_node) && !removed.contains(&c.to_node));
        self.functions.retain(|f| f.graph != name);

        log::debug!("Removed graph '{}' with {} nodes", name, graph.nodes.len());
        Ok(graph)
    }

    /// Name of the graph owning a node.
    pub fn graph_of(&self, node_id: NodeId) -> Option<&str> {
        self.graphs
            .iter()
            .find(|g| g.contains(node_id))
            .map(|g| g.name.as_str())
    }

    /// Nodes of a graph, in graph order.
    pub fn graph_nodes(&self, name: &str) -> Vec<&Node> {
        self.graph(name)
            .map(|g| g.nodes.iter().filter_map(|id| self.nodes.get(id)).collect())
            .unwrap_or_default()
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    /// Get a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get a mutable node by id.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Iterate all nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Number of nodes in the orchestration.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Peek at the id the allocator will hand out next.
    pub fn peek_node_id(&self) -> NodeId {
        self.next_node_id
    }

    /// Reserve a fresh node id. Returns `None` when the id space is exhausted.
    pub fn allocate_node_id(&mut self) -> Option<NodeId> {
        let id = self.next_node_id;
        self.next_node_id = id.checked_add(1)?;
        Some(id)
    }

    fn require_node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or(ScriptEngineError::NodeNotFound(id))
    }

    /// Add a node to a graph with a freshly allocated id.
    ///
    /// The id carried by `node` is replaced.
    pub fn add_node(&mut self, graph: &str, mut node: Node) -> Result<NodeId> {
        if !self.has_graph(graph) {
            return Err(ScriptEngineError::GraphNotFound(graph.to_string()));
        }
        node.id = self
            .allocate_node_id()
            .ok_or(ScriptEngineError::NodeIdExhausted)?;
        self.insert_node(graph, node)
    }

    /// Insert a node that already carries an id.
    ///
    /// The allocator is bumped past the id so later allocations stay unique.
    pub fn insert_node(&mut self, graph: &str, node: Node) -> Result<NodeId> {
        let id = node.id;
        if self.nodes.contains_key(&id) {
            return Err(ScriptEngineError::DuplicateNodeId(id));
        }
        self.graph_mut(graph)?.nodes.push(id);
        self.nodes.insert(id, node);
        if id >= self.next_node_id {
            self.next_node_id = id.saturating_add(1);
        }
        Ok(id)
    }

    /// Remove a node and every connection touching it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node> {
        let node = self
            .nodes
            .remove(&id)
            .ok_or(ScriptEngineError::NodeNotFound(id))?;
        for graph in &mut self.graphs {
            graph.nodes.retain(|n| *n != id);
        }
        self.connections.retain(|c| !c.touches(id));
        Ok(node)
    }

    /// Copy a node into a graph at `position + offset`, without connections.
    pub fn duplicate_node(&mut self, id: NodeId, graph: &str, offset: Position) -> Result<NodeId> {
        let mut copy = self.require_node(id)?.clone();
        copy.position = (copy.position.0 + offset.0, copy.position.1 + offset.1);
        self.add_node(graph, copy)
    }

    /// Move a node from its current graph to another one.
    ///
    /// Connections are left untouched; callers sever cross-graph wires first.
    pub fn move_node(&mut self, id: NodeId, to_graph: &str) -> Result<()> {
        self.move_nodes(&[id], to_graph)
    }

    /// Move several nodes to another graph, appending them in the given
    /// order. One pass over each graph regardless of how many nodes move.
    pub fn move_nodes(&mut self, ids: &[NodeId], to_graph: &str) -> Result<()> {
        for &id in ids {
            self.require_node(id)?;
        }
        if !self.has_graph(to_graph) {
            return Err(ScriptEngineError::GraphNotFound(to_graph.to_string()));
        }
        let moving: HashSet<NodeId> = ids.iter().copied().collect();
        for graph in &mut self.graphs {
            graph.nodes.retain(|n| !moving.contains(n));
        }
        let target = self.graph_mut(to_graph)?;
        let mut appended = HashSet::with_capacity(moving.len());
        for &id in ids {
            if appended.insert(id) {
                target.nodes.push(id);
            }
        }
        Ok(())
    }

    /// Set a node's position.
    pub fn set_position(&mut self, id: NodeId, position: Position) -> Result<()> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(ScriptEngineError::NodeNotFound(id))?;
        node.position = position;
        Ok(())
    }

    // =========================================================================
    // Pins and connections
    // =========================================================================

    /// Find a pin.
    pub fn pin(&self, node: NodeId, direction: PinDirection, port: usize) -> Option<&Pin> {
        self.nodes.get(&node)?.pin(direction, port)
    }

    fn require_pin(&self, node: NodeId, direction: PinDirection, port: usize) -> Result<&Pin> {
        self.pin(node, direction, port)
            .ok_or(ScriptEngineError::PinNotFound {
                node,
                direction: direction.label(),
                port,
            })
    }

    /// The canonical connection list.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Connect an output pin to an input pin of a node in the same graph.
    pub fn link(&mut self, connection: Connection) -> Result<()> {
        self.require_pin(connection.from_node, PinDirection::Output, connection.from_port)?;
        self.require_pin(connection.to_node, PinDirection::Input, connection.to_port)?;
        if self.graph_of(connection.from_node) != self.graph_of(connection.to_node) {
            return Err(ScriptEngineError::CrossGraphConnection {
                from: connection.from_node,
                to: connection.to_node,
            });
        }
        if self.connections.contains(&connection) {
            return Err(ScriptEngineError::DuplicateConnection(connection.to_string()));
        }
        self.connections.push(connection);
        Ok(())
    }

    /// Remove a connection. Returns whether it existed.
    pub fn unlink(&mut self, connection: &Connection) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c != connection);
        before != self.connections.len()
    }

    /// Build the derived per-pin connection index.
    pub fn pin_index(&self) -> PinIndex {
        PinIndex::build(&self.connections)
    }

    // =========================================================================
    // Functions
    // =========================================================================

    /// Get all functions.
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// Get a function by name.
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    fn function_mut(&mut self, name: &str) -> Result<&mut Function> {
        self.functions
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| ScriptEngineError::FunctionNotFound(name.to_string()))
    }

    /// Names of all functions.
    pub fn function_names(&self) -> Vec<&str> {
        self.functions.iter().map(|f| f.name.as_str()).collect()
    }

    /// Return `base` if no function uses it, otherwise `base` followed by
    /// the smallest positive integer that makes it unique.
    pub fn unique_function_name(&self, base: &str) -> String {
        let names = self.function_names();
        if !names.contains(&base) {
            return base.to_string();
        }
        (1u64..)
            .map(|n| format!("{}{}", base, n))
            .find(|candidate| !names.contains(&candidate.as_str()))
            .unwrap_or_else(|| base.to_string())
    }

    /// Create a function: its graph, an Entry node and optionally a Result
    /// node at `entry_position + result_offset`.
    pub fn create_function(
        &mut self,
        name: &str,
        entry_position: Position,
        result_offset: Option<Position>,
    ) -> Result<FunctionNodes> {
        if self.function(name).is_some() || self.has_graph(name) {
            return Err(ScriptEngineError::FunctionCreationFailed(format!(
                "script already has graph named {}",
                name
            )));
        }
        let entry = self
            .allocate_node_id()
            .ok_or_else(|| ScriptEngineError::EntryNodeCreationFailed(name.to_string()))?;

        self.add_graph(name, GraphKind::Function)?;
        let mut function = Function::new(name, entry);

        let entry_node = Node::for_function(
            entry,
            NodeKind::Entry {
                function: name.to_string(),
            },
            &function,
            entry_position,
        );
        self.insert_node(name, entry_node)?;

        let result = match result_offset {
            Some(offset) => {
                let position = (entry_position.0 + offset.0, entry_position.1 + offset.1);
                let node = Node::for_function(
                    0,
                    NodeKind::Result {
                        function: name.to_string(),
                    },
                    &function,
                    position,
                );
                Some(self.add_node(name, node)?)
            }
            None => None,
        };
        function.result_node = result;
        self.functions.push(function);

        log::debug!("Created function '{}' (entry {}, result {:?})", name, entry, result);
        Ok(FunctionNodes { entry, result })
    }

    /// Append an argument to a function and regenerate bound nodes' pins.
    pub fn add_function_argument(&mut self, name: &str, argument: Argument) -> Result<usize> {
        let function = self.function_mut(name)?;
        function.arguments.push(argument);
        let count = function.arguments.len();
        self.refresh_function_nodes(name);
        Ok(count)
    }

    /// Set a function's return type and regenerate bound nodes' pins.
    pub fn set_function_return_type(&mut self, name: &str, return_type: Option<ValueType>) -> Result<()> {
        self.function_mut(name)?.return_type = return_type;
        self.refresh_function_nodes(name);
        Ok(())
    }

    /// Add a Call node for `function` to a graph.
    pub fn add_call_node(&mut self, graph: &str, function: &str, position: Position) -> Result<NodeId> {
        let signature = self
            .function(function)
            .ok_or_else(|| ScriptEngineError::FunctionNotFound(function.to_string()))?;
        let node = Node::for_function(
            0,
            NodeKind::Call {
                function: function.to_string(),
            },
            signature,
            position,
        );
        self.add_node(graph, node)
    }

    /// Regenerate the pins of every Entry/Result/Call node bound to a
    /// function, dropping connections to ports that no longer exist.
    pub fn refresh_function_nodes(&mut self, name: &str) {
        let Some(function) = self.function(name).cloned() else {
            return;
        };
        for node in self.nodes.values_mut() {
            if node.kind.function() == Some(name) {
                let (inputs, outputs) = function.pins_for(&node.kind);
                node.inputs = inputs;
                node.outputs = outputs;
            }
        }

        let nodes = &self.nodes;
        let before = self.connections.len();
        self.connections.retain(|c| {
            let from_ok = nodes
                .get(&c.from_node)
                .is_some_and(|n| c.from_port < n.outputs.len());
            let to_ok = nodes
                .get(&c.to_node)
                .is_some_and(|n| c.to_port < n.inputs.len());
            from_ok && to_ok
        });
        let dropped = before - self.connections.len();
        if dropped > 0 {
            log::debug!(
                "Dropped {} connections after signature change of '{}'",
                dropped,
                name
            );
        }
    }
}

/// Derived per-pin connection view, rebuilt from the canonical list.
#[derive(Debug, Clone, Default)]
pub struct PinIndex {
    links: HashMap<(NodeId, PinDirection, usize), Vec<Connection>>,
}

impl PinIndex {
    /// Build the index from a connection list, preserving list order.
    pub fn build(connections: &[Connection]) -> Self {
        let mut links: HashMap<(NodeId, PinDirection, usize), Vec<Connection>> = HashMap::new();
        for conn in connections {
            links
                .entry((conn.from_node, PinDirection::Output, conn.from_port))
                .or_default()
                .push(*conn);
            links
                .entry((conn.to_node, PinDirection::Input, conn.to_port))
                .or_default()
                .push(*conn);
        }
        Self { links }
    }

    /// Connections attached to a pin.
    pub fn links(&self, node: NodeId, direction: PinDirection, port: usize) -> &[Connection] {
        self.links
            .get(&(node, direction, port))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
