//! Orchestration model types: nodes, graphs and functions.
//!
//! An orchestration is one script. It owns a set of peer graphs; each node
//! belongs to exactly one graph. Function graphs additionally carry an
//! Entry node, an optional Result node and the function signature.

use serde::{Deserialize, Serialize};

use crate::types::{NodeId, Pin, PinDirection, Position, ValueType};

/// Default name of the event graph every script starts with.
pub const DEFAULT_EVENT_GRAPH: &str = "EventGraph";

/// The kind of a node.
///
/// Function-bound kinds mirror their function's signature; their pins are
/// regenerated whenever the signature changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// A user node of an arbitrary type (print, add, constant, ...).
    Generic {
        #[serde(rename = "nodeType")]
        node_type: String,
    },
    /// Start of a function; only output pins.
    Entry { function: String },
    /// End of a function; only input pins.
    Result { function: String },
    /// Invokes a function from another graph.
    Call { function: String },
}

impl NodeKind {
    /// The function this node is bound to, if any.
    pub fn function(&self) -> Option<&str> {
        match self {
            NodeKind::Generic { .. } => None,
            NodeKind::Entry { function }
            | NodeKind::Result { function }
            | NodeKind::Call { function } => Some(function),
        }
    }

    /// Entry and Result nodes are never duplicated or moved by refactors.
    pub fn is_function_terminal(&self) -> bool {
        matches!(self, NodeKind::Entry { .. } | NodeKind::Result { .. })
    }

    /// Get a human-readable label for this node kind.
    pub fn label(&self) -> &str {
        match self {
            NodeKind::Generic { node_type } => node_type,
            NodeKind::Entry { .. } => "Function Entry",
            NodeKind::Result { .. } => "Function Result",
            NodeKind::Call { .. } => "Call Function",
        }
    }
}

/// A node in an orchestration graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identifier for this node.
    pub id: NodeId,
    /// The kind of node.
    pub kind: NodeKind,
    /// Position in the visual editor (x, y).
    pub position: Position,
    /// Ordered input pins.
    #[serde(default)]
    pub inputs: Vec<Pin>,
    /// Ordered output pins.
    #[serde(default)]
    pub outputs: Vec<Pin>,
    /// Whether the node may be copied or moved into another graph.
    pub can_duplicate: bool,
}

impl Node {
    /// Create a generic node with no pins.
    pub fn new(id: NodeId, node_type: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            kind: NodeKind::Generic {
                node_type: node_type.into(),
            },
            position,
            inputs: Vec::new(),
            outputs: Vec::new(),
            can_duplicate: true,
        }
    }

    /// Create a node bound to a function, with pins mirroring its signature.
    pub fn for_function(id: NodeId, kind: NodeKind, function: &Function, position: Position) -> Self {
        let (inputs, outputs) = function.pins_for(&kind);
        let can_duplicate = !kind.is_function_terminal();
        Self {
            id,
            kind,
            position,
            inputs,
            outputs,
            can_duplicate,
        }
    }

    /// Add an input pin.
    pub fn with_input(mut self, pin: Pin) -> Self {
        self.inputs.push(pin);
        self
    }

    /// Add an output pin.
    pub fn with_output(mut self, pin: Pin) -> Self {
        self.outputs.push(pin);
        self
    }

    /// Mark the node as not duplicable.
    pub fn non_duplicable(mut self) -> Self {
        self.can_duplicate = false;
        self
    }

    /// Get the pins in one direction.
    pub fn pins(&self, direction: PinDirection) -> &[Pin] {
        match direction {
            PinDirection::Input => &self.inputs,
            PinDirection::Output => &self.outputs,
        }
    }

    /// Find a pin by direction and port index.
    pub fn pin(&self, direction: PinDirection, port: usize) -> Option<&Pin> {
        self.pins(direction).get(port)
    }
}

/// What a graph is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphKind {
    /// A top-level event graph.
    Event,
    /// The body of a function.
    Function,
}

/// A named subgraph: an ordered set of node ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    /// Unique graph name within the orchestration.
    pub name: String,
    /// Graph kind.
    pub kind: GraphKind,
    /// Member nodes in insertion order.
    pub nodes: Vec<NodeId>,
}

impl Graph {
    /// Create a new empty graph.
    pub fn new(name: impl Into<String>, kind: GraphKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nodes: Vec::new(),
        }
    }

    /// Check if this graph contains a specific node.
    pub fn contains(&self, node_id: NodeId) -> bool {
        self.nodes.contains(&node_id)
    }
}

/// A function argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Argument {
    pub name: String,
    pub value_type: ValueType,
}

impl Argument {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
        }
    }
}

/// A function: signature bound one-to-one to a graph, an Entry node and
/// an optional Result node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Function {
    /// Function name (also the name of its backing graph).
    pub name: String,
    /// Ordered arguments.
    #[serde(default)]
    pub arguments: Vec<Argument>,
    /// Return type, when the function returns a value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<ValueType>,
    /// Name of the backing graph.
    pub graph: String,
    /// The Entry node ("owning node") of this function.
    pub entry_node: NodeId,
    /// The Result node, if the function has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_node: Option<NodeId>,
}

impl Function {
    /// Create a function with an empty signature.
    pub fn new(name: impl Into<String>, entry_node: NodeId) -> Self {
        let name = name.into();
        Self {
            graph: name.clone(),
            name,
            arguments: Vec::new(),
            return_type: None,
            entry_node,
            result_node: None,
        }
    }

    /// Number of arguments.
    pub fn argument_count(&self) -> usize {
        self.arguments.len()
    }

    /// Compute the (inputs, outputs) pins a node of `kind` bound to this
    /// function should carry.
    ///
    /// Port 0 is always the execution pin; data pins follow in signature
    /// order starting at port 1.
    pub fn pins_for(&self, kind: &NodeKind) -> (Vec<Pin>, Vec<Pin>) {
        let argument_pins = || {
            self.arguments
                .iter()
                .map(|a| Pin::data(a.name.clone(), a.value_type))
                .collect::<Vec<_>>()
        };
        let return_pin = || self.return_type.map(|t| Pin::data("return_value", t));

        match kind {
            NodeKind::Generic { .. } => (Vec::new(), Vec::new()),
            NodeKind::Entry { .. } => {
                let mut outputs = vec![Pin::exec("exec")];
                outputs.extend(argument_pins());
                (Vec::new(), outputs)
            }
            NodeKind::Result { .. } => {
                let mut inputs = vec![Pin::exec("exec")];
                inputs.extend(return_pin());
                (inputs, Vec::new())
            }
            NodeKind::Call { .. } => {
                let mut inputs = vec![Pin::exec("exec")];
                inputs.extend(argument_pins());
                let mut outputs = vec![Pin::exec("then")];
                outputs.extend(return_pin());
                (inputs, outputs)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PinKind;

    fn make_function() -> Function {
        let mut function = Function::new("Sum", 1);
        function.arguments.push(Argument::new("a", ValueType::Integer));
        function.arguments.push(Argument::new("b", ValueType::Float));
        function.return_type = Some(ValueType::Float);
        function
    }

    #[test]
    fn test_entry_pins() {
        let function = make_function();
        let (inputs, outputs) = function.pins_for(&NodeKind::Entry {
            function: "Sum".into(),
        });
        assert!(inputs.is_empty());
        assert_eq!(outputs.len(), 3);
        assert_eq!(outputs[0].kind, PinKind::Execution);
        assert_eq!(outputs[1].name, "a");
        assert_eq!(outputs[2].value_type, ValueType::Float);
    }

    #[test]
    fn test_call_pins_mirror_signature() {
        let function = make_function();
        let node = Node::for_function(
            9,
            NodeKind::Call {
                function: "Sum".into(),
            },
            &function,
            (0.0, 0.0),
        );
        assert_eq!(node.inputs.len(), 3);
        assert_eq!(node.outputs.len(), 2);
        assert_eq!(node.outputs[1].value_type, ValueType::Float);
        assert!(node.can_duplicate);
    }

    #[test]
    fn test_terminals_not_duplicable() {
        let function = Function::new("Empty", 1);
        let result = Node::for_function(
            2,
            NodeKind::Result {
                function: "Empty".into(),
            },
            &function,
            (0.0, 0.0),
        );
        assert!(!result.can_duplicate);
        assert_eq!(result.inputs.len(), 1);
        assert!(result.outputs.is_empty());
    }

    #[test]
    fn test_node_kind_serialization() {
        let node = Node::new(3, "print", (10.0, 20.0));
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("\"type\":\"generic\""));
        assert!(json.contains("\"nodeType\":\"print\""));
        assert!(json.contains("\"position\":[10.0,20.0]"));
    }
}
