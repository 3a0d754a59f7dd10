//! Structural validation for orchestrations
//!
//! Checks the invariants every refactor must preserve: connections reference
//! existing pins within one graph, each node belongs to exactly one graph,
//! and function-bound nodes mirror their function's signature.

use std::collections::{HashMap, HashSet};

use crate::orchestration::{NodeKind, Orchestration};
use crate::types::{Connection, NodeId, PinDirection};

/// Validation error with location context
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A connection endpoint does not reference an existing pin
    DanglingConnection { connection: Connection },
    /// A connection links nodes in two different graphs
    CrossGraphConnection { connection: Connection },
    /// The same connection is listed twice
    DuplicateConnection { connection: Connection },
    /// A node is not listed in any graph
    OrphanedNode { node_id: NodeId },
    /// A node is listed in more than one graph, or twice in one graph
    MultipleOwners { node_id: NodeId },
    /// A graph lists a node that does not exist
    UnknownNode { graph: String, node_id: NodeId },
    /// A function's entry node is missing or not an Entry for it
    MissingEntryNode { function: String },
    /// A function's result node is missing or not a Result for it
    MissingResultNode { function: String },
    /// A function-bound node's pins do not match the function signature
    SignatureMismatch { node_id: NodeId, function: String },
    /// A function-bound node references a function that does not exist
    UnknownFunction { node_id: NodeId, function: String },
    /// More than one execution wire leaves an Entry or enters a Result
    MultipleControlPaths { node_id: NodeId },
    /// The id allocator would hand out an id that is already used
    StaleIdAllocator { next_id: NodeId },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DanglingConnection { connection } => {
                write!(f, "Connection {} references a missing pin", connection)
            }
            Self::CrossGraphConnection { connection } => {
                write!(f, "Connection {} crosses graphs", connection)
            }
            Self::DuplicateConnection { connection } => {
                write!(f, "Connection {} is listed more than once", connection)
            }
            Self::OrphanedNode { node_id } => {
                write!(f, "Node {} does not belong to any graph", node_id)
            }
            Self::MultipleOwners { node_id } => {
                write!(f, "Node {} belongs to more than one graph", node_id)
            }
            Self::UnknownNode { graph, node_id } => {
                write!(f, "Graph '{}' references unknown node {}", graph, node_id)
            }
            Self::MissingEntryNode { function } => {
                write!(f, "Function '{}' has no valid entry node", function)
            }
            Self::MissingResultNode { function } => {
                write!(f, "Function '{}' has no valid result node", function)
            }
            Self::SignatureMismatch { node_id, function } => {
                write!(
                    f,
                    "Node {} does not match the signature of function '{}'",
                    node_id, function
                )
            }
            Self::UnknownFunction { node_id, function } => {
                write!(f, "Node {} references unknown function '{}'", node_id, function)
            }
            Self::MultipleControlPaths { node_id } => {
                write!(f, "Node {} has more than one execution wire", node_id)
            }
            Self::StaleIdAllocator { next_id } => {
                write!(f, "Next node id {} is already in use", next_id)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate an orchestration
///
/// Returns all validation errors found (not just the first).
pub fn validate_orchestration(orchestration: &Orchestration) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let owners = validate_membership(orchestration, &mut errors);
    validate_connections(orchestration, &owners, &mut errors);
    validate_functions(orchestration, &mut errors);
    validate_allocator(orchestration, &mut errors);

    errors
}

/// Check that each node is listed exactly once across all graphs
fn validate_membership<'a>(
    orchestration: &'a Orchestration,
    errors: &mut Vec<ValidationError>,
) -> HashMap<NodeId, &'a str> {
    let mut owners: HashMap<NodeId, &str> = HashMap::new();
    let mut reported = HashSet::new();

    for graph in orchestration.graphs() {
        for &node_id in &graph.nodes {
            if orchestration.node(node_id).is_none() {
                errors.push(ValidationError::UnknownNode {
                    graph: graph.name.clone(),
                    node_id,
                });
                continue;
            }
            if owners.insert(node_id, graph.name.as_str()).is_some() && reported.insert(node_id) {
                errors.push(ValidationError::MultipleOwners { node_id });
            }
        }
    }

    for node in orchestration.nodes() {
        if !owners.contains_key(&node.id) {
            errors.push(ValidationError::OrphanedNode { node_id: node.id });
        }
    }
    owners
}

/// Check that connections reference existing pins inside one graph
fn validate_connections(
    orchestration: &Orchestration,
    owners: &HashMap<NodeId, &str>,
    errors: &mut Vec<ValidationError>,
) {
    let mut seen = HashSet::new();
    for conn in orchestration.connections() {
        if !seen.insert(*conn) {
            errors.push(ValidationError::DuplicateConnection { connection: *conn });
        }

        let from_ok = orchestration
            .pin(conn.from_node, PinDirection::Output, conn.from_port)
            .is_some();
        let to_ok = orchestration
            .pin(conn.to_node, PinDirection::Input, conn.to_port)
            .is_some();
        if !from_ok || !to_ok {
            errors.push(ValidationError::DanglingConnection { connection: *conn });
            continue;
        }

        if let (Some(from), Some(to)) = (owners.get(&conn.from_node), owners.get(&conn.to_node)) {
            if from != to {
                errors.push(ValidationError::CrossGraphConnection { connection: *conn });
            }
        }
    }
}

/// Check function terminals and signature mirroring
fn validate_functions(orchestration: &Orchestration, errors: &mut Vec<ValidationError>) {
    for function in orchestration.functions() {
        let entry_ok = orchestration.node(function.entry_node).is_some_and(|n| {
            matches!(&n.kind, NodeKind::Entry { function: f } if *f == function.name)
        });
        if !entry_ok {
            errors.push(ValidationError::MissingEntryNode {
                function: function.name.clone(),
            });
        } else if orchestration
            .connections()
            .iter()
            .filter(|c| c.from_node == function.entry_node && c.from_port == 0)
            .count()
            > 1
        {
            errors.push(ValidationError::MultipleControlPaths {
                node_id: function.entry_node,
            });
        }

        if let Some(result) = function.result_node {
            let result_ok = orchestration.node(result).is_some_and(|n| {
                matches!(&n.kind, NodeKind::Result { function: f } if *f == function.name)
            });
            if !result_ok {
                errors.push(ValidationError::MissingResultNode {
                    function: function.name.clone(),
                });
            } else if orchestration
                .connections()
                .iter()
                .filter(|c| c.to_node == result && c.to_port == 0)
                .count()
                > 1
            {
                errors.push(ValidationError::MultipleControlPaths { node_id: result });
            }
        }
    }

    for node in orchestration.nodes() {
        let Some(name) = node.kind.function() else {
            continue;
        };
        let Some(function) = orchestration.function(name) else {
            errors.push(ValidationError::UnknownFunction {
                node_id: node.id,
                function: name.to_string(),
            });
            continue;
        };
        let (inputs, outputs) = function.pins_for(&node.kind);
        if inputs != node.inputs || outputs != node.outputs {
            errors.push(ValidationError::SignatureMismatch {
                node_id: node.id,
                function: name.to_string(),
            });
        }
    }
}

/// Check that the allocator won't reuse an id
fn validate_allocator(orchestration: &Orchestration, errors: &mut Vec<ValidationError>) {
    let next_id = orchestration.peek_node_id();
    if orchestration.nodes().any(|n| n.id >= next_id) {
        errors.push(ValidationError::StaleIdAllocator { next_id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::OrchestrationBuilder;
    use crate::orchestration::{Argument, Node, DEFAULT_EVENT_GRAPH};
    use crate::types::{Pin, ValueType};

    fn make_valid() -> Orchestration {
        OrchestrationBuilder::new("script")
            .add_node(1, "a", (0.0, 0.0))
            .output(Pin::exec("then"))
            .add_node(2, "b", (100.0, 0.0))
            .input(Pin::exec("exec"))
            .connect(1, 0, 2, 0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_valid_orchestration() {
        let errors = validate_orchestration(&make_valid());
        assert!(errors.is_empty(), "Expected no errors, got: {:?}", errors);
    }

    #[test]
    fn test_cross_graph_connection() {
        let mut orch = make_valid();
        orch.add_graph("Other", crate::orchestration::GraphKind::Event)
            .unwrap();
        orch.move_node(2, "Other").unwrap();

        let errors = validate_orchestration(&orch);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::CrossGraphConnection { .. })));
    }

    #[test]
    fn test_dangling_after_pin_removal() {
        let mut orch = make_valid();
        orch.node_mut(2).unwrap().inputs.clear();

        let errors = validate_orchestration(&orch);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::DanglingConnection { .. })));
    }

    #[test]
    fn test_signature_mismatch() {
        let mut orch = Orchestration::with_event_graph("script");
        orch.create_function("F", (0.0, 0.0), None).unwrap();
        let call = orch.add_call_node(DEFAULT_EVENT_GRAPH, "F", (0.0, 0.0)).unwrap();
        assert!(validate_orchestration(&orch).is_empty());

        orch.node_mut(call)
            .unwrap()
            .inputs
            .push(Pin::data("extra", ValueType::Float));
        let errors = validate_orchestration(&orch);
        assert_eq!(
            errors,
            vec![ValidationError::SignatureMismatch {
                node_id: call,
                function: "F".to_string()
            }]
        );

        orch.add_function_argument("F", Argument::new("extra", ValueType::Float))
            .unwrap();
        assert!(validate_orchestration(&orch).is_empty());
    }

    #[test]
    fn test_unknown_function() {
        let mut orch = Orchestration::with_event_graph("script");
        let node = Node::new(0, "call", (0.0, 0.0));
        let id = orch.add_node(DEFAULT_EVENT_GRAPH, node).unwrap();
        orch.node_mut(id).unwrap().kind = NodeKind::Call {
            function: "Missing".to_string(),
        };

        let errors = validate_orchestration(&orch);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::UnknownFunction { .. })));
    }

    #[test]
    fn test_collects_multiple_errors() {
        let mut orch = make_valid();
        orch.node_mut(1).unwrap().outputs.clear();
        orch.add_graph("Other", crate::orchestration::GraphKind::Event)
            .unwrap();
        orch.create_function("F", (0.0, 0.0), None).unwrap();
        let entry = orch.function("F").unwrap().entry_node;
        orch.remove_node(entry).unwrap();

        let errors = validate_orchestration(&orch);
        assert!(errors.len() >= 2);
    }
}
