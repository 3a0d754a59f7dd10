//! Boundary classification of a node selection.
//!
//! Splits the connections touching a selection into internal, inbound and
//! outbound buckets (in canonical connection order), and counts crossing
//! wires per kind from the perspective of the selected node that owns the
//! inside endpoint.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::orchestration::Orchestration;
use crate::types::{Connection, NodeId, PinDirection, PinKind};

/// Maximum execution wires allowed to cross the boundary in each direction.
pub const MAX_BOUNDARY_EXECUTIONS: usize = 1;

/// Maximum outbound crossing wires (one execution plus one data).
pub const MAX_BOUNDARY_OUTPUTS: usize = 2;

/// How a selection connects to the rest of the orchestration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryReport {
    /// Both endpoints inside the selection.
    pub internal: Vec<Connection>,
    /// Source outside, destination inside.
    pub inbound: Vec<Connection>,
    /// Source inside, destination outside.
    pub outbound: Vec<Connection>,
    pub inbound_executions: usize,
    pub inbound_data: usize,
    pub outbound_executions: usize,
    pub outbound_data: usize,
}

impl BoundaryReport {
    /// Every connection touching the selection, bucket by bucket.
    pub fn touching(&self) -> impl Iterator<Item = &Connection> {
        self.internal
            .iter()
            .chain(self.inbound.iter())
            .chain(self.outbound.iter())
    }

    /// Number of wires crossing the boundary.
    pub fn crossing_count(&self) -> usize {
        self.inbound.len() + self.outbound.len()
    }

    /// Whether the boundary satisfies the collapse-to-function limits.
    pub fn can_collapse(&self) -> bool {
        self.inbound_executions <= MAX_BOUNDARY_EXECUTIONS
            && self.outbound_executions <= MAX_BOUNDARY_EXECUTIONS
            && self.outbound.len() <= MAX_BOUNDARY_OUTPUTS
    }
}

/// Classify the connections of `orchestration` against a selection.
///
/// Read-only.
pub fn classify_boundary(orchestration: &Orchestration, selection: &[NodeId]) -> BoundaryReport {
    let members: HashSet<NodeId> = selection.iter().copied().collect();
    let mut report = BoundaryReport::default();

    // Per-pin counters
    let index = orchestration.pin_index();
    let mut counted: HashSet<NodeId> = HashSet::new();
    for &node_id in selection {
        if !counted.insert(node_id) {
            continue;
        }
        let Some(node) = orchestration.node(node_id) else {
            continue;
        };

        for (port, pin) in node.inputs.iter().enumerate() {
            for conn in index.links(node_id, PinDirection::Input, port) {
                if members.contains(&conn.from_node) {
                    continue;
                }
                match pin.kind {
                    PinKind::Execution => report.inbound_executions += 1,
                    PinKind::Data => report.inbound_data += 1,
                }
            }
        }

        for (port, pin) in node.outputs.iter().enumerate() {
            for conn in index.links(node_id, PinDirection::Output, port) {
                if members.contains(&conn.to_node) {
                    continue;
                }
                match pin.kind {
                    PinKind::Execution => report.outbound_executions += 1,
                    PinKind::Data => report.outbound_data += 1,
                }
            }
        }
    }

    // Bucketing over the canonical list
    for conn in orchestration.connections() {
        let from_inside = members.contains(&conn.from_node);
        let to_inside = members.contains(&conn.to_node);
        match (from_inside, to_inside) {
            (true, true) => report.internal.push(*conn),
            (false, true) => report.inbound.push(*conn),
            (true, false) => report.outbound.push(*conn),
            (false, false) => {}
        }
    }

    log::debug!(
        "Boundary of {} nodes: {} internal, {} inbound, {} outbound",
        members.len(),
        report.internal.len(),
        report.inbound.len(),
        report.outbound.len()
    );
    report
}
