//! Expand a call node back into the body of the function it calls.
//!
//! The function itself is left untouched: its body nodes are copied into
//! the caller's graph around the call node's position, their internal wires
//! are recreated, and the call node is removed. Wires that reached the call
//! node from the caller are not reattached to the copied nodes.

use std::collections::HashMap;

use crate::boundary::classify_boundary;
use crate::bounds::node_set_rect;
use crate::error::{Result, ScriptEngineError};
use crate::events::ScriptEvent;
use crate::orchestration::{NodeKind, Orchestration};
use crate::types::{Connection, NodeId};

/// Result of an inline request.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineOutcome {
    /// Nothing to do: the call node or its function is missing, or the
    /// function body is empty. The orchestration is unchanged.
    NotApplicable,
    /// The call node was replaced by copies of the function body.
    Inlined {
        /// Graph that received the copies.
        graph: String,
        /// (original body node, copy) pairs in body order.
        node_map: Vec<(NodeId, NodeId)>,
    },
}

impl InlineOutcome {
    /// Notifications the UI needs after this inline.
    pub fn events(&self) -> Vec<ScriptEvent> {
        match self {
            InlineOutcome::NotApplicable => Vec::new(),
            InlineOutcome::Inlined { graph, .. } => vec![ScriptEvent::graph_changed(graph)],
        }
    }

    /// Id of the copy made from a body node.
    pub fn copy_of(&self, original: NodeId) -> Option<NodeId> {
        match self {
            InlineOutcome::NotApplicable => None,
            InlineOutcome::Inlined { node_map, .. } => node_map
                .iter()
                .find(|(old, _)| *old == original)
                .map(|(_, new)| *new),
        }
    }
}

/// Replace `call_node` in `target_graph` with a copy of its function body.
///
/// Unresolvable references and empty bodies are not errors; they yield
/// [`InlineOutcome::NotApplicable`]. On error the orchestration is left
/// exactly as it was.
pub fn inline(orchestration: &mut Orchestration, call_node: NodeId, target_graph: &str) -> Result<InlineOutcome> {
    if !orchestration.has_graph(target_graph) {
        return Err(ScriptEngineError::GraphNotFound(target_graph.to_string()));
    }

    let Some(call) = orchestration.node(call_node) else {
        log::debug!("Inline skipped: node {} does not exist", call_node);
        return Ok(InlineOutcome::NotApplicable);
    };
    let NodeKind::Call { function } = &call.kind else {
        log::debug!("Inline skipped: node {} is not a call node", call_node);
        return Ok(InlineOutcome::NotApplicable);
    };
    let Some(function) = orchestration.function(function) else {
        log::debug!("Inline skipped: call node {} references a missing function", call_node);
        return Ok(InlineOutcome::NotApplicable);
    };

    let body: Vec<_> = orchestration
        .graph_nodes(&function.graph)
        .into_iter()
        .filter(|n| !n.kind.is_function_terminal() && n.can_duplicate)
        .collect();
    let Some(area) = node_set_rect(body.iter().copied()) else {
        log::debug!("Inline skipped: function '{}' has an empty body", function.name);
        return Ok(InlineOutcome::NotApplicable);
    };

    let center = area.center();
    let offset = (call.position.0 - center.0, call.position.1 - center.1);
    let body_ids: Vec<NodeId> = body.iter().map(|n| n.id).collect();
    let internal = classify_boundary(orchestration, &body_ids).internal;
    let function_name = function.name.clone();

    let mut working = orchestration.clone();
    let node_map = copy_body(&mut working, &body_ids, &internal, target_graph, offset, call_node)
        .map_err(|e| {
            log::warn!("Inlining '{}' failed, changes discarded: {}", function_name, e);
            e
        })?;
    *orchestration = working;

    log::info!(
        "Inlined {} nodes of '{}' into '{}' replacing call node {}",
        node_map.len(),
        function_name,
        target_graph,
        call_node
    );
    Ok(InlineOutcome::Inlined {
        graph: target_graph.to_string(),
        node_map,
    })
}

fn copy_body(
    orchestration: &mut Orchestration,
    body: &[NodeId],
    internal: &[Connection],
    target_graph: &str,
    offset: (f64, f64),
    call_node: NodeId,
) -> Result<Vec<(NodeId, NodeId)>> {
    let mut node_map = Vec::with_capacity(body.len());
    let mut remap = HashMap::with_capacity(body.len());
    for &id in body {
        let copy = orchestration.duplicate_node(id, target_graph, offset)?;
        node_map.push((id, copy));
        remap.insert(id, copy);
    }

    for conn in internal {
        let (Some(&from), Some(&to)) = (remap.get(&conn.from_node), remap.get(&conn.to_node)) else {
            continue;
        };
        orchestration.link(Connection::new(from, conn.from_port, to, conn.to_port))?;
    }

    orchestration.remove_node(call_node)?;
    Ok(node_map)
}
