//! Collapse a node selection into a new function.
//!
//! Extraction runs in two phases:
//!
//! 1. **Plan** (read-only): validate the selection, classify its boundary and
//!    decide every argument, return value, position and wire the new
//!    function and its call site need.
//! 2. **Apply**: replay the plan on a working copy of the orchestration and
//!    swap it in only when every step succeeded.
//!
//! A failed extraction therefore never leaves a partially rewritten graph.

use std::collections::HashSet;

use crate::boundary::{classify_boundary, BoundaryReport, MAX_BOUNDARY_EXECUTIONS, MAX_BOUNDARY_OUTPUTS};
use crate::bounds::node_set_rect;
use crate::config::EngineConfig;
use crate::error::{Result, ScriptEngineError};
use crate::events::ScriptEvent;
use crate::orchestration::{Argument, FunctionNodes, Node, Orchestration};
use crate::types::{Connection, NodeId, Pin, PinDirection, Position, ValueType};

/// What a successful extraction created.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOutcome {
    /// Name of the new function (and of its graph).
    pub function: String,
    /// Graph the selection was taken from; now holds the call node.
    pub source_graph: String,
    /// The call node placed where the selection used to be.
    pub call_node: NodeId,
    /// Entry node of the new function.
    pub entry_node: NodeId,
    /// Result node of the new function, if one was created.
    pub result_node: Option<NodeId>,
}

impl ExtractOutcome {
    /// Notifications the UI needs after this extraction.
    pub fn events(&self) -> Vec<ScriptEvent> {
        vec![
            ScriptEvent::FunctionsChanged,
            ScriptEvent::graph_changed(&self.source_graph),
            ScriptEvent::FocusFunction {
                name: self.function.clone(),
            },
        ]
    }
}

/// One side of a planned wire. The synthesized nodes have no id until the
/// plan is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Node(NodeId),
    Entry,
    Result,
    Call,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PlannedLink {
    from: Endpoint,
    from_port: usize,
    to: Endpoint,
    to_port: usize,
}

impl PlannedLink {
    fn new(from: Endpoint, from_port: usize, to: Endpoint, to_port: usize) -> Self {
        Self {
            from,
            from_port,
            to,
            to_port,
        }
    }
}

/// The complete set of mutations an extraction will perform.
#[derive(Debug, Clone)]
struct ExtractionPlan {
    function: String,
    source_graph: String,
    selection: Vec<NodeId>,
    boundary: BoundaryReport,
    call_position: Position,
    entry_position: Position,
    result_position: Option<Position>,
    arguments: Vec<Argument>,
    return_type: Option<ValueType>,
    links: Vec<PlannedLink>,
}

impl ExtractionPlan {
    /// Number of ports a synthesized node will expose in a direction.
    fn synthesized_ports(&self, endpoint: Endpoint, direction: PinDirection) -> usize {
        let returns = usize::from(self.return_type.is_some());
        match (endpoint, direction) {
            (Endpoint::Entry, PinDirection::Output) => 1 + self.arguments.len(),
            (Endpoint::Result, PinDirection::Input) => 1 + returns,
            (Endpoint::Call, PinDirection::Input) => 1 + self.arguments.len(),
            (Endpoint::Call, PinDirection::Output) => 1 + returns,
            _ => 0,
        }
    }

    fn port_exists(&self, endpoint: Endpoint, direction: PinDirection, port: usize) -> bool {
        match endpoint {
            Endpoint::Node(_) => true,
            _ => port < self.synthesized_ports(endpoint, direction),
        }
    }

    /// Drop wires to ports the synthesized nodes won't have.
    fn prune_unrepresentable_links(&mut self) {
        let links = std::mem::take(&mut self.links);
        for link in links {
            if self.port_exists(link.from, PinDirection::Output, link.from_port)
                && self.port_exists(link.to, PinDirection::Input, link.to_port)
            {
                self.links.push(link);
            } else {
                log::warn!(
                    "Skipping wire {:?}:{} -> {:?}:{} for '{}': port does not exist",
                    link.from,
                    link.from_port,
                    link.to,
                    link.to_port,
                    self.function
                );
            }
        }
    }
}

/// Collapse `selection` (nodes of `source_graph`) into a new function and
/// replace it with a call node.
///
/// On error the orchestration is left exactly as it was.
pub fn extract(
    orchestration: &mut Orchestration,
    selection: &[NodeId],
    source_graph: &str,
    config: &EngineConfig,
) -> Result<ExtractOutcome> {
    let plan = plan_extraction(orchestration, selection, source_graph, config).map_err(|e| {
        log::warn!("Cannot collapse selection to function: {}", e);
        e
    })?;

    let mut working = orchestration.clone();
    let outcome = apply_plan(&mut working, &plan, config).map_err(|e| {
        log::warn!("Extraction of '{}' failed, changes discarded: {}", plan.function, e);
        e
    })?;
    *orchestration = working;

    log::info!(
        "Collapsed {} nodes from '{}' into function '{}' ({} arguments, returns value: {})",
        plan.selection.len(),
        plan.source_graph,
        plan.function,
        plan.arguments.len(),
        plan.return_type.is_some()
    );
    Ok(outcome)
}

fn output_pin<'a>(orchestration: &'a Orchestration, node: NodeId, port: usize) -> Result<&'a Pin> {
    orchestration
        .pin(node, PinDirection::Output, port)
        .ok_or(ScriptEngineError::PinNotFound {
            node,
            direction: PinDirection::Output.label(),
            port,
        })
}

fn input_pin<'a>(orchestration: &'a Orchestration, node: NodeId, port: usize) -> Result<&'a Pin> {
    orchestration
        .pin(node, PinDirection::Input, port)
        .ok_or(ScriptEngineError::PinNotFound {
            node,
            direction: PinDirection::Input.label(),
            port,
        })
}

fn position_of(orchestration: &Orchestration, node: NodeId) -> Result<Position> {
    orchestration
        .node(node)
        .map(|n| n.position)
        .ok_or(ScriptEngineError::NodeNotFound(node))
}

/// Check that the selection can be collapsed, returning it deduplicated.
fn validate_selection<'a>(
    orchestration: &'a Orchestration,
    selection: &[NodeId],
    source_graph: &str,
) -> Result<Vec<&'a Node>> {
    if selection.is_empty() {
        return Err(ScriptEngineError::invalid_selection("no nodes selected"));
    }
    let graph = orchestration
        .graph(source_graph)
        .ok_or_else(|| ScriptEngineError::GraphNotFound(source_graph.to_string()))?;

    let members: HashSet<NodeId> = graph.nodes.iter().copied().collect();
    let mut seen = HashSet::new();
    let mut nodes = Vec::with_capacity(selection.len());
    for &id in selection {
        if !seen.insert(id) {
            continue;
        }
        let node = orchestration
            .node(id)
            .ok_or_else(|| ScriptEngineError::invalid_selection(format!("node {} does not exist", id)))?;
        if !members.contains(&id) {
            return Err(ScriptEngineError::invalid_selection(format!(
                "node {} is not part of graph '{}'",
                id, source_graph
            )));
        }
        if !node.can_duplicate {
            return Err(ScriptEngineError::invalid_selection(format!(
                "Cannot collapse because node {} cannot be duplicated",
                id
            )));
        }
        nodes.push(node);
    }
    Ok(nodes)
}

fn check_boundary(boundary: &BoundaryReport) -> Result<()> {
    if boundary.inbound_executions > MAX_BOUNDARY_EXECUTIONS
        || boundary.outbound_executions > MAX_BOUNDARY_EXECUTIONS
    {
        return Err(ScriptEngineError::TooManyBoundaryExecutionEdges {
            inbound: boundary.inbound_executions,
            outbound: boundary.outbound_executions,
        });
    }
    if boundary.outbound.len() > MAX_BOUNDARY_OUTPUTS {
        return Err(ScriptEngineError::TooManyBoundaryOutputs(boundary.outbound.len()));
    }
    Ok(())
}

fn plan_extraction(
    orchestration: &Orchestration,
    selection: &[NodeId],
    source_graph: &str,
    config: &EngineConfig,
) -> Result<ExtractionPlan> {
    let nodes = validate_selection(orchestration, selection, source_graph)?;
    let selection: Vec<NodeId> = nodes.iter().map(|n| n.id).collect();

    let boundary = classify_boundary(orchestration, &selection);
    check_boundary(&boundary)?;

    let function = orchestration.unique_function_name(&config.function_base_name);
    if orchestration.has_graph(&function) {
        return Err(ScriptEngineError::FunctionCreationFailed(format!(
            "script already has graph named {}",
            function
        )));
    }
    let needed_ids = if config.add_result_node { 3 } else { 2 };
    if orchestration.peek_node_id().checked_add(needed_ids).is_none() {
        return Err(ScriptEngineError::EntryNodeCreationFailed(function));
    }

    let call_position = node_set_rect(nodes.iter().copied())
        .map(|r| r.center())
        .unwrap_or_default();

    let mut plan = ExtractionPlan {
        function,
        source_graph: source_graph.to_string(),
        selection,
        call_position,
        entry_position: config.entry_position,
        result_position: config.add_result_node.then(|| {
            (
                config.entry_position.0 + config.result_offset.0,
                config.entry_position.1 + config.result_offset.1,
            )
        }),
        arguments: Vec::new(),
        return_type: None,
        links: Vec::new(),
        boundary,
    };

    plan_inbound(orchestration, &mut plan, config)?;
    if plan.result_position.is_some() {
        plan_result_wiring(orchestration, &mut plan, config)?;
    }
    plan_call_outputs(orchestration, &mut plan)?;
    if plan.result_position.is_some() {
        plan_trivial_control_path(&mut plan, config);
    }
    plan.prune_unrepresentable_links();

    log::debug!(
        "Extraction plan for '{}': {} arguments, return {:?}, {} wires",
        plan.function,
        plan.arguments.len(),
        plan.return_type,
        plan.links.len()
    );
    Ok(plan)
}

/// Inbound wires feed the call node on the caller side and the Entry node
/// inside the function.
fn plan_inbound(orchestration: &Orchestration, plan: &mut ExtractionPlan, config: &EngineConfig) -> Result<()> {
    let mut call_input_port = 1;
    let mut entry_output_port = 1;
    let mut call_execution_wired = false;
    let mut entry_execution_wired = false;
    let mut entry_positioned = false;

    for conn in plan.boundary.inbound.clone() {
        let source_pin = output_pin(orchestration, conn.from_node, conn.from_port)?;
        if source_pin.is_execution() {
            if !call_execution_wired {
                plan.links.push(PlannedLink::new(
                    Endpoint::Node(conn.from_node),
                    conn.from_port,
                    Endpoint::Call,
                    0,
                ));
                call_execution_wired = true;
            }
        } else {
            plan.links.push(PlannedLink::new(
                Endpoint::Node(conn.from_node),
                conn.from_port,
                Endpoint::Call,
                call_input_port,
            ));
            call_input_port += 1;
        }

        let target_position = position_of(orchestration, conn.to_node)?;
        if !entry_positioned {
            plan.entry_position = (target_position.0 - config.node_spacing, target_position.1);
            entry_positioned = true;
        }

        let target_pin = input_pin(orchestration, conn.to_node, conn.to_port)?;
        if !target_pin.is_execution() {
            plan.arguments
                .push(Argument::new(target_pin.name.clone(), target_pin.value_type));
            plan.links.push(PlannedLink::new(
                Endpoint::Entry,
                entry_output_port,
                Endpoint::Node(conn.to_node),
                conn.to_port,
            ));
            entry_output_port += 1;
        } else if !entry_execution_wired {
            plan.links.push(PlannedLink::new(
                Endpoint::Entry,
                0,
                Endpoint::Node(conn.to_node),
                conn.to_port,
            ));
            entry_execution_wired = true;
        }
    }
    Ok(())
}

/// Outbound wires inside the function end at the Result node.
fn plan_result_wiring(orchestration: &Orchestration, plan: &mut ExtractionPlan, config: &EngineConfig) -> Result<()> {
    let mut execution_wired = false;
    let mut data_wired = false;
    let mut positioned = false;

    for conn in plan.boundary.outbound.clone() {
        let source_position = position_of(orchestration, conn.from_node)?;
        if !positioned {
            plan.result_position = Some((source_position.0 + config.node_spacing, source_position.1));
            positioned = true;
        }

        let source_pin = output_pin(orchestration, conn.from_node, conn.from_port)?;
        if source_pin.is_execution() {
            if !execution_wired {
                plan.links.push(PlannedLink::new(
                    Endpoint::Node(conn.from_node),
                    conn.from_port,
                    Endpoint::Result,
                    0,
                ));
                execution_wired = true;
            }
        } else if !data_wired {
            plan.return_type = Some(source_pin.value_type);
            plan.links.push(PlannedLink::new(
                Endpoint::Node(conn.from_node),
                conn.from_port,
                Endpoint::Result,
                1,
            ));
            data_wired = true;
        }
    }
    Ok(())
}

/// Outbound wires on the caller side leave from the call node.
///
/// Data wires get output ports in discovery order; a wire fanning out of a
/// source pin already seen reuses that pin's port.
fn plan_call_outputs(orchestration: &Orchestration, plan: &mut ExtractionPlan) -> Result<()> {
    let mut execution_wired = false;
    let mut next_output_port = 1;
    let mut data_ports: Vec<((NodeId, usize), usize)> = Vec::new();

    for conn in plan.boundary.outbound.clone() {
        let target_pin = input_pin(orchestration, conn.to_node, conn.to_port)?;
        if target_pin.is_execution() {
            if !execution_wired {
                plan.links.push(PlannedLink::new(
                    Endpoint::Call,
                    0,
                    Endpoint::Node(conn.to_node),
                    conn.to_port,
                ));
                execution_wired = true;
            }
            continue;
        }

        let source = (conn.from_node, conn.from_port);
        let port = match data_ports.iter().find(|(s, _)| *s == source) {
            Some((_, port)) => *port,
            None => {
                let port = next_output_port;
                next_output_port += 1;
                data_ports.push((source, port));
                port
            }
        };
        plan.links.push(PlannedLink::new(
            Endpoint::Call,
            port,
            Endpoint::Node(conn.to_node),
            conn.to_port,
        ));
    }
    Ok(())
}

/// Give a function with no control path through its body a direct
/// Entry -> Result execution wire.
fn plan_trivial_control_path(plan: &mut ExtractionPlan, config: &EngineConfig) {
    let result_connected = plan
        .links
        .iter()
        .any(|l| l.to == Endpoint::Result && l.to_port == 0);
    let entry_connected = plan
        .links
        .iter()
        .any(|l| l.from == Endpoint::Entry && l.from_port == 0);
    if result_connected || entry_connected {
        return;
    }

    plan.links
        .push(PlannedLink::new(Endpoint::Entry, 0, Endpoint::Result, 0));
    if plan.arguments.is_empty() {
        if let Some(result) = plan.result_position {
            plan.entry_position = (result.0 - config.node_spacing, result.1);
        }
    }
}

fn apply_plan(orchestration: &mut Orchestration, plan: &ExtractionPlan, config: &EngineConfig) -> Result<ExtractOutcome> {
    let result_offset = config.add_result_node.then_some(config.result_offset);
    let FunctionNodes { entry, result } =
        orchestration.create_function(&plan.function, config.entry_position, result_offset)?;

    for argument in &plan.arguments {
        orchestration.add_function_argument(&plan.function, argument.clone())?;
    }
    if plan.return_type.is_some() {
        orchestration.set_function_return_type(&plan.function, plan.return_type)?;
    }

    for conn in plan.boundary.inbound.iter().chain(plan.boundary.outbound.iter()) {
        orchestration.unlink(conn);
    }
    orchestration.move_nodes(&plan.selection, &plan.function)?;

    let call = orchestration.add_call_node(&plan.source_graph, &plan.function, plan.call_position)?;

    let resolve = |endpoint: Endpoint| -> Result<NodeId> {
        match endpoint {
            Endpoint::Node(id) => Ok(id),
            Endpoint::Entry => Ok(entry),
            Endpoint::Call => Ok(call),
            Endpoint::Result => result.ok_or_else(|| {
                ScriptEngineError::FunctionCreationFailed(format!(
                    "function '{}' has no result node",
                    plan.function
                ))
            }),
        }
    };
    for link in &plan.links {
        orchestration.link(Connection::new(
            resolve(link.from)?,
            link.from_port,
            resolve(link.to)?,
            link.to_port,
        ))?;
    }

    orchestration.set_position(entry, plan.entry_position)?;
    if let (Some(result), Some(position)) = (result, plan.result_position) {
        orchestration.set_position(result, position)?;
    }

    Ok(ExtractOutcome {
        function: plan.function.clone(),
        source_graph: plan.source_graph.clone(),
        call_node: call,
        entry_node: entry,
        result_node: result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::OrchestrationBuilder;
    use crate::orchestration::{NodeKind, DEFAULT_EVENT_GRAPH};
    use crate::validation::validate_orchestration;

    fn extract_default(orch: &mut Orchestration, selection: &[NodeId]) -> Result<ExtractOutcome> {
        extract(orch, selection, DEFAULT_EVENT_GRAPH, &EngineConfig::default())
    }

    /// event(1) -> print(2) -> log(3); constant(4) feeds print's text input
    fn make_script() -> Orchestration {
        OrchestrationBuilder::new("script")
            .add_node(1, "on_ready", (0.0, 0.0))
            .output(Pin::exec("then"))
            .add_node(2, "print", (200.0, 0.0))
            .input(Pin::exec("exec"))
            .input(Pin::data("text", ValueType::String))
            .output(Pin::exec("then"))
            .add_node(3, "log", (400.0, 0.0))
            .input(Pin::exec("exec"))
            .add_node(4, "constant", (0.0, 100.0))
            .output(Pin::data("value", ValueType::String))
            .connect(1, 0, 2, 0)
            .connect(4, 0, 2, 1)
            .connect(2, 0, 3, 0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_extract_single_node() {
        let mut orch = make_script();
        let outcome = extract_default(&mut orch, &[2]).unwrap();

        assert_eq!(outcome.function, "NewFunction");
        let function = orch.function("NewFunction").unwrap();
        assert_eq!(function.arguments, vec![Argument::new("text", ValueType::String)]);
        assert_eq!(function.return_type, None);
        assert_eq!(orch.graph_of(2), Some("NewFunction"));
        assert_eq!(orch.graph_of(outcome.call_node), Some(DEFAULT_EVENT_GRAPH));

        let call = outcome.call_node;
        let entry = outcome.entry_node;
        let result = outcome.result_node.unwrap();
        let connections = orch.connections();
        assert!(connections.contains(&Connection::new(1, 0, call, 0)));
        assert!(connections.contains(&Connection::new(4, 0, call, 1)));
        assert!(connections.contains(&Connection::new(call, 0, 3, 0)));
        assert!(connections.contains(&Connection::new(entry, 0, 2, 0)));
        assert!(connections.contains(&Connection::new(entry, 1, 2, 1)));
        assert!(connections.contains(&Connection::new(2, 0, result, 0)));
        assert_eq!(connections.len(), 6);

        assert!(validate_orchestration(&orch).is_empty());
    }

    #[test]
    fn test_layout() {
        let mut orch = make_script();
        let outcome = extract_default(&mut orch, &[2]).unwrap();

        assert_eq!(orch.node(outcome.call_node).unwrap().position, (200.0, 0.0));
        assert_eq!(orch.node(outcome.entry_node).unwrap().position, (-50.0, 0.0));
        assert_eq!(
            orch.node(outcome.result_node.unwrap()).unwrap().position,
            (450.0, 0.0)
        );
    }

    #[test]
    fn test_events() {
        let mut orch = make_script();
        let outcome = extract_default(&mut orch, &[2]).unwrap();
        let events = outcome.events();
        assert_eq!(events[0], ScriptEvent::FunctionsChanged);
        assert!(events.contains(&ScriptEvent::FocusFunction {
            name: "NewFunction".to_string()
        }));
    }

    #[test]
    fn test_unique_names() {
        let mut orch = make_script();
        extract_default(&mut orch, &[2]).unwrap();
        let second = extract_default(&mut orch, &[3]).unwrap();
        assert_eq!(second.function, "NewFunction1");
    }

    #[test]
    fn test_empty_selection_rejected() {
        let mut orch = make_script();
        let before = orch.clone();
        let err = extract_default(&mut orch, &[]).unwrap_err();
        assert!(matches!(err, ScriptEngineError::InvalidSelection(_)));
        assert_eq!(orch, before);
    }

    #[test]
    fn test_non_duplicable_rejected() {
        let mut orch = OrchestrationBuilder::new("script")
            .add_node(1, "singleton", (0.0, 0.0))
            .non_duplicable()
            .add_node(2, "other", (0.0, 0.0))
            .build()
            .unwrap();
        let before = orch.clone();

        let err = extract_default(&mut orch, &[2, 1]).unwrap_err();
        assert!(matches!(err, ScriptEngineError::InvalidSelection(_)));
        assert!(err.is_precondition());
        assert_eq!(orch, before);
    }

    #[test]
    fn test_node_from_other_graph_rejected() {
        let mut orch = OrchestrationBuilder::new("script")
            .add_node(1, "a", (0.0, 0.0))
            .add_graph("Other")
            .add_node(2, "b", (0.0, 0.0))
            .build()
            .unwrap();
        let err = extract_default(&mut orch, &[1, 2]).unwrap_err();
        assert!(matches!(err, ScriptEngineError::InvalidSelection(_)));
    }

    #[test]
    fn test_unknown_graph_rejected() {
        let mut orch = make_script();
        let err = extract(&mut orch, &[2], "Missing", &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, ScriptEngineError::GraphNotFound(_)));
    }

    #[test]
    fn test_too_many_outbound_wires() {
        // node 2 fans one data output out to three sinks
        let mut orch = OrchestrationBuilder::new("script")
            .add_node(1, "compute", (0.0, 0.0))
            .output(Pin::data("out", ValueType::Float))
            .add_node(2, "a", (100.0, 0.0))
            .input(Pin::data("in", ValueType::Float))
            .add_node(3, "b", (100.0, 50.0))
            .input(Pin::data("in", ValueType::Float))
            .add_node(4, "c", (100.0, 100.0))
            .input(Pin::data("in", ValueType::Float))
            .connect(1, 0, 2, 0)
            .connect(1, 0, 3, 0)
            .connect(1, 0, 4, 0)
            .build()
            .unwrap();
        let before = orch.clone();

        let err = extract_default(&mut orch, &[1]).unwrap_err();
        assert!(matches!(err, ScriptEngineError::TooManyBoundaryOutputs(3)));
        assert_eq!(orch, before);
    }

    /// on_ready(1) -> step(2) -> next(3), with step.value -> sink(4)
    fn make_two_output_script() -> OrchestrationBuilder {
        OrchestrationBuilder::new("script")
            .add_node(1, "on_ready", (0.0, 0.0))
            .output(Pin::exec("then"))
            .add_node(2, "step", (200.0, 0.0))
            .input(Pin::exec("exec"))
            .output(Pin::exec("then"))
            .output(Pin::data("value", ValueType::Integer))
            .add_node(3, "next", (400.0, 0.0))
            .input(Pin::exec("exec"))
            .add_node(4, "sink", (400.0, 100.0))
            .input(Pin::data("value", ValueType::Integer))
            .connect(1, 0, 2, 0)
            .connect(2, 0, 3, 0)
            .connect(2, 1, 4, 0)
    }

    #[test]
    fn test_execution_and_data_output_both_wired() {
        let mut orch = make_two_output_script().build().unwrap();
        let report = classify_boundary(&orch, &[2]);
        assert_eq!(report.outbound.len(), MAX_BOUNDARY_OUTPUTS);

        let outcome = extract_default(&mut orch, &[2]).unwrap();
        let call = outcome.call_node;
        let entry = outcome.entry_node;
        let result = outcome.result_node.unwrap();

        let function = orch.function(&outcome.function).unwrap();
        assert!(function.arguments.is_empty());
        assert_eq!(function.return_type, Some(ValueType::Integer));

        let connections = orch.connections();
        assert!(connections.contains(&Connection::new(2, 0, result, 0)));
        assert!(connections.contains(&Connection::new(2, 1, result, 1)));
        assert!(connections.contains(&Connection::new(call, 0, 3, 0)));
        assert!(connections.contains(&Connection::new(call, 1, 4, 0)));
        assert!(connections.contains(&Connection::new(1, 0, call, 0)));
        assert!(connections.contains(&Connection::new(entry, 0, 2, 0)));
        assert_eq!(connections.len(), 6);

        assert!(validate_orchestration(&orch).is_empty());
    }

    #[test]
    fn test_execution_and_two_data_outputs_rejected() {
        let mut orch = make_two_output_script()
            .add_node(5, "other_sink", (400.0, 200.0))
            .input(Pin::data("value", ValueType::Integer))
            .connect(2, 1, 5, 0)
            .build()
            .unwrap();
        let before = orch.clone();

        let report = classify_boundary(&orch, &[2]);
        assert_eq!((report.outbound_executions, report.outbound_data), (1, 2));
        assert!(!report.can_collapse());

        let err = extract_default(&mut orch, &[2]).unwrap_err();
        assert!(matches!(err, ScriptEngineError::TooManyBoundaryOutputs(3)));
        assert_eq!(orch, before);
    }

    #[test]
    fn test_shared_source_reuses_call_output() {
        let mut orch = OrchestrationBuilder::new("script")
            .add_node(1, "compute", (0.0, 0.0))
            .output(Pin::data("out", ValueType::Float))
            .add_node(2, "a", (100.0, 0.0))
            .input(Pin::data("in", ValueType::Float))
            .add_node(3, "b", (100.0, 50.0))
            .input(Pin::data("in", ValueType::Float))
            .connect(1, 0, 2, 0)
            .connect(1, 0, 3, 0)
            .build()
            .unwrap();

        let outcome = extract_default(&mut orch, &[1]).unwrap();
        let call = outcome.call_node;
        assert!(orch.connections().contains(&Connection::new(call, 1, 2, 0)));
        assert!(orch.connections().contains(&Connection::new(call, 1, 3, 0)));
        assert_eq!(
            orch.function(&outcome.function).unwrap().return_type,
            Some(ValueType::Float)
        );
    }

    #[test]
    fn test_second_data_source_is_skipped() {
        let mut orch = OrchestrationBuilder::new("script")
            .add_node(1, "split", (0.0, 0.0))
            .output(Pin::data("x", ValueType::Float))
            .output(Pin::data("y", ValueType::Float))
            .add_node(2, "a", (100.0, 0.0))
            .input(Pin::data("in", ValueType::Float))
            .add_node(3, "b", (100.0, 50.0))
            .input(Pin::data("in", ValueType::Float))
            .connect(1, 0, 2, 0)
            .connect(1, 1, 3, 0)
            .build()
            .unwrap();

        let outcome = extract_default(&mut orch, &[1]).unwrap();
        let call = outcome.call_node;
        assert!(orch.connections().contains(&Connection::new(call, 1, 2, 0)));
        assert!(!orch.connections().iter().any(|c| c.to_node == 3));
        assert!(validate_orchestration(&orch).is_empty());
    }

    #[test]
    fn test_isolated_selection_gets_trivial_path() {
        let mut orch = OrchestrationBuilder::new("script")
            .add_node(1, "lonely", (50.0, 50.0))
            .build()
            .unwrap();

        let outcome = extract_default(&mut orch, &[1]).unwrap();
        let entry = outcome.entry_node;
        let result = outcome.result_node.unwrap();
        assert!(orch.connections().contains(&Connection::new(entry, 0, result, 0)));
        // Entry has no arguments, so it sits next to the result node
        assert_eq!(orch.node(result).unwrap().position, (300.0, 0.0));
        assert_eq!(orch.node(entry).unwrap().position, (50.0, 0.0));
        assert_eq!(orch.node(outcome.call_node).unwrap().position, (50.0, 50.0));
    }

    #[test]
    fn test_data_only_selection_links_entry_to_result() {
        // constant(1) -> add(2) -> sink(3), all data
        let mut orch = OrchestrationBuilder::new("script")
            .add_node(1, "constant", (0.0, 0.0))
            .output(Pin::data("value", ValueType::Integer))
            .add_node(2, "add", (100.0, 0.0))
            .input(Pin::data("a", ValueType::Integer))
            .output(Pin::data("sum", ValueType::Integer))
            .add_node(3, "sink", (200.0, 0.0))
            .input(Pin::data("value", ValueType::Integer))
            .connect(1, 0, 2, 0)
            .connect(2, 0, 3, 0)
            .build()
            .unwrap();

        let outcome = extract_default(&mut orch, &[2]).unwrap();
        let entry = outcome.entry_node;
        let result = outcome.result_node.unwrap();
        assert!(orch.connections().contains(&Connection::new(entry, 0, result, 0)));
        // The entry has an argument, so it keeps its inbound-based position
        assert_eq!(orch.node(entry).unwrap().position, (-150.0, 0.0));
    }

    #[test]
    fn test_without_result_node() {
        let mut orch = make_script();
        let config = EngineConfig {
            add_result_node: false,
            ..EngineConfig::default()
        };
        let outcome = extract(&mut orch, &[2], DEFAULT_EVENT_GRAPH, &config).unwrap();

        assert!(outcome.result_node.is_none());
        let call = outcome.call_node;
        assert!(orch.connections().contains(&Connection::new(call, 0, 3, 0)));
        assert!(!orch.connections().iter().any(|c| c.from_node == 2));
        assert!(orch
            .nodes()
            .all(|n| !matches!(n.kind, NodeKind::Result { .. })));
        assert!(validate_orchestration(&orch).is_empty());
    }
}
