//! Editing engine for one orchestration
//!
//! `ScriptEngine` is the surface the editor talks to. It owns the
//! orchestration being edited and wires the refactoring operations to the
//! undo stack and the event sink:
//!
//! - **extract**: collapse a selection into a new function
//! - **inline**: expand a call node back into its function body
//! - **classify_boundary**: read-only query for UI affordances
//!
//! Every successful mutation pushes an undo snapshot and emits events;
//! failures leave both the orchestration and the undo history untouched.

use crate::boundary::{classify_boundary, BoundaryReport};
use crate::config::EngineConfig;
use crate::error::{Result, ScriptEngineError};
use crate::events::{EventSink, NullEventSink, ScriptEvent};
use crate::extract::{extract, ExtractOutcome};
use crate::inline::{inline, InlineOutcome};
use crate::orchestration::Orchestration;
use crate::types::NodeId;
use crate::undo::UndoStack;

/// Editing engine owning one orchestration
pub struct ScriptEngine {
    orchestration: Orchestration,
    config: EngineConfig,
    undo: UndoStack,
    events: Box<dyn EventSink>,
}

impl ScriptEngine {
    /// Create an engine with the default configuration and no event sink
    pub fn new(orchestration: Orchestration) -> Result<Self> {
        Self::with_config(orchestration, EngineConfig::default(), Box::new(NullEventSink))
    }

    /// Create an engine with explicit configuration and event sink
    pub fn with_config(
        orchestration: Orchestration,
        config: EngineConfig,
        events: Box<dyn EventSink>,
    ) -> Result<Self> {
        let mut undo = UndoStack::new(config.undo_limit);
        undo.record("Open", &orchestration)?;
        Ok(Self {
            orchestration,
            config,
            undo,
            events,
        })
    }

    /// The orchestration being edited
    pub fn orchestration(&self) -> &Orchestration {
        &self.orchestration
    }

    /// The active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Take the orchestration back, consuming the engine
    pub fn into_orchestration(self) -> Orchestration {
        self.orchestration
    }

    /// Classify how a selection connects to the rest of the script
    pub fn classify_boundary(&self, selection: &[NodeId]) -> BoundaryReport {
        classify_boundary(&self.orchestration, selection)
    }

    /// Collapse `selection` in `graph` into a new function
    pub fn extract(&mut self, selection: &[NodeId], graph: &str) -> Result<ExtractOutcome> {
        let outcome = extract(&mut self.orchestration, selection, graph, &self.config)?;
        let label = format!("Collapse to function '{}'", outcome.function);
        self.commit(&label, outcome.events());
        Ok(outcome)
    }

    /// Expand a call node in `graph` into the body of its function
    pub fn inline(&mut self, call_node: NodeId, graph: &str) -> Result<InlineOutcome> {
        let outcome = inline(&mut self.orchestration, call_node, graph)?;
        if matches!(outcome, InlineOutcome::Inlined { .. }) {
            self.commit("Inline function call", outcome.events());
        }
        Ok(outcome)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    /// Label of the refactor `undo` would revert
    pub fn undo_label(&self) -> Option<&str> {
        self.undo.undo_label()
    }

    /// Label of the refactor `redo` would re-apply
    pub fn redo_label(&self) -> Option<&str> {
        self.undo.redo_label()
    }

    /// Restore the state before the last refactor. Returns false when there
    /// is nothing to undo.
    pub fn undo(&mut self) -> Result<bool> {
        match self.undo.undo() {
            Some(snapshot) => self.restore(snapshot),
            None => Ok(false),
        }
    }

    /// Re-apply the last undone refactor. Returns false when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> Result<bool> {
        match self.undo.redo() {
            Some(snapshot) => self.restore(snapshot),
            None => Ok(false),
        }
    }

    fn restore(&mut self, snapshot: Result<Orchestration>) -> Result<bool> {
        self.orchestration = snapshot?;
        self.emit(ScriptEvent::OrchestrationReplaced);
        Ok(true)
    }

    /// The refactor already happened, so a snapshot failure only costs
    /// the undo step.
    fn commit(&mut self, label: &str, events: Vec<ScriptEvent>) {
        if let Err(e) = self.undo.record(label, &self.orchestration) {
            log::warn!("Failed to record undo snapshot for '{}': {}", label, e);
        }
        for event in events {
            self.emit(event);
        }
    }

    fn emit(&self, event: ScriptEvent) {
        if let Err(e) = self.events.send(event) {
            log::warn!("Failed to deliver script event: {}", e);
        }
    }
}

impl std::fmt::Debug for ScriptEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptEngine")
            .field("orchestration", &self.orchestration.name)
            .field("config", &self.config)
            .field("snapshots", &self.undo.len())
            .finish()
    }
}

impl TryFrom<Orchestration> for ScriptEngine {
    type Error = ScriptEngineError;

    fn try_from(orchestration: Orchestration) -> Result<Self> {
        Self::new(orchestration)
    }
}
