//! Orchestration Engine - function extraction and inlining for visual scripts
//!
//! This crate models a visual-scripting orchestration (graphs of nodes joined
//! by execution and data wires) and provides the two structural refactors
//! an editor needs:
//!
//! - Extract a selection of nodes into a new function, replacing it with a
//!   call node wired to the surrounding graph
//! - Inline a call node, copying the function body back into the caller
//! - Classify a selection's boundary to decide whether it can be collapsed
//! - Compressed snapshot-based undo/redo
//!
//! # Architecture
//!
//! - `Orchestration`: arena of nodes, graphs, functions and connections
//! - `ScriptEngine`: editing facade tying refactors to undo and events
//! - `UndoStack`: Compressed immutable snapshots for undo/redo
//! - `EventSink`: Generic event streaming (not tied to any editor)
//!
//! # Example
//!
//! ```ignore
//! use orchestration_engine::{OrchestrationBuilder, ScriptEngine, Pin};
//!
//! let script = OrchestrationBuilder::new("player")
//!     .add_node(1, "on_ready", (0.0, 0.0))
//!     .output(Pin::exec("then"))
//!     .add_node(2, "print", (200.0, 0.0))
//!     .input(Pin::exec("exec"))
//!     .connect(1, 0, 2, 0)
//!     .build()?;
//!
//! let mut engine = ScriptEngine::new(script)?;
//! let outcome = engine.extract(&[2], "EventGraph")?;
//! ```

pub mod boundary;
pub mod bounds;
pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod extract;
pub mod inline;
pub mod orchestration;
pub mod types;
pub mod undo;
pub mod validation;

// Re-export key types
pub use boundary::{classify_boundary, BoundaryReport};
pub use builder::OrchestrationBuilder;
pub use config::EngineConfig;
pub use engine::ScriptEngine;
pub use error::{Result, ScriptEngineError};
pub use events::{EventSink, ScriptEvent};
pub use extract::{extract, ExtractOutcome};
pub use inline::{inline, InlineOutcome};
pub use orchestration::{
    Argument, Function, Graph, GraphKind, Node, NodeKind, Orchestration, DEFAULT_EVENT_GRAPH,
};
pub use types::{Connection, NodeId, Pin, PinDirection, PinKind, Position, ValueType};
pub use undo::UndoStack;
pub use validation::{validate_orchestration, ValidationError};
