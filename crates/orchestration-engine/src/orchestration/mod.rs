//! Orchestration graph model.
//!
//! An orchestration is one script made of peer graphs:
//! - **Event graphs**: top-level graphs edited by the user
//! - **Function graphs**: bodies of callable functions, each with an Entry
//!   node, an optional Result node and a signature
//!
//! Nodes are stored in an id-keyed arena shared by all graphs; each node
//! belongs to exactly one graph. Connections are id/port tuples kept in a
//! single canonical list.
//!
//! # Example
//!
//! ```ignore
//! use orchestration_engine::orchestration::{Orchestration, Node, DEFAULT_EVENT_GRAPH};
//!
//! let mut script = Orchestration::with_event_graph("player");
//! let ready = script.add_node(DEFAULT_EVENT_GRAPH, Node::new(0, "on_ready", (0.0, 0.0))
//!     .with_output(Pin::exec("then")))?;
//! let nodes = script.create_function("Jump", (0.0, 0.0), Some((300.0, 0.0)))?;
//! let call = script.add_call_node(DEFAULT_EVENT_GRAPH, "Jump", (200.0, 0.0))?;
//! script.link(Connection::new(ready, 0, call, 0))?;
//! ```

pub mod store;
pub mod types;

// Re-export commonly used types
pub use store::{FunctionNodes, Orchestration, PinIndex};
pub use types::{
    Argument, Function, Graph, GraphKind, Node, NodeKind, DEFAULT_EVENT_GRAPH,
};
