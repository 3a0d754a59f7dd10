//! Change notifications for the editor
//!
//! Events are sent from the engine to the UI (or any consumer) after a
//! refactor so panels can refresh. They are fire-and-forget and carry no
//! consistency guarantees of their own.

use serde::{Deserialize, Serialize};

/// Trait for sending script events
///
/// This abstracts over the transport mechanism (editor signal, channel,
/// etc.) allowing the engine to be used in different hosts.
pub trait EventSink: Send + Sync {
    /// Send an event
    ///
    /// Returns an error if the event could not be sent (e.g., channel closed)
    fn send(&self, event: ScriptEvent) -> Result<(), EventError>;
}

/// Error when sending events fails
#[derive(Debug, Clone)]
pub struct EventError {
    pub message: String,
}

impl std::fmt::Display for EventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Event error: {}", self.message)
    }
}

impl std::error::Error for EventError {}

/// Events emitted after the orchestration changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ScriptEvent {
    /// The node set of a graph changed
    #[serde(rename_all = "camelCase")]
    GraphChanged { graph: String },

    /// Functions were added, removed or had their signature changed
    FunctionsChanged,

    /// A function should become the focused edit target
    #[serde(rename_all = "camelCase")]
    FocusFunction { name: String },

    /// The whole orchestration was replaced (undo/redo)
    OrchestrationReplaced,
}

impl ScriptEvent {
    /// Create a graph changed event
    pub fn graph_changed(graph: &str) -> Self {
        Self::GraphChanged {
            graph: graph.to_string(),
        }
    }
}

/// A no-op event sink that discards all events
///
/// Useful for testing or when events aren't needed.
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn send(&self, _event: ScriptEvent) -> Result<(), EventError> {
        Ok(())
    }
}

/// A vector-based event sink that collects events
///
/// Useful for testing to verify events were emitted correctly.
pub struct VecEventSink {
    events: std::sync::Mutex<Vec<ScriptEvent>>,
}

impl VecEventSink {
    pub fn new() -> Self {
        Self {
            events: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Get all collected events
    pub fn events(&self) -> Vec<ScriptEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Clear all collected events
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl Default for VecEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for VecEventSink {
    fn send(&self, event: ScriptEvent) -> Result<(), EventError> {
        self.events
            .lock()
            .map_err(|_| EventError {
                message: "Event buffer poisoned".to_string(),
            })?
            .push(event);
        Ok(())
    }
}

impl<T: EventSink + ?Sized> EventSink for std::sync::Arc<T> {
    fn send(&self, event: ScriptEvent) -> Result<(), EventError> {
        (**self).send(event)
    }
}
