//! Undo/redo history of whole-orchestration snapshots
//!
//! Extraction and inlining rewrite several graphs at once, so the history
//! stores complete orchestrations (JSON, zstd-compressed) instead of
//! inverse operations. Each entry carries the label of the action that
//! produced it, for "Undo <action>" menu items.

use std::collections::VecDeque;

use crate::error::{Result, ScriptEngineError};
use crate::orchestration::Orchestration;

/// Compression level for snapshots
const ZSTD_LEVEL: i32 = 3;

struct Snapshot {
    label: String,
    data: Vec<u8>,
}

impl Snapshot {
    fn capture(label: &str, orchestration: &Orchestration) -> Result<Self> {
        let json = serde_json::to_vec(orchestration)?;
        let data = zstd::encode_all(json.as_slice(), ZSTD_LEVEL)
            .map_err(|e| ScriptEngineError::Compression(e.to_string()))?;
        Ok(Self {
            label: label.to_string(),
            data,
        })
    }

    fn restore(&self) -> Result<Orchestration> {
        let json = zstd::decode_all(self.data.as_slice())
            .map_err(|e| ScriptEngineError::Compression(e.to_string()))?;
        Ok(serde_json::from_slice(&json)?)
    }
}

/// Bounded history of orchestration states
///
/// `position` indexes the entry matching the live orchestration. Entries
/// after it are redo history and are dropped by the next `record`.
pub struct UndoStack {
    history: VecDeque<Snapshot>,
    position: usize,
    capacity: usize,
}

impl UndoStack {
    /// Create a history holding at most `capacity` states (minimum 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            history: VecDeque::new(),
            position: 0,
            capacity: capacity.max(1),
        }
    }

    /// Record the state reached by the action `label`
    pub fn record(&mut self, label: &str, orchestration: &Orchestration) -> Result<()> {
        let snapshot = Snapshot::capture(label, orchestration)?;

        self.history.truncate(self.position + 1);
        self.history.push_back(snapshot);
        self.position = self.history.len() - 1;

        while self.history.len() > self.capacity {
            self.history.pop_front();
            self.position = self.position.saturating_sub(1);
        }
        Ok(())
    }

    /// Step back one state. Returns None at the oldest state.
    ///
    /// The position only moves when the snapshot decodes.
    pub fn undo(&mut self) -> Option<Result<Orchestration>> {
        if !self.can_undo() {
            return None;
        }
        Some(self.step_to(self.position - 1))
    }

    /// Step forward one state. Returns None at the newest state.
    pub fn redo(&mut self) -> Option<Result<Orchestration>> {
        if !self.can_redo() {
            return None;
        }
        Some(self.step_to(self.position + 1))
    }

    fn step_to(&mut self, target: usize) -> Result<Orchestration> {
        let orchestration = self.history[target].restore()?;
        self.position = target;
        Ok(orchestration)
    }

    /// Decode the state at the current position
    pub fn current(&self) -> Option<Result<Orchestration>> {
        self.history.get(self.position).map(Snapshot::restore)
    }

    pub fn can_undo(&self) -> bool {
        self.position > 0
    }

    pub fn can_redo(&self) -> bool {
        self.position + 1 < self.history.len()
    }

    /// Label of the action `undo` would revert
    pub fn undo_label(&self) -> Option<&str> {
        if self.can_undo() {
            self.history.get(self.position).map(|s| s.label.as_str())
        } else {
            None
        }
    }

    /// Label of the action `redo` would re-apply
    pub fn redo_label(&self) -> Option<&str> {
        self.history
            .get(self.position + 1)
            .map(|s| s.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Total compressed bytes held
    pub fn compressed_size(&self) -> usize {
        self.history.iter().map(|s| s.data.len()).sum()
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestration::{Node, DEFAULT_EVENT_GRAPH};

    fn make_script(name: &str) -> Orchestration {
        let mut orchestration = Orchestration::with_event_graph(name);
        orchestration
            .add_node(DEFAULT_EVENT_GRAPH, Node::new(0, "print", (0.0, 0.0)))
            .unwrap();
        orchestration
    }

    fn record_all(stack: &mut UndoStack, names: &[&str]) {
        for name in names {
            stack.record(name, &make_script(name)).unwrap();
        }
    }

    #[test]
    fn test_undo_walks_back() {
        let mut stack = UndoStack::new(10);
        record_all(&mut stack, &["first", "second", "third"]);

        assert_eq!(stack.current().unwrap().unwrap().name, "third");
        assert_eq!(stack.undo().unwrap().unwrap().name, "second");
        assert_eq!(stack.undo().unwrap().unwrap().name, "first");
        assert!(stack.undo().is_none());
    }

    #[test]
    fn test_redo_walks_forward() {
        let mut stack = UndoStack::new(10);
        record_all(&mut stack, &["first", "second"]);

        stack.undo();
        assert_eq!(stack.redo().unwrap().unwrap().name, "second");
        assert!(stack.redo().is_none());
    }

    #[test]
    fn test_record_drops_redo_history() {
        let mut stack = UndoStack::new(10);
        record_all(&mut stack, &["first", "second"]);
        stack.undo();

        stack.record("third", &make_script("third")).unwrap();
        assert!(!stack.can_redo());
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.current().unwrap().unwrap().name, "third");
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut stack = UndoStack::new(3);
        record_all(&mut stack, &["a", "b", "c", "d", "e"]);

        assert_eq!(stack.len(), 3);
        assert_eq!(stack.current().unwrap().unwrap().name, "e");

        stack.undo();
        stack.undo();
        assert!(!stack.can_undo());
        assert_eq!(stack.current().unwrap().unwrap().name, "c");
    }

    #[test]
    fn test_labels() {
        let mut stack = UndoStack::new(10);
        stack.record("Open", &make_script("a")).unwrap();
        assert_eq!(stack.undo_label(), None);

        stack.record("Extract NewFunction", &make_script("b")).unwrap();
        assert_eq!(stack.undo_label(), Some("Extract NewFunction"));
        assert_eq!(stack.redo_label(), None);

        stack.undo();
        assert_eq!(stack.redo_label(), Some("Extract NewFunction"));
    }

    #[test]
    fn test_corrupt_snapshot_keeps_position() {
        let mut stack = UndoStack::new(10);
        record_all(&mut stack, &["first", "second"]);
        stack.history[0].data = vec![0xde, 0xad, 0xbe, 0xef];

        assert!(stack.undo().unwrap().is_err());
        assert!(stack.can_undo());
        assert_eq!(stack.current().unwrap().unwrap().name, "second");

        stack.history[0] = Snapshot::capture("first", &make_script("first")).unwrap();
        assert_eq!(stack.undo().unwrap().unwrap().name, "first");
        assert!(stack.redo().unwrap().is_ok());
    }

    #[test]
    fn test_positions_restore_exactly() {
        let mut stack = UndoStack::new(10);
        let mut orchestration = Orchestration::with_event_graph("floats");
        for i in 0..200u32 {
            let x = f64::from(i) * 0.1 + f64::from(i).sqrt() / 3.0;
            let y = f64::from(i) / 7.0 - 1e-9 * f64::from(i);
            orchestration
                .add_node(DEFAULT_EVENT_GRAPH, Node::new(0, "print", (x, y)))
                .unwrap();
        }
        stack.record("Open", &orchestration).unwrap();

        let restored = stack.current().unwrap().unwrap();
        for (before, after) in orchestration.nodes().zip(restored.nodes()) {
            assert_eq!(before.position.0.to_bits(), after.position.0.to_bits());
            assert_eq!(before.position.1.to_bits(), after.position.1.to_bits());
        }
        assert_eq!(restored, orchestration);
    }

    #[test]
    fn test_snapshot_round_trips_model() {
        let mut stack = UndoStack::default();
        let original = make_script("round");
        stack.record("Open", &original).unwrap();

        let restored = stack.current().unwrap().unwrap();
        assert_eq!(restored, original);
        assert_eq!(restored.peek_node_id(), original.peek_node_id());
        assert!(stack.compressed_size() > 0);
    }
}
