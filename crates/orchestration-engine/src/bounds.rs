//! Bounding rectangles of node sets, used to place synthesized nodes.

use serde::{Deserialize, Serialize};

use crate::orchestration::Node;
use crate::types::Position;

/// Axis-aligned rectangle over node positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    pub min: Position,
    pub max: Position,
}

impl Rect {
    /// Zero-size rectangle anchored at a point.
    pub fn at(point: Position) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Grow the rectangle to include a point.
    pub fn expand_to(&mut self, point: Position) {
        self.min.0 = self.min.0.min(point.0);
        self.min.1 = self.min.1.min(point.1);
        self.max.0 = self.max.0.max(point.0);
        self.max.1 = self.max.1.max(point.1);
    }

    /// Width and height.
    pub fn size(&self) -> (f64, f64) {
        (self.max.0 - self.min.0, self.max.1 - self.min.1)
    }

    /// Midpoint of the rectangle.
    pub fn center(&self) -> Position {
        (
            (self.min.0 + self.max.0) / 2.0,
            (self.min.1 + self.max.1) / 2.0,
        )
    }
}

/// Smallest rectangle containing every node position.
///
/// Returns `None` for an empty set.
pub fn node_set_rect<'a, I>(nodes: I) -> Option<Rect>
where
    I: IntoIterator<Item = &'a Node>,
{
    let mut nodes = nodes.into_iter();
    let mut area = Rect::at(nodes.next()?.position);
    for node in nodes {
        area.expand_to(node.position);
    }
    Some(area)
}
