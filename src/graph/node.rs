use crate::math::Point3;

use super::edge::EdgeId;

slotmap::new_key_type! {
    /// Unique identifier for a node in the road graph.
    pub struct NodeId;
}

/// A road intersection or endpoint, identified purely by position.
#[derive(Debug, Clone)]
pub struct RoadNode {
    /// Position in work-plane coordinates.
    pub position: Point3,
    /// Incident edges. A closed-loop edge appears twice.
    pub connected_edges: Vec<EdgeId>,
}

impl RoadNode {
    /// Creates a node with no incident edges.
    #[must_use]
    pub fn new(position: Point3) -> Self {
        Self {
            position,
            connected_edges: Vec::new(),
        }
    }

    /// Number of incident edge ends.
    #[must_use]
    pub fn valence(&self) -> usize {
        self.connected_edges.len()
    }
}
