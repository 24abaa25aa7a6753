pub mod edge;
pub mod node;
mod node_index;

pub use edge::{EdgeEnd, EdgeEndRef, EdgeId, RoadEdge, Section};
pub use node::{NodeId, RoadNode};
pub(crate) use node_index::NodeIndex;

use crate::error::TopologyError;
use slotmap::SlotMap;

/// Central arena that owns all nodes and edges of one generation run.
///
/// Nodes and edges reference each other via typed IDs (generational
/// indices), so the node/edge back-references form no ownership cycle.
/// Only the graph builder mutates a graph; consumers get `&RoadGraph`.
#[derive(Debug, Default)]
pub struct RoadGraph {
    nodes: SlotMap<NodeId, RoadNode>,
    edges: SlotMap<EdgeId, RoadEdge>,
}

impl RoadGraph {
    /// Creates a new, empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node and returns its ID.
    pub(crate) fn add_node(&mut self, node: RoadNode) -> NodeId {
        self.nodes.insert(node)
    }

    /// Inserts an edge and registers it with both end nodes.
    ///
    /// # Errors
    ///
    /// Returns an error if either end node is not in the graph.
    pub(crate) fn add_edge(&mut self, edge: RoadEdge) -> Result<EdgeId, TopologyError> {
        let (start, end) = (edge.start, edge.end);
        if !self.nodes.contains_key(start) || !self.nodes.contains_key(end) {
            return Err(TopologyError::EntityNotFound("node".into()));
        }
        let id = self.edges.insert(edge);
        for node in [start, end] {
            if let Some(n) = self.nodes.get_mut(node) {
                n.connected_edges.push(id);
            }
        }
        Ok(id)
    }

    /// Returns a reference to the node, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is not in the graph.
    pub fn node(&self, id: NodeId) -> Result<&RoadNode, TopologyError> {
        self.nodes
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("node".into()))
    }

    /// Returns a reference to the edge, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is not in the graph.
    pub fn edge(&self, id: EdgeId) -> Result<&RoadEdge, TopologyError> {
        self.edges
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("edge".into()))
    }

    /// Iterates nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &RoadNode)> {
        self.nodes.iter()
    }

    /// Iterates edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &RoadEdge)> {
        self.edges.iter()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Edge ends incident to `node`. A closed loop contributes both ends.
    ///
    /// # Errors
    ///
    /// Returns an error if the node or one of its edges is not in the graph.
    pub fn edge_ends_at(&self, node: NodeId) -> Result<Vec<EdgeEndRef>, TopologyError> {
        let mut seen: Vec<EdgeId> = Vec::new();
        let mut ends = Vec::new();
        for &edge_id in &self.node(node)?.connected_edges {
            if seen.contains(&edge_id) {
                continue;
            }
            seen.push(edge_id);
            let edge = self.edge(edge_id)?;
            if edge.start == node {
                ends.push(EdgeEndRef {
                    edge: edge_id,
                    end: EdgeEnd::Start,
                });
            }
            if edge.end == node {
                ends.push(EdgeEndRef {
                    edge: edge_id,
                    end: EdgeEnd::End,
                });
            }
        }
        Ok(ends)
    }
}
