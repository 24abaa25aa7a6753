use tracing::debug;

use crate::error::Result;
use crate::graph::{NodeId, NodeIndex, RoadEdge, RoadGraph, RoadNode};
use crate::math::Point3;
use crate::road::RoadType;

use super::shatter::ShatteredSegment;

/// Builds the road graph from shattered segments.
///
/// Segment endpoints closer than the node tolerance collapse onto one
/// node. The first endpoint seen fixes the node position, so the same
/// segments in the same order always yield the same nodes.
#[derive(Debug)]
pub struct BuildGraph<'a> {
    segments: &'a [ShatteredSegment],
    tolerance: f64,
}

impl<'a> BuildGraph<'a> {
    /// Creates a new graph building operation.
    #[must_use]
    pub fn new(segments: &'a [ShatteredSegment], tolerance: f64) -> Self {
        Self {
            segments,
            tolerance,
        }
    }

    /// Executes the graph construction.
    ///
    /// # Errors
    ///
    /// Returns an `InputError` if a segment carries invalid road
    /// attributes.
    pub fn execute(&self) -> Result<RoadGraph> {
        let mut graph = RoadGraph::new();
        let mut index = NodeIndex::new();

        for segment in self.segments {
            let road_type =
                RoadType::for_level(segment.level, segment.width, segment.fillet_radius)?;
            let start = self.ensure_node(&mut graph, &mut index, segment.centerline.start());
            let end = self.ensure_node(&mut graph, &mut index, segment.centerline.end());

            graph.add_edge(RoadEdge {
                centerline: segment.centerline.clone(),
                road_type,
                start,
                end,
                source: segment.source,
            })?;
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built road graph"
        );
        Ok(graph)
    }

    fn ensure_node(&self, graph: &mut RoadGraph, index: &mut NodeIndex, p: Point3) -> NodeId {
        if let Some(id) = index.find(&p, self.tolerance) {
            return id;
        }
        let id = graph.add_node(RoadNode::new(p));
        index.insert(&p, id);
        id
    }
}
