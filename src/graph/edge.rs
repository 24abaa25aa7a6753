use crate::geometry::Polyline;
use crate::math::{left_normal, Point3, Vector3};
use crate::road::RoadType;

use super::node::NodeId;

slotmap::new_key_type! {
    /// Unique identifier for an edge in the road graph.
    pub struct EdgeId;
}

/// Which physical end of an edge's centerline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeEnd {
    Start,
    End,
}

/// One end of one edge, as seen from a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeEndRef {
    pub edge: EdgeId,
    pub end: EdgeEnd,
}

/// A cross-section of the road surface seen from one edge end.
///
/// `left` and `right` are relative to `outward`, the direction pointing
/// away from the node along the centerline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Section {
    pub center: Point3,
    pub left: Point3,
    pub right: Point3,
    pub outward: Vector3,
}

/// A road segment between two nodes.
#[derive(Debug, Clone)]
pub struct RoadEdge {
    /// Centerline in work-plane coordinates, owned by this edge.
    pub centerline: Polyline,
    pub road_type: RoadType,
    pub start: NodeId,
    pub end: NodeId,
    /// Index of the input curve this segment was shattered from.
    pub source: usize,
}

impl RoadEdge {
    /// Centerline length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.centerline.length()
    }

    /// Returns `true` when both ends touch the same node.
    #[must_use]
    pub fn is_loop(&self) -> bool {
        self.start == self.end
    }

    /// Node at the given end.
    #[must_use]
    pub fn node_at(&self, end: EdgeEnd) -> NodeId {
        match end {
            EdgeEnd::Start => self.start,
            EdgeEnd::End => self.end,
        }
    }

    /// Returns the end touching `node`, preferring `Start` for loops.
    #[must_use]
    pub fn end_at(&self, node: NodeId) -> Option<EdgeEnd> {
        if self.start == node {
            Some(EdgeEnd::Start)
        } else if self.end == node {
            Some(EdgeEnd::End)
        } else {
            None
        }
    }

    /// Outward unit tangent at `node`, pointing away from it.
    ///
    /// Returns `None` if the edge does not touch `node`.
    #[must_use]
    pub fn tangent_at(&self, node: NodeId) -> Option<Vector3> {
        self.end_at(node).map(|end| self.outward_tangent(end))
    }

    /// Outward unit tangent at the given end.
    #[must_use]
    pub fn outward_tangent(&self, end: EdgeEnd) -> Vector3 {
        match end {
            EdgeEnd::Start => self.centerline.tangent_at(0.0),
            EdgeEnd::End => -self.centerline.tangent_at(self.length()),
        }
    }

    /// Station (arc length from the start) lying `setback` in from `end`.
    #[must_use]
    pub fn station(&self, end: EdgeEnd, setback: f64) -> f64 {
        match end {
            EdgeEnd::Start => setback,
            EdgeEnd::End => self.length() - setback,
        }
    }

    /// Left and right pavement edge at `station`, relative to the
    /// direction of increasing stations.
    #[must_use]
    pub fn offsets_at(&self, station: f64) -> (Point3, Point3, Point3, Vector3) {
        let center = self.centerline.point_at(station);
        let tangent = self.centerline.tangent_at(station);
        let n = left_normal(&tangent) * self.road_type.half_width();
        (center, center + n, center - n, tangent)
    }

    /// Cross-section `setback` in from `end`, oriented away from that end.
    #[must_use]
    pub fn section(&self, end: EdgeEnd, setback: f64) -> Section {
        let (center, left, right, tangent) = self.offsets_at(self.station(end, setback));
        match end {
            EdgeEnd::Start => Section {
                center,
                left,
                right,
                outward: tangent,
            },
            EdgeEnd::End => Section {
                center,
                left: right,
                right: left,
                outward: -tangent,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    use crate::graph::RoadNode;

    fn edge() -> (RoadEdge, NodeId, NodeId) {
        let mut nodes: SlotMap<NodeId, RoadNode> = SlotMap::with_key();
        let a = nodes.insert(RoadNode::new(Point3::origin()));
        let b = nodes.insert(RoadNode::new(Point3::new(10.0, 0.0, 0.0)));
        let e = RoadEdge {
            centerline: Polyline::new(vec![Point3::origin(), Point3::new(10.0, 0.0, 0.0)])
                .unwrap(),
            road_type: RoadType::new("t", 4.0, 1.0, "L1", 1).unwrap(),
            start: a,
            end: b,
            source: 0,
        };
        (e, a, b)
    }

    #[test]
    fn tangent_points_away_from_node() {
        let (e, a, b) = edge();
        assert!((e.tangent_at(a).unwrap() - Vector3::x()).norm() < 1e-12);
        assert!((e.tangent_at(b).unwrap() + Vector3::x()).norm() < 1e-12);
    }

    #[test]
    fn section_left_is_relative_to_outward() {
        let (e, _, _) = edge();
        let s = e.section(EdgeEnd::Start, 1.0);
        assert!((s.left - Point3::new(1.0, 2.0, 0.0)).norm() < 1e-12);
        let s = e.section(EdgeEnd::End, 1.0);
        assert!((s.center - Point3::new(9.0, 0.0, 0.0)).norm() < 1e-12);
        assert!((s.left - Point3::new(9.0, -2.0, 0.0)).norm() < 1e-12);
        assert!((s.right - Point3::new(9.0, 2.0, 0.0)).norm() < 1e-12);
    }
}
