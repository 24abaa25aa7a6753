use spade::{DelaunayTriangulation, HasPosition, Point2 as SpadePoint2, Triangulation};
use tracing::warn;

use crate::math::distance_2d::distance_2d;
use crate::math::Point3;

use super::NodeId;

/// A node position stored in the spatial index.
struct NodeSite {
    position: SpadePoint2<f64>,
    node: NodeId,
}

impl HasPosition for NodeSite {
    type Scalar = f64;

    fn position(&self) -> SpadePoint2<f64> {
        self.position
    }
}

/// Nearest-node lookup used while merging segment endpoints.
///
/// Positions are kept in a Delaunay triangulation, whose nearest-neighbour
/// walk keeps lookups sub-linear. Coordinates the triangulation rejects
/// (outside its representable range) fall back to a linear list.
pub(crate) struct NodeIndex {
    triangulation: DelaunayTriangulation<NodeSite>,
    overflow: Vec<(Point3, NodeId)>,
}

impl NodeIndex {
    pub(crate) fn new() -> Self {
        Self {
            triangulation: DelaunayTriangulation::new(),
            overflow: Vec::new(),
        }
    }

    /// Returns the node closest to `p` if it lies within `tolerance`.
    pub(crate) fn find(&self, p: &Point3, tolerance: f64) -> Option<NodeId> {
        let mut best: Option<(f64, NodeId)> = None;

        if let Some(handle) = self.triangulation.nearest_neighbor(SpadePoint2::new(p.x, p.y)) {
            let site = handle.data();
            let d = planar_distance(&site.position, p);
            if d <= tolerance {
                best = Some((d, site.node));
            }
        }

        for (q, id) in &self.overflow {
            let d = distance_2d(q, p);
            if d <= tolerance && best.map_or(true, |(bd, _)| d < bd) {
                best = Some((d, *id));
            }
        }

        best.map(|(_, id)| id)
    }

    /// Registers a new node position.
    pub(crate) fn insert(&mut self, p: &Point3, node: NodeId) {
        let site = NodeSite {
            position: SpadePoint2::new(p.x, p.y),
            node,
        };
        if let Err(e) = self.triangulation.insert(site) {
            warn!(x = p.x, y = p.y, error = %e, "node outside spatial index range");
            self.overflow.push((*p, node));
        }
    }
}

fn planar_distance(a: &SpadePoint2<f64>, b: &Point3) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}
