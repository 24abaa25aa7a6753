//! Junction synthesis at road graph nodes.
//!
//! Edge-ends meeting at a node are sorted by the angle of their outward
//! tangent. The node then gets either a standard junction (dead-end cap,
//! two-way joint or N-way fan with filleted valleys) or a priority
//! junction where a through road of the highest class keeps a continuous
//! surface and lower classes attach with bell-mouth aprons.

mod priority;
mod standard;

use std::f64::consts::PI;

use slotmap::SecondaryMap;
use tracing::trace;

use crate::error::{InputError, Result};
use crate::graph::{EdgeEnd, EdgeEndRef, EdgeId, NodeId, RoadEdge, RoadGraph, Section};
use crate::math::intersect_2d::{line_line_intersect_2d, point_at};
use crate::math::{left_normal, planar_angle, Point3, Vector3, TOLERANCE};
use crate::mesh::LevelMesh;

/// Parameters controlling junction geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JunctionParams {
    /// Largest share of an edge's length one setback may consume.
    pub setback_fraction: f64,
    /// Hard ceiling for any setback.
    pub max_setback: f64,
    /// Valley points are kept within this multiple of the larger of the
    /// neighbouring half widths and setbacks.
    pub valley_clamp_factor: f64,
    /// Interior sample points per fillet arc (3 to 5, rounded up to odd).
    pub fillet_points: usize,
}

impl Default for JunctionParams {
    fn default() -> Self {
        Self {
            setback_fraction: 0.45,
            max_setback: 50.0,
            valley_clamp_factor: 3.0,
            fillet_points: 3,
        }
    }
}

impl JunctionParams {
    /// # Errors
    ///
    /// Returns `InputError::InvalidParameter` for a setback fraction outside
    /// `(0, 0.5)` or a non-positive ceiling or clamp factor.
    pub fn validate(&self) -> Result<()> {
        if !(self.setback_fraction > 0.0 && self.setback_fraction < 0.5) {
            return Err(InputError::InvalidParameter {
                parameter: "junction.setback_fraction",
                reason: format!("{} is outside (0, 0.5)", self.setback_fraction),
            }
            .into());
        }
        if !(self.max_setback.is_finite() && self.max_setback > 0.0) {
            return Err(InputError::InvalidParameter {
                parameter: "junction.max_setback",
                reason: format!("{} is not a positive length", self.max_setback),
            }
            .into());
        }
        if !(self.valley_clamp_factor.is_finite() && self.valley_clamp_factor > 0.0) {
            return Err(InputError::InvalidParameter {
                parameter: "junction.valley_clamp_factor",
                reason: format!("{} is not positive", self.valley_clamp_factor),
            }
            .into());
        }
        Ok(())
    }

    /// Number of Bézier segments per fillet arc. Always even, so arcs
    /// fold into whole quads.
    #[must_use]
    pub fn fillet_segments(&self) -> usize {
        (self.fillet_points.clamp(3, 5) | 1) + 1
    }
}

/// Setback distances per edge end, written by junction synthesis and
/// read by street strip construction.
#[derive(Debug, Clone, Default)]
pub struct Setbacks {
    start: SecondaryMap<EdgeId, f64>,
    end: SecondaryMap<EdgeId, f64>,
}

impl Setbacks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Setback at one end of an edge; ends never set read as zero.
    #[must_use]
    pub fn get(&self, edge: EdgeId, end: EdgeEnd) -> f64 {
        let map = match end {
            EdgeEnd::Start => &self.start,
            EdgeEnd::End => &self.end,
        };
        map.get(edge).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, edge: EdgeId, end: EdgeEnd, value: f64) {
        let map = match end {
            EdgeEnd::Start => &mut self.start,
            EdgeEnd::End => &mut self.end,
        };
        map.insert(edge, value);
    }

    /// Remaining station range `[start, length - end]` of an edge.
    #[must_use]
    pub fn trimmed_range(&self, id: EdgeId, edge: &RoadEdge) -> (f64, f64) {
        (
            self.get(id, EdgeEnd::Start),
            edge.length() - self.get(id, EdgeEnd::End),
        )
    }
}

/// One edge-end as seen from the junction node.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Arm<'g> {
    pub(crate) end_ref: EdgeEndRef,
    pub(crate) edge: &'g RoadEdge,
    /// Outward unit tangent.
    pub(crate) tangent: Vector3,
    pub(crate) angle: f64,
}

impl Arm<'_> {
    fn level(&self) -> i32 {
        self.edge.road_type.level()
    }

    fn half_width(&self) -> f64 {
        self.edge.road_type.half_width()
    }

    fn radius(&self) -> f64 {
        self.edge.road_type.fillet_radius()
    }

    fn section(&self, setback: f64) -> Section {
        self.edge.section(self.end_ref.end, setback)
    }

    /// Largest setback this arm accepts.
    fn ceiling(&self, params: &JunctionParams) -> f64 {
        (self.edge.length() * params.setback_fraction).min(params.max_setback)
    }

    fn clamp_setback(&self, setback: f64, params: &JunctionParams) -> f64 {
        setback.clamp(0.0, self.ceiling(params))
    }

    /// Distance kept beyond the point where the pavement boundaries
    /// separate.
    fn fillet_clearance(&self) -> f64 {
        self.radius().max(0.25 * self.half_width())
    }

    /// The fillet radius setback before any geometric clearance.
    fn base_setback(&self, params: &JunctionParams) -> f64 {
        self.clamp_setback(self.radius(), params)
    }

    /// Origin of the pavement boundary line on the left of the arm.
    fn left_line(&self, center: &Point3) -> Point3 {
        center + left_normal(&self.tangent) * self.half_width()
    }

    /// Origin of the pavement boundary line on the right of the arm.
    fn right_line(&self, center: &Point3) -> Point3 {
        center - left_normal(&self.tangent) * self.half_width()
    }
}

/// Junction synthesis at one node.
#[derive(Debug)]
pub struct BuildJunction<'a> {
    graph: &'a RoadGraph,
    node: NodeId,
    params: &'a JunctionParams,
}

impl<'a> BuildJunction<'a> {
    /// Creates a new junction operation.
    #[must_use]
    pub fn new(graph: &'a RoadGraph, node: NodeId, params: &'a JunctionParams) -> Self {
        Self {
            graph,
            node,
            params,
        }
    }

    /// Builds the junction meshes and records the setback of every
    /// incident edge-end in `setbacks`.
    ///
    /// # Errors
    ///
    /// Returns a `TopologyError` if the node or one of its edges is not in
    /// the graph.
    pub fn execute(&self, setbacks: &mut Setbacks) -> Result<Vec<LevelMesh>> {
        let center = self.graph.node(self.node)?.position;
        let mut arms = Vec::new();
        for end_ref in self.graph.edge_ends_at(self.node)? {
            let edge = self.graph.edge(end_ref.edge)?;
            let tangent = edge.outward_tangent(end_ref.end);
            arms.push(Arm {
                end_ref,
                edge,
                tangent,
                angle: planar_angle(&tangent),
            });
        }
        arms.sort_by(|a, b| a.angle.total_cmp(&b.angle));

        let meshes = match arms.len() {
            0 => Vec::new(),
            1 => {
                trace!(node = ?self.node, "dead end");
                standard::dead_end(&arms[0], setbacks)
            }
            _ if is_priority(&arms) => {
                trace!(node = ?self.node, arms = arms.len(), "priority junction");
                priority::build(&center, &arms, self.params, setbacks)
            }
            2 => {
                trace!(node = ?self.node, "two-way joint");
                standard::joint(&center, &arms, self.params, setbacks)
            }
            n => {
                trace!(node = ?self.node, arms = n, "standard junction");
                standard::fan(&center, &arms, self.params, setbacks)
            }
        };
        Ok(meshes)
    }
}

/// Mixed levels where the highest-priority level has exactly two ends.
fn is_priority(arms: &[Arm<'_>]) -> bool {
    let min = arms.iter().map(Arm::level).min().unwrap_or(0);
    let at_min = arms.iter().filter(|a| a.level() == min).count();
    at_min == 2 && arms.len() > 2
}

/// Angular gap from arm `k` to the next arm counter-clockwise.
fn gap_after(arms: &[Arm<'_>], k: usize) -> f64 {
    let next = (k + 1) % arms.len();
    let gap = arms[next].angle - arms[k].angle;
    if next == 0 {
        gap + 2.0 * PI
    } else {
        gap
    }
}

/// Corner point where the left boundary of `a` meets the right boundary of
/// its counter-clockwise neighbour `b`.
///
/// Returns `None` for reflex or straight gaps and for boundaries meeting
/// behind the node. The result lies within `clamp` of `center`.
fn valley_point(center: &Point3, a: &Arm<'_>, b: &Arm<'_>, gap: f64, clamp: f64) -> Option<Point3> {
    if gap >= PI - 1e-9 {
        return None;
    }
    let pa = a.left_line(center);
    let pb = b.right_line(center);
    let (t, u) = line_line_intersect_2d(&pa, &a.tangent, &pb, &b.tangent)?;
    if t <= TOLERANCE || u <= TOLERANCE {
        return None;
    }
    let v = point_at(&pa, &a.tangent, t);
    let offset = v - center;
    let dist = offset.norm();
    if dist > clamp {
        Some(center + offset * (clamp / dist))
    } else {
        Some(v)
    }
}
