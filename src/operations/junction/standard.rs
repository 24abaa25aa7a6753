use std::f64::consts::PI;

use tracing::debug;

use crate::math::bezier::quadratic_samples;
use crate::math::intersect_2d::segment_segment_intersect_2d;
use crate::math::Point3;
use crate::mesh::{LevelMesh, QuadMesh};

use super::{gap_after, valley_point, Arm, JunctionParams, Setbacks};

/// Minimum distance between a valley and a corner for a fillet arc.
const MIN_FILLET_CHORD: f64 = 1e-9;

/// Caps a dead end by extending the road half a width past the node.
pub(super) fn dead_end(arm: &Arm<'_>, setbacks: &mut Setbacks) -> Vec<LevelMesh> {
    setbacks.set(arm.end_ref.edge, arm.end_ref.end, 0.0);

    let s = arm.section(0.0);
    let back = -s.outward * arm.half_width();
    let mut mesh = QuadMesh::new();
    mesh.add_quad([s.right, s.left, s.left + back, s.right + back]);
    vec![LevelMesh {
        level: arm.level(),
        mesh,
    }]
}

/// Joins two edge-ends with a single quad between their setback sections.
///
/// At sharp bends the clamped valley stops short of where the two
/// pavements separate, so both setbacks are pushed past the real one.
pub(super) fn joint(
    center: &Point3,
    arms: &[Arm<'_>],
    params: &JunctionParams,
    setbacks: &mut Setbacks,
) -> Vec<LevelMesh> {
    let (mut distances, _) = layout(center, arms, params);
    for k in 0..2 {
        let next = &arms[(k + 1) % 2];
        let Some(v) = valley_point(center, &arms[k], next, gap_after(arms, k), f64::INFINITY)
        else {
            continue;
        };
        for (d, arm) in distances.iter_mut().zip(arms) {
            let separated = (v - center).dot(&arm.tangent) + arm.fillet_clearance();
            *d = arm.clamp_setback(d.max(separated), params);
        }
    }
    joint_at(center, arms, &distances, setbacks)
}

/// Joint quad for two arms at already decided setbacks.
///
/// The quad connects the near corners of the two sections. On a bend the
/// outer corner is therefore chamfered along the chord between the outer
/// section corners, and the node itself is left unpaved. If the sections
/// still cross (a sharp bend on edges too short to separate) the face
/// becomes the wedge between the node and the crossing point.
pub(super) fn joint_at(
    center: &Point3,
    arms: &[Arm<'_>],
    distances: &[f64],
    setbacks: &mut Setbacks,
) -> Vec<LevelMesh> {
    record(arms, distances, setbacks);

    let a = arms[0].section(distances[0]);
    let b = arms[1].section(distances[1]);
    let quad = match segment_segment_intersect_2d(&a.right, &a.left, &b.right, &b.left) {
        None => [a.right, a.left, b.right, b.left],
        Some((x, _, _)) => {
            debug!(edge = ?arms[0].end_ref.edge, "joint sections cross, paving the wedge");
            if gap_after(arms, 0) < PI {
                [a.right, x, b.left, *center]
            } else {
                [x, a.left, *center, b.right]
            }
        }
    };
    let mut mesh = QuadMesh::new();
    mesh.add_quad(quad);
    vec![LevelMesh {
        level: min_level(arms),
        mesh,
    }]
}

/// Builds an N-way junction as a fan around the node.
///
/// Every arm contributes two quads from the node to its setback section,
/// closed off by the valley points on either side. Valleys that come from
/// a real boundary intersection get a Bézier fillet folded into quads
/// fanning out from the valley.
pub(super) fn fan(
    center: &Point3,
    arms: &[Arm<'_>],
    params: &JunctionParams,
    setbacks: &mut Setbacks,
) -> Vec<LevelMesh> {
    let n = arms.len();
    let (distances, valleys) = layout(center, arms, params);
    record(arms, &distances, setbacks);

    let sections: Vec<_> = arms
        .iter()
        .zip(&distances)
        .map(|(arm, &d)| arm.section(d))
        .collect();
    let corners: Vec<Point3> = (0..n)
        .map(|k| {
            valleys[k].unwrap_or_else(|| {
                let (l, r) = (sections[k].left, sections[(k + 1) % n].right);
                Point3::from((l.coords + r.coords) * 0.5)
            })
        })
        .collect();

    let mut mesh = QuadMesh::new();
    for k in 0..n {
        let s = &sections[k];
        let prev = corners[(k + n - 1) % n];
        mesh.add_quad([*center, s.center, s.left, corners[k]]);
        mesh.add_quad([*center, prev, s.right, s.center]);
    }

    let segments = params.fillet_segments();
    for k in 0..n {
        let Some(v) = valleys[k] else {
            continue;
        };
        let (l, r) = (sections[k].left, sections[(k + 1) % n].right);
        if (l - v).norm() < MIN_FILLET_CHORD || (r - v).norm() < MIN_FILLET_CHORD {
            continue;
        }
        let arc = quadratic_samples(&l, &v, &r, segments);
        for i in 0..segments / 2 {
            mesh.add_quad([v, arc[2 * i], arc[2 * i + 1], arc[2 * i + 2]]);
        }
    }

    vec![LevelMesh {
        level: min_level(arms),
        mesh,
    }]
}

/// Setback per arm and valid valley per gap.
///
/// The setback keeps the arm's fillet radius (at least a quarter of its
/// half width) clear beyond the furthest adjacent valley, so corner
/// points never fall behind the valley they connect to.
pub(super) fn layout(
    center: &Point3,
    arms: &[Arm<'_>],
    params: &JunctionParams,
) -> (Vec<f64>, Vec<Option<Point3>>) {
    let n = arms.len();
    let valleys: Vec<Option<Point3>> = (0..n)
        .map(|k| {
            let (a, b) = (&arms[k], &arms[(k + 1) % n]);
            let reach = a
                .half_width()
                .max(b.half_width())
                .max(a.base_setback(params))
                .max(b.base_setback(params));
            valley_point(center, a, b, gap_after(arms, k), params.valley_clamp_factor * reach)
        })
        .collect();

    let distances = (0..n)
        .map(|k| {
            let arm = &arms[k];
            let clearance = [valleys[(k + n - 1) % n], valleys[k]]
                .into_iter()
                .flatten()
                .map(|v| (v - center).dot(&arm.tangent))
                .fold(0.0, f64::max);
            arm.clamp_setback(clearance + arm.fillet_clearance(), params)
        })
        .collect();

    (distances, valleys)
}

fn record(arms: &[Arm<'_>], distances: &[f64], setbacks: &mut Setbacks) {
    for (arm, &d) in arms.iter().zip(distances) {
        setbacks.set(arm.end_ref.edge, arm.end_ref.end, d);
    }
}

pub(super) fn min_level(arms: &[Arm<'_>]) -> i32 {
    arms.iter().map(Arm::level).min().unwrap_or(1)
}
