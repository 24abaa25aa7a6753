use tracing::warn;

use crate::math::bezier::quadratic_samples;
use crate::math::intersect_2d::{line_line_intersect_2d, point_at};
use crate::math::{left_normal, Point3, Vector3, TOLERANCE};
use crate::mesh::{LevelMesh, QuadMesh};

use super::standard::{joint_at, layout, min_level};
use super::{Arm, JunctionParams, Setbacks};

/// Below this `|t_side · n_through|` a side road counts as running
/// alongside the through road.
const GRAZING: f64 = 1e-6;

/// Builds a junction where two ends of the highest class form a through
/// road and every other end attaches with a bell-mouth apron.
///
/// The through road is joined exactly like a two-way joint, so its
/// surface stays continuous across the node. Side roads are set back until
/// both pavement corners have cleared the through road's near boundary,
/// plus a fillet clearance, and flare out onto that boundary with a pair
/// of Bézier fillets.
pub(super) fn build(
    center: &Point3,
    arms: &[Arm<'_>],
    params: &JunctionParams,
    setbacks: &mut Setbacks,
) -> Vec<LevelMesh> {
    let top = min_level(arms);
    let (through, sides): (Vec<Arm<'_>>, Vec<Arm<'_>>) =
        arms.iter().copied().partition(|a| a.level() == top);

    let (a, b) = (&through[0], &through[1]);
    let half = a.half_width().max(b.half_width());
    let axis = a.tangent - b.tangent;
    let axis = if axis.norm() > 1e-9 {
        axis.normalize()
    } else {
        a.tangent
    };
    let across = left_normal(&axis);

    let mut meshes = Vec::new();
    let mut reach = [0.0_f64; 2];
    for side in &sides {
        let Some(apron) = apron(center, side, &axis, &across, half, params, setbacks) else {
            continue;
        };
        for (r, arm) in reach.iter_mut().zip([a, b]) {
            for p in &apron.landing {
                *r = r.max((p - center).dot(&arm.tangent));
            }
        }
        meshes.push(LevelMesh {
            level: side.level(),
            mesh: apron.mesh,
        });
    }

    // The through joint spans at least the width of every apron landing.
    let (mut distances, _) = layout(center, &through, params);
    for ((d, r), arm) in distances.iter_mut().zip(reach).zip([a, b]) {
        *d = arm.clamp_setback(d.max(r), params);
    }
    let mut out = joint_at(center, &through, &distances, setbacks);
    out.extend(meshes);
    out
}

struct Apron {
    mesh: QuadMesh,
    /// Fillet end points on the through boundary.
    landing: [Point3; 2],
}

/// Records the side setback and builds its bell-mouth.
///
/// Returns `None` (setback still recorded) when the side road runs
/// parallel to the through boundary, or when the setback ceiling leaves a
/// section corner inside the through pavement.
fn apron(
    center: &Point3,
    side: &Arm<'_>,
    axis: &Vector3,
    across: &Vector3,
    half: f64,
    params: &JunctionParams,
    setbacks: &mut Setbacks,
) -> Option<Apron> {
    let facing = side.tangent.dot(across);
    let sign = if facing >= 0.0 { 1.0 } else { -1.0 };
    let skew = (1.0 - facing * facing).max(0.0).sqrt();
    let tee = if facing.abs() > GRAZING {
        (half + side.half_width() * skew) / facing.abs()
    } else {
        half
    };
    let setback = side.clamp_setback(tee + side.fillet_clearance(), params);
    setbacks.set(side.end_ref.edge, side.end_ref.end, setback);

    let boundary = center + across * (half * sign);
    let section = side.section(setback);
    let segments = params.fillet_segments();

    let fillet = |corner: Point3| -> Option<Vec<Point3>> {
        let (t, _) = line_line_intersect_2d(&corner, &side.tangent, &boundary, axis)?;
        // The boundary must lie behind the corner, toward the node.
        if t >= -TOLERANCE {
            return None;
        }
        let ctrl = point_at(&corner, &side.tangent, t);
        let away = if (corner - section.center).dot(axis) >= 0.0 {
            *axis
        } else {
            -axis
        };
        let end = ctrl + away * (corner - ctrl).norm();
        Some(quadratic_samples(&corner, &ctrl, &end, segments))
    };

    let (Some(right), Some(left)) = (fillet(section.right), fillet(section.left)) else {
        warn!(
            edge = ?side.end_ref.edge,
            "side road apron does not fit beside the through road, skipped"
        );
        return None;
    };

    let mut mesh = QuadMesh::new();
    for j in 0..segments {
        mesh.add_quad([right[j], left[j], left[j + 1], right[j + 1]]);
    }
    Some(Apron {
        mesh,
        landing: [right[segments], left[segments]],
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::super::tests::{folded_faces, graph_of, node_with_valence, road};
    use super::super::BuildJunction;
    use super::*;
    use crate::graph::{EdgeEnd, RoadGraph};
    use crate::math::UP;

    /// A main road split at the origin, crossed by a secondary road at x = 20.
    fn scenario() -> RoadGraph {
        graph_of(&[
            road(&[(-60.0, 0.0), (0.0, 0.0)], 1, 12.0, 15.0),
            road(&[(0.0, 0.0), (60.0, 0.0)], 1, 12.0, 15.0),
            road(&[(20.0, -40.0), (20.0, 40.0)], 2, 6.0, 9.0),
        ])
    }

    /// A long main road split at the origin with a secondary road leaving
    /// the node at `degrees` from the +x axis.
    fn skewed(degrees: f64, radius: f64) -> RoadGraph {
        let (sin, cos) = degrees.to_radians().sin_cos();
        graph_of(&[
            road(&[(-120.0, 0.0), (0.0, 0.0)], 1, 12.0, 15.0),
            road(&[(0.0, 0.0), (120.0, 0.0)], 1, 12.0, 15.0),
            road(&[(0.0, 0.0), (100.0 * cos, 100.0 * sin)], 2, 6.0, radius),
        ])
    }

    fn run(graph: &RoadGraph) -> (Vec<LevelMesh>, Setbacks) {
        run_at(graph, 4)
    }

    fn run_at(graph: &RoadGraph, valence: usize) -> (Vec<LevelMesh>, Setbacks) {
        let node = node_with_valence(graph, valence);
        let mut setbacks = Setbacks::new();
        let meshes = BuildJunction::new(graph, node, &JunctionParams::default())
            .execute(&mut setbacks)
            .unwrap();
        (meshes, setbacks)
    }

    #[test]
    fn through_road_stays_one_quad() {
        let g = scenario();
        let (meshes, _) = run(&g);
        let main: Vec<&LevelMesh> = meshes.iter().filter(|m| m.level == 1).collect();
        assert_eq!(main.len(), 1);
        assert_eq!(main[0].mesh.face_count(), 1);
        let aprons = meshes.iter().filter(|m| m.level == 2).count();
        assert_eq!(aprons, 2);
    }

    #[test]
    fn side_setback_exceeds_fillet_radius() {
        let g = scenario();
        let (_, setbacks) = run(&g);
        for (id, edge) in g.edges() {
            if edge.road_type.level() != 2 {
                continue;
            }
            let end = if edge.start == node_with_valence(&g, 4) {
                EdgeEnd::Start
            } else {
                EdgeEnd::End
            };
            let s = setbacks.get(id, end);
            assert_relative_eq!(s, 15.0, epsilon = 1e-9);
            assert!(s > edge.road_type.fillet_radius());
        }
    }

    #[test]
    fn apron_lands_on_through_boundary() {
        let g = scenario();
        let (meshes, _) = run(&g);
        for apron in meshes.iter().filter(|m| m.level == 2) {
            let m = &apron.mesh;
            assert_eq!(m.face_count(), JunctionParams::default().fillet_segments());
            assert!(m.is_valid());
            for f in &m.faces {
                assert!(m.face_normal(f).dot(&UP) > 0.0);
            }
            let on_boundary: Vec<&Point3> = m
                .vertices
                .iter()
                .filter(|p| (p.y.abs() - 6.0).abs() < 1e-9)
                .collect();
            assert!(on_boundary.iter().any(|p| (p.x - 8.0).abs() < 1e-9));
            assert!(on_boundary.iter().any(|p| (p.x - 32.0).abs() < 1e-9));
            // The narrow end matches the side road width.
            assert!(m
                .vertices
                .iter()
                .any(|p| (p.x - 17.0).abs() < 1e-9 && (p.y.abs() - 15.0).abs() < 1e-9));
        }
    }

    #[test]
    fn through_setbacks_cover_the_landing() {
        let g = scenario();
        let (meshes, setbacks) = run(&g);
        let node = node_with_valence(&g, 4);
        for (id, edge) in g.edges() {
            if edge.road_type.level() != 1 || edge.end_at(node).is_none() {
                continue;
            }
            let end = edge.end_at(node).unwrap();
            let s = setbacks.get(id, end);
            let ceiling = 0.45 * edge.length();
            assert!(s <= ceiling + 1e-9);
            assert!(s >= 12.0_f64.min(ceiling) - 1e-9);
        }
        let main = meshes.iter().find(|m| m.level == 1).unwrap();
        assert!(main.mesh.face_normal(&main.mesh.faces[0]).norm() > 0.0);
    }

    #[test]
    fn equal_levels_are_not_priority() {
        let g = graph_of(&[
            road(&[(-30.0, 0.0), (30.0, 0.0)], 1, 4.0, 2.0),
            road(&[(0.0, -30.0), (0.0, 30.0)], 1, 4.0, 2.0),
        ]);
        let (meshes, _) = run(&g);
        assert_eq!(meshes.len(), 1);
    }

    #[test]
    fn skewed_side_roads_get_simple_aprons() {
        for (degrees, radius) in [(15.0, 9.0), (60.0, 0.0), (-60.0, 0.0), (150.0, 9.0)] {
            let g = skewed(degrees, radius);
            let (meshes, _) = run_at(&g, 3);
            let aprons: Vec<&LevelMesh> = meshes.iter().filter(|m| m.level == 2).collect();
            assert_eq!(aprons.len(), 1, "{degrees} degrees");
            let m = &aprons[0].mesh;
            assert_eq!(m.face_count(), JunctionParams::default().fillet_segments());
            assert_eq!(folded_faces(m), 0, "{degrees} degrees");
            for f in &m.faces {
                assert!(m.face_normal(f).dot(&UP) > 0.0, "{degrees} degrees");
            }
            // Nothing reaches into the through pavement.
            for p in &m.vertices {
                assert!(p.y.abs() >= 6.0 - 1e-9, "{degrees} degrees: {p:?}");
            }
        }
    }

    #[test]
    fn skewed_side_setback_clears_both_corners() {
        let g = skewed(15.0, 9.0);
        let (_, setbacks) = run_at(&g, 3);
        let (id, edge) = g.edges().find(|(_, e)| e.road_type.level() == 2).unwrap();
        let s = setbacks.get(id, edge.end_at(node_with_valence(&g, 3)).unwrap());
        let (sin, cos) = 15.0_f64.to_radians().sin_cos();
        assert_relative_eq!(s, (6.0 + 3.0 * cos) / sin + 9.0, epsilon = 1e-9);
    }

    #[test]
    fn apron_that_cannot_clear_is_skipped() {
        // 45 % of a 30 long side road is far short of the clearance a 5
        // degree approach needs.
        let (sin, cos) = 5.0_f64.to_radians().sin_cos();
        let g = graph_of(&[
            road(&[(-120.0, 0.0), (0.0, 0.0)], 1, 12.0, 15.0),
            road(&[(0.0, 0.0), (120.0, 0.0)], 1, 12.0, 15.0),
            road(&[(0.0, 0.0), (30.0 * cos, 30.0 * sin)], 2, 6.0, 9.0),
        ]);
        let (meshes, _) = run_at(&g, 3);
        assert!(meshes.iter().all(|m| m.level == 1));
        assert_eq!(meshes.len(), 1);
    }
}
