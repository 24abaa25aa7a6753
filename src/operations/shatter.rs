use tracing::{debug, warn};

use crate::error::{InputError, Result};
use crate::geometry::{Polyline, WorkPlane};
use crate::math::intersect_2d::{boxes_overlap_2d, segment_segment_intersect_2d};
use crate::math::Point3;
use crate::road::RoadCurve;

/// An atomic centerline piece between two topological events.
#[derive(Debug, Clone, PartialEq)]
pub struct ShatteredSegment {
    /// Centerline in work-plane coordinates.
    pub centerline: Polyline,
    pub level: i32,
    pub width: f64,
    pub fillet_radius: f64,
    /// Index of the input curve this piece came from.
    pub source: usize,
}

/// Flattens road curves onto the work plane and splits them at every
/// crossing and every endpoint that touches another curve.
#[derive(Debug)]
pub struct ShatterCurves<'a> {
    curves: &'a [RoadCurve],
    plane: &'a WorkPlane,
    tolerance: f64,
}

/// A flattened input curve that survived validation.
struct Flat {
    source: usize,
    line: Polyline,
    bounds: (Point3, Point3),
}

impl<'a> ShatterCurves<'a> {
    /// Creates a new shattering operation.
    #[must_use]
    pub fn new(curves: &'a [RoadCurve], plane: &'a WorkPlane, tolerance: f64) -> Self {
        Self {
            curves,
            plane,
            tolerance,
        }
    }

    /// Executes the shattering.
    ///
    /// Invalid curves are skipped with a warning; an input without valid
    /// curves yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `InputError::InvalidParameter` if the tolerance is not
    /// positive.
    pub fn execute(&self) -> Result<Vec<ShatteredSegment>> {
        let tol = self.tolerance;
        if !(tol.is_finite() && tol > 0.0) {
            return Err(InputError::InvalidParameter {
                parameter: "node_tolerance",
                reason: format!("{tol} is not a positive length"),
            }
            .into());
        }

        let flats = self.flatten();
        let mut splits: Vec<Vec<f64>> = vec![Vec::new(); flats.len()];

        // Mutual and self crossings.
        for i in 0..flats.len() {
            for (si, sj) in span_crossings(&flats[i].line, &flats[i].line, true, tol) {
                splits[i].push(si);
                splits[i].push(sj);
            }
            for j in (i + 1)..flats.len() {
                let (a, b) = (&flats[i], &flats[j]);
                if !boxes_overlap_2d(&a.bounds.0, &a.bounds.1, &b.bounds.0, &b.bounds.1, tol) {
                    continue;
                }
                for (si, sj) in span_crossings(&a.line, &b.line, false, tol) {
                    splits[i].push(si);
                    splits[j].push(sj);
                }
            }
        }

        // Endpoints resting on another curve (T-junctions).
        for i in 0..flats.len() {
            for end in [flats[i].line.start(), flats[i].line.end()] {
                for (j, other) in flats.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    let (station, dist) = other.line.closest_station(&end);
                    if dist <= tol {
                        splits[j].push(station);
                    }
                }
            }
        }

        let mut segments = Vec::new();
        for (flat, mut stations) in flats.iter().zip(splits) {
            let curve = &self.curves[flat.source];
            let length = flat.line.length();

            stations.retain(|&s| s > tol && s < length - tol);
            stations.sort_by(f64::total_cmp);
            stations.dedup_by(|a, b| (*a - *b).abs() <= tol);

            for piece in flat.line.split_at(&stations) {
                if piece.length() < tol {
                    continue;
                }
                segments.push(ShatteredSegment {
                    centerline: piece,
                    level: curve.level,
                    width: curve.width,
                    fillet_radius: curve.fillet_radius,
                    source: flat.source,
                });
            }
        }

        debug!(
            curves = self.curves.len(),
            valid = flats.len(),
            segments = segments.len(),
            "shattered centerlines"
        );
        Ok(segments)
    }

    /// Projects every curve to the work plane, dropping invalid ones.
    fn flatten(&self) -> Vec<Flat> {
        let mut flats = Vec::with_capacity(self.curves.len());
        for (source, curve) in self.curves.iter().enumerate() {
            let local: Vec<Point3> = curve.points.iter().map(|p| self.plane.to_local(p)).collect();
            let line = match Polyline::new(local) {
                Ok(line) => line,
                Err(e) => {
                    warn!(curve = source, error = %e, "skipping invalid road curve");
                    continue;
                }
            };
            if line.length() < self.tolerance {
                warn!(curve = source, length = line.length(), "skipping road curve shorter than tolerance");
                continue;
            }
            let bounds = bounds_of(line.points());
            flats.push(Flat {
                source,
                line,
                bounds,
            });
        }
        flats
    }
}

fn bounds_of(points: &[Point3]) -> (Point3, Point3) {
    let mut lo = points[0];
    let mut hi = points[0];
    for p in points {
        lo = Point3::new(lo.x.min(p.x), lo.y.min(p.y), 0.0);
        hi = Point3::new(hi.x.max(p.x), hi.y.max(p.y), 0.0);
    }
    (lo, hi)
}

/// All span-span crossings between `a` and `b` as station pairs.
///
/// With `same` set, `a` and `b` are the same curve and only non-adjacent
/// spans are tested, so shared vertices do not count as crossings.
fn span_crossings(a: &Polyline, b: &Polyline, same: bool, tol: f64) -> Vec<(f64, f64)> {
    let mut hits = Vec::new();
    let (na, nb) = (a.span_count(), b.span_count());
    let closed = same && a.is_closed(tol);

    for i in 0..na {
        let (a0, a1, sa, la) = a.span(i);
        let first_j = if same { i + 2 } else { 0 };
        for j in first_j..nb {
            if closed && i == 0 && j == nb - 1 {
                continue;
            }
            let (b0, b1, sb, lb) = b.span(j);
            if !boxes_overlap_2d(&a0, &a1, &b0, &b1, tol) {
                continue;
            }
            if let Some((_, t, u)) = segment_segment_intersect_2d(&a0, &a1, &b0, &b1) {
                hits.push((sa + t * la, sb + u * lb));
            }
        }
    }
    hits
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn curve(points: &[(f64, f64)], level: i32) -> RoadCurve {
        RoadCurve::new(
            points.iter().map(|&(x, y)| Point3::new(x, y, 0.0)).collect(),
            level,
            4.0,
            2.0,
        )
        .unwrap()
    }

    fn shatter(curves: &[RoadCurve]) -> Vec<ShatteredSegment> {
        let plane = WorkPlane::world_xy();
        ShatterCurves::new(curves, &plane, 0.01).execute().unwrap()
    }

    #[test]
    fn x_crossing_gives_four_pieces() {
        let segs = shatter(&[
            curve(&[(-10.0, 0.0), (10.0, 0.0)], 1),
            curve(&[(0.0, -10.0), (0.0, 10.0)], 2),
        ]);
        assert_eq!(segs.len(), 4);
        for s in &segs {
            assert!((s.centerline.length() - 10.0).abs() < 1e-9);
        }
        assert_eq!(segs.iter().filter(|s| s.level == 2).count(), 2);
    }

    #[test]
    fn t_junction_splits_the_through_curve() {
        let segs = shatter(&[
            curve(&[(-10.0, 0.0), (10.0, 0.0)], 1),
            curve(&[(3.0, 0.005), (3.0, 10.0)], 1),
        ]);
        assert_eq!(segs.len(), 3);
        let through: Vec<f64> = segs
            .iter()
            .filter(|s| s.source == 0)
            .map(|s| s.centerline.length())
            .collect();
        assert_eq!(through.len(), 2);
        assert!((through[0] - 13.0).abs() < 1e-6);
    }

    #[test]
    fn shared_endpoints_do_not_split() {
        let segs = shatter(&[
            curve(&[(0.0, 0.0), (5.0, 0.0)], 1),
            curve(&[(5.0, 0.0), (5.0, 5.0)], 1),
        ]);
        assert_eq!(segs.len(), 2);
    }

    #[test]
    fn self_crossing_is_split() {
        // A figure with one self-crossing at (5, 0).
        let segs = shatter(&[curve(
            &[(0.0, 0.0), (10.0, 0.0), (10.0, 5.0), (5.0, 5.0), (5.0, -5.0)],
            1,
        )]);
        assert_eq!(segs.len(), 3);
    }

    #[test]
    fn heights_are_flattened() {
        let c = RoadCurve::new(
            vec![Point3::new(0.0, 0.0, 3.0), Point3::new(4.0, 0.0, -2.0)],
            1,
            2.0,
            1.0,
        )
        .unwrap();
        let segs = shatter(&[c]);
        assert_eq!(segs.len(), 1);
        assert!(segs[0].centerline.points().iter().all(|p| p.z == 0.0));
    }

    #[test]
    fn invalid_curves_are_skipped() {
        let vertical = RoadCurve::new(
            vec![Point3::new(1.0, 1.0, 0.0), Point3::new(1.0, 1.0, 9.0)],
            1,
            2.0,
            1.0,
        )
        .unwrap();
        let nan = RoadCurve::new(
            vec![Point3::new(f64::NAN, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)],
            1,
            2.0,
            1.0,
        )
        .unwrap();
        assert!(shatter(&[vertical, nan]).is_empty());
        assert!(shatter(&[]).is_empty());
    }

    #[test]
    fn zero_tolerance_rejected() {
        let plane = WorkPlane::world_xy();
        assert!(ShatterCurves::new(&[], &plane, 0.0).execute().is_err());
    }
}
