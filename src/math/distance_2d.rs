use super::Point3;

/// Projects `p` onto the segment `a → b` in the XY plane.
///
/// Returns `(t, distance)` where `t ∈ [0, 1]` is the parameter of the closest
/// point on the segment.
#[must_use]
pub fn project_to_segment(p: &Point3, a: &Point3, b: &Point3) -> (f64, f64) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;

    if len_sq < 1e-20 {
        // Degenerate segment (zero length).
        return (0.0, ((p.x - a.x).powi(2) + (p.y - a.y).powi(2)).sqrt());
    }

    let t = ((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq;
    let t = t.clamp(0.0, 1.0);

    let closest_x = a.x + t * dx;
    let closest_y = a.y + t * dy;

    (t, ((p.x - closest_x).powi(2) + (p.y - closest_y).powi(2)).sqrt())
}

/// Planar distance between two points, ignoring Z.
#[must_use]
pub fn distance_2d(a: &Point3, b: &Point3) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;

    #[test]
    fn perpendicular_projection() {
        let (t, d) = project_to_segment(
            &Point3::new(1.0, 1.0, 0.0),
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(2.0, 0.0, 0.0),
        );
        assert!((t - 0.5).abs() < TOL, "t={t}");
        assert!((d - 1.0).abs() < TOL, "d={d}");
    }

    #[test]
    fn endpoint_closest() {
        let (t, d) = project_to_segment(
            &Point3::new(-1.0, 0.0, 0.0),
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(2.0, 0.0, 0.0),
        );
        assert!(t.abs() < TOL);
        assert!((d - 1.0).abs() < TOL, "d={d}");
    }

    #[test]
    fn degenerate_segment() {
        let (_, d) = project_to_segment(
            &Point3::new(3.0, 4.0, 0.0),
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(0.0, 0.0, 0.0),
        );
        assert!((d - 5.0).abs() < TOL, "d={d}");
    }

    #[test]
    fn planar_distance_ignores_height() {
        let d = distance_2d(&Point3::new(0.0, 0.0, 5.0), &Point3::new(3.0, 4.0, -2.0));
        assert!((d - 5.0).abs() < TOL);
    }
}
