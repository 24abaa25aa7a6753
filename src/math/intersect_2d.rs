use super::{cross_2d, Point3, Vector3, TOLERANCE};

/// Parametric 2D line-line intersection.
///
/// Given lines `p1 + t * d1` and `p2 + u * d2`, returns `(t, u)` if not parallel.
#[must_use]
pub fn line_line_intersect_2d(
    p1: &Point3,
    d1: &Vector3,
    p2: &Point3,
    d2: &Vector3,
) -> Option<(f64, f64)> {
    let cross = cross_2d(d1, d2);
    if cross.abs() < TOLERANCE {
        return None;
    }
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    let t = (dx * d2.y - dy * d2.x) / cross;
    let u = (dx * d1.y - dy * d1.x) / cross;
    Some((t, u))
}

/// Bounded segment-segment intersection in 2D.
///
/// Returns `(intersection_point, t, u)` where `t` and `u` are in `[0, 1]`.
/// Parallel and collinear segments report no intersection.
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point3,
    a1: &Point3,
    b0: &Point3,
    b1: &Point3,
) -> Option<(Point3, f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;
    let (t, u) = line_line_intersect_2d(a0, &da, b0, &db)?;

    let eps = TOLERANCE;
    if t >= -eps && t <= 1.0 + eps && u >= -eps && u <= 1.0 + eps {
        let t = t.clamp(0.0, 1.0);
        let pt = Point3::new(a0.x + da.x * t, a0.y + da.y * t, a0.z);
        Some((pt, t, u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Linear interpolation: `origin + dir * t`, keeping the origin's height.
#[must_use]
pub fn point_at(origin: &Point3, dir: &Vector3, t: f64) -> Point3 {
    Point3::new(origin.x + dir.x * t, origin.y + dir.y * t, origin.z)
}

/// Returns `true` when the XY bounding boxes of two segments overlap
/// (expanded by `pad`).
#[must_use]
pub fn boxes_overlap_2d(a0: &Point3, a1: &Point3, b0: &Point3, b1: &Point3, pad: f64) -> bool {
    a0.x.min(a1.x) <= b0.x.max(b1.x) + pad
        && b0.x.min(b1.x) <= a0.x.max(a1.x) + pad
        && a0.y.min(a1.y) <= b0.y.max(b1.y) + pad
        && b0.y.min(b1.y) <= a0.y.max(a1.y) + pad
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn line_line_perpendicular() {
        let p1 = Point3::new(0.0, 0.0, 0.0);
        let d1 = Vector3::new(1.0, 0.0, 0.0);
        let p2 = Point3::new(0.5, -1.0, 0.0);
        let d2 = Vector3::new(0.0, 1.0, 0.0);
        let (t, u) = line_line_intersect_2d(&p1, &d1, &p2, &d2).unwrap();
        assert!((t - 0.5).abs() < TOLERANCE);
        assert!((u - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn line_line_parallel_returns_none() {
        let p1 = Point3::new(0.0, 0.0, 0.0);
        let d1 = Vector3::new(1.0, 0.0, 0.0);
        let p2 = Point3::new(0.0, 1.0, 0.0);
        assert!(line_line_intersect_2d(&p1, &d1, &p2, &d1).is_none());
    }

    #[test]
    fn segment_segment_crossing() {
        let a0 = Point3::new(0.0, 0.0, 0.0);
        let a1 = Point3::new(2.0, 2.0, 0.0);
        let b0 = Point3::new(0.0, 2.0, 0.0);
        let b1 = Point3::new(2.0, 0.0, 0.0);
        let (pt, t, u) = segment_segment_intersect_2d(&a0, &a1, &b0, &b1).unwrap();
        assert!((pt.x - 1.0).abs() < TOLERANCE);
        assert!((pt.y - 1.0).abs() < TOLERANCE);
        assert!((t - 0.5).abs() < TOLERANCE);
        assert!((u - 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn segment_segment_touching_endpoint() {
        let a0 = Point3::new(0.0, 0.0, 0.0);
        let a1 = Point3::new(2.0, 0.0, 0.0);
        let b0 = Point3::new(1.0, 0.0, 0.0);
        let b1 = Point3::new(1.0, 3.0, 0.0);
        let (_, t, u) = segment_segment_intersect_2d(&a0, &a1, &b0, &b1).unwrap();
        assert!((t - 0.5).abs() < TOLERANCE);
        assert!(u.abs() < TOLERANCE);
    }

    #[test]
    fn segment_segment_no_crossing() {
        let a0 = Point3::new(0.0, 0.0, 0.0);
        let a1 = Point3::new(1.0, 0.0, 0.0);
        let b0 = Point3::new(0.0, 1.0, 0.0);
        let b1 = Point3::new(1.0, 1.0, 0.0);
        assert!(segment_segment_intersect_2d(&a0, &a1, &b0, &b1).is_none());
    }

    #[test]
    fn disjoint_boxes() {
        let a0 = Point3::new(0.0, 0.0, 0.0);
        let a1 = Point3::new(1.0, 1.0, 0.0);
        let b0 = Point3::new(3.0, 3.0, 0.0);
        let b1 = Point3::new(4.0, 4.0, 0.0);
        assert!(!boxes_overlap_2d(&a0, &a1, &b0, &b1, 0.01));
        assert!(boxes_overlap_2d(&a0, &a1, &b0, &b1, 2.5));
    }
}
