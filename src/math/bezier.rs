use super::Point3;

/// Evaluates the quadratic Bézier `(1-t)²·p0 + 2t(1-t)·ctrl + t²·p1`.
#[must_use]
pub fn quadratic_point(p0: &Point3, ctrl: &Point3, p1: &Point3, t: f64) -> Point3 {
    let s = 1.0 - t;
    let a = s * s;
    let b = 2.0 * s * t;
    let c = t * t;
    Point3::from(p0.coords * a + ctrl.coords * b + p1.coords * c)
}

/// Samples a quadratic Bézier at `segments + 1` evenly spaced parameters.
///
/// The first and last samples are exactly `p0` and `p1`.
#[must_use]
pub fn quadratic_samples(p0: &Point3, ctrl: &Point3, p1: &Point3, segments: usize) -> Vec<Point3> {
    let segments = segments.max(1);
    let mut out = Vec::with_capacity(segments + 1);
    out.push(*p0);
    for i in 1..segments {
        #[allow(clippy::cast_precision_loss)]
        let t = i as f64 / segments as f64;
        out.push(quadratic_point(p0, ctrl, p1, t));
    }
    out.push(*p1);
    out
}
