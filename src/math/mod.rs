pub mod bezier;
pub mod distance_2d;
pub mod intersect_2d;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Distance below which two curve endpoints are the same road node.
pub const NODE_TOLERANCE: f64 = 0.01;

/// Up direction of the working plane in local coordinates (Z+).
pub const UP: Vector3 = Vector3::new(0.0, 0.0, 1.0);

/// Returns the left-hand perpendicular of `dir` in the working plane.
///
/// Falls back to the X axis as reference when `dir` is parallel to [`UP`].
#[must_use]
pub fn left_normal(dir: &Vector3) -> Vector3 {
    let n = UP.cross(dir);
    let len = n.norm();
    if len > TOLERANCE {
        return n / len;
    }
    let alt = Vector3::x().cross(dir);
    let alt_len = alt.norm();
    if alt_len > TOLERANCE {
        alt / alt_len
    } else {
        Vector3::y()
    }
}

/// Returns the planar angle of `dir` in `(-π, π]`.
#[must_use]
pub fn planar_angle(dir: &Vector3) -> f64 {
    dir.y.atan2(dir.x)
}

/// 2D cross product of the XY components.
#[must_use]
pub fn cross_2d(a: &Vector3, b: &Vector3) -> f64 {
    a.x * b.y - a.y * b.x
}
