use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

/// The plane every centerline is flattened onto before topology discovery.
///
/// Defined by an origin and two orthonormal in-plane axes. Local
/// coordinates are `(u, v, 0)`; the local Z axis is the plane normal.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkPlane {
    origin: Point3,
    u_dir: Vector3,
    v_dir: Vector3,
    normal: Vector3,
}

impl WorkPlane {
    /// Creates a work plane from an origin and two direction vectors.
    ///
    /// `v_dir` is re-orthogonalised against `u_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if a direction vector is zero-length or the two
    /// directions are parallel.
    pub fn new(origin: Point3, u_dir: Vector3, v_dir: Vector3) -> Result<Self> {
        let u_len = u_dir.norm();
        if u_len < TOLERANCE || v_dir.norm() < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let u_dir = u_dir / u_len;

        let normal = u_dir.cross(&v_dir);
        let normal_len = normal.norm();
        if normal_len < TOLERANCE {
            return Err(
                GeometryError::Degenerate("work plane directions are parallel".into()).into(),
            );
        }
        let normal = normal / normal_len;
        let v_dir = normal.cross(&u_dir);

        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal,
        })
    }

    /// Creates a work plane from an origin and a normal vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Result<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / len;

        // Choose a reference vector not parallel to the normal.
        let reference = if normal.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let u_dir = reference - normal * reference.dot(&normal);
        Self::new(origin, u_dir, normal.cross(&u_dir))
    }

    /// The world horizontal plane through the origin.
    #[must_use]
    pub fn world_xy() -> Self {
        Self {
            origin: Point3::origin(),
            u_dir: Vector3::x(),
            v_dir: Vector3::y(),
            normal: Vector3::z(),
        }
    }

    /// Returns the plane normal.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Projects a world point onto the plane, returning local `(u, v, 0)`.
    #[must_use]
    pub fn to_local(&self, p: &Point3) -> Point3 {
        let d = p - self.origin;
        Point3::new(d.dot(&self.u_dir), d.dot(&self.v_dir), 0.0)
    }

    /// Maps a local point back to world coordinates.
    #[must_use]
    pub fn to_world(&self, local: &Point3) -> Point3 {
        self.origin + self.u_dir * local.x + self.v_dir * local.y + self.normal * local.z
    }

    /// Maps a local direction back to world coordinates.
    #[must_use]
    pub fn vector_to_world(&self, local: &Vector3) -> Vector3 {
        self.u_dir * local.x + self.v_dir * local.y + self.normal * local.z
    }
}

impl Default for WorkPlane {
    fn default() -> Self {
        Self::world_xy()
    }
}
