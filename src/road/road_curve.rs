use crate::error::Result;
use crate::math::Point3;

use super::road_type::validate_attributes;

/// One input centerline with its road attributes.
///
/// The point list is taken as-is; degenerate or non-finite geometry is
/// filtered later by the shattering step instead of being rejected here.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadCurve {
    pub points: Vec<Point3>,
    pub level: i32,
    pub width: f64,
    pub fillet_radius: f64,
}

impl RoadCurve {
    /// Creates a road curve after validating its attributes.
    ///
    /// # Errors
    ///
    /// Returns an `InputError` for a level below 1, a non-positive width or
    /// a negative fillet radius.
    pub fn new(points: Vec<Point3>, level: i32, width: f64, fillet_radius: f64) -> Result<Self> {
        validate_attributes(level, width, fillet_radius)?;
        Ok(Self {
            points,
            level,
            width,
            fillet_radius,
        })
    }

    /// Checks the attributes of a curve built by struct literal.
    ///
    /// # Errors
    ///
    /// Same as [`RoadCurve::new`].
    pub fn validate(&self) -> Result<()> {
        validate_attributes(self.level, self.width, self.fillet_radius)
    }
}
