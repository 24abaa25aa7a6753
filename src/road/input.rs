use tracing::debug;

use crate::error::Result;
use crate::math::{Point3, TOLERANCE};

use super::road_type::validate_attributes;
use super::{LevelPreset, RoadCurve};

/// Default pavement width when a curve carries none.
const DEFAULT_WIDTH: f64 = 10.0;

/// Default junction fillet radius when a curve carries none.
const DEFAULT_FILLET_RADIUS: f64 = 3.0;

/// Junction radius relative to road width when no radius is supplied.
const INTERSECTION_RADIUS_FACTOR: f64 = 1.5;

/// Collects tagged centerlines for one generation run.
///
/// Curves shorter than the geometric tolerance are dropped on insertion.
#[derive(Debug, Clone)]
pub struct RoadNetworkInput {
    curves: Vec<RoadCurve>,
    default_width: f64,
    default_fillet_radius: f64,
}

impl Default for RoadNetworkInput {
    fn default() -> Self {
        Self {
            curves: Vec::new(),
            default_width: DEFAULT_WIDTH,
            default_fillet_radius: DEFAULT_FILLET_RADIUS,
        }
    }
}

impl RoadNetworkInput {
    /// Creates an empty input with the default width and fillet radius.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty input with global defaults for curves that omit
    /// their own attributes.
    ///
    /// # Errors
    ///
    /// Returns an `InputError` if the width or radius is invalid.
    pub fn with_defaults(width: f64, fillet_radius: f64) -> Result<Self> {
        validate_attributes(1, width, fillet_radius)?;
        Ok(Self {
            curves: Vec::new(),
            default_width: width,
            default_fillet_radius: fillet_radius,
        })
    }

    #[must_use]
    pub fn default_width(&self) -> f64 {
        self.default_width
    }

    #[must_use]
    pub fn default_fillet_radius(&self) -> f64 {
        self.default_fillet_radius
    }

    /// Returns the collected curves.
    #[must_use]
    pub fn curves(&self) -> &[RoadCurve] {
        &self.curves
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Adds one curve. Returns `false` if it was too short to keep.
    ///
    /// # Errors
    ///
    /// Returns an `InputError` if the curve's attributes are invalid.
    pub fn push(&mut self, curve: RoadCurve) -> Result<bool> {
        curve.validate()?;
        if is_short(&curve.points) {
            debug!(points = curve.points.len(), "dropping short road curve");
            return Ok(false);
        }
        self.curves.push(curve);
        Ok(true)
    }

    /// Adds a batch of centerlines sharing one road class.
    ///
    /// Returns the number of curves kept.
    ///
    /// # Errors
    ///
    /// Returns an `InputError` if the attributes are invalid.
    pub fn add_roads<I>(&mut self, curves: I, level: i32, width: f64, fillet_radius: f64) -> Result<usize>
    where
        I: IntoIterator<Item = Vec<Point3>>,
    {
        validate_attributes(level, width, fillet_radius)?;
        let mut kept = 0;
        for points in curves {
            if self.push(RoadCurve::new(points, level, width, fillet_radius)?)? {
                kept += 1;
            }
        }
        Ok(kept)
    }

    /// Adds a batch of centerlines using the preset for `level`, or the
    /// global defaults for levels without a preset.
    ///
    /// # Errors
    ///
    /// Returns an `InputError` if `level < 1`.
    pub fn add_level<I>(&mut self, curves: I, level: i32) -> Result<usize>
    where
        I: IntoIterator<Item = Vec<Point3>>,
    {
        let (width, radius) = match LevelPreset::for_level(level) {
            Some(p) => (p.width, p.fillet_radius),
            None => (self.default_width, self.default_fillet_radius),
        };
        self.add_roads(curves, level, width, radius)
    }

    /// Adds level-1 centerlines with widths matched by index.
    ///
    /// A single width is broadcast to every curve; curves past the end of
    /// a longer list use the default width, as does an empty list. Without
    /// an explicit `fillet_radius` each curve gets `1.5 × width`.
    ///
    /// # Errors
    ///
    /// Returns an `InputError` if a width or the radius is invalid.
    pub fn add_with_widths<I>(
        &mut self,
        curves: I,
        widths: &[f64],
        fillet_radius: Option<f64>,
    ) -> Result<usize>
    where
        I: IntoIterator<Item = Vec<Point3>>,
    {
        let mut kept = 0;
        for (i, points) in curves.into_iter().enumerate() {
            let width = match widths {
                [] => self.default_width,
                [single] => *single,
                many => many.get(i).copied().unwrap_or(self.default_width),
            };
            let radius = fillet_radius.unwrap_or(width * INTERSECTION_RADIUS_FACTOR);
            if self.push(RoadCurve::new(points, 1, width, radius)?)? {
                kept += 1;
            }
        }
        Ok(kept)
    }

    /// Adds a level-1 centerline with the global default width and radius.
    ///
    /// # Errors
    ///
    /// Never fails for valid defaults; kept fallible for symmetry with `push`.
    pub fn add_default(&mut self, points: Vec<Point3>) -> Result<bool> {
        self.push(RoadCurve::new(
            points,
            1,
            self.default_width,
            self.default_fillet_radius,
        )?)
    }
}

fn is_short(points: &[Point3]) -> bool {
    let length: f64 = points.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
    length.is_nan() || length < TOLERANCE
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(x0: f64, x1: f64) -> Vec<Point3> {
        vec![Point3::new(x0, 0.0, 0.0), Point3::new(x1, 0.0, 0.0)]
    }

    #[test]
    fn presets_per_level() {
        let mut input = RoadNetworkInput::new();
        input.add_level(vec![line(0.0, 10.0)], 1).unwrap();
        input.add_level(vec![line(0.0, 10.0)], 2).unwrap();
        input.add_level(vec![line(0.0, 10.0)], 3).unwrap();
        input.add_level(vec![line(0.0, 10.0)], 4).unwrap();
        let widths: Vec<f64> = input.curves().iter().map(|c| c.width).collect();
        assert_eq!(widths, vec![12.0, 6.0, 3.0, 10.0]);
        assert!((input.curves()[1].fillet_radius - 9.0).abs() < f64::EPSILON);
    }

    #[test]
    fn single_width_is_broadcast() {
        let mut input = RoadNetworkInput::new();
        let kept = input
            .add_with_widths(vec![line(0.0, 5.0), line(0.0, 6.0)], &[4.0], Some(2.0))
            .unwrap();
        assert_eq!(kept, 2);
        assert!(input.curves().iter().all(|c| (c.width - 4.0).abs() < f64::EPSILON));
    }

    #[test]
    fn missing_widths_use_default_and_radius_scales() {
        let mut input = RoadNetworkInput::with_defaults(8.0, 1.0).unwrap();
        input
            .add_with_widths(vec![line(0.0, 5.0), line(0.0, 6.0), line(0.0, 7.0)], &[2.0, 3.0], None)
            .unwrap();
        let widths: Vec<f64> = input.curves().iter().map(|c| c.width).collect();
        assert_eq!(widths, vec![2.0, 3.0, 8.0]);
        assert!((input.curves()[2].fillet_radius - 12.0).abs() < 1e-12);
    }

    #[test]
    fn short_curves_are_dropped() {
        let mut input = RoadNetworkInput::new();
        assert!(!input.add_default(vec![Point3::origin()]).unwrap());
        assert!(!input.add_default(line(1.0, 1.0)).unwrap());
        assert!(input.add_default(line(0.0, 1.0)).unwrap());
        assert_eq!(input.len(), 1);
    }

    #[test]
    fn negative_width_rejected_at_boundary() {
        let mut input = RoadNetworkInput::new();
        assert!(input.add_roads(vec![line(0.0, 1.0)], 1, -2.0, 1.0).is_err());
        assert!(input.is_empty());
    }
}
