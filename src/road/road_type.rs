use std::fmt;

use crate::error::{InputError, Result};

/// A road class: width, junction fillet radius and hierarchy level.
///
/// Smaller levels have higher priority. Values are validated on
/// construction and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadType {
    name: String,
    width: f64,
    fillet_radius: f64,
    layer_name: String,
    level: i32,
}

impl RoadType {
    /// Creates a new road type.
    ///
    /// # Errors
    ///
    /// Returns an `InputError` if `width` is not positive, `fillet_radius`
    /// is negative, either is non-finite, or `level < 1`.
    pub fn new(
        name: impl Into<String>,
        width: f64,
        fillet_radius: f64,
        layer_name: impl Into<String>,
        level: i32,
    ) -> Result<Self> {
        validate_attributes(level, width, fillet_radius)?;
        Ok(Self {
            name: name.into(),
            width,
            fillet_radius,
            layer_name: layer_name.into(),
            level,
        })
    }

    /// Creates a road type named after its level preset.
    ///
    /// # Errors
    ///
    /// Same as [`RoadType::new`].
    pub fn for_level(level: i32, width: f64, fillet_radius: f64) -> Result<Self> {
        let preset = super::LevelPreset::for_level(level);
        let (name, layer) = match preset {
            Some(p) => (p.name.to_owned(), p.layer_name.to_owned()),
            None => (format!("Level {level}"), format!("L{level}")),
        };
        Self::new(name, width, fillet_radius, layer, level)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Half the pavement width.
    #[must_use]
    pub fn half_width(&self) -> f64 {
        self.width * 0.5
    }

    #[must_use]
    pub fn fillet_radius(&self) -> f64 {
        self.fillet_radius
    }

    #[must_use]
    pub fn layer_name(&self) -> &str {
        &self.layer_name
    }

    #[must_use]
    pub fn level(&self) -> i32 {
        self.level
    }
}

impl fmt::Display for RoadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RoadType: {} (L{}, W={}, R={})",
            self.name, self.level, self.width, self.fillet_radius
        )
    }
}

/// Validates the per-curve road attributes.
///
/// # Errors
///
/// Returns the matching `InputError` for the first invalid attribute.
pub fn validate_attributes(level: i32, width: f64, fillet_radius: f64) -> Result<()> {
    if level < 1 {
        return Err(InputError::InvalidLevel(level).into());
    }
    if !width.is_finite() || width <= 0.0 {
        return Err(InputError::InvalidWidth(width).into());
    }
    if !fillet_radius.is_finite() || fillet_radius < 0.0 {
        return Err(InputError::InvalidFilletRadius(fillet_radius).into());
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn valid_type() {
        let t = RoadType::new("Main", 12.0, 15.0, "L1", 1).unwrap();
        assert_eq!(t.name(), "Main");
        assert!((t.half_width() - 6.0).abs() < f64::EPSILON);
        assert_eq!(t.to_string(), "RoadType: Main (L1, W=12, R=15)");
    }

    #[test]
    fn negative_width_fails() {
        assert!(RoadType::new("x", -1.0, 0.0, "L1", 1).is_err());
        assert!(RoadType::new("x", 0.0, 0.0, "L1", 1).is_err());
    }

    #[test]
    fn negative_radius_fails() {
        assert!(RoadType::new("x", 1.0, -0.5, "L1", 1).is_err());
        assert!(RoadType::new("x", 1.0, f64::NAN, "L1", 1).is_err());
    }

    #[test]
    fn level_zero_fails() {
        assert!(RoadType::new("x", 1.0, 0.0, "L0", 0).is_err());
    }

    #[test]
    fn for_level_uses_preset_names() {
        let t = RoadType::for_level(2, 6.0, 9.0).unwrap();
        assert_eq!(t.name(), "Secondary");
        assert_eq!(t.layer_name(), "L2");

        let t = RoadType::for_level(7, 2.0, 1.0).unwrap();
        assert_eq!(t.name(), "Level 7");
        assert_eq!(t.layer_name(), "L7");
    }
}
