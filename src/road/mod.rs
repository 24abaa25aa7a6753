mod input;
mod road_curve;
mod road_type;

pub use input::RoadNetworkInput;
pub use road_curve::RoadCurve;
pub use road_type::{validate_attributes, RoadType};

/// Default road class for one hierarchy level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelPreset {
    pub level: i32,
    pub name: &'static str,
    pub layer_name: &'static str,
    pub width: f64,
    pub fillet_radius: f64,
}

/// Main roads, secondary roads and paths.
pub const LEVEL_PRESETS: [LevelPreset; 3] = [
    LevelPreset {
        level: 1,
        name: "Main",
        layer_name: "L1",
        width: 12.0,
        fillet_radius: 15.0,
    },
    LevelPreset {
        level: 2,
        name: "Secondary",
        layer_name: "L2",
        width: 6.0,
        fillet_radius: 9.0,
    },
    LevelPreset {
        level: 3,
        name: "Path",
        layer_name: "L3",
        width: 3.0,
        fillet_radius: 5.0,
    },
];

impl LevelPreset {
    /// Returns the preset for `level`, if one exists.
    #[must_use]
    pub fn for_level(level: i32) -> Option<&'static Self> {
        LEVEL_PRESETS.iter().find(|p| p.level == level)
    }
}
