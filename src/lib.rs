pub mod error;
pub mod geometry;
pub mod graph;
pub mod math;
pub mod mesh;
pub mod network;
pub mod operations;
pub mod road;

pub use error::{Result, RoadError};
pub use mesh::{LevelMesh, QuadMesh};
pub use network::{QuadRoadNetwork, RoadNetworkOutput, RoadNetworkParams};
pub use road::{RoadCurve, RoadNetworkInput, RoadType};
