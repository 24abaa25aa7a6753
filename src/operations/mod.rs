mod assemble;
mod build_graph;
pub mod junction;
mod shatter;
mod street_strip;

pub use assemble::{combine_levels, AssembleLevels, AssemblyParams};
pub use build_graph::BuildGraph;
pub use junction::{BuildJunction, JunctionParams, Setbacks};
pub use shatter::{ShatterCurves, ShatteredSegment};
pub use street_strip::{BuildStreetStrip, StripParams};
