pub mod polyline;
pub mod work_plane;

pub use polyline::Polyline;
pub use work_plane::WorkPlane;
