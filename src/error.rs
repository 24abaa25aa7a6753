use thiserror::Error;

/// Top-level error type for road network generation.
#[derive(Debug, Error)]
pub enum RoadError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,

    #[error("non-finite coordinate in {0}")]
    NonFinite(&'static str),
}

/// Errors related to the road graph.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),
}

/// Errors raised when validating caller-supplied arguments.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("road width must be positive and finite, got {0}")]
    InvalidWidth(f64),

    #[error("fillet radius must be non-negative and finite, got {0}")]
    InvalidFilletRadius(f64),

    #[error("road level must be at least 1, got {0}")]
    InvalidLevel(i32),

    #[error("invalid parameter {parameter}: {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },
}

/// Errors related to mesh construction.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("vertex index {index} out of range for {count} vertices")]
    IndexOutOfRange { index: u32, count: usize },

    #[error("mesh construction failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`RoadError`].
pub type Result<T> = std::result::Result<T, RoadError>;
