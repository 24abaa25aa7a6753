use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{InputError, Result};
use crate::math::UP;
use crate::mesh::{LevelMesh, QuadMesh};

/// Parameters controlling per-level mesh assembly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssemblyParams {
    /// Vertices closer than this are merged within one level.
    pub weld_tolerance: f64,
}

impl Default for AssemblyParams {
    fn default() -> Self {
        Self {
            weld_tolerance: 1e-5,
        }
    }
}

impl AssemblyParams {
    /// # Errors
    ///
    /// Returns `InputError::InvalidParameter` if the weld tolerance is
    /// negative or non-finite.
    pub fn validate(&self) -> Result<()> {
        if !(self.weld_tolerance.is_finite() && self.weld_tolerance >= 0.0) {
            return Err(InputError::InvalidParameter {
                parameter: "assembly.weld_tolerance",
                reason: format!("{} is not a non-negative length", self.weld_tolerance),
            }
            .into());
        }
        Ok(())
    }
}

/// Merges junction and strip meshes into one clean mesh per level.
///
/// Meshes of different levels never share vertices, even where they
/// touch, so overpasses stay separate surfaces.
#[derive(Debug)]
pub struct AssembleLevels<'a> {
    parts: &'a [LevelMesh],
    params: AssemblyParams,
}

impl<'a> AssembleLevels<'a> {
    /// Creates a new assembly operation.
    #[must_use]
    pub fn new(parts: &'a [LevelMesh], params: AssemblyParams) -> Self {
        Self { parts, params }
    }

    /// Executes the assembly. Levels are returned in ascending order.
    #[must_use]
    pub fn execute(&self) -> BTreeMap<i32, QuadMesh> {
        let mut levels: BTreeMap<i32, QuadMesh> = BTreeMap::new();
        for part in self.parts {
            levels.entry(part.level).or_default().append(&part.mesh);
        }

        for (level, mesh) in &mut levels {
            let raw = mesh.vertex_count();
            mesh.weld(self.params.weld_tolerance);
            mesh.remove_degenerate_faces();
            mesh.unify_orientation(&UP);
            mesh.compact();
            mesh.compute_normals();
            debug!(
                level = *level,
                raw_vertices = raw,
                vertices = mesh.vertex_count(),
                faces = mesh.face_count(),
                "assembled level"
            );
        }
        levels
    }
}

/// Concatenates level meshes without merging anything across levels.
#[must_use]
pub fn combine_levels(levels: &BTreeMap<i32, QuadMesh>) -> QuadMesh {
    let mut combined = QuadMesh::new();
    for mesh in levels.values() {
        combined.append(mesh);
    }
    combined
}
