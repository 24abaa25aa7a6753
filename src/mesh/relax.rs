use crate::error::{InputError, Result};
use crate::math::Point3;

use super::QuadMesh;

/// Parameters controlling Laplacian relaxation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelaxParams {
    /// Run relaxation at all.
    pub enabled: bool,
    /// Number of synchronous smoothing passes.
    pub iterations: usize,
    /// Fraction of the way each interior vertex moves toward its
    /// neighbour average per pass, in `[0, 1]`.
    pub factor: f64,
}

impl Default for RelaxParams {
    fn default() -> Self {
        Self {
            enabled: true,
            iterations: 3,
            factor: 0.5,
        }
    }
}

impl RelaxParams {
    /// # Errors
    ///
    /// Returns `InputError::InvalidParameter` if `factor` is outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.factor) {
            return Err(InputError::InvalidParameter {
                parameter: "relax.factor",
                reason: format!("{} is outside [0, 1]", self.factor),
            }
            .into());
        }
        Ok(())
    }
}

/// Boundary-pinned Laplacian smoothing of a quad mesh.
///
/// Vertices on naked edges never move. Each pass reads only the positions
/// of the previous pass: `P' = P + factor · (avg(neighbours) − P)`.
#[derive(Debug)]
pub struct RelaxMesh<'a> {
    mesh: &'a QuadMesh,
    params: RelaxParams,
}

impl<'a> RelaxMesh<'a> {
    /// Creates a new relaxation operation.
    #[must_use]
    pub fn new(mesh: &'a QuadMesh, params: RelaxParams) -> Self {
        Self { mesh, params }
    }

    /// Executes the relaxation and returns the smoothed mesh with fresh
    /// normals.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid or the mesh has
    /// dangling indices.
    pub fn execute(&self) -> Result<QuadMesh> {
        self.params.validate()?;
        self.mesh.validate()?;

        let mut out = self.mesh.clone();
        if self.params.enabled && self.params.iterations > 0 && !out.is_empty() {
            let pinned = out.boundary_vertices();
            let neighbors = out.vertex_neighbors();
            let factor = self.params.factor;

            for _ in 0..self.params.iterations {
                let previous = out.vertices.clone();
                for (i, p) in out.vertices.iter_mut().enumerate() {
                    if pinned[i] || neighbors[i].is_empty() {
                        continue;
                    }
                    let sum = neighbors[i]
                        .iter()
                        .fold(Point3::origin().coords, |acc, &j| acc + previous[j as usize].coords);
                    #[allow(clippy::cast_precision_loss)]
                    let avg = sum / neighbors[i].len() as f64;
                    let old = previous[i].coords;
                    *p = Point3::from(old + (avg - old) * factor);
                }
            }
        }

        out.compute_normals();
        Ok(out)
    }
}
