mod relax;
mod weld;

pub use relax::{RelaxMesh, RelaxParams};

use std::collections::HashMap;

use crate::error::{MeshError, Result};
use crate::math::{Point3, Vector3, UP};

/// A quad-only surface mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuadMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Vertex normals (empty until [`QuadMesh::compute_normals`] runs).
    pub normals: Vec<Vector3>,
    /// Quad indices (each 4-tuple defines a face).
    pub faces: Vec<[u32; 4]>,
}

/// A mesh tagged with the road level it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelMesh {
    pub level: i32,
    pub mesh: QuadMesh,
}

impl QuadMesh {
    /// Creates an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Adds a vertex and returns its index.
    #[allow(clippy::cast_possible_truncation)]
    pub fn add_vertex(&mut self, p: Point3) -> u32 {
        self.vertices.push(p);
        (self.vertices.len() - 1) as u32
    }

    /// Adds a face over existing vertices.
    pub fn add_face(&mut self, face: [u32; 4]) {
        self.faces.push(face);
    }

    /// Adds a face with four new vertices.
    pub fn add_quad(&mut self, corners: [Point3; 4]) {
        let face = corners.map(|p| self.add_vertex(p));
        self.faces.push(face);
    }

    /// Appends another mesh without merging any vertices.
    #[allow(clippy::cast_possible_truncation)]
    pub fn append(&mut self, other: &QuadMesh) {
        let offset = self.vertices.len() as u32;
        let keep_normals = self.normals.len() == self.vertices.len()
            && other.normals.len() == other.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);
        if keep_normals {
            self.normals.extend_from_slice(&other.normals);
        } else {
            self.normals.clear();
        }
        self.faces
            .extend(other.faces.iter().map(|f| f.map(|i| i + offset)));
    }

    /// Un-normalised face normal by Newell's method (length = 2 × area).
    #[must_use]
    pub fn face_normal(&self, face: &[u32; 4]) -> Vector3 {
        let mut n = Vector3::zeros();
        for k in 0..4 {
            let a = self.vertices[face[k] as usize];
            let b = self.vertices[face[(k + 1) % 4] as usize];
            n.x += (a.y - b.y) * (a.z + b.z);
            n.y += (a.z - b.z) * (a.x + b.x);
            n.z += (a.x - b.x) * (a.y + b.y);
        }
        n
    }

    /// Recomputes area-weighted vertex normals. Isolated vertices get [`UP`].
    pub fn compute_normals(&mut self) {
        let mut normals = vec![Vector3::zeros(); self.vertices.len()];
        for face in &self.faces {
            let n = self.face_normal(face);
            for &i in face {
                normals[i as usize] += n;
            }
        }
        for n in &mut normals {
            let len = n.norm();
            *n = if len > 1e-12 { *n / len } else { UP };
        }
        self.normals = normals;
    }

    /// Checks that every face references four distinct, existing vertices.
    ///
    /// # Errors
    ///
    /// Returns `MeshError::IndexOutOfRange` for a dangling index and
    /// `MeshError::Failed` for a face that repeats a vertex.
    pub fn validate(&self) -> Result<()> {
        let count = self.vertices.len();
        for face in &self.faces {
            for &index in face {
                if index as usize >= count {
                    return Err(MeshError::IndexOutOfRange { index, count }.into());
                }
            }
            if has_repeated_index(face) {
                return Err(MeshError::Failed(format!("face {face:?} repeats a vertex")).into());
            }
        }
        Ok(())
    }

    /// Returns `true` if [`QuadMesh::validate`] passes.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Counts how many faces use each undirected edge.
    #[must_use]
    pub fn edge_face_counts(&self) -> HashMap<(u32, u32), usize> {
        let mut counts = HashMap::new();
        for face in &self.faces {
            for k in 0..4 {
                let (a, b) = (face[k], face[(k + 1) % 4]);
                *counts.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Flags vertices lying on a naked edge (an edge used by one face).
    #[must_use]
    pub fn boundary_vertices(&self) -> Vec<bool> {
        let mut boundary = vec![false; self.vertices.len()];
        for ((a, b), count) in self.edge_face_counts() {
            if count == 1 {
                boundary[a as usize] = true;
                boundary[b as usize] = true;
            }
        }
        boundary
    }

    /// Topological neighbours of every vertex, sorted and deduplicated.
    #[must_use]
    pub fn vertex_neighbors(&self) -> Vec<Vec<u32>> {
        let mut neighbors = vec![Vec::new(); self.vertices.len()];
        for face in &self.faces {
            for k in 0..4 {
                let (a, b) = (face[k], face[(k + 1) % 4]);
                neighbors[a as usize].push(b);
                neighbors[b as usize].push(a);
            }
        }
        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }
        neighbors
    }

    /// Returns a copy with every vertex mapped through `f`.
    #[must_use]
    pub fn map_points<F>(&self, f: F) -> Self
    where
        F: Fn(&Point3) -> Point3,
    {
        Self {
            vertices: self.vertices.iter().map(f).collect(),
            normals: Vec::new(),
            faces: self.faces.clone(),
        }
    }
}

fn has_repeated_index(face: &[u32; 4]) -> bool {
    (0..4).any(|i| ((i + 1)..4).any(|j| face[i] == face[j]))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// 2×1 grid of unit quads.
    pub(crate) fn grid() -> QuadMesh {
        let mut m = QuadMesh::new();
        for y in 0..2 {
            for x in 0..3 {
                m.add_vertex(Point3::new(f64::from(x), f64::from(y), 0.0));
            }
        }
        m.add_face([0, 1, 4, 3]);
        m.add_face([1, 2, 5, 4]);
        m
    }

    #[test]
    fn newell_normal_points_up_for_ccw() {
        let m = grid();
        let n = m.face_normal(&m.faces[0]);
        assert!((n - Vector3::new(0.0, 0.0, 2.0)).norm() < 1e-12);
    }

    #[test]
    fn boundary_of_grid() {
        let m = grid();
        assert!(m.boundary_vertices().iter().all(|&b| b));
        let counts = m.edge_face_counts();
        assert_eq!(counts[&(1, 4)], 2);
    }

    #[test]
    fn append_offsets_indices() {
        let mut a = grid();
        let b = grid();
        a.append(&b);
        assert_eq!(a.vertex_count(), 12);
        assert_eq!(a.faces[2], [6, 7, 10, 9]);
        assert!(a.is_valid());
    }

    #[test]
    fn validate_catches_bad_faces() {
        let mut m = grid();
        m.add_face([0, 1, 1, 3]);
        assert!(m.validate().is_err());

        let mut m = grid();
        m.add_face([0, 1, 2, 99]);
        assert!(m.validate().is_err());
    }

    #[test]
    fn normals_are_unit() {
        let mut m = grid();
        m.compute_normals();
        assert_eq!(m.normals.len(), 6);
        for n in &m.normals {
            assert!((n - UP).norm() < 1e-12);
        }
    }
}
