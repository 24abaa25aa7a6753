use std::collections::HashMap;

use crate::math::{Point3, Vector3};

use super::{has_repeated_index, QuadMesh};

/// Faces whose doubled area falls below this are dropped as degenerate.
const MIN_DOUBLE_AREA: f64 = 1e-12;

type Cell = (i64, i64, i64);

#[allow(clippy::cast_possible_truncation)]
fn cell_of(p: &Point3, size: f64) -> Cell {
    (
        (p.x / size).floor() as i64,
        (p.y / size).floor() as i64,
        (p.z / size).floor() as i64,
    )
}

impl QuadMesh {
    /// Merges vertices closer than `tolerance`, keeping the first occurrence.
    ///
    /// Faces are re-indexed onto the surviving vertices; unreferenced
    /// vertices remain until [`QuadMesh::compact`].
    pub fn weld(&mut self, tolerance: f64) {
        let size = tolerance.max(f64::EPSILON);
        let mut grid: HashMap<Cell, Vec<u32>> = HashMap::new();
        let mut remap: Vec<u32> = Vec::with_capacity(self.vertices.len());

        for (i, p) in self.vertices.iter().enumerate() {
            let (cx, cy, cz) = cell_of(p, size);
            let mut found = None;
            'search: for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        let Some(bucket) = grid.get(&(cx + dx, cy + dy, cz + dz)) else {
                            continue;
                        };
                        for &j in bucket {
                            if (self.vertices[j as usize] - p).norm() <= tolerance {
                                found = Some(j);
                                break 'search;
                            }
                        }
                    }
                }
            }
            #[allow(clippy::cast_possible_truncation)]
            let target = found.unwrap_or(i as u32);
            if found.is_none() {
                grid.entry((cx, cy, cz)).or_default().push(target);
            }
            remap.push(target);
        }

        for face in &mut self.faces {
            *face = face.map(|i| remap[i as usize]);
        }
        self.normals.clear();
    }

    /// Drops faces that repeat a vertex or have (near) zero area.
    pub fn remove_degenerate_faces(&mut self) {
        let keep: Vec<bool> = self
            .faces
            .iter()
            .map(|f| !has_repeated_index(f) && self.face_normal(f).norm() > MIN_DOUBLE_AREA)
            .collect();
        let mut it = keep.iter();
        self.faces.retain(|_| it.next().copied().unwrap_or(false));
    }

    /// Reverses faces whose normal points against `up`.
    pub fn unify_orientation(&mut self, up: &Vector3) {
        let flips: Vec<bool> = self
            .faces
            .iter()
            .map(|f| self.face_normal(f).dot(up) < 0.0)
            .collect();
        for (face, flip) in self.faces.iter_mut().zip(flips) {
            if flip {
                *face = [face[0], face[3], face[2], face[1]];
            }
        }
    }

    /// Removes vertices no face references and re-indexes the faces.
    #[allow(clippy::cast_possible_truncation)]
    pub fn compact(&mut self) {
        let mut used = vec![false; self.vertices.len()];
        for face in &self.faces {
            for &i in face {
                used[i as usize] = true;
            }
        }

        let mut remap = vec![u32::MAX; self.vertices.len()];
        let mut vertices = Vec::new();
        let mut normals = Vec::new();
        let keep_normals = self.normals.len() == self.vertices.len();
        for (i, p) in self.vertices.iter().enumerate() {
            if used[i] {
                remap[i] = vertices.len() as u32;
                vertices.push(*p);
                if keep_normals {
                    normals.push(self.normals[i]);
                }
            }
        }

        for face in &mut self.faces {
            *face = face.map(|i| remap[i as usize]);
        }
        self.vertices = vertices;
        self.normals = normals;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::tests::grid;
    use super::*;
    use crate::math::UP;

    #[test]
    fn welding_two_touching_grids() {
        let mut a = grid();
        let b = grid().map_points(|p| Point3::new(p.x + 2.0, p.y, p.z));
        a.append(&b);
        assert_eq!(a.vertex_count(), 12);

        a.weld(1e-6);
        a.compact();
        assert_eq!(a.vertex_count(), 10);
        assert_eq!(a.face_count(), 4);
        assert!(a.is_valid());
    }

    #[test]
    fn welding_respects_tolerance() {
        let mut a = grid();
        let b = grid().map_points(|p| Point3::new(p.x + 2.001, p.y, p.z));
        a.append(&b);
        a.weld(1e-6);
        a.compact();
        assert_eq!(a.vertex_count(), 12);
    }

    #[test]
    fn collapsed_faces_are_removed() {
        let mut m = QuadMesh::new();
        m.add_quad([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1e-9, 0.0),
            Point3::new(0.0, 1e-9, 0.0),
        ]);
        m.weld(1e-6);
        m.remove_degenerate_faces();
        m.compact();
        assert!(m.is_empty());
        assert_eq!(m.vertex_count(), 0);
    }

    #[test]
    fn orientation_is_unified() {
        let mut m = grid();
        m.faces[1] = [1, 4, 5, 2];
        m.unify_orientation(&UP);
        for f in &m.faces {
            assert!(m.face_normal(f).z > 0.0);
        }
    }
}
