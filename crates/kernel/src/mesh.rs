//! Triangle mesh geometry.
//!
//! Meshes are taken as given: normal and texture-coordinate counts may not
//! match the positions, and indices may be negative or out of range. Every
//! consumer goes through [`MeshGeometry::triangles`], which yields only
//! well-formed index triples.

use serde::{Deserialize, Serialize};

use crate::geometry::point::{Point2d, Point3d};
use crate::geometry::transform::BoundingBox;
use crate::geometry::vector::Vec3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshGeometry {
    pub positions: Vec<Point3d>,
    /// Per-vertex normals. Either parallel to `positions` or empty.
    pub normals: Vec<Vec3>,
    pub texture_coordinates: Vec<Point2d>,
    /// Triangle list (groups of three). Empty means the positions themselves
    /// form consecutive triangles.
    pub triangle_indices: Vec<i32>,
}

impl MeshGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_indexed(&self) -> bool {
        !self.triangle_indices.is_empty()
    }

    /// Number of complete triangles described, valid or not.
    pub fn triangle_count(&self) -> usize {
        if self.is_indexed() {
            self.triangle_indices.len() / 3
        } else {
            self.positions.len() / 3
        }
    }

    pub fn add_vertex(&mut self, position: Point3d, normal: Vec3) -> i32 {
        let idx = self.positions.len() as i32;
        self.positions.push(position);
        self.normals.push(normal);
        idx
    }

    pub fn add_triangle(&mut self, i0: i32, i1: i32, i2: i32) {
        self.triangle_indices.extend_from_slice(&[i0, i1, i2]);
    }

    /// Well-formed triangles as position indices.
    ///
    /// Indexed meshes drop any triple with a negative or out-of-range index
    /// and ignore a trailing partial triple; non-indexed meshes use
    /// consecutive position triples.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let count = self.positions.len();
        let (indexed, consecutive) = if self.is_indexed() {
            (Some(self.triangle_indices.chunks_exact(3)), None)
        } else {
            (None, Some(0..count / 3))
        };
        let to_index = move |i: i32| usize::try_from(i).ok().filter(|&i| i < count);

        indexed
            .into_iter()
            .flatten()
            .filter_map(move |tri| Some([to_index(tri[0])?, to_index(tri[1])?, to_index(tri[2])?]))
            .chain(
                consecutive
                    .into_iter()
                    .flatten()
                    .map(|t| [3 * t, 3 * t + 1, 3 * t + 2]),
            )
    }

    /// Vertices not referenced by any well-formed triangle.
    pub fn unreferenced_vertices(&self) -> Vec<usize> {
        let mut used = vec![false; self.positions.len()];
        for tri in self.triangles() {
            for i in tri {
                used[i] = true;
            }
        }
        used.iter()
            .enumerate()
            .filter_map(|(i, &u)| (!u).then_some(i))
            .collect()
    }

    /// Bounds of the finite positions.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(&self.positions)
    }
}
