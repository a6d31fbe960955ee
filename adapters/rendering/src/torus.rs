//! Tessellation of the grid onto a torus.
//!
//! Each grid cell becomes one quad. The seam column and row are duplicated so
//! texture coordinates run from 0 to 1 without wrapping inside a triangle.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Mat4, Vec2, Vec3};
use torus_life_core::GridSize;

use crate::RenderingError;

/// Distance from the torus centre to the centre of the tube.
pub const MAJOR_RADIUS: f32 = 2.0;

/// Radius of the tube.
pub const MINOR_RADIUS: f32 = 0.7;

/// Single vertex of the torus mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TorusVertex {
    /// Model-space position.
    pub position: Vec3,
    /// Texture coordinate into the grid texture, row zero at `v = 0`.
    pub uv: Vec2,
}

/// Indexed triangle list covering the torus.
#[derive(Clone, Debug, PartialEq)]
pub struct TorusMesh {
    /// Vertices laid out row by row, `columns + 1` per row.
    pub vertices: Vec<TorusVertex>,
    /// Two counter-clockwise triangles per grid cell.
    pub indices: Vec<u16>,
}

impl TorusMesh {
    /// Builds the torus for a grid of `size`.
    ///
    /// Row `j` of vertices sits at tube angle `(0.5 - j / rows) * 2π`, so
    /// row zero lies on the inner equator and the middle row on the outer
    /// one. The `u` coordinate is mirrored so the grid's right edge maps to
    /// the torus' right side once the model transform is applied.
    ///
    /// # Errors
    ///
    /// Returns [`RenderingError::MeshTooLarge`] when the vertex count exceeds
    /// what 16-bit indices can address.
    pub fn tessellate(size: GridSize) -> Result<Self, RenderingError> {
        let columns = size.columns();
        let rows = size.rows();
        let vertex_columns = columns as usize + 1;
        let vertex_rows = rows as usize + 1;
        let vertex_count = vertex_columns * vertex_rows;

        if vertex_count > usize::from(u16::MAX) + 1 {
            return Err(RenderingError::MeshTooLarge {
                columns,
                rows,
                vertices: vertex_count,
            });
        }

        let mut vertices = Vec::with_capacity(vertex_count);
        for j in 0..vertex_rows {
            let v = j as f32 / rows as f32;
            let (sin_minor, cos_minor) = ((0.5 - v) * TAU).sin_cos();
            let ring = MAJOR_RADIUS + MINOR_RADIUS * cos_minor;

            for i in 0..vertex_columns {
                let u = i as f32 / columns as f32;
                let (sin_major, cos_major) = (u * TAU).sin_cos();
                let position =
                    Vec3::new(ring * cos_major, ring * sin_major, MINOR_RADIUS * sin_minor);
                vertices.push(TorusVertex {
                    position,
                    uv: Vec2::new(1.0 - u, v),
                });
            }
        }

        let index = |i: usize, j: usize| (j * vertex_columns + i) as u16;
        let mut indices = Vec::with_capacity(size.cell_count() * 6);
        for j in 0..rows as usize {
            for i in 0..columns as usize {
                let i0 = index(i, j);
                let i1 = index(i + 1, j);
                let i2 = index(i, j + 1);
                let i3 = index(i + 1, j + 1);
                indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
            }
        }

        Ok(Self { vertices, indices })
    }

    /// Number of triangles in the mesh.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Model transform that stands the torus upright: a quarter turn about X.
#[must_use]
pub fn model_matrix() -> Mat4 {
    Mat4::from_rotation_x(FRAC_PI_2)
}

#[cfg(test)]
mod tests {
    use super::{model_matrix, TorusMesh, MAJOR_RADIUS, MINOR_RADIUS};
    use glam::Vec3;
    use torus_life_core::GridSize;

    #[test]
    fn row_zero_lies_on_the_inner_equator() {
        let mesh = TorusMesh::tessellate(GridSize::new(4, 4).expect("valid size"))
            .expect("small mesh");
        let first = mesh.vertices[0];
        assert!((first.position.length() - (MAJOR_RADIUS - MINOR_RADIUS)).abs() < 1e-5);
        assert_eq!(first.uv.x, 1.0);
        assert_eq!(first.uv.y, 0.0);

        // Middle row sits on the outer equator.
        let middle = mesh.vertices[2 * 5];
        assert!((middle.position.length() - (MAJOR_RADIUS + MINOR_RADIUS)).abs() < 1e-5);
    }

    #[test]
    fn model_matrix_turns_the_ring_plane_upright() {
        let rotated = model_matrix().transform_point3(Vec3::new(0.0, 1.0, 0.0));
        assert!(rotated.abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), 1e-6));
    }

    #[test]
    fn seam_vertices_coincide() {
        let mesh = TorusMesh::tessellate(GridSize::new(6, 3).expect("valid size"))
            .expect("small mesh");
        let first_column = mesh.vertices[0].position;
        let last_column = mesh.vertices[6].position;
        assert!(first_column.abs_diff_eq(last_column, 1e-5));
    }
}
