use glam::Vec3;

use crate::geometry::normals::estimate_normals;

/// Positions and triangles as they come out of a surface tessellation.
#[derive(Debug, Clone, PartialEq)]
pub struct Tessellation {
    pub positions: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

/// A tessellation with one estimated normal per vertex, ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

impl TriangleMesh {
    pub fn from_tessellation(tessellation: Tessellation) -> Self {
        let normals = estimate_normals(&tessellation.positions, &tessellation.triangles);

        Self {
            positions: tessellation.positions,
            normals,
            triangles: tessellation.triangles,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn index_count(&self) -> u32 {
        (self.triangles.len() * 3) as u32
    }

    pub fn positions_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn normals_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.normals)
    }

    pub fn indices_flat(&self) -> &[u32] {
        bytemuck::cast_slice(&self.triangles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_triangle() -> Tessellation {
        Tessellation {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            triangles: vec![[0, 1, 2]],
        }
    }

    #[test]
    fn from_tessellation_attaches_one_normal_per_vertex() {
        let mesh = TriangleMesh::from_tessellation(single_triangle());

        assert_eq!(mesh.normals.len(), mesh.positions.len());
        for n in &mesh.normals {
            assert!(n.abs_diff_eq(Vec3::Z, 1e-6));
        }
    }

    #[test]
    fn flat_views_are_interleaved_components() {
        let mesh = TriangleMesh::from_tessellation(single_triangle());

        assert_eq!(
            mesh.positions_flat(),
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        );
        assert_eq!(mesh.indices_flat(), &[0, 1, 2]);
        assert_eq!(mesh.normals_flat().len(), 9);
        assert_eq!(mesh.index_count(), 3);
    }
}
