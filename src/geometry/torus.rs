use std::f32::consts::TAU;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::mesh::Tessellation;

pub const MIN_SEGMENTS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl MeshError {
    fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TorusParams {
    pub major_radius: f32,
    pub minor_radius: f32,
    pub major_segments: u32,
    pub minor_segments: u32,
}

impl Default for TorusParams {
    fn default() -> Self {
        Self {
            major_radius: 1.0,
            minor_radius: 0.2,
            major_segments: 50,
            minor_segments: 50,
        }
    }
}

impl TorusParams {
    pub fn validate(&self) -> Result<(), MeshError> {
        check_radius("major_radius", self.major_radius)?;
        check_radius("minor_radius", self.minor_radius)?;
        check_segments("major_segments", self.major_segments)?;
        check_segments("minor_segments", self.minor_segments)?;

        // 2*M*N triangles, three u32 indices each
        let indices = self.major_segments as u64 * self.minor_segments as u64 * 6;
        if indices > u32::MAX as u64 {
            return Err(MeshError::invalid(
                "major_segments",
                format!(
                    "{}x{} segments exceed the u32 index range",
                    self.major_segments, self.minor_segments
                ),
            ));
        }

        Ok(())
    }

    pub fn vertex_count(&self) -> usize {
        self.major_segments as usize * self.minor_segments as usize
    }

    pub fn triangle_count(&self) -> usize {
        self.vertex_count() * 2
    }

    pub fn generate(&self) -> Result<Tessellation, MeshError> {
        generate(
            self.major_radius,
            self.minor_radius,
            self.major_segments,
            self.minor_segments,
        )
    }
}

fn check_radius(name: &'static str, value: f32) -> Result<(), MeshError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MeshError::invalid(
            name,
            format!("must be a finite positive number, got {}", value),
        ))
    }
}

fn check_segments(name: &'static str, value: u32) -> Result<(), MeshError> {
    if value >= MIN_SEGMENTS {
        Ok(())
    } else {
        Err(MeshError::invalid(
            name,
            format!("must be at least {}, got {}", MIN_SEGMENTS, value),
        ))
    }
}

/// Vertex `(i, j)` sits at `i * N + j`; both seams wrap, so no vertex is
/// duplicated. Triangles are counter-clockwise seen from outside the tube.
pub fn generate(
    major_radius: f32,
    minor_radius: f32,
    major_segments: u32,
    minor_segments: u32,
) -> Result<Tessellation, MeshError> {
    let params = TorusParams {
        major_radius,
        minor_radius,
        major_segments,
        minor_segments,
    };
    params.validate()?;

    let (m, n) = (major_segments, minor_segments);

    let mut positions = Vec::with_capacity(params.vertex_count());
    for i in 0..m {
        let u = TAU * i as f32 / m as f32;
        let (sin_u, cos_u) = u.sin_cos();

        for j in 0..n {
            let v = TAU * j as f32 / n as f32;
            let (sin_v, cos_v) = v.sin_cos();

            let ring = major_radius + minor_radius * cos_v;
            positions.push(Vec3::new(ring * cos_u, ring * sin_u, minor_radius * sin_v));
        }
    }

    let mut triangles = Vec::with_capacity(params.triangle_count());
    for i in 0..m {
        let next_i = (i + 1) % m;

        for j in 0..n {
            let next_j = (j + 1) % n;

            let a = i * n + j;
            let b = next_i * n + j;
            let c = next_i * n + next_j;
            let d = i * n + next_j;

            triangles.push([a, b, d]);
            triangles.push([b, c, d]);
        }
    }

    Ok(Tessellation {
        positions,
        triangles,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn sizes_match_segment_counts() {
        for (m, n) in [(3, 3), (4, 4), (5, 7), (12, 3), (50, 50)] {
            let mesh = generate(1.0, 0.25, m, n).unwrap();
            let mn = (m * n) as usize;

            assert_eq!(mesh.positions.len(), mn, "positions for {}x{}", m, n);
            assert_eq!(mesh.triangles.len(), 2 * mn, "triangles for {}x{}", m, n);
        }
    }

    #[test]
    fn every_index_addresses_a_vertex() {
        let mesh = generate(2.0, 0.5, 9, 6).unwrap();
        let count = mesh.positions.len() as u32;

        assert!(mesh.triangles.iter().flatten().all(|&i| i < count));
    }

    #[test]
    fn surface_is_closed_and_consistently_wound() {
        for (m, n) in [(3, 3), (4, 4), (5, 7), (8, 3)] {
            let mesh = generate(1.0, 0.3, m, n).unwrap();

            let mut directed: HashMap<(u32, u32), usize> = HashMap::new();
            for t in &mesh.triangles {
                for k in 0..3 {
                    *directed.entry((t[k], t[(k + 1) % 3])).or_default() += 1;
                }
            }

            for (&(a, b), &count) in &directed {
                assert_eq!(count, 1, "directed edge {}->{} repeated ({}x{})", a, b, m, n);
                assert_eq!(
                    directed.get(&(b, a)),
                    Some(&1),
                    "edge {}-{} has no opposite half ({}x{})",
                    a,
                    b,
                    m,
                    n
                );
            }
            // V - E + F = 0 for a torus
            let edges = directed.len() / 2;
            assert_eq!(
                mesh.positions.len() + mesh.triangles.len(),
                edges,
                "euler characteristic ({}x{})",
                m,
                n
            );
        }
    }

    #[test]
    fn small_ring_has_expected_corner_vertices() {
        let mesh = generate(1.0, 0.2, 4, 4).unwrap();

        assert_eq!(mesh.positions.len(), 16);
        assert_eq!(mesh.triangles.len(), 32);

        let v0 = mesh.positions[0];
        assert_abs_diff_eq!(v0.x, 1.2, epsilon = 1e-6);
        assert_abs_diff_eq!(v0.y, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(v0.z, 0.0, epsilon = 1e-6);

        let v4 = mesh.positions[4];
        assert_abs_diff_eq!(v4.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(v4.y, 1.2, epsilon = 1e-6);
        assert_abs_diff_eq!(v4.z, 0.0, epsilon = 1e-6);

        // top of the tube at u = 0, v = pi/2
        let v1 = mesh.positions[1];
        assert_abs_diff_eq!(v1.x, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(v1.z, 0.2, epsilon = 1e-6);
    }

    #[test]
    fn first_quad_is_split_along_b_d() {
        let mesh = generate(1.0, 0.2, 4, 4).unwrap();

        assert_eq!(mesh.triangles[0], [0, 4, 1]);
        assert_eq!(mesh.triangles[1], [4, 5, 1]);
    }

    #[test]
    fn last_quad_wraps_in_both_directions() {
        let mesh = generate(1.0, 0.2, 4, 4).unwrap();
        let last = mesh.triangles.len();

        // quad (3, 3): a = 15, b = 3, c = 0, d = 12
        assert_eq!(mesh.triangles[last - 2], [15, 3, 12]);
        assert_eq!(mesh.triangles[last - 1], [3, 0, 12]);
    }

    #[test]
    fn too_few_segments_is_rejected() {
        let err = generate(1.0, 0.2, 2, 4).unwrap_err();
        assert!(matches!(
            err,
            MeshError::InvalidParameter {
                name: "major_segments",
                ..
            }
        ));

        let err = generate(1.0, 0.2, 4, 0).unwrap_err();
        assert!(matches!(
            err,
            MeshError::InvalidParameter {
                name: "minor_segments",
                ..
            }
        ));
    }

    #[test]
    fn non_positive_or_non_finite_radius_is_rejected() {
        for (big, small) in [
            (0.0, 0.2),
            (-1.0, 0.2),
            (1.0, 0.0),
            (1.0, -0.5),
            (f32::NAN, 0.2),
            (1.0, f32::INFINITY),
        ] {
            assert!(
                generate(big, small, 8, 8).is_err(),
                "R = {}, r = {} should fail",
                big,
                small
            );
        }
    }

    #[test]
    fn spindle_torus_is_accepted() {
        let mesh = generate(0.5, 1.0, 16, 16).unwrap();
        assert_eq!(mesh.positions.len(), 256);
    }

    #[test]
    fn oversized_grid_is_rejected_before_allocating() {
        let params = TorusParams {
            major_segments: 100_000,
            minor_segments: 100_000,
            ..TorusParams::default()
        };

        assert!(params.validate().is_err());
    }

    #[test]
    fn error_message_names_the_parameter() {
        let err = generate(1.0, 0.2, 2, 4).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid parameter `major_segments`: must be at least 3, got 2"
        );
    }

    #[test]
    fn params_generate_matches_free_function() {
        let params = TorusParams::default();
        assert_eq!(params.generate().unwrap(), generate(1.0, 0.2, 50, 50).unwrap());
    }
}
