use glam::Vec3;

/// Direction assigned to a vertex whose accumulated normal has zero length.
pub const FALLBACK_NORMAL: Vec3 = Vec3::Z;

/// Area-weighted: face normals are summed before normalizing. Triangles with
/// an index past the end of `positions` are skipped.
pub fn estimate_normals(positions: &[Vec3], triangles: &[[u32; 3]]) -> Vec<Vec3> {
    let mut accumulated = vec![Vec3::ZERO; positions.len()];
    let mut skipped = 0usize;

    for &[i0, i1, i2] in triangles {
        let (i0, i1, i2) = (i0 as usize, i1 as usize, i2 as usize);
        let (Some(&p0), Some(&p1), Some(&p2)) =
            (positions.get(i0), positions.get(i1), positions.get(i2))
        else {
            skipped += 1;
            continue;
        };

        let face = (p1 - p0).cross(p2 - p0);

        accumulated[i0] += face;
        accumulated[i1] += face;
        accumulated[i2] += face;
    }

    if skipped > 0 {
        log::warn!(
            "skipped {} triangle(s) referencing vertices beyond {}",
            skipped,
            positions.len()
        );
    }

    accumulated
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(FALLBACK_NORMAL))
        .collect()
}
