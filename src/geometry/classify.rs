//! Re-grouping a buffer by a per-triangle region predicate.

use std::sync::OnceLock;

use bevy::prelude::*;

use super::{GeometryBuffer, GeometryGroup};

/// Geometric facts about one triangle handed to a classifier.
#[derive(Clone, Copy, Debug)]
pub struct TriangleInfo {
    /// Triangle number in the source index order.
    pub index: usize,
    pub centroid: Vec3,
    /// Unit face normal (zero for degenerate triangles).
    pub normal: Vec3,
}

/// Sort triangles by region and emit one group per non-empty region.
///
/// `classify` returns a region index for every triangle; values at or above
/// `region_count` are clamped to the last region. Within a region the
/// original triangle order is kept, so the output is deterministic. Regions
/// without triangles produce no group.
///
/// Non-indexed input is treated as sequential triangles and comes out
/// indexed.
pub fn regroup_by_region(
    geometry: &GeometryBuffer,
    region_count: usize,
    mut classify: impl FnMut(&TriangleInfo) -> usize,
) -> GeometryBuffer {
    let triangles: Vec<[u32; 3]> = match geometry.indices() {
        Some(indices) => indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect(),
        None => (0..geometry.vertex_count() as u32 / 3)
            .map(|t| [t * 3, t * 3 + 1, t * 3 + 2])
            .collect(),
    };

    let last = region_count.saturating_sub(1);
    let mut buckets: Vec<Vec<[u32; 3]>> = vec![Vec::new(); region_count.max(1)];

    for (index, tri) in triangles.iter().enumerate() {
        let [a, b, c] = tri.map(|i| Vec3::from(geometry.positions[i as usize]));
        let info = TriangleInfo {
            index,
            centroid: (a + b + c) / 3.0,
            normal: (b - a).cross(c - a).normalize_or_zero(),
        };
        let region = classify(&info).min(last);
        buckets[region].push(*tri);
    }

    let mut indices = Vec::with_capacity(triangles.len() * 3);
    let mut groups = Vec::new();
    for (region, bucket) in buckets.iter().enumerate() {
        if bucket.is_empty() {
            continue;
        }
        let start = indices.len();
        indices.extend(bucket.iter().flatten());
        groups.push(GeometryGroup::new(start, indices.len() - start, region));
    }

    GeometryBuffer {
        positions: geometry.positions.clone(),
        normals: geometry.normals.clone(),
        uvs: geometry.uvs.clone(),
        colors: geometry.colors.clone(),
        color_ramp: geometry.color_ramp.clone(),
        indices: Some(indices),
        groups,
        bounds: OnceLock::new(),
    }
}
