//! Grouped triangle buffer shared by every builder.

use std::sync::OnceLock;

use bevy::asset::RenderAssetUsages;
use bevy::math::bounding::Aabb3d;
use bevy::mesh::{Indices, Mesh, PrimitiveTopology};
use bevy::prelude::*;

/// A contiguous run of the index buffer tagged with one region index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeometryGroup {
    /// Offset into the index array.
    pub start: usize,
    /// Number of indices in the run (a multiple of 3).
    pub count: usize,
    /// Region / material slot of every triangle in the run.
    pub material_index: usize,
}

impl GeometryGroup {
    pub const fn new(start: usize, count: usize, material_index: usize) -> Self {
        Self {
            start,
            count,
            material_index,
        }
    }

    /// One past the last index of the run.
    #[inline]
    pub const fn end(&self) -> usize {
        self.start + self.count
    }
}

/// Vertex and index data plus a group table.
///
/// Optional attributes are empty when absent: a buffer either has one entry
/// per vertex for an attribute or none at all.
#[derive(Clone, Debug, Default)]
pub struct GeometryBuffer {
    pub(super) positions: Vec<[f32; 3]>,
    pub(super) normals: Vec<[f32; 3]>,
    pub(super) uvs: Vec<[f32; 2]>,
    pub(super) colors: Vec<[f32; 4]>,
    pub(super) color_ramp: Vec<f32>,
    pub(super) indices: Option<Vec<u32>>,
    pub(super) groups: Vec<GeometryGroup>,
    pub(super) bounds: OnceLock<Option<Aabb3d>>,
}

impl PartialEq for GeometryBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.positions == other.positions
            && self.normals == other.normals
            && self.uvs == other.uvs
            && self.colors == other.colors
            && self.color_ramp == other.color_ramp
            && self.indices == other.indices
            && self.groups == other.groups
    }
}

impl GeometryBuffer {
    /// Create a buffer from positions and an optional index list.
    ///
    /// Normals are zero-filled; call [`compute_vertex_normals`](Self::compute_vertex_normals)
    /// or [`set_normals`](Self::set_normals) afterwards.
    pub fn new(positions: Vec<[f32; 3]>, indices: Option<Vec<u32>>) -> Self {
        let normals = vec![[0.0; 3]; positions.len()];
        Self {
            positions,
            normals,
            indices,
            ..Default::default()
        }
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    pub fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }

    /// Linear-space vertex colors.
    pub fn colors(&self) -> &[[f32; 4]] {
        &self.colors
    }

    /// Mutable vertex colors for in-place recoloring. Length is fixed.
    pub fn colors_mut(&mut self) -> &mut [[f32; 4]] {
        &mut self.colors
    }

    /// Per-vertex ramp parameter cached by gradient-colored builders.
    pub fn color_ramp(&self) -> &[f32] {
        &self.color_ramp
    }

    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    pub fn groups(&self) -> &[GeometryGroup] {
        &self.groups
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.as_ref().map(|i| i.len()).unwrap_or(0)
    }

    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.triangle_count() == 0
    }

    /// Replace all normals.
    ///
    /// # Panics
    /// Panics if the length does not match the vertex count.
    pub fn set_normals(&mut self, normals: Vec<[f32; 3]>) {
        assert_eq!(
            normals.len(),
            self.positions.len(),
            "Normal count ({}) must match vertex count ({})",
            normals.len(),
            self.positions.len()
        );
        self.normals = normals;
    }

    /// Replace all UVs. An empty vector removes the attribute.
    pub fn set_uvs(&mut self, uvs: Vec<[f32; 2]>) {
        assert!(
            uvs.is_empty() || uvs.len() == self.positions.len(),
            "UV count ({}) must match vertex count ({})",
            uvs.len(),
            self.positions.len()
        );
        self.uvs = uvs;
    }

    /// Replace all vertex colors. An empty vector removes the attribute.
    pub fn set_colors(&mut self, colors: Vec<[f32; 4]>) {
        assert!(
            colors.is_empty() || colors.len() == self.positions.len(),
            "Color count ({}) must match vertex count ({})",
            colors.len(),
            self.positions.len()
        );
        self.colors = colors;
    }

    /// Replace the per-vertex color ramp. An empty vector removes it.
    pub fn set_color_ramp(&mut self, ramp: Vec<f32>) {
        assert!(
            ramp.is_empty() || ramp.len() == self.positions.len(),
            "Ramp count ({}) must match vertex count ({})",
            ramp.len(),
            self.positions.len()
        );
        self.color_ramp = ramp;
    }

    /// Rewrite vertex colors from the cached ramp. No-op without a ramp.
    pub fn recolor_from_ramp(&mut self, color_at: impl Fn(f32) -> [f32; 4]) {
        if self.color_ramp.is_empty() {
            return;
        }
        self.colors = self.color_ramp.iter().map(|&t| color_at(t)).collect();
    }

    pub fn add_group(&mut self, start: usize, count: usize, material_index: usize) {
        self.groups
            .push(GeometryGroup::new(start, count, material_index));
    }

    pub fn set_groups(&mut self, groups: Vec<GeometryGroup>) {
        self.groups = groups;
    }

    pub fn clear_groups(&mut self) {
        self.groups.clear();
    }

    /// Whether the groups partition the index buffer with no gaps or overlaps.
    pub fn is_fully_grouped(&self) -> bool {
        let Some(indices) = &self.indices else {
            return false;
        };
        let mut sorted = self.groups.clone();
        sorted.sort_by_key(|g| g.start);

        let mut cursor = 0;
        for group in &sorted {
            if group.start != cursor {
                return false;
            }
            cursor = group.end();
        }
        cursor == indices.len()
    }

    /// The group containing the given triangle, if any.
    pub fn group_for_triangle(&self, triangle: usize) -> Option<&GeometryGroup> {
        let offset = triangle * 3;
        self.groups
            .iter()
            .find(|g| offset >= g.start && offset < g.end())
    }

    /// Apply an affine transform to positions and normals.
    pub fn apply_transform(&mut self, transform: &Mat4) {
        for p in &mut self.positions {
            *p = transform.transform_point3(Vec3::from(*p)).to_array();
        }

        let linear = Mat3::from_mat4(*transform);
        let normal_matrix = if linear.determinant().abs() > f32::EPSILON {
            linear.inverse().transpose()
        } else {
            linear
        };
        for n in &mut self.normals {
            *n = (normal_matrix * Vec3::from(*n))
                .normalize_or_zero()
                .to_array();
        }

        self.invalidate_bounds();
    }

    /// Recompute area-weighted smooth vertex normals from the triangles.
    ///
    /// Vertices not referenced by any triangle get `+Y`.
    pub fn compute_vertex_normals(&mut self) {
        let mut accum = vec![Vec3::ZERO; self.positions.len()];

        let mut add_triangle = |a: usize, b: usize, c: usize| {
            let pa = Vec3::from(self.positions[a]);
            let pb = Vec3::from(self.positions[b]);
            let pc = Vec3::from(self.positions[c]);
            let face = (pb - pa).cross(pc - pa);
            accum[a] += face;
            accum[b] += face;
            accum[c] += face;
        };

        match &self.indices {
            Some(indices) => {
                for tri in indices.chunks_exact(3) {
                    add_triangle(tri[0] as usize, tri[1] as usize, tri[2] as usize);
                }
            }
            None => {
                for start in (0..self.positions.len() / 3).map(|t| t * 3) {
                    add_triangle(start, start + 1, start + 2);
                }
            }
        }

        self.normals = accum
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
            .collect();
    }

    /// Copy that keeps only vertices referenced by the index buffer.
    ///
    /// Vertex order follows first use. Groups are unchanged since index
    /// positions do not move. Non-indexed buffers are returned as-is.
    pub fn compacted(&self) -> GeometryBuffer {
        let Some(indices) = &self.indices else {
            return self.clone();
        };

        let mut remap = vec![u32::MAX; self.positions.len()];
        let mut order = Vec::new();
        let mut new_indices = Vec::with_capacity(indices.len());
        for &idx in indices {
            let slot = &mut remap[idx as usize];
            if *slot == u32::MAX {
                *slot = order.len() as u32;
                order.push(idx as usize);
            }
            new_indices.push(*slot);
        }

        let pick = |len: usize| len > 0;
        GeometryBuffer {
            positions: order.iter().map(|&i| self.positions[i]).collect(),
            normals: order.iter().map(|&i| self.normals[i]).collect(),
            uvs: if pick(self.uvs.len()) {
                order.iter().map(|&i| self.uvs[i]).collect()
            } else {
                Vec::new()
            },
            colors: if pick(self.colors.len()) {
                order.iter().map(|&i| self.colors[i]).collect()
            } else {
                Vec::new()
            },
            color_ramp: if pick(self.color_ramp.len()) {
                order.iter().map(|&i| self.color_ramp[i]).collect()
            } else {
                Vec::new()
            },
            indices: Some(new_indices),
            groups: self.groups.clone(),
            bounds: OnceLock::new(),
        }
    }

    /// Convert to a Bevy triangle-list [`Mesh`].
    ///
    /// Groups are not represented; use one mesh per region for multi-material
    /// rendering.
    pub fn to_mesh(&self) -> Mesh {
        let mut mesh = Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
        );

        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, self.positions.clone());
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, self.normals.clone());
        if !self.uvs.is_empty() {
            mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, self.uvs.clone());
        }
        if !self.colors.is_empty() {
            mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, self.colors.clone());
        }
        if let Some(indices) = &self.indices {
            mesh.insert_indices(Indices::U32(indices.clone()));
        }

        mesh
    }

    /// Raw bytes of the position attribute.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Raw bytes of the index buffer (empty when non-indexed).
    pub fn index_bytes(&self) -> &[u8] {
        self.indices
            .as_deref()
            .map(bytemuck::cast_slice::<u32, u8>)
            .unwrap_or(&[])
    }

    /// FNV-1a hash over every attribute, the indices and the group table.
    ///
    /// Equal fingerprints for equal builder parameters are the determinism
    /// contract of the builders.
    pub fn fingerprint(&self) -> u64 {
        const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0100_0000_01b3;

        let mut hash = OFFSET;
        let mut feed = |bytes: &[u8]| {
            for &b in bytes {
                hash ^= b as u64;
                hash = hash.wrapping_mul(PRIME);
            }
        };

        feed(self.position_bytes());
        feed(bytemuck::cast_slice(&self.normals));
        feed(bytemuck::cast_slice(&self.uvs));
        feed(bytemuck::cast_slice(&self.colors));
        feed(bytemuck::cast_slice(&self.color_ramp));
        feed(self.index_bytes());
        for group in &self.groups {
            let words = [group.start as u64, group.count as u64, group.material_index as u64];
            feed(bytemuck::cast_slice(&words));
        }

        hash
    }

    pub(super) fn invalidate_bounds(&mut self) {
        self.bounds = OnceLock::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> GeometryBuffer {
        let mut g = GeometryBuffer::new(
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            Some(vec![0, 1, 2, 0, 2, 3]),
        );
        g.add_group(0, 3, 0);
        g.add_group(3, 3, 1);
        g
    }

    #[test]
    fn test_fully_grouped() {
        let g = quad();
        assert!(g.is_fully_grouped());

        let mut gap = quad();
        gap.set_groups(vec![GeometryGroup::new(3, 3, 0)]);
        assert!(!gap.is_fully_grouped());
    }

    #[test]
    fn test_compute_vertex_normals_flat_quad() {
        let mut g = quad();
        g.compute_vertex_normals();
        for n in g.normals() {
            assert!((Vec3::from(*n) - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn test_unreferenced_vertex_gets_up_normal() {
        let mut g = GeometryBuffer::new(
            vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [5.0, 5.0, 5.0]],
            Some(vec![0, 1, 2]),
        );
        g.compute_vertex_normals();
        assert_eq!(g.normals()[3], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_apply_transform_rotates_normals() {
        let mut g = quad();
        g.compute_vertex_normals();
        g.apply_transform(&Mat4::from_rotation_y(std::f32::consts::PI));
        for n in g.normals() {
            assert!((Vec3::from(*n) + Vec3::Z).length() < 1e-5);
        }
        assert!((g.positions()[1][0] + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_compacted_drops_unused_vertices() {
        let g = GeometryBuffer::new(
            vec![[9.0; 3], [0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            Some(vec![1, 2, 3]),
        );
        let c = g.compacted();
        assert_eq!(c.vertex_count(), 3);
        assert_eq!(c.indices(), Some(&[0u32, 1, 2][..]));
        assert_eq!(c.positions()[0], [0.0; 3]);
    }

    #[test]
    fn test_group_for_triangle() {
        let g = quad();
        assert_eq!(g.group_for_triangle(0).map(|g| g.material_index), Some(0));
        assert_eq!(g.group_for_triangle(1).map(|g| g.material_index), Some(1));
        assert!(g.group_for_triangle(2).is_none());
    }

    #[test]
    fn test_fingerprint_tracks_groups() {
        let a = quad();
        let mut b = quad();
        assert_eq!(a.fingerprint(), b.fingerprint());
        b.set_groups(vec![GeometryGroup::new(0, 6, 0)]);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_to_mesh_carries_indices() {
        let mesh = quad().to_mesh();
        assert_eq!(mesh.indices().map(|i| i.len()), Some(6));
        assert_eq!(mesh.count_vertices(), 4);
    }

    #[test]
    fn test_recolor_from_ramp() {
        let mut g = quad();
        g.recolor_from_ramp(|_| [1.0; 4]);
        assert!(g.colors().is_empty());

        g.set_color_ramp(vec![0.0, 0.0, 1.0, 1.0]);
        g.recolor_from_ramp(|t| [t, 0.0, 0.0, 1.0]);
        assert_eq!(g.colors()[2], [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(g.colors()[0][0], 0.0);
    }

    #[test]
    #[should_panic(expected = "Normal count")]
    fn test_set_normals_length_mismatch() {
        quad().set_normals(vec![[0.0; 3]]);
    }
}
