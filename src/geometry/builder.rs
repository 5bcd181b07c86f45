//! Incremental builder for region-tagged geometry.

use std::sync::OnceLock;

use bevy::prelude::*;

use super::{GeometryBuffer, GeometryGroup};

/// Builder that collects vertices and triangles while tagging every triangle
/// with the current region.
///
/// Consecutive triangles of the same region extend one group, so emitting
/// parts in region order yields a fully grouped buffer with one group per
/// region.
///
/// # Example
/// ```
/// use bevy_propgen::geometry::RegionMeshBuilder;
///
/// let mut builder = RegionMeshBuilder::new().with_region_count(2);
/// let a = builder.push_vertex([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]);
/// let b = builder.push_vertex([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]);
/// let c = builder.push_vertex([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]);
/// builder.set_region(1);
/// builder.push_triangle(a, b, c);
///
/// let geometry = builder.build();
/// assert_eq!(geometry.groups()[0].material_index, 1);
/// ```
#[derive(Default)]
pub struct RegionMeshBuilder {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
    groups: Vec<GeometryGroup>,
    region: usize,
    region_count: Option<usize>,
}

impl RegionMeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count),
            normals: Vec::with_capacity(vertex_count),
            uvs: Vec::with_capacity(vertex_count),
            indices: Vec::with_capacity(index_count),
            ..Default::default()
        }
    }

    /// Set the number of regions for validation.
    ///
    /// Debug builds panic when a triangle is tagged with a region at or above
    /// this count.
    pub fn with_region_count(mut self, count: usize) -> Self {
        self.region_count = Some(count);
        self
    }

    /// Region applied to subsequently pushed triangles.
    pub fn set_region(&mut self, region: usize) {
        #[cfg(debug_assertions)]
        if let Some(count) = self.region_count {
            debug_assert!(
                region < count,
                "Region {} exceeds region count {}",
                region,
                count
            );
        }
        self.region = region;
    }

    pub fn region(&self) -> usize {
        self.region
    }

    /// Add a vertex and return its index.
    pub fn push_vertex(
        &mut self,
        position: impl Into<[f32; 3]>,
        normal: impl Into<[f32; 3]>,
        uv: impl Into<[f32; 2]>,
    ) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position.into());
        self.normals.push(normal.into());
        self.uvs.push(uv.into());
        index
    }

    /// Add a triangle tagged with the current region.
    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        let start = self.indices.len();
        self.indices.extend_from_slice(&[a, b, c]);

        match self.groups.last_mut() {
            Some(group) if group.material_index == self.region && group.end() == start => {
                group.count += 3;
            }
            _ => self.groups.push(GeometryGroup::new(start, 3, self.region)),
        }
    }

    /// Append every triangle of `part` under `region`.
    ///
    /// The part's own groups are ignored. Parts without UVs get zero UVs.
    pub fn append(&mut self, part: &GeometryBuffer, region: usize) {
        self.set_region(region);
        let offset = self.positions.len() as u32;

        self.positions.extend_from_slice(part.positions());
        self.normals.extend_from_slice(part.normals());
        if part.uvs().is_empty() {
            self.uvs.resize(self.positions.len(), [0.0, 0.0]);
        } else {
            self.uvs.extend_from_slice(part.uvs());
        }

        match part.indices() {
            Some(indices) => {
                for tri in indices.chunks_exact(3) {
                    self.push_triangle(tri[0] + offset, tri[1] + offset, tri[2] + offset);
                }
            }
            None => {
                for t in 0..part.vertex_count() as u32 / 3 {
                    let base = offset + t * 3;
                    self.push_triangle(base, base + 1, base + 2);
                }
            }
        }
    }

    /// Append `part` after transforming it.
    pub fn append_transformed(&mut self, part: &GeometryBuffer, transform: &Mat4, region: usize) {
        let mut moved = part.clone();
        moved.apply_transform(transform);
        self.append(&moved, region);
    }

    /// Position of an already pushed vertex.
    pub fn position(&self, index: u32) -> [f32; 3] {
        self.positions[index as usize]
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Build the final grouped buffer.
    pub fn build(self) -> GeometryBuffer {
        GeometryBuffer {
            positions: self.positions,
            normals: self.normals,
            uvs: self.uvs,
            colors: Vec::new(),
            color_ramp: Vec::new(),
            indices: Some(self.indices),
            groups: self.groups,
            bounds: OnceLock::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri_builder() -> (RegionMeshBuilder, [u32; 3]) {
        let mut b = RegionMeshBuilder::new();
        let i0 = b.push_vertex([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]);
        let i1 = b.push_vertex([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]);
        let i2 = b.push_vertex([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]);
        (b, [i0, i1, i2])
    }

    #[test]
    fn test_same_region_coalesces() {
        let (mut b, [i0, i1, i2]) = tri_builder();
        b.push_triangle(i0, i1, i2);
        b.push_triangle(i0, i2, i1);
        let g = b.build();
        assert_eq!(g.groups(), &[GeometryGroup::new(0, 6, 0)]);
    }

    #[test]
    fn test_region_switch_opens_group() {
        let (mut b, [i0, i1, i2]) = tri_builder();
        b.push_triangle(i0, i1, i2);
        b.set_region(2);
        b.push_triangle(i0, i1, i2);
        b.set_region(0);
        b.push_triangle(i0, i1, i2);
        let g = b.build();
        assert_eq!(
            g.groups(),
            &[
                GeometryGroup::new(0, 3, 0),
                GeometryGroup::new(3, 3, 2),
                GeometryGroup::new(6, 3, 0),
            ]
        );
        assert!(g.is_fully_grouped());
    }

    #[test]
    fn test_append_offsets_indices() {
        let (mut b, [i0, i1, i2]) = tri_builder();
        b.push_triangle(i0, i1, i2);
        let part = b.build();

        let mut combined = RegionMeshBuilder::new();
        combined.append(&part, 0);
        combined.append(&part, 1);
        let g = combined.build();

        assert_eq!(g.vertex_count(), 6);
        assert_eq!(g.indices(), Some(&[0u32, 1, 2, 3, 4, 5][..]));
        assert_eq!(g.groups().len(), 2);
        assert_eq!(g.uvs().len(), 6);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "exceeds region count")]
    fn test_region_out_of_range_panics() {
        let mut b = RegionMeshBuilder::new().with_region_count(2);
        b.set_region(2);
    }
}
