//! Axis-aligned bounds over raw and index-referenced vertices.

use bevy::math::Vec3A;
use bevy::math::bounding::Aabb3d;
use bevy::prelude::*;

use super::GeometryBuffer;

impl GeometryBuffer {
    /// Bounding box over every position, cached until positions change.
    ///
    /// Returns `None` for an empty buffer or when any coordinate is not finite.
    pub fn compute_bounding_box(&self) -> Option<Aabb3d> {
        *self
            .bounds
            .get_or_init(|| aabb_from_points(self.positions.iter().copied()))
    }

    /// Bounding box over vertices referenced by the index buffer only.
    ///
    /// Sub-geometries produced by region extraction share the full vertex
    /// buffer of their source, so their raw box covers every region. This one
    /// does not. Non-indexed buffers fall back to the raw box.
    pub fn compute_indexed_bounding_box(&self) -> Option<Aabb3d> {
        match &self.indices {
            Some(indices) => {
                aabb_from_points(indices.iter().map(|&i| self.positions[i as usize]))
            }
            None => self.compute_bounding_box(),
        }
    }
}

/// Tight box around a point set.
pub fn aabb_from_points(points: impl IntoIterator<Item = [f32; 3]>) -> Option<Aabb3d> {
    let mut min = Vec3A::splat(f32::INFINITY);
    let mut max = Vec3A::splat(f32::NEG_INFINITY);
    let mut any = false;

    for p in points {
        let p = Vec3A::from_array(p);
        if !p.is_finite() {
            return None;
        }
        min = min.min(p);
        max = max.max(p);
        any = true;
    }

    any.then_some(Aabb3d { min, max })
}

/// Smallest box containing both inputs.
pub fn aabb_union(a: Aabb3d, b: Aabb3d) -> Aabb3d {
    Aabb3d {
        min: a.min.min(b.min),
        max: a.max.max(b.max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_has_no_bounds() {
        let g = GeometryBuffer::default();
        assert!(g.compute_bounding_box().is_none());
        assert!(g.compute_indexed_bounding_box().is_none());
    }

    #[test]
    fn test_non_finite_has_no_bounds() {
        assert!(aabb_from_points([[0.0, f32::NAN, 0.0]]).is_none());
    }

    #[test]
    fn test_indexed_box_ignores_unused_vertices() {
        let g = GeometryBuffer::new(
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [10.0, 10.0, 10.0],
            ],
            Some(vec![0, 1, 2]),
        );

        let raw = g.compute_bounding_box().unwrap();
        let indexed = g.compute_indexed_bounding_box().unwrap();

        assert_eq!(Vec3::from(raw.max), Vec3::splat(10.0));
        assert_eq!(Vec3::from(indexed.max), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_cache_invalidated_by_transform() {
        let mut g = GeometryBuffer::new(vec![[0.0; 3], [1.0; 3], [0.0, 1.0, 0.0]], Some(vec![0, 1, 2]));
        let before = g.compute_bounding_box().unwrap();
        g.apply_transform(&Mat4::from_translation(Vec3::X * 5.0));
        let after = g.compute_bounding_box().unwrap();
        assert_eq!(after.min.x, before.min.x + 5.0);
    }

    #[test]
    fn test_union() {
        let a = aabb_from_points([[0.0; 3]]).unwrap();
        let b = aabb_from_points([[2.0, 4.0, 6.0]]).unwrap();
        let u = aabb_union(a, b);
        assert_eq!(Vec3::from(u.min), Vec3::ZERO);
        assert_eq!(Vec3::from(u.max), Vec3::new(2.0, 4.0, 6.0));
    }
}
