//! Tubes swept along a polyline.

use std::f32::consts::TAU;

use bevy::prelude::*;

use super::{GeometryBuffer, RegionMeshBuilder, regroup_by_region};

const POINT_EPSILON: f32 = 1e-6;

/// Smallest `cos(θ/2)` used for corner rings, so near reversals stay bounded.
const MIN_MITER_COS: f32 = 0.25;

/// Cross-section and sampling settings for [`sweep_tube`].
#[derive(Clone, Copy, Debug)]
pub struct TubeDesc {
    pub radius: f32,
    pub radial_segments: u32,
    /// Longest allowed distance between rings along a segment. Zero or
    /// negative keeps one ring per polyline point.
    pub max_step: f32,
    pub capped: bool,
}

impl Default for TubeDesc {
    fn default() -> Self {
        Self {
            radius: 0.05,
            radial_segments: 12,
            max_step: 0.0,
            capped: true,
        }
    }
}

struct Sample {
    point: Vec3,
    arc: f32,
    tangent: Vec3,
    /// In-plane bend direction of a corner ring and the stretch along it.
    miter: Option<(Vec3, f32)>,
}

impl Sample {
    fn straight(point: Vec3, arc: f32, tangent: Vec3) -> Self {
        Self {
            point,
            arc,
            tangent,
            miter: None,
        }
    }

    /// Ring offset for a unit radial direction.
    fn offset(&self, dir: Vec3, radius: f32) -> Vec3 {
        let offset = dir * radius;
        match self.miter {
            Some((axis, scale)) => offset + axis * offset.dot(axis) * (scale - 1.0),
            None => offset,
        }
    }
}

/// Total length of a polyline.
pub fn polyline_length(path: &[Vec3]) -> f32 {
    path.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Sweep a circular cross-section along `path`.
///
/// Ring frames are carried by parallel transport so the tube does not twist.
/// Corners get the bisector of the adjacent segment directions as tangent and
/// their ring is stretched by `1 / cos(θ/2)` along the bend, so it lies on
/// both legs' surfaces.
/// `region_at` maps an arc length to a region: side quads use the arc length
/// at their middle, the start cap uses `0` and the end cap the full length.
/// The result is grouped with one group per non-empty region, in region
/// order.
///
/// Paths with fewer than two distinct points produce an empty buffer.
pub fn sweep_tube(
    path: &[Vec3],
    desc: &TubeDesc,
    region_count: usize,
    region_at: impl Fn(f32) -> usize,
) -> GeometryBuffer {
    let samples = sample_path(path, desc.max_step);
    let Some(last) = samples.last() else {
        return GeometryBuffer::default();
    };
    let total = last.arc.max(POINT_EPSILON);
    let radial = desc.radial_segments.max(3);

    let mut b = RegionMeshBuilder::new();
    let mut triangle_regions = Vec::new();

    let first_tangent = samples[0].tangent;
    let reference = if first_tangent.y.abs() < 0.99 {
        Vec3::Y
    } else {
        Vec3::X
    };
    let mut normal = (reference - first_tangent * reference.dot(first_tangent)).normalize();
    let mut prev_tangent = first_tangent;

    let mut rings: Vec<Vec<u32>> = Vec::with_capacity(samples.len());
    for sample in &samples {
        normal = (Quat::from_rotation_arc(prev_tangent, sample.tangent) * normal).normalize();
        prev_tangent = sample.tangent;
        let binormal = sample.tangent.cross(normal);

        let v = sample.arc / total;
        let ring = (0..=radial)
            .map(|k| {
                let u = k as f32 / radial as f32;
                let (sin, cos) = (u * TAU).sin_cos();
                let dir = normal * cos + binormal * sin;
                b.push_vertex(sample.point + sample.offset(dir, desc.radius), dir, [u, v])
            })
            .collect();
        rings.push(ring);
    }

    for (i, pair) in rings.windows(2).enumerate() {
        let region = region_at((samples[i].arc + samples[i + 1].arc) * 0.5);
        let (near, far) = (&pair[0], &pair[1]);
        for k in 0..radial as usize {
            let (a, bb, c, d) = (near[k], near[k + 1], far[k + 1], far[k]);
            b.push_triangle(a, bb, d);
            b.push_triangle(bb, c, d);
            triangle_regions.extend([region, region]);
        }
    }

    if desc.capped {
        let first = &samples[0];
        let end = &samples[samples.len() - 1];
        for (sample, start) in [(first, true), (end, false)] {
            let region = region_at(if start { 0.0 } else { sample.arc });
            let normal = if start {
                -sample.tangent
            } else {
                sample.tangent
            };
            let ring_src = if start { &rings[0] } else { &rings[rings.len() - 1] };
            let center = b.push_vertex(sample.point, normal, [0.5, 0.5]);
            let ring: Vec<u32> = ring_src
                .iter()
                .map(|&i| {
                    let p = Vec3::from(b.position(i));
                    let local = (p - sample.point) / desc.radius.max(POINT_EPSILON);
                    b.push_vertex(p, normal, [local.x * 0.5 + 0.5, local.z * 0.5 + 0.5])
                })
                .collect();
            for k in 0..radial as usize {
                if start {
                    b.push_triangle(center, ring[k + 1], ring[k]);
                } else {
                    b.push_triangle(center, ring[k], ring[k + 1]);
                }
                triangle_regions.push(region);
            }
        }
    }

    let swept = b.build();
    regroup_by_region(&swept, region_count, |t| triangle_regions[t.index])
}

fn sample_path(path: &[Vec3], max_step: f32) -> Vec<Sample> {
    let mut points: Vec<Vec3> = Vec::with_capacity(path.len());
    for &p in path {
        if points
            .last()
            .is_none_or(|last: &Vec3| last.distance(p) > POINT_EPSILON)
        {
            points.push(p);
        }
    }
    if points.len() < 2 {
        return Vec::new();
    }

    let dirs: Vec<Vec3> = points
        .windows(2)
        .map(|w| (w[1] - w[0]).normalize())
        .collect();

    let mut samples = vec![Sample::straight(points[0], 0.0, dirs[0])];
    let mut arc = 0.0;
    for (i, w) in points.windows(2).enumerate() {
        let len = w[0].distance(w[1]);
        let steps = if max_step > 0.0 {
            (len / max_step).ceil().max(1.0) as usize
        } else {
            1
        };
        for j in 1..=steps {
            let t = j as f32 / steps as f32;
            let mut sample = Sample::straight(w[0].lerp(w[1], t), arc + len * t, dirs[i]);
            if let Some(&next) = dirs.get(i + 1)
                && j == steps
            {
                sample.tangent = (dirs[i] + next).normalize_or(dirs[i]);
                let bend = next - dirs[i];
                if bend.length_squared() > POINT_EPSILON {
                    let cos_half = sample.tangent.dot(dirs[i]).max(MIN_MITER_COS);
                    sample.miter = Some((bend.normalize(), cos_half.recip()));
                }
            }
            samples.push(sample);
        }
        arc += len;
    }
    samples
}
