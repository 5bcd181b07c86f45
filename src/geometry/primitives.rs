//! Generic ungrouped primitives: UV sphere, cylinder, lathe, cuboid.
//!
//! All primitives are indexed, carry normals and UVs, and use
//! counter-clockwise winding for outward faces.

use std::f32::consts::TAU;

use bevy::prelude::*;

use super::{GeometryBuffer, RegionMeshBuilder};

/// UV sphere centered at the origin.
///
/// Rows run from the north pole (`+Y`) to the south pole. Degenerate pole
/// triangles are skipped.
pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> GeometryBuffer {
    let ws = width_segments.max(3);
    let hs = height_segments.max(2);
    let mut b = RegionMeshBuilder::with_capacity(
        ((ws + 1) * (hs + 1)) as usize,
        (ws * hs * 6) as usize,
    );

    let mut grid = Vec::with_capacity((hs + 1) as usize);
    for iy in 0..=hs {
        let v = iy as f32 / hs as f32;
        let theta = v * std::f32::consts::PI;
        let mut row = Vec::with_capacity((ws + 1) as usize);
        for ix in 0..=ws {
            let u = ix as f32 / ws as f32;
            let phi = u * TAU;
            let normal = Vec3::new(-phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin());
            row.push(b.push_vertex(normal * radius, normal, [u, 1.0 - v]));
        }
        grid.push(row);
    }

    for iy in 0..hs as usize {
        for ix in 0..ws as usize {
            let a = grid[iy][ix + 1];
            let bb = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];
            if iy != 0 {
                b.push_triangle(a, bb, d);
            }
            if iy != hs as usize - 1 {
                b.push_triangle(bb, c, d);
            }
        }
    }

    without_groups(b.build())
}

/// Parameters for [`cylinder`].
#[derive(Clone, Copy, Debug)]
pub struct CylinderDesc {
    pub radius_top: f32,
    pub radius_bottom: f32,
    pub height: f32,
    pub radial_segments: u32,
    pub height_segments: u32,
    pub open_ended: bool,
    /// Start angle, measured from `+Z` toward `+X`.
    pub theta_start: f32,
    pub theta_length: f32,
}

impl Default for CylinderDesc {
    fn default() -> Self {
        Self {
            radius_top: 1.0,
            radius_bottom: 1.0,
            height: 1.0,
            radial_segments: 16,
            height_segments: 1,
            open_ended: false,
            theta_start: 0.0,
            theta_length: TAU,
        }
    }
}

impl CylinderDesc {
    pub fn new(radius: f32, height: f32, radial_segments: u32) -> Self {
        Self {
            radius_top: radius,
            radius_bottom: radius,
            height,
            radial_segments,
            ..Default::default()
        }
    }

    pub fn open_ended(mut self) -> Self {
        self.open_ended = true;
        self
    }

    pub fn with_theta(mut self, start: f32, length: f32) -> Self {
        self.theta_start = start;
        self.theta_length = length;
        self
    }
}

/// Cylinder (or frustum) along `Y`, centered at the origin.
///
/// The torso comes first in the index buffer, followed by the top and bottom
/// caps.
pub fn cylinder(desc: &CylinderDesc) -> GeometryBuffer {
    let radial = desc.radial_segments.max(3);
    let rows = desc.height_segments.max(1);
    let half = desc.height * 0.5;
    let slope = (desc.radius_bottom - desc.radius_top) / desc.height.max(f32::EPSILON);

    let mut b = RegionMeshBuilder::new();

    let mut grid = Vec::with_capacity((rows + 1) as usize);
    for y in 0..=rows {
        let v = y as f32 / rows as f32;
        let radius = v * (desc.radius_bottom - desc.radius_top) + desc.radius_top;
        let mut row = Vec::with_capacity((radial + 1) as usize);
        for x in 0..=radial {
            let u = x as f32 / radial as f32;
            let theta = u * desc.theta_length + desc.theta_start;
            let (sin, cos) = theta.sin_cos();
            let position = Vec3::new(radius * sin, -v * desc.height + half, radius * cos);
            let normal = Vec3::new(sin, slope, cos).normalize();
            row.push(b.push_vertex(position, normal, [u, 1.0 - v]));
        }
        grid.push(row);
    }

    for x in 0..radial as usize {
        for y in 0..rows as usize {
            let a = grid[y][x];
            let bb = grid[y + 1][x];
            let c = grid[y + 1][x + 1];
            let d = grid[y][x + 1];
            b.push_triangle(a, bb, d);
            b.push_triangle(bb, c, d);
        }
    }

    if !desc.open_ended {
        if desc.radius_top > 0.0 {
            push_cap(&mut b, desc, radial, true);
        }
        if desc.radius_bottom > 0.0 {
            push_cap(&mut b, desc, radial, false);
        }
    }

    without_groups(b.build())
}

fn push_cap(b: &mut RegionMeshBuilder, desc: &CylinderDesc, radial: u32, top: bool) {
    let sign = if top { 1.0 } else { -1.0 };
    let radius = if top { desc.radius_top } else { desc.radius_bottom };
    let y = desc.height * 0.5 * sign;
    let normal = Vec3::Y * sign;

    let center = b.push_vertex([0.0, y, 0.0], normal, [0.5, 0.5]);
    let first = b.vertex_count() as u32;
    for x in 0..=radial {
        let u = x as f32 / radial as f32;
        let theta = u * desc.theta_length + desc.theta_start;
        let (sin, cos) = theta.sin_cos();
        b.push_vertex(
            [radius * sin, y, radius * cos],
            normal,
            [cos * 0.5 + 0.5, sin * 0.5 * sign + 0.5],
        );
    }

    for x in 0..radial {
        let i = first + x;
        if top {
            b.push_triangle(i, i + 1, center);
        } else {
            b.push_triangle(i + 1, i, center);
        }
    }
}

/// Surface of revolution around `Y`.
///
/// `profile` holds `(radius, y)` points and must run bottom to top for
/// outward-facing triangles. Normals follow the profile tangent, averaged at
/// interior points, so the seam column shades like every other column.
pub fn lathe(profile: &[Vec2], segments: u32) -> GeometryBuffer {
    let segments = segments.max(3);
    let len = profile.len();
    let mut b = RegionMeshBuilder::with_capacity(
        (segments as usize + 1) * len,
        segments as usize * len.saturating_sub(1) * 6,
    );

    let profile_normals: Vec<Vec2> = (0..len)
        .map(|j| {
            let prev = profile[j.saturating_sub(1)];
            let next = profile[(j + 1).min(len - 1)];
            let t = next - prev;
            Vec2::new(t.y, -t.x).normalize_or(Vec2::X)
        })
        .collect();

    for i in 0..=segments {
        let u = i as f32 / segments as f32;
        let (sin, cos) = (u * TAU).sin_cos();
        for (j, p) in profile.iter().enumerate() {
            let v = j as f32 / (len.max(2) - 1) as f32;
            let n = profile_normals[j];
            b.push_vertex([p.x * sin, p.y, p.x * cos], [n.x * sin, n.y, n.x * cos], [u, v]);
        }
    }

    for i in 0..segments as usize {
        for j in 0..len.saturating_sub(1) {
            let base = (j + i * len) as u32;
            let a = base;
            let bb = base + len as u32;
            let c = base + len as u32 + 1;
            let d = base + 1;
            b.push_triangle(a, bb, d);
            b.push_triangle(c, d, bb);
        }
    }

    without_groups(b.build())
}

/// Axis-aligned box centered at `center`, with separate vertices per face.
pub fn cuboid(size: Vec3, center: Vec3) -> GeometryBuffer {
    let h = size * 0.5;
    let mut b = RegionMeshBuilder::with_capacity(24, 36);

    // (normal, u axis, v axis)
    let faces = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    ];

    for (normal, u_axis, v_axis) in faces {
        let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
        let base = b.vertex_count() as u32;
        for (su, sv) in corners {
            let position = center + (normal + u_axis * su + v_axis * sv) * h;
            b.push_vertex(position, normal, [(su + 1.0) * 0.5, (sv + 1.0) * 0.5]);
        }
        b.push_triangle(base, base + 1, base + 2);
        b.push_triangle(base, base + 2, base + 3);
    }

    without_groups(b.build())
}

fn without_groups(mut geometry: GeometryBuffer) -> GeometryBuffer {
    geometry.clear_groups();
    geometry
}
