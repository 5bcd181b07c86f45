//! UV-sphere ball with five latitude bands.

use bevy::prelude::*;

use super::{BuilderHooks, BuilderParams, finish_single};
use crate::asset::ProceduralAsset;
use crate::error::BuildError;
use crate::geometry::{GeometryBuffer, regroup_by_region, uv_sphere};
use crate::material::{MaterialSetBuilder, RegionMaterial};
use crate::param::{ParamEffect, ParamSpec, ParamValue, ParamValues, PatchTarget};
use crate::region::{BALL_REGIONS, hex_to_srgba};

pub const MESH_ID: &str = "mesh.ball.v1";

/// Band boundaries on the normalized centroid height, top to bottom.
const BAND_LIMITS: [f32; 4] = [0.72, 0.22, -0.22, -0.72];

#[derive(Clone, Debug, PartialEq)]
pub struct BallParams {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    pub color: u32,
}

impl Default for BallParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            width_segments: 32,
            height_segments: 16,
            color: 0xE74C3C,
        }
    }
}

impl BuilderParams for BallParams {
    fn schema() -> Vec<ParamSpec> {
        let d = Self::default();
        vec![
            ParamSpec::number("radius", "Radius", d.radius, (0.05, 10.0, 0.01), ParamEffect::Rebuild),
            ParamSpec::count("widthSegments", "Width Segments", d.width_segments, (3, 128), ParamEffect::Rebuild),
            ParamSpec::count("heightSegments", "Height Segments", d.height_segments, (2, 64), ParamEffect::Rebuild),
            ParamSpec::color("color", "Color", d.color, ParamEffect::Patch),
        ]
    }

    fn from_values(values: &ParamValues) -> Self {
        let d = Self::default();
        Self {
            radius: values.number("radius").unwrap_or(d.radius),
            width_segments: values.number("widthSegments").map_or(d.width_segments, |v| v as u32),
            height_segments: values.number("heightSegments").map_or(d.height_segments, |v| v as u32),
            color: values.color("color").unwrap_or(d.color),
        }
    }

    fn to_values(&self) -> ParamValues {
        ParamValues::new()
            .with("radius", self.radius)
            .with("widthSegments", self.width_segments as f32)
            .with("heightSegments", self.height_segments as f32)
            .with("color", ParamValue::Color(self.color))
    }
}

fn band(normalized_y: f32) -> usize {
    BAND_LIMITS
        .iter()
        .position(|&limit| normalized_y > limit)
        .unwrap_or(BAND_LIMITS.len())
}

/// Build the banded sphere, resting on `y = 0`.
pub fn build(params: &BallParams) -> GeometryBuffer {
    let p = params.normalized();
    let sphere = uv_sphere(p.radius, p.width_segments, p.height_segments);

    let mut geometry = regroup_by_region(&sphere, BALL_REGIONS.len(), |t| {
        band(t.centroid.y / p.radius)
    });
    geometry.apply_transform(&Mat4::from_translation(Vec3::Y * p.radius));
    geometry
}

fn patch(id: &str, params: &BallParams, target: &mut PatchTarget<'_>) {
    if id == "color" {
        let color = hex_to_srgba(params.color);
        target.materials.for_each_solid(|m| m.base_color = color);
    }
}

pub fn create_asset(params: &BallParams) -> Result<ProceduralAsset, BuildError> {
    let p = params.normalized();
    let regions = BALL_REGIONS.regions();
    let materials = MaterialSetBuilder::from_regions(&regions)
        .with_shared_solid(
            RegionMaterial::new("ball")
                .with_base_color(hex_to_srgba(p.color))
                .with_roughness(0.35),
        )
        .build();

    finish_single(
        MESH_ID,
        "Ball",
        &BALL_REGIONS,
        &p,
        BuilderHooks { build, patch },
        materials,
    )
}
