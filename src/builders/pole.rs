//! Straight pole: base collar, shaft and finial, revolved from a profile.

use bevy::prelude::*;

use super::{BuilderHooks, BuilderParams, finish_single};
use crate::asset::ProceduralAsset;
use crate::error::BuildError;
use crate::geometry::{GeometryBuffer, lathe, regroup_by_region};
use crate::material::{MaterialSetBuilder, RegionMaterial};
use crate::param::{ParamEffect, ParamSpec, ParamValue, ParamValues, PatchTarget};
use crate::region::{POLE_REGIONS, hex_to_srgba};

pub const MESH_ID: &str = "mesh.pole.v1";

/// Collar height as a fraction of the pole height.
const COLLAR_FRACTION: f32 = 0.06;
/// Finial height as a fraction of the pole height.
const FINIAL_FRACTION: f32 = 0.04;

/// Triangles with a centroid below this height fraction belong to the base.
pub(crate) const BASE_LIMIT: f32 = 0.08;
/// Triangles with a centroid above this height fraction belong to the cap.
pub(crate) const CAP_LIMIT: f32 = 0.955;

#[derive(Clone, Debug, PartialEq)]
pub struct PoleParams {
    pub height: f32,
    pub radius: f32,
    pub radial_segments: u32,
    pub color: u32,
}

impl Default for PoleParams {
    fn default() -> Self {
        Self {
            height: 3.0,
            radius: 0.06,
            radial_segments: 16,
            color: 0x6C7A89,
        }
    }
}

impl BuilderParams for PoleParams {
    fn schema() -> Vec<ParamSpec> {
        let d = Self::default();
        vec![
            ParamSpec::number("height", "Height", d.height, (0.5, 12.0, 0.05), ParamEffect::Rebuild),
            ParamSpec::number("radius", "Radius", d.radius, (0.02, 0.5, 0.005), ParamEffect::Rebuild),
            ParamSpec::count("radialSegments", "Radial Segments", d.radial_segments, (6, 64), ParamEffect::Rebuild),
            ParamSpec::color("color", "Color", d.color, ParamEffect::Patch),
        ]
    }

    fn from_values(values: &ParamValues) -> Self {
        let d = Self::default();
        Self {
            height: values.number("height").unwrap_or(d.height),
            radius: values.number("radius").unwrap_or(d.radius),
            radial_segments: values.number("radialSegments").map_or(d.radial_segments, |v| v as u32),
            color: values.color("color").unwrap_or(d.color),
        }
    }

    fn to_values(&self) -> ParamValues {
        ParamValues::new()
            .with("height", self.height)
            .with("radius", self.radius)
            .with("radialSegments", self.radial_segments as f32)
            .with("color", ParamValue::Color(self.color))
    }
}

/// Revolve profile, bottom to top. Corners are doubled for hard edges.
fn profile(height: f32, radius: f32) -> Vec<Vec2> {
    let collar = height * COLLAR_FRACTION;
    let finial = height * FINIAL_FRACTION;
    let shoulder = height - finial;

    let raw = [
        Vec2::new(0.0, 0.0),
        Vec2::new(radius * 1.6, 0.0),
        Vec2::new(radius * 1.6, collar),
        Vec2::new(radius, collar * 1.3),
        Vec2::new(radius, shoulder),
        Vec2::new(radius * 1.25, shoulder),
        Vec2::new(radius * 1.25, height - finial * 0.4),
        Vec2::new(radius * 0.5, height),
        Vec2::new(0.0, height),
    ];

    let last = raw.len() - 1;
    raw.iter()
        .enumerate()
        .flat_map(|(i, &p)| {
            let corner = i != 0 && i != last;
            std::iter::repeat_n(p, if corner { 2 } else { 1 })
        })
        .collect()
}

fn classify(height_fraction: f32) -> usize {
    if height_fraction < BASE_LIMIT {
        0
    } else if height_fraction > CAP_LIMIT {
        2
    } else {
        1
    }
}

/// Build the pole standing on `y = 0`.
pub fn build(params: &PoleParams) -> GeometryBuffer {
    let p = params.normalized();
    let revolved = lathe(&profile(p.height, p.radius), p.radial_segments);
    regroup_by_region(&revolved, POLE_REGIONS.len(), |t| {
        classify(t.centroid.y / p.height)
    })
}

fn patch(id: &str, params: &PoleParams, target: &mut PatchTarget<'_>) {
    if id == "color" {
        let color = hex_to_srgba(params.color);
        target.materials.for_each_solid(|m| m.base_color = color);
    }
}

pub fn create_asset(params: &PoleParams) -> Result<ProceduralAsset, BuildError> {
    let p = params.normalized();
    let regions = POLE_REGIONS.regions();
    let materials = MaterialSetBuilder::from_regions(&regions)
        .with_shared_solid(
            RegionMaterial::new("pole")
                .with_base_color(hex_to_srgba(p.color))
                .with_roughness(0.45)
                .with_metallic(0.7),
        )
        .build();

    finish_single(
        MESH_ID,
        "Pole",
        &POLE_REGIONS,
        &p,
        BuilderHooks { build, patch },
        materials,
    )
}
