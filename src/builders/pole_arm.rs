//! Pole with a cantilevered arm, swept as one tube.
//!
//! The path rises vertically, bends through an inclined elbow and runs
//! horizontally toward `-X`. Side segments are classified by the arc length
//! at their middle.

use bevy::prelude::*;

use super::{BuilderHooks, BuilderParams, finish_single};
use crate::asset::ProceduralAsset;
use crate::error::BuildError;
use crate::geometry::{GeometryBuffer, TubeDesc, polyline_length, sweep_tube};
use crate::material::{MaterialSetBuilder, RegionMaterial};
use crate::param::{ParamEffect, ParamSpec, ParamValue, ParamValues, PatchTarget};
use crate::region::{POLE_ARM_REGIONS, hex_to_srgba};

pub const MESH_ID: &str = "mesh.pole_arm.v1";

const MAST: usize = 0;
const ELBOW: usize = 1;
const ARM: usize = 2;

/// Longest distance between tube rings.
const RING_STEP: f32 = 0.25;

#[derive(Clone, Debug, PartialEq)]
pub struct PoleArmParams {
    pub height: f32,
    pub arm_length: f32,
    pub radius: f32,
    pub elbow_rise: f32,
    pub elbow_run: f32,
    pub radial_segments: u32,
    pub color: u32,
}

impl Default for PoleArmParams {
    fn default() -> Self {
        Self {
            height: 4.5,
            arm_length: 3.0,
            radius: 0.08,
            elbow_rise: 0.4,
            elbow_run: 0.6,
            radial_segments: 12,
            color: 0x6C7A89,
        }
    }
}

impl BuilderParams for PoleArmParams {
    fn schema() -> Vec<ParamSpec> {
        let d = Self::default();
        vec![
            ParamSpec::number("height", "Height", d.height, (1.0, 12.0, 0.05), ParamEffect::Rebuild),
            ParamSpec::number("armLength", "Arm Length", d.arm_length, (0.5, 8.0, 0.05), ParamEffect::Rebuild),
            ParamSpec::number("radius", "Radius", d.radius, (0.02, 0.4, 0.005), ParamEffect::Rebuild),
            ParamSpec::number("elbowRise", "Elbow Rise", d.elbow_rise, (0.0, 2.0, 0.05), ParamEffect::Rebuild),
            ParamSpec::number("elbowRun", "Elbow Run", d.elbow_run, (0.1, 2.0, 0.05), ParamEffect::Rebuild),
            ParamSpec::count("radialSegments", "Radial Segments", d.radial_segments, (6, 48), ParamEffect::Rebuild),
            ParamSpec::color("color", "Color", d.color, ParamEffect::Patch),
        ]
    }

    fn from_values(values: &ParamValues) -> Self {
        let d = Self::default();
        Self {
            height: values.number("height").unwrap_or(d.height),
            arm_length: values.number("armLength").unwrap_or(d.arm_length),
            radius: values.number("radius").unwrap_or(d.radius),
            elbow_rise: values.number("elbowRise").unwrap_or(d.elbow_rise),
            elbow_run: values.number("elbowRun").unwrap_or(d.elbow_run),
            radial_segments: values.number("radialSegments").map_or(d.radial_segments, |v| v as u32),
            color: values.color("color").unwrap_or(d.color),
        }
    }

    fn to_values(&self) -> ParamValues {
        ParamValues::new()
            .with("height", self.height)
            .with("armLength", self.arm_length)
            .with("radius", self.radius)
            .with("elbowRise", self.elbow_rise)
            .with("elbowRun", self.elbow_run)
            .with("radialSegments", self.radial_segments as f32)
            .with("color", ParamValue::Color(self.color))
    }
}

impl PoleArmParams {
    /// Centerline: foot, top of the mast, end of the elbow, end of the arm.
    pub fn path(&self) -> [Vec3; 4] {
        let top = self.height;
        let elbow_end = Vec3::new(-self.elbow_run, top + self.elbow_rise, 0.0);
        [
            Vec3::ZERO,
            Vec3::new(0.0, top, 0.0),
            elbow_end,
            elbow_end - Vec3::X * self.arm_length,
        ]
    }
}

pub fn build(params: &PoleArmParams) -> GeometryBuffer {
    let p = params.normalized();
    let path = p.path();
    let mast_end = polyline_length(&path[..2]);
    let elbow_end = polyline_length(&path[..3]);

    let desc = TubeDesc {
        radius: p.radius,
        radial_segments: p.radial_segments,
        max_step: RING_STEP,
        capped: true,
    };
    sweep_tube(&path, &desc, POLE_ARM_REGIONS.len(), |s| {
        if s <= mast_end {
            MAST
        } else if s <= elbow_end {
            ELBOW
        } else {
            ARM
        }
    })
}

fn patch(id: &str, params: &PoleArmParams, target: &mut PatchTarget<'_>) {
    if id == "color" {
        let color = hex_to_srgba(params.color);
        target.materials.for_each_solid(|m| m.base_color = color);
    }
}

pub fn create_asset(params: &PoleArmParams) -> Result<ProceduralAsset, BuildError> {
    let p = params.normalized();
    let regions = POLE_ARM_REGIONS.regions();
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
        "Pole Arm",
        &POLE_ARM_REGIONS,
        &p,
        BuilderHooks { build, patch },
        materials,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::test_support::assert_asset_invariants;
    use crate::geometry::extract_region_geometries;
    use crate::param::ParamChange;

    #[test]
    fn test_three_regions_in_order() {
        let asset = create_asset(&PoleArmParams::default()).unwrap();
        assert_asset_invariants(&asset);
        let indices: Vec<usize> = asset.geometry.groups().iter().map(|g| g.material_index).collect();
        assert_eq!(indices, vec![MAST, ELBOW, ARM]);
    }

    #[test]
    fn test_arm_extends_toward_negative_x() {
        let params = PoleArmParams::default();
        let geometry = build(&params);
        let parts = extract_region_geometries(&geometry, 3).unwrap();
        let mast = parts[MAST].compute_indexed_bounding_box().unwrap();
        let arm = parts[ARM].compute_indexed_bounding_box().unwrap();

        assert!(mast.min.y.abs() < 1e-4);
        assert!(arm.min.x < mast.min.x);
        assert!((arm.min.x + params.elbow_run + params.arm_length).abs() < 1e-3);
        let arm_mid_y = (arm.min.y + arm.max.y) * 0.5;
        assert!((arm_mid_y - (params.height + params.elbow_rise)).abs() < 1e-3);
    }

    #[test]
    fn test_arm_length_rebuilds() {
        let mut asset = create_asset(&PoleArmParams::default()).unwrap();
        let before = asset.geometry.compute_bounding_box().unwrap();
        assert_eq!(asset.set_param("armLength", 5.0), Ok(ParamChange::Rebuilt));
        let after = asset.geometry.compute_bounding_box().unwrap();
        assert!((before.min.x - after.min.x - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_flat_elbow_keeps_all_regions() {
        let geometry = build(&PoleArmParams {
            elbow_rise: 0.0,
            ..Default::default()
        });
        assert_eq!(geometry.groups().len(), 3);
    }

    #[test]
    fn test_elbow_does_not_pinch() {
        let params = PoleArmParams::default();
        let geometry = build(&params);
        let parts = extract_region_geometries(&geometry, 3).unwrap();
        let elbow = parts[ELBOW].compute_indexed_bounding_box().unwrap();

        // The ring at the top of the mast reaches the outer mast wall.
        assert!((elbow.max.x - params.radius).abs() < 1e-4);
        assert!((elbow.max.z - params.radius).abs() < 1e-4);
    }

    #[test]
    fn test_deterministic() {
        let params = PoleArmParams::default();
        assert_eq!(build(&params).fingerprint(), build(&params).fingerprint());
    }
}
