//! Grass blade builders.
//!
//! A blade is a grid of rows from base to tip. Each row's width follows the
//! outline in [`profile`], each column gets the cross-section cavity, and the
//! whole sheet is bent along a circular arc. Vertex colors run from the base
//! color to the tip color and are rewritten in place when either changes.
//!
//! `mesh.grass_blade_hires.v1` runs the same algorithm with denser default
//! segmentation.

mod color;
mod profile;

use bevy::prelude::*;

use super::{BuilderHooks, BuilderParams, finish_single};
use crate::asset::ProceduralAsset;
use crate::error::BuildError;
use crate::geometry::GeometryBuffer;
use crate::material::{AssetMaterials, MaterialSetBuilder};
use crate::param::{ParamEffect, ParamSpec, ParamValue, ParamValues, PatchTarget};
use crate::region::BLADE_REGIONS;

use self::profile::{BladeShape, row_heights};

pub const MESH_ID: &str = "mesh.grass_blade.v1";
pub const HIRES_MESH_ID: &str = "mesh.grass_blade_hires.v1";

pub const TIP_MODES: &[&str] = &["pointy", "rounded", "square"];

const BASE: usize = 0;
const TIP: usize = 1;

/// Blade parameters. Lengths are in centimeters.
#[derive(Clone, Debug, PartialEq)]
pub struct BladeParams {
    pub height_cm: f32,
    pub base_width_cm: f32,
    pub mid_width_cm: f32,
    pub tip_width_cm: f32,
    pub tip_mode: String,
    pub tip_roundness: f32,
    /// Fraction of the height taken by the tip.
    pub tip_length: f32,
    pub bend_degrees: f32,
    pub cavity_depth_cm: f32,
    pub height_segments: u32,
    pub width_segments: u32,
    pub base_color: u32,
    pub tip_color: u32,
    /// Render both faces of the sheet.
    pub double_sided: bool,
}

impl Default for BladeParams {
    fn default() -> Self {
        Self {
            height_cm: 30.0,
            base_width_cm: 0.6,
            mid_width_cm: 0.8,
            tip_width_cm: 0.2,
            tip_mode: "pointy".to_string(),
            tip_roundness: 0.5,
            tip_length: 0.3,
            bend_degrees: 20.0,
            cavity_depth_cm: 0.1,
            height_segments: 8,
            width_segments: 2,
            base_color: 0x2F5A1F,
            tip_color: 0xA8C66C,
            double_sided: true,
        }
    }
}

impl BladeParams {
    fn schema_with(&self, max_height_segments: u32, max_width_segments: u32) -> Vec<ParamSpec> {
        vec![
            ParamSpec::number("heightCm", "Height (cm)", self.height_cm, (5.0, 120.0, 0.5), ParamEffect::Rebuild),
            ParamSpec::number("baseWidthCm", "Base Width (cm)", self.base_width_cm, (0.05, 5.0, 0.05), ParamEffect::Rebuild),
            ParamSpec::number("midWidthCm", "Mid Width (cm)", self.mid_width_cm, (0.05, 5.0, 0.05), ParamEffect::Rebuild),
            ParamSpec::number("tipWidthCm", "Tip Width (cm)", self.tip_width_cm, (0.0, 5.0, 0.05), ParamEffect::Rebuild),
            ParamSpec::enumeration("tipMode", "Tip Mode", TIP_MODES, "pointy", ParamEffect::Rebuild),
            ParamSpec::number("tipRoundness", "Tip Roundness", self.tip_roundness, (0.0, 1.0, 0.05), ParamEffect::Rebuild),
            ParamSpec::number("tipLength", "Tip Length", self.tip_length, (0.05, 0.9, 0.01), ParamEffect::Rebuild),
            ParamSpec::number("bendDegrees", "Bend (deg)", self.bend_degrees, (-180.0, 180.0, 1.0), ParamEffect::Rebuild),
            ParamSpec::number("cavityDepthCm", "Cavity Depth (cm)", self.cavity_depth_cm, (0.0, 2.0, 0.01), ParamEffect::Rebuild),
            ParamSpec::count("heightSegments", "Height Segments", self.height_segments, (2, max_height_segments), ParamEffect::Rebuild),
            ParamSpec::count("widthSegments", "Width Segments", self.width_segments, (1, max_width_segments), ParamEffect::Rebuild),
            ParamSpec::color("baseColor", "Base Color", self.base_color, ParamEffect::Patch),
            ParamSpec::color("tipColor", "Tip Color", self.tip_color, ParamEffect::Patch),
            ParamSpec::boolean("doubleSided", "Double Sided", self.double_sided, ParamEffect::Patch),
        ]
    }

    fn read(values: &ParamValues, d: Self) -> Self {
        Self {
            height_cm: values.number("heightCm").unwrap_or(d.height_cm),
            base_width_cm: values.number("baseWidthCm").unwrap_or(d.base_width_cm),
            mid_width_cm: values.number("midWidthCm").unwrap_or(d.mid_width_cm),
            tip_width_cm: values.number("tipWidthCm").unwrap_or(d.tip_width_cm),
            tip_mode: values.enum_value("tipMode").map_or(d.tip_mode, str::to_string),
            tip_roundness: values.number("tipRoundness").unwrap_or(d.tip_roundness),
            tip_length: values.number("tipLength").unwrap_or(d.tip_length),
            bend_degrees: values.number("bendDegrees").unwrap_or(d.bend_degrees),
            cavity_depth_cm: values.number("cavityDepthCm").unwrap_or(d.cavity_depth_cm),
            height_segments: values.number("heightSegments").map_or(d.height_segments, |v| v as u32),
            width_segments: values.number("widthSegments").map_or(d.width_segments, |v| v as u32),
            base_color: values.color("baseColor").unwrap_or(d.base_color),
            tip_color: values.color("tipColor").unwrap_or(d.tip_color),
            double_sided: values.boolean("doubleSided").unwrap_or(d.double_sided),
        }
    }

    fn write(&self) -> ParamValues {
        ParamValues::new()
            .with("heightCm", self.height_cm)
            .with("baseWidthCm", self.base_width_cm)
            .with("midWidthCm", self.mid_width_cm)
            .with("tipWidthCm", self.tip_width_cm)
            .with("tipMode", ParamValue::Enum(self.tip_mode.clone()))
            .with("tipRoundness", self.tip_roundness)
            .with("tipLength", self.tip_length)
            .with("bendDegrees", self.bend_degrees)
            .with("cavityDepthCm", self.cavity_depth_cm)
            .with("heightSegments", self.height_segments as f32)
            .with("widthSegments", self.width_segments as f32)
            .with("baseColor", ParamValue::Color(self.base_color))
            .with("tipColor", ParamValue::Color(self.tip_color))
            .with("doubleSided", self.double_sided)
    }
}

impl BuilderParams for BladeParams {
    fn schema() -> Vec<ParamSpec> {
        Self::default().schema_with(64, 16)
    }

    fn from_values(values: &ParamValues) -> Self {
        Self::read(values, Self::default())
    }

    fn to_values(&self) -> ParamValues {
        self.write()
    }
}

/// Parameters of the high-resolution blade.
#[derive(Clone, Debug, PartialEq)]
pub struct BladeHiResParams(pub BladeParams);

impl Default for BladeHiResParams {
    fn default() -> Self {
        Self(BladeParams {
            height_segments: 48,
            width_segments: 6,
            ..Default::default()
        })
    }
}

impl BuilderParams for BladeHiResParams {
    fn schema() -> Vec<ParamSpec> {
        Self::default().0.schema_with(256, 32)
    }

    fn from_values(values: &ParamValues) -> Self {
        Self(BladeParams::read(values, Self::default().0))
    }

    fn to_values(&self) -> ParamValues {
        self.0.write()
    }
}

/// Generate the blade for already normalized params.
fn generate(p: &BladeParams) -> GeometryBuffer {
    let shape = BladeShape::from_params(p);
    let columns = p.width_segments.max(1) as usize;
    let (rows, body_rows) = row_heights(shape.tip_start, p.height_segments);
    let stride = columns + 1;

    let vertex_count = rows.len() * stride;
    let mut positions = Vec::with_capacity(vertex_count);
    let mut uvs = Vec::with_capacity(vertex_count);
    let mut ramp = Vec::with_capacity(vertex_count);

    for &v in &rows {
        let half = shape.half_width(v);
        for j in 0..=columns {
            let u = j as f32 / columns as f32;
            let across = u * 2.0 - 1.0;
            let straight = Vec3::new(
                across * half,
                v * shape.length,
                shape.cavity_offset(across.abs(), half),
            );
            positions.push(shape.bend_point(straight).to_array());
            uvs.push([u, v]);
            ramp.push(v);
        }
    }

    let mut indices = Vec::with_capacity((rows.len() - 1) * columns * 6);
    for r in 0..rows.len() - 1 {
        for j in 0..columns {
            let a = (r * stride + j) as u32;
            let b = a + stride as u32;
            let c = b + 1;
            let d = a + 1;
            indices.extend_from_slice(&[a, d, b, d, c, b]);
        }
    }

    let split = body_rows * columns * 6;
    let total = indices.len();
    let mut geometry = GeometryBuffer::new(positions, Some(indices));
    geometry.set_uvs(uvs);
    geometry.set_color_ramp(ramp);
    geometry.recolor_from_ramp(color::gradient(p.base_color, p.tip_color));
    geometry.compute_vertex_normals();
    geometry.add_group(0, split, BASE);
    geometry.add_group(split, total - split, TIP);
    geometry
}

pub fn build(params: &BladeParams) -> GeometryBuffer {
    generate(&params.normalized())
}

pub fn build_hires(params: &BladeHiResParams) -> GeometryBuffer {
    generate(&params.normalized().0)
}

fn patch(id: &str, p: &BladeParams, target: &mut PatchTarget<'_>) {
    match id {
        "baseColor" | "tipColor" => target
            .geometry_mut()
            .recolor_from_ramp(color::gradient(p.base_color, p.tip_color)),
        "doubleSided" => target
            .materials
            .for_each_solid(|m| m.double_sided = p.double_sided),
        _ => {}
    }
}

fn patch_hires(id: &str, params: &BladeHiResParams, target: &mut PatchTarget<'_>) {
    patch(id, &params.0, target);
}

fn blade_materials(p: &BladeParams) -> AssetMaterials {
    let regions = BLADE_REGIONS.regions();
    MaterialSetBuilder::from_regions(&regions)
        .with_solid_presets(&regions)
        .map_all(|m| m.double_sided = p.double_sided)
        .build()
}

pub fn create_asset(params: &BladeParams) -> Result<ProceduralAsset, BuildError> {
    finish_single(
        MESH_ID,
        "Grass Blade",
        &BLADE_REGIONS,
        &params.normalized(),
        BuilderHooks { build, patch },
        blade_materials(params),
    )
}

pub fn create_hires_asset(params: &BladeHiResParams) -> Result<ProceduralAsset, BuildError> {
    finish_single(
        HIRES_MESH_ID,
        "Grass Blade (High Res)",
        &BLADE_REGIONS,
        &params.normalized(),
        BuilderHooks {
            build: build_hires,
            patch: patch_hires,
        },
        blade_materials(&params.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::test_support::assert_asset_invariants;
    use crate::geometry::extract_region_geometries;
    use crate::param::ParamChange;

    fn flat() -> BladeParams {
        BladeParams {
            bend_degrees: 0.0,
            cavity_depth_cm: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_blade_asset_invariants() {
        let asset = create_asset(&BladeParams::default()).unwrap();
        assert_asset_invariants(&asset);
        assert_eq!(asset.geometry.groups().len(), 2);
        assert_eq!(asset.geometry.colors().len(), asset.geometry.vertex_count());
    }

    #[test]
    fn test_unbent_blade_without_cavity_is_planar() {
        let geometry = build(&flat());
        assert!(geometry.positions().iter().all(|p| p[2].abs() < 1e-6));
        let bounds = geometry.compute_bounding_box().unwrap();
        assert!((bounds.max.y - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_pointy_tip_closes() {
        let geometry = build(&BladeParams {
            tip_mode: "pointy".to_string(),
            tip_width_cm: 2.0,
            ..flat()
        });
        let top_row = &geometry.positions()[geometry.vertex_count() - 3..];
        assert!(top_row.iter().all(|p| p[0].abs() < 1e-6));
    }

    #[test]
    fn test_rounded_tip_keeps_width() {
        let geometry = build(&BladeParams {
            tip_mode: "rounded".to_string(),
            tip_width_cm: 0.4,
            ..flat()
        });
        let top_row = &geometry.positions()[geometry.vertex_count() - 3..];
        assert!((top_row[2][0] - top_row[0][0] - 0.004).abs() < 1e-6);
    }

    #[test]
    fn test_groups_split_at_tip_start() {
        let params = flat();
        let geometry = build(&params);
        let parts = extract_region_geometries(&geometry, 2).unwrap();
        let base = parts[BASE].compute_indexed_bounding_box().unwrap();
        let tip = parts[TIP].compute_indexed_bounding_box().unwrap();
        let tip_start = (1.0 - params.tip_length) * params.height_cm / 100.0;
        assert!((base.max.y - tip_start).abs() < 1e-4);
        assert!((tip.min.y - tip_start).abs() < 1e-4);
    }

    #[test]
    fn test_bend_moves_tip_forward() {
        let geometry = build(&BladeParams {
            bend_degrees: 60.0,
            cavity_depth_cm: 0.0,
            ..Default::default()
        });
        let bounds = geometry.compute_bounding_box().unwrap();
        assert!(bounds.max.z > 0.05);
        assert!(bounds.max.y < 0.3);
    }

    #[test]
    fn test_color_patch_recolors_in_place() {
        let mut asset = create_asset(&BladeParams::default()).unwrap();
        let positions = asset.geometry.positions().to_vec();

        let change = asset
            .set_param("tipColor", ParamValue::Color(0xFFFFFF))
            .unwrap();
        assert_eq!(change, ParamChange::PatchedGeometry);
        assert_eq!(asset.geometry.positions(), positions.as_slice());
        let top = *asset.geometry.colors().last().unwrap();
        assert_eq!(top, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(asset.geometry_revision(), 1);
    }

    #[test]
    fn test_double_sided_patches_materials_only() {
        let mut asset = create_asset(&BladeParams::default()).unwrap();
        assert!(asset.materials.solid.iter().all(|m| m.double_sided));

        let change = asset.set_param("doubleSided", false).unwrap();
        assert_eq!(change, ParamChange::Patched);
        assert!(asset.materials.solid.iter().all(|m| !m.double_sided));
        assert_eq!(asset.geometry_revision(), 0);
        assert_eq!(asset.revision(), 1);
    }

    #[test]
    fn test_hires_is_denser() {
        let low = create_asset(&BladeParams::default()).unwrap();
        let high = create_hires_asset(&BladeHiResParams::default()).unwrap();
        assert_asset_invariants(&high);
        assert_eq!(high.id, HIRES_MESH_ID);
        assert!(high.geometry.triangle_count() > low.geometry.triangle_count());
    }

    #[test]
    fn test_hires_keeps_its_segment_range() {
        let p = BladeHiResParams(BladeParams {
            height_segments: 200,
            ..BladeHiResParams::default().0
        })
        .normalized();
        assert_eq!(p.0.height_segments, 200);
        assert_eq!(
            BladeParams {
                height_segments: 200,
                ..Default::default()
            }
            .normalized()
            .height_segments,
            64
        );
    }

    #[test]
    fn test_deterministic() {
        let params = BladeParams::default();
        assert_eq!(build(&params).fingerprint(), build(&params).fingerprint());
    }
}
