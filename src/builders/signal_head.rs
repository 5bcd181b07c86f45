//! Three-light signal head: housing box, visors and lens discs.
//!
//! The head is centered on the origin with its lenses facing `+Z`, red on
//! top.

use std::f32::consts::{FRAC_PI_2, PI};

use bevy::prelude::*;

use super::{BuilderHooks, BuilderParams, finish_single};
use crate::asset::ProceduralAsset;
use crate::error::BuildError;
use crate::geometry::{CylinderDesc, GeometryBuffer, RegionMeshBuilder, cuboid, cylinder};
use crate::material::MaterialSetBuilder;
use crate::param::{ParamEffect, ParamSpec, ParamValue, ParamValues, PatchTarget};
use crate::region::{HEAD_REGIONS, hex_to_srgba};

pub const MESH_ID: &str = "mesh.signal_head.v1";

const HOUSING: usize = 0;
const VISOR: usize = 1;
/// Region of the first lens; the others follow in `SIGNALS` order.
const FIRST_LENS: usize = 2;

/// Signal states, `none` first. A lit state's position minus one is its lens.
pub const SIGNALS: &[&str] = &["none", "red", "yellow", "green"];

const LENS_THICKNESS: f32 = 0.02;
const LENS_SEGMENTS: u32 = 24;

#[derive(Clone, Debug, PartialEq)]
pub struct SignalHeadParams {
    pub lens_radius: f32,
    pub visor_depth: f32,
    pub signal: String,
    pub housing_color: u32,
}

impl Default for SignalHeadParams {
    fn default() -> Self {
        Self {
            lens_radius: 0.1,
            visor_depth: 0.18,
            signal: "none".to_string(),
            housing_color: 0x2B2F33,
        }
    }
}

impl BuilderParams for SignalHeadParams {
    fn schema() -> Vec<ParamSpec> {
        let d = Self::default();
        vec![
            ParamSpec::number("lensRadius", "Lens Radius", d.lens_radius, (0.05, 0.2, 0.005), ParamEffect::Rebuild),
            ParamSpec::number("visorDepth", "Visor Depth", d.visor_depth, (0.02, 0.5, 0.01), ParamEffect::Rebuild),
            ParamSpec::enumeration("signal", "Signal", SIGNALS, "none", ParamEffect::Patch),
            ParamSpec::color("housingColor", "Housing Color", d.housing_color, ParamEffect::Patch),
        ]
    }

    fn from_values(values: &ParamValues) -> Self {
        let d = Self::default();
        Self {
            lens_radius: values.number("lensRadius").unwrap_or(d.lens_radius),
            visor_depth: values.number("visorDepth").unwrap_or(d.visor_depth),
            signal: values.enum_value("signal").map_or(d.signal, str::to_string),
            housing_color: values.color("housingColor").unwrap_or(d.housing_color),
        }
    }

    fn to_values(&self) -> ParamValues {
        ParamValues::new()
            .with("lensRadius", self.lens_radius)
            .with("visorDepth", self.visor_depth)
            .with("signal", ParamValue::Enum(self.signal.clone()))
            .with("housingColor", ParamValue::Color(self.housing_color))
    }
}

impl SignalHeadParams {
    /// Lens index (0 red, 1 yellow, 2 green) of the lit light, if any.
    pub fn active_lens(&self) -> Option<usize> {
        SIGNALS
            .iter()
            .position(|s| *s == self.signal)
            .and_then(|i| i.checked_sub(1))
    }
}

/// Housing dimensions derived from the lens radius.
fn housing_size(lens_radius: f32) -> Vec3 {
    let spacing = lens_spacing(lens_radius);
    Vec3::new(lens_radius * 2.8, spacing * 3.0, lens_radius * 2.4)
}

fn lens_spacing(lens_radius: f32) -> f32 {
    lens_radius * 2.6
}

pub fn build(params: &SignalHeadParams) -> GeometryBuffer {
    let p = params.normalized();
    let size = housing_size(p.lens_radius);
    let front = size.z * 0.5;
    let spacing = lens_spacing(p.lens_radius);
    let lens_heights = [spacing, 0.0, -spacing];
    // Cylinders are built along Y; this turns their axis toward +Z.
    let face_forward = Quat::from_rotation_x(FRAC_PI_2);

    let mut b = RegionMeshBuilder::new().with_region_count(HEAD_REGIONS.len());
    b.append(&cuboid(size, Vec3::ZERO), HOUSING);

    // Open half shells over the top of each lens.
    let visor = cylinder(
        &CylinderDesc::new(p.lens_radius * 1.15, p.visor_depth, LENS_SEGMENTS)
            .open_ended()
            .with_theta(FRAC_PI_2, PI),
    );
    for y in lens_heights {
        let center = Vec3::new(0.0, y, front + p.visor_depth * 0.5);
        b.append_transformed(
            &visor,
            &Mat4::from_rotation_translation(face_forward, center),
            VISOR,
        );
    }

    let lens = cylinder(&CylinderDesc::new(p.lens_radius, LENS_THICKNESS, LENS_SEGMENTS));
    for (i, y) in lens_heights.into_iter().enumerate() {
        let center = Vec3::new(0.0, y, front + LENS_THICKNESS * 0.5);
        b.append_transformed(
            &lens,
            &Mat4::from_rotation_translation(face_forward, center),
            FIRST_LENS + i,
        );
    }

    b.build()
}

pub(crate) fn patch(id: &str, params: &SignalHeadParams, target: &mut PatchTarget<'_>) {
    match id {
        "signal" => {
            let active = params.active_lens();
            for lens in 0..3 {
                let intensity = if active == Some(lens) { 1.0 } else { 0.0 };
                target
                    .materials
                    .for_region(FIRST_LENS + lens, |m| m.emissive_intensity = intensity);
            }
        }
        "housingColor" => {
            if let Some(housing) = target.materials.solid_for(HOUSING) {
                housing.base_color = hex_to_srgba(params.housing_color);
            }
        }
        _ => {}
    }
}

pub fn create_asset(params: &SignalHeadParams) -> Result<ProceduralAsset, BuildError> {
    let p = params.normalized();
    let regions = HEAD_REGIONS.regions();
    let active = p.active_lens();

    let mut materials = MaterialSetBuilder::from_regions(&regions)
        .with_solid_presets(&regions)
        .map_region(VISOR, |m| m.double_sided = true);
    for lens in 0..3 {
        let region = &regions[FIRST_LENS + lens];
        let intensity = if active == Some(lens) { 1.0 } else { 0.0 };
        materials = materials.map_region(FIRST_LENS + lens, |m| {
            m.emissive = region.linear();
            m.emissive_intensity = intensity;
        });
    }
    let mut materials = materials.build();
    if let Some(housing) = materials.all_mut().solid_for(HOUSING) {
        housing.base_color = hex_to_srgba(p.housing_color);
    }

    finish_single(
        MESH_ID,
        "Signal Head",
        &HEAD_REGIONS,
        &p,
        BuilderHooks { build, patch },
        materials,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::test_support::{assert_asset_invariants, lit};
    use crate::geometry::extract_region_geometries;
    use crate::param::ParamChange;

    #[test]
    fn test_five_groups_in_region_order() {
        let asset = create_asset(&SignalHeadParams::default()).unwrap();
        assert_asset_invariants(&asset);
        let indices: Vec<usize> = asset.geometry.groups().iter().map(|g| g.material_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_lenses_sit_on_front_face_red_on_top() {
        let params = SignalHeadParams::default();
        let geometry = build(&params);
        let parts = extract_region_geometries(&geometry, 5).unwrap();
        let housing = parts[HOUSING].compute_indexed_bounding_box().unwrap();
        let red = parts[2].compute_indexed_bounding_box().unwrap();
        let green = parts[4].compute_indexed_bounding_box().unwrap();

        assert!(red.min.z >= housing.max.z - 1e-5);
        assert!(red.min.y > green.max.y);
        let visor = parts[VISOR].compute_indexed_bounding_box().unwrap();
        assert!((visor.max.z - housing.max.z - params.visor_depth).abs() < 1e-4);
    }

    #[test]
    fn test_red_lights_exactly_one_lens_in_both_sets() {
        let mut asset = create_asset(&SignalHeadParams::default()).unwrap();
        assert!(lit(&asset.materials.semantic).is_empty());

        assert_eq!(asset.set_param("signal", "red"), Ok(ParamChange::Patched));
        assert_eq!(lit(&asset.materials.semantic), vec![2]);
        assert_eq!(lit(&asset.materials.solid.expanded(5)), vec![2]);

        asset.set_param("signal", "green").unwrap();
        assert_eq!(lit(&asset.materials.semantic), vec![4]);
        assert_eq!(lit(&asset.materials.solid.expanded(5)), vec![4]);

        asset.set_param("signal", "none").unwrap();
        assert!(lit(&asset.materials.semantic).is_empty());
    }

    #[test]
    fn test_unknown_signal_falls_back_to_none() {
        let mut asset = create_asset(&SignalHeadParams {
            signal: "yellow".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(lit(&asset.materials.semantic), vec![3]);

        asset.set_param("signal", "blue").unwrap();
        assert_eq!(asset.get_param("signal"), Some(&ParamValue::Enum("none".into())));
        assert!(lit(&asset.materials.semantic).is_empty());
    }

    #[test]
    fn test_housing_color_patch() {
        let mut asset = create_asset(&SignalHeadParams::default()).unwrap();
        asset
            .set_param("housingColor", ParamValue::Color(0xFFCC00))
            .unwrap();
        let solid = asset.materials.solid.expanded(5);
        assert_eq!(solid[HOUSING].base_color, hex_to_srgba(0xFFCC00));
        assert_ne!(solid[VISOR].base_color, hex_to_srgba(0xFFCC00));
    }

    #[test]
    fn test_lens_radius_rebuild_grows_housing() {
        let mut asset = create_asset(&SignalHeadParams::default()).unwrap();
        let before = asset.geometry.compute_bounding_box().unwrap();
        assert_eq!(asset.set_param("lensRadius", 0.15), Ok(ParamChange::Rebuilt));
        let after = asset.geometry.compute_bounding_box().unwrap();
        assert!(after.max.y > before.max.y);
    }
}
