//! Flat sign plate facing `+Z`, centered on the origin.

use std::f32::consts::{FRAC_PI_2, PI};

use bevy::prelude::*;

use super::{BuilderHooks, BuilderParams, finish_single};
use crate::asset::ProceduralAsset;
use crate::error::BuildError;
use crate::geometry::{CylinderDesc, GeometryBuffer, cuboid, cylinder, regroup_by_region};
use crate::material::MaterialSetBuilder;
use crate::param::{ParamEffect, ParamSpec, ParamValue, ParamValues, PatchTarget};
use crate::region::{PLATE_REGIONS, hex_to_srgba};

pub const MESH_ID: &str = "mesh.sign_plate.v1";

pub const SHAPES: &[&str] = &["octagon", "circle", "rectangle", "triangle"];

const FACE: usize = 0;
const BACK: usize = 1;
const RIM: usize = 2;

/// Rectangle height relative to its width.
const RECTANGLE_ASPECT: f32 = 0.7;

#[derive(Clone, Debug, PartialEq)]
pub struct SignPlateParams {
    pub shape: String,
    /// Overall width in meters. Octagons measure flat to flat.
    pub size: f32,
    pub thickness: f32,
    pub face_color: u32,
}

impl Default for SignPlateParams {
    fn default() -> Self {
        Self {
            shape: "octagon".to_string(),
            size: 0.75,
            thickness: 0.02,
            face_color: 0xC0392B,
        }
    }
}

impl BuilderParams for SignPlateParams {
    fn schema() -> Vec<ParamSpec> {
        let d = Self::default();
        vec![
            ParamSpec::enumeration("shape", "Shape", SHAPES, "octagon", ParamEffect::Rebuild),
            ParamSpec::number("size", "Size", d.size, (0.2, 2.0, 0.01), ParamEffect::Rebuild),
            ParamSpec::number("thickness", "Thickness", d.thickness, (0.005, 0.1, 0.005), ParamEffect::Rebuild),
            ParamSpec::color("faceColor", "Face Color", d.face_color, ParamEffect::Patch),
        ]
    }

    fn from_values(values: &ParamValues) -> Self {
        let d = Self::default();
        Self {
            shape: values.enum_value("shape").map_or(d.shape, str::to_string),
            size: values.number("size").unwrap_or(d.size),
            thickness: values.number("thickness").unwrap_or(d.thickness),
            face_color: values.color("faceColor").unwrap_or(d.face_color),
        }
    }

    fn to_values(&self) -> ParamValues {
        ParamValues::new()
            .with("shape", ParamValue::Enum(self.shape.clone()))
            .with("size", self.size)
            .with("thickness", self.thickness)
            .with("faceColor", ParamValue::Color(self.face_color))
    }
}

/// Unclassified plate slab for a shape.
fn slab(shape: &str, size: f32, thickness: f32) -> GeometryBuffer {
    let prism = |radius: f32, segments: u32, theta_start: f32| {
        let mut g = cylinder(
            &CylinderDesc::new(radius, thickness, segments).with_theta(theta_start, 2.0 * PI),
        );
        // Cylinder axis from Y to Z so the top cap becomes the face.
        g.apply_transform(&Mat4::from_rotation_x(FRAC_PI_2));
        g
    };

    match shape {
        "circle" => prism(size * 0.5, 32, 0.0),
        "rectangle" => cuboid(Vec3::new(size, size * RECTANGLE_ASPECT, thickness), Vec3::ZERO),
        // Point down, like a yield sign.
        "triangle" => prism(size / 3f32.sqrt(), 3, 0.0),
        _ => prism(size * 0.5 / (PI / 8.0).cos(), 8, PI / 8.0),
    }
}

fn classify(normal_z: f32) -> usize {
    if normal_z > 0.5 {
        FACE
    } else if normal_z < -0.5 {
        BACK
    } else {
        RIM
    }
}

pub fn build(params: &SignPlateParams) -> GeometryBuffer {
    let p = params.normalized();
    let slab = slab(&p.shape, p.size, p.thickness);
    let mut geometry = regroup_by_region(&slab, PLATE_REGIONS.len(), |t| classify(t.normal.z));

    // Planar UVs over the face so a sign texture spans the plate.
    let uvs = geometry
        .positions()
        .iter()
        .map(|[x, y, _]| [x / p.size + 0.5, 0.5 - y / p.size])
        .collect();
    geometry.set_uvs(uvs);
    geometry
}

/// A textured face keeps its white base so the image is not tinted.
pub(crate) fn patch(id: &str, params: &SignPlateParams, target: &mut PatchTarget<'_>) {
    if id == "faceColor"
        && let Some(face) = target.materials.solid_for(FACE)
        && face.texture.is_none()
    {
        face.base_color = hex_to_srgba(params.face_color);
    }
}

pub fn create_asset(params: &SignPlateParams) -> Result<ProceduralAsset, BuildError> {
    let p = params.normalized();
    let regions = PLATE_REGIONS.regions();
    let mut materials = MaterialSetBuilder::from_regions(&regions)
        .with_solid_presets(&regions)
        .build();
    if let Some(face) = materials.all_mut().solid_for(FACE) {
        face.base_color = hex_to_srgba(p.face_color);
    }

    finish_single(
        MESH_ID,
        "Sign Plate",
        &PLATE_REGIONS,
        &p,
        BuilderHooks { build, patch },
        materials,
    )
}
