//! Stop sign: an octagonal plate mounted on the front of a pole.

use std::sync::Arc;

use bevy::log::debug;
use bevy::prelude::*;

use super::pole::{self, PoleParams};
use super::sign_plate::{self, SignPlateParams};
use super::{BuilderHooks, BuilderParams, finish_composite, part_rig};
use crate::assembly::{
    Attachment, AxisPoint, BoxPoint, CompositePart, assemble, assemble_geometry,
};
use crate::asset::ProceduralAsset;
use crate::error::{BuildError, ParamError};
use crate::geometry::GeometryBuffer;
use crate::param::{
    CompositeRig, CompositeSchema, ParamEffect, ParamRig, ParamSpec, ParamValue, ParamValues,
    PatchTarget, RigHooks,
};
use crate::texture::{STOP_SIGN_TEXTURE, TextureSource};

pub const MESH_ID: &str = "mesh.stop_sign.v1";

const ALIASES: &[(&str, &str)] = &[("faceColor", "plate.faceColor")];

/// Plate parameters exposed on the composite.
const PLATE_PARAMS: &[&str] = &["thickness", "faceColor"];

/// Region offset of the plate face within the plate part.
const PLATE_FACE: usize = 0;

#[derive(Clone, Debug, PartialEq)]
pub struct StopSignParams {
    pub pole_height: f32,
    pub plate_size: f32,
    pub plate_thickness: f32,
    pub face_color: u32,
}

impl Default for StopSignParams {
    fn default() -> Self {
        Self {
            pole_height: 2.4,
            plate_size: 0.75,
            plate_thickness: 0.02,
            face_color: 0xC0392B,
        }
    }
}

impl StopSignParams {
    fn own_schema() -> Vec<ParamSpec> {
        let d = Self::default();
        vec![
            ParamSpec::number("poleHeight", "Pole Height", d.pole_height, (0.5, 12.0, 0.05), ParamEffect::Rebuild),
            ParamSpec::number("plateSize", "Plate Size", d.plate_size, (0.2, 2.0, 0.01), ParamEffect::Rebuild),
        ]
    }

    fn plate_schema() -> Vec<ParamSpec> {
        SignPlateParams::schema()
            .into_iter()
            .filter(|spec| PLATE_PARAMS.contains(&spec.id))
            .collect()
    }

    pub fn schema() -> CompositeSchema {
        CompositeSchema {
            own: Self::own_schema(),
            children: vec![("plate", Self::plate_schema())],
            aliases: ALIASES,
        }
    }

    /// Read from a flat value set; plate values live under `plate.`.
    pub fn from_values(values: &ParamValues) -> Self {
        let d = Self::default();
        Self {
            pole_height: values.number("poleHeight").unwrap_or(d.pole_height),
            plate_size: values.number("plateSize").unwrap_or(d.plate_size),
            plate_thickness: values.number("plate.thickness").unwrap_or(d.plate_thickness),
            face_color: values.color("plate.faceColor").unwrap_or(d.face_color),
        }
    }

    pub fn to_values(&self) -> ParamValues {
        ParamValues::new()
            .with("poleHeight", self.pole_height)
            .with("plateSize", self.plate_size)
            .with("plate.thickness", self.plate_thickness)
            .with("plate.faceColor", ParamValue::Color(self.face_color))
    }

    /// Resolve a flat value set, aliases included.
    pub fn resolve(values: &ParamValues) -> Result<Self, ParamError> {
        Self::schema().resolve(values).map(|v| Self::from_values(&v))
    }

    pub fn normalized(&self) -> Self {
        Self::resolve(&self.to_values()).unwrap_or_default()
    }

    fn plate(&self) -> SignPlateParams {
        SignPlateParams {
            shape: "octagon".to_string(),
            size: self.plate_size,
            thickness: self.plate_thickness,
            face_color: self.face_color,
        }
    }
}

fn parts(p: &StopSignParams) -> Result<Vec<CompositePart>, BuildError> {
    let pole = pole::create_asset(&PoleParams {
        height: p.pole_height,
        ..Default::default()
    })?;
    let plate = sign_plate::create_asset(&p.plate())?;
    Ok(vec![
        CompositePart::new("pole", pole),
        CompositePart::new("plate", plate),
    ])
}

fn attachments() -> [Attachment; 1] {
    [Attachment {
        anchor_part: 0,
        anchor_region: "pole:shaft",
        anchor_point: BoxPoint::new(AxisPoint::Center, AxisPoint::Max, AxisPoint::Max),
        moving_part: 1,
        reference_point: BoxPoint::new(AxisPoint::Center, AxisPoint::Max, AxisPoint::Min),
    }]
}

pub fn build(params: &StopSignParams) -> Result<GeometryBuffer, BuildError> {
    let p = params.normalized();
    assemble_geometry(MESH_ID, &parts(&p)?, &attachments())
}

struct StopSignHooks;

impl RigHooks for StopSignHooks {
    fn patch(&self, _id: &str, _values: &ParamValues, _target: &mut PatchTarget<'_>) {}

    fn rebuild(&self, values: &ParamValues) -> Result<GeometryBuffer, BuildError> {
        build(&StopSignParams::from_values(values))
    }
}

/// Build a stop sign, texturing the face with [`STOP_SIGN_TEXTURE`] when
/// `textures` has it.
pub fn create_asset(
    params: &StopSignParams,
    textures: &dyn TextureSource,
) -> Result<ProceduralAsset, BuildError> {
    let p = params.normalized();
    let mut assembly = assemble(MESH_ID, parts(&p)?, &attachments())?;
    let plate_regions = assembly.part_ranges[1].clone();

    match textures.resolve(STOP_SIGN_TEXTURE) {
        Some(texture) => {
            let mut plate = assembly.materials.slice_mut(plate_regions.clone());
            if let Some(face) = plate.solid_for(PLATE_FACE) {
                // The image carries the sign colors.
                face.base_color = Srgba::WHITE;
                face.texture = Some(texture);
            }
        }
        None => debug!("{}: no '{}' texture, using a flat face", MESH_ID, STOP_SIGN_TEXTURE),
    }

    let own = ParamRig::new(
        StopSignParams::own_schema(),
        p.to_values().unscoped(),
        Arc::new(StopSignHooks),
    );
    let plate = part_rig(
        &p.plate(),
        BuilderHooks {
            build: sign_plate::build,
            patch: sign_plate::patch,
        },
        |id| PLATE_PARAMS.contains(&id),
    );
    let mut rig = CompositeRig::new(own).with_child("plate", plate, plate_regions);
    for &(alias, path) in ALIASES {
        rig = rig.with_alias(alias, path);
    }

    finish_composite(
        MESH_ID,
        "Stop Sign",
        &[pole::MESH_ID, sign_plate::MESH_ID],
        assembly,
        rig,
    )
}
