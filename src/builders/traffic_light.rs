//! Traffic light: a pole with an arm carrying a signal head.
//!
//! The arm is turned to run along `+X` and the head is mounted flush
//! against its end. Region order is the pole arm's regions followed by the
//! head's.

use std::f32::consts::PI;
use std::sync::Arc;

use bevy::prelude::*;

use super::pole_arm::{self, PoleArmParams};
use super::signal_head::{self, SignalHeadParams};
use super::{BuilderHooks, BuilderParams, finish_composite, part_rig};
use crate::assembly::{
    Attachment, AxisPoint, BoxPoint, CompositePart, assemble, assemble_geometry,
};
use crate::asset::ProceduralAsset;
use crate::error::{BuildError, ParamError};
use crate::geometry::GeometryBuffer;
use crate::param::{
    CompositeRig, CompositeSchema, ParamEffect, ParamRig, ParamSpec, ParamValues, PatchTarget,
    RigHooks,
};

pub const MESH_ID: &str = "mesh.traffic_light.v1";

const ALIASES: &[(&str, &str)] = &[("signal", "head.signal")];

#[derive(Clone, Debug, PartialEq)]
pub struct TrafficLightParams {
    pub pole_height: f32,
    pub arm_length: f32,
    pub head: SignalHeadParams,
}

impl Default for TrafficLightParams {
    fn default() -> Self {
        Self {
            pole_height: 4.5,
            arm_length: 3.0,
            head: SignalHeadParams::default(),
        }
    }
}

impl TrafficLightParams {
    fn own_schema() -> Vec<ParamSpec> {
        let d = Self::default();
        vec![
            ParamSpec::number("poleHeight", "Pole Height", d.pole_height, (1.0, 12.0, 0.05), ParamEffect::Rebuild),
            ParamSpec::number("armLength", "Arm Length", d.arm_length, (0.5, 8.0, 0.05), ParamEffect::Rebuild),
        ]
    }

    pub fn schema() -> CompositeSchema {
        CompositeSchema {
            own: Self::own_schema(),
            children: vec![("head", SignalHeadParams::schema())],
            aliases: ALIASES,
        }
    }

    /// Read from a flat value set; head values live under `head.`.
    pub fn from_values(values: &ParamValues) -> Self {
        let d = Self::default();
        Self {
            pole_height: values.number("poleHeight").unwrap_or(d.pole_height),
            arm_length: values.number("armLength").unwrap_or(d.arm_length),
            head: SignalHeadParams::from_values(&values.scoped("head")),
        }
    }

    pub fn to_values(&self) -> ParamValues {
        let mut values = ParamValues::new()
            .with("poleHeight", self.pole_height)
            .with("armLength", self.arm_length);
        values.extend_scoped("head", &self.head.to_values());
        values
    }

    /// Resolve a flat value set, aliases included.
    pub fn resolve(values: &ParamValues) -> Result<Self, ParamError> {
        Self::schema().resolve(values).map(|v| Self::from_values(&v))
    }

    /// Copy with every field clamped and snapped to its domain.
    pub fn normalized(&self) -> Self {
        Self::resolve(&self.to_values()).unwrap_or_default()
    }
}

fn parts(p: &TrafficLightParams) -> Result<Vec<CompositePart>, BuildError> {
    let arm = pole_arm::create_asset(&PoleArmParams {
        height: p.pole_height,
        arm_length: p.arm_length,
        ..Default::default()
    })?;
    let head = signal_head::create_asset(&p.head)?;
    Ok(vec![
        CompositePart::new("pole", arm).with_orientation(Quat::from_rotation_y(PI)),
        CompositePart::new("head", head),
    ])
}

fn attachments() -> [Attachment; 1] {
    [Attachment {
        anchor_part: 0,
        anchor_region: "pole:arm",
        anchor_point: BoxPoint::new(AxisPoint::Max, AxisPoint::Center, AxisPoint::Center),
        moving_part: 1,
        reference_point: BoxPoint::new(AxisPoint::Min, AxisPoint::Center, AxisPoint::Center),
    }]
}

pub fn build(params: &TrafficLightParams) -> Result<GeometryBuffer, BuildError> {
    let p = params.normalized();
    assemble_geometry(MESH_ID, &parts(&p)?, &attachments())
}

/// Hooks of the composite's own rig. Own parameters only rebuild.
struct TrafficLightHooks;

impl RigHooks for TrafficLightHooks {
    fn patch(&self, _id: &str, _values: &ParamValues, _target: &mut PatchTarget<'_>) {}

    fn rebuild(&self, values: &ParamValues) -> Result<GeometryBuffer, BuildError> {
        build(&TrafficLightParams::from_values(values))
    }
}

pub fn create_asset(params: &TrafficLightParams) -> Result<ProceduralAsset, BuildError> {
    let p = params.normalized();
    let assembly = assemble(MESH_ID, parts(&p)?, &attachments())?;

    let own = ParamRig::new(
        TrafficLightParams::own_schema(),
        p.to_values().unscoped(),
        Arc::new(TrafficLightHooks),
    );
    let head = part_rig(
        &p.head,
        BuilderHooks {
            build: signal_head::build,
            patch: signal_head::patch,
        },
        |_| true,
    );
    let mut rig = CompositeRig::new(own).with_child("head", head, assembly.part_ranges[1].clone());
    for &(alias, path) in ALIASES {
        rig = rig.with_alias(alias, path);
    }

    finish_composite(
        MESH_ID,
        "Traffic Light",
        &[pole_arm::MESH_ID, signal_head::MESH_ID],
        assembly,
        rig,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::test_support::{assert_asset_invariants, lit};
    use crate::geometry::extract_region_geometries;
    use crate::param::{ParamChange, ParamValue};
    use crate::region::{HEAD_REGIONS, POLE_ARM_REGIONS};

    const RED_LENS: usize = 5;

    #[test]
    fn test_regions_are_arm_then_head() {
        let asset = create_asset(&TrafficLightParams::default()).unwrap();
        assert_asset_invariants(&asset);
        assert_eq!(asset.region_count(), POLE_ARM_REGIONS.len() + HEAD_REGIONS.len());
        assert_eq!(asset.regions[2].id, "pole:arm");
        assert_eq!(asset.regions[RED_LENS].id, "head:light_red");
        assert_eq!(asset.source.parts, vec![pole_arm::MESH_ID, signal_head::MESH_ID]);
    }

    #[test]
    fn test_head_sits_flush_against_arm_end() {
        let asset = create_asset(&TrafficLightParams::default()).unwrap();
        let subs = extract_region_geometries(&asset.geometry, asset.region_count()).unwrap();
        let arm = subs[2].compute_indexed_bounding_box().unwrap();
        let housing = subs[3].compute_indexed_bounding_box().unwrap();

        assert!(arm.max.x > 0.0);
        assert!((housing.min.x - arm.max.x).abs() < 1e-4);
        let arm_mid_y = (arm.min.y + arm.max.y) * 0.5;
        let housing_mid_y = (housing.min.y + housing.max.y) * 0.5;
        assert!((arm_mid_y - housing_mid_y).abs() < 1e-4);
    }

    #[test]
    fn test_signal_alias_lights_one_lens() {
        let mut asset = create_asset(&TrafficLightParams::default()).unwrap();
        let before = asset.geometry.fingerprint();

        assert_eq!(asset.set_param("signal", "red"), Ok(ParamChange::Patched));
        assert_eq!(lit(&asset.materials.semantic), vec![RED_LENS]);
        assert_eq!(lit(&asset.materials.solid.expanded(asset.region_count())), vec![RED_LENS]);
        assert_eq!(asset.get_param("head.signal"), Some(&ParamValue::Enum("red".into())));
        assert_eq!(asset.geometry.fingerprint(), before);
        assert_eq!(asset.geometry_revision(), 0);
    }

    #[test]
    fn test_pole_height_rebuilds_composite() {
        let mut asset = create_asset(&TrafficLightParams::default()).unwrap();
        let before = asset.geometry.compute_bounding_box().unwrap();
        assert_eq!(asset.set_param("poleHeight", 6.0), Ok(ParamChange::Rebuilt));
        let after = asset.geometry.compute_bounding_box().unwrap();
        assert!((after.max.y - before.max.y - 1.5).abs() < 1e-3);
        assert_eq!(asset.geometry_revision(), 1);
        assert_asset_invariants(&asset);
    }

    #[test]
    fn test_child_rebuild_keeps_lit_lens() {
        let mut asset = create_asset(&TrafficLightParams::default()).unwrap();
        asset.set_param("signal", "green").unwrap();
        assert_eq!(asset.set_param("head.lensRadius", 0.15), Ok(ParamChange::Rebuilt));
        assert_asset_invariants(&asset);
        assert_eq!(lit(&asset.materials.semantic), vec![RED_LENS + 2]);
    }

    #[test]
    fn test_entries_expose_alias() {
        let asset = create_asset(&TrafficLightParams::default()).unwrap();
        let paths: Vec<String> = asset.param_entries().into_iter().map(|(p, _)| p).collect();
        assert!(paths.contains(&"poleHeight".to_string()));
        assert!(paths.contains(&"head.visorDepth".to_string()));
        assert_eq!(paths.last().map(String::as_str), Some("signal"));
    }

    #[test]
    fn test_resolve_flat_values() {
        let params = TrafficLightParams::resolve(
            &ParamValues::new()
                .with("signal", "yellow")
                .with("armLength", 20.0),
        )
        .unwrap();
        assert_eq!(params.head.signal, "yellow");
        assert_eq!(params.arm_length, 8.0);
        assert!((params.pole_height - 4.5).abs() < 1e-4);
    }
}
