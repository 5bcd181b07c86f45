//! # bevy_propgen
//!
//! Procedural meshes for urban props with stable semantic regions, and a
//! Bevy plugin to spawn and edit them.
//!
//! ## Features
//!
//! - Parametric builders: ball, pole, pole with arm, signal head, sign plate
//!   and grass blade
//! - Every triangle belongs to a named region (`"head:light_red"`,
//!   `"pole:arm"`), with a semantic and a solid material per region
//! - Composites (traffic light, stop sign) assembled from parts without
//!   losing region identity
//! - Parameter rigs: schema-driven edits that patch materials in place or
//!   rebuild geometry, with child paths and aliases on composites
//!
//! ## Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_propgen::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(PropMeshPlugin)
//!         .add_systems(Startup, setup)
//!         .add_systems(Update, go_green)
//!         .run();
//! }
//!
//! fn setup(
//!     mut commands: Commands,
//!     mut meshes: ResMut<Assets<Mesh>>,
//!     mut materials: ResMut<Assets<StandardMaterial>>,
//!     registry: Res<MeshRegistry>,
//!     settings: Res<PropMeshSettings>,
//! ) {
//!     let light = registry
//!         .create("mesh.traffic_light.v1", &ParamValues::new().with("signal", "red"))
//!         .unwrap();
//!     spawn_prop(&mut commands, &mut meshes, &mut materials, &settings, light).unwrap();
//! }
//!
//! fn go_green(mut props: Query<&mut PropMesh>, keys: Res<ButtonInput<KeyCode>>) {
//!     if keys.just_pressed(KeyCode::KeyG) {
//!         for mut prop in &mut props {
//!             // Patches the lens materials; sync_prop_meshes uploads them.
//!             prop.set_param("signal", "green").ok();
//!         }
//!     }
//! }
//! ```

pub mod assembly;
pub mod asset;
pub mod builders;
pub mod error;
pub mod geometry;
pub mod material;
pub mod param;
mod plugin;
pub mod region;
pub mod registry;
pub mod systems;
pub mod texture;

pub use plugin::PropMeshPlugin;

pub mod prelude {
    pub use crate::assembly::{Attachment, AxisPoint, BoxPoint, CompositePart, assemble};
    pub use crate::asset::{AssetSource, ProceduralAsset, SourceKind};
    pub use crate::builders::BuilderParams;
    pub use crate::builders::ball::BallParams;
    pub use crate::builders::blade::{BladeHiResParams, BladeParams};
    pub use crate::builders::pole::PoleParams;
    pub use crate::builders::pole_arm::PoleArmParams;
    pub use crate::builders::sign_plate::SignPlateParams;
    pub use crate::builders::signal_head::SignalHeadParams;
    pub use crate::builders::stop_sign::StopSignParams;
    pub use crate::builders::traffic_light::TrafficLightParams;
    pub use crate::error::{BuildError, GeometryError, ParamError};
    pub use crate::geometry::{GeometryBuffer, GeometryGroup, RegionMeshBuilder};
    pub use crate::material::{AssetMaterials, RegionMaterial, SolidMaterials};
    pub use crate::param::{ParamChange, ParamEffect, ParamKind, ParamSpec, ParamValue, ParamValues};
    pub use crate::plugin::PropMeshPlugin;
    pub use crate::region::{Region, RegionCatalog};
    pub use crate::registry::MeshRegistry;
    pub use crate::systems::{
        MaterialMode, PropMesh, PropMeshSettings, PropMeshSystems, PropRegion, spawn_prop,
        sync_prop_meshes,
    };
    pub use crate::texture::{NoTextures, SignTexture, SignTextureCatalog, TextureSource};
}
