//! Mesh id to builder registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bevy::log::debug;
use bevy::prelude::*;

use crate::asset::ProceduralAsset;
use crate::builders::blade::{self, BladeHiResParams, BladeParams};
use crate::builders::{
    BuilderParams, ball, pole, pole_arm, sign_plate, signal_head, stop_sign, traffic_light,
};
use crate::error::{BuildError, ParamError};
use crate::param::ParamValues;
use crate::texture::{NoTextures, TextureSource};

/// Builds an asset from a flat value set.
pub type MeshFactory =
    Box<dyn Fn(&ParamValues, &dyn TextureSource) -> Result<ProceduralAsset, BuildError> + Send + Sync>;

/// Registry of mesh factories keyed by versioned mesh id.
///
/// Nothing is registered globally; build one and hand it to whatever needs
/// to create meshes, or let [`PropMeshPlugin`](crate::PropMeshPlugin) insert
/// it as a resource.
///
/// # Example
/// ```
/// use bevy_propgen::prelude::*;
///
/// let registry = MeshRegistry::with_defaults();
/// let ball = registry
///     .create("mesh.ball.v1", &ParamValues::new().with("radius", 0.5))
///     .unwrap();
/// assert_eq!(ball.region_count(), 5);
/// ```
#[derive(Resource)]
pub struct MeshRegistry {
    factories: HashMap<&'static str, MeshFactory>,
    textures: Arc<dyn TextureSource>,
}

impl Default for MeshRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MeshRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeshRegistry")
            .field("ids", &self.ids())
            .finish_non_exhaustive()
    }
}

fn invalid(mesh: &str) -> impl FnOnce(ParamError) -> BuildError + '_ {
    move |source| BuildError::InvalidParams {
        mesh: mesh.to_string(),
        source: Box::new(source),
    }
}

impl MeshRegistry {
    /// Empty registry without textures.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            textures: Arc::new(NoTextures),
        }
    }

    /// Registry with every built-in mesh type.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_builder(ball::MESH_ID, ball::create_asset);
        registry.register_builder(pole::MESH_ID, pole::create_asset);
        registry.register_builder(pole_arm::MESH_ID, pole_arm::create_asset);
        registry.register_builder(signal_head::MESH_ID, signal_head::create_asset);
        registry.register_builder(sign_plate::MESH_ID, sign_plate::create_asset);
        registry.register_builder::<BladeParams>(blade::MESH_ID, blade::create_asset);
        registry.register_builder::<BladeHiResParams>(blade::HIRES_MESH_ID, blade::create_hires_asset);

        registry.register(traffic_light::MESH_ID, |values, _| {
            let params = traffic_light::TrafficLightParams::resolve(values)
                .map_err(invalid(traffic_light::MESH_ID))?;
            traffic_light::create_asset(&params)
        });
        registry.register(stop_sign::MESH_ID, |values, textures| {
            let params = stop_sign::StopSignParams::resolve(values)
                .map_err(invalid(stop_sign::MESH_ID))?;
            stop_sign::create_asset(&params, textures)
        });
        registry
    }

    /// Use `textures` for builders that look textures up.
    pub fn with_textures(mut self, textures: impl TextureSource + 'static) -> Self {
        self.textures = Arc::new(textures);
        self
    }

    /// Register or replace the factory for `id`.
    pub fn register(
        &mut self,
        id: &'static str,
        factory: impl Fn(&ParamValues, &dyn TextureSource) -> Result<ProceduralAsset, BuildError>
        + Send
        + Sync
        + 'static,
    ) {
        if self.factories.insert(id, Box::new(factory)).is_some() {
            debug!("Replaced mesh factory '{}'", id);
        }
    }

    /// Register a single-part builder whose values resolve against its schema.
    pub fn register_builder<P: BuilderParams>(
        &mut self,
        id: &'static str,
        create: impl Fn(&P) -> Result<ProceduralAsset, BuildError> + Send + Sync + 'static,
    ) {
        self.register(id, move |values, _| {
            let params = P::resolve(values).map_err(invalid(id))?;
            create(&params)
        });
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<&'static str> = self.factories.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Build the mesh `id` from `values`. Missing values take their defaults.
    ///
    /// # Errors
    /// [`BuildError::UnknownMesh`] for unregistered ids,
    /// [`BuildError::InvalidParams`] for unknown or mistyped values, and any
    /// structural failure of the builder.
    pub fn create(&self, id: &str, values: &ParamValues) -> Result<ProceduralAsset, BuildError> {
        let factory = self
            .factories
            .get(id)
            .ok_or_else(|| BuildError::UnknownMesh(id.to_string()))?;
        factory(values, self.textures.as_ref())
    }
}
