//! Error types for geometry, builders and parameter rigs.

use thiserror::Error;

pub use crate::material::MaterialSetError;

/// Structural problems with a geometry buffer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("Geometry has no index buffer")]
    MissingIndexBuffer,

    #[error("No group found for region {region} (expected {region_count} regions)")]
    MissingRegionGroup { region: usize, region_count: usize },

    #[error("Cannot merge geometry #{input}: it has no index buffer")]
    MergeNonIndexed { input: usize },

    #[error("Group of region {region} ends at index {end}, past the {index_count} indices")]
    GroupOutOfBounds {
        region: usize,
        end: usize,
        index_count: usize,
    },

    #[error("Group uses region {material_index} but only {region_count} regions exist")]
    RegionOutOfRange {
        material_index: usize,
        region_count: usize,
    },

    #[error("Merged vertex count {count} exceeds u32 index range")]
    TooManyVertices { count: usize },
}

/// Errors raised while building an asset.
///
/// Only structural failures end up here. Out-of-range parameters are clamped
/// and missing textures fall back to flat colors, neither is an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("Unknown mesh id '{0}'")]
    UnknownMesh(String),

    #[error("Invalid parameters for '{mesh}': {source}")]
    InvalidParams {
        mesh: String,
        #[source]
        source: Box<ParamError>,
    },

    #[error("Mesh '{mesh}': {source}")]
    Geometry {
        mesh: &'static str,
        #[source]
        source: GeometryError,
    },

    #[error("Composite '{composite}', part '{part}': {source}")]
    Part {
        composite: &'static str,
        part: &'static str,
        #[source]
        source: GeometryError,
    },

    #[error("Composite '{composite}' merge failed: {source}")]
    Merge {
        composite: &'static str,
        #[source]
        source: GeometryError,
    },

    #[error("Mesh '{mesh}' materials: {source}")]
    Materials {
        mesh: &'static str,
        #[source]
        source: MaterialSetError,
    },
}

impl BuildError {
    /// Wraps a geometry error with the mesh id it happened in.
    pub fn geometry(mesh: &'static str, source: GeometryError) -> Self {
        Self::Geometry { mesh, source }
    }
}

/// Errors returned by parameter rigs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("Unknown parameter '{0}'")]
    UnknownParam(String),

    #[error("Parameter '{id}' expects a {expected} value")]
    TypeMismatch { id: String, expected: &'static str },

    #[error("Asset has no parameter rig")]
    NoRig,

    #[error("Rebuild for '{id}' failed: {source}")]
    Rebuild {
        id: String,
        #[source]
        source: BuildError,
    },
}
