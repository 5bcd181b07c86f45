//! Geometry builders, one module per mesh type.
//!
//! Every builder exposes a `MESH_ID`, a params struct implementing
//! [`BuilderParams`], a pure `build(&params) -> GeometryBuffer` and
//! `create_asset(&params)` returning a rigged [`ProceduralAsset`].

pub mod ball;
pub mod blade;
pub mod pole;
pub mod pole_arm;
pub mod sign_plate;
pub mod signal_head;
pub mod stop_sign;
pub mod traffic_light;

use std::sync::Arc;

use bevy::log::debug;

use crate::assembly::Assembly;
use crate::asset::{AssetSource, ProceduralAsset};
use crate::error::{BuildError, GeometryError, ParamError};
use crate::geometry::GeometryBuffer;
use crate::material::{AssetMaterials, validate_material_set};
use crate::param::{
    AssetRig, CompositeRig, ParamRig, ParamSpec, ParamValues, PatchTarget, RigHooks, find_spec,
    resolve_values,
};
use crate::region::RegionCatalog;

/// Typed builder parameters backed by a schema.
pub trait BuilderParams: Clone + Default + Send + Sync + 'static {
    fn schema() -> Vec<ParamSpec>;

    /// Read params from a value set. Missing or mistyped entries keep their
    /// default.
    fn from_values(values: &ParamValues) -> Self;

    fn to_values(&self) -> ParamValues;

    /// Normalize `values` against the schema and read them.
    ///
    /// # Errors
    /// Unknown ids and values of the wrong type.
    fn resolve(values: &ParamValues) -> Result<Self, ParamError> {
        Ok(Self::from_values(&resolve_values(&Self::schema(), values)?))
    }

    /// Copy with every field clamped and snapped to its domain.
    fn normalized(&self) -> Self {
        resolve_values(&Self::schema(), &self.to_values())
            .map(|values| Self::from_values(&values))
            .unwrap_or_default()
    }
}

/// Version number from a `mesh.name.vN` id.
pub fn mesh_version(mesh_id: &str) -> u32 {
    mesh_id
        .rsplit_once(".v")
        .and_then(|(_, v)| v.parse().ok())
        .unwrap_or(1)
}

/// Rig hooks for a builder: rebuild calls `build`, patches go to `patch`.
pub(crate) struct BuilderHooks<P> {
    pub build: fn(&P) -> GeometryBuffer,
    pub patch: fn(&str, &P, &mut PatchTarget<'_>),
}

impl<P: BuilderParams> RigHooks for BuilderHooks<P> {
    fn patch(&self, id: &str, values: &ParamValues, target: &mut PatchTarget<'_>) {
        (self.patch)(id, &P::from_values(values), target);
    }

    fn rebuild(&self, values: &ParamValues) -> Result<GeometryBuffer, BuildError> {
        Ok((self.build)(&P::from_values(values)))
    }
}

/// Check that `geometry` is indexed and every group points at a region.
pub(crate) fn check_groups(
    mesh_id: &'static str,
    geometry: &GeometryBuffer,
    region_count: usize,
) -> Result<(), BuildError> {
    if geometry.indices().is_none() {
        return Err(BuildError::geometry(mesh_id, GeometryError::MissingIndexBuffer));
    }
    if let Some(group) = geometry
        .groups()
        .iter()
        .find(|g| g.material_index >= region_count)
    {
        return Err(BuildError::geometry(
            mesh_id,
            GeometryError::RegionOutOfRange {
                material_index: group.material_index,
                region_count,
            },
        ));
    }
    Ok(())
}

/// Package a single builder's output as a rigged asset.
pub(crate) fn finish_single<P: BuilderParams>(
    mesh_id: &'static str,
    name: &str,
    catalog: &RegionCatalog,
    params: &P,
    hooks: BuilderHooks<P>,
    materials: AssetMaterials,
) -> Result<ProceduralAsset, BuildError> {
    let geometry = (hooks.build)(params);
    let regions = catalog.regions();
    check_groups(mesh_id, &geometry, regions.len())?;
    validate_material_set(&regions, &materials)
        .map_err(|source| BuildError::Materials { mesh: mesh_id, source })?;

    debug!(
        "Built {}: {} vertices, {} triangles, {} groups",
        mesh_id,
        geometry.vertex_count(),
        geometry.triangle_count(),
        geometry.groups().len()
    );

    let rig = ParamRig::new(P::schema(), params.normalized().to_values(), Arc::new(hooks));
    Ok(ProceduralAsset::new(
        mesh_id,
        name,
        AssetSource::procedural(mesh_version(mesh_id)),
        regions,
        geometry,
        materials,
    )
    .with_rig(AssetRig::Single(rig)))
}

/// Rig for a part mounted in a composite, exposing only the ids `keep`
/// accepts.
pub(crate) fn part_rig<P: BuilderParams>(
    params: &P,
    hooks: BuilderHooks<P>,
    keep: impl Fn(&str) -> bool,
) -> ParamRig {
    let schema: Vec<ParamSpec> = P::schema().into_iter().filter(|s| keep(s.id)).collect();
    let values: ParamValues = params
        .normalized()
        .to_values()
        .iter()
        .filter(|(id, _)| find_spec(&schema, id).is_some())
        .map(|(id, value)| (id, value.clone()))
        .collect();
    ParamRig::new(schema, values, Arc::new(hooks))
}

/// Package an assembly as a rigged composite asset.
pub(crate) fn finish_composite(
    mesh_id: &'static str,
    name: &str,
    parts: &[&'static str],
    assembly: Assembly,
    rig: CompositeRig,
) -> Result<ProceduralAsset, BuildError> {
    check_groups(mesh_id, &assembly.geometry, assembly.regions.len())?;
    validate_material_set(&assembly.regions, &assembly.materials)
        .map_err(|source| BuildError::Materials { mesh: mesh_id, source })?;

    debug!(
        "Built {}: {} regions from {} parts, {} triangles",
        mesh_id,
        assembly.regions.len(),
        parts.len(),
        assembly.geometry.triangle_count()
    );

    Ok(ProceduralAsset::new(
        mesh_id,
        name,
        AssetSource::composite(mesh_version(mesh_id), parts.iter().copied()),
        assembly.regions,
        assembly.geometry,
        assembly.materials,
    )
    .with_rig(AssetRig::Composite(rig)))
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::asset::ProceduralAsset;
    use crate::material::RegionMaterial;

    /// Indices of materials with a lit emissive term.
    pub(crate) fn lit(materials: &[RegionMaterial]) -> Vec<usize> {
        materials
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_lit())
            .map(|(i, _)| i)
            .collect()
    }

    /// Invariants every built asset must hold.
    pub(crate) fn assert_asset_invariants(asset: &ProceduralAsset) {
        let regions = asset.region_count();
        assert_eq!(regions, asset.materials.semantic.len(), "{}", asset.id);
        assert!(asset.geometry.is_fully_grouped(), "{} is not fully grouped", asset.id);
        for group in asset.geometry.groups() {
            assert!(group.material_index < regions, "{}", asset.id);
            assert_eq!(group.count % 3, 0);
        }
        let vertex_count = asset.geometry.vertex_count() as u32;
        for &i in asset.geometry.indices().unwrap() {
            assert!(i < vertex_count);
        }
        for n in asset.geometry.normals() {
            assert!(n.iter().all(|c| c.is_finite()));
        }
    }
}
