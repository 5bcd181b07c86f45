//! Procedurally built assets.

use bevy::prelude::*;

use crate::error::ParamError;
use crate::geometry::GeometryBuffer;
use crate::material::AssetMaterials;
use crate::param::{AssetRig, ParamChange, ParamSpec, ParamValue, ParamValues, RigTarget};
use crate::region::Region;

/// How an asset was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect)]
pub enum SourceKind {
    /// Built directly by a geometry builder.
    Procedural,
    /// Assembled from other assets.
    Composite,
}

/// Provenance of an asset.
#[derive(Clone, Debug, PartialEq, Eq, Reflect)]
pub struct AssetSource {
    pub kind: SourceKind,
    /// Version suffix of the mesh id.
    pub version: u32,
    /// Mesh ids of the parts, in part order. Empty for procedural assets.
    pub parts: Vec<String>,
}

impl AssetSource {
    pub fn procedural(version: u32) -> Self {
        Self {
            kind: SourceKind::Procedural,
            version,
            parts: Vec::new(),
        }
    }

    pub fn composite(version: u32, parts: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            kind: SourceKind::Composite,
            version,
            parts: parts.into_iter().map(str::to_string).collect(),
        }
    }
}

/// A built asset: geometry, regions, materials and an optional rig.
///
/// `regions`, `materials.semantic` and the group material indices are kept
/// parallel. The asset only changes through [`set_param`](Self::set_param)
/// and [`set_region_color`](Self::set_region_color).
#[derive(Clone, Debug)]
pub struct ProceduralAsset {
    pub id: String,
    pub name: String,
    pub source: AssetSource,
    pub regions: Vec<Region>,
    pub geometry: GeometryBuffer,
    pub materials: AssetMaterials,
    pub rig: Option<AssetRig>,
    revision: u64,
    geometry_revision: u64,
}

impl ProceduralAsset {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        source: AssetSource,
        regions: Vec<Region>,
        geometry: GeometryBuffer,
        materials: AssetMaterials,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            source,
            regions,
            geometry,
            materials,
            rig: None,
            revision: 0,
            geometry_revision: 0,
        }
    }

    pub fn with_rig(mut self, rig: AssetRig) -> Self {
        self.rig = Some(rig);
        self
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Counter advanced by every applied parameter change and color edit.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Counter advanced whenever the geometry buffer changes: every rebuild,
    /// and patches that edit vertex data.
    pub fn geometry_revision(&self) -> u64 {
        self.geometry_revision
    }

    pub fn region_index(&self, id: &str) -> Option<usize> {
        self.regions.iter().position(|r| r.id == id)
    }

    /// Region of a triangle, through the group containing it.
    pub fn region_for_triangle(&self, triangle: usize) -> Option<&Region> {
        self.geometry
            .group_for_triangle(triangle)
            .and_then(|group| self.regions.get(group.material_index))
    }

    /// Set a parameter through the rig.
    ///
    /// # Errors
    /// [`ParamError::NoRig`] when the asset has no rig, otherwise whatever the
    /// rig reports. State is unchanged on error.
    pub fn set_param(
        &mut self,
        path: &str,
        value: impl Into<ParamValue>,
    ) -> Result<ParamChange, ParamError> {
        let rig = self.rig.as_mut().ok_or(ParamError::NoRig)?;
        let change = rig.set_value(
            path,
            value,
            RigTarget {
                materials: &mut self.materials,
                geometry: &mut self.geometry,
            },
        )?;
        if change != ParamChange::Unchanged {
            self.revision += 1;
        }
        if change.touches_geometry() {
            self.geometry_revision += 1;
        }
        Ok(change)
    }

    pub fn get_param(&self, path: &str) -> Option<&ParamValue> {
        self.rig.as_ref().and_then(|rig| rig.get(path))
    }

    /// Flattened live parameter values (empty without a rig).
    pub fn param_values(&self) -> ParamValues {
        self.rig.as_ref().map(AssetRig::values).unwrap_or_default()
    }

    /// Every `(path, spec)` a UI can edit.
    pub fn param_entries(&self) -> Vec<(String, ParamSpec)> {
        self.rig.as_ref().map(AssetRig::entries).unwrap_or_default()
    }

    /// Override the color of one region on this asset only.
    ///
    /// Updates the asset's region copy and its semantic material; the catalog
    /// and the solid set are untouched. Returns `false` for an unknown index.
    pub fn set_region_color(&mut self, index: usize, color: u32) -> bool {
        let (Some(region), Some(material)) = (
            self.regions.get_mut(index),
            self.materials.semantic.get_mut(index),
        ) else {
            return false;
        };
        region.color = color & 0x00FF_FFFF;
        material.base_color = region.srgba();
        self.revision += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{MaterialSetBuilder, RegionMaterial};
    use crate::region::{BLADE_REGIONS, hex_to_srgba};

    fn two_region_asset() -> ProceduralAsset {
        let regions = BLADE_REGIONS.regions();
        let mut geometry = GeometryBuffer::new(
            vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
            Some(vec![0, 1, 2, 1, 3, 2]),
        );
        geometry.add_group(0, 3, 0);
        geometry.add_group(3, 3, 1);
        let materials = MaterialSetBuilder::from_regions(&regions)
            .with_shared_solid(RegionMaterial::new("grass"))
            .build();
        ProceduralAsset::new(
            "test.asset",
            "Test",
            AssetSource::procedural(1),
            regions,
            geometry,
            materials,
        )
    }

    #[test]
    fn test_region_for_triangle() {
        let asset = two_region_asset();
        assert_eq!(asset.region_for_triangle(0).unwrap().id, "blade:base");
        assert_eq!(asset.region_for_triangle(1).unwrap().id, "blade:tip");
        assert!(asset.region_for_triangle(2).is_none());
    }

    #[test]
    fn test_set_region_color_is_local() {
        let mut asset = two_region_asset();
        assert!(asset.set_region_color(1, 0x102030));

        assert_eq!(asset.regions[1].color, 0x102030);
        assert_eq!(asset.materials.semantic[1].base_color, hex_to_srgba(0x102030));
        assert_eq!(BLADE_REGIONS.entries[1].color, 0xA8C66C);
        assert_eq!(asset.revision(), 1);
        assert!(!asset.set_region_color(5, 0));
    }

    #[test]
    fn test_set_param_without_rig() {
        let mut asset = two_region_asset();
        assert_eq!(asset.set_param("anything", 1.0), Err(ParamError::NoRig));
        assert!(asset.param_entries().is_empty());
        assert!(asset.get_param("anything").is_none());
    }

    #[test]
    fn test_composite_source() {
        let source = AssetSource::composite(1, ["mesh.pole.v1", "mesh.sign_plate.v1"]);
        assert_eq!(source.kind, SourceKind::Composite);
        assert_eq!(source.parts.len(), 2);
    }
}
