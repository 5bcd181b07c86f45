//! Builder for constructing an asset's material sets.

use bevy::prelude::*;

use super::{AssetMaterials, RegionMaterial, SolidMaterials};
use crate::region::{Region, hex_to_srgba};

/// Builder for [`AssetMaterials`].
///
/// # Example
///
/// ```
/// use bevy_propgen::material::{MaterialSetBuilder, RegionMaterial};
/// use bevy_propgen::region::POLE_REGIONS;
///
/// let regions = POLE_REGIONS.regions();
/// let materials = MaterialSetBuilder::from_regions(&regions)
///     .with_shared_solid(RegionMaterial::new("galvanized").with_metallic(0.8))
///     .build();
/// assert_eq!(materials.semantic.len(), 3);
/// ```
#[derive(Default)]
pub struct MaterialSetBuilder {
    semantic: Vec<RegionMaterial>,
    solid: Vec<RegionMaterial>,
    shared: Option<RegionMaterial>,
}

impl MaterialSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// One semantic material per region, in region order.
    pub fn from_regions(regions: &[Region]) -> Self {
        Self {
            semantic: regions.iter().map(RegionMaterial::semantic).collect(),
            ..Default::default()
        }
    }

    /// Add a region with an explicit solid material.
    pub fn add_region(mut self, region: &Region, solid: RegionMaterial) -> Self {
        self.semantic.push(RegionMaterial::semantic(region));
        self.solid.push(solid);
        self
    }

    /// Use the tag presets of [`solid_preset`] for the solid set.
    pub fn with_solid_presets(mut self, regions: &[Region]) -> Self {
        self.solid = regions.iter().map(solid_preset).collect();
        self
    }

    /// Use one material for every region in the solid set.
    pub fn with_shared_solid(mut self, material: RegionMaterial) -> Self {
        self.shared = Some(material);
        self
    }

    /// Modify the semantic and solid material of region `index`.
    pub fn map_region(mut self, index: usize, mut f: impl FnMut(&mut RegionMaterial)) -> Self {
        if let Some(material) = self.semantic.get_mut(index) {
            f(material);
        }
        if let Some(material) = self.solid.get_mut(index) {
            f(material);
        }
        self
    }

    /// Modify every material in both sets.
    pub fn map_all(mut self, mut f: impl FnMut(&mut RegionMaterial)) -> Self {
        self.semantic.iter_mut().for_each(&mut f);
        self.solid.iter_mut().for_each(&mut f);
        if let Some(shared) = &mut self.shared {
            f(shared);
        }
        self
    }

    /// Build the sets.
    ///
    /// A shared material wins over per-region solids. Without either, the
    /// solid set is a single neutral material.
    pub fn build(self) -> AssetMaterials {
        let solid = match self.shared {
            Some(shared) => SolidMaterials::Shared(shared),
            None if self.solid.is_empty() => SolidMaterials::Shared(RegionMaterial::new("solid")),
            None => SolidMaterials::PerRegion(self.solid),
        };
        AssetMaterials {
            semantic: self.semantic,
            solid,
        }
    }
}

/// Default solid material for a region, chosen by its tag.
///
/// | tag | look |
/// |---|---|
/// | `structure` | dark painted metal |
/// | `trim` | satin black |
/// | `lens` | region color, glossy, emissive color set but off |
/// | `face` | region color, semi-gloss |
/// | `foliage` | white base (vertex colors carry the tint), double sided |
/// | other | region color |
pub fn solid_preset(region: &Region) -> RegionMaterial {
    let base = RegionMaterial::new(region.id.clone());
    match region.tag.as_str() {
        "structure" => base
            .with_base_color(hex_to_srgba(0x4A4F55))
            .with_roughness(0.5)
            .with_metallic(0.6),
        "trim" => base
            .with_base_color(hex_to_srgba(0x1C1C1C))
            .with_roughness(0.4)
            .with_metallic(0.3),
        "lens" => base
            .with_base_color(region.srgba().mix(&Srgba::BLACK, 0.6))
            .with_emissive(region.linear(), 0.0)
            .with_roughness(0.15),
        "face" => base.with_base_color(region.srgba()).with_roughness(0.45),
        "foliage" => base
            .with_base_color(Srgba::WHITE)
            .with_roughness(0.8)
            .with_double_sided(true),
        _ => base.with_base_color(region.srgba()).with_roughness(0.4),
    }
}
