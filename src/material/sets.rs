//! Material sets carried by an asset.

use std::ops::Range;

use bevy::prelude::*;

use super::RegionMaterial;

/// Materials used when rendering an asset "for real".
#[derive(Clone, Debug, PartialEq, Reflect)]
pub enum SolidMaterials {
    /// One material per region.
    PerRegion(Vec<RegionMaterial>),
    /// One material for every region.
    Shared(RegionMaterial),
}

impl SolidMaterials {
    /// Material used for region `index`.
    pub fn get(&self, index: usize) -> Option<&RegionMaterial> {
        match self {
            Self::PerRegion(materials) => materials.get(index),
            Self::Shared(material) => Some(material),
        }
    }

    /// Every stored material. `Shared` yields one slot.
    pub fn as_mut_slice(&mut self) -> &mut [RegionMaterial] {
        match self {
            Self::PerRegion(materials) => materials,
            Self::Shared(material) => std::slice::from_mut(material),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegionMaterial> {
        let slice: &[RegionMaterial] = match self {
            Self::PerRegion(materials) => materials,
            Self::Shared(material) => std::slice::from_ref(material),
        };
        slice.iter()
    }

    /// One clone per region.
    pub fn expanded(&self, region_count: usize) -> Vec<RegionMaterial> {
        match self {
            Self::PerRegion(materials) => materials.clone(),
            Self::Shared(material) => vec![material.clone(); region_count],
        }
    }
}

/// The two material sets of an asset.
///
/// `semantic[i]` visually encodes region `i`; `solid` is the presentation
/// set.
#[derive(Clone, Debug, PartialEq, Reflect)]
pub struct AssetMaterials {
    pub semantic: Vec<RegionMaterial>,
    pub solid: SolidMaterials,
}

impl AssetMaterials {
    /// Concatenate the sets of composed parts.
    ///
    /// Semantic materials are cloned in part order. Solid sets are expanded so
    /// the composite always holds one solid material per region.
    pub fn concat<'a>(parts: impl IntoIterator<Item = &'a AssetMaterials>) -> Self {
        let mut semantic = Vec::new();
        let mut solid = Vec::new();
        for part in parts {
            solid.extend(part.solid.expanded(part.semantic.len()));
            semantic.extend(part.semantic.iter().cloned());
        }
        Self {
            semantic,
            solid: SolidMaterials::PerRegion(solid),
        }
    }

    pub fn region_count(&self) -> usize {
        self.semantic.len()
    }

    /// Mutable views of both sets restricted to `range`.
    ///
    /// A shared solid material is returned whole regardless of the range.
    pub fn slice_mut(&mut self, range: Range<usize>) -> MaterialSlice<'_> {
        let end = range.end.min(self.semantic.len());
        let start = range.start.min(end);
        let (solid, shared_solid) = match &mut self.solid {
            SolidMaterials::PerRegion(materials) => {
                let end = end.min(materials.len());
                (&mut materials[start.min(end)..end], false)
            }
            SolidMaterials::Shared(material) => (std::slice::from_mut(material), true),
        };
        MaterialSlice {
            semantic: &mut self.semantic[start..end],
            solid,
            shared_solid,
        }
    }

    /// Mutable views of both sets.
    pub fn all_mut(&mut self) -> MaterialSlice<'_> {
        let len = self.semantic.len();
        self.slice_mut(0..len)
    }
}

/// Borrowed semantic and solid materials for a run of regions.
///
/// Indices into `semantic` are region offsets within the run. `solid` has the
/// same length unless the owning set is shared, in which case it holds the
/// single shared material.
pub struct MaterialSlice<'a> {
    pub semantic: &'a mut [RegionMaterial],
    pub solid: &'a mut [RegionMaterial],
    shared_solid: bool,
}

impl MaterialSlice<'_> {
    /// Apply `f` to the semantic and solid material of region `index`.
    ///
    /// With a shared solid set the shared material is not touched, since it
    /// also renders every other region.
    pub fn for_region(&mut self, index: usize, mut f: impl FnMut(&mut RegionMaterial)) {
        if let Some(material) = self.semantic.get_mut(index) {
            f(material);
        }
        if !self.shared_solid
            && let Some(material) = self.solid.get_mut(index)
        {
            f(material);
        }
    }

    /// Solid material of region `index`, unless the solid set is shared.
    pub fn solid_for(&mut self, index: usize) -> Option<&mut RegionMaterial> {
        if self.shared_solid {
            return None;
        }
        self.solid.get_mut(index)
    }

    /// Apply `f` to every solid material in the run.
    pub fn for_each_solid(&mut self, f: impl FnMut(&mut RegionMaterial)) {
        self.solid.iter_mut().for_each(f);
    }
}
