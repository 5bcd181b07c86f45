//! Material set validation utilities.

use thiserror::Error;

use super::{AssetMaterials, RegionMaterial, SolidMaterials};
use crate::region::Region;

/// Errors that can occur when validating an asset's material sets.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MaterialSetError {
    #[error("Asset has no regions")]
    NoRegions,

    #[error("Semantic material count ({materials}) does not match region count ({regions})")]
    SemanticCountMismatch { regions: usize, materials: usize },

    #[error("Solid material count ({materials}) does not match region count ({regions})")]
    SolidCountMismatch { regions: usize, materials: usize },

    #[error("Material '{name}' has {field} {value} outside [0, 1]")]
    OutOfRange {
        name: String,
        field: &'static str,
        value: f32,
    },
}

/// Validate material count against the region count.
fn validate_material_count(
    material_count: usize,
    region_count: usize,
) -> Result<(), MaterialSetError> {
    if region_count == 0 {
        return Err(MaterialSetError::NoRegions);
    }

    if material_count != region_count {
        return Err(MaterialSetError::SemanticCountMismatch {
            regions: region_count,
            materials: material_count,
        });
    }

    Ok(())
}

/// Validate the factors of one material.
fn validate_material(material: &RegionMaterial) -> Result<(), MaterialSetError> {
    for (field, value) in [
        ("roughness", material.roughness),
        ("metallic", material.metallic),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(MaterialSetError::OutOfRange {
                name: material.name.clone(),
                field,
                value,
            });
        }
    }
    Ok(())
}

/// Validate both material sets of an asset against its regions.
///
/// The semantic set must be parallel to `regions`; a per-region solid set
/// must be as well, a shared one always passes the count check.
pub fn validate_material_set(
    regions: &[Region],
    materials: &AssetMaterials,
) -> Result<(), MaterialSetError> {
    validate_material_count(materials.semantic.len(), regions.len())?;

    if let SolidMaterials::PerRegion(solid) = &materials.solid
        && solid.len() != regions.len()
    {
        return Err(MaterialSetError::SolidCountMismatch {
            regions: regions.len(),
            materials: solid.len(),
        });
    }

    materials
        .semantic
        .iter()
        .chain(materials.solid.iter())
        .try_for_each(validate_material)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::BALL_REGIONS;

    fn semantic(regions: &[Region]) -> Vec<RegionMaterial> {
        regions.iter().map(RegionMaterial::semantic).collect()
    }

    #[test]
    fn test_valid_set() {
        let regions = BALL_REGIONS.regions();
        let materials = AssetMaterials {
            semantic: semantic(&regions),
            solid: SolidMaterials::Shared(RegionMaterial::new("rubber")),
        };
        assert_eq!(validate_material_set(&regions, &materials), Ok(()));
    }

    #[test]
    fn test_count_mismatch() {
        let regions = BALL_REGIONS.regions();
        let materials = AssetMaterials {
            semantic: semantic(&regions[..3]),
            solid: SolidMaterials::Shared(RegionMaterial::new("rubber")),
        };
        assert_eq!(
            validate_material_set(&regions, &materials),
            Err(MaterialSetError::SemanticCountMismatch {
                regions: 5,
                materials: 3
            })
        );
    }

    #[test]
    fn test_solid_count_mismatch() {
        let regions = BALL_REGIONS.regions();
        let materials = AssetMaterials {
            semantic: semantic(&regions),
            solid: SolidMaterials::PerRegion(vec![RegionMaterial::new("rubber")]),
        };
        assert!(matches!(
            validate_material_set(&regions, &materials),
            Err(MaterialSetError::SolidCountMismatch { .. })
        ));
    }

    #[test]
    fn test_out_of_range_factor() {
        let bad = RegionMaterial::new("chrome").with_metallic(1.5);
        assert!(matches!(
            validate_material(&bad),
            Err(MaterialSetError::OutOfRange {
                field: "metallic",
                ..
            })
        ));
    }

    #[test]
    fn test_no_regions() {
        assert_eq!(
            validate_material_count(0, 0),
            Err(MaterialSetError::NoRegions)
        );
    }
}
