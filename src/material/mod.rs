//! Region materials.
//!
//! Every asset carries two parallel material sets: a semantic set that
//! color-codes regions for inspection, and a solid set used for normal
//! rendering. [`RegionMaterial`] converts to Bevy's [`StandardMaterial`].

mod builder;
mod properties;
mod sets;
pub mod validation;

pub use builder::{MaterialSetBuilder, solid_preset};
pub use properties::RegionMaterial;
pub use sets::{AssetMaterials, MaterialSlice, SolidMaterials};
pub use validation::{MaterialSetError, validate_material_set};
