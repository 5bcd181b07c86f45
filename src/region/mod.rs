//! Semantic regions and their per-mesh catalogs.

mod catalog;

pub use catalog::{
    BALL_REGIONS, BLADE_REGIONS, HEAD_REGIONS, PLATE_REGIONS, POLE_ARM_REGIONS, POLE_REGIONS,
    Region, RegionCatalog, RegionDef, hex_to_srgba,
};
