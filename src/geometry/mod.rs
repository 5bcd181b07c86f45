//! Grouped triangle buffers and the operations on them.
//!
//! - [`GeometryBuffer`]: vertex attributes, optional index buffer and a group
//!   table mapping index ranges to region indices
//! - [`RegionMeshBuilder`]: incremental construction with region tagging
//! - bounds, per-region extraction and merging
//! - generic primitives and path tubes used by the mesh builders

mod bounds;
mod buffer;
mod builder;
mod classify;
mod extract;
mod merge;
mod primitives;
mod tube;

pub use bounds::{aabb_from_points, aabb_union};
pub use buffer::{GeometryBuffer, GeometryGroup};
pub use builder::RegionMeshBuilder;
pub use classify::{TriangleInfo, regroup_by_region};
pub use extract::extract_region_geometries;
pub use merge::merge_geometries;
pub use primitives::{CylinderDesc, cuboid, cylinder, lathe, uv_sphere};
pub use tube::{TubeDesc, polyline_length, sweep_tube};
