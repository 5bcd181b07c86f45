//! Per-region sub-geometry extraction.

use std::sync::OnceLock;

use super::GeometryBuffer;
use crate::error::GeometryError;

/// Split a grouped buffer into one ungrouped sub-geometry per region.
///
/// Region `i` is looked up by `group.material_index == i`. The call is
/// all-or-nothing: if any region in `0..region_count` has no group, or its
/// group runs past the index buffer, the whole extraction fails, so callers
/// never see partial region data.
///
/// Each result shares the complete vertex data of the source (cloned) and
/// keeps only the index range of its group.
pub fn extract_region_geometries(
    geometry: &GeometryBuffer,
    region_count: usize,
) -> Result<Vec<GeometryBuffer>, GeometryError> {
    let indices = geometry
        .indices
        .as_ref()
        .ok_or(GeometryError::MissingIndexBuffer)?;

    let mut groups = Vec::with_capacity(region_count);
    for region in 0..region_count {
        let group = geometry
            .groups
            .iter()
            .find(|g| g.material_index == region)
            .ok_or(GeometryError::MissingRegionGroup {
                region,
                region_count,
            })?;
        if group.end() > indices.len() {
            return Err(GeometryError::GroupOutOfBounds {
                region,
                end: group.end(),
                index_count: indices.len(),
            });
        }
        groups.push(*group);
    }

    Ok(groups
        .into_iter()
        .map(|group| {
            let (start, end) = (group.start, group.end());
            GeometryBuffer {
                positions: geometry.positions.clone(),
                normals: geometry.normals.clone(),
                uvs: geometry.uvs.clone(),
                colors: geometry.colors.clone(),
                color_ramp: geometry.color_ramp.clone(),
                indices: Some(indices[start..end].to_vec()),
                groups: Vec::new(),
                bounds: OnceLock::new(),
            }
        })
        .collect())
}
