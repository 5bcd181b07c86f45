//! Region-preserving assembly of part assets.

use std::ops::Range;

use bevy::log::{debug, warn};
use bevy::math::bounding::Aabb3d;
use bevy::prelude::*;

use super::Attachment;
use crate::asset::ProceduralAsset;
use crate::error::BuildError;
use crate::geometry::{GeometryBuffer, aabb_union, extract_region_geometries, merge_geometries};
use crate::material::AssetMaterials;
use crate::region::Region;

/// One part of a composite: a built asset and its orientation fix-up.
#[derive(Debug)]
pub struct CompositePart {
    pub key: &'static str,
    pub asset: ProceduralAsset,
    pub orientation: Quat,
}

impl CompositePart {
    pub fn new(key: &'static str, asset: ProceduralAsset) -> Self {
        Self {
            key,
            asset,
            orientation: Quat::IDENTITY,
        }
    }

    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self
    }
}

/// Output of [`assemble`]: concatenated regions and materials with the merged
/// geometry.
#[derive(Debug)]
pub struct Assembly {
    pub regions: Vec<Region>,
    pub geometry: GeometryBuffer,
    pub materials: AssetMaterials,
    /// Region range of each part in the concatenated list, in part order.
    pub part_ranges: Vec<Range<usize>>,
}

/// Combined index-aware box of a set of sub-geometries.
fn combined_box(parts: &[GeometryBuffer]) -> Option<Aabb3d> {
    parts
        .iter()
        .filter_map(GeometryBuffer::compute_indexed_bounding_box)
        .reduce(aabb_union)
}

fn anchor_point(
    parts: &[CompositePart],
    placed: &[Vec<GeometryBuffer>],
    attachment: &Attachment,
) -> Option<Vec3> {
    let region = parts
        .get(attachment.anchor_part)?
        .asset
        .region_index(attachment.anchor_region)?;
    let aabb = placed[attachment.anchor_part]
        .get(region)?
        .compute_indexed_bounding_box()?;
    Some(attachment.anchor_point.resolve(&aabb))
}

/// Merge part geometries into one buffer whose group `i` is region `i` of the
/// concatenated region list.
///
/// Every part is split into per-region sub-geometries, oriented, then moved
/// by its attachments in order. A missing anchor region or an empty box
/// leaves the moving part where it is and logs a warning. Normals are
/// recomputed over the merged result.
///
/// # Errors
/// [`BuildError::Part`] when a part lacks an index buffer or a region group,
/// [`BuildError::Merge`] when the merge itself fails.
pub fn assemble_geometry(
    composite: &'static str,
    parts: &[CompositePart],
    attachments: &[Attachment],
) -> Result<GeometryBuffer, BuildError> {
    let mut placed = Vec::with_capacity(parts.len());
    for part in parts {
        let mut subs = extract_region_geometries(&part.asset.geometry, part.asset.region_count())
            .map_err(|source| BuildError::Part {
                composite,
                part: part.key,
                source,
            })?;
        let orient = Mat4::from_quat(part.orientation);
        for sub in &mut subs {
            *sub = sub.compacted();
            if part.orientation != Quat::IDENTITY {
                sub.apply_transform(&orient);
            }
        }
        placed.push(subs);
    }

    for attachment in attachments {
        let Some(anchor) = anchor_point(parts, &placed, attachment) else {
            warn!(
                "{}: anchor region '{}' not found or empty, leaving part {} in place",
                composite, attachment.anchor_region, attachment.moving_part
            );
            continue;
        };
        let Some(moving) = placed.get_mut(attachment.moving_part) else {
            warn!("{}: no part {} to attach", composite, attachment.moving_part);
            continue;
        };
        let Some(reference) = combined_box(moving).map(|b| attachment.reference_point.resolve(&b))
        else {
            warn!(
                "{}: part {} has an empty box, leaving it in place",
                composite, attachment.moving_part
            );
            continue;
        };

        let offset = Mat4::from_translation(anchor - reference);
        for sub in moving.iter_mut() {
            sub.apply_transform(&offset);
        }
    }

    let flat: Vec<GeometryBuffer> = placed.into_iter().flatten().collect();
    let mut merged = merge_geometries(&flat)
        .map_err(|source| BuildError::Merge { composite, source })?;
    merged.compute_vertex_normals();

    debug!(
        "Assembled {}: {} parts, {} regions, {} triangles",
        composite,
        parts.len(),
        merged.groups().len(),
        merged.triangle_count()
    );
    Ok(merged)
}

/// Assemble geometry and concatenate regions and materials of `parts`.
///
/// The parts are consumed; their buffers are dropped once merged.
pub fn assemble(
    composite: &'static str,
    parts: Vec<CompositePart>,
    attachments: &[Attachment],
) -> Result<Assembly, BuildError> {
    let geometry = assemble_geometry(composite, &parts, attachments)?;

    let mut regions = Vec::new();
    let mut part_ranges = Vec::with_capacity(parts.len());
    for part in &parts {
        let start = regions.len();
        regions.extend(part.asset.regions.iter().cloned());
        part_ranges.push(start..regions.len());
    }
    let materials = AssetMaterials::concat(parts.iter().map(|p| &p.asset.materials));

    Ok(Assembly {
        regions,
        geometry,
        materials,
        part_ranges,
    })
}
