//! Merging several buffers into one.

use std::sync::OnceLock;

use super::{GeometryBuffer, GeometryGroup};
use crate::error::GeometryError;

/// Concatenate vertex and index data of every input.
///
/// The merged buffer gets one group per input: input `i` becomes material
/// index `i`. Index values are offset automatically. If any input carries UVs, colors or
/// a color ramp, inputs without them are padded (zero UVs, white, zero ramp).
/// Inputs with no triangles contribute no group.
///
/// # Errors
/// Every input must be indexed; the merged vertex count must fit in `u32`.
pub fn merge_geometries(inputs: &[GeometryBuffer]) -> Result<GeometryBuffer, GeometryError> {
    if let Some(input) = inputs.iter().position(|g| g.indices.is_none()) {
        return Err(GeometryError::MergeNonIndexed { input });
    }

    let total_vertices: usize = inputs.iter().map(|g| g.positions.len()).sum();
    let total_indices: usize = inputs.iter().map(|g| g.index_count()).sum();
    if total_vertices > u32::MAX as usize {
        return Err(GeometryError::TooManyVertices {
            count: total_vertices,
        });
    }

    let has_uvs = inputs.iter().any(|g| !g.uvs.is_empty());
    let has_colors = inputs.iter().any(|g| !g.colors.is_empty());
    let has_ramp = inputs.iter().any(|g| !g.color_ramp.is_empty());

    let mut out = GeometryBuffer {
        positions: Vec::with_capacity(total_vertices),
        normals: Vec::with_capacity(total_vertices),
        uvs: Vec::new(),
        colors: Vec::new(),
        color_ramp: Vec::new(),
        indices: None,
        groups: Vec::new(),
        bounds: OnceLock::new(),
    };
    let mut indices = Vec::with_capacity(total_indices);

    for (i, input) in inputs.iter().enumerate() {
        let vertex_offset = out.positions.len() as u32;
        let index_offset = indices.len();
        let vertex_total = out.positions.len() + input.positions.len();

        out.positions.extend_from_slice(&input.positions);
        out.normals.extend_from_slice(&input.normals);
        out.normals.resize(vertex_total, [0.0, 1.0, 0.0]);

        if has_uvs {
            out.uvs.extend_from_slice(&input.uvs);
            out.uvs.resize(vertex_total, [0.0, 0.0]);
        }
        if has_colors {
            out.colors.extend_from_slice(&input.colors);
            out.colors.resize(vertex_total, [1.0, 1.0, 1.0, 1.0]);
        }
        if has_ramp {
            out.color_ramp.extend_from_slice(&input.color_ramp);
            out.color_ramp.resize(vertex_total, 0.0);
        }

        let source = input.indices.as_deref().unwrap_or(&[]);
        indices.extend(source.iter().map(|&idx| idx + vertex_offset));

        if !source.is_empty() {
            out.groups
                .push(GeometryGroup::new(index_offset, source.len(), i));
        }
    }

    out.indices = Some(indices);
    Ok(out)
}
