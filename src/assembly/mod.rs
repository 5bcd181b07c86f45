//! Composite assembly.
//!
//! Parts are split into per-region sub-geometries, placed with box-point
//! attachments and merged so that group `i` of the result is region `i` of
//! the concatenated region list.

mod attach;
mod compose;

pub use attach::{Attachment, AxisPoint, BoxPoint};
pub use compose::{Assembly, CompositePart, assemble, assemble_geometry};
