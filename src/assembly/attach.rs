//! Attachment points on bounding boxes.

use bevy::math::bounding::Aabb3d;
use bevy::prelude::*;

/// Where along one axis of a box a point sits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum AxisPoint {
    Min,
    #[default]
    Center,
    Max,
}

impl AxisPoint {
    fn pick(self, min: f32, max: f32) -> f32 {
        match self {
            Self::Min => min,
            Self::Center => (min + max) * 0.5,
            Self::Max => max,
        }
    }
}

/// A point on a box, chosen per axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub struct BoxPoint {
    pub x: AxisPoint,
    pub y: AxisPoint,
    pub z: AxisPoint,
}

impl BoxPoint {
    pub const fn new(x: AxisPoint, y: AxisPoint, z: AxisPoint) -> Self {
        Self { x, y, z }
    }

    pub fn resolve(&self, aabb: &Aabb3d) -> Vec3 {
        Vec3::new(
            self.x.pick(aabb.min.x, aabb.max.x),
            self.y.pick(aabb.min.y, aabb.max.y),
            self.z.pick(aabb.min.z, aabb.max.z),
        )
    }
}

/// Places one part against a region of another.
///
/// The `anchor_point` of the anchor region's index-aware box and the
/// `reference_point` of the moving part's combined box are made to coincide.
/// Part indices refer to the composite's part list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub anchor_part: usize,
    pub anchor_region: &'static str,
    pub anchor_point: BoxPoint,
    pub moving_part: usize,
    pub reference_point: BoxPoint,
}
