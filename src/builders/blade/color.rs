//! Base-to-tip vertex color gradient.

use bevy::prelude::*;

use crate::region::hex_to_srgba;

fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Gradient from `base` to `tip` (sRGB hex) as a function of the ramp
/// parameter. Interpolation happens in linear space.
pub(crate) fn gradient(base: u32, tip: u32) -> impl Fn(f32) -> [f32; 4] {
    let base = LinearRgba::from(hex_to_srgba(base));
    let tip = LinearRgba::from(hex_to_srgba(tip));
    move |t| base.mix(&tip, smoothstep(t)).to_f32_array()
}
