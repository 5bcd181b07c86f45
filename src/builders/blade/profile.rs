//! Blade outline, cross-section and bend.

use std::f32::consts::FRAC_PI_2;

use bevy::math::FloatExt;
use bevy::prelude::*;

use super::BladeParams;

/// Exponent of the cross-section cavity curve.
pub(crate) const CAVITY_EXPONENT: f32 = 2.15;

/// Bend angles below this (radians) leave the blade straight.
pub(crate) const MIN_BEND: f32 = 1e-4;

/// Blade shape in meters and radians, with tip mode already applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BladeShape {
    pub length: f32,
    pub base_half: f32,
    pub mid_half: f32,
    pub end_half: f32,
    /// Fraction of the length where the tip begins.
    pub tip_start: f32,
    pub roundness: f32,
    pub bend: f32,
    pub cavity: f32,
}

impl BladeShape {
    pub fn from_params(p: &BladeParams) -> Self {
        let (end_width_cm, roundness) = match p.tip_mode.as_str() {
            "pointy" => (0.0, p.tip_roundness),
            "square" => (p.tip_width_cm, 0.0),
            _ => (p.tip_width_cm, p.tip_roundness),
        };
        Self {
            length: p.height_cm / 100.0,
            base_half: p.base_width_cm / 200.0,
            mid_half: p.mid_width_cm / 200.0,
            end_half: end_width_cm / 200.0,
            tip_start: 1.0 - p.tip_length,
            roundness,
            bend: p.bend_degrees.to_radians(),
            cavity: p.cavity_depth_cm / 100.0,
        }
    }

    /// Half width at normalized height `v`.
    ///
    /// Linear from base to mid over the body, then the tip falls off from mid
    /// to end width along `lerp(1 - s, cos(s * pi / 2), roundness)`.
    pub fn half_width(&self, v: f32) -> f32 {
        if v <= self.tip_start {
            let t = v / self.tip_start.max(f32::EPSILON);
            return self.base_half.lerp(self.mid_half, t);
        }
        let s = ((v - self.tip_start) / (1.0 - self.tip_start).max(f32::EPSILON)).min(1.0);
        let falloff = (1.0 - s).lerp((s * FRAC_PI_2).cos(), self.roundness);
        self.end_half + (self.mid_half - self.end_half) * falloff
    }

    fn widest_half(&self) -> f32 {
        self.base_half.max(self.mid_half).max(f32::EPSILON)
    }

    /// Depth offset at normalized half-width `a` of a row with `half` width.
    pub fn cavity_offset(&self, a: f32, half: f32) -> f32 {
        let curve = 2.0 * a.powf(CAVITY_EXPONENT) - 1.0;
        self.cavity * 0.5 * curve * (half / self.widest_half())
    }

    /// Bend a point of the straight blade along a circular arc in the Y-Z
    /// plane. The centerline keeps its length.
    pub fn bend_point(&self, point: Vec3) -> Vec3 {
        if self.bend.abs() < MIN_BEND {
            return point;
        }
        let radius = self.length / self.bend;
        let phi = point.y / radius;
        let (sin, cos) = phi.sin_cos();
        Vec3::new(
            point.x,
            (radius - point.z) * sin,
            radius * (1.0 - cos) + point.z * cos,
        )
    }
}

/// Row heights from base to tip, with a row boundary exactly at the tip
/// start. Returns the heights and the number of body rows.
pub(crate) fn row_heights(tip_start: f32, segments: u32) -> (Vec<f32>, usize) {
    let segments = segments.max(2) as usize;
    let body = ((segments as f32 * tip_start).round() as usize).clamp(1, segments - 1);
    let tip = segments - body;

    let mut rows = Vec::with_capacity(segments + 1);
    rows.extend((0..=body).map(|i| tip_start * i as f32 / body as f32));
    rows.extend((1..tip).map(|k| tip_start + (1.0 - tip_start) * k as f32 / tip as f32));
    rows.push(1.0);
    (rows, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape() -> BladeShape {
        BladeShape::from_params(&BladeParams::default())
    }

    #[test]
    fn test_half_width_endpoints() {
        let s = shape();
        assert!((s.half_width(0.0) - s.base_half).abs() < 1e-7);
        assert!((s.half_width(s.tip_start) - s.mid_half).abs() < 1e-7);
        assert!((s.half_width(1.0) - s.end_half).abs() < 1e-7);
    }

    #[test]
    fn test_pointy_ignores_tip_width() {
        let s = BladeShape::from_params(&BladeParams {
            tip_mode: "pointy".to_string(),
            tip_width_cm: 3.0,
            ..Default::default()
        });
        assert_eq!(s.end_half, 0.0);
        assert!(s.half_width(1.0).abs() < 1e-7);
    }

    #[test]
    fn test_square_tip_is_linear() {
        let s = BladeShape::from_params(&BladeParams {
            tip_mode: "square".to_string(),
            tip_roundness: 1.0,
            ..Default::default()
        });
        assert_eq!(s.roundness, 0.0);
        let mid_tip = s.tip_start + (1.0 - s.tip_start) * 0.5;
        let expected = (s.mid_half + s.end_half) * 0.5;
        assert!((s.half_width(mid_tip) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_rounded_tip_is_fuller() {
        let params = BladeParams {
            tip_mode: "rounded".to_string(),
            ..Default::default()
        };
        let round = BladeShape::from_params(&BladeParams {
            tip_roundness: 1.0,
            ..params.clone()
        });
        let linear = BladeShape::from_params(&BladeParams {
            tip_roundness: 0.0,
            ..params
        });
        let v = round.tip_start + (1.0 - round.tip_start) * 0.5;
        assert!(round.half_width(v) > linear.half_width(v));
    }

    #[test]
    fn test_cavity_profile() {
        let s = BladeShape {
            cavity: 0.01,
            ..shape()
        };
        let half = s.mid_half.max(s.base_half);
        assert!((s.cavity_offset(0.0, half) + 0.005).abs() < 1e-7);
        assert!((s.cavity_offset(1.0, half) - 0.005).abs() < 1e-7);
        assert_eq!(s.cavity_offset(1.0, 0.0), 0.0);
    }

    #[test]
    fn test_bend_quarter_circle() {
        let s = BladeShape {
            bend: FRAC_PI_2,
            ..shape()
        };
        let top = s.bend_point(Vec3::new(0.0, s.length, 0.0));
        let radius = s.length / FRAC_PI_2;
        assert!((top.y - radius).abs() < 1e-5);
        assert!((top.z - radius).abs() < 1e-5);
    }

    #[test]
    fn test_tiny_bend_is_identity() {
        let s = BladeShape {
            bend: 5e-5,
            ..shape()
        };
        let p = Vec3::new(0.1, 0.2, 0.3);
        assert_eq!(s.bend_point(p), p);
    }

    #[test]
    fn test_row_heights_split_at_tip() {
        let (rows, body) = row_heights(0.7, 10);
        assert_eq!(rows.len(), 11);
        assert_eq!(body, 7);
        assert!((rows[body] - 0.7).abs() < 1e-6);
        assert_eq!(rows[0], 0.0);
        assert_eq!(rows[10], 1.0);

        let (_, body) = row_heights(0.95, 2);
        assert_eq!(body, 1);
    }
}
