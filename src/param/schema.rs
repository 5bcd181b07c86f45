//! Typed parameter descriptions and value normalization.

use bevy::prelude::*;

use crate::error::ParamError;

/// A live parameter value.
#[derive(Clone, Debug, PartialEq, Reflect)]
pub enum ParamValue {
    Enum(String),
    Number(f32),
    Bool(bool),
    /// 24-bit sRGB color, `0xRRGGBB`.
    Color(u32),
}

impl ParamValue {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&str> {
        match self {
            Self::Enum(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<u32> {
        match self {
            Self::Color(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        Self::Number(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value as f32)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Enum(value.to_string())
    }
}

/// Value domain of a parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamKind {
    Enum { options: &'static [&'static str] },
    Number { min: f32, max: f32, step: f32 },
    Bool,
    Color,
}

impl ParamKind {
    /// Name used in type mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Enum { .. } => "enum",
            Self::Number { .. } => "number",
            Self::Bool => "bool",
            Self::Color => "color",
        }
    }
}

/// What applying a parameter change does to an asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect)]
pub enum ParamEffect {
    /// Materials or vertex colors are updated in place.
    Patch,
    /// The geometry is rebuilt from scratch and swapped.
    Rebuild,
}

/// Description of a single parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: ParamKind,
    pub default: ParamValue,
    pub effect: ParamEffect,
}

impl ParamSpec {
    /// Numeric parameter. `step <= 0` disables snapping.
    pub fn number(
        id: &'static str,
        label: &'static str,
        default: f32,
        (min, max, step): (f32, f32, f32),
        effect: ParamEffect,
    ) -> Self {
        Self {
            id,
            label,
            kind: ParamKind::Number { min, max, step },
            default: ParamValue::Number(default),
            effect,
        }
    }

    /// Integer-valued numeric parameter (step 1).
    pub fn count(
        id: &'static str,
        label: &'static str,
        default: u32,
        (min, max): (u32, u32),
        effect: ParamEffect,
    ) -> Self {
        Self::number(
            id,
            label,
            default as f32,
            (min as f32, max as f32, 1.0),
            effect,
        )
    }

    /// Enumerated parameter. `default` should be one of `options`.
    pub fn enumeration(
        id: &'static str,
        label: &'static str,
        options: &'static [&'static str],
        default: &'static str,
        effect: ParamEffect,
    ) -> Self {
        Self {
            id,
            label,
            kind: ParamKind::Enum { options },
            default: ParamValue::Enum(default.to_string()),
            effect,
        }
    }

    pub fn color(id: &'static str, label: &'static str, default: u32, effect: ParamEffect) -> Self {
        Self {
            id,
            label,
            kind: ParamKind::Color,
            default: ParamValue::Color(default),
            effect,
        }
    }

    pub fn boolean(id: &'static str, label: &'static str, default: bool, effect: ParamEffect) -> Self {
        Self {
            id,
            label,
            kind: ParamKind::Bool,
            default: ParamValue::Bool(default),
            effect,
        }
    }

    /// Bring `value` into this parameter's domain.
    ///
    /// Numbers are clamped and snapped to `step` from `min`; non-finite
    /// numbers become the default. Unknown enum options become the default
    /// option. Colors are masked to 24 bits.
    ///
    /// # Errors
    /// A value of the wrong type is rejected with [`ParamError::TypeMismatch`].
    pub fn normalize(&self, value: ParamValue) -> Result<ParamValue, ParamError> {
        match (&self.kind, value) {
            (ParamKind::Number { min, max, step }, ParamValue::Number(v)) => {
                if !v.is_finite() {
                    return Ok(self.default.clone());
                }
                Ok(ParamValue::Number(snap(v, *min, *max, *step)))
            }
            (ParamKind::Enum { options }, ParamValue::Enum(v)) => {
                if options.contains(&v.as_str()) {
                    Ok(ParamValue::Enum(v))
                } else {
                    Ok(self.default.clone())
                }
            }
            (ParamKind::Bool, ParamValue::Bool(v)) => Ok(ParamValue::Bool(v)),
            (ParamKind::Color, ParamValue::Color(v)) => Ok(ParamValue::Color(v & 0x00FF_FFFF)),
            (kind, _) => Err(ParamError::TypeMismatch {
                id: self.id.to_string(),
                expected: kind.type_name(),
            }),
        }
    }
}

fn snap(value: f32, min: f32, max: f32, step: f32) -> f32 {
    let clamped = value.clamp(min, max);
    if step <= 0.0 || clamped >= max {
        return clamped;
    }
    let snapped = min + ((clamped - min) / step).round() * step;
    snapped.clamp(min, max)
}

/// Look up a spec by id.
pub fn find_spec<'a>(schema: &'a [ParamSpec], id: &str) -> Option<&'a ParamSpec> {
    schema.iter().find(|spec| spec.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn radius() -> ParamSpec {
        ParamSpec::number("radius", "Radius", 1.0, (0.1, 5.0, 0.05), ParamEffect::Rebuild)
    }

    #[test]
    fn test_number_clamped_and_snapped() {
        let spec = radius();
        assert_eq!(spec.normalize(ParamValue::Number(9.0)), Ok(ParamValue::Number(5.0)));
        assert_eq!(spec.normalize(ParamValue::Number(-1.0)), Ok(ParamValue::Number(0.1)));

        let snapped = spec.normalize(ParamValue::Number(0.33)).unwrap().as_number().unwrap();
        assert!((snapped - 0.35).abs() < 1e-5);
    }

    #[test]
    fn test_non_finite_falls_back_to_default() {
        let spec = radius();
        assert_eq!(spec.normalize(ParamValue::Number(f32::NAN)), Ok(ParamValue::Number(1.0)));
        assert_eq!(spec.normalize(ParamValue::Number(f32::INFINITY)), Ok(ParamValue::Number(1.0)));
    }

    #[test]
    fn test_unknown_option_falls_back() {
        const OPTIONS: &[&str] = &["none", "red"];
        let spec = ParamSpec::enumeration("signal", "Signal", OPTIONS, "none", ParamEffect::Patch);
        assert_eq!(spec.normalize("red".into()), Ok(ParamValue::Enum("red".into())));
        assert_eq!(spec.normalize("blue".into()), Ok(ParamValue::Enum("none".into())));
    }

    #[test]
    fn test_type_mismatch() {
        let err = radius().normalize(ParamValue::Bool(true)).unwrap_err();
        assert_eq!(
            err,
            ParamError::TypeMismatch {
                id: "radius".into(),
                expected: "number"
            }
        );
    }

    #[test]
    fn test_count_snaps_to_integers() {
        let spec = ParamSpec::count("segments", "Segments", 8, (3, 64), ParamEffect::Rebuild);
        assert_eq!(spec.normalize(ParamValue::Number(7.6)), Ok(ParamValue::Number(8.0)));
        assert_eq!(spec.normalize(ParamValue::Number(1.0)), Ok(ParamValue::Number(3.0)));
    }

    #[test]
    fn test_color_masked() {
        let spec = ParamSpec::color("color", "Color", 0xFFFFFF, ParamEffect::Patch);
        assert_eq!(spec.normalize(ParamValue::Color(0xFF12_3456)), Ok(ParamValue::Color(0x123456)));
    }
}
