//! Per-region material properties.

use bevy::math::Affine2;
use bevy::prelude::*;

use crate::region::Region;
use crate::texture::SignTexture;

/// Properties for the material of a single region.
///
/// Kept renderer-agnostic so rigs can patch it without touching asset
/// storage; convert with [`RegionMaterial::to_standard`] when spawning.
#[derive(Clone, Debug, PartialEq, Reflect)]
pub struct RegionMaterial {
    /// Display name for debugging and tooling.
    pub name: String,

    /// Base color in sRGB.
    pub base_color: Srgba,

    /// Emissive color, linear.
    ///
    /// Scaled by `emissive_intensity`. Signal lights keep their lit color
    /// here and toggle the intensity between 0 and 1.
    pub emissive: LinearRgba,

    /// Multiplier applied to `emissive`.
    ///
    /// Default: 0.0
    pub emissive_intensity: f32,

    /// Perceptual roughness in `[0, 1]`.
    ///
    /// Default: 0.6
    pub roughness: f32,

    /// Metallic factor in `[0, 1]`.
    ///
    /// Default: 0.0
    pub metallic: f32,

    /// Optional base color texture with its UV placement.
    pub texture: Option<SignTexture>,

    pub unlit: bool,
    pub double_sided: bool,
}

impl Default for RegionMaterial {
    fn default() -> Self {
        Self {
            name: String::new(),
            base_color: Srgba::WHITE,
            emissive: LinearRgba::BLACK,
            emissive_intensity: 0.0,
            roughness: 0.6,
            metallic: 0.0,
            texture: None,
            unlit: false,
            double_sided: false,
        }
    }
}

impl RegionMaterial {
    /// Create a new material with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Semantic material for a region: its catalog color, flat and matte.
    pub fn semantic(region: &Region) -> Self {
        Self::new(region.id.clone())
            .with_base_color(region.srgba())
            .with_roughness(0.9)
    }

    pub fn with_base_color(mut self, color: Srgba) -> Self {
        self.base_color = color;
        self
    }

    /// Set the emissive color and intensity.
    pub fn with_emissive(mut self, color: LinearRgba, intensity: f32) -> Self {
        self.emissive = color;
        self.emissive_intensity = intensity;
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn with_metallic(mut self, metallic: f32) -> Self {
        self.metallic = metallic;
        self
    }

    pub fn with_texture(mut self, texture: SignTexture) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_double_sided(mut self, double_sided: bool) -> Self {
        self.double_sided = double_sided;
        self
    }

    pub fn with_unlit(mut self, unlit: bool) -> Self {
        self.unlit = unlit;
        self
    }

    /// Whether the emissive term contributes anything.
    pub fn is_lit(&self) -> bool {
        self.emissive_intensity > 0.0
    }

    /// Convert to a [`StandardMaterial`], scaling emission by `emissive_strength`.
    pub fn to_standard(&self, emissive_strength: f32) -> StandardMaterial {
        let emissive = self.emissive * (self.emissive_intensity * emissive_strength);
        let (base_color_texture, uv_transform) = match &self.texture {
            Some(texture) => (
                Some(texture.image.clone()),
                Affine2::from_scale_angle_translation(texture.repeat, 0.0, texture.offset),
            ),
            None => (None, Affine2::IDENTITY),
        };

        StandardMaterial {
            base_color: self.base_color.into(),
            base_color_texture,
            uv_transform,
            emissive,
            perceptual_roughness: self.roughness,
            metallic: self.metallic,
            unlit: self.unlit,
            double_sided: self.double_sided,
            cull_mode: if self.double_sided {
                None
            } else {
                StandardMaterial::default().cull_mode
            },
            ..Default::default()
        }
    }
}

impl From<&RegionMaterial> for StandardMaterial {
    fn from(material: &RegionMaterial) -> Self {
        material.to_standard(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_material_builder() {
        let mat = RegionMaterial::new("shaft")
            .with_base_color(Srgba::rgb(0.5, 0.5, 0.5))
            .with_roughness(0.4)
            .with_metallic(0.8);

        assert_eq!(mat.name, "shaft");
        assert_eq!(mat.roughness, 0.4);
        assert_eq!(mat.metallic, 0.8);
        assert!(mat.texture.is_none());
        assert!(!mat.is_lit());
    }

    #[test]
    fn test_semantic_uses_region_color() {
        let region = Region {
            id: "ball:equator".into(),
            label: "Equator".into(),
            tag: "surface".into(),
            color: 0xFF0000,
        };
        let mat = RegionMaterial::semantic(&region);
        assert_eq!(mat.name, "ball:equator");
        assert_eq!(mat.base_color, Srgba::rgb(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_standard_conversion_scales_emission() {
        let mat = RegionMaterial::new("lens").with_emissive(LinearRgba::rgb(1.0, 0.0, 0.0), 1.0);

        let standard = mat.to_standard(4.0);
        assert_eq!(standard.emissive.red, 4.0);
        assert_eq!(standard.emissive.green, 0.0);

        let off = mat.clone().with_emissive(LinearRgba::rgb(1.0, 0.0, 0.0), 0.0);
        let standard: StandardMaterial = (&off).into();
        assert_eq!(standard.emissive.red, 0.0);
    }

    #[test]
    fn test_texture_sets_uv_transform() {
        let texture = SignTexture::new(Handle::default())
            .with_offset(Vec2::new(0.25, 0.0))
            .with_repeat(Vec2::new(2.0, 2.0));
        let standard = RegionMaterial::new("face").with_texture(texture).to_standard(1.0);

        assert!(standard.base_color_texture.is_some());
        assert_eq!(standard.uv_transform.translation, Vec2::new(0.25, 0.0));
        assert_eq!(standard.uv_transform.matrix2.x_axis, Vec2::new(2.0, 0.0));
    }
}
