//! Sign texture lookup.
//!
//! Builders never load images themselves. They ask a [`TextureSource`] for a
//! texture id and fall back to the flat region color when it has none.

use std::collections::HashMap;

use bevy::prelude::*;

/// Texture id used for the stop sign face.
pub const STOP_SIGN_TEXTURE: &str = "sign.stop";

/// An image plus the UV placement used on a sign face.
#[derive(Clone, Debug, PartialEq, Reflect)]
pub struct SignTexture {
    pub image: Handle<Image>,
    pub offset: Vec2,
    pub repeat: Vec2,
}

impl SignTexture {
    pub fn new(image: Handle<Image>) -> Self {
        Self {
            image,
            offset: Vec2::ZERO,
            repeat: Vec2::ONE,
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_repeat(mut self, repeat: Vec2) -> Self {
        self.repeat = repeat;
        self
    }
}

/// Resolves texture ids to sign textures.
pub trait TextureSource: Send + Sync {
    /// `None` means the texture is unknown or not available yet.
    fn resolve(&self, id: &str) -> Option<SignTexture>;
}

/// In-memory [`TextureSource`].
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_propgen::texture::{SignTexture, SignTextureCatalog, TextureSource};
///
/// let catalog = SignTextureCatalog::new()
///     .with_texture("sign.stop", SignTexture::new(Handle::default()));
/// assert!(catalog.resolve("sign.stop").is_some());
/// assert!(catalog.resolve("sign.yield").is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct SignTextureCatalog {
    textures: HashMap<String, SignTexture>,
}

impl SignTextureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_texture(mut self, id: impl Into<String>, texture: SignTexture) -> Self {
        self.insert(id, texture);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, texture: SignTexture) {
        self.textures.insert(id.into(), texture);
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl TextureSource for SignTextureCatalog {
    fn resolve(&self, id: &str) -> Option<SignTexture> {
        self.textures.get(id).cloned()
    }
}

/// A source that never has any texture.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTextures;

impl TextureSource for NoTextures {
    fn resolve(&self, _id: &str) -> Option<SignTexture> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_resolves_by_id() {
        let texture = SignTexture::new(Handle::default()).with_repeat(Vec2::new(2.0, 1.0));
        let catalog = SignTextureCatalog::new().with_texture(STOP_SIGN_TEXTURE, texture.clone());

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.resolve(STOP_SIGN_TEXTURE), Some(texture));
        assert_eq!(catalog.resolve("sign.other"), None);
    }

    #[test]
    fn test_no_textures() {
        assert!(NoTextures.resolve(STOP_SIGN_TEXTURE).is_none());
    }
}
