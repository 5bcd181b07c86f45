//! Per-mesh-type region catalogs.
//!
//! The position of a region inside its catalog is the group and material
//! index used by every buffer the matching builder produces. Appending is the
//! only safe edit; reordering or removing an entry requires bumping the mesh
//! id version.

use bevy::prelude::*;

/// Immutable catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionDef {
    pub id: &'static str,
    pub label: &'static str,
    pub tag: &'static str,
    /// 24-bit sRGB color, `0xRRGGBB`.
    pub color: u32,
}

impl RegionDef {
    pub const fn new(id: &'static str, label: &'static str, tag: &'static str, color: u32) -> Self {
        Self {
            id,
            label,
            tag,
            color,
        }
    }
}

/// Owned copy of a [`RegionDef`] held by an asset.
///
/// Assets own their regions so that per-instance color edits never reach the
/// shared catalog.
#[derive(Clone, Debug, PartialEq, Eq, Reflect)]
pub struct Region {
    pub id: String,
    pub label: String,
    pub tag: String,
    pub color: u32,
}

impl Region {
    /// Region color as sRGB.
    pub fn srgba(&self) -> Srgba {
        hex_to_srgba(self.color)
    }

    /// Region color converted to linear space.
    pub fn linear(&self) -> LinearRgba {
        LinearRgba::from(self.srgba())
    }
}

impl From<&RegionDef> for Region {
    fn from(def: &RegionDef) -> Self {
        Self {
            id: def.id.to_string(),
            label: def.label.to_string(),
            tag: def.tag.to_string(),
            color: def.color & 0x00FF_FFFF,
        }
    }
}

/// Converts a `0xRRGGBB` value to [`Srgba`]. Bits above 24 are ignored.
pub fn hex_to_srgba(hex: u32) -> Srgba {
    Srgba::rgb_u8(
        ((hex >> 16) & 0xFF) as u8,
        ((hex >> 8) & 0xFF) as u8,
        (hex & 0xFF) as u8,
    )
}

/// Ordered region list for one mesh type.
#[derive(Clone, Copy, Debug)]
pub struct RegionCatalog {
    pub name: &'static str,
    pub entries: &'static [RegionDef],
}

impl RegionCatalog {
    pub const fn new(name: &'static str, entries: &'static [RegionDef]) -> Self {
        Self { name, entries }
    }

    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the region with the given id.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|r| r.id == id)
    }

    /// Owned copies of every region, in catalog order.
    pub fn regions(&self) -> Vec<Region> {
        self.entries.iter().map(Region::from).collect()
    }
}

// ============================================================================
// Catalogs
// ============================================================================

pub const BALL_REGIONS: RegionCatalog = RegionCatalog::new(
    "ball",
    &[
        RegionDef::new("ball:cap_top", "Top Cap", "surface", 0xE74C3C),
        RegionDef::new("ball:upper", "Upper Band", "surface", 0xF39C12),
        RegionDef::new("ball:equator", "Equator", "surface", 0xF1C40F),
        RegionDef::new("ball:lower", "Lower Band", "surface", 0x2ECC71),
        RegionDef::new("ball:cap_bottom", "Bottom Cap", "surface", 0x3498DB),
    ],
);

pub const POLE_REGIONS: RegionCatalog = RegionCatalog::new(
    "pole",
    &[
        RegionDef::new("pole:base", "Base Collar", "structure", 0x7F8C8D),
        RegionDef::new("pole:shaft", "Shaft", "structure", 0x95A5A6),
        RegionDef::new("pole:cap", "Finial", "trim", 0xBDC3C7),
    ],
);

pub const POLE_ARM_REGIONS: RegionCatalog = RegionCatalog::new(
    "pole_arm",
    &[
        RegionDef::new("pole:mast", "Mast", "structure", 0x95A5A6),
        RegionDef::new("pole:elbow", "Elbow", "structure", 0x8E44AD),
        RegionDef::new("pole:arm", "Arm", "structure", 0x16A085),
    ],
);

pub const HEAD_REGIONS: RegionCatalog = RegionCatalog::new(
    "signal_head",
    &[
        RegionDef::new("head:housing", "Housing", "structure", 0x2C3E50),
        RegionDef::new("head:visor", "Visors", "trim", 0x34495E),
        RegionDef::new("head:light_red", "Red Light", "lens", 0xE74C3C),
        RegionDef::new("head:light_yellow", "Yellow Light", "lens", 0xF1C40F),
        RegionDef::new("head:light_green", "Green Light", "lens", 0x2ECC71),
    ],
);

pub const PLATE_REGIONS: RegionCatalog = RegionCatalog::new(
    "sign_plate",
    &[
        RegionDef::new("plate:face", "Face", "face", 0xC0392B),
        RegionDef::new("plate:back", "Back", "structure", 0x7F8C8D),
        RegionDef::new("plate:rim", "Rim", "trim", 0xECF0F1),
    ],
);

pub const BLADE_REGIONS: RegionCatalog = RegionCatalog::new(
    "grass_blade",
    &[
        RegionDef::new("blade:base", "Blade Base", "foliage", 0x2F5A1F),
        RegionDef::new("blade:tip", "Blade Tip", "foliage", 0xA8C66C),
    ],
);
