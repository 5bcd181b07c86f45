//! Spawning props into a Bevy world and keeping them in sync.

use bevy::prelude::*;

use crate::asset::ProceduralAsset;
use crate::error::GeometryError;
use crate::geometry::extract_region_geometries;

/// System set for prop mesh systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropMeshSystems;

/// Which of an asset's material sets is rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum MaterialMode {
    /// Region color coding.
    #[cfg_attr(feature = "debug_viz", default)]
    Semantic,
    /// Presentation materials.
    #[cfg_attr(not(feature = "debug_viz"), default)]
    Solid,
}

/// Rendering settings for spawned props.
#[derive(Resource, Clone, Debug, PartialEq, Reflect)]
pub struct PropMeshSettings {
    pub material_mode: MaterialMode,

    /// Scale applied to emission when converting to [`StandardMaterial`].
    ///
    /// Default: 4.0
    pub emissive_strength: f32,
}

impl Default for PropMeshSettings {
    fn default() -> Self {
        Self {
            material_mode: MaterialMode::default(),
            emissive_strength: 4.0,
        }
    }
}

impl PropMeshSettings {
    /// Bevy material for region `index` of `asset`.
    pub fn region_material(&self, asset: &ProceduralAsset, index: usize) -> StandardMaterial {
        let material = match self.material_mode {
            MaterialMode::Semantic => asset.materials.semantic.get(index),
            MaterialMode::Solid => asset.materials.solid.get(index),
        };
        material
            .map(|m| m.to_standard(self.emissive_strength))
            .unwrap_or_default()
    }
}

/// A spawned prop. Edit the asset through this component and
/// [`sync_prop_meshes`] pushes the result to the render assets.
#[derive(Component, Debug, Deref, DerefMut)]
#[require(PropMeshState)]
pub struct PropMesh(pub ProceduralAsset);

/// Geometry revision last uploaded for a [`PropMesh`].
#[derive(Component, Debug, Default)]
pub struct PropMeshState {
    geometry_revision: u64,
}

/// Child entity rendering one region of its parent [`PropMesh`].
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct PropRegion {
    pub index: usize,
}

/// Spawn `asset` as a parent entity with one child per region.
///
/// Region meshes are compacted so each child only uploads the vertices it
/// uses.
///
/// # Errors
/// When the asset's geometry is missing an index buffer or a region group.
pub fn spawn_prop(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    settings: &PropMeshSettings,
    asset: ProceduralAsset,
) -> Result<Entity, GeometryError> {
    let parts = extract_region_geometries(&asset.geometry, asset.region_count())?;
    let parent = commands
        .spawn((
            Name::new(asset.name.clone()),
            Transform::default(),
            Visibility::default(),
            PropMeshState {
                geometry_revision: asset.geometry_revision(),
            },
        ))
        .id();

    for (index, part) in parts.iter().enumerate() {
        commands.spawn((
            Name::new(asset.regions[index].id.clone()),
            PropRegion { index },
            Mesh3d(meshes.add(part.compacted().to_mesh())),
            MeshMaterial3d(materials.add(settings.region_material(&asset, index))),
            Transform::default(),
            ChildOf(parent),
        ));
    }

    debug!("Spawned prop '{}' with {} regions", asset.id, parts.len());
    commands.entity(parent).insert(PropMesh(asset));
    Ok(parent)
}

/// Upload changed props.
///
/// Materials are rewritten whenever the asset or the settings changed.
/// Region meshes are replaced only when the geometry revision advanced; the
/// old mesh assets are released with their handles.
pub fn sync_prop_meshes(
    settings: Res<PropMeshSettings>,
    mut props: Query<(Ref<PropMesh>, &mut PropMeshState, &Children)>,
    mut regions: Query<(&PropRegion, &mut Mesh3d, &MeshMaterial3d<StandardMaterial>)>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (prop, mut state, children) in &mut props {
        if !prop.is_changed() && !settings.is_changed() {
            continue;
        }

        let reupload = prop.geometry_revision() != state.geometry_revision;
        let parts = if reupload {
            match extract_region_geometries(&prop.geometry, prop.region_count()) {
                Ok(parts) => Some(parts),
                Err(err) => {
                    warn!("Prop '{}' geometry not uploaded: {}", prop.id, err);
                    None
                }
            }
        } else {
            None
        };

        let children: &[Entity] = children;
        for &child in children {
            let Ok((region, mut mesh, material)) = regions.get_mut(child) else {
                continue;
            };
            if let Some(mut standard) = materials.get_mut(&material.0) {
                *standard = settings.region_material(&prop, region.index);
            }
            if let Some(part) = parts.as_ref().and_then(|p| p.get(region.index)) {
                mesh.0 = meshes.add(part.compacted().to_mesh());
            }
        }

        if parts.is_some() {
            state.geometry_revision = prop.geometry_revision();
            info!("Re-uploaded geometry for prop '{}'", prop.id);
        }
    }
}
