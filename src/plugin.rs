//! Plugin for procedural prop meshes.
use bevy::prelude::*;

use crate::registry::MeshRegistry;
use crate::systems::{
    MaterialMode, PropMeshSettings, PropMeshSystems, PropRegion, sync_prop_meshes,
};

/// Plugin that adds procedural prop support to Bevy.
///
/// This plugin registers:
/// - [`MeshRegistry`] with every built-in mesh, unless one was inserted first
/// - [`PropMeshSettings`], unless one was inserted first
/// - [`sync_prop_meshes`] in `Update`, in the [`PropMeshSystems`] set
///
/// # Example
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_propgen::PropMeshPlugin;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(PropMeshPlugin)
///     .run();
/// ```
pub struct PropMeshPlugin;

impl Plugin for PropMeshPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<MeshRegistry>() {
            app.insert_resource(MeshRegistry::with_defaults());
        }
        let mesh_count = app.world().resource::<MeshRegistry>().ids().len();

        app.init_resource::<PropMeshSettings>()
            .register_type::<PropMeshSettings>()
            .register_type::<MaterialMode>()
            .register_type::<PropRegion>()
            .add_systems(Update, sync_prop_meshes.in_set(PropMeshSystems));

        info!("Registered {} procedural prop meshes", mesh_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::ParamValues;

    #[test]
    fn test_plugin_inserts_defaults() {
        let mut app = App::new();
        app.add_plugins(PropMeshPlugin);

        assert_eq!(app.world().resource::<MeshRegistry>().ids().len(), 9);
        assert_eq!(
            *app.world().resource::<PropMeshSettings>(),
            PropMeshSettings::default()
        );
    }

    #[test]
    fn test_plugin_keeps_provided_resources() {
        let mut registry = MeshRegistry::new();
        registry.register("mesh.custom.v1", |values, _| {
            MeshRegistry::with_defaults().create("mesh.ball.v1", values)
        });
        let settings = PropMeshSettings {
            material_mode: MaterialMode::Semantic,
            emissive_strength: 1.0,
        };

        let mut app = App::new();
        app.insert_resource(registry)
            .insert_resource(settings.clone())
            .add_plugins(PropMeshPlugin);

        let registry = app.world().resource::<MeshRegistry>();
        assert_eq!(registry.ids(), vec!["mesh.custom.v1"]);
        assert!(registry.create("mesh.custom.v1", &ParamValues::new()).is_ok());
        assert_eq!(*app.world().resource::<PropMeshSettings>(), settings);
    }
}
