//! Spawns every registered prop mesh in a row.
//!
//! Controls:
//! - 1/2/3: Switch traffic lights to red, yellow or green
//! - M: Toggle semantic and solid materials
//! - H: Raise the traffic light poles (rebuilds their geometry)

use bevy::prelude::*;
use bevy_propgen::prelude::*;

/// Distance between props along X.
const SPACING: f32 = 2.5;

/// Grass blades are a few centimeters wide; scale them up to be visible.
const BLADE_SCALE: f32 = 4.0;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(PropMeshPlugin)
        .add_systems(Startup, setup)
        .add_systems(Update, (switch_signal, toggle_materials, raise_poles).before(PropMeshSystems))
        .run();
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    registry: Res<MeshRegistry>,
    settings: Res<PropMeshSettings>,
) {
    let ids = registry.ids();
    let start = -(ids.len() as f32 - 1.0) * SPACING * 0.5;

    for (i, id) in ids.into_iter().enumerate() {
        let asset = match registry.create(id, &ParamValues::new()) {
            Ok(asset) => asset,
            Err(err) => {
                error!("Could not build {}: {}", id, err);
                continue;
            }
        };
        let scale = if id.starts_with("mesh.grass_blade") {
            BLADE_SCALE
        } else {
            1.0
        };
        match spawn_prop(&mut commands, &mut meshes, &mut materials, &settings, asset) {
            Ok(entity) => {
                commands.entity(entity).insert(
                    Transform::from_xyz(start + i as f32 * SPACING, 0.0, 0.0)
                        .with_scale(Vec3::splat(scale)),
                );
            }
            Err(err) => error!("Could not spawn {}: {}", id, err),
        }
    }

    // Ground
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(30.0, 10.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.3, 0.3, 0.32),
            ..default()
        })),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 10.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 4.0, 16.0).looking_at(Vec3::new(0.0, 2.0, 0.0), Vec3::Y),
    ));
}

fn switch_signal(keys: Res<ButtonInput<KeyCode>>, mut props: Query<&mut PropMesh>) {
    let signal = if keys.just_pressed(KeyCode::Digit1) {
        "red"
    } else if keys.just_pressed(KeyCode::Digit2) {
        "yellow"
    } else if keys.just_pressed(KeyCode::Digit3) {
        "green"
    } else {
        return;
    };

    for mut prop in &mut props {
        if prop.get_param("signal").is_none() {
            continue;
        }
        if let Err(err) = prop.set_param("signal", signal) {
            warn!("{}: {}", prop.id, err);
        }
    }
}

fn toggle_materials(keys: Res<ButtonInput<KeyCode>>, mut settings: ResMut<PropMeshSettings>) {
    if keys.just_pressed(KeyCode::KeyM) {
        settings.material_mode = match settings.material_mode {
            MaterialMode::Semantic => MaterialMode::Solid,
            MaterialMode::Solid => MaterialMode::Semantic,
        };
        info!("Material mode: {:?}", settings.material_mode);
    }
}

fn raise_poles(keys: Res<ButtonInput<KeyCode>>, mut props: Query<&mut PropMesh>) {
    if !keys.just_pressed(KeyCode::KeyH) {
        return;
    }
    for mut prop in &mut props {
        let Some(height) = prop.get_param("poleHeight").and_then(ParamValue::as_number) else {
            continue;
        };
        if let Err(err) = prop.set_param("poleHeight", height + 0.5) {
            warn!("{}: {}", prop.id, err);
        }
    }
}
