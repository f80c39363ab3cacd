use app::LOG_CLIENT;
use bevy::math::primitives::Cuboid;
use bevy::pbr::MeshMaterial3d;
use bevy::prelude::*;
use game_server::{ColorChanged, GroundPlane, GroundPlaneSize, PlayerBody, PlayerParts, VisualSurface};

use super::RenderAssets;

/// Marker to track which entities already have visuals spawned
#[derive(Component)]
pub struct HasVisuals;

pub fn spawn_ground_plane_visuals(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    planes: Query<(Entity, &Transform, &GroundPlaneSize), (With<GroundPlane>, Without<HasVisuals>)>,
) {
    for (entity, transform, size) in &planes {
        info!(
            target: LOG_CLIENT,
            "Spawning visuals for ground plane at {:?} with size {}x{}x{}",
            transform.translation, size.width, size.height, size.depth
        );

        let mesh = meshes.add(Mesh::from(Cuboid::new(size.width, size.height, size.depth)));
        let material = materials.add(StandardMaterial {
            base_color: Color::srgb(0.25, 0.45, 0.25),
            perceptual_roughness: 0.7,
            ..default()
        });

        commands.entity(entity).insert((
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Visibility::default(),
            HasVisuals,
        ));
    }
}

/// Gives every attached player body a sphere with its own material.
///
/// The body itself is the visual surface, so the parts lookup finds it.
pub fn decorate_player_body(
    add: On<Add, PlayerBody>,
    mut commands: Commands,
    assets: Res<RenderAssets>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    parents: Query<&ChildOf>,
) {
    let material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        ..default()
    });

    commands.entity(add.entity).insert((
        Mesh3d(assets.player_mesh.clone()),
        MeshMaterial3d(material),
        VisualSurface,
        Visibility::default(),
        HasVisuals,
    ));

    if let Ok(child_of) = parents.get(add.entity) {
        commands
            .entity(child_of.parent())
            .insert(Visibility::default());
    }
}

/// Color-change callback: writes the new color into the surface material.
pub fn apply_player_color(
    changed: On<ColorChanged>,
    players: Query<&PlayerParts>,
    surfaces: Query<&MeshMaterial3d<StandardMaterial>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let event = changed.event();
    let Some(surface) = players.get(event.player).ok().and_then(|parts| parts.surface) else {
        debug!(target: LOG_CLIENT, "player {} has no visual surface", event.player);
        return;
    };
    let Ok(handle) = surfaces.get(surface) else {
        return;
    };
    let Some(material) = materials.get_mut(&handle.0) else {
        return;
    };

    material.base_color = event.new;
    info!(
        target: LOG_CLIENT,
        "player {} color {:?} -> {:?}",
        event.player, event.old, event.new
    );
}
