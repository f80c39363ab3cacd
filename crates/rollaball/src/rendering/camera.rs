use bevy::prelude::*;
use game_server::{PlayerBody, PlayerParts};

use crate::networking::LocalPlayer;

/// Keeps the camera at `offset` from the local player's body, looking at it.
#[derive(Component, Debug, Clone, Copy)]
pub struct FollowCamera {
    pub offset: Vec3,
}

impl Default for FollowCamera {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, 5.0, 10.0),
        }
    }
}

pub fn spawn_camera(mut commands: Commands) {
    let camera = FollowCamera::default();
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(camera.offset).looking_at(Vec3::ZERO, Vec3::Y),
        camera,
    ));
}

/// Follows the body of the local player. Reads `Transform` since the body is a
/// direct child of an untransformed player root.
pub fn follow_local_player(
    players: Query<&PlayerParts, With<LocalPlayer>>,
    bodies: Query<&Transform, (With<PlayerBody>, Without<FollowCamera>)>,
    mut cameras: Query<(&mut Transform, &FollowCamera)>,
) {
    let Some(target) = players
        .iter()
        .next()
        .and_then(|parts| bodies.get(parts.body).ok())
        .map(|body| body.translation)
    else {
        return;
    };

    for (mut transform, camera) in &mut cameras {
        transform.translation = target + camera.offset;
        transform.look_at(target, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_sits_at_offset_from_local_body() {
        let mut app = App::new();
        app.add_systems(Update, follow_local_player);

        let player = app.world_mut().spawn(LocalPlayer).id();
        let body = app
            .world_mut()
            .spawn((PlayerBody, Transform::from_xyz(1.0, 0.5, -3.0), ChildOf(player)))
            .id();
        app.world_mut().entity_mut(player).insert(PlayerParts {
            body,
            surface: None,
        });
        let camera = app
            .world_mut()
            .spawn((Transform::default(), FollowCamera::default()))
            .id();
        app.update();

        let transform = app.world().get::<Transform>(camera).unwrap();
        assert_eq!(transform.translation, Vec3::new(1.0, 5.5, 7.0));
    }
}
