//! Server side of the client events and of pose publication.

use bevy::prelude::*;
use bevy_replicon::prelude::*;

use super::physics::{LinearVelocity, RigidBody};
use super::player::jump_player;
use crate::shared::{JumpRequest, PlayerOwner, PlayerParts, PlayerPose, PlayerTuning, PoseUpdate};
use app::LOG_SERVER;

fn owned_player(
    client_id: ClientId,
    owners: &Query<(Entity, &PlayerOwner)>,
) -> Option<Entity> {
    let client_entity = client_id.entity()?;
    owners
        .iter()
        .find(|(_, owner)| owner.client_entity == client_entity)
        .map(|(player, _)| player)
}

/// Applies the jump primitive to the server copy of the sender's player.
pub fn handle_jump_request(
    trigger: On<FromClient<JumpRequest>>,
    owners: Query<(Entity, &PlayerOwner)>,
    players: Query<(&PlayerParts, &PlayerTuning)>,
    mut bodies: Query<(&RigidBody, &mut LinearVelocity)>,
) {
    let FromClient { client_id, .. } = trigger.event();
    let Some(player) = owned_player(*client_id, &owners) else {
        tracing::warn!(target: LOG_SERVER, "jump from {client_id:?} without a player");
        return;
    };
    if jump_player(player, &players, &mut bodies) {
        tracing::debug!(target: LOG_SERVER, "player {player} jumped");
    }
}

/// Takes over the body state reported by the owning client.
pub fn handle_pose_update(
    trigger: On<FromClient<PoseUpdate>>,
    owners: Query<(Entity, &PlayerOwner)>,
    parts: Query<&PlayerParts>,
    mut bodies: Query<(&mut Transform, &mut LinearVelocity), With<RigidBody>>,
) {
    let FromClient { client_id, message } = trigger.event();
    let Some(player) = owned_player(*client_id, &owners) else {
        return;
    };
    let Ok(parts) = parts.get(player) else {
        return;
    };
    let Ok((mut transform, mut velocity)) = bodies.get_mut(parts.body) else {
        return;
    };
    transform.translation = message.translation;
    velocity.0 = message.linear_velocity;
}

/// Copies each body's state into the replicated `PlayerPose` when it moved.
pub fn publish_player_poses(
    mut players: Query<(&PlayerParts, &mut PlayerPose)>,
    bodies: Query<(&Transform, &LinearVelocity), With<RigidBody>>,
) {
    for (parts, mut pose) in &mut players {
        let Ok((transform, velocity)) = bodies.get(parts.body) else {
            continue;
        };
        pose.set_if_neq(PlayerPose {
            translation: transform.translation,
            linear_velocity: velocity.0,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::{PlayerBodyConfig, attach_player_body, resolve_player_parts};
    use crate::shared::Player;

    fn server_app() -> (App, Entity, Entity) {
        let mut app = App::new();
        app.init_resource::<PlayerBodyConfig>()
            .add_observer(attach_player_body)
            .add_observer(handle_jump_request)
            .add_observer(handle_pose_update)
            .add_systems(Update, (resolve_player_parts, publish_player_poses).chain());

        let client = app.world_mut().spawn_empty().id();
        let player = app
            .world_mut()
            .spawn((
                Player,
                PlayerOwner {
                    client_entity: client,
                },
            ))
            .id();
        app.update();
        (app, client, player)
    }

    fn body_of(app: &App, player: Entity) -> Entity {
        app.world().get::<PlayerParts>(player).unwrap().body
    }

    #[test]
    fn jump_request_applies_one_impulse() {
        let (mut app, client, player) = server_app();
        app.world_mut().trigger(FromClient {
            client_id: ClientId::Client(client),
            message: JumpRequest,
        });

        let body = body_of(&app, player);
        assert_eq!(
            app.world().get::<LinearVelocity>(body).unwrap().0,
            Vec3::new(0.0, 5.0, 0.0)
        );
    }

    #[test]
    fn jump_from_unknown_client_is_ignored() {
        let (mut app, _, player) = server_app();
        let stranger = app.world_mut().spawn_empty().id();
        app.world_mut().trigger(FromClient {
            client_id: ClientId::Client(stranger),
            message: JumpRequest,
        });

        let body = body_of(&app, player);
        assert_eq!(app.world().get::<LinearVelocity>(body).unwrap().0, Vec3::ZERO);
    }

    #[test]
    fn pose_update_moves_body_and_is_published() {
        let (mut app, client, player) = server_app();
        let update = PoseUpdate {
            translation: Vec3::new(2.0, 0.5, 1.0),
            linear_velocity: Vec3::new(0.3, 0.0, 0.0),
        };
        app.world_mut().trigger(FromClient {
            client_id: ClientId::Client(client),
            message: update,
        });
        app.update();

        let pose = app.world().get::<PlayerPose>(player).unwrap();
        assert_eq!(pose.translation, update.translation);
        assert_eq!(pose.linear_velocity, update.linear_velocity);
    }
}
