//! Player body: attachment, one-time parts lookup, movement force and jump.

use bevy::prelude::*;

use super::physics::{ForceMode, LinearVelocity, RigidBody};
use crate::shared::{MovementIntent, PartsUnresolved, Player, PlayerParts, PlayerPose, PlayerTuning};

/// Child entity of a player root that carries the rigid body.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PlayerBody;

/// Marks the descendant whose material shows the player color.
///
/// Only clients render, so on the server the lookup finds none.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct VisualSurface;

/// Body parameters for newly attached player bodies.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerBodyConfig(pub RigidBody);

/// Spawns the body child as soon as a player root exists on this replica.
pub fn attach_player_body(
    add: On<Add, Player>,
    mut commands: Commands,
    config: Res<PlayerBodyConfig>,
    poses: Query<&PlayerPose>,
) {
    let pose = poses.get(add.entity).copied().unwrap_or_default();
    commands.spawn((
        PlayerBody,
        config.0,
        LinearVelocity(pose.linear_velocity),
        Transform::from_translation(pose.translation),
        ChildOf(add.entity),
    ));
}

/// Looks up the body and visual surface of new players, once per player.
pub fn resolve_player_parts(
    mut commands: Commands,
    players: Query<Entity, (With<Player>, Without<PlayerParts>, Without<PartsUnresolved>)>,
    children: Query<&Children>,
    bodies: Query<(), With<RigidBody>>,
    surfaces: Query<(), With<VisualSurface>>,
) {
    for player in &players {
        let mut body = None;
        let mut surface = None;
        for descendant in children.iter_descendants(player) {
            if body.is_none() && bodies.contains(descendant) {
                body = Some(descendant);
            }
            if surface.is_none() && surfaces.contains(descendant) {
                surface = Some(descendant);
            }
        }

        match body {
            Some(body) => {
                commands.entity(player).insert(PlayerParts { body, surface });
            }
            None => {
                tracing::debug!("player {player} has no rigid body, skipping it");
                commands.entity(player).insert(PartsUnresolved);
            }
        }
    }
}

/// Pushes every resolved body by its intent once per fixed step.
pub fn apply_movement_force(
    players: Query<(&MovementIntent, &PlayerTuning, &PlayerParts)>,
    mut bodies: Query<(&RigidBody, &mut LinearVelocity)>,
    time: Res<Time<Fixed>>,
) {
    let dt = time.timestep().as_secs_f32();
    for (intent, tuning, parts) in &players {
        let Ok((body, mut velocity)) = bodies.get_mut(parts.body) else {
            continue;
        };
        velocity.apply_force(
            body,
            intent.0 * tuning.movement_speed * dt,
            ForceMode::VelocityChange,
        );
    }
}

/// Applies one upward jump impulse to `body`.
pub fn apply_jump(body: &RigidBody, velocity: &mut LinearVelocity, jump_impulse: f32) {
    velocity.apply_force(body, Vec3::Y * jump_impulse, ForceMode::Impulse);
}

/// Applies the jump of `player` to its body. Unresolved players are ignored.
pub fn jump_player(
    player: Entity,
    players: &Query<(&PlayerParts, &PlayerTuning)>,
    bodies: &mut Query<(&RigidBody, &mut LinearVelocity)>,
) -> bool {
    let Ok((parts, tuning)) = players.get(player) else {
        return false;
    };
    let Ok((body, mut velocity)) = bodies.get_mut(parts.body) else {
        return false;
    };
    apply_jump(body, &mut velocity, tuning.jump_impulse);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_app() -> App {
        let mut app = App::new();
        app.init_resource::<PlayerBodyConfig>()
            .insert_resource(Time::<Fixed>::from_seconds(0.02))
            .add_observer(attach_player_body)
            .add_systems(Update, resolve_player_parts)
            .add_systems(FixedUpdate, apply_movement_force);
        app
    }

    fn body_velocity(app: &App, player: Entity) -> Vec3 {
        let parts = app.world().get::<PlayerParts>(player).unwrap();
        app.world().get::<LinearVelocity>(parts.body).unwrap().0
    }

    #[test]
    fn attached_body_is_resolved_once() {
        let mut app = player_app();
        let player = app.world_mut().spawn(Player).id();
        app.update();

        let parts = *app.world().get::<PlayerParts>(player).unwrap();
        assert!(app.world().get::<PlayerBody>(parts.body).is_some());
        assert_eq!(parts.surface, None);

        app.update();
        assert_eq!(*app.world().get::<PlayerParts>(player).unwrap(), parts);
    }

    #[test]
    fn body_starts_at_the_replicated_pose() {
        let mut app = player_app();
        let pose = PlayerPose {
            translation: Vec3::new(3.0, 1.0, -2.0),
            linear_velocity: Vec3::X,
        };
        let player = app.world_mut().spawn((Player, pose)).id();
        app.update();

        let parts = *app.world().get::<PlayerParts>(player).unwrap();
        let transform = app.world().get::<Transform>(parts.body).unwrap();
        assert_eq!(transform.translation, pose.translation);
        assert_eq!(body_velocity(&app, player), Vec3::X);
    }

    #[test]
    fn surface_is_found_among_descendants() {
        let mut app = App::new();
        app.add_systems(Update, resolve_player_parts);

        let player = app.world_mut().spawn(Player).id();
        let body = app
            .world_mut()
            .spawn((RigidBody::default(), ChildOf(player)))
            .id();
        let surface = app
            .world_mut()
            .spawn((VisualSurface, ChildOf(body)))
            .id();
        app.update();

        assert_eq!(
            app.world().get::<PlayerParts>(player),
            Some(&PlayerParts {
                body,
                surface: Some(surface)
            })
        );
    }

    #[test]
    fn movement_force_is_intent_times_speed_times_step() {
        let mut app = player_app();
        let player = app
            .world_mut()
            .spawn((Player, MovementIntent::from_axes(1.0, 0.0)))
            .id();
        app.update();

        app.world_mut().run_schedule(FixedUpdate);

        let velocity = body_velocity(&app, player);
        assert!((velocity - Vec3::new(0.1, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn force_accumulates_once_per_step() {
        let mut app = player_app();
        let player = app
            .world_mut()
            .spawn((
                Player,
                MovementIntent::from_axes(-0.5, 1.0),
                PlayerTuning {
                    movement_speed: 10.0,
                    jump_impulse: 5.0,
                },
            ))
            .id();
        app.update();

        for _ in 0..3 {
            app.world_mut().run_schedule(FixedUpdate);
        }

        let velocity = body_velocity(&app, player);
        assert!((velocity - Vec3::new(-0.3, 0.0, 0.6)).length() < 1e-5);
    }

    #[test]
    fn player_without_body_is_skipped_silently() {
        let mut app = App::new();
        app.insert_resource(Time::<Fixed>::from_seconds(0.02))
            .add_systems(Update, resolve_player_parts)
            .add_systems(FixedUpdate, apply_movement_force);

        let player = app
            .world_mut()
            .spawn((Player, MovementIntent::from_axes(1.0, 1.0)))
            .id();
        app.update();
        app.world_mut().run_schedule(FixedUpdate);

        assert!(app.world().get::<PlayerParts>(player).is_none());
        assert!(app.world().get::<PartsUnresolved>(player).is_some());
    }

    #[test]
    fn jump_adds_impulse_over_mass() {
        let body = RigidBody {
            mass: 2.0,
            ..Default::default()
        };
        let mut velocity = LinearVelocity(Vec3::new(1.0, 0.0, 0.0));
        apply_jump(&body, &mut velocity, 5.0);
        assert_eq!(velocity.0, Vec3::new(1.0, 2.5, 0.0));
    }
}
