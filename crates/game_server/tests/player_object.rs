//! End-to-end behavior of the player object inside a single replica:
//! spawn color, color delivery, fixed-step movement and remote jumps.

use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use bevy_replicon::prelude::*;
use game_server::settings::Gameplay;
use game_server::{
    ColorChanged, GameplaySet, HsvRange, JumpRequest, LinearVelocity, MovementIntent, Player,
    PlayerColorSampler, PlayerOwner, PlayerParts, SharedGameplayPlugin, assign_spawn_color,
    handle_jump_request,
};

#[derive(Resource, Default)]
struct Delivered(Vec<ColorChanged>);

/// Fixed steps in which the tracked player already had its parts.
#[derive(Resource, Default)]
struct ResolvedSteps(u32);

fn record_color(changed: On<ColorChanged>, mut delivered: ResMut<Delivered>) {
    delivered.0.push(*changed.event());
}

fn count_resolved_steps(players: Query<(), With<PlayerParts>>, mut steps: ResMut<ResolvedSteps>) {
    if !players.is_empty() {
        steps.0 += 1;
    }
}

fn replica_app() -> App {
    let gameplay = Gameplay {
        linear_damping: 0.0,
        ..Gameplay::default()
    };

    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        RepliconPlugins,
        SharedGameplayPlugin { gameplay },
    ))
    .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(20)))
    .insert_resource(Time::<Fixed>::from_seconds(0.02))
    .init_resource::<Delivered>()
    .init_resource::<ResolvedSteps>()
    .add_observer(record_color)
    .add_systems(
        FixedUpdate,
        count_resolved_steps.in_set(GameplaySet::Forces),
    );
    app.finish();
    app.cleanup();
    app
}

fn body_velocity(app: &App, player: Entity) -> Vec3 {
    let parts = app.world().get::<PlayerParts>(player).unwrap();
    app.world().get::<LinearVelocity>(parts.body).unwrap().0
}

#[test]
fn server_color_reaches_the_callback_exactly() {
    let mut app = replica_app();
    let range = HsvRange {
        hue: (0.7, 0.7),
        saturation: (0.8, 0.8),
        value: (0.9, 0.9),
    };
    app.insert_resource(PlayerColorSampler::seeded(range, 42))
        .add_observer(assign_spawn_color);

    let player = app.world_mut().spawn(Player).id();
    app.update();
    app.update();

    let delivered = &app.world().resource::<Delivered>().0;
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].player, player);
    assert_eq!(delivered[0].old, Color::WHITE);

    let Color::Hsva(hsva) = delivered[0].new else {
        panic!("expected hsva, got {:?}", delivered[0].new);
    };
    assert!((hsva.hue - 252.0).abs() < 1e-3);
    assert_eq!(hsva.saturation, 0.8);
    assert_eq!(hsva.value, 0.9);
    assert_eq!(hsva.alpha, 1.0);
}

#[test]
fn horizontal_intent_adds_a_tenth_per_step() {
    let mut app = replica_app();
    let player = app
        .world_mut()
        .spawn((Player, MovementIntent::from_axes(1.0, 0.0)))
        .id();

    for _ in 0..5 {
        app.update();
    }

    let steps = app.world().resource::<ResolvedSteps>().0;
    assert!(steps > 0, "no fixed step ran after the parts were resolved");
    let velocity = body_velocity(&app, player);
    assert!((velocity.x - 0.1 * steps as f32).abs() < 1e-4, "{velocity}");
    assert_eq!(velocity.z, 0.0);
}

#[test]
fn one_jump_request_gives_one_impulse() {
    let mut app = replica_app();
    app.add_observer(handle_jump_request);

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

    let before = body_velocity(&app, player).y;
    app.world_mut().trigger(FromClient {
        client_id: ClientId::Client(client),
        message: JumpRequest,
    });
    let after = body_velocity(&app, player).y;

    assert!((after - before - 5.0).abs() < 1e-5);
}
