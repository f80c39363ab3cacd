//! Gameplay and server plugins.
//!
//! `SharedGameplayPlugin` runs on every replica (dedicated server, embedded server
//! and clients). `GameServerPlugin` adds the authoritative parts on top of it and
//! can be used in:
//! - Embedded server mode (running in a separate thread within the client)
//! - Dedicated server mode (standalone server binary)

use app::LOG_SERVER;
use bevy::prelude::*;
use bevy_replicon::prelude::*;
use bevy_replicon_renet::RepliconRenetPlugins;
use std::sync::atomic::Ordering;

use crate::gameplay::*;
use crate::network::{
    Port, PortStorage, ServerReadyFlag, ShutdownFlag, WorldSpawned, handle_client_connections,
    handle_client_disconnections, setup_networking,
};
use crate::settings::Gameplay;
use crate::shared::ProtocolPlugin;
use crate::systems::heartbeat_system;

/// Body simulation and player object behavior shared by all replicas.
///
/// Expects `RepliconPlugins` to be added before it.
#[derive(Default)]
pub struct SharedGameplayPlugin {
    pub gameplay: Gameplay,
}

impl Plugin for SharedGameplayPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(ProtocolPlugin)
            .insert_resource(Time::<Fixed>::from_hz(self.gameplay.tick_rate))
            .insert_resource(PhysicsSettings::from(&self.gameplay))
            .insert_resource(PlayerBodyConfig(RigidBody::from_settings(&self.gameplay)))
            .configure_sets(
                FixedUpdate,
                (GameplaySet::Forces, GameplaySet::Physics, GameplaySet::Sync).chain(),
            )
            .add_observer(attach_player_body)
            .add_systems(Update, (resolve_player_parts, detect_color_changes).chain())
            .add_systems(
                FixedUpdate,
                (
                    apply_movement_force.in_set(GameplaySet::Forces),
                    integrate_bodies.in_set(GameplaySet::Physics),
                ),
            );
    }
}

/// Main server plugin that sets up all server systems and state.
pub struct GameServerPlugin {
    pub port: u16,
    pub gameplay: Gameplay,
}

impl Plugin for GameServerPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            RepliconPlugins,
            RepliconRenetPlugins,
            SharedGameplayPlugin {
                gameplay: self.gameplay.clone(),
            },
        ))
        // Resources
        .insert_resource(Port(self.port))
        .insert_resource(PlayerColorSampler::new(self.gameplay.color_range))
        .init_resource::<WorldSpawned>()
        .init_resource::<ServerReadyFlag>()
        .init_resource::<PortStorage>()
        .init_resource::<ShutdownFlag>()
        // Spawn hook, change log and client events
        .add_observer(assign_spawn_color)
        .add_observer(log_color_change)
        .add_observer(handle_jump_request)
        .add_observer(handle_pose_update)
        // Systems
        .add_systems(Startup, setup_networking)
        .add_systems(
            PreUpdate,
            (handle_client_connections, handle_client_disconnections)
                .after(ServerSystems::Receive)
                .run_if(in_state(ServerState::Running)),
        )
        .add_systems(
            FixedUpdate,
            (publish_player_poses, heartbeat_system).in_set(GameplaySet::Sync),
        )
        .add_systems(Last, exit_on_shutdown);
    }
}

fn exit_on_shutdown(flag: Res<ShutdownFlag>, mut exit: MessageWriter<AppExit>) {
    if flag.0.load(Ordering::Acquire) {
        tracing::info!(target: LOG_SERVER, "Shutdown requested, stopping server");
        exit.write(AppExit::Success);
    }
}
