use app::LOG_CLIENT;
use bevy::prelude::*;
use bevy_replicon::prelude::*;
use game_server::settings::Gameplay;
use game_server::{
    GameplaySet, ServerHandle, SharedGameplayPlugin, resolve_player_parts,
};

use crate::input::{InputAxes, predict_jump, sample_axes, update_local_intent};
use crate::networking::{
    ConnectionTarget, GameState, LocalClientId, apply_remote_poses, connect_to_server,
    exit_on_disconnect, log_connected, mark_local_player, send_jump_request, send_pose_update,
    wait_for_server_ready,
};
use crate::rendering::RenderingPlugin;

/// Client gameplay, networking and rendering.
///
/// Expects `DefaultPlugins`, `RepliconPlugins` and `RepliconRenetPlugins` to be
/// added before it.
pub struct ClientPlugin {
    pub gameplay: Gameplay,
    pub target: ConnectionTarget,
    pub initial_state: GameState,
}

impl Plugin for ClientPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            SharedGameplayPlugin {
                gameplay: self.gameplay.clone(),
            },
            RenderingPlugin,
        ))
        .insert_state(self.initial_state)
        .insert_resource(self.target)
        .init_resource::<InputAxes>()
        // Connection flow
        .add_systems(
            Update,
            wait_for_server_ready.run_if(
                in_state(GameState::StartingHost).and(resource_exists::<ServerHandle>),
            ),
        )
        .add_systems(OnEnter(GameState::ConnectingToServer), connect_to_server)
        .add_systems(OnEnter(ClientState::Connected), log_connected)
        .add_systems(
            OnEnter(ClientState::Disconnected),
            exit_on_disconnect.run_if(in_state(GameState::InGame)),
        )
        // Input and prediction
        .add_observer(predict_jump)
        .add_observer(send_jump_request)
        .add_systems(
            Update,
            (
                mark_local_player.run_if(resource_exists::<LocalClientId>),
                (sample_axes, update_local_intent).chain(),
                apply_remote_poses.after(resolve_player_parts),
            )
                .chain()
                .run_if(in_state(ClientState::Connected)),
        )
        .add_systems(
            FixedUpdate,
            send_pose_update
                .in_set(GameplaySet::Sync)
                .run_if(in_state(ClientState::Connected)),
        )
        .add_systems(Update, reload_settings_on_key);
    }
}

/// F5 re-reads the settings file.
fn reload_settings_on_key(world: &mut World) {
    let pressed = world
        .get_resource::<ButtonInput<KeyCode>>()
        .is_some_and(|keyboard| keyboard.just_pressed(KeyCode::F5));
    if !pressed {
        return;
    }

    match settings::reload_settings(world) {
        Ok(()) => info!(target: LOG_CLIENT, "Settings reloaded"),
        Err(err) => warn!(target: LOG_CLIENT, "Settings not reloaded: {err}"),
    }
}
