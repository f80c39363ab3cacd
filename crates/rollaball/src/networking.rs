//! Client networking layer.
//!
//! This module handles:
//! - Waiting for an embedded server before connecting
//! - Client connection to server (embedded or dedicated)
//! - Local player tracking
//! - Sending jump requests and local poses, applying remote poses

use app::LOG_CLIENT;
use bevy::prelude::*;
use bevy_replicon::prelude::*;
use bevy_replicon_renet::{
    RenetChannelsExt,
    netcode::{ClientAuthentication, NetcodeClientTransport},
    renet::{ConnectionConfig, RenetClient},
};
use game_server::{
    JumpRequest, LinearVelocity, PROTOCOL_ID, PlayerIdentity, PlayerParts, PlayerPose, PoseUpdate,
    RigidBody, ServerHandle,
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::time::SystemTime;

use crate::error::ClientError;
use crate::input::JumpPressed;

/// Where we are in the application flow.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    /// An embedded server is starting on this machine.
    #[default]
    StartingHost,
    ConnectingToServer,
    InGame,
}

/// Netcode client id of this process.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalClientId(pub u64);

/// Marks the player entity owned by this client.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct LocalPlayer;

/// Server the client connects to once it enters `ConnectingToServer`.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub address: IpAddr,
    pub port: u16,
}

impl ConnectionTarget {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }
}

/// Waits for the embedded server to be ready, then connects to its port.
pub fn wait_for_server_ready(
    server: Res<ServerHandle>,
    mut target: ResMut<ConnectionTarget>,
    mut next_state: ResMut<NextState<GameState>>,
    mut exit: MessageWriter<AppExit>,
) {
    if server.has_failed() {
        error!(target: LOG_CLIENT, "Embedded server stopped before it was ready");
        exit.write(AppExit::error());
        return;
    }

    if let Some(port) = server.port() {
        info!(target: LOG_CLIENT, "Embedded server is ready on port {port}");
        *target = ConnectionTarget {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port,
        };
        next_state.set(GameState::ConnectingToServer);
    }
}

/// Netcode id of a new connection. The random `salt` separates clients that
/// connect within the same millisecond.
pub fn new_client_id(millis: u64, salt: u32) -> u64 {
    millis.rotate_left(32) ^ u64::from(salt)
}

/// Creates the renet client and its netcode transport for `target`.
pub fn create_client(
    channels: &RepliconChannels,
    target: ConnectionTarget,
) -> Result<(RenetClient, NetcodeClientTransport, u64), ClientError> {
    let client = RenetClient::new(ConnectionConfig {
        server_channels_config: channels.server_configs(),
        client_channels_config: channels.client_configs(),
        ..Default::default()
    });

    let current_time = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH)?;
    let client_id = new_client_id(current_time.as_millis() as u64, rand::random());
    let bind = match target.address {
        IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        IpAddr::V6(_) => IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED),
    };
    let socket = UdpSocket::bind((bind, 0))?;
    let authentication = ClientAuthentication::Unsecure {
        client_id,
        protocol_id: PROTOCOL_ID,
        server_addr: target.socket_addr(),
        user_data: None,
    };
    let transport = NetcodeClientTransport::new(current_time, authentication, socket)?;

    Ok((client, transport, client_id))
}

pub fn connect_to_server(
    mut commands: Commands,
    channels: Res<RepliconChannels>,
    target: Res<ConnectionTarget>,
    mut next_state: ResMut<NextState<GameState>>,
) -> Result {
    let (client, transport, client_id) = create_client(&channels, *target)?;

    commands.insert_resource(client);
    commands.insert_resource(transport);
    commands.insert_resource(LocalClientId(client_id));

    info!(
        target: LOG_CLIENT,
        "Connecting to {} as client {client_id}",
        target.socket_addr()
    );
    next_state.set(GameState::InGame);
    Ok(())
}

pub fn log_connected(client_id: Option<Res<LocalClientId>>) {
    if let Some(client_id) = client_id {
        info!(target: LOG_CLIENT, "Connected as client {}", client_id.0);
    }
}

/// Ends the session when the server goes away.
pub fn exit_on_disconnect(mut exit: MessageWriter<AppExit>) {
    warn!(target: LOG_CLIENT, "Disconnected from server");
    exit.write(AppExit::Success);
}

/// Tags the replicated player whose identity matches this client.
pub fn mark_local_player(
    mut commands: Commands,
    local: Res<LocalClientId>,
    players: Query<(Entity, &PlayerIdentity), (Changed<PlayerIdentity>, Without<LocalPlayer>)>,
) {
    for (entity, identity) in &players {
        if identity.client_id == local.0 {
            info!(target: LOG_CLIENT, "Local player is {entity}");
            commands.entity(entity).insert(LocalPlayer);
        }
    }
}

pub fn send_jump_request(_pressed: On<JumpPressed>, mut commands: Commands) {
    commands.client_trigger(JumpRequest);
}

/// Reports the local body state after each simulation step.
pub fn send_pose_update(
    mut commands: Commands,
    players: Query<&PlayerParts, With<LocalPlayer>>,
    bodies: Query<(&Transform, &LinearVelocity), With<RigidBody>>,
) {
    for parts in &players {
        let Ok((transform, velocity)) = bodies.get(parts.body) else {
            continue;
        };
        commands.client_trigger(PoseUpdate {
            translation: transform.translation,
            linear_velocity: velocity.0,
        });
    }
}

/// Snaps bodies of other players to their latest replicated pose.
pub fn apply_remote_poses(
    players: Query<(&PlayerPose, &PlayerParts), (Changed<PlayerPose>, Without<LocalPlayer>)>,
    mut bodies: Query<(&mut Transform, &mut LinearVelocity), With<RigidBody>>,
) {
    for (pose, parts) in &players {
        let Ok((mut transform, mut velocity)) = bodies.get_mut(parts.body) else {
            continue;
        };
        transform.translation = pose.translation;
        velocity.0 = pose.linear_velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_server::{Player, PlayerBodyConfig, attach_player_body, resolve_player_parts};
    use std::collections::HashSet;

    #[test]
    fn clients_of_the_same_millisecond_get_distinct_ids() {
        let millis = 1_700_000_000_123;
        let ids: HashSet<u64> = (0..64)
            .map(|_| new_client_id(millis, rand::random()))
            .collect();
        assert_eq!(ids.len(), 64);

        assert_ne!(new_client_id(millis, 7), new_client_id(millis, 8));
        assert_ne!(new_client_id(millis, 7), new_client_id(millis + 1, 7));
    }

    #[test]
    fn only_matching_identity_becomes_local() {
        let mut app = App::new();
        app.insert_resource(LocalClientId(7))
            .add_systems(Update, mark_local_player);

        let mine = app
            .world_mut()
            .spawn(PlayerIdentity { client_id: 7 })
            .id();
        let other = app
            .world_mut()
            .spawn(PlayerIdentity { client_id: 8 })
            .id();
        app.update();

        assert!(app.world().get::<LocalPlayer>(mine).is_some());
        assert!(app.world().get::<LocalPlayer>(other).is_none());
    }

    #[test]
    fn remote_pose_moves_only_other_bodies() {
        let mut app = App::new();
        app.init_resource::<PlayerBodyConfig>()
            .add_observer(attach_player_body)
            .add_systems(Update, (resolve_player_parts, apply_remote_poses).chain());

        let local = app.world_mut().spawn((Player, LocalPlayer)).id();
        let remote = app.world_mut().spawn(Player).id();
        app.update();

        let pose = PlayerPose {
            translation: Vec3::new(2.0, 0.5, 1.0),
            linear_velocity: Vec3::Z,
        };
        *app.world_mut().get_mut::<PlayerPose>(local).unwrap() = pose;
        *app.world_mut().get_mut::<PlayerPose>(remote).unwrap() = pose;
        app.update();

        let body_of = |player: Entity| app.world().get::<PlayerParts>(player).unwrap().body;
        let remote_body = body_of(remote);
        let local_body = body_of(local);
        assert_eq!(
            app.world().get::<Transform>(remote_body).unwrap().translation,
            pose.translation
        );
        assert_eq!(
            app.world().get::<LinearVelocity>(remote_body).unwrap().0,
            Vec3::Z
        );
        assert_eq!(
            app.world().get::<Transform>(local_body).unwrap().translation,
            Vec3::ZERO
        );
    }

    #[test]
    fn target_formats_as_socket_address() {
        let target = ConnectionTarget {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 5000,
        };
        assert_eq!(target.socket_addr().to_string(), "127.0.0.1:5000");
    }
}
