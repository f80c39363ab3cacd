//! Server networking setup and connection handling.
//!
//! This module handles:
//! - Server initialization with bevy_replicon_renet
//! - Port binding with automatic fallback
//! - Client connection/disconnection handling

use app::LOG_SERVER;
use bevy::prelude::*;
use bevy_replicon::prelude::*;
use bevy_replicon::shared::backend::connected_client::NetworkId;
use bevy_replicon_renet::{
    RenetChannelsExt,
    netcode::{NetcodeServerTransport, ServerAuthentication, ServerConfig},
    renet::{ConnectionConfig, RenetServer},
};
use settings::SettingsArc;
use std::{
    net::{IpAddr, UdpSocket},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::SystemTime,
};

use crate::error::ServerError;
use crate::settings::{Gameplay, Network};
use crate::shared::*;
use crate::world::{spawn_position, spawn_world};

/// Server port resource. Holds the requested port until the socket is bound,
/// the actually bound port afterwards.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Port(pub u16);

/// Signals server readiness to the thread that started an embedded server.
#[derive(Resource, Clone, Default)]
pub struct ServerReadyFlag(pub Arc<AtomicBool>);

/// Set by the owning thread to ask an embedded server to exit.
#[derive(Resource, Clone, Default)]
pub struct ShutdownFlag(pub Arc<AtomicBool>);

/// Shares the bound port with the thread that started an embedded server.
#[derive(Resource, Clone, Default)]
pub struct PortStorage(pub Arc<Mutex<u16>>);

/// Tracks whether the world has been spawned (only spawn on first client connection).
#[derive(Resource, Default)]
pub struct WorldSpawned(pub bool);

/// System that sets up the server networking (runs in Startup).
pub fn setup_networking(
    mut commands: Commands,
    channels: Res<RepliconChannels>,
    port: Res<Port>,
    network: Res<SettingsArc<Network>>,
    ready_flag: Res<ServerReadyFlag>,
    port_storage: Res<PortStorage>,
) -> Result {
    let server = RenetServer::new(ConnectionConfig {
        server_channels_config: channels.server_configs(),
        client_channels_config: channels.client_configs(),
        ..Default::default()
    });

    let current_time = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_err(ServerError::from)?;

    let bind_ip: IpAddr = network
        .bind_address
        .parse()
        .map_err(|_| ServerError::BindAddress(network.bind_address.clone()))?;

    // Try to find a free port starting from the requested port
    let (socket, actual_port) = find_free_port(bind_ip, port.0)?;

    if port.0 != 0 && actual_port != port.0 {
        tracing::warn!(
            target: LOG_SERVER,
            "Port {} was in use, using port {} instead",
            port.0,
            actual_port
        );
    }

    let server_config = ServerConfig {
        current_time,
        max_clients: network.max_clients,
        protocol_id: PROTOCOL_ID,
        authentication: ServerAuthentication::Unsecure,
        public_addresses: vec![socket.local_addr()?],
    };

    let transport = NetcodeServerTransport::new(server_config, socket)?;

    commands.insert_resource(server);
    commands.insert_resource(transport);
    commands.insert_resource(Port(actual_port));

    // Store the actual port so the embedding client can read it
    *port_storage.0.lock().map_err(|_| ServerError::Poisoned)? = actual_port;

    tracing::info!(
        target: LOG_SERVER,
        "Server fully started on {}:{}",
        bind_ip,
        actual_port
    );
    ready_flag.0.store(true, Ordering::Release);
    Ok(())
}

/// Tries to bind to a port, and if it fails, tries the next ports until it finds a free one.
/// Tries up to 10 ports starting from the given port. Port 0 lets the OS pick.
/// Returns the port the socket is actually bound to.
pub fn find_free_port(ip: IpAddr, start_port: u16) -> Result<(UdpSocket, u16), ServerError> {
    const MAX_ATTEMPTS: u16 = 10;
    let last = start_port.saturating_add(MAX_ATTEMPTS - 1);

    for port in start_port..=last {
        match UdpSocket::bind((ip, port)) {
            Ok(socket) => {
                let bound = socket.local_addr()?.port();
                return Ok((socket, bound));
            }
            // Port is in use, try next one
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(ServerError::NoFreePort {
        first: start_port,
        last,
    })
}

/// System that handles new client connections.
///
/// When a client connects (ConnectedClient entity is spawned by the backend),
/// this system spawns a player entity for them and initializes the world on first connection.
pub fn handle_client_connections(
    mut commands: Commands,
    new_clients: Query<(Entity, &NetworkId), Added<ConnectedClient>>,
    gameplay: Res<SettingsArc<Gameplay>>,
    mut world_spawned: ResMut<WorldSpawned>,
    mut spawned_players: Local<u32>,
) {
    for (client_entity, network_id) in &new_clients {
        // Spawn world on first client connection
        if !world_spawned.0 {
            tracing::info!(
                target: LOG_SERVER,
                "First client connected, initializing game world"
            );
            spawn_world(&mut commands, gameplay.floor_height);
            world_spawned.0 = true;
        }

        let client_id = network_id.get();
        let translation = spawn_position(*spawned_players, gameplay.spawn_height);
        *spawned_players += 1;

        let player_entity = commands
            .spawn((
                Player,
                PlayerIdentity { client_id },
                PlayerTuning {
                    movement_speed: gameplay.movement_speed,
                    jump_impulse: gameplay.jump_impulse,
                },
                PlayerPose {
                    translation,
                    linear_velocity: Vec3::ZERO,
                },
                PlayerOwner { client_entity }, // Server-only, not replicated
                Replicated,
            ))
            .id();

        tracing::info!(
            target: LOG_SERVER,
            "Spawned player {:?} for client {} at {}",
            player_entity,
            client_id,
            translation
        );
    }
}

/// System that handles client disconnections.
///
/// When a client disconnects (ConnectedClient component is removed),
/// this system finds and despawns all entities owned by that client.
pub fn handle_client_disconnections(
    mut commands: Commands,
    mut disconnected_clients: RemovedComponents<ConnectedClient>,
    players: Query<(Entity, &PlayerOwner)>,
) {
    for disconnected_client in disconnected_clients.read() {
        let mut despawned_count = 0;
        for (player_entity, owner) in &players {
            if owner.client_entity == disconnected_client {
                commands.entity(player_entity).despawn();
                despawned_count += 1;
            }
        }

        tracing::info!(
            target: LOG_SERVER,
            "Client {:?} cleanup complete ({} entities despawned)",
            disconnected_client,
            despawned_count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn find_free_port_skips_taken_ports() {
        let ip = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let taken = UdpSocket::bind((ip, 0)).unwrap();
        let taken_port = taken.local_addr().unwrap().port();

        match find_free_port(ip, taken_port) {
            Ok((socket, port)) => {
                assert_ne!(port, taken_port);
                assert_eq!(socket.local_addr().unwrap().port(), port);
            }
            // Every port after an ephemeral one can be taken on a busy machine.
            Err(ServerError::NoFreePort { first, .. }) => assert_eq!(first, taken_port),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn find_free_port_reports_the_bound_port() {
        let ip = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let (socket, port) = find_free_port(ip, 0).unwrap();

        assert_ne!(port, 0);
        assert_eq!(socket.local_addr().unwrap().port(), port);
    }
}
