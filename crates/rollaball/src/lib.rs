//! Rollaball client.
//!
//! Connects to a dedicated server or to a server embedded in this process,
//! turns keyboard and gamepad input into the local player's movement intent,
//! predicts jumps, and renders replicated players in their server color.

pub mod error;
pub mod input;
pub mod networking;
pub mod plugin;
pub mod rendering;
pub mod settings;

pub use error::ClientError;
pub use plugin::ClientPlugin;

use app::LOG_CLIENT;
use bevy::prelude::*;
use game_server::settings::Gameplay;
use game_server::{Port, ServerHandle};
use std::net::{IpAddr, Ipv4Addr};

use crate::networking::{ConnectionTarget, GameState};
use crate::settings::ClientSettings;

/// Decides how the session starts.
///
/// With `host_locally` an embedded server is started right away and the client
/// waits for it, otherwise it connects to the configured server directly.
pub fn session_start(
    client: &ClientSettings,
    gameplay: &Gameplay,
) -> Result<(ConnectionTarget, GameState, Option<ServerHandle>), ClientError> {
    if client.host_locally {
        let server = ServerHandle::start_embedded(Port(client.port), gameplay.clone())?;
        let target = ConnectionTarget {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: client.port,
        };
        info!(target: LOG_CLIENT, "Hosting locally, waiting for embedded server");
        return Ok((target, GameState::StartingHost, Some(server)));
    }

    let target = ConnectionTarget {
        address: client.server_address.parse()?,
        port: client.port,
    };
    Ok((target, GameState::ConnectingToServer, None))
}

/// Adds the client plugins on top of an app that already has `DefaultPlugins`.
pub fn configure_client_app(
    app: &mut App,
    client: &ClientSettings,
    gameplay: Gameplay,
) -> Result<&mut App, ClientError> {
    let (target, initial_state, server) = session_start(client, &gameplay)?;
    if let Some(server) = server {
        app.insert_resource(server);
    }

    app.add_plugins((
        bevy_replicon::prelude::RepliconPlugins,
        bevy_replicon_renet::RepliconRenetPlugins,
    ))
    .add_plugins(ClientPlugin {
        gameplay,
        target,
        initial_state,
    });
    Ok(app)
}
