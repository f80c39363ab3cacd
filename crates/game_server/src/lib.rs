//! Shared gameplay and authoritative server logic for Rollaball.
//!
//! This crate contains the player object, the body simulation and the server
//! authority logic that is shared between:
//! - `rollaball_server` (dedicated server binary)
//! - `ServerHandle` (server thread embedded in the `rollaball` client)
//!
//! The client adds [`SharedGameplayPlugin`] so both sides simulate bodies with
//! the same code.

pub mod error;
pub mod gameplay;
pub mod network;
pub mod plugin;
pub mod settings;
pub mod shared;
pub mod systems;
pub mod world;

pub use error::ServerError;
pub use gameplay::*;
pub use network::{Port, PortStorage, ServerReadyFlag, ShutdownFlag};
pub use plugin::{GameServerPlugin, SharedGameplayPlugin};
pub use shared::*;
pub use world::{GroundPlane, GroundPlaneSize};

use app::LOG_SERVER;
use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::settings::{Gameplay, Network};

/// Fixed simulation rate used when nothing else is configured.
pub const DEFAULT_TICK_RATE: f64 = 50.0;

/// Rate of the headless main loop. Fixed steps are caught up inside each frame.
const SERVER_FRAME_RATE: f64 = 120.0;

/// Cross-thread state of a running server.
#[derive(Clone, Default)]
pub struct ServerSignals {
    pub ready: ServerReadyFlag,
    pub port: PortStorage,
    pub shutdown: ShutdownFlag,
}

/// Adds everything a headless authoritative server needs to `app`.
///
/// `network.port` is the first port tried, the bound one ends up in the
/// `Port` resource and in `signals.port`.
pub fn configure_server_app(
    app: &mut App,
    network: Network,
    gameplay: Gameplay,
    signals: ServerSignals,
) -> &mut App {
    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / SERVER_FRAME_RATE,
        ))),
        StatesPlugin,
    ))
    .insert_resource(signals.ready)
    .insert_resource(signals.port)
    .insert_resource(signals.shutdown)
    .add_plugins(GameServerPlugin {
        port: network.port,
        gameplay: gameplay.clone(),
    })
    .insert_resource(::settings::SettingsArc(Arc::new(network)))
    .insert_resource(::settings::SettingsArc(Arc::new(gameplay)))
}

/// Handle to a server running on a background thread of the client process.
///
/// Dropping the handle stops the server and waits for its thread.
#[derive(Resource)]
pub struct ServerHandle {
    signals: ServerSignals,
    thread: Option<JoinHandle<()>>,
}

impl ServerHandle {
    /// Starts a localhost server on its own thread, trying ports from `port` upward.
    pub fn start_embedded(port: Port, gameplay: Gameplay) -> Result<Self, ServerError> {
        let signals = ServerSignals::default();
        let network = Network {
            bind_address: "127.0.0.1".into(),
            port: port.0,
            ..Network::default()
        };

        let thread_signals = signals.clone();
        let thread = std::thread::Builder::new()
            .name("embedded-server".into())
            .spawn(move || {
                let mut app = App::new();
                configure_server_app(&mut app, network, gameplay, thread_signals);
                let exit = app.run();
                tracing::info!(target: LOG_SERVER, "Embedded server exited: {exit:?}");
            })?;

        tracing::info!(target: LOG_SERVER, "Embedded server thread started");
        Ok(Self {
            signals,
            thread: Some(thread),
        })
    }

    pub fn is_ready(&self) -> bool {
        self.signals.ready.0.load(Ordering::Acquire)
    }

    /// True when the server thread ended before it became ready.
    pub fn has_failed(&self) -> bool {
        !self.is_ready() && self.thread.as_ref().is_none_or(|t| t.is_finished())
    }

    /// Bound port, available once the server is ready.
    pub fn port(&self) -> Option<u16> {
        if !self.is_ready() {
            return None;
        }
        self.signals.port.0.lock().ok().map(|port| *port)
    }

    /// Asks the server to exit and waits for its thread.
    pub fn shutdown(&mut self) {
        self.signals.shutdown.0.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!(target: LOG_SERVER, "Embedded server thread panicked");
            }
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
