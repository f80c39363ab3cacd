//! Settings sections owned by the game server.
//!
//! `Network` is read by the dedicated server and the embedded host, `Gameplay`
//! is shared with the client so both sides simulate bodies the same way.

use serde::{Deserialize, Serialize};
use settings::{Settings, SettingsError, SettingsStore};

use crate::gameplay::HsvRange;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Network {
    pub bind_address: String,
    pub port: u16,
    pub max_clients: usize,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".into(),
            port: 5000,
            max_clients: 10,
        }
    }
}

impl Settings for Network {
    const SECTION: &'static str = "network";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gameplay {
    /// Fixed simulation steps per second, the same on server and clients.
    pub tick_rate: f64,
    pub movement_speed: f32,
    pub jump_impulse: f32,
    pub player_mass: f32,
    pub player_radius: f32,
    pub linear_damping: f32,
    pub gravity: f32,
    pub floor_height: f32,
    pub spawn_height: f32,
    pub color_range: HsvRange,
}

impl Default for Gameplay {
    fn default() -> Self {
        Self {
            tick_rate: crate::DEFAULT_TICK_RATE,
            movement_speed: 5.0,
            jump_impulse: 5.0,
            player_mass: 1.0,
            player_radius: 0.5,
            linear_damping: 0.5,
            gravity: -9.81,
            floor_height: 0.0,
            spawn_height: 1.0,
            color_range: HsvRange::default(),
        }
    }
}

impl Settings for Gameplay {
    const SECTION: &'static str = "gameplay";
}

/// Server options given on the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkOverrides {
    pub port: Option<u16>,
    pub bind_address: Option<String>,
}

impl NetworkOverrides {
    pub fn apply(&self, network: &mut Network) {
        if let Some(port) = self.port {
            network.port = port;
        }
        if let Some(bind) = &self.bind_address {
            network.bind_address = bind.clone();
        }
    }

    /// Writes the overrides into the `network` section of `store`, dropping
    /// entries the registered sections no longer know.
    pub fn save(&self, store: &SettingsStore) -> Result<(), SettingsError> {
        store.prune_stale()?;
        store.update::<Network, _>(|network| self.apply(network))
    }
}
