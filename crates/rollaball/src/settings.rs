//! Client settings section.

use bevy::ecs::world::World;
use serde::{Deserialize, Serialize};
use settings::{Settings, SettingsError};

use crate::input::AxisSmoothing;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Server to join when not hosting locally.
    pub server_address: String,
    pub port: u16,
    /// Start an embedded server on this machine and join it.
    pub host_locally: bool,
    pub axes: AxisSmoothing,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_address: "127.0.0.1".into(),
            port: 5000,
            host_locally: true,
            axes: AxisSmoothing::default(),
        }
    }
}

impl Settings for ClientSettings {
    const SECTION: &'static str = "client";
}

/// Session choices given on the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionOverrides {
    /// Join this server instead of hosting.
    pub connect: Option<String>,
    pub port: Option<u16>,
    /// Host locally even if the settings say otherwise.
    pub host: bool,
}

impl SessionOverrides {
    pub fn apply(&self, settings: &mut ClientSettings) {
        if let Some(address) = &self.connect {
            settings.server_address = address.clone();
            settings.host_locally = false;
        }
        if self.host {
            settings.host_locally = true;
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
    }

    /// Makes the overrides the new saved `client` section.
    pub fn save(&self, world: &mut World) -> Result<(), SettingsError> {
        settings::update_settings::<ClientSettings>(world, |client| self.apply(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_turns_off_local_hosting() {
        let mut client = ClientSettings::default();
        SessionOverrides {
            connect: Some("10.0.0.7".into()),
            port: Some(6000),
            host: false,
        }
        .apply(&mut client);

        assert_eq!(client.server_address, "10.0.0.7");
        assert_eq!(client.port, 6000);
        assert!(!client.host_locally);
        assert_eq!(client.axes, AxisSmoothing::default());
    }

    #[test]
    fn no_overrides_keep_the_settings() {
        let mut client = ClientSettings {
            host_locally: false,
            ..ClientSettings::default()
        };
        SessionOverrides::default().apply(&mut client);
        assert_eq!(
            client,
            ClientSettings {
                host_locally: false,
                ..ClientSettings::default()
            }
        );
    }
}
