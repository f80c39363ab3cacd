//! Player components.
//!
//! The replicated ones are registered in [`ProtocolPlugin`](super::ProtocolPlugin)
//! and must be registered identically by server and client. The rest are local to
//! each replica and are inserted by `#[require]` or by the gameplay systems.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Marks the root entity of a player object.
///
/// Every replica gets its own local state through the required components.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
#[require(Transform, PlayerTuning, PlayerColor, PlayerPose, MovementIntent, AppliedColor)]
pub struct Player;

/// Identifies which client owns a replicated player entity.
///
/// The contained `client_id` is the id negotiated during the netcode handshake
/// so that clients can recognise their own replicated entity.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
pub struct PlayerIdentity {
    pub client_id: u64,
}

/// Per-object movement speed and jump magnitude.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
pub struct PlayerTuning {
    pub movement_speed: f32,
    pub jump_impulse: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            movement_speed: 5.0,
            jump_impulse: 5.0,
        }
    }
}

/// Authoritative player color. Written once by the server when the player spawns.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
pub struct PlayerColor(pub Color);

impl Default for PlayerColor {
    fn default() -> Self {
        Self(Color::WHITE)
    }
}

/// Body state published by the server after each simulation step.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
pub struct PlayerPose {
    pub translation: Vec3,
    pub linear_velocity: Vec3,
}

/// Planar movement intent of the owning client. `y` is always zero.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct MovementIntent(pub Vec3);

impl MovementIntent {
    pub fn from_axes(horizontal: f32, vertical: f32) -> Self {
        Self(Vec3::new(horizontal, 0.0, vertical))
    }
}

/// Last color delivered to the color-change callback on this replica.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct AppliedColor(pub Color);

impl Default for AppliedColor {
    fn default() -> Self {
        Self(Color::WHITE)
    }
}

/// Parts of the player object, looked up once after the body is attached.
///
/// Neither entity is owned by this component; both are descendants of the root.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerParts {
    pub body: Entity,
    pub surface: Option<Entity>,
}

/// Set when the parts lookup found no rigid body. The player is skipped from then on.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PartsUnresolved;

/// Links a player entity to its `ConnectedClient` entity on the server.
///
/// **Server-only**, not replicated. Used to route client events to the right
/// player and for cleanup when clients disconnect.
#[derive(Component, Debug, Clone, Copy)]
pub struct PlayerOwner {
    pub client_entity: Entity,
}
