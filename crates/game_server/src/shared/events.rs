//! Client events.
//!
//! These are sent from the owning client to the server through
//! `commands.client_trigger` and arrive as `FromClient<E>` on the server.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Asks the server to apply the jump impulse to the sender's player.
///
/// Sent on an ordered channel, once per key press.
#[derive(Debug, Clone, Copy, Default, Event, Serialize, Deserialize)]
pub struct JumpRequest;

/// Body state of the sender's player after its local simulation step.
///
/// Sent with `Channel::Unreliable` since newer poses supersede older ones.
#[derive(Debug, Clone, Copy, PartialEq, Event, Serialize, Deserialize)]
pub struct PoseUpdate {
    pub translation: Vec3,
    pub linear_velocity: Vec3,
}
