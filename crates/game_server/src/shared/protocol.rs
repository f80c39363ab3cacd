use bevy::prelude::*;
use bevy_replicon::prelude::*;

use super::{JumpRequest, Player, PlayerColor, PlayerIdentity, PlayerPose, PlayerTuning, PoseUpdate};
use crate::world::{GroundPlane, GroundPlaneSize};

/// Netcode protocol id. Client and server refuse to talk if these differ.
pub const PROTOCOL_ID: u64 = 0x524f_4c4c_4241_4c4c;

/// Registers everything that goes over the wire.
///
/// **IMPORTANT**: server and client both add this plugin, registration order
/// has to match on both sides.
pub struct ProtocolPlugin;

impl Plugin for ProtocolPlugin {
    fn build(&self, app: &mut App) {
        app
            // Player components
            .replicate::<Player>()
            .replicate::<PlayerIdentity>()
            .replicate::<PlayerTuning>()
            .replicate::<PlayerColor>()
            .replicate::<PlayerPose>()
            // World components
            .replicate::<Transform>()
            .replicate::<GroundPlane>()
            .replicate::<GroundPlaneSize>()
            // Client events
            .add_client_event::<JumpRequest>(Channel::Ordered)
            .add_client_event::<PoseUpdate>(Channel::Unreliable);
    }
}
