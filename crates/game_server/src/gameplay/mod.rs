//! Core gameplay systems.
//!
//! Everything here runs on every replica unless noted otherwise:
//! - Player body attachment and parts lookup
//! - Movement force and rigid-body integration
//! - Color assignment (server) and change delivery (all)
//! - Client event handling (server)

pub mod color;
pub mod physics;
pub mod player;
pub mod remote;

pub use color::*;
pub use physics::*;
pub use player::*;
pub use remote::*;

use bevy::prelude::*;

/// Order of the per-step gameplay pipeline in `FixedUpdate`.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum GameplaySet {
    /// Forces from movement intent.
    Forces,
    /// Rigid-body integration.
    Physics,
    /// Publish or send the resulting body state.
    Sync,
}
