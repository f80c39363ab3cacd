//! World-specific components.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Marker component for the ground plane entity.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
pub struct GroundPlane;

/// Size dimensions for the ground plane.
/// This is replicated from server to client so the client knows how to render it.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
pub struct GroundPlaneSize {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl Default for GroundPlaneSize {
    fn default() -> Self {
        Self {
            width: 40.0,
            height: 0.25,
            depth: 40.0,
        }
    }
}
