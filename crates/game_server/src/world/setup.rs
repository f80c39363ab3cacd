//! World setup and player spawn placement.

use crate::world::{GroundPlane, GroundPlaneSize};
use bevy::prelude::*;
use bevy_replicon::prelude::Replicated;

/// Radius of the ring new players are spread over.
const SPAWN_RING_RADIUS: f32 = 3.0;
/// Players per full turn of the spawn ring.
const SPAWN_RING_SLOTS: u32 = 8;

/// Spawns the static world geometry (ground plane).
///
/// This is called on the first client connection. The plane's top face sits at
/// `floor_height` so it lines up with the physics floor.
pub fn spawn_world(commands: &mut Commands, floor_height: f32) {
    let size = GroundPlaneSize::default();
    commands.spawn((
        GroundPlane,
        Transform::from_xyz(0.0, floor_height - size.height / 2.0, 0.0),
        size,
        Replicated,
    ));
}

/// Spawn position of the `index`-th player.
pub fn spawn_position(index: u32, height: f32) -> Vec3 {
    let angle = index as f32 * std::f32::consts::TAU / SPAWN_RING_SLOTS as f32;
    Vec3::new(
        angle.cos() * SPAWN_RING_RADIUS,
        height,
        angle.sin() * SPAWN_RING_RADIUS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_positions_differ_and_keep_height() {
        let first = spawn_position(0, 1.0);
        let second = spawn_position(1, 1.0);
        assert_ne!(first, second);
        assert_eq!(first.y, 1.0);
        assert!((first.xz().length() - SPAWN_RING_RADIUS).abs() < 1e-5);
    }

    #[test]
    fn ground_top_matches_floor() {
        let mut app = App::new();
        app.add_systems(Update, |mut commands: Commands| spawn_world(&mut commands, 0.0));
        app.update();

        let mut planes = app
            .world_mut()
            .query_filtered::<(&Transform, &GroundPlaneSize), With<GroundPlane>>();
        let (transform, size) = planes.single(app.world()).unwrap();
        assert_eq!(transform.translation.y + size.height / 2.0, 0.0);
    }
}
