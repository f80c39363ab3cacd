mod camera;
mod lighting;
mod visual_spawners;

use bevy::prelude::*;
use game_server::PlayerBodyConfig;

pub use camera::{FollowCamera, follow_local_player, spawn_camera};
pub use lighting::setup_lighting;
pub use visual_spawners::{
    apply_player_color, decorate_player_body, spawn_ground_plane_visuals,
};

use crate::networking::GameState;

/// Shared mesh handles for replicated entities.
#[derive(Resource, Debug, Clone)]
pub struct RenderAssets {
    pub player_mesh: Handle<Mesh>,
}

/// Main rendering plugin that coordinates all rendering aspects
pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (setup_render_assets, setup_lighting, spawn_camera))
            .add_observer(decorate_player_body)
            .add_observer(apply_player_color)
            .add_systems(
                Update,
                spawn_ground_plane_visuals.run_if(in_state(GameState::InGame)),
            )
            .add_systems(
                PostUpdate,
                follow_local_player.before(TransformSystems::Propagate),
            );
    }
}

fn setup_render_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    config: Res<PlayerBodyConfig>,
) {
    let player_mesh = meshes.add(Sphere::new(config.0.radius));
    commands.insert_resource(RenderAssets { player_mesh });
}
