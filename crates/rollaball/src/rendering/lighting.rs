use bevy::prelude::*;

pub fn setup_lighting(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            illuminance: 3_000.0,
            ..default()
        },
        Transform::from_xyz(-12.0, 18.0, 12.0).looking_at(Vec3::ZERO, Vec3::Y),
        Name::new("Main Directional Light"),
    ));
}
