//! Rigid-body simulation for player spheres.
//!
//! Bodies are spheres over a flat floor: gravity, linear damping, explicit Euler
//! integration and a floor clamp. Runs in `FixedUpdate` on every replica.

use bevy::prelude::*;

use crate::settings::Gameplay;

/// How a force vector changes a body's velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceMode {
    /// Added directly to the velocity, mass is ignored.
    VelocityChange,
    /// Divided by the body's mass before it is added.
    Impulse,
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
#[require(LinearVelocity, Transform)]
pub struct RigidBody {
    pub mass: f32,
    pub radius: f32,
    pub linear_damping: f32,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            mass: 1.0,
            radius: 0.5,
            linear_damping: 0.5,
        }
    }
}

impl RigidBody {
    pub fn from_settings(settings: &Gameplay) -> Self {
        Self {
            mass: settings.player_mass,
            radius: settings.player_radius,
            linear_damping: settings.linear_damping,
        }
    }
}

#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct LinearVelocity(pub Vec3);

impl LinearVelocity {
    pub fn apply_force(&mut self, body: &RigidBody, force: Vec3, mode: ForceMode) {
        match mode {
            ForceMode::VelocityChange => self.0 += force,
            ForceMode::Impulse => self.0 += force / body.mass,
        }
    }
}

/// World-wide physics constants.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct PhysicsSettings {
    pub gravity: Vec3,
    pub floor_height: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self::from(&Gameplay::default())
    }
}

impl From<&Gameplay> for PhysicsSettings {
    fn from(settings: &Gameplay) -> Self {
        Self {
            gravity: Vec3::Y * settings.gravity,
            floor_height: settings.floor_height,
        }
    }
}

/// Advances every rigid body by one fixed step.
pub fn integrate_bodies(
    mut bodies: Query<(&RigidBody, &mut LinearVelocity, &mut Transform)>,
    physics: Res<PhysicsSettings>,
    time: Res<Time<Fixed>>,
) {
    let dt = time.timestep().as_secs_f32();
    for (body, mut velocity, mut transform) in &mut bodies {
        step_body(body, &mut velocity, &mut transform, &physics, dt);
    }
}

pub fn step_body(
    body: &RigidBody,
    velocity: &mut LinearVelocity,
    transform: &mut Transform,
    physics: &PhysicsSettings,
    dt: f32,
) {
    velocity.0 += physics.gravity * dt;
    velocity.0 *= 1.0 / (1.0 + body.linear_damping * dt);
    transform.translation += velocity.0 * dt;

    let rest_height = physics.floor_height + body.radius;
    if transform.translation.y < rest_height {
        transform.translation.y = rest_height;
        velocity.0.y = velocity.0.y.max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_gravity() -> PhysicsSettings {
        PhysicsSettings {
            gravity: Vec3::ZERO,
            floor_height: -100.0,
        }
    }

    #[test]
    fn velocity_change_ignores_mass() {
        let body = RigidBody {
            mass: 4.0,
            ..Default::default()
        };
        let mut velocity = LinearVelocity::default();
        velocity.apply_force(&body, Vec3::new(0.1, 0.0, 0.0), ForceMode::VelocityChange);
        assert_eq!(velocity.0, Vec3::new(0.1, 0.0, 0.0));
    }

    #[test]
    fn impulse_is_scaled_by_mass() {
        let body = RigidBody {
            mass: 2.0,
            ..Default::default()
        };
        let mut velocity = LinearVelocity(Vec3::new(1.0, 0.0, 0.0));
        velocity.apply_force(&body, Vec3::Y * 5.0, ForceMode::Impulse);
        assert_eq!(velocity.0, Vec3::new(1.0, 2.5, 0.0));
    }

    #[test]
    fn resting_body_stays_on_the_floor() {
        let body = RigidBody::default();
        let physics = PhysicsSettings::default();
        let mut velocity = LinearVelocity::default();
        let mut transform = Transform::from_xyz(0.0, physics.floor_height + body.radius, 0.0);

        for _ in 0..50 {
            step_body(&body, &mut velocity, &mut transform, &physics, 0.02);
        }

        assert_eq!(transform.translation.y, physics.floor_height + body.radius);
        assert_eq!(velocity.0.y, 0.0);
    }

    #[test]
    fn damping_slows_a_moving_body() {
        let body = RigidBody::default();
        let mut velocity = LinearVelocity(Vec3::new(2.0, 0.0, 0.0));
        let mut transform = Transform::default();

        step_body(&body, &mut velocity, &mut transform, &no_gravity(), 0.02);

        assert!(velocity.0.x < 2.0);
        assert!(transform.translation.x > 0.0);
    }

    #[test]
    fn integrate_system_uses_the_fixed_timestep() {
        let mut app = App::new();
        app.insert_resource(no_gravity())
            .insert_resource(Time::<Fixed>::from_seconds(0.5))
            .add_systems(FixedUpdate, integrate_bodies);

        let entity = app
            .world_mut()
            .spawn((
                RigidBody {
                    linear_damping: 0.0,
                    ..Default::default()
                },
                LinearVelocity(Vec3::new(2.0, 0.0, 0.0)),
            ))
            .id();

        app.world_mut().run_schedule(FixedUpdate);

        let transform = app.world().get::<Transform>(entity).unwrap();
        assert_eq!(transform.translation, Vec3::new(1.0, 0.0, 0.0));
    }
}
