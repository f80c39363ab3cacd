//! Player input: smoothed movement axes and the jump button.
//!
//! Keyboard axes are smoothed like an analog stick. A connected gamepad's left
//! stick takes over whenever it is pushed past the dead zone.

use bevy::prelude::*;
use game_server::{LinearVelocity, MovementIntent, PlayerParts, PlayerTuning, RigidBody, jump_player};
use serde::{Deserialize, Serialize};
use settings::SettingsArc;

use crate::networking::LocalPlayer;
use crate::settings::ClientSettings;

/// How fast the keyboard axes follow the keys.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisSmoothing {
    /// Units per second the axis moves toward a held direction.
    pub sensitivity: f32,
    /// Units per second the axis falls back to zero once released.
    pub gravity: f32,
    /// Jump to zero first when the opposite direction is pressed.
    pub snap: bool,
    /// Stick deflection below this is ignored.
    pub dead_zone: f32,
}

impl Default for AxisSmoothing {
    fn default() -> Self {
        Self {
            sensitivity: 3.0,
            gravity: 3.0,
            snap: true,
            dead_zone: 0.19,
        }
    }
}

impl AxisSmoothing {
    /// Moves `current` toward the raw key value `raw` (-1, 0 or 1) over `dt` seconds.
    pub fn step(&self, current: f32, raw: f32, dt: f32) -> f32 {
        if raw == 0.0 {
            let delta = self.gravity * dt;
            if current.abs() <= delta {
                return 0.0;
            }
            return current - delta * current.signum();
        }

        let start = if self.snap && current != 0.0 && current.signum() != raw.signum() {
            0.0
        } else {
            current
        };
        let delta = self.sensitivity * dt;
        (start + (raw - start).clamp(-delta, delta)).clamp(-1.0, 1.0)
    }

    /// Stick value with the dead zone removed.
    pub fn stick(&self, value: f32) -> Option<f32> {
        (value.abs() > self.dead_zone).then(|| value.clamp(-1.0, 1.0))
    }
}

/// Current horizontal (A/D) and vertical (W/S) axis values in `[-1, 1]`.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct InputAxes {
    pub horizontal: f32,
    pub vertical: f32,
}

/// The jump button went down for `player` this frame.
#[derive(Event, Debug, Clone, Copy)]
pub struct JumpPressed {
    pub player: Entity,
}

const LEFT: [KeyCode; 2] = [KeyCode::KeyA, KeyCode::ArrowLeft];
const RIGHT: [KeyCode; 2] = [KeyCode::KeyD, KeyCode::ArrowRight];
const DOWN: [KeyCode; 2] = [KeyCode::KeyS, KeyCode::ArrowDown];
const UP: [KeyCode; 2] = [KeyCode::KeyW, KeyCode::ArrowUp];

/// Raw key axis: -1, 0 or 1. Opposite keys cancel out.
pub fn key_axis(keyboard: &ButtonInput<KeyCode>, negative: [KeyCode; 2], positive: [KeyCode; 2]) -> f32 {
    let mut value = 0.0;
    if keyboard.any_pressed(negative) {
        value -= 1.0;
    }
    if keyboard.any_pressed(positive) {
        value += 1.0;
    }
    value
}

pub fn sample_axes(
    keyboard: Res<ButtonInput<KeyCode>>,
    gamepads: Query<&Gamepad>,
    settings: Res<SettingsArc<ClientSettings>>,
    time: Res<Time>,
    mut axes: ResMut<InputAxes>,
) {
    let smoothing = settings.axes;
    let dt = time.delta_secs();

    let mut horizontal = smoothing.step(axes.horizontal, key_axis(&keyboard, LEFT, RIGHT), dt);
    let mut vertical = smoothing.step(axes.vertical, key_axis(&keyboard, DOWN, UP), dt);

    if let Some(gamepad) = gamepads.iter().next() {
        let stick = gamepad.left_stick();
        if let Some(x) = smoothing.stick(stick.x) {
            horizontal = x;
        }
        if let Some(y) = smoothing.stick(stick.y) {
            vertical = y;
        }
    }

    axes.set_if_neq(InputAxes {
        horizontal,
        vertical,
    });
}

/// Writes the axes into the local player's intent and reports jump presses.
pub fn update_local_intent(
    mut commands: Commands,
    axes: Res<InputAxes>,
    keyboard: Res<ButtonInput<KeyCode>>,
    gamepads: Query<&Gamepad>,
    mut players: Query<(Entity, &mut MovementIntent), With<LocalPlayer>>,
) {
    let jump = keyboard.just_pressed(KeyCode::Space)
        || gamepads
            .iter()
            .any(|gamepad| gamepad.just_pressed(GamepadButton::South));

    for (player, mut intent) in &mut players {
        intent.set_if_neq(MovementIntent::from_axes(axes.horizontal, axes.vertical));
        if jump {
            commands.trigger(JumpPressed { player });
        }
    }
}

/// Applies the jump impulse locally right away.
///
/// The server applies its own impulse when the request arrives.
pub fn predict_jump(
    pressed: On<JumpPressed>,
    players: Query<(&PlayerParts, &PlayerTuning)>,
    mut bodies: Query<(&RigidBody, &mut LinearVelocity)>,
) {
    let player = pressed.event().player;
    if !jump_player(player, &players, &mut bodies) {
        debug!("jump for {player} ignored, body not resolved yet");
    }
}
