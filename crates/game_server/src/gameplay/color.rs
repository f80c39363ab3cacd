//! Player color: one-time server assignment and change delivery on every replica.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::shared::{AppliedColor, Player, PlayerColor, PlayerParts};

/// Inclusive sampling range in HSV space. Hue is a fraction of the full circle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HsvRange {
    pub hue: (f32, f32),
    pub saturation: (f32, f32),
    pub value: (f32, f32),
}

impl Default for HsvRange {
    fn default() -> Self {
        Self {
            hue: (0.5, 1.0),
            saturation: (0.5, 1.0),
            value: (0.5, 1.0),
        }
    }
}

fn sample_in<R: Rng + ?Sized>(rng: &mut R, (min, max): (f32, f32)) -> f32 {
    if min >= max {
        return min;
    }
    rng.gen_range(min..=max)
}

impl HsvRange {
    /// Samples an opaque color inside the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Color {
        let hue = sample_in(rng, self.hue);
        let saturation = sample_in(rng, self.saturation);
        let value = sample_in(rng, self.value);
        Color::hsva(hue * 360.0, saturation, value, 1.0)
    }
}

/// Server-side color source for newly spawned players.
#[derive(Resource, Debug)]
pub struct PlayerColorSampler {
    pub range: HsvRange,
    rng: StdRng,
}

impl PlayerColorSampler {
    pub fn new(range: HsvRange) -> Self {
        Self {
            range,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(range: HsvRange, seed: u64) -> Self {
        Self {
            range,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next_color(&mut self) -> Color {
        self.range.sample(&mut self.rng)
    }
}

impl Default for PlayerColorSampler {
    fn default() -> Self {
        Self::new(HsvRange::default())
    }
}

/// Triggered once per distinct replicated color value, on every replica.
#[derive(Event, Debug, Clone, Copy)]
pub struct ColorChanged {
    pub player: Entity,
    pub old: Color,
    pub new: Color,
}

/// Server spawn hook: picks the player's color the moment `Player` is added.
pub fn assign_spawn_color(
    add: On<Add, Player>,
    mut sampler: ResMut<PlayerColorSampler>,
    mut colors: Query<&mut PlayerColor>,
) {
    let Ok(mut color) = colors.get_mut(add.entity) else {
        return;
    };
    color.0 = sampler.next_color();
    tracing::debug!(target: app::LOG_SERVER, "assigned color {:?} to {}", color.0, add.entity);
}

/// Compares the replicated color with the last delivered one and fires
/// [`ColorChanged`] when they differ. Players without parts are skipped.
pub fn detect_color_changes(
    mut commands: Commands,
    mut players: Query<
        (Entity, &PlayerColor, &mut AppliedColor),
        (
            With<PlayerParts>,
            Or<(Changed<PlayerColor>, Added<PlayerParts>)>,
        ),
    >,
) {
    for (player, color, mut applied) in &mut players {
        if color.0 == applied.0 {
            continue;
        }
        let old = std::mem::replace(&mut applied.0, color.0);
        commands.trigger(ColorChanged {
            player,
            old,
            new: color.0,
        });
    }
}

pub fn log_color_change(changed: On<ColorChanged>) {
    let event = changed.event();
    tracing::info!(
        target: app::LOG_SERVER,
        "player {} color {:?} -> {:?}",
        event.player,
        event.old,
        event.new
    );
}
