//! Server diagnostics.

use app::LOG_SERVER;
use bevy::prelude::*;
use std::time::Duration;

use crate::shared::Player;

/// Fixed steps between two heartbeat log lines.
const HEARTBEAT_INTERVAL: u64 = 500;

#[derive(Default)]
pub struct HeartbeatState {
    last_tick: Option<Duration>,
    tick_count: u64,
}

/// Logs tick timing and the number of live players every few hundred fixed steps.
pub fn heartbeat_system(
    mut state: Local<HeartbeatState>,
    time_fixed: Res<Time<Fixed>>,
    time_real: Res<Time<Real>>,
    players: Query<(), With<Player>>,
) {
    let now = time_real.elapsed();
    let Some(last_tick) = state.last_tick.replace(now) else {
        tracing::debug!(target: LOG_SERVER, "Server heartbeat initialized");
        return;
    };

    state.tick_count += 1;
    if state.tick_count % HEARTBEAT_INTERVAL == 0 {
        let target_ms = time_fixed.timestep().as_secs_f64() * 1000.0;
        let real_ms = now.saturating_sub(last_tick).as_secs_f64() * 1000.0;
        tracing::info!(
            target: LOG_SERVER,
            "tick #{} | target: {:.2}ms | last: {:.2}ms | players: {}",
            state.tick_count,
            target_ms,
            real_ms,
            players.iter().count()
        );
    }
}
