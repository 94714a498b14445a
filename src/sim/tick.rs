//! Per-frame orchestration
//!
//! The fixed entry point the host calls once per frame with a monotonic
//! timestamp. Runs to completion; nothing here suspends or re-enters.
//! Every sub-system sees the same already-clamped delta-time, and the
//! governor only sees this tick's cost after the systems it gates have
//! run - a one-tick-delayed feedback loop.

use crate::consts::{CONTACT_BURST_COUNT, MAX_DELTA_TIME, MOVE_ACCEL};
use crate::sim::state::SimState;
use crate::sim::{behavior, collision, physics};

/// Advance the simulation by one frame
pub fn tick(state: &mut SimState, timestamp_ms: f64) {
    // Queued toggles are consumed even while paused; otherwise a paused
    // core could never unpause through the intent buffer.
    if state.input.take_pause() {
        state.paused = !state.paused;
        log::debug!("paused: {}", state.paused);
    }
    if state.input.take_debug() {
        state.debug = !state.debug;
        log::debug!("debug overlay: {}", state.debug);
    }

    if state.paused {
        return;
    }

    // Delta-time: frame gap, scaled, then clamped so one slow or
    // backgrounded frame cannot cause a physics jump.
    let gap_secs = state.perf.begin_frame(timestamp_ms);
    let dt = (gap_secs * state.time_scale).min(MAX_DELTA_TIME);
    state.tick_count += 1;

    // Input intents steer the primary actor
    let movement = state.input.movement();
    if movement.length_squared() > 0.0
        && let Some(id) = state.primary
        && let Some(entity) = state.entities.get_mut(id)
        && entity.active
    {
        entity.acceleration += movement * MOVE_ACCEL;
    }

    let quality = state.perf.quality();

    // Physics runs at every quality level
    physics::integrate(&mut state.entities, &state.config, dt);

    // Wander behavior is cheap and always runs
    behavior::update(&mut state.entities, &state.config, &mut state.rng, dt);

    // Collision resolution from Medium up
    if quality.collision_enabled() {
        let outcome = collision::resolve_collisions(&mut state.entities, &mut state.grid, &state.config);
        state.score += outcome.score;
        // Contact bursts only when particle spawning is on
        if quality.particles_enabled() {
            for midpoint in outcome.bursts {
                state
                    .particles
                    .spawn_burst(midpoint, CONTACT_BURST_COUNT, &mut state.rng);
            }
        }
    }

    // Particle ticking only at High
    if quality.particles_enabled() {
        state.particles.tick(state.config.gravity, dt);
    }

    // Camera follows the primary actor wherever compaction moved it
    if let Some(target) = state.primary().map(|e| e.position) {
        state.camera.follow(target, dt);
    }

    // Cleanup cadences always run: entities every tick, particles on
    // the pool's own interval
    state.entities.compact();
    state.particles.end_tick();

    if state.debug && state.tick_count.is_multiple_of(60) {
        log::debug!(
            "fps {:.1}, entities {}, particles {}, quality {}",
            state.perf.fps(),
            state.entities.active_count(),
            state.particles.active_count(),
            quality.as_str()
        );
    }

    // Feed the governor last; the adjusted level gates the next tick
    state.perf.end_frame();
}
