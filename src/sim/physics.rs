//! Sub-stepped semi-implicit integration
//!
//! One large step at a low frame rate tunnels through the collision
//! separation distance; splitting delta-time into fixed sub-steps
//! bounds the per-step displacement instead. Forces are accumulated
//! into `acceleration` by other systems and consumed (then zeroed)
//! here, so nothing persists across sub-steps or ticks.

use glam::Vec3;

use crate::config::SimConfig;
use crate::consts::{MIN_MASS, SPEED_EPSILON};
use crate::sim::entity::EntityStore;

/// Advance every active, non-kinematic, physics-enabled entity by one
/// tick of `dt` seconds, split into the configured sub-steps.
pub fn integrate(store: &mut EntityStore, config: &SimConfig, dt: f32) {
    let substeps = config.physics_substeps.max(1);
    let sub_dt = dt / substeps as f32;

    for _ in 0..substeps {
        for entity in store.iter_mut() {
            if !entity.active || !entity.enabled || entity.is_kinematic {
                continue;
            }

            if entity.has_gravity {
                entity.acceleration += config.gravity;
            }

            // Quadratic drag opposing the velocity direction
            let speed = entity.velocity.length();
            if speed > SPEED_EPSILON {
                let drag_dir = entity.velocity / speed;
                let drag_force = 0.5 * config.air_density * speed * speed * entity.drag;
                entity.acceleration -= drag_dir * (drag_force / entity.mass.max(MIN_MASS));
            }

            // Semi-implicit Euler
            let prev_position = entity.position;
            entity.velocity += entity.acceleration * sub_dt;
            entity.position += entity.velocity * sub_dt;

            // Linear friction as multiplicative decay
            entity.velocity *= 1.0 - entity.friction * sub_dt;

            entity.acceleration = Vec3::ZERO;

            // A non-finite value must not poison the simulation forever
            if !entity.velocity.is_finite() {
                entity.velocity = Vec3::ZERO;
            }
            if !entity.position.is_finite() {
                entity.position = prev_position;
            }
        }
    }
}
