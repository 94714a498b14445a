//! Buffered input intents
//!
//! The host translates raw device events into intents between ticks;
//! the orchestrator consumes them at the start of the next tick. Held
//! movement keys are level-triggered, pause/debug are edge-triggered
//! (a queued toggle fires exactly once however many ticks late it is
//! consumed).

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One host-facing input intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputIntent {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Pause,
    Debug,
}

/// Intent buffer applied strictly between ticks
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct InputState {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
    pause_queued: bool,
    debug_queued: bool,
}

impl InputState {
    pub fn apply(&mut self, intent: InputIntent, pressed: bool) {
        match intent {
            InputIntent::MoveUp => self.up = pressed,
            InputIntent::MoveDown => self.down = pressed,
            InputIntent::MoveLeft => self.left = pressed,
            InputIntent::MoveRight => self.right = pressed,
            InputIntent::Pause => {
                if pressed {
                    self.pause_queued = true;
                }
            }
            InputIntent::Debug => {
                if pressed {
                    self.debug_queued = true;
                }
            }
        }
    }

    /// Current movement direction in screen convention (up is -y),
    /// normalized so diagonals are not faster.
    pub fn movement(&self) -> Vec3 {
        let mut movement = Vec3::ZERO;
        if self.up {
            movement.y -= 1.0;
        }
        if self.down {
            movement.y += 1.0;
        }
        if self.left {
            movement.x -= 1.0;
        }
        if self.right {
            movement.x += 1.0;
        }
        if movement.length_squared() > 1.0 {
            movement = movement.normalize();
        }
        movement
    }

    /// Consume a queued pause toggle
    pub fn take_pause(&mut self) -> bool {
        std::mem::take(&mut self.pause_queued)
    }

    /// Consume a queued debug toggle
    pub fn take_debug(&mut self) -> bool {
        std::mem::take(&mut self.debug_queued)
    }
}
