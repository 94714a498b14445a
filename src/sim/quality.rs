//! Frame-time tracking and the adaptive quality governor
//!
//! The governor watches a rolling average of frame gaps and walks a
//! three-level quality ladder one step at a time. Degradation is quick
//! (short cooldown), recovery is slow (long cooldown): symmetric
//! thresholds oscillate visibly under borderline frame times, so the
//! asymmetry plus the cooldown is the whole anti-thrash design.

use serde::{Deserialize, Serialize};

use crate::consts::{FRAME_WINDOW, QUALITY_COOLDOWN_TICKS, QUALITY_RAISE_MULTIPLIER};

/// Discrete fidelity-for-throughput setting, gating which systems run
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum QualityLevel {
    Low,
    Medium,
    #[default]
    High,
}

impl QualityLevel {
    /// One step down the ladder, if any
    pub fn lower(self) -> Option<QualityLevel> {
        match self {
            QualityLevel::Low => None,
            QualityLevel::Medium => Some(QualityLevel::Low),
            QualityLevel::High => Some(QualityLevel::Medium),
        }
    }

    /// One step up the ladder, if any
    pub fn raise(self) -> Option<QualityLevel> {
        match self {
            QualityLevel::Low => Some(QualityLevel::Medium),
            QualityLevel::Medium => Some(QualityLevel::High),
            QualityLevel::High => None,
        }
    }

    /// Collision resolution runs at Medium and above
    pub fn collision_enabled(self) -> bool {
        self >= QualityLevel::Medium
    }

    /// Particle ticking and spawning run only at High
    pub fn particles_enabled(self) -> bool {
        self >= QualityLevel::High
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QualityLevel::Low => "low",
            QualityLevel::Medium => "medium",
            QualityLevel::High => "high",
        }
    }
}

/// Rolling frame statistics plus the governor state
#[derive(Debug, Clone)]
pub struct PerfMonitor {
    budget_ms: f32,
    last_timestamp_ms: Option<f64>,
    frame_times_ms: Vec<f32>,
    average_frame_time_ms: f32,
    fps_counter: u32,
    fps_timer: f64,
    current_fps: f32,
    quality: QualityLevel,
    adaptive: bool,
    cooldown: u32,
}

impl PerfMonitor {
    pub fn new(budget_ms: f32) -> Self {
        Self {
            budget_ms,
            last_timestamp_ms: None,
            frame_times_ms: Vec::with_capacity(FRAME_WINDOW),
            average_frame_time_ms: budget_ms,
            fps_counter: 0,
            fps_timer: 0.0,
            current_fps: 0.0,
            quality: QualityLevel::default(),
            adaptive: true,
            cooldown: 0,
        }
    }

    /// Record the gap since the previous tick and update rolling stats.
    /// Returns the raw (unclamped, unscaled) gap in seconds; the
    /// orchestrator owns scaling and clamping.
    pub fn begin_frame(&mut self, timestamp_ms: f64) -> f32 {
        let gap_ms = match self.last_timestamp_ms {
            Some(prev) => (timestamp_ms - prev).max(0.0),
            None => self.budget_ms as f64,
        };
        self.last_timestamp_ms = Some(timestamp_ms);

        self.frame_times_ms.push(gap_ms as f32);
        if self.frame_times_ms.len() > FRAME_WINDOW {
            self.frame_times_ms.remove(0);
        }
        self.average_frame_time_ms =
            self.frame_times_ms.iter().sum::<f32>() / self.frame_times_ms.len() as f32;

        self.fps_counter += 1;
        self.fps_timer += gap_ms / 1000.0;
        if self.fps_timer >= 1.0 {
            self.current_fps = self.fps_counter as f32 / self.fps_timer as f32;
            self.fps_counter = 0;
            self.fps_timer = 0.0;
        }

        (gap_ms / 1000.0) as f32
    }

    /// Evaluate the governor once, after the tick's sample was recorded.
    /// The adjusted level takes effect next tick.
    pub fn end_frame(&mut self) {
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return;
        }
        if !self.adaptive {
            return;
        }

        if self.average_frame_time_ms > self.budget_ms * 1.2 {
            if let Some(lower) = self.quality.lower() {
                self.quality = lower;
                self.cooldown = QUALITY_COOLDOWN_TICKS;
                log::debug!(
                    "quality lowered to {} (avg frame time {:.2}ms)",
                    lower.as_str(),
                    self.average_frame_time_ms
                );
            }
        } else if self.average_frame_time_ms < self.budget_ms * 0.7 {
            if let Some(raise) = self.quality.raise() {
                self.quality = raise;
                self.cooldown = QUALITY_COOLDOWN_TICKS * QUALITY_RAISE_MULTIPLIER;
                log::debug!(
                    "quality raised to {} (avg frame time {:.2}ms)",
                    raise.as_str(),
                    self.average_frame_time_ms
                );
            }
        }
    }

    pub fn quality(&self) -> QualityLevel {
        self.quality
    }

    /// Manual override: pins the level and disables adaptation until
    /// explicitly re-enabled.
    pub fn set_quality(&mut self, level: QualityLevel) {
        self.quality = level;
        self.adaptive = false;
        self.cooldown = 0;
        log::info!("quality pinned to {} (adaptive off)", level.as_str());
    }

    pub fn enable_adaptive(&mut self, enabled: bool) {
        self.adaptive = enabled;
        log::info!(
            "adaptive quality {}",
            if enabled { "enabled" } else { "disabled" }
        );
    }

    pub fn is_adaptive(&self) -> bool {
        self.adaptive
    }

    pub fn fps(&self) -> f32 {
        self.current_fps
    }

    pub fn average_frame_time_ms(&self) -> f32 {
        self.average_frame_time_ms
    }
}
