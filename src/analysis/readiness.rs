// Readiness state machine - gatekeeps when exercise analysis begins
//
// Two counters give hysteresis in both directions: a confirmation counter
// must reach `confirmation_frames` before the user is ready, while a
// separate bad-frame counter absorbs estimator jitter until it exceeds
// `bad_frame_tolerance`. While exercising, completeness is relaxed and
// only a sustained run of out-of-range frames ends the set.
//
// The machine is fed precomputed per-frame signals so it stays independent
// of exercise geometry.

use serde::{Deserialize, Serialize};

use crate::config::ReadinessConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadinessState {
    NotReady,
    GettingReady,
    ReadyToStart,
    Exercising,
}

impl ReadinessState {
    /// Setup states get error feedback at reduced severity
    pub fn is_setup(&self) -> bool {
        matches!(self, ReadinessState::GettingReady | ReadinessState::ReadyToStart)
    }
}

/// Per-frame inputs derived from the pose and the active profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadinessSignals {
    /// Fraction of the completeness joint set that is visible
    pub visible_ratio: f32,
    pub in_start_position: bool,
    pub in_motion_range: bool,
    pub tracked_angle: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessTransition {
    pub from: ReadinessState,
    pub to: ReadinessState,
}

/// Outcome of one update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessUpdate {
    /// Whether the frame passed the completeness check for the state it arrived in
    pub complete: bool,
    pub transition: Option<ReadinessTransition>,
}

#[derive(Debug, Clone)]
pub struct ReadinessMachine {
    config: ReadinessConfig,
    requires_movement: bool,
    state: ReadinessState,
    confirm_count: u32,
    bad_count: u32,
    out_of_range_count: u32,
    previous_tracked: Option<f32>,
    last_complete: bool,
}

impl ReadinessMachine {
    pub fn new(config: ReadinessConfig, requires_movement: bool) -> Self {
        Self {
            config,
            requires_movement,
            state: ReadinessState::NotReady,
            confirm_count: 0,
            bad_count: 0,
            out_of_range_count: 0,
            previous_tracked: None,
            last_complete: false,
        }
    }

    pub fn state(&self) -> ReadinessState {
        self.state
    }

    pub fn confirm_count(&self) -> u32 {
        self.confirm_count
    }

    pub fn bad_count(&self) -> u32 {
        self.bad_count
    }

    pub fn out_of_range_count(&self) -> u32 {
        self.out_of_range_count
    }

    pub fn confirmation_frames(&self) -> u32 {
        self.config.confirmation_frames
    }

    /// Whether the last frame passed the completeness check
    pub fn last_frame_complete(&self) -> bool {
        self.last_complete
    }

    /// Advance by one frame
    pub fn update(&mut self, signals: &ReadinessSignals) -> ReadinessUpdate {
        let from = self.state;
        let required_ratio = if from == ReadinessState::Exercising {
            self.config.exercising_visibility_ratio
        } else {
            self.config.visibility_ratio
        };
        let complete = signals.visible_ratio >= required_ratio;
        self.last_complete = complete;

        match from {
            ReadinessState::Exercising => {
                if complete && signals.in_motion_range {
                    self.out_of_range_count = 0;
                } else {
                    self.out_of_range_count += 1;
                }
                if self.out_of_range_count > self.config.exercising_exit_tolerance {
                    self.enter_not_ready();
                }
            }
            _ if !complete => self.enter_not_ready(),
            ReadinessState::NotReady => {
                if signals.in_start_position {
                    self.state = ReadinessState::GettingReady;
                    self.confirm_count = 1;
                    self.bad_count = 0;
                }
            }
            ReadinessState::GettingReady => {
                if signals.in_start_position {
                    self.confirm_count += 1;
                    self.bad_count = 0;
                    if self.confirm_count >= self.config.confirmation_frames {
                        self.state = if self.requires_movement {
                            ReadinessState::ReadyToStart
                        } else {
                            ReadinessState::Exercising
                        };
                        self.bad_count = 0;
                        self.out_of_range_count = 0;
                    }
                } else {
                    self.register_bad_frame();
                }
            }
            ReadinessState::ReadyToStart => {
                let moved = !self.requires_movement
                    || matches!(
                        (self.previous_tracked, signals.tracked_angle),
                        (Some(prev), Some(cur))
                            if (cur - prev).abs() > self.config.movement_threshold_deg
                    );
                if moved {
                    self.state = ReadinessState::Exercising;
                    self.out_of_range_count = 0;
                } else if signals.in_start_position {
                    self.bad_count = 0;
                } else {
                    self.register_bad_frame();
                }
            }
        }

        self.previous_tracked = signals.tracked_angle;

        let transition = (self.state != from).then_some(ReadinessTransition {
            from,
            to: self.state,
        });
        ReadinessUpdate {
            complete,
            transition,
        }
    }

    fn register_bad_frame(&mut self) {
        self.bad_count += 1;
        if self.bad_count > self.config.bad_frame_tolerance {
            self.enter_not_ready();
        }
    }

    fn enter_not_ready(&mut self) {
        self.state = ReadinessState::NotReady;
        self.confirm_count = 0;
        self.bad_count = 0;
        self.out_of_range_count = 0;
    }

    /// Human-readable setup guidance for the current state
    pub fn message(&self, display_name: &str, setup_hint: &str, repetitions: u32) -> String {
        match self.state {
            ReadinessState::NotReady if !self.last_complete => {
                "Step back so your whole body is visible".to_string()
            }
            ReadinessState::NotReady => format!("Get into position: {}", setup_hint),
            ReadinessState::GettingReady => format!(
                "Hold still... ({}/{})",
                self.confirm_count.min(self.config.confirmation_frames),
                self.config.confirmation_frames
            ),
            ReadinessState::ReadyToStart => {
                format!("Ready, begin your {}", display_name.to_lowercase())
            }
            ReadinessState::Exercising => format!("Reps: {}", repetitions),
        }
    }

    pub fn reset(&mut self) {
        self.enter_not_ready();
        self.previous_tracked = None;
        self.last_complete = false;
    }
}

#[cfg(test)]
#[path = "readiness_tests.rs"]
mod tests;
