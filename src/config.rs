//! Configuration management for dynamic parameter tuning
//!
//! This module provides runtime configuration loading from JSON files,
//! enabling threshold tuning without recompilation. Readiness hysteresis,
//! smoothing windows, error cooldowns, quality bonuses, and validator
//! targets are all exposed here rather than hard-coded in the analyzers.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::SessionError;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub readiness: ReadinessConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub phase: PhaseConfig,
    #[serde(default)]
    pub errors: ErrorDetectionConfig,
    #[serde(default)]
    pub quality: QualityConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Readiness state machine parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Consecutive good frames needed to leave GETTING_READY
    pub confirmation_frames: u32,
    /// Consecutive bad frames tolerated before falling back to NOT_READY
    pub bad_frame_tolerance: u32,
    /// Out-of-range frames tolerated while EXERCISING before the session ends
    pub exercising_exit_tolerance: u32,
    /// Fraction of the completeness joint set that must be visible
    pub visibility_ratio: f32,
    /// Relaxed completeness fraction applied while EXERCISING
    pub exercising_visibility_ratio: f32,
    /// Per-landmark visibility at which a joint counts as present
    pub landmark_visibility: f32,
    /// Frame-to-frame change of the tracked angle that starts EXERCISING (degrees)
    pub movement_threshold_deg: f32,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            confirmation_frames: 8,
            bad_frame_tolerance: 20,
            exercising_exit_tolerance: 90,
            visibility_ratio: 0.8,
            exercising_visibility_ratio: 0.6,
            landmark_visibility: 0.5,
            movement_threshold_deg: 4.0,
        }
    }
}

/// View classifier parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Horizontal spread (fraction of frame width) below which the body is in profile
    pub profile_spread_fraction: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            profile_spread_fraction: 0.12,
        }
    }
}

/// Phase detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseConfig {
    /// Majority-vote window length (frames)
    pub smoothing_window: usize,
    /// Visibility advantage a side needs before its angle replaces the bilateral average
    pub visibility_preference_margin: f32,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 5,
            visibility_preference_margin: 0.1,
        }
    }
}

/// Which detector set the error engine runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMode {
    /// Profile rules only, at most one error per frame
    #[default]
    RuleBased,
    /// Profile rules plus closed-form biomechanical detectors
    Scientific,
}

/// Cooldown windows per error category (milliseconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownConfig {
    pub structural_ms: u64,
    pub alignment_ms: u64,
    pub balance_ms: u64,
    pub minor_ms: u64,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            structural_ms: 4000,
            alignment_ms: 2000,
            balance_ms: 1500,
            minor_ms: 5000,
        }
    }
}

/// Error detection engine parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorDetectionConfig {
    pub mode: DetectionMode,
    /// Leading rules (after view filtering) evaluated per frame
    pub max_rules_per_frame: usize,
    /// Mean visibility of the affected joints must exceed this for an error to be emitted
    pub min_confidence: f32,
    pub cooldowns: CooldownConfig,
    /// Severity multiplier applied while the user is still setting up
    pub setup_severity_scale: f32,
}

impl Default for ErrorDetectionConfig {
    fn default() -> Self {
        Self {
            mode: DetectionMode::RuleBased,
            max_rules_per_frame: 2,
            min_confidence: 0.7,
            cooldowns: CooldownConfig::default(),
            setup_severity_scale: 0.5,
        }
    }
}

/// Quality scorer parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Rolling score history capacity
    pub history_capacity: usize,
    /// Slice length compared when computing the trend
    pub trend_slice: usize,
    pub ideal_bonus_max: f32,
    pub stability_bonus_max: f32,
    pub rom_bonus: f32,
    /// Pose frames considered by the stability bonus
    pub stability_window: usize,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            history_capacity: 50,
            trend_slice: 10,
            ideal_bonus_max: 10.0,
            stability_bonus_max: 5.0,
            rom_bonus: 5.0,
            stability_window: 5,
        }
    }
}

/// Precision/performance validator parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub enabled: bool,
    /// Rolling window length (frames)
    pub window: usize,
    /// Recompute metrics every N recorded frames
    pub refresh_every: usize,
    /// Angular deviation that maps to the 90-point accuracy target
    pub target_max_deviation_deg: f32,
    pub expected_fps: f32,
    /// Correlation reported when no reference data is loaded
    pub neutral_correlation: f32,
    /// Inter-frame landmark displacement treated as estimator noise
    pub implausible_jump: f32,
    pub target_angular_accuracy: f32,
    pub target_correlation: f32,
    pub target_latency_ms: f32,
    pub target_fps: f32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window: 30,
            refresh_every: 10,
            target_max_deviation_deg: 5.0,
            expected_fps: 30.0,
            neutral_correlation: 85.0,
            implausible_jump: 0.1,
            target_angular_accuracy: 90.0,
            target_correlation: 90.0,
            target_latency_ms: 100.0,
            target_fps: 25.0,
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// Loaded configuration, or the defaults if the file is missing or invalid
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the conventional asset location
    pub fn load() -> Self {
        Self::load_from_file("assets/form_coach.json")
    }

    /// Reject values that would make an analyzer stage degenerate
    pub fn validate(&self) -> Result<(), SessionError> {
        fn invalid(reason: &str) -> Result<(), SessionError> {
            Err(SessionError::InvalidConfig {
                reason: reason.to_string(),
            })
        }

        let ratio_ok = |v: f32| (0.0..=1.0).contains(&v);

        if self.readiness.confirmation_frames == 0 {
            return invalid("readiness.confirmation_frames must be > 0");
        }
        if !ratio_ok(self.readiness.visibility_ratio)
            || !ratio_ok(self.readiness.exercising_visibility_ratio)
            || !ratio_ok(self.readiness.landmark_visibility)
        {
            return invalid("readiness visibility ratios must be within [0, 1]");
        }
        if self.phase.smoothing_window == 0 {
            return invalid("phase.smoothing_window must be > 0");
        }
        if !ratio_ok(self.errors.min_confidence) {
            return invalid("errors.min_confidence must be within [0, 1]");
        }
        if self.errors.max_rules_per_frame == 0 {
            return invalid("errors.max_rules_per_frame must be > 0");
        }
        if self.quality.history_capacity == 0 || self.quality.stability_window == 0 {
            return invalid("quality windows must be > 0");
        }
        if self.validation.window < 2 || self.validation.refresh_every == 0 {
            return invalid("validation.window must be >= 2 and refresh_every > 0");
        }
        if self.validation.target_max_deviation_deg <= 0.0 || self.validation.expected_fps <= 0.0 {
            return invalid("validation targets must be positive");
        }
        Ok(())
    }
}
