// Error cooldowns - per-type debounce so feedback is not repeated every frame
//
// Window length depends on the error category; minor findings wait longest.

use std::collections::HashMap;

use crate::config::CooldownConfig;
use crate::profile::{ErrorCategory, ErrorType};

/// Per-error-type debounce keyed on frame timestamps
///
/// An error type emitted within its category's cooldown window is suppressed.
/// Timestamps come from the frame stream, so replays behave identically.
#[derive(Debug, Clone)]
pub struct CooldownTracker {
    config: CooldownConfig,
    last_emitted_ms: HashMap<ErrorType, u64>,
}

impl CooldownTracker {
    pub fn new(config: CooldownConfig) -> Self {
        Self {
            config,
            last_emitted_ms: HashMap::new(),
        }
    }

    pub fn cooldown_ms(&self, error_type: ErrorType) -> u64 {
        match error_type.category() {
            ErrorCategory::Structural => self.config.structural_ms,
            ErrorCategory::Alignment => self.config.alignment_ms,
            ErrorCategory::Balance => self.config.balance_ms,
            ErrorCategory::Minor => self.config.minor_ms,
        }
    }

    pub fn is_cooling_down(&self, error_type: ErrorType, now_ms: u64) -> bool {
        self.last_emitted_ms
            .get(&error_type)
            .map(|last| now_ms.saturating_sub(*last) < self.cooldown_ms(error_type))
            .unwrap_or(false)
    }

    pub fn record(&mut self, error_type: ErrorType, now_ms: u64) {
        self.last_emitted_ms.insert(error_type, now_ms);
    }

    pub fn clear(&mut self) {
        self.last_emitted_ms.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suppresses_within_window() {
        let mut tracker = CooldownTracker::new(CooldownConfig::default());
        assert!(!tracker.is_cooling_down(ErrorType::KneeValgus, 1_000));

        tracker.record(ErrorType::KneeValgus, 1_000);
        assert!(tracker.is_cooling_down(ErrorType::KneeValgus, 1_033));
        assert!(tracker.is_cooling_down(ErrorType::KneeValgus, 4_999));
        assert!(!tracker.is_cooling_down(ErrorType::KneeValgus, 5_000));
    }

    #[test]
    fn test_windows_depend_on_category() {
        let tracker = CooldownTracker::new(CooldownConfig::default());
        assert_eq!(tracker.cooldown_ms(ErrorType::SpinalRounding), 4_000);
        assert_eq!(tracker.cooldown_ms(ErrorType::PoorAlignment), 2_000);
        assert_eq!(tracker.cooldown_ms(ErrorType::HeelRise), 1_500);
        assert_eq!(tracker.cooldown_ms(ErrorType::InsufficientDepth), 5_000);
    }

    #[test]
    fn test_minor_errors_repeat_least_often() {
        let tracker = CooldownTracker::new(CooldownConfig::default());
        let minor = tracker.cooldown_ms(ErrorType::InsufficientDepth);
        for error_type in [
            ErrorType::KneeValgus,
            ErrorType::PoorAlignment,
            ErrorType::FootLifted,
        ] {
            assert!(minor >= tracker.cooldown_ms(error_type));
        }
    }

    #[test]
    fn test_types_are_independent() {
        let mut tracker = CooldownTracker::new(CooldownConfig::default());
        tracker.record(ErrorType::KneeValgus, 0);
        assert!(!tracker.is_cooling_down(ErrorType::PoorAlignment, 10));

        tracker.clear();
        assert!(!tracker.is_cooling_down(ErrorType::KneeValgus, 10));
    }
}
