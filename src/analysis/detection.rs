// Error detection engine - rule-based and scientific modes
//
// Rule mode: the leading `max_rules_per_frame` view-filtered profile rules,
// minus those in cooldown, gated on the mean visibility of the rule's
// affected joints exceeding `min_confidence`; only the most severe positive
// match is emitted.
//
// Scientific mode: rule mode plus one finding per detector family of the
// active profile, sharing the same cooldowns and confidence gate.
//
// While the user is still setting up, findings are softened: severity is
// scaled down and the rule's setup wording replaces the exercising message.

use serde::{Deserialize, Serialize};

use super::cooldown::CooldownTracker;
use super::rules::{self, FrameContext};
use super::scientific;
use crate::config::{DetectionMode, ErrorDetectionConfig};
use crate::pose::Joint;
use crate::profile::{ErrorRule, ErrorType};

/// One detected form deviation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostureError {
    pub error_type: ErrorType,
    /// 1 (cosmetic) to 10 (injury risk)
    pub severity: u8,
    /// Mean visibility of the affected joints (0.0-1.0)
    pub confidence: f32,
    pub affected_joints: Vec<Joint>,
    pub description: String,
    pub recommendation: String,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone)]
pub struct ErrorEngine {
    config: ErrorDetectionConfig,
}

impl ErrorEngine {
    pub fn new(config: ErrorDetectionConfig) -> Self {
        Self { config }
    }

    pub fn mode(&self) -> DetectionMode {
        self.config.mode
    }

    pub fn set_mode(&mut self, mode: DetectionMode) {
        self.config.mode = mode;
    }

    /// Detect errors for one frame
    ///
    /// # Arguments
    /// * `ctx` - Frame geometry, view, and phase
    /// * `setup` - User is still getting into position
    /// * `cooldowns` - Session cooldown state; updated for every emitted error
    pub fn detect(
        &self,
        ctx: &FrameContext<'_>,
        setup: bool,
        cooldowns: &mut CooldownTracker,
    ) -> Vec<PostureError> {
        let now = ctx.frame.timestamp_ms;
        let mut errors = Vec::new();

        if let Some((rule, confidence)) = self.best_rule_match(ctx, cooldowns) {
            let description = if setup {
                rule.setup_message.clone()
            } else {
                rule.message.clone()
            };
            errors.push(PostureError {
                error_type: rule.error_type,
                severity: self.effective_severity(rule.severity, setup),
                confidence,
                affected_joints: rule.affected_joints.clone(),
                description,
                recommendation: rule.recommendation.clone(),
                timestamp_ms: now,
            });
            cooldowns.record(rule.error_type, now);
        }

        if self.config.mode == DetectionMode::Scientific {
            for family in &ctx.profile.detectors {
                let Some(finding) = scientific::detect(*family, ctx) else {
                    continue;
                };
                if errors.iter().any(|e| e.error_type == finding.error_type)
                    || cooldowns.is_cooling_down(finding.error_type, now)
                {
                    continue;
                }
                let confidence = ctx.frame.mean_visibility(&finding.affected_joints);
                if confidence <= self.config.min_confidence {
                    continue;
                }
                errors.push(PostureError {
                    error_type: finding.error_type,
                    severity: self.effective_severity(finding.severity, setup),
                    confidence,
                    affected_joints: finding.affected_joints,
                    description: finding.description.to_string(),
                    recommendation: finding.recommendation.to_string(),
                    timestamp_ms: now,
                });
                cooldowns.record(finding.error_type, now);
            }
        }

        for error in &errors {
            tracing::debug!(
                "[ErrorEngine] {:?} severity={} confidence={:.2} at {}ms",
                error.error_type,
                error.severity,
                error.confidence,
                now
            );
        }

        errors
    }

    /// Highest-severity triggered rule among the leading candidates; earlier rules win ties
    fn best_rule_match<'p>(
        &self,
        ctx: &FrameContext<'p>,
        cooldowns: &CooldownTracker,
    ) -> Option<(&'p ErrorRule, f32)> {
        let now = ctx.frame.timestamp_ms;
        let mut best: Option<(&'p ErrorRule, f32)> = None;

        let candidates = ctx
            .profile
            .rules_for_view(ctx.view)
            .take(self.config.max_rules_per_frame)
            .filter(|rule| !cooldowns.is_cooling_down(rule.error_type, now));

        for rule in candidates {
            if !rules::is_triggered(rule, ctx) {
                continue;
            }
            let confidence = ctx.frame.mean_visibility(&rule.affected_joints);
            if confidence <= self.config.min_confidence {
                continue;
            }
            match best {
                Some((current, _)) if current.severity >= rule.severity => {}
                _ => best = Some((rule, confidence)),
            }
        }

        best
    }

    fn effective_severity(&self, severity: u8, setup: bool) -> u8 {
        if !setup {
            return severity;
        }
        let scaled = (severity as f32 * self.config.setup_severity_scale).round();
        (scaled as u8).clamp(1, severity.max(1))
    }
}

#[cfg(test)]
#[path = "detection_tests.rs"]
mod tests;
