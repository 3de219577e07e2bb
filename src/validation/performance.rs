//! Throughput and latency metrics from caller-supplied frame timings.

use serde::{Deserialize, Serialize};

use crate::config::ValidationConfig;

/// A gap longer than this multiple of the expected interval counts as dropped frames
const DROP_GAP_FACTOR: f32 = 1.5;

/// Wall-clock timing for one frame, measured by the caller
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameTiming {
    /// When the frame reached the analysis core
    pub received_at_ms: u64,
    /// Capture-to-result latency
    pub latency_ms: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryImpact {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub fps: f32,
    pub avg_latency_ms: f32,
    pub max_latency_ms: f32,
    pub frame_drops: u32,
    /// Rough size of the validator's retained window
    pub memory_estimate_kb: f32,
    /// Share of the frame budget spent in analysis
    pub cpu_estimate_percent: f32,
    pub battery_impact: BatteryImpact,
}

pub(crate) fn compute(
    timings: &[FrameTiming],
    config: &ValidationConfig,
    retained_bytes: usize,
) -> PerformanceMetrics {
    let fps = match (timings.first(), timings.last()) {
        (Some(first), Some(last)) if last.received_at_ms > first.received_at_ms => {
            let span_s = (last.received_at_ms - first.received_at_ms) as f32 / 1000.0;
            (timings.len() - 1) as f32 / span_s
        }
        _ => 0.0,
    };

    let latencies: Vec<f32> = timings
        .iter()
        .map(|t| t.latency_ms)
        .filter(|l| l.is_finite() && *l >= 0.0)
        .collect();
    let avg_latency_ms = if latencies.is_empty() {
        0.0
    } else {
        latencies.iter().sum::<f32>() / latencies.len() as f32
    };
    let max_latency_ms = latencies.iter().copied().fold(0.0_f32, f32::max);

    let expected_interval_ms = if config.expected_fps > 0.0 {
        1000.0 / config.expected_fps
    } else {
        0.0
    };
    let frame_drops = if expected_interval_ms > 0.0 {
        timings
            .windows(2)
            .filter(|pair| {
                let gap = pair[1].received_at_ms.saturating_sub(pair[0].received_at_ms) as f32;
                gap > expected_interval_ms * DROP_GAP_FACTOR
            })
            .count() as u32
    } else {
        0
    };

    let cpu_estimate_percent = if expected_interval_ms > 0.0 {
        (avg_latency_ms / expected_interval_ms * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };
    let battery_impact = if cpu_estimate_percent < 30.0 {
        BatteryImpact::Low
    } else if cpu_estimate_percent < 60.0 {
        BatteryImpact::Medium
    } else {
        BatteryImpact::High
    };

    PerformanceMetrics {
        fps,
        avg_latency_ms,
        max_latency_ms,
        frame_drops,
        memory_estimate_kb: retained_bytes as f32 / 1024.0,
        cpu_estimate_percent,
        battery_impact,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timings(interval_ms: u64, latency_ms: f32, count: u64) -> Vec<FrameTiming> {
        (0..count)
            .map(|i| FrameTiming {
                received_at_ms: i * interval_ms,
                latency_ms,
            })
            .collect()
    }

    #[test]
    fn test_fps_and_latency() {
        let m = compute(&timings(33, 12.0, 31), &ValidationConfig::default(), 0);
        assert!((m.fps - 30.3).abs() < 0.1);
        assert_eq!(m.avg_latency_ms, 12.0);
        assert_eq!(m.max_latency_ms, 12.0);
        assert_eq!(m.frame_drops, 0);
        assert_eq!(m.battery_impact, BatteryImpact::Medium);
    }

    #[test]
    fn test_gaps_count_as_drops() {
        let mut t = timings(33, 5.0, 10);
        t.push(FrameTiming {
            received_at_ms: 297 + 120,
            latency_ms: 5.0,
        });
        let m = compute(&t, &ValidationConfig::default(), 0);
        assert_eq!(m.frame_drops, 1);
        assert_eq!(m.battery_impact, BatteryImpact::Low);
    }

    #[test]
    fn test_single_frame_has_no_rate() {
        let m = compute(&timings(33, 5.0, 1), &ValidationConfig::default(), 2048);
        assert_eq!(m.fps, 0.0);
        assert_eq!(m.memory_estimate_kb, 2.0);
    }
}
