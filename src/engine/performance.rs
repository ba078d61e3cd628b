use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Newest-first ring of per-attempt records kept on each entry.
pub const RECENT_ATTEMPTS_CAP: usize = 5;
/// Durations above this are treated as the player having walked away and
/// contribute no timing data.
pub const MAX_SAMPLE_SECS: f64 = 30.0;
/// Ceiling for the speed component of the memory score: answers at or above
/// this duration score zero on speed.
pub const MEMORY_TIME_CEILING_SECS: f64 = 10.0;

const ACCURACY_WEIGHT: f64 = 0.6;
const SPEED_WEIGHT: f64 = 0.4;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub timestamp: DateTime<Utc>,
    pub accuracy: f64,
    pub duration_secs: Option<f64>,
    pub misses: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PerformanceEntry {
    #[serde(default)]
    pub misses: u32,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub total_time_secs: f64,
    #[serde(default)]
    pub valid_time_samples: u32,
    #[serde(default)]
    pub recent_attempts: Vec<AttemptRecord>,
    #[serde(default)]
    pub last_attempted_at: Option<DateTime<Utc>>,
    #[serde(default = "default_unit")]
    pub accuracy: f64,
    #[serde(default)]
    pub average_time_secs: Option<f64>,
    #[serde(default = "default_unit")]
    pub memory_score: f64,
}

fn default_unit() -> f64 {
    1.0
}

impl Default for PerformanceEntry {
    fn default() -> Self {
        Self {
            misses: 0,
            attempts: 0,
            total_time_secs: 0.0,
            valid_time_samples: 0,
            recent_attempts: Vec::new(),
            last_attempted_at: None,
            accuracy: 1.0,
            average_time_secs: None,
            memory_score: 1.0,
        }
    }
}

impl PerformanceEntry {
    /// Upgrade shape for legacy records that stored a bare miss count.
    pub fn from_legacy_misses(misses: u32) -> Self {
        let mut entry = Self {
            misses,
            ..Self::default()
        };
        entry.recalc();
        entry
    }

    pub fn recalc(&mut self) {
        let interactions = self.attempts + self.misses;
        self.accuracy = if interactions == 0 {
            1.0
        } else {
            self.attempts as f64 / interactions as f64
        };
        self.average_time_secs = (self.valid_time_samples > 0)
            .then(|| self.total_time_secs / self.valid_time_samples as f64);
        self.memory_score = self.compute_memory_score();
    }

    fn compute_memory_score(&self) -> f64 {
        if self.recent_attempts.is_empty() {
            return 1.0;
        }
        let avg_accuracy = self
            .recent_attempts
            .iter()
            .map(|a| a.accuracy)
            .sum::<f64>()
            / self.recent_attempts.len() as f64;

        let timed: Vec<f64> = self
            .recent_attempts
            .iter()
            .filter_map(|a| a.duration_secs)
            .collect();
        // No timed samples is no evidence of slowness.
        let speed = if timed.is_empty() {
            1.0
        } else {
            let avg_duration = timed.iter().sum::<f64>() / timed.len() as f64;
            1.0 - avg_duration.min(MEMORY_TIME_CEILING_SECS) / MEMORY_TIME_CEILING_SECS
        };

        round2(ACCURACY_WEIGHT * avg_accuracy + SPEED_WEIGHT * speed).clamp(0.0, 1.0)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PerformanceTracker {
    pub entries: HashMap<String, PerformanceEntry>,
}

impl PerformanceTracker {
    pub fn entry(&self, tile_id: &str) -> Option<&PerformanceEntry> {
        self.entries.get(tile_id)
    }

    /// Failed submission against a tile: bump misses and re-derive accuracy.
    pub fn record_miss(&mut self, tile_id: &str) {
        let entry = self.entries.entry(tile_id.to_string()).or_default();
        entry.misses += 1;
        entry.last_attempted_at = Some(Utc::now());
        entry.recalc();
    }

    /// Successful completion of a tile. `misses_before_success` is the local
    /// miss count for this activation; the attempt's own accuracy is
    /// 1/(misses+1). Durations outside (0, MAX_SAMPLE_SECS] still count as
    /// attempts but contribute no timing.
    pub fn record_attempt(
        &mut self,
        tile_id: &str,
        duration_secs: Option<f64>,
        misses_before_success: u32,
    ) {
        let entry = self.entries.entry(tile_id.to_string()).or_default();
        entry.attempts += 1;

        let local_accuracy = 1.0 / (misses_before_success as f64 + 1.0);
        let valid_duration =
            duration_secs.filter(|d| d.is_finite() && *d > 0.0 && *d <= MAX_SAMPLE_SECS);

        entry.recent_attempts.insert(
            0,
            AttemptRecord {
                timestamp: Utc::now(),
                accuracy: local_accuracy,
                duration_secs: valid_duration,
                misses: misses_before_success,
            },
        );
        entry.recent_attempts.truncate(RECENT_ATTEMPTS_CAP);

        if let Some(duration) = valid_duration {
            entry.total_time_secs += duration;
            entry.valid_time_samples += 1;
        }

        entry.last_attempted_at = Some(Utc::now());
        entry.recalc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_entry_defaults_to_perfect() {
        let entry = PerformanceEntry::default();
        assert_eq!(entry.accuracy, 1.0);
        assert_eq!(entry.memory_score, 1.0);
        assert_eq!(entry.average_time_secs, None);
    }

    #[test]
    fn test_miss_before_any_success_drops_accuracy_to_zero() {
        let mut tracker = PerformanceTracker::default();
        tracker.record_miss("3");
        let entry = tracker.entry("3").unwrap();
        assert_eq!(entry.misses, 1);
        assert_eq!(entry.accuracy, 0.0);
        assert!(entry.last_attempted_at.is_some());
    }

    #[test]
    fn test_clean_attempt_keeps_perfect_accuracy() {
        let mut tracker = PerformanceTracker::default();
        tracker.record_attempt("3", Some(1.5), 0);
        let entry = tracker.entry("3").unwrap();
        assert_eq!(entry.attempts, 1);
        assert_eq!(entry.misses, 0);
        assert_eq!(entry.accuracy, 1.0);
        assert_eq!(entry.average_time_secs, Some(1.5));
    }

    #[test]
    fn test_accuracy_is_attempts_over_interactions() {
        let mut tracker = PerformanceTracker::default();
        tracker.record_miss("7");
        tracker.record_miss("7");
        tracker.record_attempt("7", Some(2.0), 2);
        let entry = tracker.entry("7").unwrap();
        assert!((entry.accuracy - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_recent_ring_is_newest_first_and_capped() {
        let mut tracker = PerformanceTracker::default();
        for misses in 0..8u32 {
            tracker.record_attempt("1", Some(1.0), misses);
        }
        let entry = tracker.entry("1").unwrap();
        assert_eq!(entry.recent_attempts.len(), RECENT_ATTEMPTS_CAP);
        assert_eq!(entry.recent_attempts[0].misses, 7);
        assert_eq!(entry.recent_attempts[4].misses, 3);
    }

    #[test]
    fn test_out_of_clamp_duration_counts_without_timing() {
        let mut tracker = PerformanceTracker::default();
        tracker.record_attempt("1", Some(MAX_SAMPLE_SECS + 1.0), 0);
        tracker.record_attempt("1", Some(-2.0), 0);
        tracker.record_attempt("1", Some(f64::NAN), 0);
        tracker.record_attempt("1", None, 0);
        let entry = tracker.entry("1").unwrap();
        assert_eq!(entry.attempts, 4);
        assert_eq!(entry.valid_time_samples, 0);
        assert_eq!(entry.average_time_secs, None);
        assert!(entry.recent_attempts.iter().all(|a| a.duration_secs.is_none()));
    }

    #[test]
    fn test_average_time_only_over_valid_samples() {
        let mut tracker = PerformanceTracker::default();
        tracker.record_attempt("1", Some(2.0), 0);
        tracker.record_attempt("1", Some(4.0), 0);
        tracker.record_attempt("1", Some(100.0), 0);
        let entry = tracker.entry("1").unwrap();
        assert_eq!(entry.valid_time_samples, 2);
        assert_eq!(entry.average_time_secs, Some(3.0));
    }

    #[test]
    fn test_memory_score_in_unit_interval() {
        let mut tracker = PerformanceTracker::default();
        for _ in 0..20 {
            tracker.record_attempt("1", Some(MEMORY_TIME_CEILING_SECS * 2.0), 9);
            tracker.record_miss("1");
        }
        let entry = tracker.entry("1").unwrap();
        assert!(entry.memory_score >= 0.0 && entry.memory_score <= 1.0);
    }

    #[test]
    fn test_memory_score_fast_and_clean_is_high() {
        let mut tracker = PerformanceTracker::default();
        for _ in 0..5 {
            tracker.record_attempt("1", Some(0.5), 0);
        }
        let entry = tracker.entry("1").unwrap();
        // accuracy term 0.6, speed term 0.4 * (1 - 0.05) = 0.38
        assert!((entry.memory_score - 0.98).abs() < 1e-9);
    }

    #[test]
    fn test_memory_score_rounds_to_two_places() {
        let mut tracker = PerformanceTracker::default();
        tracker.record_attempt("1", Some(3.0), 2);
        let entry = tracker.entry("1").unwrap();
        // 0.6 * (1/3) + 0.4 * 0.7 = 0.48
        assert!((entry.memory_score - 0.48).abs() < 1e-9);
    }

    #[test]
    fn test_legacy_upgrade_maps_number_to_misses() {
        let entry = PerformanceEntry::from_legacy_misses(4);
        assert_eq!(entry.misses, 4);
        assert_eq!(entry.attempts, 0);
        assert_eq!(entry.accuracy, 0.0);
        assert_eq!(entry.memory_score, 1.0);

        let clean = PerformanceEntry::from_legacy_misses(0);
        assert_eq!(clean.accuracy, 1.0);
    }
}
