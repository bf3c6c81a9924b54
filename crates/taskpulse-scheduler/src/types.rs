use std::time::Duration;

use chrono::{DateTime, Utc};
use taskpulse_channels::Delivery;
use taskpulse_core::config::ReminderConfig;
use taskpulse_core::ReminderThreshold;

/// Engine timing knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderSettings {
    /// Wall-clock cadence between cycles.
    pub interval: Duration,
    /// Upper bound on a single notification send.
    pub send_timeout: Duration,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self::from(&ReminderConfig::default())
    }
}

impl From<&ReminderConfig> for ReminderSettings {
    fn from(config: &ReminderConfig) -> Self {
        Self {
            // A zero interval would make tokio::time::interval panic.
            interval: Duration::from_secs(config.interval_secs.max(1)),
            send_timeout: Duration::from_secs(config.send_timeout_secs.max(1)),
        }
    }
}

/// Per-threshold tally of one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdReport {
    pub threshold: ReminderThreshold,
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

impl ThresholdReport {
    pub fn new(threshold: ReminderThreshold) -> Self {
        Self {
            threshold,
            attempted: 0,
            delivered: 0,
            failed: 0,
        }
    }

    pub fn record(&mut self, outcome: &Delivery) {
        self.attempted += 1;
        if outcome.is_delivered() {
            self.delivered += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// What one scheduler cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// The instant both windows were evaluated against.
    pub now: DateTime<Utc>,
    pub thresholds: Vec<ThresholdReport>,
    /// Flag columns flipped by this cycle's commit.
    pub flags_marked: usize,
}

impl CycleReport {
    pub fn attempted(&self) -> usize {
        self.thresholds.iter().map(|t| t.attempted).sum()
    }

    pub fn for_threshold(&self, threshold: ReminderThreshold) -> Option<&ThresholdReport> {
        self.thresholds.iter().find(|t| t.threshold == threshold)
    }
}
