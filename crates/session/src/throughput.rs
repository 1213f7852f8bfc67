//! Exponentially-smoothed upload throughput.

use std::time::Instant;

use tracing::debug;

/// EMA smoothing factor. Recent samples get 20% weight.
const SMOOTHING_ALPHA: f64 = 0.2;

/// Smoothed bytes-per-second estimate fed by progress ticks.
///
/// Each tick carries the cumulative `bytes_uploaded` and a wall-clock
/// instant. The first tick of a session only seeds the baseline; from the
/// second tick on, the instantaneous rate Δbytes/Δt is folded into the
/// estimate. Ticks with zero or negative elapsed time, or with a byte
/// counter that went backwards, are ignored.
#[derive(Debug, Clone)]
pub struct ThroughputEstimator {
    smoothed: f64,
    last: Option<(u64, Instant)>,
}

impl ThroughputEstimator {
    pub fn new() -> Self {
        Self {
            smoothed: 0.0,
            last: None,
        }
    }

    /// Feeds a progress tick observed now.
    pub fn tick(&mut self, bytes_uploaded: u64) {
        self.tick_at(bytes_uploaded, Instant::now());
    }

    /// Feeds a progress tick observed at `at`.
    pub fn tick_at(&mut self, bytes_uploaded: u64, at: Instant) {
        let Some((prev_bytes, prev_at)) = self.last else {
            self.last = Some((bytes_uploaded, at));
            return;
        };

        if at <= prev_at {
            debug!("ignoring progress tick with non-advancing clock");
            return;
        }
        if bytes_uploaded < prev_bytes {
            debug!("ignoring progress tick with regressing byte count");
            return;
        }

        let elapsed = at.duration_since(prev_at).as_secs_f64();
        if elapsed <= 0.0 {
            return;
        }

        let instantaneous = (bytes_uploaded - prev_bytes) as f64 / elapsed;
        self.smoothed = if self.smoothed == 0.0 {
            instantaneous
        } else {
            (1.0 - SMOOTHING_ALPHA) * self.smoothed + SMOOTHING_ALPHA * instantaneous
        };
        self.last = Some((bytes_uploaded, at));
    }

    /// Current estimate in bytes/second. Zero until two valid ticks.
    pub fn bytes_per_sec(&self) -> f64 {
        self.smoothed
    }

    /// Clears the estimate and baseline for a new session.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ThroughputEstimator {
    fn default() -> Self {
        Self::new()
    }
}
