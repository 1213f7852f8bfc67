//! Derived progress metrics and human-facing formatting.

use std::time::Duration;

use serde::Serialize;

/// UI-facing view of an upload in flight.
///
/// Recomputed from controller state on demand; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub bytes_uploaded: u64,
    pub bytes_total: u64,
    /// Percentage in `[0, 100]`.
    pub percentage: f64,
    /// Smoothed throughput estimate, bytes/second.
    pub bytes_per_sec: f64,
    /// Projected time remaining. `None` until a throughput estimate exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta: Option<Duration>,
}

impl ProgressSnapshot {
    /// Builds a snapshot, clamping `bytes_uploaded` to `bytes_total` and
    /// the percentage to `[0, 100]`.
    pub fn new(bytes_uploaded: u64, bytes_total: u64, bytes_per_sec: f64) -> Self {
        let bytes_uploaded = bytes_uploaded.min(bytes_total);
        let percentage = if bytes_total == 0 {
            0.0
        } else {
            (bytes_uploaded as f64 / bytes_total as f64 * 100.0).clamp(0.0, 100.0)
        };

        let remaining = bytes_total - bytes_uploaded;
        let eta = if bytes_per_sec > 0.0 && remaining > 0 {
            Some(Duration::from_secs_f64(remaining as f64 / bytes_per_sec))
        } else {
            None
        };

        Self {
            bytes_uploaded,
            bytes_total,
            percentage,
            bytes_per_sec,
            eta,
        }
    }

    /// An all-zero snapshot for sessions with no transfer in flight.
    pub fn idle() -> Self {
        Self::new(0, 0, 0.0)
    }
}

/// Formats a byte count as `0 Bytes` / `1.5 KB` / `200 MB` / `5 GB`,
/// with up to two decimals and trailing zeros trimmed.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".into();
    }
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let exp = (((63 - bytes.leading_zeros()) / 10) as usize).min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exp as i32);
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{text} {}", UNITS[exp])
}

/// Formats a duration as space-separated `1d 2h 3m 4s` parts, omitting
/// leading zero components. Sub-second durations render as `0s`.
pub fn format_duration(d: Duration) -> String {
    let total = d.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{seconds}s"));
    }
    parts.join(" ")
}
