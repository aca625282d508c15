//! `HH:MM:SS` timestamps
//!
//! Clip boundaries arrive as fixed-format strings. The format only constrains the
//! digit grouping: every group is exactly two ASCII digits and values are not range
//! checked, so `00:00:90` is a valid ninety second offset.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

static TIMESTAMP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{2}):([0-9]{2}):([0-9]{2})$").expect("timestamp pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    #[error("{0:?} does not match format HH:MM:SS")]
    InvalidFormat(String),

    #[error("clip end {end} must be after clip start {start}")]
    EndNotAfterStart { start: String, end: String },
}

/// Parse an `HH:MM:SS` string into a duration.
pub fn parse_timestamp(timestamp: &str) -> Result<Duration, TimestampError> {
    let invalid = || TimestampError::InvalidFormat(timestamp.to_string());

    let captures = TIMESTAMP_PATTERN.captures(timestamp).ok_or_else(invalid)?;

    let mut groups = [0u64; 3];
    for (slot, group) in groups.iter_mut().zip(captures.iter().skip(1)) {
        *slot = group
            .ok_or_else(invalid)?
            .as_str()
            .parse()
            .map_err(|_| invalid())?;
    }
    let [hours, minutes, seconds] = groups;

    Ok(Duration::from_secs(hours * 3600 + minutes * 60 + seconds))
}

/// Format a duration as `HH:MM:SS`, rounded to the nearest second.
///
/// Hours are not capped, so durations of 100 hours or more produce a wider hour group.
pub fn format_hhmmss(duration: Duration) -> String {
    let mut total = duration.as_secs();
    if duration.subsec_nanos() >= 500_000_000 {
        total += 1;
    }

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// A validated clip window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Duration,
    pub end: Duration,
}

impl TimeRange {
    /// Parse both boundaries and require `end` to be strictly after `start`.
    pub fn parse(start: &str, end: &str) -> Result<Self, TimestampError> {
        let start_offset = parse_timestamp(start)?;
        let end_offset = parse_timestamp(end)?;

        if end_offset <= start_offset {
            return Err(TimestampError::EndNotAfterStart {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        Ok(Self {
            start: start_offset,
            end: end_offset,
        })
    }

    /// Length of the clip window.
    pub fn duration(&self) -> Duration {
        self.end.saturating_sub(self.start)
    }
}
