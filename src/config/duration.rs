//! Scrape interval parsing.
//!
//! The interval is written as `<integer><unit>` where the unit is one of
//! `s`, `m` or `h` (case-insensitive). Compound forms such as `1h30m` are
//! not accepted.

use std::fmt;
use std::time::Duration;

use crate::errors::{ConfigError, ConfigResult};

/// Interval used when `global.scrape_interval` is absent.
pub const DEFAULT_SCRAPE_INTERVAL: ScrapeInterval = ScrapeInterval { secs: 60 };

/// Period between two scrape cycles, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScrapeInterval {
    secs: u64,
}

impl ScrapeInterval {
    pub const fn from_secs(secs: u64) -> Self {
        Self { secs }
    }

    pub fn as_secs(&self) -> u64 {
        self.secs
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.secs)
    }

    pub fn is_zero(&self) -> bool {
        self.secs == 0
    }
}

impl Default for ScrapeInterval {
    fn default() -> Self {
        DEFAULT_SCRAPE_INTERVAL
    }
}

impl fmt::Display for ScrapeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.secs)
    }
}

/// Parse a scrape interval such as `30s`, `2m` or `1H`.
pub fn parse_scrape_interval(value: &str) -> ConfigResult<ScrapeInterval> {
    let invalid = |reason: &str| ConfigError::InvalidDuration {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = value.trim();
    let mut chars = trimmed.chars();
    let suffix = chars.next_back().ok_or_else(|| invalid("duration is empty"))?;
    let magnitude = chars.as_str();

    let multiplier: u64 = match suffix.to_ascii_lowercase() {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        _ => return Err(invalid("unit suffix must be one of s, m, h")),
    };

    if magnitude.is_empty() || !magnitude.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("magnitude must be a non-negative integer"));
    }
    let magnitude: u64 = magnitude
        .parse()
        .map_err(|e: std::num::ParseIntError| invalid(&e.to_string()))?;

    magnitude
        .checked_mul(multiplier)
        .map(ScrapeInterval::from_secs)
        .ok_or_else(|| invalid("duration is too large"))
}
