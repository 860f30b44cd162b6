//! Time sources and duration formatting
//!
//! Provides clock abstraction so sampling can be driven by:
//! - System clock (normal operation)
//! - Fixed, manually advanced clock (tests)

use chrono::{DateTime, Duration, Utc};

/// Source of wall clock time
pub trait TimeSource {
    /// Current time in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// System wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTime;

impl TimeSource for SystemTime {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed time source for testing
#[derive(Debug, Clone)]
pub struct FixedTime {
    timestamp: DateTime<Utc>,
}

impl FixedTime {
    /// Clock stopped at `timestamp`
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self { timestamp }
    }

    /// Move the clock to `timestamp`
    pub fn set(&mut self, timestamp: DateTime<Utc>) {
        self.timestamp = timestamp;
    }

    /// Move the clock forward by `by`
    pub fn advance(&mut self, by: Duration) {
        self.timestamp += by;
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Render a duration compactly, e.g. `14h40m0s`, `1m30s`, `2.5s`, `250ms`
pub fn format_duration(d: Duration) -> String {
    let (sign, d) = if d < Duration::zero() { ("-", -d) } else { ("", d) };

    let Some(nanos) = d.num_nanoseconds() else {
        // Beyond ~292 years; whole seconds are plenty
        return format!("{sign}{}", format_hms(d.num_seconds(), 0));
    };

    let body = match nanos {
        0 => "0s".to_string(),
        n if n < 1_000 => format!("{n}ns"),
        n if n < 1_000_000 => format!("{}µs", with_fraction(n, 1_000)),
        n if n < 1_000_000_000 => format!("{}ms", with_fraction(n, 1_000_000)),
        n => format_hms(n / 1_000_000_000, n % 1_000_000_000),
    };

    format!("{sign}{body}")
}

fn format_hms(total_secs: i64, sub_nanos: i64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = with_fraction((total_secs % 60) * 1_000_000_000 + sub_nanos, 1_000_000_000);

    if hours > 0 {
        format!("{hours}h{minutes}m{secs}s")
    } else if minutes > 0 {
        format!("{minutes}m{secs}s")
    } else {
        format!("{secs}s")
    }
}

/// `value / unit` with trailing zeros of the fraction trimmed
fn with_fraction(value: i64, unit: i64) -> String {
    let whole = value / unit;
    let rem = value % unit;
    if rem == 0 {
        return whole.to_string();
    }

    let width = unit.ilog10() as usize;
    let frac = format!("{rem:0width$}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_time_advances() {
        let start = Utc.with_ymd_and_hms(2018, 3, 25, 0, 0, 0).unwrap();
        let mut time = FixedTime::new(start);
        assert_eq!(time.now(), start);

        time.advance(Duration::seconds(2));
        assert_eq!(time.now(), start + Duration::seconds(2));
    }

    #[test]
    fn durations_render_compactly() {
        assert_eq!(format_duration(Duration::zero()), "0s");
        assert_eq!(format_duration(Duration::minutes(880)), "14h40m0s");
        assert_eq!(format_duration(Duration::seconds(90)), "1m30s");
        assert_eq!(format_duration(Duration::milliseconds(2500)), "2.5s");
        assert_eq!(format_duration(Duration::milliseconds(250)), "250ms");
        assert_eq!(format_duration(Duration::microseconds(1500)), "1.5ms");
        assert_eq!(format_duration(Duration::nanoseconds(42)), "42ns");
        assert_eq!(format_duration(Duration::seconds(-5)), "-5s");
    }
}
