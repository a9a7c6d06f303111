//! A single monotonic time type used throughout the engine.
//!
//! Internally the simulator only ever needs minute resolution, but the
//! SETTLING_END → LAB "tied timestamp" trick (§4.7/§9) nudges instants by a
//! second to keep dependent transitions ordered under a stable sort, so the
//! underlying representation keeps second precision.

use chrono::{DateTime, Duration, Utc};

/// A point on the simulated timeline.
pub type Instant = DateTime<Utc>;

/// Render an instant using the external contract's timestamp format.
pub fn format_instant(instant: Instant) -> String {
    instant.format("%d/%m/%Y %H:%M").to_string()
}

/// Nudge an instant forward by one second, used to order a dependent
/// transition (e.g. LAB start) strictly after the transition it follows
/// (e.g. SETTLING_END) when both fire at the same logical instant.
pub fn one_second_after(instant: Instant) -> Instant {
    instant + Duration::seconds(1)
}

/// Hours between two instants as a floating point value.
pub fn hours_between(from: Instant, to: Instant) -> f64 {
    (to - from).num_milliseconds() as f64 / 3_600_000.0
}

/// Add a fractional number of hours to an instant.
pub fn add_hours(instant: Instant, hours: f64) -> Instant {
    instant + Duration::milliseconds((hours * 3_600_000.0).round() as i64)
}

/// Add a whole number of days to an instant.
pub fn add_days(instant: Instant, days: i64) -> Instant {
    instant + Duration::days(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dt(y: i32, m: u32, d: u32, h: u32, mi: u32) -> Instant {
        Utc.with_ymd_and_hms(y, m, d, h, mi, 0).unwrap()
    }

    #[test]
    fn formats_per_contract() {
        let t = dt(2026, 1, 5, 14, 30);
        assert_eq!(format_instant(t), "05/01/2026 14:30");
    }

    #[test]
    fn one_second_after_is_strictly_later() {
        let t = dt(2026, 1, 5, 14, 30);
        assert!(one_second_after(t) > t);
        assert_eq!((one_second_after(t) - t).num_seconds(), 1);
    }

    #[test]
    fn hours_between_is_fractional() {
        let a = dt(2026, 1, 5, 0, 0);
        let b = dt(2026, 1, 5, 1, 30);
        assert!((hours_between(a, b) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn add_hours_round_trips() {
        let a = dt(2026, 1, 5, 0, 0);
        let b = add_hours(a, 36.25);
        assert!((hours_between(a, b) - 36.25).abs() < 1e-6);
    }
}
