//! Signed UTC offsets.

use chrono::Duration;

const SECONDS_PER_MINUTE: i32 = 60;
const SECONDS_PER_HOUR: i32 = 3_600;

/// A signed offset from UTC with second resolution.
///
/// Fractional hours are expressed through minutes, e.g. `from_minutes(-210)`
/// for -3.5h.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TimezoneOffset {
    seconds: i32,
}

impl TimezoneOffset {
    /// UTC itself.
    pub const ZERO: Self = Self { seconds: 0 };

    /// Offset of a whole number of hours.
    pub const fn from_hours(hours: i32) -> Self {
        Self {
            seconds: hours * SECONDS_PER_HOUR,
        }
    }

    /// Offset of a whole number of minutes.
    pub const fn from_minutes(minutes: i32) -> Self {
        Self {
            seconds: minutes * SECONDS_PER_MINUTE,
        }
    }

    pub const fn as_seconds(&self) -> i32 {
        self.seconds
    }

    /// The offset as a duration to add to a UTC instant.
    pub fn as_duration(&self) -> Duration {
        Duration::seconds(i64::from(self.seconds))
    }
}

impl std::fmt::Display for TimezoneOffset {
    /// Formats as `+HH:MM` / `-HH:MM`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.seconds < 0 { '-' } else { '+' };
        let total_minutes = self.seconds.unsigned_abs() / SECONDS_PER_MINUTE as u32;
        write!(f, "{}{:02}:{:02}", sign, total_minutes / 60, total_minutes % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractional_hours_are_exact() {
        let nst = TimezoneOffset::from_minutes(-210);
        assert_eq!(nst.as_seconds(), -12_600);
        assert_eq!(nst.as_duration(), Duration::minutes(-210));
    }

    #[test]
    fn display_uses_signed_hours_and_minutes() {
        assert_eq!(TimezoneOffset::from_minutes(45).to_string(), "+00:45");
        assert_eq!(TimezoneOffset::from_minutes(-210).to_string(), "-03:30");
        assert_eq!(TimezoneOffset::from_hours(10).to_string(), "+10:00");
        assert_eq!(TimezoneOffset::ZERO.to_string(), "+00:00");
    }

    #[test]
    fn duration_matches_seconds() {
        let jst = TimezoneOffset::from_hours(9);
        assert_eq!(jst.as_duration(), Duration::hours(9));
    }
}
