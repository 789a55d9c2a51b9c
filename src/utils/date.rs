//! UTC calendar dates without timezone dependencies.
//!
//! Backs the `year` and `date` evaluators. Only the proleptic Gregorian
//! calendar in UTC is supported.

use std::time::{SystemTime, UNIX_EPOCH};

/// UTC date and time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeUtc {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTimeUtc {
    /// Current wall-clock time. Clocks set before 1970 read as the epoch.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self::from_unix(secs)
    }

    /// Convert seconds since the Unix epoch.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn from_unix(secs: u64) -> Self {
        let days = (secs / 86_400) as i64;
        let rem = secs % 86_400;
        let (year, month, day) = civil_from_days(days);

        Self {
            year,
            month,
            day,
            hour: (rem / 3600) as u8,
            minute: ((rem / 60) % 60) as u8,
            second: (rem % 60) as u8,
        }
    }

    /// `YYYY-MM-DD`
    pub fn to_ymd(self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    /// `YYYY-MM-DDTHH:MM:SSZ`
    pub fn to_rfc3339(self) -> String {
        format!(
            "{}T{:02}:{:02}:{:02}Z",
            self.to_ymd(),
            self.hour,
            self.minute,
            self.second
        )
    }
}

/// Days since 1970-01-01 to (year, month, day).
///
/// Eras of 400 years (146 097 days) repeat exactly; March-based years put
/// the leap day last.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
const fn civil_from_days(days: i64) -> (i32, u8, u8) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    (year as i32, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch() {
        let dt = DateTimeUtc::from_unix(0);
        assert_eq!(dt.to_rfc3339(), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn test_known_dates() {
        // 2024-06-15T14:30:45Z
        let dt = DateTimeUtc::from_unix(1_718_461_845);
        assert_eq!(dt.to_ymd(), "2024-06-15");
        assert_eq!((dt.hour, dt.minute, dt.second), (14, 30, 45));

        // 2000-03-01, the day after a 400-year leap day
        assert_eq!(DateTimeUtc::from_unix(951_868_800).to_ymd(), "2000-03-01");
        assert_eq!(DateTimeUtc::from_unix(951_782_400).to_ymd(), "2000-02-29");
    }

    #[test]
    fn test_year_boundary() {
        // 2023-12-31T23:59:59Z and one second later
        assert_eq!(DateTimeUtc::from_unix(1_704_067_199).to_ymd(), "2023-12-31");
        assert_eq!(DateTimeUtc::from_unix(1_704_067_200).to_ymd(), "2024-01-01");
    }
}
