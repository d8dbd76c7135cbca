//! Calendar days and UTC timestamps (no chrono dependency).
//!
//! A [`Day`] is a count of days since 1970-01-01 on the proleptic Gregorian
//! calendar. Conversion uses Howard Hinnant's `civil_from_days` /
//! `days_from_civil` algorithms.

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

const SECS_PER_DAY: i64 = 86_400;

/// A calendar date with no time-of-day component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Day(i64);

impl Day {
    pub const EPOCH: Day = Day(0);

    pub fn from_epoch_days(days: i64) -> Self {
        Self(days)
    }

    pub fn epoch_days(self) -> i64 {
        self.0
    }

    /// Build a day from year/month/day, rejecting dates that do not exist.
    pub fn from_ymd(year: i64, month: u32, day: u32) -> Option<Self> {
        if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
            return None;
        }
        Some(Self(days_from_civil(year, month, day)))
    }

    pub fn ymd(self) -> (i64, u32, u32) {
        civil_from_days(self.0)
    }

    /// The day `n` days after this one (negative `n` goes back).
    pub fn offset(self, n: i64) -> Self {
        Self(self.0 + n)
    }

    /// Signed number of days from `self` to `later`.
    pub fn days_until(self, later: Day) -> i64 {
        later.0 - self.0
    }

    /// Normalize a Unix timestamp to the local calendar day, where local
    /// time is UTC shifted by `utc_offset_minutes`.
    pub fn from_unix_secs(secs: i64, utc_offset_minutes: i32) -> Self {
        let local = secs + i64::from(utc_offset_minutes) * 60;
        Self(local.div_euclid(SECS_PER_DAY))
    }

    /// Today according to the system clock. Only the calling layer should
    /// read the clock; the selection engine always receives its day.
    pub fn today(utc_offset_minutes: i32) -> Self {
        Self::from_unix_secs(now_unix_secs() as i64, utc_offset_minutes)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (y, m, d) = self.ymd();
        write!(f, "{y:04}-{m:02}-{d:02}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayParseError(String);

impl fmt::Display for DayParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid date '{}': expected YYYY-MM-DD", self.0)
    }
}

impl std::error::Error for DayParseError {}

impl FromStr for Day {
    type Err = DayParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || DayParseError(s.to_string());
        let bytes = s.as_bytes();
        if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
            return Err(err());
        }
        let digits = |range: std::ops::Range<usize>| -> Option<u32> {
            let part = &s[range];
            if part.bytes().all(|b| b.is_ascii_digit()) {
                part.parse().ok()
            } else {
                None
            }
        };
        let year = digits(0..4).ok_or_else(err)?;
        let month = digits(5..7).ok_or_else(err)?;
        let day = digits(8..10).ok_or_else(err)?;
        Day::from_ymd(i64::from(year), month, day).ok_or_else(err)
    }
}

impl TryFrom<String> for Day {
    type Error = DayParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Day> for String {
    fn from(day: Day) -> Self {
        day.to_string()
    }
}

/// Current UTC time as Unix seconds.
pub fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Current UTC timestamp in ISO-8601 format.
pub fn now_iso8601() -> String {
    unix_to_iso8601(now_unix_secs())
}

/// Convert Unix seconds to ISO-8601 UTC string.
pub fn unix_to_iso8601(secs: u64) -> String {
    let days = (secs / 86400) as i64;
    let time_of_day = secs % 86400;
    let hours = time_of_day / 3600;
    let minutes = (time_of_day % 3600) / 60;
    let seconds = time_of_day % 60;

    let (y, m, d) = civil_from_days(days);
    format!("{y:04}-{m:02}-{d:02}T{hours:02}:{minutes:02}:{seconds:02}Z")
}

fn is_leap(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i64, month: u32) -> u32 {
    match month {
        2 if is_leap(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Howard Hinnant's civil_from_days: Unix epoch days → (year, month, day).
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d)
}

/// Inverse of `civil_from_days`: (year, month, day) → Unix epoch days.
fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = (y - era * 400) as u64;
    let m = u64::from(month);
    let mp = if m > 2 { m - 3 } else { m + 9 };
    let doy = (153 * mp + 2) / 5 + u64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146097 + doe as i64 - 719468
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_epoch() {
        assert_eq!(unix_to_iso8601(0), "1970-01-01T00:00:00Z");
        assert_eq!(Day::EPOCH.to_string(), "1970-01-01");
    }

    #[test]
    fn test_known_date() {
        // 2026-02-21T00:00:00Z = 1771632000
        assert_eq!(unix_to_iso8601(1771632000), "2026-02-21T00:00:00Z");
        let day = Day::from_unix_secs(1771632000, 0);
        assert_eq!(day.to_string(), "2026-02-21");
        assert_eq!(day.epoch_days(), 1771632000 / 86400);
    }

    #[test]
    fn test_civil_roundtrip_across_eras() {
        for days in [-800_000, -719_468, -1, 0, 59, 60, 11_016, 20_505, 2_932_896] {
            let (y, m, d) = civil_from_days(days);
            assert_eq!(days_from_civil(y, m, d), days, "days={days}");
        }
    }

    #[test]
    fn test_parse_and_display() {
        let day: Day = "2024-02-29".parse().unwrap();
        assert_eq!(day.ymd(), (2024, 2, 29));
        assert_eq!(day.to_string(), "2024-02-29");
        assert_eq!(day.offset(1).to_string(), "2024-03-01");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["2023-02-29", "2024-13-01", "2024-00-10", "2024-1-01", "24-01-01", "", "2024/01/01", "2024-01-+1"] {
            assert!(bad.parse::<Day>().is_err(), "should reject {bad:?}");
        }
    }

    #[test]
    fn test_local_offset_shifts_boundary() {
        // 2026-02-21T23:30:00Z
        let secs = 1771632000 + 23 * 3600 + 30 * 60;
        assert_eq!(Day::from_unix_secs(secs, 0).to_string(), "2026-02-21");
        assert_eq!(Day::from_unix_secs(secs, 60).to_string(), "2026-02-22");
        assert_eq!(Day::from_unix_secs(1771632000, -60).to_string(), "2026-02-20");
    }

    #[test]
    fn test_days_until() {
        let a: Day = "2026-01-30".parse().unwrap();
        let b: Day = "2026-02-02".parse().unwrap();
        assert_eq!(a.days_until(b), 3);
        assert_eq!(b.days_until(a), -3);
    }

    #[test]
    fn test_serde_as_string() {
        let day: Day = "2026-10-16".parse().unwrap();
        let json = serde_json::to_string(&day).unwrap();
        assert_eq!(json, "\"2026-10-16\"");
        let back: Day = serde_json::from_str(&json).unwrap();
        assert_eq!(back, day);
        assert!(serde_json::from_str::<Day>("\"2026-02-30\"").is_err());
    }

    #[test]
    fn test_now_is_recent() {
        let ts = now_iso8601();
        assert!(ts.starts_with("20"), "timestamp should be in 2000s: {ts}");
    }
}
