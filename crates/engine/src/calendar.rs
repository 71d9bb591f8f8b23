//! UTC calendar arithmetic on epoch seconds.
//!
//! Unix time has no leap seconds, so every UTC day is exactly
//! [`SECONDS_PER_DAY`] long and day boundaries are multiples of it.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::math::SECONDS_PER_DAY;

/// A proleptic Gregorian calendar date in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UtcDate {
    pub year: i32,
    /// 1 = January
    pub month: u32,
    pub day: u32,
}

impl UtcDate {
    /// Creates a date, checking that it exists and is not before 1970-01-01.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self> {
        if year < 1970 {
            return Err(EngineError::InvalidArgument {
                reason: "date is before the unix epoch",
            });
        }
        if !(1..=12).contains(&month) {
            return Err(EngineError::InvalidArgument {
                reason: "month must be between 1 and 12",
            });
        }
        if day == 0 || day > days_in_month(year, month) {
            return Err(EngineError::InvalidArgument {
                reason: "day does not exist in month",
            });
        }
        Ok(Self { year, month, day })
    }

    /// The date containing `timestamp`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::ArithmeticOverflow`] if the year does not fit in an `i32`
    pub fn from_timestamp(timestamp: u64) -> Result<Self> {
        let days = i64::try_from(timestamp / SECONDS_PER_DAY)
            .map_err(|_| EngineError::overflow("from_timestamp"))?;
        let (year, month, day) = civil_from_days(days);
        let year = i32::try_from(year).map_err(|_| EngineError::overflow("from_timestamp"))?;
        Ok(Self { year, month, day })
    }

    /// Midnight at the start of this date, in epoch seconds.
    pub fn to_timestamp(&self) -> u64 {
        let days = days_from_civil(self.year, self.month, self.day);
        // dates before the epoch clamp to zero
        u64::try_from(days).map_or(0, |days| days * SECONDS_PER_DAY)
    }
}

/// Start of the UTC day containing `timestamp`.
pub fn utc_midnight(timestamp: u64) -> u64 {
    timestamp - timestamp % SECONDS_PER_DAY
}

/// Start of the UTC day after the one containing `timestamp`. A timestamp
/// that is itself a midnight maps to the following midnight.
pub fn next_utc_midnight(timestamp: u64) -> Result<u64> {
    utc_midnight(timestamp)
        .checked_add(SECONDS_PER_DAY)
        .ok_or(EngineError::overflow("next_utc_midnight"))
}

/// Adds whole days to a timestamp.
pub fn add_days(timestamp: u64, days: u64) -> Result<u64> {
    days.checked_mul(SECONDS_PER_DAY)
        .and_then(|seconds| timestamp.checked_add(seconds))
        .ok_or(EngineError::overflow("add_days"))
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

// Howard Hinnant's days_from_civil / civil_from_days
fn days_from_civil(year: i32, month: u32, day: u32) -> i64 {
    let y = i64::from(year) - i64::from(month <= 2);
    let era = (if y >= 0 { y } else { y - 399 }) / 400;
    let yoe = y - era * 400;
    let m = i64::from(month);
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month as u32, day as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_dates() {
        assert_eq!(UtcDate::new(1970, 1, 1).unwrap().to_timestamp(), 0);
        assert_eq!(UtcDate::new(2022, 1, 1).unwrap().to_timestamp(), 1_640_995_200);
        assert_eq!(UtcDate::new(2023, 1, 1).unwrap().to_timestamp(), 1_672_531_200);
        assert_eq!(UtcDate::new(2024, 2, 29).unwrap().to_timestamp(), 1_709_164_800);
    }

    #[test]
    fn test_from_timestamp() {
        assert_eq!(
            UtcDate::from_timestamp(1_640_995_200 + 86_399).unwrap(),
            UtcDate { year: 2022, month: 1, day: 1 }
        );
        assert_eq!(
            UtcDate::from_timestamp(1_709_164_800 + 86_400).unwrap(),
            UtcDate { year: 2024, month: 3, day: 1 }
        );
        assert_eq!(UtcDate::from_timestamp(0).unwrap(), UtcDate { year: 1970, month: 1, day: 1 });
    }

    #[test]
    fn test_roundtrip_across_years() {
        let mut ts = 0u64;
        while ts < 4_102_444_800 {
            let date = UtcDate::from_timestamp(ts).unwrap();
            assert_eq!(date.to_timestamp(), utc_midnight(ts));
            ts += 37 * SECONDS_PER_DAY + 12_345;
        }
    }

    #[test]
    fn test_from_timestamp_out_of_range() {
        // Day counts past i32::MAX years
        assert_eq!(
            UtcDate::from_timestamp(u64::MAX),
            Err(EngineError::ArithmeticOverflow { operation: "from_timestamp" })
        );
        // Largest representable year still converts
        let last_day = UtcDate::new(i32::MAX, 12, 31).unwrap();
        let ts = last_day.to_timestamp();
        assert_eq!(UtcDate::from_timestamp(ts + SECONDS_PER_DAY - 1).unwrap(), last_day);
        assert!(UtcDate::from_timestamp(ts + SECONDS_PER_DAY).is_err());
    }

    #[test]
    fn test_invalid_dates() {
        assert!(UtcDate::new(2023, 2, 29).is_err());
        assert!(UtcDate::new(2100, 2, 29).is_err());
        assert!(UtcDate::new(2000, 2, 29).is_ok());
        assert!(UtcDate::new(2022, 0, 1).is_err());
        assert!(UtcDate::new(2022, 13, 1).is_err());
        assert!(UtcDate::new(2022, 4, 31).is_err());
        assert!(UtcDate::new(2022, 4, 0).is_err());
        assert!(UtcDate::new(1969, 12, 31).is_err());
    }

    #[test]
    fn test_next_utc_midnight() {
        let midnight = 1_640_995_200;
        assert_eq!(next_utc_midnight(midnight).unwrap(), midnight + SECONDS_PER_DAY);
        assert_eq!(next_utc_midnight(midnight + 1).unwrap(), midnight + SECONDS_PER_DAY);
        assert_eq!(
            next_utc_midnight(midnight + SECONDS_PER_DAY - 1).unwrap(),
            midnight + SECONDS_PER_DAY
        );
        assert!(next_utc_midnight(u64::MAX).is_err());
    }

    #[test]
    fn test_add_days() {
        assert_eq!(add_days(1_640_995_200, 365).unwrap(), 1_672_531_200);
        assert!(add_days(u64::MAX, 1).is_err());
    }
}
