//! Time handling for FLO-2D model outputs.
//!
//! Model outputs carry times as fractional hours since the model start. These
//! helpers turn them into calendar timestamps relative to a base time and
//! handle the UTC offset applied before forecast storage.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{Flo2dError, Flo2dResult};

/// Timestamp format used in CSV output and forecast storage.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp format embedded in output file names.
pub const FILE_STAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Convert a model time offset (hours) into a calendar timestamp.
///
/// Resolution is one microsecond. Returns `None` when `hours` is not finite
/// or the timestamp falls outside the representable date range.
pub fn model_time_to_datetime(base: NaiveDateTime, hours: f64) -> Option<NaiveDateTime> {
    let micros = (hours * 3_600_000_000.0).round();
    if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
        return None;
    }
    base.checked_add_signed(Duration::microseconds(micros as i64))
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Flo2dResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| Flo2dError::InvalidTime(format!("date '{}', expected YYYY-MM-DD", s)))
}

/// Parse a `HH:MM:SS` time of day.
pub fn parse_time(s: &str) -> Flo2dResult<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M:%S")
        .map_err(|_| Flo2dError::InvalidTime(format!("time '{}', expected HH:MM:SS", s)))
}

/// Fixed offset applied to naive model timestamps before storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtcOffset(Duration);

impl UtcOffset {
    pub fn zero() -> Self {
        Self(Duration::zero())
    }

    pub fn from_duration(duration: Duration) -> Self {
        Self(duration)
    }

    /// Parse `+05:30`, `-10:00` or `+00:00:00`. The sign is optional.
    pub fn parse(s: &str) -> Flo2dResult<Self> {
        let trimmed = s.trim();
        let invalid = || Flo2dError::InvalidUtcOffset(s.to_string());

        let (sign, body) = match trimmed.as_bytes().first() {
            Some(b'-') => (-1, &trimmed[1..]),
            Some(b'+') => (1, &trimmed[1..]),
            Some(_) => (1, trimmed),
            None => return Err(invalid()),
        };

        let parts: Vec<&str> = body.split(':').collect();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(invalid());
        }

        let mut fields = [0i64; 3];
        for (slot, part) in fields.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| invalid())?;
        }
        let [hours, minutes, seconds] = fields;
        if hours > 23 || minutes > 59 || seconds > 59 || hours < 0 || minutes < 0 || seconds < 0 {
            return Err(invalid());
        }

        Ok(Self(Duration::seconds(
            sign * (hours * 3600 + minutes * 60 + seconds),
        )))
    }

    pub fn duration(&self) -> Duration {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == Duration::zero()
    }

    /// Shift a timestamp by this offset.
    pub fn apply(&self, dt: NaiveDateTime) -> NaiveDateTime {
        dt + self.0
    }
}

impl Default for UtcOffset {
    fn default() -> Self {
        Self::zero()
    }
}

/// Inclusive window over model time in hours. An open end accepts every
/// later block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourWindow {
    pub start: f64,
    pub end: Option<f64>,
}

impl HourWindow {
    pub fn new(start: f64, end: Option<f64>) -> Flo2dResult<Self> {
        if let Some(end) = end {
            if start > end {
                return Err(Flo2dError::InvalidWindow { start, end });
            }
        }
        Ok(Self { start, end })
    }

    /// Window accepting every block.
    pub fn unbounded() -> Self {
        Self {
            start: f64::NEG_INFINITY,
            end: None,
        }
    }

    pub fn contains(&self, hours: f64) -> bool {
        hours >= self.start && self.end.map_or(true, |end| hours <= end)
    }
}

impl Default for HourWindow {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, 5, 20)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_model_time_to_datetime() {
        let dt = model_time_to_datetime(base(), 1.5).unwrap();
        assert_eq!(dt.format(DATE_TIME_FORMAT).to_string(), "2017-05-20 01:30:00");

        let dt = model_time_to_datetime(base(), 24.25).unwrap();
        assert_eq!(dt.format(FILE_STAMP_FORMAT).to_string(), "2017-05-21_00-15-00");
    }

    #[test]
    fn test_fractional_hours_round_to_seconds() {
        // 0.1 hour is not exactly representable; it must still land on 6 minutes.
        let dt = model_time_to_datetime(base(), 0.1).unwrap();
        assert_eq!(dt.format(DATE_TIME_FORMAT).to_string(), "2017-05-20 00:06:00");
    }

    #[test]
    fn test_unrepresentable_model_times() {
        assert_eq!(model_time_to_datetime(base(), f64::INFINITY), None);
        assert_eq!(model_time_to_datetime(base(), f64::NAN), None);
        assert_eq!(model_time_to_datetime(base(), 1e12), None);
        assert_eq!(model_time_to_datetime(base(), -1e12), None);
        assert!(model_time_to_datetime(base(), -48.0).is_some());
    }

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(
            UtcOffset::parse("+05:30").unwrap().duration(),
            Duration::minutes(330)
        );
        assert_eq!(
            UtcOffset::parse("-10:00").unwrap().duration(),
            Duration::hours(-10)
        );
        assert!(UtcOffset::parse("+00:00:00").unwrap().is_zero());
        assert_eq!(
            UtcOffset::parse("05:30").unwrap().duration(),
            Duration::minutes(330)
        );
    }

    #[test]
    fn test_parse_utc_offset_invalid() {
        assert!(UtcOffset::parse("").is_err());
        assert!(UtcOffset::parse("+5").is_err());
        assert!(UtcOffset::parse("+25:00").is_err());
        assert!(UtcOffset::parse("abc:de").is_err());
    }

    #[test]
    fn test_hour_window() {
        let window = HourWindow::new(12.0, Some(24.0)).unwrap();
        assert!(!window.contains(11.99));
        assert!(window.contains(12.0));
        assert!(window.contains(24.0));
        assert!(!window.contains(24.01));

        let open = HourWindow::new(6.0, None).unwrap();
        assert!(open.contains(1000.0));
        assert!(HourWindow::unbounded().contains(-3.0));
        assert!(HourWindow::new(5.0, Some(1.0)).is_err());
    }

    #[test]
    fn test_parse_date_and_time() {
        assert_eq!(
            parse_date("2017-05-20").unwrap(),
            NaiveDate::from_ymd_opt(2017, 5, 20).unwrap()
        );
        assert!(parse_date("20/05/2017").is_err());
        assert_eq!(
            parse_time("06:30:00").unwrap(),
            NaiveTime::from_hms_opt(6, 30, 0).unwrap()
        );
        assert!(parse_time("6h").is_err());
    }
}
