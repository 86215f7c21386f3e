//! Partial timestamps for date-valued tag fields.
//!
//! Tag dates may be just a year, a year and month, or anything down to the
//! second. Every accepted form is validated with chrono before it is stored.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use super::error::{Error, Result};
use super::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Precision {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagDate {
    year: i32,
    month: u32,
    day: u32,
    time: NaiveTime,
    precision: Precision,
}

impl TagDate {
    pub fn year(year: i32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, 1, 1)?;
        Some(Self {
            year,
            month: 1,
            day: 1,
            time: NaiveTime::MIN,
            precision: Precision::Year,
        })
    }

    fn from_datetime(dt: NaiveDateTime, precision: Precision) -> Self {
        use chrono::Datelike;
        Self {
            year: dt.year(),
            month: dt.month(),
            day: dt.day(),
            time: dt.time(),
            precision,
        }
    }

    /// Parse `YYYY`, `YYYY-MM`, `YYYY-MM-DD` or `YYYY-MM-DDTHH[:MM[:SS]]`
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim();

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Some(Self::from_datetime(date.and_time(NaiveTime::MIN), Precision::Day));
        }

        let normalized = s.replacen(' ', "T", 1);
        let timed = [
            ("%Y-%m-%dT%H:%M:%S", Precision::Second),
            ("%Y-%m-%dT%H:%M", Precision::Minute),
        ];
        for (fmt, precision) in timed {
            if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, fmt) {
                return Some(Self::from_datetime(dt, precision));
            }
        }
        if let Some((date, hour)) = normalized.split_once('T') {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
            let hour: u32 = hour.parse().ok()?;
            let time = NaiveTime::from_hms_opt(hour, 0, 0)?;
            return Some(Self::from_datetime(date.and_time(time), Precision::Hour));
        }

        let mut parts = s.splitn(2, '-');
        let year_part = parts.next()?;
        if year_part.len() != 4 || !year_part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let year: i32 = year_part.parse().ok()?;
        match parts.next() {
            None => Self::year(year),
            Some(month) => {
                if month.len() != 2 || !month.chars().all(|c| c.is_ascii_digit()) {
                    return None;
                }
                let month: u32 = month.parse().ok()?;
                NaiveDate::from_ymd_opt(year, month, 1)?;
                Some(Self {
                    year,
                    month,
                    day: 1,
                    time: NaiveTime::MIN,
                    precision: Precision::Month,
                })
            }
        }
    }
}

impl fmt::Display for TagDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.year)?;
        if self.precision == Precision::Year {
            return Ok(());
        }
        write!(f, "-{:02}", self.month)?;
        if self.precision == Precision::Month {
            return Ok(());
        }
        write!(f, "-{:02}", self.day)?;
        match self.precision {
            Precision::Hour => write!(f, "T{:02}", self.time.hour()),
            Precision::Minute => write!(f, "T{:02}:{:02}", self.time.hour(), self.time.minute()),
            Precision::Second => write!(
                f,
                "T{:02}:{:02}:{:02}",
                self.time.hour(),
                self.time.minute(),
                self.time.second()
            ),
            _ => Ok(()),
        }
    }
}

/// Coerce a resolved value into a date for a date-named field.
///
/// Dates and nulls pass through, integers are years, text is parsed.
pub fn to_date(value: Value) -> Result<Value> {
    match value {
        Value::Date(_) | Value::Null => Ok(value),
        Value::Int(y) => i32::try_from(y)
            .ok()
            .and_then(TagDate::year)
            .map(Value::Date)
            .ok_or_else(|| Error::InvalidDate { value: y.to_string() }),
        Value::Str(ref s) => TagDate::parse(s)
            .map(Value::Date)
            .ok_or_else(|| Error::InvalidDate { value: s.clone() }),
        other => Err(Error::InvalidDate {
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_precisions() {
        let cases = [
            "1999",
            "1999-04",
            "1999-04-30",
            "1999-04-30T13",
            "1999-04-30T13:05",
            "1999-04-30T13:05:59",
        ];
        for case in cases {
            let date = TagDate::parse(case).unwrap_or_else(|| panic!("failed to parse {case}"));
            assert_eq!(date.to_string(), case);
        }
    }

    #[test]
    fn test_space_separator() {
        let date = TagDate::parse("2004-05-01 10:20:30").unwrap();
        assert_eq!(date.to_string(), "2004-05-01T10:20:30");
    }

    #[test]
    fn test_rejects_invalid_dates() {
        assert!(TagDate::parse("1999-13").is_none());
        assert!(TagDate::parse("1999-02-30").is_none());
        assert!(TagDate::parse("99").is_none());
        assert!(TagDate::parse("yesterday").is_none());
        assert!(TagDate::parse("1999-04-30T25").is_none());
    }

    #[test]
    fn test_to_date_coercions() {
        assert_eq!(to_date(Value::Int(2001)).unwrap().to_string(), "2001");
        assert_eq!(to_date(Value::from("2001-02")).unwrap().to_string(), "2001-02");
        assert_eq!(to_date(Value::Null).unwrap(), Value::Null);

        let date = to_date(Value::from("2001-02-03")).unwrap();
        assert_eq!(to_date(date.clone()).unwrap(), date);

        assert!(matches!(
            to_date(Value::from("(1, 2)")),
            Err(Error::InvalidDate { .. })
        ));
        assert!(to_date(Value::Tuple(vec![Value::Int(1)])).is_err());
    }
}
