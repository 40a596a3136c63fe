//! Timestamps with explicit precision and offset.
//!
//! A timestamp remembers how much of the calendar ladder it actually
//! carries (year through fractional seconds) and whether its UTC offset is
//! known. Unknown offset (`-00:00` in text) is a distinct state from UTC.

use crate::decimal::Decimal;
use crate::error::{IonError, IonResult};
use std::cmp::Ordering;

/// Precision ladder, least to most precise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TsPrecision {
    Year,
    Month,
    Day,
    Minute,
    Second,
    Fraction,
}

/// A point on the calendar with explicit precision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    precision: TsPrecision,
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    /// Fractional seconds in `[0, 1)`, exponent ≤ −1. Present iff the
    /// precision is [`TsPrecision::Fraction`].
    fraction: Option<Decimal>,
    /// Offset from UTC in minutes; `None` means unknown.
    offset_minutes: Option<i16>,
}

fn is_leap_year(year: u16) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Days since 1970-01-01 in the proleptic Gregorian calendar.
fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = i64::from(if month > 2 { month - 3 } else { month + 9 });
    let doy = (153 * mp + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146097 + doe - 719468
}

impl Timestamp {
    fn base(year: u16) -> Self {
        Self {
            precision: TsPrecision::Year,
            year,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
            fraction: None,
            offset_minutes: None,
        }
    }

    /// Year precision (`2020T`).
    pub fn for_year(year: u16) -> IonResult<Self> {
        if year == 0 || year > 9999 {
            return Err(IonError::InvalidTimestamp);
        }
        Ok(Self::base(year))
    }

    /// Month precision (`2020-06T`).
    pub fn for_month(year: u16, month: u8) -> IonResult<Self> {
        let mut ts = Self::for_year(year)?;
        if month == 0 || month > 12 {
            return Err(IonError::InvalidTimestamp);
        }
        ts.precision = TsPrecision::Month;
        ts.month = month;
        Ok(ts)
    }

    /// Day precision (`2020-06-15`).
    pub fn for_day(year: u16, month: u8, day: u8) -> IonResult<Self> {
        let mut ts = Self::for_month(year, month)?;
        if day == 0 || day > days_in_month(year, month) {
            return Err(IonError::InvalidTimestamp);
        }
        ts.precision = TsPrecision::Day;
        ts.day = day;
        Ok(ts)
    }

    /// Minute precision; any time component requires an offset designation.
    pub fn for_minute(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        offset_minutes: Option<i16>,
    ) -> IonResult<Self> {
        let mut ts = Self::for_day(year, month, day)?;
        if hour > 23 || minute > 59 {
            return Err(IonError::InvalidTimestamp);
        }
        if let Some(off) = offset_minutes {
            if off <= -24 * 60 || off >= 24 * 60 {
                return Err(IonError::InvalidTimestamp);
            }
        }
        ts.precision = TsPrecision::Minute;
        ts.hour = hour;
        ts.minute = minute;
        ts.offset_minutes = offset_minutes;
        Ok(ts)
    }

    /// Second precision.
    #[allow(clippy::too_many_arguments)]
    pub fn for_second(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        offset_minutes: Option<i16>,
    ) -> IonResult<Self> {
        let mut ts = Self::for_minute(year, month, day, hour, minute, offset_minutes)?;
        if second > 59 {
            return Err(IonError::InvalidTimestamp);
        }
        ts.precision = TsPrecision::Second;
        ts.second = second;
        Ok(ts)
    }

    /// Extends a second-precision timestamp with fractional seconds.
    ///
    /// The fraction must be non-negative, below one, with exponent ≤ −1.
    pub fn with_fraction(mut self, fraction: Decimal) -> IonResult<Self> {
        if self.precision < TsPrecision::Second {
            return Err(IonError::InvalidState);
        }
        if fraction.is_negative() || fraction.exponent() > -1 {
            return Err(IonError::InvalidTimestamp);
        }
        self.precision = TsPrecision::Fraction;
        self.fraction = Some(fraction);
        Ok(self)
    }

    pub fn precision(&self) -> TsPrecision {
        self.precision
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    pub fn fraction(&self) -> Option<&Decimal> {
        self.fraction.as_ref()
    }

    /// Offset from UTC in minutes; `None` when unknown.
    pub fn offset_minutes(&self) -> Option<i16> {
        self.offset_minutes
    }

    /// Parses the text forms recognized by the scanner.
    pub fn parse_text(text: &str) -> IonResult<Self> {
        let b = text.as_bytes();
        let digits = |range: std::ops::Range<usize>| -> IonResult<u32> {
            let slice = b.get(range).ok_or(IonError::InvalidTimestamp)?;
            let mut value = 0u32;
            for &c in slice {
                if !c.is_ascii_digit() {
                    return Err(IonError::InvalidTimestamp);
                }
                value = value * 10 + (c - b'0') as u32;
            }
            Ok(value)
        };
        if b.len() < 5 {
            return Err(IonError::InvalidTimestamp);
        }
        let year = digits(0..4)? as u16;
        if b[4] == b'T' {
            if b.len() != 5 {
                return Err(IonError::InvalidTimestamp);
            }
            return Self::for_year(year);
        }
        if b[4] != b'-' {
            return Err(IonError::InvalidTimestamp);
        }
        let month = digits(5..7)? as u8;
        if b.len() == 8 && b[7] == b'T' {
            return Self::for_month(year, month);
        }
        if b.len() < 10 || b[7] != b'-' {
            return Err(IonError::InvalidTimestamp);
        }
        let day = digits(8..10)? as u8;
        if b.len() == 10 {
            return Self::for_day(year, month, day);
        }
        if b.len() == 11 && b[10] == b'T' {
            return Self::for_day(year, month, day);
        }
        if b[10] != b'T' {
            return Err(IonError::InvalidTimestamp);
        }
        // Time part: HH:MM at minimum, then optional :SS and .fraction,
        // then a mandatory offset.
        if b.len() < 16 || b[13] != b':' {
            return Err(IonError::InvalidTimestamp);
        }
        let hour = digits(11..13)? as u8;
        let minute = digits(14..16)? as u8;
        let mut at = 16;
        let mut second = None;
        let mut fraction = None;
        if at < b.len() && b[at] == b':' {
            second = Some(digits(at + 1..at + 3)? as u8);
            at += 3;
            if at < b.len() && b[at] == b'.' {
                let frac_start = at + 1;
                let mut frac_end = frac_start;
                while frac_end < b.len() && b[frac_end].is_ascii_digit() {
                    frac_end += 1;
                }
                if frac_end == frac_start {
                    return Err(IonError::InvalidTimestamp);
                }
                let frac_digits = &text[frac_start..frac_end];
                let trimmed = frac_digits.trim_start_matches('0');
                let coefficient = if trimmed.is_empty() {
                    crate::int::IonInt::zero()
                } else {
                    crate::int::IonInt::from_decimal_str(trimmed)?
                };
                fraction = Some(Decimal::from_parts(
                    false,
                    coefficient,
                    -(frac_digits.len() as i32),
                ));
                at = frac_end;
            }
        }
        let offset = match b.get(at) {
            Some(b'Z') | Some(b'z') => {
                at += 1;
                Some(0i16)
            }
            Some(&(sign @ (b'+' | b'-'))) => {
                let hh = digits(at + 1..at + 3)? as i16;
                if b.get(at + 3) != Some(&b':') {
                    return Err(IonError::InvalidTimestamp);
                }
                let mm = digits(at + 4..at + 6)? as i16;
                if hh > 23 || mm > 59 {
                    return Err(IonError::InvalidTimestamp);
                }
                at += 6;
                let total = hh * 60 + mm;
                if sign == b'-' {
                    if total == 0 {
                        None
                    } else {
                        Some(-total)
                    }
                } else {
                    Some(total)
                }
            }
            _ => return Err(IonError::InvalidTimestamp),
        };
        if at != b.len() {
            return Err(IonError::InvalidTimestamp);
        }
        let ts = match (second, fraction) {
            (None, _) => Self::for_minute(year, month, day, hour, minute, offset)?,
            (Some(s), None) => Self::for_second(year, month, day, hour, minute, s, offset)?,
            (Some(s), Some(f)) => {
                Self::for_second(year, month, day, hour, minute, s, offset)?.with_fraction(f)?
            }
        };
        Ok(ts)
    }

    /// Renders the canonical text form for this precision.
    pub fn to_text(&self) -> String {
        use std::fmt::Write;
        let mut out = String::new();
        match self.precision {
            TsPrecision::Year => {
                let _ = write!(out, "{:04}T", self.year);
            }
            TsPrecision::Month => {
                let _ = write!(out, "{:04}-{:02}T", self.year, self.month);
            }
            TsPrecision::Day => {
                let _ = write!(out, "{:04}-{:02}-{:02}", self.year, self.month, self.day);
            }
            _ => {
                let _ = write!(
                    out,
                    "{:04}-{:02}-{:02}T{:02}:{:02}",
                    self.year, self.month, self.day, self.hour, self.minute
                );
                if self.precision >= TsPrecision::Second {
                    let _ = write!(out, ":{:02}", self.second);
                }
                if let Some(fraction) = &self.fraction {
                    let places = (-fraction.exponent()) as usize;
                    let digits = fraction.coefficient().to_decimal_string();
                    let _ = write!(out, ".{:0>places$}", digits, places = places);
                }
                match self.offset_minutes {
                    None => out.push_str("-00:00"),
                    Some(0) => out.push('Z'),
                    Some(off) => {
                        let sign = if off < 0 { '-' } else { '+' };
                        let magnitude = off.unsigned_abs();
                        let _ =
                            write!(out, "{}{:02}:{:02}", sign, magnitude / 60, magnitude % 60);
                    }
                }
            }
        }
        out
    }

    /// Compares instants after normalizing to UTC.
    ///
    /// An unknown offset is treated as UTC for ordering purposes. Precision
    /// and offset designation are ignored; use `==` for identity.
    pub fn compare_instant(&self, other: &Self) -> Ordering {
        let minutes = |ts: &Self| -> i64 {
            let days = days_from_civil(ts.year as i64, ts.month as u32, ts.day as u32);
            days * 24 * 60 + ts.hour as i64 * 60 + ts.minute as i64
                - ts.offset_minutes.unwrap_or(0) as i64
        };
        minutes(self)
            .cmp(&minutes(other))
            .then_with(|| self.second.cmp(&other.second))
            .then_with(|| {
                let frac = |ts: &Self| -> String {
                    match &ts.fraction {
                        None => String::new(),
                        Some(f) => {
                            let places = (-f.exponent()) as usize;
                            format!("{:0>places$}", f.coefficient().to_decimal_string())
                        }
                    }
                };
                let a = frac(self);
                let b = frac(other);
                let width = a.len().max(b.len());
                format!("{a:0<width$}").cmp(&format!("{b:0<width$}"))
            })
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trip_at_each_precision() {
        for text in [
            "2020T",
            "2020-06T",
            "2020-06-15",
            "2020-06-15T10:30Z",
            "2020-06-15T10:30:45Z",
            "2020-06-15T10:30:45.123Z",
            "2020-06-15T10:30:45.000Z",
            "2020-06-15T10:30+05:30",
            "2020-06-15T10:30-08:00",
            "2020-06-15T10:30-00:00",
        ] {
            let ts = Timestamp::parse_text(text).unwrap();
            assert_eq!(ts.to_text(), text, "input {text}");
        }
    }

    #[test]
    fn time_requires_an_offset() {
        assert_eq!(
            Timestamp::parse_text("2020-01-01T00:00"),
            Err(IonError::InvalidTimestamp)
        );
    }

    #[test]
    fn unknown_offset_is_not_utc() {
        let unknown = Timestamp::parse_text("2020-01-01T00:00-00:00").unwrap();
        let utc = Timestamp::parse_text("2020-01-01T00:00Z").unwrap();
        assert_eq!(unknown.offset_minutes(), None);
        assert_eq!(utc.offset_minutes(), Some(0));
        assert_ne!(unknown, utc);
        assert_eq!(unknown.compare_instant(&utc), Ordering::Equal);
    }

    #[test]
    fn calendar_validation() {
        assert!(Timestamp::for_day(2020, 2, 29).is_ok());
        assert!(Timestamp::for_day(2021, 2, 29).is_err());
        assert!(Timestamp::for_day(1900, 2, 29).is_err());
        assert!(Timestamp::for_day(2000, 2, 29).is_ok());
        assert!(Timestamp::for_month(2020, 13).is_err());
        assert!(Timestamp::for_year(0).is_err());
    }

    #[test]
    fn instants_normalize_across_offsets() {
        let a = Timestamp::parse_text("2020-06-15T12:00+02:00").unwrap();
        let b = Timestamp::parse_text("2020-06-15T10:00Z").unwrap();
        assert_eq!(a.compare_instant(&b), Ordering::Equal);
        assert_ne!(a, b);
        let c = Timestamp::parse_text("2020-06-15T10:01Z").unwrap();
        assert_eq!(a.compare_instant(&c), Ordering::Less);
    }

    #[test]
    fn fraction_keeps_leading_zeros() {
        let ts = Timestamp::parse_text("2020-06-15T10:30:45.007Z").unwrap();
        assert_eq!(ts.to_text(), "2020-06-15T10:30:45.007Z");
        let f = ts.fraction().unwrap();
        assert_eq!(f.exponent(), -3);
        assert_eq!(f.coefficient().to_decimal_string(), "7");
    }
}
