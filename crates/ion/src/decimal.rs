//! Arbitrary-precision decimals.
//!
//! A decimal is a signed coefficient and a base-10 exponent. The sign is
//! kept apart from the coefficient magnitude so negative zero survives,
//! which the data model requires (`-0.0` is distinct from `0.0` in
//! identity, though they compare equal numerically).

use crate::error::{IonError, IonResult};
use crate::int::IonInt;

/// An arbitrary-precision decimal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal {
    negative: bool,
    /// Magnitude of the coefficient; never negative.
    coefficient: IonInt,
    exponent: i32,
}

impl Decimal {
    /// Builds from sign, coefficient magnitude, and exponent.
    pub fn from_parts(negative: bool, coefficient: IonInt, exponent: i32) -> Self {
        Self {
            negative,
            coefficient,
            exponent,
        }
    }

    /// Positive zero with exponent 0 (`0d0`).
    pub fn zero() -> Self {
        Self::from_parts(false, IonInt::zero(), 0)
    }

    /// Builds from a signed integer coefficient and exponent.
    pub fn new(coefficient: i64, exponent: i32) -> Self {
        Self::from_parts(
            coefficient < 0,
            IonInt::from_u64(coefficient.unsigned_abs()),
            exponent,
        )
    }

    /// Whether the sign is negative (including negative zero).
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Whether the coefficient is zero, of either sign.
    pub fn is_zero(&self) -> bool {
        self.coefficient.is_zero()
    }

    /// The coefficient magnitude.
    pub fn coefficient(&self) -> &IonInt {
        &self.coefficient
    }

    /// The base-10 exponent.
    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    /// Parses decimal text: `123.45`, `-0.0`, `123.`, `5d3`, `0d-2`.
    ///
    /// The input must contain a decimal point or a `d`/`D` exponent marker
    /// (otherwise it would be an int). Underscores are expected to have
    /// been stripped by the scanner.
    pub fn parse(text: &str) -> IonResult<Self> {
        let bytes = text.as_bytes();
        let (negative, mut at) = match bytes.first() {
            Some(b'-') => (true, 1),
            Some(b'+') => (false, 1),
            _ => (false, 0),
        };
        let int_start = at;
        while at < bytes.len() && bytes[at].is_ascii_digit() {
            at += 1;
        }
        let int_part = &text[int_start..at];
        if int_part.is_empty() {
            return Err(IonError::InvalidSyntax);
        }
        if int_part.len() > 1 && int_part.as_bytes()[0] == b'0' {
            return Err(IonError::InvalidLeadingZeros);
        }
        let mut frac_part = "";
        if at < bytes.len() && bytes[at] == b'.' {
            at += 1;
            let frac_start = at;
            while at < bytes.len() && bytes[at].is_ascii_digit() {
                at += 1;
            }
            frac_part = &text[frac_start..at];
        } else if at == bytes.len() {
            return Err(IonError::InvalidSyntax);
        }
        let mut exponent: i64 = -(frac_part.len() as i64);
        if at < bytes.len() {
            let marker = bytes[at];
            if marker != b'd' && marker != b'D' {
                return Err(IonError::InvalidTokenChar);
            }
            at += 1;
            let exp_negative = match bytes.get(at) {
                Some(b'-') => {
                    at += 1;
                    true
                }
                Some(b'+') => {
                    at += 1;
                    false
                }
                _ => false,
            };
            let exp_start = at;
            while at < bytes.len() && bytes[at].is_ascii_digit() {
                at += 1;
            }
            if exp_start == at || at != bytes.len() {
                return Err(IonError::InvalidSyntax);
            }
            let exp: i64 = text[exp_start..at]
                .parse()
                .map_err(|_| IonError::NumericOverflow)?;
            exponent += if exp_negative { -exp } else { exp };
        }
        if exponent > i32::MAX as i64 || exponent < i32::MIN as i64 {
            return Err(IonError::NumericOverflow);
        }
        let mut digits = String::with_capacity(int_part.len() + frac_part.len());
        digits.push_str(int_part);
        digits.push_str(frac_part);
        let trimmed = digits.trim_start_matches('0');
        let coefficient = if trimmed.is_empty() {
            IonInt::zero()
        } else {
            IonInt::from_decimal_str(trimmed)?
        };
        Ok(Self::from_parts(negative, coefficient, exponent as i32))
    }

    /// Renders as Ion text; the result always carries a `.` or a `d`.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        if self.negative {
            out.push('-');
        }
        if self.coefficient.is_zero() {
            match self.exponent {
                0 => out.push_str("0d0"),
                e if e < 0 => {
                    out.push_str("0.");
                    for _ in 0..(-e - 1) {
                        out.push('0');
                    }
                    out.push('0');
                }
                e => {
                    out.push_str("0d");
                    out.push_str(&e.to_string());
                }
            }
            return out;
        }
        let magnitude = self.coefficient.to_decimal_string();
        let e = self.exponent;
        if e == 0 {
            out.push_str(&magnitude);
            out.push('.');
        } else if e > 0 {
            out.push_str(&magnitude);
            out.push('d');
            out.push_str(&e.to_string());
        } else {
            let shift = (-e) as usize;
            if shift < magnitude.len() {
                let split = magnitude.len() - shift;
                out.push_str(&magnitude[..split]);
                out.push('.');
                out.push_str(&magnitude[split..]);
            } else {
                out.push_str("0.");
                for _ in 0..(shift - magnitude.len()) {
                    out.push('0');
                }
                out.push_str(&magnitude);
            }
        }
        out
    }
}

impl std::fmt::Display for Decimal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_render() {
        for (text, rendered) in [
            ("123.45", "123.45"),
            ("-1.0", "-1.0"),
            ("0.001", "0.001"),
            ("5d3", "5d3"),
            ("5.", "5."),
            ("0d0", "0d0"),
            ("0d-2", "0.00"),
            ("-0.0", "-0.0"),
        ] {
            let d = Decimal::parse(text).unwrap();
            assert_eq!(d.to_text(), rendered, "input {text}");
        }
    }

    #[test]
    fn negative_zero_keeps_its_sign() {
        let d = Decimal::parse("-0.0").unwrap();
        assert!(d.is_negative());
        assert!(d.is_zero());
        assert!(d.to_text().contains("-0"));
        assert_ne!(d, Decimal::parse("0.0").unwrap());
    }

    #[test]
    fn exponent_arithmetic() {
        let d = Decimal::parse("12.34d2").unwrap();
        assert_eq!(d.exponent(), 0);
        assert_eq!(d.coefficient().to_decimal_string(), "1234");
        let d = Decimal::parse("1.5d-3").unwrap();
        assert_eq!(d.exponent(), -4);
    }

    #[test]
    fn rejects_non_decimal_forms() {
        assert!(Decimal::parse("123").is_err());
        assert!(Decimal::parse("1e3").is_err());
        assert!(Decimal::parse(".5").is_err());
        assert!(Decimal::parse("01.0").is_err());
    }
}
