//! Duration type with day-unit parsing and flexible JSON serialization.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;
use std::time::Duration as StdDuration;

use chrono::TimeDelta;

use crate::error::{DurationError, ParseError};
use crate::parse::parse_duration;

/// A signed nanosecond duration that serializes to a string (e.g., "1h30m0s")
/// and deserializes from either a string or a nanoseconds integer.
///
/// Text input accepts an optional leading day component (`"2d3h"`). Days are
/// never emitted: formatting always expands them into hours, because a day is
/// not a fixed span across daylight saving transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(i64);

impl Duration {
    pub const ZERO: Duration = Duration(0);
    pub const NANOSECOND: Duration = Duration(1);
    pub const MICROSECOND: Duration = Duration(1_000 * Self::NANOSECOND.0);
    pub const MILLISECOND: Duration = Duration(1_000 * Self::MICROSECOND.0);
    pub const SECOND: Duration = Duration(1_000 * Self::MILLISECOND.0);
    pub const MINUTE: Duration = Duration(60 * Self::SECOND.0);
    pub const HOUR: Duration = Duration(60 * Self::MINUTE.0);
    /// 24 hours. Accepted as an input unit only.
    pub const DAY: Duration = Duration(24 * Self::HOUR.0);
    pub const MIN: Duration = Duration(i64::MIN);
    pub const MAX: Duration = Duration(i64::MAX);

    /// Creates a Duration from a raw nanosecond count.
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Returns the duration as nanoseconds.
    pub const fn as_nanos(&self) -> i64 {
        self.0
    }

    /// Returns the duration as seconds (floating point).
    pub fn as_secs_f64(&self) -> f64 {
        let secs = self.0 / Self::SECOND.0;
        let nanos = self.0 % Self::SECOND.0;
        secs as f64 + nanos as f64 / 1e9
    }

    /// Returns true if this duration is zero.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if this duration is less than zero.
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Parses text such as "1h30m", "1.5s", "250ms", "2d" or "2d3h0m5s".
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        parse_duration(text)
    }

    /// Returns the formatted duration as UTF-8 bytes.
    pub fn marshal_text(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    /// Parses `data` into `self`. On error `self` is left unchanged.
    pub fn unmarshal_text(&mut self, data: &[u8]) -> Result<(), DurationError> {
        let result = std::str::from_utf8(data)
            .map_err(|_| ParseError::Invalid(String::from_utf8_lossy(data).into_owned()))
            .and_then(Self::parse);

        match result {
            Ok(d) => {
                *self = d;
                Ok(())
            }
            Err(err) => {
                tracing::trace!(
                    input = %String::from_utf8_lossy(data),
                    error = %err,
                    "rejected duration text"
                );
                Err(err.into())
            }
        }
    }

    /// Returns the formatted duration as a JSON string literal.
    pub fn marshal_json(&self) -> Vec<u8> {
        serde_json::Value::String(self.to_string())
            .to_string()
            .into_bytes()
    }

    /// Decodes a JSON string (duration text) or integer (nanoseconds).
    ///
    /// Numbers must be exact integers within the i64 range; `1.5` or `1e3`
    /// are rejected rather than truncated.
    pub fn from_json(data: &[u8]) -> Result<Self, DurationError> {
        let value: serde_json::Value = serde_json::from_slice(data)?;
        match value {
            serde_json::Value::Number(n) => {
                if let Some(nanos) = n.as_i64() {
                    Ok(Self(nanos))
                } else if n.is_u64() {
                    Err(DurationError::Range(format!(
                        "{n} exceeds the nanosecond range"
                    )))
                } else {
                    Err(DurationError::Range(format!(
                        "{n} is not an integer nanosecond count"
                    )))
                }
            }
            serde_json::Value::String(s) => Ok(Self::parse(&s)?),
            other => Err(DurationError::Type(other.to_string())),
        }
    }

    /// Decodes `data` into `self`. On error `self` is left unchanged.
    pub fn unmarshal_json(&mut self, data: &[u8]) -> Result<(), DurationError> {
        match Self::from_json(data) {
            Ok(d) => {
                *self = d;
                Ok(())
            }
            Err(err) => {
                tracing::trace!(
                    input = %String::from_utf8_lossy(data),
                    error = %err,
                    "rejected duration json"
                );
                Err(err)
            }
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("0s");
        }
        if self.0 < 0 {
            f.write_str("-")?;
        }

        // unsigned_abs keeps i64::MIN representable.
        let nanos = self.0.unsigned_abs();
        let second = Self::SECOND.0 as u64;

        if nanos < second {
            let (prec, unit) = if nanos < Self::MICROSECOND.0 as u64 {
                (0, "ns")
            } else if nanos < Self::MILLISECOND.0 as u64 {
                (3, "\u{b5}s")
            } else {
                (6, "ms")
            };
            write_decimal(f, nanos, prec)?;
            return f.write_str(unit);
        }

        let secs = nanos / second;
        let hours = secs / 3600;
        let mins = secs / 60 % 60;
        if hours > 0 {
            write!(f, "{}h", hours)?;
        }
        if hours > 0 || mins > 0 {
            write!(f, "{}m", mins)?;
        }
        write_decimal(f, nanos % (60 * second), 9)?;
        f.write_str("s")
    }
}

/// Writes `v / 10^prec` with trailing fraction zeros trimmed; the decimal
/// point is omitted when the fraction is zero.
fn write_decimal(f: &mut fmt::Formatter<'_>, v: u64, prec: u32) -> fmt::Result {
    let scale = 10u64.pow(prec);
    write!(f, "{}", v / scale)?;
    let frac = v % scale;
    if frac != 0 {
        let digits = format!("{:0width$}", frac, width = prec as usize);
        write!(f, ".{}", digits.trim_end_matches('0'))?;
    }
    Ok(())
}

impl FromStr for Duration {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DurationVisitor;

        impl<'de> serde::de::Visitor<'de> for DurationVisitor {
            type Value = Duration;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a duration string (e.g., '1h30m', '2d') or nanoseconds integer")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Duration::parse(v).map_err(serde::de::Error::custom)
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(Duration(v))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
                i64::try_from(v).map(Duration).map_err(|_| {
                    serde::de::Error::custom(DurationError::Range(format!(
                        "{v} exceeds the nanosecond range"
                    )))
                })
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Err(serde::de::Error::custom(DurationError::Range(format!(
                    "{v} is not an integer nanosecond count"
                ))))
            }
        }

        deserializer.deserialize_any(DurationVisitor)
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        Duration(self.0 + rhs.0)
    }
}

impl Sub for Duration {
    type Output = Duration;

    fn sub(self, rhs: Duration) -> Duration {
        Duration(self.0 - rhs.0)
    }
}

impl Mul<i64> for Duration {
    type Output = Duration;

    fn mul(self, rhs: i64) -> Duration {
        Duration(self.0 * rhs)
    }
}

impl Neg for Duration {
    type Output = Duration;

    fn neg(self) -> Duration {
        Duration(-self.0)
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Duration) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Duration {
    fn sub_assign(&mut self, rhs: Duration) {
        self.0 -= rhs.0;
    }
}

impl From<i64> for Duration {
    fn from(nanos: i64) -> Self {
        Self(nanos)
    }
}

impl From<Duration> for i64 {
    fn from(d: Duration) -> Self {
        d.0
    }
}

impl TryFrom<StdDuration> for Duration {
    type Error = DurationError;

    fn try_from(d: StdDuration) -> Result<Self, Self::Error> {
        i64::try_from(d.as_nanos())
            .map(Self)
            .map_err(|_| DurationError::Range(format!("{:?} exceeds the nanosecond range", d)))
    }
}

impl TryFrom<Duration> for StdDuration {
    type Error = DurationError;

    fn try_from(d: Duration) -> Result<Self, Self::Error> {
        u64::try_from(d.0)
            .map(StdDuration::from_nanos)
            .map_err(|_| DurationError::Range(format!("negative duration {}", d)))
    }
}

impl From<Duration> for TimeDelta {
    fn from(d: Duration) -> Self {
        TimeDelta::nanoseconds(d.0)
    }
}

impl TryFrom<TimeDelta> for Duration {
    type Error = DurationError;

    fn try_from(d: TimeDelta) -> Result<Self, Self::Error> {
        d.num_nanoseconds()
            .map(Self)
            .ok_or_else(|| DurationError::Range(format!("{} exceeds the nanosecond range", d)))
    }
}

#[cfg(test)]
mod format_tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Duration::ZERO.to_string(), "0s");
        assert_eq!(Duration::from_nanos(1).to_string(), "1ns");
        assert_eq!(Duration::from_nanos(1_100).to_string(), "1.1µs");
        assert_eq!(Duration::from_nanos(2_200_000).to_string(), "2.2ms");
        assert_eq!(Duration::from_nanos(3_300_000_000).to_string(), "3.3s");
        assert_eq!((Duration::MINUTE * 4 + Duration::SECOND * 5).to_string(), "4m5s");
        assert_eq!(
            (Duration::MINUTE * 4 + Duration::from_nanos(5_001_000_000)).to_string(),
            "4m5.001s"
        );
        assert_eq!(
            (Duration::HOUR * 5 + Duration::MINUTE * 6 + Duration::from_nanos(7_001_000_000))
                .to_string(),
            "5h6m7.001s"
        );
        assert_eq!((Duration::MINUTE * 8 + Duration::NANOSECOND).to_string(), "8m0.000000001s");
        assert_eq!(Duration::from_nanos(-1).to_string(), "-1ns");
    }

    #[test]
    fn test_display_limits() {
        assert_eq!(Duration::MAX.to_string(), "2562047h47m16.854775807s");
        assert_eq!(Duration::MIN.to_string(), "-2562047h47m16.854775808s");
    }

    #[test]
    fn test_display_never_emits_days() {
        assert_eq!((Duration::DAY * 2).to_string(), "48h0m0s");
    }
}
