//! Duration text parser.
//!
//! The unit grammar is `[-+]?([0-9]*(\.[0-9]*)?[a-zµμ]+)+` with units ns,
//! us/µs, ms, s, m and h, plus the bare literal `0`. A leading `<digits>d`
//! component adds whole days before the rest is parsed with the unit grammar.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::duration::Duration;
use crate::error::ParseError;

/// Leading day component. ASCII digits only, so `\d` is avoided.
static DAY_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)d").expect("day prefix pattern is valid"));

/// Largest magnitude a duration can hold, `|i64::MIN|`.
const MAX_MAGNITUDE: u64 = 1 << 63;

/// Parses duration text, accepting an optional leading day component.
pub(crate) fn parse_duration(text: &str) -> Result<Duration, ParseError> {
    let Some(caps) = DAY_PREFIX.captures(text) else {
        return parse_units(text).map(Duration::from_nanos);
    };

    let digits = &caps[1];
    let days = digits
        .parse::<i64>()
        .ok()
        .and_then(|n| n.checked_mul(Duration::DAY.as_nanos()))
        .ok_or_else(|| ParseError::DayOverflow(digits.to_string()))?;

    let rest = &text[caps[0].len()..];
    if rest.is_empty() {
        return Ok(Duration::from_nanos(days));
    }

    let nanos = parse_units(rest)?;
    days.checked_add(nanos)
        .map(Duration::from_nanos)
        .ok_or_else(|| ParseError::Overflow(rest.to_string()))
}

/// Parses the unit grammar. Errors name `orig` exactly as given.
fn parse_units(orig: &str) -> Result<i64, ParseError> {
    let invalid = || ParseError::Invalid(orig.to_string());

    let mut s = orig;
    let mut neg = false;
    if let Some(rest) = s.strip_prefix('-') {
        neg = true;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }

    if s == "0" {
        return Ok(0);
    }
    if s.is_empty() {
        return Err(invalid());
    }

    let mut total: u64 = 0;
    while !s.is_empty() {
        let first = s.as_bytes()[0];
        if !(first == b'.' || first.is_ascii_digit()) {
            return Err(invalid());
        }

        let (mut v, rest) = leading_int(s).ok_or_else(invalid)?;
        let pre = rest.len() != s.len();
        s = rest;

        let mut frac: u64 = 0;
        let mut scale: u128 = 1;
        let mut post = false;
        if let Some(rest) = s.strip_prefix('.') {
            let (f, sc, after) = leading_fraction(rest);
            post = after.len() != rest.len();
            frac = f;
            scale = sc;
            s = after;
        }
        if !pre && !post {
            return Err(invalid());
        }

        let end = s
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(s.len());
        if end == 0 {
            return Err(ParseError::MissingUnit(orig.to_string()));
        }
        let (unit_text, rest) = s.split_at(end);
        s = rest;

        let unit = unit_nanos(unit_text).ok_or_else(|| ParseError::UnknownUnit {
            unit: unit_text.to_string(),
            input: orig.to_string(),
        })?;

        if v > MAX_MAGNITUDE / unit {
            return Err(invalid());
        }
        v *= unit;
        if frac > 0 {
            // frac < 2^63 and unit <= 3.6e12, so the product fits in u128.
            v += (u128::from(frac) * u128::from(unit) / scale) as u64;
            if v > MAX_MAGNITUDE {
                return Err(invalid());
            }
        }

        total = total
            .checked_add(v)
            .filter(|t| *t <= MAX_MAGNITUDE)
            .ok_or_else(invalid)?;
    }

    if neg {
        return Ok((total as i64).wrapping_neg());
    }
    if total > i64::MAX as u64 {
        return Err(invalid());
    }
    Ok(total as i64)
}

/// Consumes leading ASCII digits. `None` on overflow past 2^63.
fn leading_int(s: &str) -> Option<(u64, &str)> {
    let end = digits_end(s);
    let mut x: u64 = 0;
    for b in s[..end].bytes() {
        if x > MAX_MAGNITUDE / 10 {
            return None;
        }
        x = x * 10 + u64::from(b - b'0');
        if x > MAX_MAGNITUDE {
            return None;
        }
    }
    Some((x, &s[end..]))
}

/// Consumes the digits after a decimal point, returning the value and its
/// scale. Digits past the precision limit are consumed but ignored.
fn leading_fraction(s: &str) -> (u64, u128, &str) {
    let end = digits_end(s);
    let mut x: u64 = 0;
    let mut scale: u128 = 1;
    for b in s[..end].bytes() {
        if x > (i64::MAX as u64) / 10 {
            break;
        }
        let y = x * 10 + u64::from(b - b'0');
        if y > MAX_MAGNITUDE {
            break;
        }
        x = y;
        scale *= 10;
    }
    (x, scale, &s[end..])
}

fn digits_end(s: &str) -> usize {
    s.bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(s.len())
}

fn unit_nanos(unit: &str) -> Option<u64> {
    let d = match unit {
        "ns" => Duration::NANOSECOND,
        // U+00B5 micro sign and U+03BC greek mu.
        "us" | "\u{b5}s" | "\u{3bc}s" => Duration::MICROSECOND,
        "ms" => Duration::MILLISECOND,
        "s" => Duration::SECOND,
        "m" => Duration::MINUTE,
        "h" => Duration::HOUR,
        _ => return None,
    };
    Some(d.as_nanos() as u64)
}

#[cfg(test)]
mod parse_tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_units("0"), Ok(0));
        assert_eq!(parse_units("-0"), Ok(0));
        assert_eq!(parse_units("+5s"), Ok(5_000_000_000));
        assert_eq!(parse_units("1h30m"), Ok(5_400_000_000_000));
        assert_eq!(parse_units("1.5h"), Ok(5_400_000_000_000));
        assert_eq!(parse_units(".5s"), Ok(500_000_000));
        assert_eq!(parse_units("5.s"), Ok(5_000_000_000));
        assert_eq!(parse_units("1µs"), Ok(1_000));
        assert_eq!(parse_units("1μs"), Ok(1_000));
        assert_eq!(parse_units("1us"), Ok(1_000));
        assert_eq!(parse_units("100ns"), Ok(100));
        assert_eq!(parse_units("-1.000000001s"), Ok(-1_000_000_001));
        assert_eq!(parse_units("1s1s"), Ok(2_000_000_000));
    }

    #[test]
    fn test_parse_units_limits() {
        assert_eq!(parse_units("9223372036854775807ns"), Ok(i64::MAX));
        assert_eq!(parse_units("-9223372036854775808ns"), Ok(i64::MIN));
        assert_eq!(
            parse_units("9223372036854775808ns"),
            Err(ParseError::Invalid("9223372036854775808ns".to_string()))
        );
        assert!(parse_units("2562048h").is_err());
        // Extra fraction digits are ignored rather than overflowing.
        assert_eq!(
            parse_units("0.100000000000000000000h"),
            Ok(360_000_000_000)
        );
    }

    #[test]
    fn test_parse_units_errors() {
        assert_eq!(parse_units(""), Err(ParseError::Invalid(String::new())));
        assert_eq!(parse_units("-"), Err(ParseError::Invalid("-".to_string())));
        assert_eq!(parse_units("s"), Err(ParseError::Invalid("s".to_string())));
        assert_eq!(parse_units("."), Err(ParseError::Invalid(".".to_string())));
        assert_eq!(parse_units(".s"), Err(ParseError::Invalid(".s".to_string())));
        assert_eq!(
            parse_units("3"),
            Err(ParseError::MissingUnit("3".to_string()))
        );
        assert_eq!(
            parse_units("3x"),
            Err(ParseError::UnknownUnit {
                unit: "x".to_string(),
                input: "3x".to_string(),
            })
        );
    }

    #[test]
    fn test_day_prefix() {
        assert_eq!(parse_duration("2d"), Ok(Duration::DAY * 2));
        assert_eq!(parse_duration("0d"), Ok(Duration::ZERO));
        assert_eq!(
            parse_duration("1d12h"),
            Ok(Duration::DAY + Duration::HOUR * 12)
        );
        assert_eq!(
            parse_duration("3dunknown"),
            Err(ParseError::Invalid("unknown".to_string()))
        );
        // Day units are only recognised in the leading position.
        assert_eq!(
            parse_duration("1h2d"),
            Err(ParseError::UnknownUnit {
                unit: "d".to_string(),
                input: "1h2d".to_string(),
            })
        );
        assert_eq!(
            parse_duration("-2d"),
            Err(ParseError::UnknownUnit {
                unit: "d".to_string(),
                input: "-2d".to_string(),
            })
        );
    }

    #[test]
    fn test_day_prefix_overflow() {
        assert_eq!(
            parse_duration("106752d"),
            Err(ParseError::DayOverflow("106752".to_string()))
        );
        assert_eq!(
            parse_duration("99999999999999999999d"),
            Err(ParseError::DayOverflow("99999999999999999999".to_string()))
        );
        assert_eq!(
            parse_duration("106751d24h"),
            Err(ParseError::Overflow("24h".to_string()))
        );
    }
}
