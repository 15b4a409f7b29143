//! Error types for duration parsing and decoding.

use thiserror::Error;

/// Error returned when text does not follow the duration grammar.
///
/// Every variant carries the text the grammar was given. When the input has
/// a leading day component (`3d...`), that prefix is already consumed, so the
/// error names only the remainder that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Empty text, a component without digits, or an integer overflow.
    #[error("invalid duration {0:?}")]
    Invalid(String),

    /// A number was not followed by a unit.
    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    /// A unit outside ns, us, µs, ms, s, m, h.
    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },

    /// The leading day count does not fit in a duration.
    #[error("invalid day count {0:?} in duration")]
    DayOverflow(String),

    /// Days plus the remainder exceed the duration range.
    #[error("duration {0:?} overflows after adding days")]
    Overflow(String),
}

impl ParseError {
    /// Returns the substring the error refers to.
    pub fn input(&self) -> &str {
        match self {
            ParseError::Invalid(s)
            | ParseError::MissingUnit(s)
            | ParseError::DayOverflow(s)
            | ParseError::Overflow(s) => s,
            ParseError::UnknownUnit { input, .. } => input,
        }
    }
}

/// Errors returned by the text and JSON decoding entry points.
#[derive(Debug, Error)]
pub enum DurationError {
    /// Text does not follow the duration grammar.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The JSON value has no duration interpretation (object, array, bool, null).
    #[error("invalid type for duration: {0}")]
    Type(String),

    /// A number that is not an exact nanosecond count, or a value outside the
    /// range of the target type.
    #[error("duration out of range: {0}")]
    Range(String),

    /// Malformed JSON, surfaced from the decoder unchanged.
    #[error(transparent)]
    Syntax(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::Invalid("unknown".to_string());
        assert_eq!(err.to_string(), r#"invalid duration "unknown""#);

        let err = ParseError::UnknownUnit {
            unit: "d".to_string(),
            input: "1.5d".to_string(),
        };
        assert_eq!(err.to_string(), r#"unknown unit "d" in duration "1.5d""#);
        assert_eq!(err.input(), "1.5d");
    }

    #[test]
    fn test_duration_error_transparent() {
        let err = DurationError::from(ParseError::MissingUnit("12".to_string()));
        assert_eq!(err.to_string(), r#"missing unit in duration "12""#);
        assert!(matches!(err, DurationError::Parse(ParseError::MissingUnit(_))));
    }
}
