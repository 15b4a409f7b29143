//! Time helpers with JSON- and text-friendly encodings.
//!
//! - [`Duration`]: signed nanosecond duration that serializes to a string
//!   (e.g., "1h30m0s") and deserializes from a string or a nanoseconds integer.
//!   Text input may start with a day component: "2d", "2d3h0m5s".
//! - [`Clock`]: current-time source, with [`SystemClock`] and [`FixedClock`].
//!
//! # Example
//!
//! ```rust
//! use giztoy_timex::Duration;
//!
//! // Duration serializes to string
//! let dur = Duration::HOUR + Duration::MINUTE * 30;
//! let json = serde_json::to_string(&dur).unwrap();
//! assert_eq!(json, "\"1h30m0s\"");
//!
//! // Days are accepted on input and expanded into hours on output
//! let dur: Duration = "2d3h".parse().unwrap();
//! assert_eq!(dur.to_string(), "51h0m0s");
//!
//! // Integers are read as nanoseconds
//! let dur: Duration = serde_json::from_str("1500000000").unwrap();
//! assert_eq!(dur.to_string(), "1.5s");
//! ```

mod clock;
mod duration;
mod error;
mod parse;

pub use clock::{Clock, FixedClock, SystemClock};
pub use duration::Duration;
pub use error::{DurationError, ParseError};
