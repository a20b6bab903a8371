//! Simulation time units and duration strings such as `"1000ns"`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Femtoseconds per picosecond.
pub const FS_PER_PS: u64 = 1_000;
/// Femtoseconds per nanosecond.
pub const FS_PER_NS: u64 = 1_000_000;
/// Femtoseconds per microsecond.
pub const FS_PER_US: u64 = 1_000_000_000;
/// Femtoseconds per millisecond.
pub const FS_PER_MS: u64 = 1_000_000_000_000;
/// Femtoseconds per second.
pub const FS_PER_S: u64 = 1_000_000_000_000_000;

/// A unit of simulated time. Femtoseconds are the kernel's base resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Femtoseconds.
    Fs,
    /// Picoseconds.
    Ps,
    /// Nanoseconds.
    #[default]
    Ns,
    /// Microseconds.
    Us,
    /// Milliseconds.
    Ms,
    /// Seconds.
    S,
}

impl TimeUnit {
    /// Number of femtoseconds in one unit.
    pub fn fs_per_unit(self) -> u64 {
        match self {
            TimeUnit::Fs => 1,
            TimeUnit::Ps => FS_PER_PS,
            TimeUnit::Ns => FS_PER_NS,
            TimeUnit::Us => FS_PER_US,
            TimeUnit::Ms => FS_PER_MS,
            TimeUnit::S => FS_PER_S,
        }
    }

    /// Converts `count` units to femtoseconds, saturating on overflow.
    pub fn to_fs(self, count: u64) -> u64 {
        count.saturating_mul(self.fs_per_unit())
    }

    /// The suffix used in duration strings.
    pub fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Fs => "fs",
            TimeUnit::Ps => "ps",
            TimeUnit::Ns => "ns",
            TimeUnit::Us => "us",
            TimeUnit::Ms => "ms",
            TimeUnit::S => "s",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for TimeUnit {
    type Err = ParseDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "fs" => Ok(TimeUnit::Fs),
            "ps" => Ok(TimeUnit::Ps),
            "ns" => Ok(TimeUnit::Ns),
            "us" => Ok(TimeUnit::Us),
            "ms" => Ok(TimeUnit::Ms),
            "s" => Ok(TimeUnit::S),
            "" => Err(ParseDurationError::MissingUnit(s.to_string())),
            other => Err(ParseDurationError::UnknownUnit(other.to_string())),
        }
    }
}

/// Errors produced when parsing a duration string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseDurationError {
    /// The input was empty or whitespace.
    #[error("empty duration string")]
    Empty,
    /// The input had no leading digits.
    #[error("invalid duration: no numeric value in '{0}'")]
    NoNumber(String),
    /// The numeric part did not fit in a `u64`.
    #[error("invalid number in duration '{0}'")]
    InvalidNumber(String),
    /// The input had digits but no unit.
    #[error("missing unit in duration '{0}' (use fs, ps, ns, us, ms, or s)")]
    MissingUnit(String),
    /// The unit suffix was not recognized.
    #[error("unknown duration unit '{0}' (use fs, ps, ns, us, ms, or s)")]
    UnknownUnit(String),
}

/// Parses a duration such as `"1000ns"` or `"10 ms"` into femtoseconds.
pub fn parse_duration(s: &str) -> Result<u64, ParseDurationError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ParseDurationError::Empty);
    }

    let digit_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if digit_end == 0 {
        return Err(ParseDurationError::NoNumber(s.to_string()));
    }

    let number: u64 = s[..digit_end]
        .parse()
        .map_err(|_| ParseDurationError::InvalidNumber(s.to_string()))?;

    let unit = match s[digit_end..].trim() {
        "" => return Err(ParseDurationError::MissingUnit(s.to_string())),
        u => u.parse::<TimeUnit>()?,
    };

    Ok(unit.to_fs(number))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_nanoseconds() {
        assert_eq!(parse_duration("1000ns").unwrap(), 1000 * FS_PER_NS);
    }

    #[test]
    fn parse_other_units() {
        assert_eq!(parse_duration("5us").unwrap(), 5 * FS_PER_US);
        assert_eq!(parse_duration("10ms").unwrap(), 10 * FS_PER_MS);
        assert_eq!(parse_duration("250ps").unwrap(), 250 * FS_PER_PS);
        assert_eq!(parse_duration("42fs").unwrap(), 42);
        assert_eq!(parse_duration("1s").unwrap(), FS_PER_S);
    }

    #[test]
    fn parse_with_whitespace() {
        assert_eq!(parse_duration("  50 ns  ").unwrap(), 50 * FS_PER_NS);
    }

    #[test]
    fn parse_zero() {
        assert_eq!(parse_duration("0ns").unwrap(), 0);
    }

    #[test]
    fn parse_errors() {
        assert_eq!(parse_duration(""), Err(ParseDurationError::Empty));
        assert!(matches!(
            parse_duration("ns"),
            Err(ParseDurationError::NoNumber(_))
        ));
        assert!(matches!(
            parse_duration("100"),
            Err(ParseDurationError::MissingUnit(_))
        ));
        assert!(matches!(
            parse_duration("100xyz"),
            Err(ParseDurationError::UnknownUnit(_))
        ));
    }

    #[test]
    fn error_display() {
        let err = parse_duration("100xyz").unwrap_err();
        assert!(err.to_string().contains("unknown duration unit 'xyz'"));
    }

    #[test]
    fn unit_roundtrip_through_suffix() {
        for unit in [
            TimeUnit::Fs,
            TimeUnit::Ps,
            TimeUnit::Ns,
            TimeUnit::Us,
            TimeUnit::Ms,
            TimeUnit::S,
        ] {
            assert_eq!(unit.suffix().parse::<TimeUnit>().unwrap(), unit);
        }
    }

    #[test]
    fn to_fs_saturates() {
        assert_eq!(TimeUnit::S.to_fs(u64::MAX), u64::MAX);
    }

    #[test]
    fn default_unit_is_ns() {
        assert_eq!(TimeUnit::default(), TimeUnit::Ns);
    }
}
