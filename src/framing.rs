//! Bit-level line encoding: data bits, parity and stop bits.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteSize {
    Five,
    Six,
    Seven,
    Eight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
    Mark,
    Space,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    OnePointFive,
    Two,
}

/// Rejected spelling of a framing parameter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {what} '{value}', expected one of {expected}")]
pub struct FramingParseError {
    what: &'static str,
    value: String,
    expected: &'static str,
}

impl FramingParseError {
    fn new(what: &'static str, value: &str, expected: &'static str) -> Self {
        FramingParseError {
            what,
            value: value.to_string(),
            expected,
        }
    }
}

impl FromStr for ByteSize {
    type Err = FramingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "5" => Ok(ByteSize::Five),
            "6" => Ok(ByteSize::Six),
            "7" => Ok(ByteSize::Seven),
            "8" => Ok(ByteSize::Eight),
            other => Err(FramingParseError::new("byte size", other, "5, 6, 7, 8")),
        }
    }
}

impl FromStr for Parity {
    type Err = FramingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "N" => Ok(Parity::None),
            "E" => Ok(Parity::Even),
            "O" => Ok(Parity::Odd),
            "M" => Ok(Parity::Mark),
            "S" => Ok(Parity::Space),
            other => Err(FramingParseError::new("parity", other, "N, E, O, M, S")),
        }
    }
}

impl FromStr for StopBits {
    type Err = FramingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" | "1.0" => Ok(StopBits::One),
            "1.5" => Ok(StopBits::OnePointFive),
            "2" | "2.0" => Ok(StopBits::Two),
            other => Err(FramingParseError::new("stop bits", other, "1, 1.5, 2")),
        }
    }
}

impl Display for ByteSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let bits = match self {
            ByteSize::Five => 5,
            ByteSize::Six => 6,
            ByteSize::Seven => 7,
            ByteSize::Eight => 8,
        };
        write!(f, "{}", bits)
    }
}

impl Display for Parity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let letter = match self {
            Parity::None => "N",
            Parity::Even => "E",
            Parity::Odd => "O",
            Parity::Mark => "M",
            Parity::Space => "S",
        };
        f.write_str(letter)
    }
}

impl Display for StopBits {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StopBits::One => f.write_str("1"),
            StopBits::OnePointFive => f.write_str("1.5"),
            StopBits::Two => f.write_str("2"),
        }
    }
}

/// Framing of a serial line. Defaults to 8-N-1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Framing {
    pub byte_size: ByteSize,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl Default for Framing {
    fn default() -> Self {
        Framing {
            byte_size: ByteSize::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl Framing {
    /// Applies the given overrides on top of 8-N-1.
    pub fn with_overrides(
        byte_size: Option<ByteSize>,
        parity: Option<Parity>,
        stop_bits: Option<StopBits>,
    ) -> Framing {
        let base = Framing::default();
        Framing {
            byte_size: byte_size.unwrap_or(base.byte_size),
            parity: parity.unwrap_or(base.parity),
            stop_bits: stop_bits.unwrap_or(base.stop_bits),
        }
    }
}

impl Display for Framing {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.byte_size, self.parity, self.stop_bits)
    }
}
