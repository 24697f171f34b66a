//! Sample format tags.
//!
//! Four fixed packed representations move through the streaming path. The
//! floating formats are the host-side representations; the fixed formats
//! are the wire/hardware representations, with both complex components
//! packed into a single word (real in the high half, imaginary in the
//! low half).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SdrError;

/// One of the four supported packed sample representations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// Complex floating 64-bit components (16 bytes per sample).
    Fc64,
    /// Complex floating 32-bit components (8 bytes per sample).
    Fc32,
    /// Complex signed 16-bit components packed into a 32-bit word
    /// (4 bytes per sample): real in bits 31..16, imaginary in bits 15..0.
    Sc16,
    /// Complex signed 8-bit components packed into a 16-bit word
    /// (2 bytes per sample): real in bits 15..8, imaginary in bits 7..0.
    Sc8,
}

impl SampleFormat {
    /// Width of one sample in bytes. The buffer size contract is
    /// `byte_length == n * bytes_per_sample()`.
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::Fc64 => 16,
            SampleFormat::Fc32 => 8,
            SampleFormat::Sc16 => 4,
            SampleFormat::Sc8 => 2,
        }
    }

    /// Stable short name of the format.
    pub fn as_str(self) -> &'static str {
        match self {
            SampleFormat::Fc64 => "fc64",
            SampleFormat::Fc32 => "fc32",
            SampleFormat::Sc16 => "sc16",
            SampleFormat::Sc8 => "sc8",
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SampleFormat {
    type Err = SdrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fc64" => Ok(SampleFormat::Fc64),
            "fc32" => Ok(SampleFormat::Fc32),
            "sc16" => Ok(SampleFormat::Sc16),
            "sc8" => Ok(SampleFormat::Sc8),
            other => Err(SdrError::UnknownFormat(other.to_string())),
        }
    }
}

/// Identity of a conversion: the (input, output) format pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConverterId {
    /// Format of the input buffer.
    pub input: SampleFormat,
    /// Format of the output buffer.
    pub output: SampleFormat,
}

impl ConverterId {
    /// Build an id from the format pair.
    pub const fn new(input: SampleFormat, output: SampleFormat) -> Self {
        Self { input, output }
    }
}

impl fmt::Display for ConverterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.input, self.output)
    }
}
