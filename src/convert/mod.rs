//! Sample format conversion.
//!
//! The streaming path negotiates a wire format with the hardware and a
//! host format with the application, then asks the [`ConverterRegistry`]
//! for the best converter between the two and applies it per sample
//! block. Format knowledge lives here, not in the callers.
//!
//! Converters are pure, stateless `fn` items: identical inputs and scale
//! factor always produce identical outputs, nothing is retained between
//! calls, and each invocation works on disjoint caller-supplied buffers,
//! so they are safe to call concurrently from real-time streaming threads
//! without locking.

mod converters;
mod format;
mod pack;
mod registry;

pub use converters::PRIORITY_GENERAL;
pub use format::{ConverterId, SampleFormat};
pub use registry::ConverterRegistry;

use num_complex::{Complex32, Complex64};

use crate::error::{SdrError, SdrResult};

/// Signature of a sample-format converter.
///
/// A converter writes exactly `nsamps` converted samples on success. All
/// argument validation happens before any output is written, so a failed
/// call never reports partial success (output contents are unspecified
/// after an error).
pub type ConverterFn =
    fn(input: &SampleBuf<'_>, output: &mut SampleBufMut<'_>, nsamps: usize, scale_factor: f64) -> SdrResult<()>;

/// A borrowed, format-tagged input sample buffer.
#[derive(Clone, Copy, Debug)]
pub enum SampleBuf<'a> {
    /// Complex floating 64-bit samples.
    Fc64(&'a [Complex64]),
    /// Complex floating 32-bit samples.
    Fc32(&'a [Complex32]),
    /// Packed 32-bit wire words.
    Sc16(&'a [u32]),
    /// Packed 16-bit wire words.
    Sc8(&'a [u16]),
}

impl<'a> SampleBuf<'a> {
    /// Format tag of this buffer.
    pub fn format(&self) -> SampleFormat {
        match self {
            SampleBuf::Fc64(_) => SampleFormat::Fc64,
            SampleBuf::Fc32(_) => SampleFormat::Fc32,
            SampleBuf::Sc16(_) => SampleFormat::Sc16,
            SampleBuf::Sc8(_) => SampleFormat::Sc8,
        }
    }

    /// Number of samples in the buffer.
    pub fn len(&self) -> usize {
        match self {
            SampleBuf::Fc64(s) => s.len(),
            SampleBuf::Fc32(s) => s.len(),
            SampleBuf::Sc16(s) => s.len(),
            SampleBuf::Sc8(s) => s.len(),
        }
    }

    /// True when the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn mismatch(&self, expected: SampleFormat) -> SdrError {
        SdrError::BufferFormat {
            expected,
            found: self.format(),
        }
    }

    fn as_fc64(&self) -> SdrResult<&'a [Complex64]> {
        match self {
            SampleBuf::Fc64(s) => Ok(s),
            other => Err(other.mismatch(SampleFormat::Fc64)),
        }
    }

    fn as_fc32(&self) -> SdrResult<&'a [Complex32]> {
        match self {
            SampleBuf::Fc32(s) => Ok(s),
            other => Err(other.mismatch(SampleFormat::Fc32)),
        }
    }

    fn as_sc16(&self) -> SdrResult<&'a [u32]> {
        match self {
            SampleBuf::Sc16(s) => Ok(s),
            other => Err(other.mismatch(SampleFormat::Sc16)),
        }
    }

    fn as_sc8(&self) -> SdrResult<&'a [u16]> {
        match self {
            SampleBuf::Sc8(s) => Ok(s),
            other => Err(other.mismatch(SampleFormat::Sc8)),
        }
    }
}

/// A borrowed, format-tagged output sample buffer.
#[derive(Debug)]
pub enum SampleBufMut<'a> {
    /// Complex floating 64-bit samples.
    Fc64(&'a mut [Complex64]),
    /// Complex floating 32-bit samples.
    Fc32(&'a mut [Complex32]),
    /// Packed 32-bit wire words.
    Sc16(&'a mut [u32]),
    /// Packed 16-bit wire words.
    Sc8(&'a mut [u16]),
}

impl<'a> SampleBufMut<'a> {
    /// Format tag of this buffer.
    pub fn format(&self) -> SampleFormat {
        match self {
            SampleBufMut::Fc64(_) => SampleFormat::Fc64,
            SampleBufMut::Fc32(_) => SampleFormat::Fc32,
            SampleBufMut::Sc16(_) => SampleFormat::Sc16,
            SampleBufMut::Sc8(_) => SampleFormat::Sc8,
        }
    }

    /// Number of samples the buffer can hold.
    pub fn len(&self) -> usize {
        match self {
            SampleBufMut::Fc64(s) => s.len(),
            SampleBufMut::Fc32(s) => s.len(),
            SampleBufMut::Sc16(s) => s.len(),
            SampleBufMut::Sc8(s) => s.len(),
        }
    }

    /// True when the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn mismatch(&self, expected: SampleFormat) -> SdrError {
        SdrError::BufferFormat {
            expected,
            found: self.format(),
        }
    }

    fn as_fc64(&mut self) -> SdrResult<&mut [Complex64]> {
        match self {
            SampleBufMut::Fc64(s) => Ok(s),
            other => Err(other.mismatch(SampleFormat::Fc64)),
        }
    }

    fn as_fc32(&mut self) -> SdrResult<&mut [Complex32]> {
        match self {
            SampleBufMut::Fc32(s) => Ok(s),
            other => Err(other.mismatch(SampleFormat::Fc32)),
        }
    }

    fn as_sc16(&mut self) -> SdrResult<&mut [u32]> {
        match self {
            SampleBufMut::Sc16(s) => Ok(s),
            other => Err(other.mismatch(SampleFormat::Sc16)),
        }
    }

    fn as_sc8(&mut self) -> SdrResult<&mut [u16]> {
        match self {
            SampleBufMut::Sc8(s) => Ok(s),
            other => Err(other.mismatch(SampleFormat::Sc8)),
        }
    }
}

/// Slice the first `nsamps` samples of an input buffer, checking length.
fn take<T>(buf: &[T], nsamps: usize, format: SampleFormat) -> SdrResult<&[T]> {
    buf.get(..nsamps).ok_or(SdrError::BufferTooShort {
        format,
        needed: nsamps,
        got: buf.len(),
    })
}

/// Slice the first `nsamps` samples of an output buffer, checking length.
fn take_mut<T>(buf: &mut [T], nsamps: usize, format: SampleFormat) -> SdrResult<&mut [T]> {
    let got = buf.len();
    buf.get_mut(..nsamps).ok_or(SdrError::BufferTooShort {
        format,
        needed: nsamps,
        got,
    })
}
