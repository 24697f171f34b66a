//! Built-in converter functions and the default registration table.
//!
//! One general-purpose converter exists for each direction between the
//! host floating formats (fc64, fc32) and the wire fixed formats (sc16,
//! sc8). They all share the same shape: check the buffer variants, slice
//! `nsamps` off each side, then run the word-level pack/unpack math per
//! sample.
//!
//! Registration is an explicit, compiled-in table consumed by
//! [`ConverterRegistry::with_defaults`](super::ConverterRegistry::with_defaults);
//! nothing registers itself as a side effect of loading, so dispatch never
//! depends on link or initialization order. Accelerated variants (SIMD or
//! offloaded) would be added to the table at a higher priority.

use super::format::{ConverterId, SampleFormat};
use super::{pack, take, take_mut, ConverterFn, SampleBuf, SampleBufMut};
use crate::error::SdrResult;

/// Priority of the portable, unoptimized converters.
pub const PRIORITY_GENERAL: i32 = 0;

/// The compiled-in registration table: name, format pair, function,
/// priority.
pub(super) const DEFAULT_CONVERTERS: &[(&str, ConverterId, ConverterFn, i32)] = &[
    (
        "fc64_to_sc16",
        ConverterId::new(SampleFormat::Fc64, SampleFormat::Sc16),
        fc64_to_sc16,
        PRIORITY_GENERAL,
    ),
    (
        "sc16_to_fc64",
        ConverterId::new(SampleFormat::Sc16, SampleFormat::Fc64),
        sc16_to_fc64,
        PRIORITY_GENERAL,
    ),
    (
        "fc32_to_sc16",
        ConverterId::new(SampleFormat::Fc32, SampleFormat::Sc16),
        fc32_to_sc16,
        PRIORITY_GENERAL,
    ),
    (
        "sc16_to_fc32",
        ConverterId::new(SampleFormat::Sc16, SampleFormat::Fc32),
        sc16_to_fc32,
        PRIORITY_GENERAL,
    ),
    (
        "fc64_to_sc8",
        ConverterId::new(SampleFormat::Fc64, SampleFormat::Sc8),
        fc64_to_sc8,
        PRIORITY_GENERAL,
    ),
    (
        "sc8_to_fc64",
        ConverterId::new(SampleFormat::Sc8, SampleFormat::Fc64),
        sc8_to_fc64,
        PRIORITY_GENERAL,
    ),
    (
        "fc32_to_sc8",
        ConverterId::new(SampleFormat::Fc32, SampleFormat::Sc8),
        fc32_to_sc8,
        PRIORITY_GENERAL,
    ),
    (
        "sc8_to_fc32",
        ConverterId::new(SampleFormat::Sc8, SampleFormat::Fc32),
        sc8_to_fc32,
        PRIORITY_GENERAL,
    ),
];

fn fc64_to_sc16(
    input: &SampleBuf<'_>,
    output: &mut SampleBufMut<'_>,
    nsamps: usize,
    scale_factor: f64,
) -> SdrResult<()> {
    let src = take(input.as_fc64()?, nsamps, SampleFormat::Fc64)?;
    let dst = take_mut(output.as_sc16()?, nsamps, SampleFormat::Sc16)?;
    for (d, s) in dst.iter_mut().zip(src) {
        *d = pack::fc64_to_item32(*s, scale_factor);
    }
    Ok(())
}

fn sc16_to_fc64(
    input: &SampleBuf<'_>,
    output: &mut SampleBufMut<'_>,
    nsamps: usize,
    scale_factor: f64,
) -> SdrResult<()> {
    let src = take(input.as_sc16()?, nsamps, SampleFormat::Sc16)?;
    let dst = take_mut(output.as_fc64()?, nsamps, SampleFormat::Fc64)?;
    for (d, s) in dst.iter_mut().zip(src) {
        *d = pack::item32_to_fc64(*s, scale_factor);
    }
    Ok(())
}

fn fc32_to_sc16(
    input: &SampleBuf<'_>,
    output: &mut SampleBufMut<'_>,
    nsamps: usize,
    scale_factor: f64,
) -> SdrResult<()> {
    let src = take(input.as_fc32()?, nsamps, SampleFormat::Fc32)?;
    let dst = take_mut(output.as_sc16()?, nsamps, SampleFormat::Sc16)?;
    let scale = scale_factor as f32;
    for (d, s) in dst.iter_mut().zip(src) {
        *d = pack::fc32_to_item32(*s, scale);
    }
    Ok(())
}

fn sc16_to_fc32(
    input: &SampleBuf<'_>,
    output: &mut SampleBufMut<'_>,
    nsamps: usize,
    scale_factor: f64,
) -> SdrResult<()> {
    let src = take(input.as_sc16()?, nsamps, SampleFormat::Sc16)?;
    let dst = take_mut(output.as_fc32()?, nsamps, SampleFormat::Fc32)?;
    let scale = scale_factor as f32;
    for (d, s) in dst.iter_mut().zip(src) {
        *d = pack::item32_to_fc32(*s, scale);
    }
    Ok(())
}

fn fc64_to_sc8(
    input: &SampleBuf<'_>,
    output: &mut SampleBufMut<'_>,
    nsamps: usize,
    scale_factor: f64,
) -> SdrResult<()> {
    let src = take(input.as_fc64()?, nsamps, SampleFormat::Fc64)?;
    let dst = take_mut(output.as_sc8()?, nsamps, SampleFormat::Sc8)?;
    for (d, s) in dst.iter_mut().zip(src) {
        *d = pack::fc64_to_item16(*s, scale_factor);
    }
    Ok(())
}

fn sc8_to_fc64(
    input: &SampleBuf<'_>,
    output: &mut SampleBufMut<'_>,
    nsamps: usize,
    scale_factor: f64,
) -> SdrResult<()> {
    let src = take(input.as_sc8()?, nsamps, SampleFormat::Sc8)?;
    let dst = take_mut(output.as_fc64()?, nsamps, SampleFormat::Fc64)?;
    for (d, s) in dst.iter_mut().zip(src) {
        *d = pack::item16_to_fc64(*s, scale_factor);
    }
    Ok(())
}

fn fc32_to_sc8(
    input: &SampleBuf<'_>,
    output: &mut SampleBufMut<'_>,
    nsamps: usize,
    scale_factor: f64,
) -> SdrResult<()> {
    let src = take(input.as_fc32()?, nsamps, SampleFormat::Fc32)?;
    let dst = take_mut(output.as_sc8()?, nsamps, SampleFormat::Sc8)?;
    let scale = scale_factor as f32;
    for (d, s) in dst.iter_mut().zip(src) {
        *d = pack::fc32_to_item16(*s, scale);
    }
    Ok(())
}

fn sc8_to_fc32(
    input: &SampleBuf<'_>,
    output: &mut SampleBufMut<'_>,
    nsamps: usize,
    scale_factor: f64,
) -> SdrResult<()> {
    let src = take(input.as_sc8()?, nsamps, SampleFormat::Sc8)?;
    let dst = take_mut(output.as_fc32()?, nsamps, SampleFormat::Fc32)?;
    let scale = scale_factor as f32;
    for (d, s) in dst.iter_mut().zip(src) {
        *d = pack::item16_to_fc32(*s, scale);
    }
    Ok(())
}
