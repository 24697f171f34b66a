//! Converter registry dispatch and numeric behavior of the packed
//! wire formats.

use num_complex::{Complex32, Complex64};
use rust_sdr::convert::{ConverterId, ConverterRegistry, SampleBuf, SampleBufMut, PRIORITY_GENERAL};
use rust_sdr::{SampleFormat, SdrError, SdrResult};

fn marker_converter(
    _: &SampleBuf<'_>,
    output: &mut SampleBufMut<'_>,
    _: usize,
    _: f64,
) -> SdrResult<()> {
    if let SampleBufMut::Sc16(words) = output {
        words[0] = 0xDEAD_BEEF;
    }
    Ok(())
}

#[test]
fn float_to_fixed_truncates_toward_zero() {
    let reg = ConverterRegistry::with_defaults().unwrap();
    let src = [
        Complex64::new(1.9999, -1.9999),
        Complex64::new(0.5, -0.5),
        Complex64::new(0.0, 0.0),
    ];
    let mut dst = [0u32; 3];
    reg.convert(
        SampleFormat::Fc64,
        SampleFormat::Sc16,
        &SampleBuf::Fc64(&src),
        &mut SampleBufMut::Sc16(&mut dst),
        3,
        1.0,
    )
    .unwrap();
    // 1.9999 truncates to 1, never rounds to 2
    assert_eq!(dst[0], 0x0001_FFFF);
    assert_eq!(dst[1], 0x0000_0000);
    assert_eq!(dst[2], 0x0000_0000);
}

#[test]
fn fixed_to_float_recovers_packed_components() {
    let reg = ConverterRegistry::with_defaults().unwrap();
    let src = [0x0010_0020u32, 0xFFFF_FFFEu32];
    let mut dst = [Complex64::new(0.0, 0.0); 2];
    reg.convert(
        SampleFormat::Sc16,
        SampleFormat::Fc64,
        &SampleBuf::Sc16(&src),
        &mut SampleBufMut::Fc64(&mut dst),
        2,
        1.0,
    )
    .unwrap();
    assert_eq!(dst[0], Complex64::new(16.0, 32.0));
    // two's-complement components sign-extend
    assert_eq!(dst[1], Complex64::new(-1.0, -2.0));
}

#[test]
fn full_scale_round_trip_stays_within_a_ulp() {
    let reg = ConverterRegistry::with_defaults().unwrap();
    let scale = 32767.0;
    let src = [Complex64::new(1.0, -1.0), Complex64::new(0.25, 0.75)];
    let mut wire = [0u32; 2];
    reg.convert(
        SampleFormat::Fc64,
        SampleFormat::Sc16,
        &SampleBuf::Fc64(&src),
        &mut SampleBufMut::Sc16(&mut wire),
        2,
        scale,
    )
    .unwrap();
    assert_eq!(wire[0], 0x7FFF_8001);

    let mut back = [Complex64::new(0.0, 0.0); 2];
    reg.convert(
        SampleFormat::Sc16,
        SampleFormat::Fc64,
        &SampleBuf::Sc16(&wire),
        &mut SampleBufMut::Fc64(&mut back),
        2,
        1.0 / scale,
    )
    .unwrap();
    for (orig, rt) in src.iter().zip(&back) {
        // truncation plus one quantization step
        assert!((orig.re - rt.re).abs() <= 1.0 / scale, "{orig} vs {rt}");
        assert!((orig.im - rt.im).abs() <= 1.0 / scale, "{orig} vs {rt}");
    }
}

#[test]
fn narrow_wire_format_truncates_to_eight_bits() {
    let reg = ConverterRegistry::with_defaults().unwrap();
    let src = [Complex32::new(2.0, 3.0)];
    let mut dst = [0u16; 1];
    reg.convert(
        SampleFormat::Fc32,
        SampleFormat::Sc8,
        &SampleBuf::Fc32(&src),
        &mut SampleBufMut::Sc8(&mut dst),
        1,
        1.0,
    )
    .unwrap();
    assert_eq!(dst[0], 0x0203);

    let src = [0xFF80u16];
    let mut back = [Complex32::new(0.0, 0.0); 1];
    reg.convert(
        SampleFormat::Sc8,
        SampleFormat::Fc32,
        &SampleBuf::Sc8(&src),
        &mut SampleBufMut::Fc32(&mut back),
        1,
        1.0,
    )
    .unwrap();
    assert_eq!(back[0], Complex32::new(-1.0, -128.0));
}

#[test]
fn short_buffers_fail_before_any_output_is_written() {
    let reg = ConverterRegistry::with_defaults().unwrap();
    let src = [Complex64::new(0.5, 0.5); 8];
    let mut dst = [0u32; 4];
    let err = reg
        .convert(
            SampleFormat::Fc64,
            SampleFormat::Sc16,
            &SampleBuf::Fc64(&src),
            &mut SampleBufMut::Sc16(&mut dst),
            8,
            1.0,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        SdrError::BufferTooShort { needed: 8, got: 4, .. }
    ));
    assert_eq!(dst, [0u32; 4]);
}

#[test]
fn unknown_pair_reports_converter_not_found() {
    let reg = ConverterRegistry::with_defaults().unwrap();
    let err = reg
        .get_converter(SampleFormat::Fc64, SampleFormat::Fc64)
        .unwrap_err();
    assert!(matches!(err, SdrError::ConverterNotFound { .. }));
}

#[test]
fn registering_a_taken_name_fails() {
    let mut reg = ConverterRegistry::with_defaults().unwrap();
    let err = reg
        .register(
            "fc32_to_sc16",
            ConverterId::new(SampleFormat::Fc32, SampleFormat::Sc16),
            marker_converter,
            PRIORITY_GENERAL,
        )
        .unwrap_err();
    assert!(matches!(err, SdrError::DuplicateName { .. }));
}

#[test]
fn higher_priority_converter_overrides_the_default() {
    let mut reg = ConverterRegistry::with_defaults().unwrap();
    reg.register(
        "fc32_to_sc16_simd",
        ConverterId::new(SampleFormat::Fc32, SampleFormat::Sc16),
        marker_converter,
        PRIORITY_GENERAL + 10,
    )
    .unwrap();

    let src = [Complex32::new(0.0, 0.0)];
    let mut dst = [0u32; 1];
    reg.convert(
        SampleFormat::Fc32,
        SampleFormat::Sc16,
        &SampleBuf::Fc32(&src),
        &mut SampleBufMut::Sc16(&mut dst),
        1,
        1.0,
    )
    .unwrap();
    assert_eq!(dst[0], 0xDEAD_BEEF);

    // the default stays registered under its own name
    assert!(reg.describe("fc32_to_sc16").is_some());
}
