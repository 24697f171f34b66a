//! Word-level pack/unpack math.
//!
//! Fixed-point wire words store two's-complement real and imaginary
//! components in one word: bits 31..16 / 15..0 for the 32-bit word,
//! bits 15..8 / 7..0 for the 16-bit word.
//!
//! Float to fixed computes each component as
//! `truncate_toward_zero(float * scale_factor)` — truncation, not
//! rounding, to stay bit-exact with the hardware's legacy contract — and
//! truncates it to the word's component width on pack. Fixed to float
//! sign-extends each component to its native width and multiplies by the
//! same (caller-directional, never inverted) scale factor.

use num_complex::{Complex32, Complex64};

/// Pack an fc64 sample into a 32-bit wire word.
pub(crate) fn fc64_to_item32(sample: Complex64, scale: f64) -> u32 {
    let re = (sample.re * scale) as i16;
    let im = (sample.im * scale) as i16;
    (u32::from(re as u16) << 16) | u32::from(im as u16)
}

/// Unpack a 32-bit wire word into an fc64 sample.
pub(crate) fn item32_to_fc64(item: u32, scale: f64) -> Complex64 {
    Complex64::new(
        f64::from((item >> 16) as i16) * scale,
        f64::from(item as u16 as i16) * scale,
    )
}

/// Pack an fc32 sample into a 32-bit wire word.
pub(crate) fn fc32_to_item32(sample: Complex32, scale: f32) -> u32 {
    let re = (sample.re * scale) as i16;
    let im = (sample.im * scale) as i16;
    (u32::from(re as u16) << 16) | u32::from(im as u16)
}

/// Unpack a 32-bit wire word into an fc32 sample.
pub(crate) fn item32_to_fc32(item: u32, scale: f32) -> Complex32 {
    Complex32::new(
        f32::from((item >> 16) as i16) * scale,
        f32::from(item as u16 as i16) * scale,
    )
}

/// Pack an fc64 sample into a 16-bit wire word. Components are truncated
/// to 8 bits on pack.
pub(crate) fn fc64_to_item16(sample: Complex64, scale: f64) -> u16 {
    let re = (sample.re * scale) as i16;
    let im = (sample.im * scale) as i16;
    (u16::from(re as u8) << 8) | u16::from(im as u8)
}

/// Unpack a 16-bit wire word into an fc64 sample. Components are
/// sign-extended from 8 bits.
pub(crate) fn item16_to_fc64(item: u16, scale: f64) -> Complex64 {
    Complex64::new(
        f64::from((item >> 8) as u8 as i8) * scale,
        f64::from(item as u8 as i8) * scale,
    )
}

/// Pack an fc32 sample into a 16-bit wire word.
pub(crate) fn fc32_to_item16(sample: Complex32, scale: f32) -> u16 {
    let re = (sample.re * scale) as i16;
    let im = (sample.im * scale) as i16;
    (u16::from(re as u8) << 8) | u16::from(im as u8)
}

/// Unpack a 16-bit wire word into an fc32 sample.
pub(crate) fn item16_to_fc32(item: u16, scale: f32) -> Complex32 {
    Complex32::new(
        f32::from((item >> 8) as u8 as i8) * scale,
        f32::from(item as u8 as i8) * scale,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_to_fixed_truncates_toward_zero() {
        let w = fc64_to_item32(Complex64::new(1.9999, -1.9999), 1.0);
        assert_eq!((w >> 16) as i16, 1);
        assert_eq!(w as u16 as i16, -1);
    }

    #[test]
    fn item32_layout_matches_the_wire() {
        // real 16 in bits 31..16, imaginary 32 in bits 15..0
        assert_eq!(fc64_to_item32(Complex64::new(16.0, 32.0), 1.0), 0x0010_0020);
        assert_eq!(item32_to_fc64(0x0010_0020, 1.0), Complex64::new(16.0, 32.0));
    }

    #[test]
    fn negative_components_are_twos_complement() {
        let w = fc64_to_item32(Complex64::new(-1.0, -2.0), 1.0);
        assert_eq!(w, 0xFFFF_FFFE);
        assert_eq!(item32_to_fc64(w, 1.0), Complex64::new(-1.0, -2.0));
    }

    #[test]
    fn item16_truncates_components_to_eight_bits() {
        // 0x0102 truncates to 0x02, 0x0203 truncates to 0x03
        let w = fc64_to_item16(Complex64::new(258.0, 515.0), 1.0);
        assert_eq!(w, 0x0203);
    }

    #[test]
    fn item16_sign_extends_from_eight_bits() {
        let w = fc64_to_item16(Complex64::new(-1.0, -128.0), 1.0);
        assert_eq!(w, 0xFF80);
        assert_eq!(item16_to_fc64(w, 1.0), Complex64::new(-1.0, -128.0));
    }

    #[test]
    fn scale_factor_applies_symmetrically() {
        // pack with the amplitude scale, unpack with its reciprocal:
        // that directional pairing is the caller's contract
        let w = fc32_to_item32(Complex32::new(0.5, -0.25), 32767.0);
        let s = item32_to_fc32(w, 1.0 / 32767.0);
        assert!((s.re - 0.5).abs() < 1.0 / 32767.0);
        assert!((s.im + 0.25).abs() < 1.0 / 32767.0);
    }
}
