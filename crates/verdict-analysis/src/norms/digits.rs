//! Number of differing significant digits between two values.

use verdict_core::constants::NORMS_SIGNIFICANT_DIGITS;

/// Digits that differ between `test` and `reference` when both are written
/// with [`NORMS_SIGNIFICANT_DIGITS`] significant digits.
pub fn differing_digits(test: f64, reference: f64) -> u32 {
    differing_digits_on(test, reference, NORMS_SIGNIFICANT_DIGITS)
}

/// Same as [`differing_digits`] on `significant` digits.
///
/// Identical renderings give 0. A different sign or exponent gives all the
/// digits, else the count runs from the first differing mantissa digit to
/// the last one.
pub fn differing_digits_on(test: f64, reference: f64, significant: u32) -> u32 {
    if test == reference || (test.is_nan() && reference.is_nan()) {
        return 0;
    }
    if !test.is_finite() || !reference.is_finite() || significant == 0 {
        return significant;
    }
    let precision = (significant - 1) as usize;
    let t = format!("{test:.precision$e}");
    let r = format!("{reference:.precision$e}");
    if t == r {
        return 0;
    }
    let (Some((t_mantissa, t_exp)), Some((r_mantissa, r_exp))) = (t.split_once('e'), r.split_once('e'))
    else {
        return significant;
    };
    if t_exp != r_exp || t_mantissa.starts_with('-') != r_mantissa.starts_with('-') {
        return significant;
    }
    let t_digits = t_mantissa.chars().filter(char::is_ascii_digit);
    let r_digits = r_mantissa.chars().filter(char::is_ascii_digit);
    match t_digits.zip(r_digits).position(|(a, b)| a != b) {
        Some(first) => significant.saturating_sub(first as u32),
        None => 0,
    }
}
