use crate::error::{Error, TrackerResult};
use error_stack::{ResultExt, report};
use rust_decimal::Decimal;

/// Parses a user-entered decimal amount into base units. Fraction digits
/// beyond `decimals` are truncated.
pub fn decimal_string_to_u128(s: &str, decimals: u8) -> TrackerResult<u128> {
    let s = s.trim();
    let (integer_str, decimal_str) = match s.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (s, ""),
    };

    if integer_str.is_empty() && decimal_str.is_empty() {
        return Err(report!(Error::ParseError).attach_printable(format!("Empty amount: {s:?}")));
    }
    let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(integer_str) || !is_digits(decimal_str) {
        return Err(report!(Error::ParseError).attach_printable(format!("Invalid amount: {s:?}")));
    }

    let decimals: usize = decimals.into();
    let integer_part = if integer_str.is_empty() {
        0
    } else {
        integer_str
            .parse::<u128>()
            .change_context(Error::ParseError)
            .attach_printable_lazy(|| format!("Amount too large: {s:?}"))?
    };

    let trimmed = if decimal_str.len() > decimals {
        &decimal_str[..decimals]
    } else {
        decimal_str
    };
    let decimal_part = if trimmed.is_empty() {
        Some(0)
    } else {
        let value = trimmed.parse::<u128>().change_context(Error::ParseError)?;
        10u128
            .checked_pow((decimals - trimmed.len()) as u32)
            .and_then(|padding| value.checked_mul(padding))
    };

    10u128
        .checked_pow(decimals as u32)
        .and_then(|scale| integer_part.checked_mul(scale))
        .zip(decimal_part)
        .and_then(|(scaled, fraction)| scaled.checked_add(fraction))
        .ok_or_else(|| {
            report!(Error::ParseError).attach_printable(format!("Amount too large: {s:?}"))
        })
}

/// Renders base units with `decimals` precision. Trailing zeros are dropped
/// but at least one fraction digit is kept, so `100000000` at 8 decimals
/// reads `1.0`.
pub fn format_units(amount: u128, decimals: u8) -> TrackerResult<String> {
    let mantissa = i128::try_from(amount)
        .change_context(Error::ParseError)
        .attach_printable("Amount does not fit a signed 128-bit integer")?;
    let value = Decimal::try_from_i128_with_scale(mantissa, decimals.into())
        .change_context(Error::ParseError)
        .attach_printable_lazy(|| format!("Cannot scale {amount} by {decimals} decimals"))?
        .normalize();

    let formatted = value.to_string();
    if formatted.contains('.') {
        Ok(formatted)
    } else {
        Ok(format!("{formatted}.0"))
    }
}
