//! Text rendering of floating point values.
//!
//! Values are rounded to a number of significant digits (1 to 14) and written in one of
//! three display modes. The exponent marker is `E`, which the expression parser reads
//! back, so every rendered number is also valid input.

use num_complex::Complex;
use strum_macros::EnumIter;

pub const MIN_SIGNIFICANT_DIGITS: usize = 1;
pub const MAX_SIGNIFICANT_DIGITS: usize = 14;
pub const DEFAULT_SIGNIFICANT_DIGITS: usize = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter)]
pub enum DisplayMode {
    /// positional notation, scientific when the exponent gets out of range
    #[default]
    Decimal,
    /// one digit before the point and an exponent
    Scientific,
    /// exponent multiple of 3
    Engineering,
}

impl DisplayMode {
    pub fn from_name(name: &str) -> Option<DisplayMode> {
        match name.to_ascii_lowercase().as_str() {
            "decimal" | "auto" => Some(DisplayMode::Decimal),
            "scientific" => Some(DisplayMode::Scientific),
            "engineering" => Some(DisplayMode::Engineering),
            _ => None,
        }
    }
}

/// Significant digits and decimal exponent of `|value|` rounded to `digits` digits.
fn significant_digits(value: f64, digits: usize) -> (String, i32) {
    let formatted = format!("{:.*e}", digits - 1, value.abs());
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((&formatted, "0"));
    let exponent = exponent.parse::<i32>().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();
    let trimmed = digits.trim_end_matches('0');
    let trimmed = if trimmed.is_empty() { "0" } else { trimmed };
    (trimmed.to_string(), exponent)
}

/// Writes `digits` (an implicit `d.ddd` mantissa) with the point moved `exponent` places.
fn positional(digits: &str, exponent: i32) -> String {
    if exponent >= 0 {
        let point = exponent as usize + 1;
        if digits.len() <= point {
            format!("{}{}", digits, "0".repeat(point - digits.len()))
        } else {
            format!("{}.{}", &digits[..point], &digits[point..])
        }
    } else {
        format!("0.{}{}", "0".repeat((-exponent - 1) as usize), digits)
    }
}

fn with_exponent(mantissa: String, exponent: i32) -> String {
    format!("{}E{}", mantissa, exponent)
}

/// Text of `value` in `mode` with `significant_digits` digits (clamped to 1..=14).
pub fn float_to_text(value: f64, mode: DisplayMode, significant_digits_count: usize) -> String {
    if value.is_nan() {
        return "undef".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let count = significant_digits_count.clamp(MIN_SIGNIFICANT_DIGITS, MAX_SIGNIFICANT_DIGITS);
    let (digits, exponent) = significant_digits(value, count);
    let sign = if value < 0.0 { "-" } else { "" };
    let body = match mode {
        DisplayMode::Decimal => {
            if exponent >= count as i32 || exponent < -4 {
                with_exponent(positional(&digits, 0), exponent)
            } else {
                positional(&digits, exponent)
            }
        }
        DisplayMode::Scientific => with_exponent(positional(&digits, 0), exponent),
        DisplayMode::Engineering => {
            let shift = exponent.rem_euclid(3);
            let mantissa = positional(&digits, shift);
            if exponent - shift == 0 {
                mantissa
            } else {
                with_exponent(mantissa, exponent - shift)
            }
        }
    };
    format!("{}{}", sign, body)
}

/// Text of a complex value: `a`, `b*i` or `a+b*i`.
pub fn complex_to_text(c: Complex<f64>, mode: DisplayMode, significant_digits_count: usize) -> String {
    let re = float_to_text(c.re, mode, significant_digits_count);
    if c.im == 0.0 {
        return re;
    }
    let im = match float_to_text(c.im.abs(), mode, significant_digits_count).as_str() {
        "1" => "i".to_string(),
        other => format!("{}*i", other),
    };
    match (c.re == 0.0, c.im < 0.0) {
        (true, false) => im,
        (true, true) => format!("-{}", im),
        (false, false) => format!("{}+{}", re, im),
        (false, true) => format!("{}-{}", re, im),
    }
}
