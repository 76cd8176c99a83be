//! Exact number helpers used by the reduction rules.
//!
//! All arithmetic on `Rational64` is checked: an overflow returns `None` and the
//! caller keeps the expression unevaluated instead of producing a wrong exact value.

use num::integer::Roots;
use num::rational::Rational64;
use num_traits::{CheckedAdd, CheckedMul, One, Signed, ToPrimitive, Zero};

/// Sum of rationals, `None` on overflow.
pub fn checked_sum<'a, I>(values: I) -> Option<Rational64>
where
    I: IntoIterator<Item = &'a Rational64>,
{
    values
        .into_iter()
        .try_fold(Rational64::zero(), |acc, v| acc.checked_add(v))
}

/// Product of rationals, `None` on overflow.
pub fn checked_product<'a, I>(values: I) -> Option<Rational64>
where
    I: IntoIterator<Item = &'a Rational64>,
{
    values
        .into_iter()
        .try_fold(Rational64::one(), |acc, v| acc.checked_mul(v))
}

/// `base ^ exponent` for an integer exponent.
///
/// Returns `None` on overflow and for `0 ^ negative`.
pub fn rational_pow(base: Rational64, exponent: i64) -> Option<Rational64> {
    if exponent < 0 {
        if base.is_zero() {
            return None;
        }
        return rational_pow(base.recip(), exponent.checked_neg()?);
    }
    let mut result = Rational64::one();
    let mut factor = base;
    let mut remaining = exponent as u64;
    while remaining > 0 {
        if remaining & 1 == 1 {
            result = result.checked_mul(&factor)?;
        }
        remaining >>= 1;
        if remaining > 0 {
            factor = factor.checked_mul(&factor)?;
        }
    }
    Some(result)
}

/// Largest argument for which `n!` fits in an `i64`.
pub const MAX_EXACT_FACTORIAL: i64 = 20;

pub fn factorial(n: i64) -> Option<i64> {
    if !(0..=MAX_EXACT_FACTORIAL).contains(&n) {
        return None;
    }
    (1..=n).try_fold(1i64, |acc, k| acc.checked_mul(k))
}

/// Exact `k`-th root of a non-negative integer, if it is a perfect power.
pub fn exact_integer_root(n: i64, k: u32) -> Option<i64> {
    if n < 0 || k == 0 {
        return None;
    }
    let root = n.nth_root(k);
    let back = (0..k).try_fold(1i64, |acc, _| acc.checked_mul(root))?;
    (back == n).then_some(root)
}

/// Exact `k`-th root of a non-negative rational, if numerator and denominator are both
/// perfect powers.
pub fn exact_rational_root(r: Rational64, k: u32) -> Option<Rational64> {
    if r.is_negative() {
        return None;
    }
    let numer = exact_integer_root(*r.numer(), k)?;
    let denom = exact_integer_root(*r.denom(), k)?;
    Some(Rational64::new(numer, denom))
}

/// Exact value of the decimal literal `mantissa * 10^exponent`, if representable.
pub fn decimal_to_rational(mantissa: i64, exponent: i32) -> Option<Rational64> {
    let ten = Rational64::from_integer(10);
    let scale = rational_pow(ten, exponent as i64)?;
    Rational64::from_integer(mantissa).checked_mul(&scale)
}

pub fn rational_to_f64(r: &Rational64) -> f64 {
    r.to_f64().unwrap_or(f64::NAN)
}

/// Integer value of `r` when it is an integer.
pub fn as_integer(r: &Rational64) -> Option<i64> {
    r.is_integer().then(|| r.to_integer())
}
