//! Numeric evaluation of expressions over complex numbers.
//!
//! Evaluation is generic over the working precision `T` (`f32` or `f64`). Every
//! one-operand operator has a kernel in [`compute_on_complex`]; n-ary arithmetic and
//! matrices are handled by [`Expr::approximate`]. Domain failures produce `NaN`
//! components inside the kernels and surface as [`Evaluation::Undefined`].

use crate::symbolic::symbolic_engine::{Expr, ExprType, MathConstant};
use crate::symbolic::symbolic_numbers::{decimal_to_rational, rational_to_f64};
use crate::symbolic::symbolic_reduce::{AngleUnit, Context, is_defined_cyclically};
use num_complex::Complex;
use num_traits::{Float, FloatConst, One, Zero};
use std::fmt::{Debug, Display};

/// Float types the evaluator works with.
pub trait CalcFloat: Float + FloatConst + Debug + Display + 'static {
    /// Relative machine precision used for rounding away evaluation noise.
    fn meaningful_epsilon() -> Self;
}

impl CalcFloat for f32 {
    fn meaningful_epsilon() -> Self {
        1e-7
    }
}

impl CalcFloat for f64 {
    fn meaningful_epsilon() -> Self {
        1e-15
    }
}

/// Rounds `value` to a multiple of `10·ε`, removing evaluation noise such as
/// `sin(π) = 1.2e-16`.
pub fn round_float_to_meaningful_digits<T: CalcFloat>(value: T) -> T {
    let precision = T::from(10.0).unwrap_or_else(T::one) * T::meaningful_epsilon();
    let scaled = value / precision;
    if !scaled.is_finite() || scaled.abs() > T::one() / precision {
        return value;
    }
    scaled.round() * precision
}

/// Component-wise [`round_float_to_meaningful_digits`].
pub fn round_to_meaningful_digits<T: CalcFloat>(c: Complex<T>) -> Complex<T> {
    Complex::new(
        round_float_to_meaningful_digits(c.re),
        round_float_to_meaningful_digits(c.im),
    )
}

/// How complex results are reported to the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ComplexFormat {
    /// Non-negligible imaginary parts make the result undefined.
    #[default]
    Real,
    Cartesian,
}

/// Result of a numeric evaluation.
#[derive(Clone, Debug, PartialEq)]
pub enum Evaluation<T> {
    Complex(Complex<T>),
    Matrix {
        rows: usize,
        columns: usize,
        entries: Vec<Complex<T>>,
    },
    Undefined,
}

impl<T: CalcFloat> Evaluation<T> {
    fn from_complex(c: Complex<T>) -> Self {
        if c.re.is_nan() || c.im.is_nan() {
            Evaluation::Undefined
        } else {
            Evaluation::Complex(c)
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Evaluation::Undefined)
    }

    /// Scalar value, if the evaluation produced one.
    pub fn as_complex(&self) -> Option<Complex<T>> {
        match self {
            Evaluation::Complex(c) => Some(*c),
            _ => None,
        }
    }

    /// Real part of a scalar whose imaginary part is negligible.
    pub fn to_real(&self) -> Option<T> {
        match self.clone().in_format(ComplexFormat::Real) {
            Evaluation::Complex(c) => Some(c.re),
            _ => None,
        }
    }

    /// Applies the user's complex format: in real mode a scalar with a non-negligible
    /// imaginary part (or a matrix holding one) becomes `Undefined`.
    pub fn in_format(self, format: ComplexFormat) -> Self {
        if format == ComplexFormat::Cartesian {
            return self;
        }
        let negligible = |c: &Complex<T>| {
            c.im.abs() <= T::meaningful_epsilon() * c.re.abs().max(T::one())
        };
        match self {
            Evaluation::Complex(c) if negligible(&c) => {
                Evaluation::Complex(Complex::new(c.re, T::zero()))
            }
            Evaluation::Matrix {
                rows,
                columns,
                entries,
            } if entries.iter().all(negligible) => Evaluation::Matrix {
                rows,
                columns,
                entries: entries
                    .into_iter()
                    .map(|c| Complex::new(c.re, T::zero()))
                    .collect(),
            },
            _ => Evaluation::Undefined,
        }
    }

    fn map(self, f: impl Fn(Complex<T>) -> Complex<T>) -> Self {
        match self {
            Evaluation::Complex(c) => Evaluation::from_complex(f(c)),
            Evaluation::Matrix {
                rows,
                columns,
                entries,
            } => {
                let entries: Vec<Complex<T>> = entries.into_iter().map(f).collect();
                if entries.iter().any(|c| c.re.is_nan() || c.im.is_nan()) {
                    Evaluation::Undefined
                } else {
                    Evaluation::Matrix {
                        rows,
                        columns,
                        entries,
                    }
                }
            }
            Evaluation::Undefined => Evaluation::Undefined,
        }
    }
}

fn nan<T: CalcFloat>() -> Complex<T> {
    Complex::new(T::nan(), T::nan())
}

fn real<T: CalcFloat>(value: T) -> Complex<T> {
    Complex::new(value, T::zero())
}

fn to_radians<T: CalcFloat>(c: Complex<T>, angle_unit: AngleUnit) -> Complex<T> {
    match angle_unit {
        AngleUnit::Radian => c,
        AngleUnit::Degree => c * (T::PI() / T::from(180.0).unwrap_or_else(T::one)),
    }
}

fn from_radians<T: CalcFloat>(c: Complex<T>, angle_unit: AngleUnit) -> Complex<T> {
    match angle_unit {
        AngleUnit::Radian => c,
        AngleUnit::Degree => c * (T::from(180.0).unwrap_or_else(T::one) / T::PI()),
    }
}

/// Real integer value of `c` if it has one.
fn as_real_integer<T: CalcFloat>(c: Complex<T>) -> Option<T> {
    (c.im.is_zero() && c.re.fract().is_zero()).then_some(c.re)
}

/// One-operand numeric kernel of the operator `ty`.
///
/// Returns a `NaN` complex for inputs outside the operator's domain.
///
/// # Panics
/// Panics when `ty` is not a one-operand operator.
pub fn compute_on_complex<T: CalcFloat>(
    ty: ExprType,
    c: Complex<T>,
    angle_unit: AngleUnit,
) -> Complex<T> {
    match ty {
        ExprType::Opposite => -c,
        ExprType::Parenthesis => c,
        ExprType::AbsoluteValue => real(c.norm()),
        ExprType::Conjugate => c.conj(),
        ExprType::RealPart => real(c.re),
        ExprType::ImaginaryPart => real(c.im),
        ExprType::Floor => {
            if c.im.is_zero() {
                real(c.re.floor())
            } else {
                nan()
            }
        }
        ExprType::Ceiling => {
            if c.im.is_zero() {
                real(c.re.ceil())
            } else {
                nan()
            }
        }
        ExprType::SquareRoot => round_to_meaningful_digits(c.sqrt()),
        ExprType::Factorial => match as_real_integer(c) {
            Some(n) if n >= T::zero() && n <= T::from(170.0).unwrap_or_else(T::zero) => {
                let mut product = T::one();
                let mut k = T::one();
                while k <= n {
                    product = product * k;
                    k = k + T::one();
                }
                real(product)
            }
            _ => nan(),
        },
        ExprType::Sine => round_to_meaningful_digits(to_radians(c, angle_unit).sin()),
        ExprType::Cosine => round_to_meaningful_digits(to_radians(c, angle_unit).cos()),
        ExprType::Tangent => {
            let radians = to_radians(c, angle_unit);
            if radians.cos().norm() < T::meaningful_epsilon() {
                nan()
            } else {
                round_to_meaningful_digits(radians.tan())
            }
        }
        ExprType::ArcSine => round_to_meaningful_digits(from_radians(c.asin(), angle_unit)),
        ExprType::ArcCosine => round_to_meaningful_digits(from_radians(c.acos(), angle_unit)),
        ExprType::ArcTangent => round_to_meaningful_digits(from_radians(c.atan(), angle_unit)),
        ExprType::HyperbolicSine => round_to_meaningful_digits(c.sinh()),
        ExprType::HyperbolicCosine => round_to_meaningful_digits(c.cosh()),
        ExprType::HyperbolicTangent => round_to_meaningful_digits(c.tanh()),
        ExprType::HyperbolicArcSine => round_to_meaningful_digits(c.asinh()),
        ExprType::HyperbolicArcCosine => round_to_meaningful_digits(c.acosh()),
        ExprType::HyperbolicArcTangent => round_to_meaningful_digits(c.atanh()),
        ExprType::NaperianLogarithm => {
            if c.is_zero() {
                nan()
            } else {
                c.ln()
            }
        }
        other => panic!("{} has no one-operand kernel", other),
    }
}

/// `base ^ exponent` with exact real integer powers.
pub fn complex_power<T: CalcFloat>(base: Complex<T>, exponent: Complex<T>) -> Complex<T> {
    if base.is_zero() {
        return if exponent.im.is_zero() && exponent.re > T::zero() {
            Complex::zero()
        } else {
            nan()
        };
    }
    if let Some(n) = as_real_integer(exponent) {
        if let Some(n) = n.to_i32() {
            return base.powi(n);
        }
    }
    round_to_meaningful_digits(base.powc(exponent))
}

fn combine<T: CalcFloat>(
    left: Evaluation<T>,
    right: Evaluation<T>,
    f: impl Fn(Complex<T>, Complex<T>) -> Complex<T>,
) -> Evaluation<T> {
    match (left, right) {
        (Evaluation::Complex(a), Evaluation::Complex(b)) => Evaluation::from_complex(f(a, b)),
        (Evaluation::Matrix { rows, columns, entries }, Evaluation::Complex(b)) => {
            Evaluation::Matrix {
                rows,
                columns,
                entries,
            }
            .map(|a| f(a, b))
        }
        _ => Evaluation::Undefined,
    }
}

fn add<T: CalcFloat>(left: Evaluation<T>, right: Evaluation<T>) -> Evaluation<T> {
    match (left, right) {
        (
            Evaluation::Matrix {
                rows,
                columns,
                entries: a,
            },
            Evaluation::Matrix {
                rows: r2,
                columns: c2,
                entries: b,
            },
        ) if rows == r2 && columns == c2 => Evaluation::Matrix {
            rows,
            columns,
            entries: a.into_iter().zip(b).map(|(x, y)| x + y).collect(),
        },
        (Evaluation::Complex(a), Evaluation::Complex(b)) => Evaluation::from_complex(a + b),
        _ => Evaluation::Undefined,
    }
}

fn multiply<T: CalcFloat>(left: Evaluation<T>, right: Evaluation<T>) -> Evaluation<T> {
    match (left, right) {
        (
            Evaluation::Matrix {
                rows: m,
                columns: n,
                entries: a,
            },
            Evaluation::Matrix {
                rows: p,
                columns: q,
                entries: b,
            },
        ) => {
            if n != p {
                return Evaluation::Undefined;
            }
            let entries = (0..m * q)
                .map(|index| {
                    let (i, j) = (index / q, index % q);
                    (0..n).fold(Complex::zero(), |acc, k| acc + a[i * n + k] * b[k * q + j])
                })
                .collect();
            Evaluation::Matrix {
                rows: m,
                columns: q,
                entries,
            }
        }
        (Evaluation::Complex(a), matrix @ Evaluation::Matrix { .. }) => {
            combine(matrix, Evaluation::Complex(a), |x, y| x * y)
        }
        (left, right) => combine(left, right, |x, y| x * y),
    }
}

/// Scalar powers, and non-negative integer powers of a square matrix by repeated squaring.
fn power<T: CalcFloat>(base: Evaluation<T>, exponent: Evaluation<T>) -> Evaluation<T> {
    match (base, exponent) {
        (matrix @ Evaluation::Matrix { .. }, Evaluation::Complex(e)) => {
            let Evaluation::Matrix { rows, columns, .. } = matrix else {
                return Evaluation::Undefined;
            };
            let n = match as_real_integer(e).and_then(|n| n.to_usize()) {
                Some(n) => n,
                None => return Evaluation::Undefined,
            };
            if n == 1 {
                return matrix;
            }
            if rows != columns {
                return Evaluation::Undefined;
            }
            let identity = Evaluation::Matrix {
                rows,
                columns,
                entries: (0..rows * columns)
                    .map(|k| if k / columns == k % columns { Complex::one() } else { Complex::zero() })
                    .collect(),
            };
            let (mut result, mut square, mut k) = (identity, matrix, n);
            while k > 0 {
                if k & 1 == 1 {
                    result = multiply(result, square.clone());
                }
                k >>= 1;
                if k > 0 {
                    square = multiply(square.clone(), square);
                }
            }
            result
        }
        (base, exponent) => combine(base, exponent, complex_power),
    }
}

impl Expr {
    /// Numeric value of the expression at precision `T`.
    ///
    /// Symbols are looked up in `context`; unbound symbols evaluate to `Undefined`.
    pub fn approximate<T: CalcFloat>(
        &self,
        context: &dyn Context,
        angle_unit: AngleUnit,
    ) -> Evaluation<T> {
        let scalar = |value: f64| Evaluation::from_complex(real(T::from(value).unwrap_or_else(T::nan)));
        match self {
            Expr::Undefined => Evaluation::Undefined,
            Expr::Rational(r) => scalar(rational_to_f64(r)),
            Expr::Decimal { mantissa, exponent } => match decimal_to_rational(*mantissa, *exponent) {
                Some(r) => scalar(rational_to_f64(&r)),
                None => scalar(*mantissa as f64 * 10f64.powi(*exponent)),
            },
            Expr::Constant(MathConstant::Pi) => Evaluation::Complex(real(T::PI())),
            Expr::Constant(MathConstant::E) => Evaluation::Complex(real(T::E())),
            Expr::Constant(MathConstant::ImaginaryUnit) => {
                Evaluation::Complex(Complex::new(T::zero(), T::one()))
            }
            Expr::Random => scalar(rand::random::<f64>()),
            Expr::Symbol(name) if is_defined_cyclically(context, name) => Evaluation::Undefined,
            Expr::Symbol(name) => match context.expression_for_symbol(name) {
                Some(value) => value.approximate(context, angle_unit),
                None => Evaluation::Undefined,
            },
            Expr::Matrix {
                rows,
                columns,
                entries,
            } => {
                let mut values = Vec::with_capacity(entries.len());
                for entry in entries {
                    match entry.approximate::<T>(context, angle_unit) {
                        Evaluation::Complex(c) => values.push(c),
                        _ => return Evaluation::Undefined,
                    }
                }
                Evaluation::Matrix {
                    rows: *rows,
                    columns: *columns,
                    entries: values,
                }
            }
            Expr::Addition(ops) => ops
                .iter()
                .map(|op| op.approximate::<T>(context, angle_unit))
                .reduce(add)
                .unwrap_or(Evaluation::Complex(Complex::zero())),
            Expr::Multiplication(ops) => ops
                .iter()
                .map(|op| op.approximate::<T>(context, angle_unit))
                .reduce(multiply)
                .unwrap_or(Evaluation::Complex(Complex::one())),
            Expr::Subtraction(a, b) => {
                let negated = b.approximate::<T>(context, angle_unit).map(|c| -c);
                add(a.approximate(context, angle_unit), negated)
            }
            Expr::Division(a, b) => combine(
                a.approximate(context, angle_unit),
                b.approximate(context, angle_unit),
                |x, y| if y.is_zero() { nan() } else { x / y },
            ),
            Expr::Power(base, exponent) => power(
                base.approximate(context, angle_unit),
                exponent.approximate(context, angle_unit),
            ),
            Expr::NthRoot(radicand, index) => combine(
                radicand.approximate(context, angle_unit),
                index.approximate(context, angle_unit),
                |x, n| {
                    if n.is_zero() {
                        nan()
                    } else {
                        complex_power(x, Complex::<T>::one() / n)
                    }
                },
            ),
            Expr::Logarithm(value, base) => combine(
                value.approximate(context, angle_unit),
                base.approximate(context, angle_unit),
                |x, b| {
                    let denominator = b.ln();
                    if x.is_zero() || b.is_zero() || denominator.is_zero() {
                        nan()
                    } else {
                        round_to_meaningful_digits(x.ln() / denominator)
                    }
                },
            ),
            unary => {
                let ty = unary.ty();
                unary
                    .operand(0)
                    .approximate::<T>(context, angle_unit)
                    .map(|c| compute_on_complex(ty, c, angle_unit))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::symbolic_reduce::{EmptyContext, GlobalContext};
    use approx::assert_relative_eq;

    #[test]
    fn test_tanh_of_zero_is_zero() {
        let zero = Complex::new(0.0f64, 0.0);
        let result = compute_on_complex(ExprType::HyperbolicTangent, zero, AngleUnit::Radian);
        assert_eq!(result, Complex::new(0.0, 0.0));
        let zero32 = Complex::new(0.0f32, 0.0);
        let result32 = compute_on_complex(ExprType::HyperbolicTangent, zero32, AngleUnit::Radian);
        assert_eq!(result32, Complex::new(0.0f32, 0.0));
    }

    #[test]
    fn test_absolute_value_is_modulus() {
        let c = Complex::new(3.0f64, -4.0);
        let result = compute_on_complex(ExprType::AbsoluteValue, c, AngleUnit::Radian);
        assert_relative_eq!(result.re, 5.0);
        assert_relative_eq!(result.im, 0.0);
    }

    #[test]
    fn test_round_to_meaningful_digits_removes_noise() {
        let noisy = Complex::new(1.2e-16f64, 1.0 + 3e-16);
        let rounded = round_to_meaningful_digits(noisy);
        assert_eq!(rounded.re, 0.0);
        assert_relative_eq!(rounded.im, 1.0, epsilon = 1e-14);
        assert_relative_eq!(round_float_to_meaningful_digits(1e300f64), 1e300);
    }

    #[test]
    fn test_sine_in_degrees() {
        let result = compute_on_complex(
            ExprType::Sine,
            Complex::new(30.0f64, 0.0),
            AngleUnit::Degree,
        );
        assert_relative_eq!(result.re, 0.5, epsilon = 1e-13);
        let pi_sine = compute_on_complex(
            ExprType::Sine,
            Complex::new(std::f64::consts::PI, 0.0),
            AngleUnit::Radian,
        );
        assert_eq!(pi_sine.re, 0.0);
    }

    #[test]
    fn test_approximate_expression() {
        let context = EmptyContext;
        let e = (Expr::integer(1) + Expr::integer(2)) * Expr::rational(1, 2);
        let value = e.approximate::<f64>(&context, AngleUnit::Radian);
        assert_relative_eq!(value.to_real().unwrap(), 1.5);
        let undefined = (Expr::integer(1) / Expr::integer(0)).approximate::<f64>(&context, AngleUnit::Radian);
        assert!(undefined.is_undefined());
    }

    #[test]
    fn test_real_mode_rejects_complex_results() {
        let context = EmptyContext;
        let root = Expr::SquareRoot(Expr::integer(-4).boxed());
        let cartesian = root.approximate::<f64>(&context, AngleUnit::Radian);
        let c = cartesian.as_complex().unwrap();
        assert_relative_eq!(c.im, 2.0, epsilon = 1e-12);
        assert!(cartesian.in_format(ComplexFormat::Real).is_undefined());
    }

    #[test]
    fn test_symbols_from_context() {
        let mut context = GlobalContext::new();
        context.set_expression_for_symbol("x", Expr::integer(4));
        let e = Expr::symbol("x").pow(Expr::integer(2));
        let value = e.approximate::<f64>(&context, AngleUnit::Radian);
        assert_relative_eq!(value.to_real().unwrap(), 16.0);
        let unbound = Expr::symbol("y").approximate::<f64>(&context, AngleUnit::Radian);
        assert!(unbound.is_undefined());
    }

    #[test]
    fn test_matrix_product() {
        let context = EmptyContext;
        let a = Expr::matrix(
            2,
            2,
            vec![Expr::integer(1), Expr::integer(2), Expr::integer(3), Expr::integer(4)],
        );
        let value = (a.clone() * a).approximate::<f64>(&context, AngleUnit::Radian);
        match value {
            Evaluation::Matrix { entries, .. } => {
                assert_relative_eq!(entries[0].re, 7.0);
                assert_relative_eq!(entries[3].re, 22.0);
            }
            other => panic!("expected a matrix, got {:?}", other),
        }
    }
}
