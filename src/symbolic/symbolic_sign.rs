//! Sign facts of expressions.
//!
//! A sign is never stored on a node: [`Expr::sign`] derives it from the operands on every
//! query. `Positive` means non-negative, so zero is `Positive`.

use crate::symbolic::symbolic_engine::{Expr, MathConstant};
use crate::symbolic::symbolic_reduce::Reducer;
use num_traits::Signed;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sign {
    Negative,
    Unknown,
    Positive,
}

impl Sign {
    pub fn flipped(self) -> Sign {
        match self {
            Sign::Negative => Sign::Positive,
            Sign::Positive => Sign::Negative,
            Sign::Unknown => Sign::Unknown,
        }
    }

    /// Sign of a product of two factors with the given signs.
    pub fn product(self, other: Sign) -> Sign {
        match (self, other) {
            (Sign::Unknown, _) | (_, Sign::Unknown) => Sign::Unknown,
            (a, b) if a == b => Sign::Positive,
            _ => Sign::Negative,
        }
    }

    pub fn is_known(self) -> bool {
        self != Sign::Unknown
    }
}

impl Expr {
    /// Derived sign of the expression.
    pub fn sign(&self) -> Sign {
        match self {
            Expr::Rational(r) => {
                if r.is_negative() {
                    Sign::Negative
                } else {
                    Sign::Positive
                }
            }
            Expr::Decimal { mantissa, .. } => {
                if *mantissa < 0 {
                    Sign::Negative
                } else {
                    Sign::Positive
                }
            }
            Expr::Constant(MathConstant::Pi) | Expr::Constant(MathConstant::E) => Sign::Positive,
            Expr::AbsoluteValue(_) | Expr::Factorial(_) | Expr::HyperbolicCosine(_) => {
                Sign::Positive
            }
            Expr::Opposite(a) => a.sign().flipped(),
            Expr::Parenthesis(a)
            | Expr::Floor(a)
            | Expr::ArcSine(a)
            | Expr::ArcTangent(a)
            | Expr::HyperbolicSine(a)
            | Expr::HyperbolicTangent(a)
            | Expr::HyperbolicArcSine(a)
            | Expr::HyperbolicArcTangent(a) => a.sign(),
            Expr::Ceiling(a) | Expr::SquareRoot(a) => match a.sign() {
                Sign::Positive => Sign::Positive,
                _ => Sign::Unknown,
            },
            // an exact zero factor makes the product zero whatever the other signs
            Expr::Multiplication(ops) if ops.iter().any(|op| op.is_rational_zero()) => {
                Sign::Positive
            }
            Expr::Multiplication(ops) => ops
                .iter()
                .fold(Sign::Positive, |acc, op| acc.product(op.sign())),
            Expr::Division(a, _) if a.is_rational_zero() => Sign::Positive,
            Expr::Division(a, b) => a.sign().product(b.sign()),
            Expr::Addition(ops) => {
                let first = ops.first().map(|op| op.sign()).unwrap_or(Sign::Positive);
                if first.is_known() && ops.iter().all(|op| op.sign() == first) {
                    first
                } else {
                    Sign::Unknown
                }
            }
            Expr::Power(base, exponent) => match (base.sign(), exponent.as_rational()) {
                (Sign::Positive, _) => Sign::Positive,
                (Sign::Negative, Some(n)) if n.is_integer() => {
                    if n.to_integer() % 2 == 0 {
                        Sign::Positive
                    } else {
                        Sign::Negative
                    }
                }
                _ => Sign::Unknown,
            },
            _ => Sign::Unknown,
        }
    }

    /// Returns an expression equal in magnitude to `self` that has the `target` sign.
    ///
    /// Only called on expressions whose sign is known.
    ///
    /// # Panics
    /// Panics when the operator cannot carry the requested sign (a negative absolute
    /// value, a negative π, an expression of unknown sign).
    pub fn set_sign(self, target: Sign, reducer: &Reducer) -> Expr {
        assert!(target.is_known(), "cannot force an unknown sign");
        if self.sign() == target {
            return self;
        }
        match self {
            Expr::Rational(r) => Expr::Rational(if target == Sign::Positive {
                r.abs()
            } else {
                -r.abs()
            }),
            Expr::Decimal { mantissa, exponent } => Expr::Decimal {
                mantissa: if target == Sign::Positive {
                    mantissa.abs()
                } else {
                    -mantissa.abs()
                },
                exponent,
            },
            Expr::Opposite(a) => {
                let current = a.sign();
                assert!(current.is_known(), "sign of -({}) is unknown", a);
                // -a has the flipped sign of a, so a itself carries the target sign
                *a
            }
            Expr::Multiplication(mut ops) => {
                let index = ops
                    .iter()
                    .position(|op| op.sign() == Sign::Negative)
                    .or_else(|| ops.iter().position(|op| op.sign().is_known()))
                    .unwrap_or_else(|| panic!("no factor of known sign in a product"));
                let factor = std::mem::take(&mut ops[index]);
                let flipped_target = factor.sign().flipped();
                ops[index] = factor.set_sign(flipped_target, reducer);
                reducer.shallow_reduce(Expr::Multiplication(ops))
            }
            Expr::Division(a, b) => {
                if a.sign().is_known() {
                    let flipped = a.sign().flipped();
                    let a = a.set_sign(flipped, reducer);
                    reducer.shallow_reduce(Expr::Division(a.boxed(), b))
                } else {
                    let flipped = b.sign().flipped();
                    let b = b.set_sign(flipped, reducer);
                    reducer.shallow_reduce(Expr::Division(a, b.boxed()))
                }
            }
            Expr::Parenthesis(a) => a.set_sign(target, reducer),
            Expr::Sine(_)
            | Expr::Tangent(_)
            | Expr::ArcSine(_)
            | Expr::ArcTangent(_)
            | Expr::HyperbolicSine(_)
            | Expr::HyperbolicTangent(_)
            | Expr::HyperbolicArcSine(_)
            | Expr::HyperbolicArcTangent(_) => {
                let ty = self.ty();
                let operand = self.into_operands().remove(0);
                let operand = operand.set_sign(target, reducer);
                reducer.shallow_reduce(Expr::unary(ty, operand))
            }
            other => panic!("cannot force sign {:?} on {}", target, other),
        }
    }
}
