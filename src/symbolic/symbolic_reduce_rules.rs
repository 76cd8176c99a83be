//! Per-operator local reduction rules.
//!
//! Every rule receives a node whose operands are already reduced and returns either the
//! node itself or its replacement. Rules run after the engine-wide rules of
//! [`Reducer::shallow_reduce`], so no operand here is `Undefined` and, when the
//! elementwise flag is on, no elementwise operator sees a matrix first operand.

use crate::symbolic::symbolic_engine::{Expr, ExprType, MathConstant};
use crate::symbolic::symbolic_numbers::{
    checked_product, checked_sum, exact_rational_root, factorial, rational_pow,
    decimal_to_rational,
};
use crate::symbolic::symbolic_reduce::{AngleUnit, Reducer, is_defined_cyclically};
use crate::symbolic::symbolic_sign::Sign;
use log::debug;
use num::rational::Rational64;
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub, One, Signed, Zero};

/// Largest root index folded exactly.
const MAX_EXACT_ROOT_INDEX: i64 = 64;
/// Largest integer power of a matrix expanded into products.
const MAX_MATRIX_POWER: i64 = 32;

/// Dispatches `expression` to the rule of its operator.
pub fn apply_operator_rule(expression: Expr, reducer: &Reducer) -> Expr {
    match expression {
        Expr::Decimal { mantissa, exponent } => match decimal_to_rational(mantissa, exponent) {
            Some(value) => Expr::Rational(value),
            None => Expr::Decimal { mantissa, exponent },
        },
        Expr::Symbol(name) => reduce_symbol(name, reducer),
        Expr::Addition(operands) => reduce_addition(operands, reducer),
        Expr::Subtraction(a, b) => {
            let negated = reducer.shallow_reduce(Expr::Multiplication(vec![Expr::integer(-1), *b]));
            reducer.shallow_reduce(Expr::Addition(vec![*a, negated]))
        }
        Expr::Multiplication(operands) => reduce_multiplication(operands, reducer),
        Expr::Division(a, b) => reduce_division(*a, *b, reducer),
        Expr::Opposite(a) => {
            reducer.shallow_reduce(Expr::Multiplication(vec![Expr::integer(-1), *a]))
        }
        Expr::Power(base, exponent) => reduce_power(*base, *exponent, reducer),
        Expr::SquareRoot(a) => reducer.shallow_reduce(Expr::Power(a, Expr::rational(1, 2).boxed())),
        Expr::NthRoot(a, index) => {
            let inverse = reducer.shallow_reduce(Expr::Power(index, Expr::integer(-1).boxed()));
            reducer.shallow_reduce(Expr::Power(a, inverse.boxed()))
        }
        Expr::Factorial(a) => reduce_factorial(*a),
        Expr::Parenthesis(a) => *a,
        Expr::AbsoluteValue(a) => reduce_absolute_value(*a, reducer),
        Expr::Conjugate(a) => reduce_conjugate(*a, reducer),
        Expr::RealPart(a) => {
            if a.sign().is_known() {
                *a
            } else if *a == Expr::i() {
                Expr::integer(0)
            } else {
                Expr::RealPart(a)
            }
        }
        Expr::ImaginaryPart(a) => {
            if a.sign().is_known() {
                Expr::integer(0)
            } else if *a == Expr::i() {
                Expr::integer(1)
            } else {
                Expr::ImaginaryPart(a)
            }
        }
        Expr::Floor(a) => match rational_bounds(&a) {
            Some((floor, _)) => Expr::Rational(floor),
            None => Expr::Floor(a),
        },
        Expr::Ceiling(a) => match rational_bounds(&a) {
            Some((_, ceiling)) => Expr::Rational(ceiling),
            None => Expr::Ceiling(a),
        },
        Expr::Sine(a) => reduce_trigonometric(ExprType::Sine, *a, reducer),
        Expr::Cosine(a) => reduce_trigonometric(ExprType::Cosine, *a, reducer),
        Expr::Tangent(a) => reduce_trigonometric(ExprType::Tangent, *a, reducer),
        Expr::ArcSine(a) => reduce_odd_function(ExprType::ArcSine, *a, reducer),
        Expr::ArcTangent(a) => reduce_odd_function(ExprType::ArcTangent, *a, reducer),
        Expr::HyperbolicSine(a) => reduce_odd_function(ExprType::HyperbolicSine, *a, reducer),
        Expr::HyperbolicArcSine(a) => {
            reduce_odd_function(ExprType::HyperbolicArcSine, *a, reducer)
        }
        Expr::HyperbolicArcTangent(a) => {
            reduce_odd_function(ExprType::HyperbolicArcTangent, *a, reducer)
        }
        Expr::ArcCosine(a) => {
            if a.is_rational_one() {
                Expr::integer(0)
            } else {
                Expr::ArcCosine(a)
            }
        }
        Expr::HyperbolicCosine(a) => {
            if a.is_rational_zero() {
                Expr::integer(1)
            } else if a.sign() == Sign::Negative {
                let positive = a.set_sign(Sign::Positive, reducer);
                reducer.shallow_reduce(Expr::HyperbolicCosine(positive.boxed()))
            } else {
                Expr::HyperbolicCosine(a)
            }
        }
        Expr::HyperbolicArcCosine(a) => {
            if a.is_rational_one() {
                Expr::integer(0)
            } else {
                Expr::HyperbolicArcCosine(a)
            }
        }
        Expr::NaperianLogarithm(a) => {
            if a.is_rational_one() {
                Expr::integer(0)
            } else if *a == Expr::e() {
                Expr::integer(1)
            } else {
                Expr::NaperianLogarithm(a)
            }
        }
        Expr::Logarithm(a, base) => {
            if base.is_rational_one() {
                Expr::Undefined
            } else if a.is_rational_one() {
                Expr::integer(0)
            } else if a == base {
                Expr::integer(1)
            } else {
                Expr::Logarithm(a, base)
            }
        }
        // tanh, leaves, Random and Matrix have no local rule
        other => other,
    }
}

fn reduce_symbol(name: String, reducer: &Reducer) -> Expr {
    if is_defined_cyclically(reducer.context, &name) {
        debug!("symbol {} is defined through itself, kept", name);
        return Expr::Symbol(name);
    }
    match reducer.context.expression_for_symbol(&name) {
        Some(value) => reducer.deep_reduce(value),
        None => Expr::Symbol(name),
    }
}

fn flatten(operands: Vec<Expr>, ty: ExprType) -> Vec<Expr> {
    let mut flat = Vec::with_capacity(operands.len());
    for operand in operands {
        match operand {
            Expr::Addition(inner) if ty == ExprType::Addition => flat.extend(inner),
            Expr::Multiplication(inner) if ty == ExprType::Multiplication => flat.extend(inner),
            other => flat.push(other),
        }
    }
    flat
}

fn collapse(mut operands: Vec<Expr>, ty: ExprType, neutral: i64) -> Expr {
    match operands.len() {
        0 => Expr::integer(neutral),
        1 => operands.pop().unwrap_or_default(),
        _ if ty == ExprType::Addition => Expr::Addition(operands),
        _ => Expr::Multiplication(operands),
    }
}

fn contains_matrix(expression: &Expr) -> bool {
    expression.is_matrix() || expression.operands().iter().any(|op| contains_matrix(op))
}

//___________________________________ADDITION____________________________________

fn reduce_addition(operands: Vec<Expr>, reducer: &Reducer) -> Expr {
    let flat = flatten(operands, ExprType::Addition);
    if reducer.matrix_exact_reducing && flat.iter().any(Expr::is_matrix) {
        return add_matrices(flat, reducer);
    }
    let (rationals, others): (Vec<Expr>, Vec<Expr>) = flat
        .into_iter()
        .partition(|op| matches!(op, Expr::Rational(_)));
    let values: Vec<Rational64> = rationals.iter().filter_map(Expr::as_rational).collect();
    let mut result = Vec::with_capacity(others.len() + 1);
    match checked_sum(&values) {
        Some(sum) if sum.is_zero() => {}
        Some(sum) => result.push(Expr::Rational(sum)),
        None => {
            debug!("rational sum overflows, terms kept apart");
            result.extend(rationals);
        }
    }
    result.extend(others);
    collapse(result, ExprType::Addition, 0)
}

fn add_matrices(operands: Vec<Expr>, reducer: &Reducer) -> Expr {
    let shape = match operands.first() {
        Some(Expr::Matrix { rows, columns, .. }) => (*rows, *columns),
        _ => return Expr::Undefined,
    };
    let mut sums: Vec<Vec<Expr>> = vec![Vec::new(); shape.0 * shape.1];
    for operand in operands {
        match operand {
            Expr::Matrix {
                rows,
                columns,
                entries,
            } if (rows, columns) == shape => {
                for (sum, entry) in sums.iter_mut().zip(entries) {
                    sum.push(entry);
                }
            }
            // scalar + matrix and mismatched dimensions
            _ => return Expr::Undefined,
        }
    }
    let entries = sums
        .into_iter()
        .map(|terms| reducer.shallow_reduce(Expr::Addition(terms)))
        .collect();
    Expr::matrix(shape.0, shape.1, entries)
}

//___________________________________MULTIPLICATION____________________________________

fn reduce_multiplication(operands: Vec<Expr>, reducer: &Reducer) -> Expr {
    let flat = flatten(operands, ExprType::Multiplication);
    if reducer.matrix_exact_reducing && flat.iter().any(Expr::is_matrix) {
        return multiply_with_matrices(flat, reducer);
    }
    let (rationals, others): (Vec<Expr>, Vec<Expr>) = flat
        .into_iter()
        .partition(|op| matches!(op, Expr::Rational(_)));
    let values: Vec<Rational64> = rationals.iter().filter_map(Expr::as_rational).collect();
    let mut result = Vec::with_capacity(others.len() + 1);
    match checked_product(&values) {
        Some(product) if product.is_zero() && !others.iter().any(contains_matrix) => {
            return Expr::integer(0);
        }
        Some(product) if product.is_one() => {}
        Some(product) => result.push(Expr::Rational(product)),
        None => {
            debug!("rational product overflows, factors kept apart");
            result.extend(rationals);
        }
    }
    result.extend(others);
    collapse(result, ExprType::Multiplication, 1)
}

fn multiply_matrices(left: Expr, right: Expr, reducer: &Reducer) -> Expr {
    let (
        Expr::Matrix {
            rows: m,
            columns: n,
            entries: a,
        },
        Expr::Matrix {
            rows: p,
            columns: q,
            entries: b,
        },
    ) = (left, right)
    else {
        return Expr::Undefined;
    };
    if n != p {
        return Expr::Undefined;
    }
    let mut entries = Vec::with_capacity(m * q);
    for i in 0..m {
        for j in 0..q {
            let terms = (0..n)
                .map(|k| {
                    reducer.shallow_reduce(Expr::Multiplication(vec![
                        a[i * n + k].clone(),
                        b[k * q + j].clone(),
                    ]))
                })
                .collect();
            entries.push(reducer.shallow_reduce(Expr::Addition(terms)));
        }
    }
    Expr::matrix(m, q, entries)
}

fn multiply_with_matrices(operands: Vec<Expr>, reducer: &Reducer) -> Expr {
    let (matrices, scalars): (Vec<Expr>, Vec<Expr>) =
        operands.into_iter().partition(Expr::is_matrix);
    if scalars.iter().any(contains_matrix) {
        let mut kept = scalars;
        kept.extend(matrices);
        return Expr::Multiplication(kept);
    }
    let mut matrices = matrices.into_iter();
    let Some(first) = matrices.next() else {
        return Expr::Undefined;
    };
    let mut product = first;
    for next in matrices {
        product = multiply_matrices(product, next, reducer);
        if product.is_undefined() {
            return Expr::Undefined;
        }
    }
    if scalars.is_empty() {
        return product;
    }
    let scalar = reducer.shallow_reduce(Expr::Multiplication(scalars));
    scale_matrix(product, &scalar, reducer)
}

fn scale_matrix(matrix: Expr, scalar: &Expr, reducer: &Reducer) -> Expr {
    match matrix {
        Expr::Matrix {
            rows,
            columns,
            entries,
        } => {
            let entries = entries
                .into_iter()
                .map(|e| reducer.shallow_reduce(Expr::Multiplication(vec![scalar.clone(), e])))
                .collect();
            Expr::matrix(rows, columns, entries)
        }
        other => other,
    }
}

fn identity_matrix(size: usize) -> Expr {
    let entries = (0..size * size)
        .map(|k| Expr::integer(if k / size == k % size { 1 } else { 0 }))
        .collect();
    Expr::matrix(size, size, entries)
}

//___________________________________DIVISION AND POWERS____________________________________

fn reduce_division(numerator: Expr, denominator: Expr, reducer: &Reducer) -> Expr {
    if denominator.is_rational_zero() {
        return Expr::Undefined;
    }
    let inverse = reducer.shallow_reduce(Expr::Power(
        denominator.boxed(),
        Expr::integer(-1).boxed(),
    ));
    reducer.shallow_reduce(Expr::Multiplication(vec![numerator, inverse]))
}

fn reduce_power(base: Expr, exponent: Expr, reducer: &Reducer) -> Expr {
    let rational_exponent = exponent.as_rational();
    if let Some(n) = rational_exponent {
        if base.is_rational_zero() && !n.is_positive() {
            return Expr::Undefined;
        }
        if n.is_one() {
            return base;
        }
        if n.is_zero() && !base.is_matrix() {
            return Expr::integer(1);
        }
    }
    if base.is_rational_one() {
        return Expr::integer(1);
    }
    let integer_exponent = rational_exponent
        .filter(|n| n.is_integer())
        .map(|n| n.to_integer());
    match (base, integer_exponent, rational_exponent) {
        (Expr::Matrix { rows, columns, entries }, Some(n), _) if reducer.matrix_exact_reducing => {
            let matrix = Expr::matrix(rows, columns, entries);
            if rows != columns {
                return Expr::Undefined;
            }
            if !(0..=MAX_MATRIX_POWER).contains(&n) {
                return Expr::Power(matrix.boxed(), exponent.boxed());
            }
            (0..n).fold(identity_matrix(rows), |acc, _| {
                multiply_matrices(acc, matrix.clone(), reducer)
            })
        }
        (Expr::Rational(b), Some(n), _) => match rational_pow(b, n) {
            Some(value) => Expr::Rational(value),
            None => Expr::Power(Expr::Rational(b).boxed(), exponent.boxed()),
        },
        (Expr::Rational(b), None, Some(n)) if !b.is_negative() => {
            let index = *n.denom();
            let exact = (index <= MAX_EXACT_ROOT_INDEX)
                .then(|| exact_rational_root(b, index as u32))
                .flatten()
                .and_then(|root| rational_pow(root, *n.numer()));
            match exact {
                Some(value) => Expr::Rational(value),
                None => Expr::Power(Expr::Rational(b).boxed(), exponent.boxed()),
            }
        }
        (Expr::Constant(MathConstant::ImaginaryUnit), Some(n), _) => match n.rem_euclid(4) {
            0 => Expr::integer(1),
            1 => Expr::i(),
            2 => Expr::integer(-1),
            _ => Expr::Multiplication(vec![Expr::integer(-1), Expr::i()]),
        },
        (Expr::Power(inner_base, inner_exponent), Some(_), _) => {
            let product =
                reducer.shallow_reduce(Expr::Multiplication(vec![*inner_exponent, exponent]));
            reducer.shallow_reduce(Expr::Power(inner_base, product.boxed()))
        }
        (base, _, _) => Expr::Power(base.boxed(), exponent.boxed()),
    }
}

//___________________________________ONE-OPERAND RULES____________________________________

fn reduce_factorial(operand: Expr) -> Expr {
    match operand.as_rational() {
        Some(r) if !r.is_integer() || r.is_negative() => Expr::Undefined,
        Some(r) => match factorial(r.to_integer()) {
            Some(value) => Expr::integer(value),
            None => Expr::Factorial(operand.boxed()),
        },
        None => Expr::Factorial(operand.boxed()),
    }
}

/// |x| is x for non-negative x, and x forced positive for negative x.
fn reduce_absolute_value(operand: Expr, reducer: &Reducer) -> Expr {
    match operand.sign() {
        Sign::Positive => operand,
        Sign::Negative => operand.set_sign(Sign::Positive, reducer),
        Sign::Unknown => Expr::AbsoluteValue(operand.boxed()),
    }
}

fn reduce_conjugate(operand: Expr, reducer: &Reducer) -> Expr {
    if operand.sign().is_known() {
        operand
    } else if operand == Expr::i() {
        reducer.shallow_reduce(Expr::Multiplication(vec![Expr::integer(-1), Expr::i()]))
    } else {
        Expr::Conjugate(operand.boxed())
    }
}

/// Floor and ceiling of rationals and of the constants π and e.
fn rational_bounds(operand: &Expr) -> Option<(Rational64, Rational64)> {
    let bounds = |floor: i64| {
        (
            Rational64::from_integer(floor),
            Rational64::from_integer(floor + 1),
        )
    };
    match operand {
        Expr::Rational(r) => Some((r.floor(), r.ceil())),
        Expr::Constant(MathConstant::Pi) => Some(bounds(3)),
        Expr::Constant(MathConstant::E) => Some(bounds(2)),
        _ => None,
    }
}

/// Angle of `operand` as a multiple of π, when it is an exact rational multiple.
fn angle_in_half_turns(operand: &Expr, angle_unit: AngleUnit) -> Option<Rational64> {
    match angle_unit {
        AngleUnit::Radian => match operand {
            Expr::Rational(r) if r.is_zero() => Some(Rational64::zero()),
            Expr::Constant(MathConstant::Pi) => Some(Rational64::one()),
            Expr::Multiplication(ops) if ops.len() == 2 => match (&ops[0], &ops[1]) {
                (Expr::Rational(r), Expr::Constant(MathConstant::Pi)) => Some(*r),
                _ => None,
            },
            _ => None,
        },
        AngleUnit::Degree => operand
            .as_rational()
            .and_then(|r| r.checked_div(&Rational64::from_integer(180))),
    }
}

/// `t` reduced into [0, 2).
fn normalized_half_turns(t: Rational64) -> Option<Rational64> {
    let two = Rational64::from_integer(2);
    let turns = t.checked_div(&two)?.floor();
    t.checked_sub(&turns.checked_mul(&two)?)
}

fn exact_sine(t: Rational64) -> Option<Expr> {
    let t = normalized_half_turns(t)?;
    let value = match (*t.numer(), *t.denom()) {
        (0, 1) | (1, 1) => Expr::integer(0),
        (1, 2) => Expr::integer(1),
        (3, 2) => Expr::integer(-1),
        (1, 6) | (5, 6) => Expr::rational(1, 2),
        (7, 6) | (11, 6) => Expr::rational(-1, 2),
        _ => return None,
    };
    Some(value)
}

fn exact_tangent(t: Rational64) -> Option<Expr> {
    let t = normalized_half_turns(t)?;
    let value = match (*t.numer(), *t.denom()) {
        (0, 1) | (1, 1) => Expr::integer(0),
        (1, 4) | (5, 4) => Expr::integer(1),
        (3, 4) | (7, 4) => Expr::integer(-1),
        (1, 2) | (3, 2) => Expr::Undefined,
        _ => return None,
    };
    Some(value)
}

fn reduce_trigonometric(ty: ExprType, operand: Expr, reducer: &Reducer) -> Expr {
    if let Some(t) = angle_in_half_turns(&operand, reducer.angle_unit) {
        let exact = match ty {
            ExprType::Sine => exact_sine(t),
            ExprType::Cosine => t.checked_add(&Rational64::new(1, 2)).and_then(exact_sine),
            _ => exact_tangent(t),
        };
        if let Some(value) = exact {
            return value;
        }
    }
    if ty == ExprType::Cosine {
        if operand.sign() == Sign::Negative {
            let positive = operand.set_sign(Sign::Positive, reducer);
            return reducer.shallow_reduce(Expr::Cosine(positive.boxed()));
        }
        return Expr::Cosine(operand.boxed());
    }
    reduce_odd_function(ty, operand, reducer)
}

/// f(-x) = -f(x): the negative sign of the operand is pulled out of the function.
fn reduce_odd_function(ty: ExprType, operand: Expr, reducer: &Reducer) -> Expr {
    if operand.is_rational_zero() {
        return Expr::integer(0);
    }
    if operand.sign() == Sign::Negative {
        let positive = operand.set_sign(Sign::Positive, reducer);
        let inner = reducer.shallow_reduce(Expr::unary(ty, positive));
        return reducer.shallow_reduce(Expr::Multiplication(vec![Expr::integer(-1), inner]));
    }
    Expr::unary(ty, operand)
}
