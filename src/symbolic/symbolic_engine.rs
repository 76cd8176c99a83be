//! # Symbolic Engine Module
//!
//! This module provides the expression tree used by the whole calculator core: every
//! parsed or constructed mathematical expression is an [`Expr`], a closed tagged-variant
//! tree that owns its operands.
//!
//! ## Purpose
//!
//! The expression model allows the rest of the crate to:
//! - identify an operator through its tag ([`ExprType`]) without inspecting its operands
//! - clone whole subtrees (a clone never shares nodes with its source)
//! - walk and rewrite operands through a single substitution primitive
//!   ([`Expr::replace_operand`]) that detaches the old child and attaches the new one
//! - render itself as parseable text, either as a `String` or into a fixed-capacity buffer
//!
//! ## Main Structures
//!
//! ### `Expr` Enum
//! - **Leaves**: `Rational`, `Decimal`, `Symbol`, `Constant`, `Undefined`, `Random`
//! - **Arithmetic**: `Addition`, `Subtraction`, `Multiplication`, `Division`, `Opposite`,
//!   `Power`, `SquareRoot`, `NthRoot`, `Factorial`, `Parenthesis`
//! - **Parts**: `AbsoluteValue`, `Conjugate`, `RealPart`, `ImaginaryPart`, `Floor`, `Ceiling`
//! - **Functions**: trigonometric, hyperbolic, their inverses, `NaperianLogarithm`, `Logarithm`
//! - **Matrix**: a `rows x columns` grid of entries stored row-major
//!
//! Arity is fixed per tag: unary operators hold one `Box<Expr>`, binary ones two,
//! `Addition`/`Multiplication` hold any number of operands.
//!
//! ## Interesting Code Features
//!
//! 1. **Tag/variant split**: [`ExprType`] is a fieldless mirror of the variants, iterable
//!    through `strum`, so per-operator tables (`function_name`, `is_elementwise`, ...)
//!    are plain `match`es on the tag.
//! 2. **Operator overloading**: `std::ops` traits build expressions with natural syntax.
//! 3. **Sign, reduction, evaluation and layout** live in sibling modules as further
//!    `impl Expr` blocks, one concern per file.

#![allow(non_camel_case_types)]

use itertools::Itertools;
use num::rational::Rational64;
use num_traits::{One, Signed, Zero};
use std::fmt;
use strum_macros::{EnumIter, IntoStaticStr};

/// Operator tag of an expression node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum ExprType {
    Undefined,
    Rational,
    Decimal,
    Symbol,
    Constant,
    Random,
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Opposite,
    Power,
    SquareRoot,
    NthRoot,
    Factorial,
    Parenthesis,
    AbsoluteValue,
    Conjugate,
    RealPart,
    ImaginaryPart,
    Floor,
    Ceiling,
    Sine,
    Cosine,
    Tangent,
    ArcSine,
    ArcCosine,
    ArcTangent,
    HyperbolicSine,
    HyperbolicCosine,
    HyperbolicTangent,
    HyperbolicArcSine,
    HyperbolicArcCosine,
    HyperbolicArcTangent,
    NaperianLogarithm,
    Logarithm,
    Matrix,
}

impl ExprType {
    /// Name used both by the text serialization and by the parser for operators that are
    /// written as a function call.
    pub fn function_name(self) -> Option<&'static str> {
        let name = match self {
            ExprType::AbsoluteValue => "abs",
            ExprType::Conjugate => "conj",
            ExprType::RealPart => "re",
            ExprType::ImaginaryPart => "im",
            ExprType::Floor => "floor",
            ExprType::Ceiling => "ceil",
            ExprType::Sine => "sin",
            ExprType::Cosine => "cos",
            ExprType::Tangent => "tan",
            ExprType::ArcSine => "asin",
            ExprType::ArcCosine => "acos",
            ExprType::ArcTangent => "atan",
            ExprType::HyperbolicSine => "sinh",
            ExprType::HyperbolicCosine => "cosh",
            ExprType::HyperbolicTangent => "tanh",
            ExprType::HyperbolicArcSine => "asinh",
            ExprType::HyperbolicArcCosine => "acosh",
            ExprType::HyperbolicArcTangent => "atanh",
            ExprType::NaperianLogarithm => "ln",
            ExprType::Logarithm => "log",
            ExprType::NthRoot => "root",
            ExprType::Random => "random",
            _ => return None,
        };
        Some(name)
    }

    /// Inverse of [`ExprType::function_name`] restricted to one-operand functions.
    pub fn unary_function_from_name(name: &str) -> Option<ExprType> {
        let ty = match name {
            "abs" => ExprType::AbsoluteValue,
            "conj" => ExprType::Conjugate,
            "re" => ExprType::RealPart,
            "im" => ExprType::ImaginaryPart,
            "floor" => ExprType::Floor,
            "ceil" => ExprType::Ceiling,
            "sin" => ExprType::Sine,
            "cos" => ExprType::Cosine,
            "tan" => ExprType::Tangent,
            "asin" | "arcsin" => ExprType::ArcSine,
            "acos" | "arccos" => ExprType::ArcCosine,
            "atan" | "arctan" => ExprType::ArcTangent,
            "sinh" => ExprType::HyperbolicSine,
            "cosh" => ExprType::HyperbolicCosine,
            "tanh" => ExprType::HyperbolicTangent,
            "asinh" => ExprType::HyperbolicArcSine,
            "acosh" => ExprType::HyperbolicArcCosine,
            "atanh" => ExprType::HyperbolicArcTangent,
            "ln" => ExprType::NaperianLogarithm,
            "sqrt" => ExprType::SquareRoot,
            _ => return None,
        };
        Some(ty)
    }

    /// Operators whose one-operand mathematics extends entry by entry to a matrix operand.
    pub fn is_elementwise(self) -> bool {
        matches!(
            self,
            ExprType::Opposite
                | ExprType::SquareRoot
                | ExprType::NthRoot
                | ExprType::Factorial
                | ExprType::AbsoluteValue
                | ExprType::Conjugate
                | ExprType::RealPart
                | ExprType::ImaginaryPart
                | ExprType::Floor
                | ExprType::Ceiling
                | ExprType::Sine
                | ExprType::Cosine
                | ExprType::Tangent
                | ExprType::ArcSine
                | ExprType::ArcCosine
                | ExprType::ArcTangent
                | ExprType::HyperbolicSine
                | ExprType::HyperbolicCosine
                | ExprType::HyperbolicTangent
                | ExprType::HyperbolicArcSine
                | ExprType::HyperbolicArcCosine
                | ExprType::HyperbolicArcTangent
                | ExprType::NaperianLogarithm
                | ExprType::Logarithm
        )
    }

    /// One-operand operators that can be rebuilt with [`Expr::unary`].
    pub fn is_unary(self) -> bool {
        matches!(
            self,
            ExprType::Opposite
                | ExprType::SquareRoot
                | ExprType::Factorial
                | ExprType::Parenthesis
                | ExprType::AbsoluteValue
                | ExprType::Conjugate
                | ExprType::RealPart
                | ExprType::ImaginaryPart
                | ExprType::Floor
                | ExprType::Ceiling
                | ExprType::Sine
                | ExprType::Cosine
                | ExprType::Tangent
                | ExprType::ArcSine
                | ExprType::ArcCosine
                | ExprType::ArcTangent
                | ExprType::HyperbolicSine
                | ExprType::HyperbolicCosine
                | ExprType::HyperbolicTangent
                | ExprType::HyperbolicArcSine
                | ExprType::HyperbolicArcCosine
                | ExprType::HyperbolicArcTangent
                | ExprType::NaperianLogarithm
        )
    }
}

impl fmt::Display for ExprType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name: &'static str = self.into();
        write!(f, "{}", name)
    }
}

/// Named mathematical constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MathConstant {
    Pi,
    E,
    ImaginaryUnit,
}

impl MathConstant {
    pub fn symbol(self) -> char {
        match self {
            MathConstant::Pi => 'π',
            MathConstant::E => 'e',
            MathConstant::ImaginaryUnit => 'i',
        }
    }
}

/// Core symbolic expression enum: one variant per operator, operands owned by the node.
///
/// # Examples
/// ```rust, ignore
/// let x = Expr::symbol("x");
/// let e = Expr::AbsoluteValue(Box::new(x.clone() - Expr::integer(3)));
/// assert_eq!(e.ty(), ExprType::AbsoluteValue);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Undefined result (division by zero, out-of-domain exact value, ...)
    Undefined,
    /// Exact rational number, always in lowest terms with a positive denominator
    Rational(Rational64),
    /// Decimal literal `mantissa * 10^exponent`, kept exact until reduction
    Decimal { mantissa: i64, exponent: i32 },
    /// Free variable, possibly bound by the evaluation context
    Symbol(String),
    /// π, e or i
    Constant(MathConstant),
    /// Uniform sample in [0, 1), drawn at evaluation time
    Random,
    Addition(Vec<Expr>),
    Subtraction(Box<Expr>, Box<Expr>),
    Multiplication(Vec<Expr>),
    Division(Box<Expr>, Box<Expr>),
    Opposite(Box<Expr>),
    /// base ^ exponent
    Power(Box<Expr>, Box<Expr>),
    SquareRoot(Box<Expr>),
    /// radicand, index
    NthRoot(Box<Expr>, Box<Expr>),
    Factorial(Box<Expr>),
    Parenthesis(Box<Expr>),
    AbsoluteValue(Box<Expr>),
    Conjugate(Box<Expr>),
    RealPart(Box<Expr>),
    ImaginaryPart(Box<Expr>),
    Floor(Box<Expr>),
    Ceiling(Box<Expr>),
    Sine(Box<Expr>),
    Cosine(Box<Expr>),
    Tangent(Box<Expr>),
    ArcSine(Box<Expr>),
    ArcCosine(Box<Expr>),
    ArcTangent(Box<Expr>),
    HyperbolicSine(Box<Expr>),
    HyperbolicCosine(Box<Expr>),
    HyperbolicTangent(Box<Expr>),
    HyperbolicArcSine(Box<Expr>),
    HyperbolicArcCosine(Box<Expr>),
    HyperbolicArcTangent(Box<Expr>),
    NaperianLogarithm(Box<Expr>),
    /// value, base
    Logarithm(Box<Expr>, Box<Expr>),
    /// entries stored row-major, `entries.len() == rows * columns`
    Matrix {
        rows: usize,
        columns: usize,
        entries: Vec<Expr>,
    },
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Addition(vec![self, rhs])
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Subtraction(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Multiplication(vec![self, rhs])
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Division(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Opposite(self.boxed())
    }
}

impl Expr {
    /// BASIC FEATURES

    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    pub fn integer(value: i64) -> Expr {
        Expr::Rational(Rational64::from_integer(value))
    }

    /// Exact rational `numerator / denominator`.
    ///
    /// # Panics
    /// Panics when `denominator` is zero; use [`Expr::Division`] for symbolic division.
    pub fn rational(numerator: i64, denominator: i64) -> Expr {
        assert!(denominator != 0, "rational with zero denominator");
        Expr::Rational(Rational64::new(numerator, denominator))
    }

    pub fn decimal(mantissa: i64, exponent: i32) -> Expr {
        Expr::Decimal { mantissa, exponent }
    }

    pub fn symbol(name: &str) -> Expr {
        Expr::Symbol(name.to_string())
    }

    pub fn pi() -> Expr {
        Expr::Constant(MathConstant::Pi)
    }

    pub fn e() -> Expr {
        Expr::Constant(MathConstant::E)
    }

    pub fn i() -> Expr {
        Expr::Constant(MathConstant::ImaginaryUnit)
    }

    pub fn pow(self, exponent: Expr) -> Expr {
        Expr::Power(self.boxed(), exponent.boxed())
    }

    /// Builds a canonical one-operand wrapper `ty(operand)`.
    ///
    /// # Panics
    /// Panics when `ty` is not a one-operand operator.
    pub fn unary(ty: ExprType, operand: Expr) -> Expr {
        let op = operand.boxed();
        match ty {
            ExprType::Opposite => Expr::Opposite(op),
            ExprType::SquareRoot => Expr::SquareRoot(op),
            ExprType::Factorial => Expr::Factorial(op),
            ExprType::Parenthesis => Expr::Parenthesis(op),
            ExprType::AbsoluteValue => Expr::AbsoluteValue(op),
            ExprType::Conjugate => Expr::Conjugate(op),
            ExprType::RealPart => Expr::RealPart(op),
            ExprType::ImaginaryPart => Expr::ImaginaryPart(op),
            ExprType::Floor => Expr::Floor(op),
            ExprType::Ceiling => Expr::Ceiling(op),
            ExprType::Sine => Expr::Sine(op),
            ExprType::Cosine => Expr::Cosine(op),
            ExprType::Tangent => Expr::Tangent(op),
            ExprType::ArcSine => Expr::ArcSine(op),
            ExprType::ArcCosine => Expr::ArcCosine(op),
            ExprType::ArcTangent => Expr::ArcTangent(op),
            ExprType::HyperbolicSine => Expr::HyperbolicSine(op),
            ExprType::HyperbolicCosine => Expr::HyperbolicCosine(op),
            ExprType::HyperbolicTangent => Expr::HyperbolicTangent(op),
            ExprType::HyperbolicArcSine => Expr::HyperbolicArcSine(op),
            ExprType::HyperbolicArcCosine => Expr::HyperbolicArcCosine(op),
            ExprType::HyperbolicArcTangent => Expr::HyperbolicArcTangent(op),
            ExprType::NaperianLogarithm => Expr::NaperianLogarithm(op),
            other => panic!("{} is not a one-operand operator", other),
        }
    }

    /// Builds a matrix from row-major entries.
    ///
    /// # Panics
    /// Panics when the entry count does not match the dimensions.
    pub fn matrix(rows: usize, columns: usize, entries: Vec<Expr>) -> Expr {
        assert!(rows > 0 && columns > 0, "matrix dimensions must be positive");
        assert_eq!(entries.len(), rows * columns, "matrix entry count mismatch");
        Expr::Matrix {
            rows,
            columns,
            entries,
        }
    }

    /// Operator tag of this node.
    pub fn ty(&self) -> ExprType {
        match self {
            Expr::Undefined => ExprType::Undefined,
            Expr::Rational(_) => ExprType::Rational,
            Expr::Decimal { .. } => ExprType::Decimal,
            Expr::Symbol(_) => ExprType::Symbol,
            Expr::Constant(_) => ExprType::Constant,
            Expr::Random => ExprType::Random,
            Expr::Addition(_) => ExprType::Addition,
            Expr::Subtraction(..) => ExprType::Subtraction,
            Expr::Multiplication(_) => ExprType::Multiplication,
            Expr::Division(..) => ExprType::Division,
            Expr::Opposite(_) => ExprType::Opposite,
            Expr::Power(..) => ExprType::Power,
            Expr::SquareRoot(_) => ExprType::SquareRoot,
            Expr::NthRoot(..) => ExprType::NthRoot,
            Expr::Factorial(_) => ExprType::Factorial,
            Expr::Parenthesis(_) => ExprType::Parenthesis,
            Expr::AbsoluteValue(_) => ExprType::AbsoluteValue,
            Expr::Conjugate(_) => ExprType::Conjugate,
            Expr::RealPart(_) => ExprType::RealPart,
            Expr::ImaginaryPart(_) => ExprType::ImaginaryPart,
            Expr::Floor(_) => ExprType::Floor,
            Expr::Ceiling(_) => ExprType::Ceiling,
            Expr::Sine(_) => ExprType::Sine,
            Expr::Cosine(_) => ExprType::Cosine,
            Expr::Tangent(_) => ExprType::Tangent,
            Expr::ArcSine(_) => ExprType::ArcSine,
            Expr::ArcCosine(_) => ExprType::ArcCosine,
            Expr::ArcTangent(_) => ExprType::ArcTangent,
            Expr::HyperbolicSine(_) => ExprType::HyperbolicSine,
            Expr::HyperbolicCosine(_) => ExprType::HyperbolicCosine,
            Expr::HyperbolicTangent(_) => ExprType::HyperbolicTangent,
            Expr::HyperbolicArcSine(_) => ExprType::HyperbolicArcSine,
            Expr::HyperbolicArcCosine(_) => ExprType::HyperbolicArcCosine,
            Expr::HyperbolicArcTangent(_) => ExprType::HyperbolicArcTangent,
            Expr::NaperianLogarithm(_) => ExprType::NaperianLogarithm,
            Expr::Logarithm(..) => ExprType::Logarithm,
            Expr::Matrix { .. } => ExprType::Matrix,
        }
    }

    //__________________________________OPERAND ACCESS____________________________________

    /// Read-only view of the operands in slot order.
    pub fn operands(&self) -> Vec<&Expr> {
        match self {
            Expr::Undefined
            | Expr::Rational(_)
            | Expr::Decimal { .. }
            | Expr::Symbol(_)
            | Expr::Constant(_)
            | Expr::Random => Vec::new(),
            Expr::Addition(ops) | Expr::Multiplication(ops) => ops.iter().collect(),
            Expr::Matrix { entries, .. } => entries.iter().collect(),
            Expr::Subtraction(a, b)
            | Expr::Division(a, b)
            | Expr::Power(a, b)
            | Expr::NthRoot(a, b)
            | Expr::Logarithm(a, b) => vec![a.as_ref(), b.as_ref()],
            Expr::Opposite(a)
            | Expr::SquareRoot(a)
            | Expr::Factorial(a)
            | Expr::Parenthesis(a)
            | Expr::AbsoluteValue(a)
            | Expr::Conjugate(a)
            | Expr::RealPart(a)
            | Expr::ImaginaryPart(a)
            | Expr::Floor(a)
            | Expr::Ceiling(a)
            | Expr::Sine(a)
            | Expr::Cosine(a)
            | Expr::Tangent(a)
            | Expr::ArcSine(a)
            | Expr::ArcCosine(a)
            | Expr::ArcTangent(a)
            | Expr::HyperbolicSine(a)
            | Expr::HyperbolicCosine(a)
            | Expr::HyperbolicTangent(a)
            | Expr::HyperbolicArcSine(a)
            | Expr::HyperbolicArcCosine(a)
            | Expr::HyperbolicArcTangent(a)
            | Expr::NaperianLogarithm(a) => vec![a.as_ref()],
        }
    }

    /// Editable access to the operands. Only rewrite passes use this; any reference
    /// obtained from it is invalid once the owner itself is replaced.
    pub fn operands_mut(&mut self) -> Vec<&mut Expr> {
        match self {
            Expr::Undefined
            | Expr::Rational(_)
            | Expr::Decimal { .. }
            | Expr::Symbol(_)
            | Expr::Constant(_)
            | Expr::Random => Vec::new(),
            Expr::Addition(ops) | Expr::Multiplication(ops) => ops.iter_mut().collect(),
            Expr::Matrix { entries, .. } => entries.iter_mut().collect(),
            Expr::Subtraction(a, b)
            | Expr::Division(a, b)
            | Expr::Power(a, b)
            | Expr::NthRoot(a, b)
            | Expr::Logarithm(a, b) => vec![a.as_mut(), b.as_mut()],
            Expr::Opposite(a)
            | Expr::SquareRoot(a)
            | Expr::Factorial(a)
            | Expr::Parenthesis(a)
            | Expr::AbsoluteValue(a)
            | Expr::Conjugate(a)
            | Expr::RealPart(a)
            | Expr::ImaginaryPart(a)
            | Expr::Floor(a)
            | Expr::Ceiling(a)
            | Expr::Sine(a)
            | Expr::Cosine(a)
            | Expr::Tangent(a)
            | Expr::ArcSine(a)
            | Expr::ArcCosine(a)
            | Expr::ArcTangent(a)
            | Expr::HyperbolicSine(a)
            | Expr::HyperbolicCosine(a)
            | Expr::HyperbolicTangent(a)
            | Expr::HyperbolicArcSine(a)
            | Expr::HyperbolicArcCosine(a)
            | Expr::HyperbolicArcTangent(a)
            | Expr::NaperianLogarithm(a) => vec![a.as_mut()],
        }
    }

    pub fn number_of_operands(&self) -> usize {
        self.operands().len()
    }

    /// # Panics
    /// Panics when `index` is out of range.
    pub fn operand(&self, index: usize) -> &Expr {
        self.operands()[index]
    }

    /// Substitution primitive: detaches the operand at `index`, attaches `new_operand`
    /// in the same slot and hands the detached subtree back to the caller.
    pub fn replace_operand(&mut self, index: usize, new_operand: Expr) -> Expr {
        let mut slots = self.operands_mut();
        assert!(index < slots.len(), "operand index {} out of range", index);
        std::mem::replace(slots.swap_remove(index), new_operand)
    }

    /// Consumes the node and returns its operands in slot order.
    pub fn into_operands(self) -> Vec<Expr> {
        match self {
            Expr::Addition(ops) | Expr::Multiplication(ops) => ops,
            Expr::Matrix { entries, .. } => entries,
            Expr::Subtraction(a, b)
            | Expr::Division(a, b)
            | Expr::Power(a, b)
            | Expr::NthRoot(a, b)
            | Expr::Logarithm(a, b) => vec![*a, *b],
            leaf if leaf.number_of_operands() == 0 => Vec::new(),
            mut unary => {
                let operand = unary.replace_operand(0, Expr::Undefined);
                vec![operand]
            }
        }
    }

    /// Rebuilds a node carrying this node's tag (and matrix shape) around new operands.
    ///
    /// # Panics
    /// Panics when the operand count does not fit the tag's arity.
    pub fn with_operands(&self, mut operands: Vec<Expr>) -> Expr {
        match self {
            Expr::Addition(_) => Expr::Addition(operands),
            Expr::Multiplication(_) => Expr::Multiplication(operands),
            Expr::Matrix { rows, columns, .. } => Expr::matrix(*rows, *columns, operands),
            _ => {
                assert_eq!(
                    operands.len(),
                    self.number_of_operands(),
                    "wrong operand count for {}",
                    self.ty()
                );
                match self {
                    Expr::Subtraction(..) | Expr::Division(..) | Expr::Power(..)
                    | Expr::NthRoot(..) | Expr::Logarithm(..) => {
                        let b = operands.pop().map(Box::new).unwrap_or_default();
                        let a = operands.pop().map(Box::new).unwrap_or_default();
                        match self {
                            Expr::Subtraction(..) => Expr::Subtraction(a, b),
                            Expr::Division(..) => Expr::Division(a, b),
                            Expr::Power(..) => Expr::Power(a, b),
                            Expr::NthRoot(..) => Expr::NthRoot(a, b),
                            _ => Expr::Logarithm(a, b),
                        }
                    }
                    leaf if operands.is_empty() => leaf.clone(),
                    unary => Expr::unary(unary.ty(), operands.pop().unwrap_or_default()),
                }
            }
        }
    }

    /// Total node count of the subtree, this node included.
    pub fn number_of_descendants(&self) -> usize {
        1 + self
            .operands()
            .iter()
            .map(|op| op.number_of_descendants())
            .sum::<usize>()
    }

    //__________________________________NUMBER HELPERS____________________________________

    /// Exact rational value of a `Rational` leaf.
    pub fn as_rational(&self) -> Option<Rational64> {
        match self {
            Expr::Rational(r) => Some(*r),
            _ => None,
        }
    }

    pub fn is_rational_zero(&self) -> bool {
        matches!(self, Expr::Rational(r) if r.is_zero())
    }

    pub fn is_rational_one(&self) -> bool {
        matches!(self, Expr::Rational(r) if r.is_one())
    }

    pub fn is_matrix(&self) -> bool {
        matches!(self, Expr::Matrix { .. })
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Expr::Undefined)
    }

    //__________________________________TEXT SERIALIZATION____________________________________

    /// Binding strength used to decide where the text form needs parentheses.
    pub fn precedence(&self) -> u8 {
        match self {
            Expr::Addition(_) | Expr::Subtraction(..) => 1,
            Expr::Multiplication(_) | Expr::Division(..) => 2,
            Expr::Rational(r) if !r.is_integer() => 2,
            Expr::Opposite(_) => 3,
            Expr::Rational(r) if r.is_negative() => 3,
            Expr::Decimal { mantissa, .. } if *mantissa < 0 => 3,
            Expr::Power(..) => 4,
            Expr::Factorial(_) => 5,
            _ => 6,
        }
    }

    /// Parseable text form of the expression.
    pub fn serialize(&self) -> String {
        self.to_string()
    }

    /// Writes the text form into a fixed-capacity byte buffer.
    ///
    /// See [`write_text_in_buffer`] for the truncation contract.
    pub fn write_text_in_buffer(&self, buffer: &mut [u8]) -> usize {
        write_text_in_buffer(&self.serialize(), buffer)
    }
}

impl Default for Expr {
    fn default() -> Self {
        Expr::Undefined
    }
}

/// Writes `text` into `buffer` as UTF-8 followed by a NUL terminator.
///
/// Output longer than `buffer.len() - 1` bytes is cut at the last whole character that
/// fits; the terminator is always written when the buffer is not empty. Returns the number
/// of bytes written before the terminator.
pub fn write_text_in_buffer(text: &str, buffer: &mut [u8]) -> usize {
    if buffer.is_empty() {
        return 0;
    }
    let capacity = buffer.len() - 1;
    let mut length = text.len().min(capacity);
    while !text.is_char_boundary(length) {
        length -= 1;
    }
    buffer[..length].copy_from_slice(&text.as_bytes()[..length]);
    buffer[length] = 0;
    length
}

/// Plain text of a decimal literal, using positional notation for moderate exponents.
pub fn decimal_to_text(mantissa: i64, exponent: i32) -> String {
    let sign = if mantissa < 0 { "-" } else { "" };
    let digits = mantissa.unsigned_abs().to_string();
    if exponent >= 0 {
        if exponent <= 6 {
            format!("{}{}{}", sign, digits, "0".repeat(exponent as usize))
        } else {
            format!("{}{}E{}", sign, digits, exponent)
        }
    } else {
        let shift = (-exponent) as usize;
        if shift < digits.len() {
            let (int_part, frac_part) = digits.split_at(digits.len() - shift);
            format!("{}{}.{}", sign, int_part, frac_part)
        } else if shift - digits.len() <= 6 {
            format!("{}0.{}{}", sign, "0".repeat(shift - digits.len()), digits)
        } else {
            format!("{}{}E{}", sign, digits, exponent)
        }
    }
}

fn write_operand(f: &mut fmt::Formatter, operand: &Expr, needs_parentheses: bool) -> fmt::Result {
    if needs_parentheses {
        write!(f, "({})", operand)
    } else {
        write!(f, "{}", operand)
    }
}

/// Display implementation producing the parseable text form.
///
/// Parentheses are emitted only where precedence requires them, so that
/// `parse(e.to_string())` rebuilds a structurally equal tree for reduced expressions.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Undefined => write!(f, "undef"),
            Expr::Rational(r) => {
                if r.is_integer() {
                    write!(f, "{}", r.numer())
                } else {
                    write!(f, "{}/{}", r.numer(), r.denom())
                }
            }
            Expr::Decimal { mantissa, exponent } => {
                write!(f, "{}", decimal_to_text(*mantissa, *exponent))
            }
            Expr::Symbol(name) => write!(f, "{}", name),
            Expr::Constant(c) => write!(f, "{}", c.symbol()),
            Expr::Random => write!(f, "random()"),
            Expr::Addition(ops) => {
                for (index, op) in ops.iter().enumerate() {
                    if index > 0 {
                        write!(f, "+")?;
                    }
                    write_operand(f, op, op.precedence() <= 1)?;
                }
                Ok(())
            }
            Expr::Subtraction(a, b) => {
                write_operand(f, a, a.precedence() < 1)?;
                write!(f, "-")?;
                write_operand(f, b, b.precedence() <= 1)
            }
            Expr::Multiplication(ops) => {
                for (index, op) in ops.iter().enumerate() {
                    if index > 0 {
                        write!(f, "*")?;
                    }
                    write_operand(f, op, op.precedence() <= 2)?;
                }
                Ok(())
            }
            Expr::Division(a, b) => {
                write_operand(f, a, a.precedence() < 2)?;
                write!(f, "/")?;
                write_operand(f, b, b.precedence() <= 2)
            }
            Expr::Opposite(a) => {
                write!(f, "-")?;
                write_operand(f, a, a.precedence() <= 3)
            }
            Expr::Power(base, exponent) => {
                write_operand(f, base, base.precedence() <= 4)?;
                write!(f, "^")?;
                write_operand(f, exponent, exponent.precedence() <= 2)
            }
            Expr::Factorial(a) => {
                write_operand(f, a, a.precedence() < 6)?;
                write!(f, "!")
            }
            Expr::SquareRoot(a) => write!(f, "√({})", a),
            Expr::NthRoot(a, n) => write!(f, "root({},{})", a, n),
            Expr::Parenthesis(a) => write!(f, "({})", a),
            Expr::Logarithm(a, base) => write!(f, "log({},{})", a, base),
            Expr::Matrix {
                rows,
                columns,
                entries,
            } => {
                write!(f, "[")?;
                for row in 0..*rows {
                    let cells = entries[row * columns..(row + 1) * columns]
                        .iter()
                        .map(|e| e.to_string())
                        .join(",");
                    write!(f, "[{}]", cells)?;
                }
                write!(f, "]")
            }
            unary => {
                let name = unary.ty().function_name().unwrap_or("?");
                write!(f, "{}({})", name, unary.operand(0))
            }
        }
    }
}
