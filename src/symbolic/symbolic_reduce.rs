//! # Reduction Engine
//!
//! Rewrites expressions toward a canonical simplified form.
//!
//! ## Main Structures
//! - [`Reducer`]: carries the evaluation [`Context`], the [`AngleUnit`] and the
//!   `matrix_exact_reducing` flag that enables elementwise matrix mapping.
//! - [`Context`]: symbol lookup, with [`GlobalContext`] and [`EmptyContext`] provided.
//!
//! ## Algorithm
//! - **shallow reduce**: applies the engine-wide rules first (Undefined propagation, then
//!   elementwise mapping over a matrix first operand), then exactly one operator rule
//!   from `symbolic_reduce_rules`. The node is consumed and the replacement returned, so
//!   callers always continue with the returned value.
//! - **deep reduce**: detaches every operand, deep reduces it, reattaches it in the same
//!   slot and finally shallow reduces the node itself. Applying it twice yields the same
//!   tree as applying it once.

use crate::symbolic::symbolic_engine::{Expr, ExprType};
use crate::symbolic::symbolic_reduce_rules::apply_operator_rule;
use log::trace;
use std::collections::{HashMap, HashSet};

/// Angle unit used by trigonometric rules and evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AngleUnit {
    Degree,
    #[default]
    Radian,
}

/// Source of values for free symbols.
pub trait Context {
    fn expression_for_symbol(&self, name: &str) -> Option<Expr>;
}

/// Context without any symbol bound.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyContext;

/// Whether expanding `name` through the bindings of `context` leads back to `name`.
///
/// Covers direct self-reference (`x := x+1`) as well as longer chains (`x := y`, `y := x`).
pub fn is_defined_cyclically(context: &dyn Context, name: &str) -> bool {
    let mut visited = HashSet::new();
    let mut pending: Vec<String> = match context.expression_for_symbol(name) {
        Some(value) => value.free_symbols(),
        None => return false,
    };
    while let Some(symbol) = pending.pop() {
        if symbol == name {
            return true;
        }
        if !visited.insert(symbol.clone()) {
            continue;
        }
        if let Some(value) = context.expression_for_symbol(&symbol) {
            pending.extend(value.free_symbols());
        }
    }
    false
}

impl Context for EmptyContext {
    fn expression_for_symbol(&self, _name: &str) -> Option<Expr> {
        None
    }
}

/// Context storing symbol bindings in a map.
#[derive(Clone, Debug, Default)]
pub struct GlobalContext {
    symbols: HashMap<String, Expr>,
}

impl GlobalContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_expression_for_symbol(&mut self, name: &str, expression: Expr) {
        self.symbols.insert(name.to_string(), expression);
    }

    pub fn remove_symbol(&mut self, name: &str) -> Option<Expr> {
        self.symbols.remove(name)
    }
}

impl Context for GlobalContext {
    fn expression_for_symbol(&self, name: &str) -> Option<Expr> {
        self.symbols.get(name).cloned()
    }
}

/// Reduction settings shared by every rule of one reduction pass.
#[derive(Clone, Copy)]
pub struct Reducer<'a> {
    pub context: &'a dyn Context,
    pub angle_unit: AngleUnit,
    /// Maps elementwise operators over matrix operands and folds matrix arithmetic.
    pub matrix_exact_reducing: bool,
}

impl<'a> Reducer<'a> {
    pub fn new(context: &'a dyn Context) -> Self {
        Reducer {
            context,
            angle_unit: AngleUnit::Radian,
            matrix_exact_reducing: true,
        }
    }

    pub fn with_angle_unit(mut self, angle_unit: AngleUnit) -> Self {
        self.angle_unit = angle_unit;
        self
    }

    pub fn with_matrix_exact_reducing(mut self, enabled: bool) -> Self {
        self.matrix_exact_reducing = enabled;
        self
    }

    /// Local rewrite of one node whose operands are already reduced.
    pub fn shallow_reduce(&self, expression: Expr) -> Expr {
        if expression.ty() != ExprType::Matrix
            && expression.operands().iter().any(|op| op.is_undefined())
        {
            return Expr::Undefined;
        }
        if self.matrix_exact_reducing
            && expression.ty().is_elementwise()
            && expression.number_of_operands() > 0
            && expression.operand(0).is_matrix()
        {
            return self.map_on_matrix_first_child(expression);
        }
        apply_operator_rule(expression, self)
    }

    /// Bottom-up reduction of the whole tree.
    pub fn deep_reduce(&self, mut expression: Expr) -> Expr {
        for index in 0..expression.number_of_operands() {
            let child = expression.replace_operand(index, Expr::Undefined);
            let reduced = self.deep_reduce(child);
            expression.replace_operand(index, reduced);
        }
        let before = expression.ty();
        let reduced = self.shallow_reduce(expression);
        trace!("reduced {} node to {}", before, reduced.ty());
        reduced
    }

    /// Applies the operator of `expression` entry by entry to its matrix first operand.
    ///
    /// Other operands are cloned into every entry. The resulting matrix is deep reduced.
    pub fn map_on_matrix_first_child(&self, expression: Expr) -> Expr {
        let template = expression.clone();
        let mut operands = expression.into_operands();
        let matrix = operands.remove(0);
        let Expr::Matrix {
            rows,
            columns,
            entries,
        } = matrix
        else {
            panic!("first operand of {} is not a matrix", template.ty());
        };
        let mapped = entries
            .into_iter()
            .map(|entry| {
                let mut entry_operands = Vec::with_capacity(operands.len() + 1);
                entry_operands.push(entry);
                entry_operands.extend(operands.iter().cloned());
                template.with_operands(entry_operands)
            })
            .collect();
        self.deep_reduce(Expr::matrix(rows, columns, mapped))
    }

    /// Deep reduction of a borrowed expression; the input is left untouched.
    pub fn reduced(&self, expression: &Expr) -> Expr {
        self.deep_reduce(expression.clone())
    }
}

impl Expr {
    /// Shallow reduction with the given reducer.
    pub fn shallow_reduce(self, reducer: &Reducer) -> Expr {
        reducer.shallow_reduce(self)
    }

    /// Deep reduction with the given reducer.
    pub fn deep_reduce(self, reducer: &Reducer) -> Expr {
        reducer.deep_reduce(self)
    }

    /// Names of the free symbols of the subtree, in first-occurrence order.
    pub fn free_symbols(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_symbols(&mut names);
        names
    }

    fn collect_symbols(&self, names: &mut Vec<String>) {
        match self {
            Expr::Symbol(s) => {
                if !names.contains(s) {
                    names.push(s.clone());
                }
            }
            other => other.operands().iter().for_each(|op| op.collect_symbols(names)),
        }
    }
}
