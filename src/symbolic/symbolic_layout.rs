//! Expression → layout construction.
//!
//! Children are laid out first and then wrapped in the operator's shape. Every operator
//! produces a list of run items (leaves and compounds); slots of compounds are built from
//! those lists, so the resulting tree never nests a run directly inside a run.

use crate::layout::layout_engine::{LayoutId, LayoutTree};
use crate::layout::layout_shapes::{
    BracketKind, BracketLayout, ConjugateLayout, FractionLayout, HorizontalLayout, LayoutKind,
    MatrixLayout, NthRootLayout, VerticalOffsetLayout, VerticalPosition,
};
use crate::symbolic::print_float::{DisplayMode, float_to_text};
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_numbers::decimal_to_rational;
use num::rational::Rational64;
use num_traits::Signed;

/// Rendering options shared by a whole layout construction.
#[derive(Clone, Copy, Debug)]
struct LayoutStyle {
    mode: DisplayMode,
    significant_digits: usize,
}

/// Binding strength of the typeset form: fractions are stacked and need no parentheses.
fn layout_precedence(expression: &Expr) -> u8 {
    match expression {
        Expr::Division(..) => 6,
        Expr::Rational(r) if !r.is_integer() && !r.is_negative() => 6,
        _ => expression.precedence(),
    }
}

impl Expr {
    /// Typeset layout of the expression with numbers written in `mode` with
    /// `significant_digits` digits.
    pub fn create_layout(&self, mode: DisplayMode, significant_digits: usize) -> LayoutTree {
        let mut tree = LayoutTree::with_root(LayoutKind::Horizontal(HorizontalLayout));
        let style = LayoutStyle {
            mode,
            significant_digits,
        };
        let items = self.layout_items(&mut tree, style);
        let root = tree.root();
        for item in items {
            tree.append_child(root, item);
        }
        tree.refill_if_empty(root);
        tree
    }

    fn layout_items(&self, tree: &mut LayoutTree, style: LayoutStyle) -> Vec<LayoutId> {
        match self {
            Expr::Undefined => text_items(tree, "undef"),
            Expr::Rational(r) => rational_items(tree, r),
            Expr::Decimal { mantissa, exponent } => {
                let value = decimal_to_rational(*mantissa, *exponent)
                    .map(|r| *r.numer() as f64 / *r.denom() as f64)
                    .unwrap_or_else(|| *mantissa as f64 * 10f64.powi(*exponent));
                text_items(tree, &float_to_text(value, style.mode, style.significant_digits))
            }
            Expr::Symbol(name) => text_items(tree, name),
            Expr::Constant(c) => vec![tree.add_leaf(LayoutKind::char(c.symbol()))],
            Expr::Random => text_items(tree, "random()"),
            Expr::Addition(operands) => {
                joined_items(tree, operands, '+', |_, op| layout_precedence(op) <= 1, style)
            }
            Expr::Multiplication(operands) => joined_items(
                tree,
                operands,
                '×',
                |index, op| {
                    let precedence = layout_precedence(op);
                    precedence <= 2 || (index > 0 && precedence == 3)
                },
                style,
            ),
            Expr::Subtraction(a, b) => {
                let mut items = a.layout_items(tree, style);
                items.push(tree.add_leaf(LayoutKind::char('-')));
                items.extend(operand_items(tree, b, layout_precedence(b) <= 1, style));
                items
            }
            Expr::Division(a, b) => {
                let numerator = a.slot_layout(tree, style);
                let denominator = b.slot_layout(tree, style);
                vec![tree.add_node(
                    LayoutKind::Fraction(FractionLayout),
                    vec![numerator, denominator],
                )]
            }
            Expr::Opposite(a) => {
                let mut items = vec![tree.add_leaf(LayoutKind::char('-'))];
                items.extend(operand_items(tree, a, layout_precedence(a) <= 3, style));
                items
            }
            Expr::Power(base, exponent) => {
                let mut items = operand_items(tree, base, layout_precedence(base) <= 4, style);
                let slot = exponent.slot_layout(tree, style);
                items.push(tree.add_node(
                    LayoutKind::VerticalOffset(VerticalOffsetLayout {
                        position: VerticalPosition::Superscript,
                    }),
                    vec![slot],
                ));
                items
            }
            Expr::Factorial(a) => {
                let mut items = operand_items(tree, a, layout_precedence(a) < 6, style);
                items.push(tree.add_leaf(LayoutKind::char('!')));
                items
            }
            Expr::SquareRoot(a) => {
                let radicand = a.slot_layout(tree, style);
                vec![tree.add_node(
                    LayoutKind::NthRoot(NthRootLayout { has_index: false }),
                    vec![radicand],
                )]
            }
            Expr::NthRoot(a, n) => {
                let radicand = a.slot_layout(tree, style);
                let index = n.slot_layout(tree, style);
                vec![tree.add_node(
                    LayoutKind::NthRoot(NthRootLayout { has_index: true }),
                    vec![radicand, index],
                )]
            }
            Expr::Parenthesis(a) => operand_items(tree, a, true, style),
            Expr::AbsoluteValue(a) => bracket_items(tree, a, BracketKind::AbsoluteValue, style),
            Expr::Floor(a) => bracket_items(tree, a, BracketKind::Floor, style),
            Expr::Ceiling(a) => bracket_items(tree, a, BracketKind::Ceiling, style),
            Expr::Conjugate(a) => {
                let slot = a.slot_layout(tree, style);
                vec![tree.add_node(LayoutKind::Conjugate(ConjugateLayout), vec![slot])]
            }
            Expr::Logarithm(a, base) => {
                let mut items = text_items(tree, "log");
                let slot = base.slot_layout(tree, style);
                items.push(tree.add_node(
                    LayoutKind::VerticalOffset(VerticalOffsetLayout {
                        position: VerticalPosition::Subscript,
                    }),
                    vec![slot],
                ));
                items.extend(operand_items(tree, a, true, style));
                items
            }
            Expr::Matrix {
                rows,
                columns,
                entries,
            } => {
                let cells = entries.iter().map(|e| e.slot_layout(tree, style)).collect();
                vec![tree.add_node(
                    LayoutKind::Matrix(MatrixLayout {
                        rows: *rows,
                        columns: *columns,
                    }),
                    cells,
                )]
            }
            named => {
                let name = named.ty().function_name().unwrap_or("?");
                let mut items = text_items(tree, name);
                items.extend(operand_items(tree, named.operand(0), true, style));
                items
            }
        }
    }

    /// Compound slot holding the layout of `self`.
    fn slot_layout(&self, tree: &mut LayoutTree, style: LayoutStyle) -> LayoutId {
        let items = self.layout_items(tree, style);
        tree.slot(items)
    }
}

fn text_items(tree: &mut LayoutTree, text: &str) -> Vec<LayoutId> {
    text.chars().map(|c| tree.add_leaf(LayoutKind::char(c))).collect()
}

fn rational_items(tree: &mut LayoutTree, r: &Rational64) -> Vec<LayoutId> {
    if r.is_integer() {
        return text_items(tree, &r.numer().to_string());
    }
    let mut items = if r.is_negative() {
        vec![tree.add_leaf(LayoutKind::char('-'))]
    } else {
        Vec::new()
    };
    let numerator = text_items(tree, &r.numer().abs().to_string());
    let denominator = text_items(tree, &r.denom().to_string());
    let numerator = tree.slot(numerator);
    let denominator = tree.slot(denominator);
    items.push(tree.add_node(
        LayoutKind::Fraction(FractionLayout),
        vec![numerator, denominator],
    ));
    items
}

fn operand_items(
    tree: &mut LayoutTree,
    operand: &Expr,
    parenthesized: bool,
    style: LayoutStyle,
) -> Vec<LayoutId> {
    let inner = operand.layout_items(tree, style);
    if !parenthesized {
        return inner;
    }
    let mut items = Vec::with_capacity(inner.len() + 2);
    items.push(tree.add_leaf(LayoutKind::char('(')));
    items.extend(inner);
    items.push(tree.add_leaf(LayoutKind::char(')')));
    items
}

fn joined_items(
    tree: &mut LayoutTree,
    operands: &[Expr],
    separator: char,
    needs_parentheses: impl Fn(usize, &Expr) -> bool,
    style: LayoutStyle,
) -> Vec<LayoutId> {
    let mut items = Vec::new();
    for (index, operand) in operands.iter().enumerate() {
        if index > 0 {
            items.push(tree.add_leaf(LayoutKind::char(separator)));
        }
        items.extend(operand_items(
            tree,
            operand,
            needs_parentheses(index, operand),
            style,
        ));
    }
    items
}

fn bracket_items(tree: &mut LayoutTree, operand: &Expr, kind: BracketKind, style: LayoutStyle) -> Vec<LayoutId> {
    let slot = operand.slot_layout(tree, style);
    vec![tree.add_node(LayoutKind::Bracket(BracketLayout { kind }), vec![slot])]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::layout_shapes::LayoutShape;
    use crate::symbolic::parse_expr::parse_expression;

    fn layout_text(input: &str) -> String {
        let e = parse_expression(input).unwrap();
        e.create_layout(DisplayMode::Decimal, 10).to_text()
    }

    #[test]
    fn test_layout_text_reads_back() {
        for input in ["1+2", "x*y", "2^3", "√(2)", "abs(x)", "log(8,2)", "[[1,2][3,4]]", "sin(x)", "-(a+b)"] {
            let e = parse_expression(input).unwrap();
            let text = e.create_layout(DisplayMode::Decimal, 10).to_text();
            let again = parse_expression(&text).unwrap();
            let text_again = again.create_layout(DisplayMode::Decimal, 10).to_text();
            assert_eq!(text, text_again, "{}", input);
        }
    }

    #[test]
    fn test_fraction_layout() {
        assert_eq!(layout_text("1/2"), "((1)/(2))");
        let tree = parse_expression("1/2").unwrap().create_layout(DisplayMode::Decimal, 10);
        let root = tree.root();
        assert_eq!(tree.number_of_children(root), 1);
        assert!(matches!(tree.kind(tree.child(root, 0)), LayoutKind::Fraction(_)));
    }

    #[test]
    fn test_operators_and_parentheses() {
        assert_eq!(layout_text("2*(x+1)"), "2*(x+1)");
        assert_eq!(layout_text("x^2"), "x^(2)");
        assert_eq!(layout_text("log(8,2)"), "log(8,2)");
        assert_eq!(layout_text("3!"), "3!");
        assert_eq!(layout_text("floor(x)"), "floor(x)");
    }

    #[test]
    fn test_decimal_uses_display_mode() {
        let e = Expr::decimal(15, 2);
        let tree = e.create_layout(DisplayMode::Scientific, 10);
        assert_eq!(tree.to_text(), "1.5E3");
    }

    #[test]
    fn test_tree_invariants() {
        let tree = parse_expression("√(1+x/2)*[[1,a][b,c]]")
            .unwrap()
            .create_layout(DisplayMode::Decimal, 10);
        for id in tree.descendants(tree.root()) {
            let kind = tree.kind(id);
            if kind.is_horizontal() {
                for child in tree.children(id) {
                    assert!(!tree.is_horizontal(*child));
                }
            } else if !kind.is_leaf() {
                for child in tree.children(id) {
                    assert!(tree.is_horizontal(*child));
                }
            }
        }
    }
}
