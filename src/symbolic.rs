#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use RustedCalcLayout::symbolic::symbolic_engine::Expr;
/// let parsed_expression = Expr::parse_expression("2*x+√(4)").unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// a module
/// 1) defines the expression tree: operator tags, constructors, operand access
/// 2) turns a symbolic expression into a string expression the parser reads back
/// 3) writes that string into fixed-size byte buffers
///# Example#
/// ```
/// use RustedCalcLayout::symbolic::symbolic_engine::Expr;
/// use RustedCalcLayout::symbolic::symbolic_reduce::{EmptyContext, Reducer};
/// let context = EmptyContext;
/// let reducer = Reducer::new(&context);
/// let expression = Expr::parse_expression("abs(-3)+1/2").unwrap();
/// let reduced = expression.deep_reduce(&reducer);
/// assert_eq!(reduced.to_string(), "7/2");
/// let mut buffer = [0u8; 4];
/// let written = reduced.write_text_in_buffer(&mut buffer);
/// assert_eq!(written, 3);
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
/// exact rational helpers with overflow checks
pub mod symbolic_numbers;
/// sign facts and forced signs
pub mod symbolic_sign;
///______________________________________________________________________________________________________________________________________________
/// reduction engine: shallow/deep reduce, contexts, elementwise matrix mapping
/// Example#
/// ```
/// use RustedCalcLayout::symbolic::symbolic_engine::Expr;
/// use RustedCalcLayout::symbolic::symbolic_reduce::{GlobalContext, Reducer};
/// let mut context = GlobalContext::new();
/// context.set_expression_for_symbol("x", Expr::integer(2));
/// let reducer = Reducer::new(&context);
/// let reduced = Expr::parse_expression("x^3-1").unwrap().deep_reduce(&reducer);
/// assert_eq!(reduced, Expr::integer(7));
/// ```
pub mod symbolic_reduce;
/// local rewrite rule of every operator
pub mod symbolic_reduce_rules;
///______________________________________________________________________________________________________________________________________________
/// numeric evaluation over complex numbers at f32 or f64 precision
/// Example#
/// ```
/// use RustedCalcLayout::symbolic::symbolic_engine::Expr;
/// use RustedCalcLayout::symbolic::symbolic_reduce::{AngleUnit, EmptyContext};
/// let expression = Expr::parse_expression("cos(π)").unwrap();
/// let value = expression.approximate::<f64>(&EmptyContext, AngleUnit::Radian);
/// let real = value.to_real().unwrap();
/// assert!((real + 1.0).abs() < 1e-12);
/// ```
pub mod symbolic_approximate;
/// text rendering of floats in decimal, scientific and engineering modes
pub mod print_float;
/// expression → layout tree
pub mod symbolic_layout;
#[cfg(test)]
mod symbolic_engine_tests;
