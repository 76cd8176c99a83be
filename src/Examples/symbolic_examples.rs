#![allow(non_snake_case)]

use crate::Utils::preferences::Preferences;
use crate::symbolic::print_float::{DisplayMode, complex_to_text};
use crate::symbolic::symbolic_approximate::Evaluation;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_reduce::{AngleUnit, EmptyContext, GlobalContext, Reducer};
use crate::symbolic::symbolic_sign::Sign;
/// Parsed input, or `undef` with the parse error printed.
fn parsed(input: &str) -> Expr {
    Expr::parse_expression(input).unwrap_or_else(|err| {
        println!("{}: {}", input, err);
        Expr::Undefined
    })
}

#[allow(dead_code)]
pub fn sym_examples(example: usize) {
    match example {
        0 => {
            // PARSE, REDUCE, PRINT
            let input = "abs(-3)+1/2+√(9/4)";
            let parsed_expression = match Expr::parse_expression(input) {
                Ok(expression) => expression,
                Err(err) => {
                    println!("{}", err);
                    return;
                }
            };
            println!(" parsed_expression {}", parsed_expression);
            println!(" number of nodes {}", parsed_expression.number_of_descendants());
            let context = EmptyContext;
            let reducer = Reducer::new(&context);
            let reduced = parsed_expression.deep_reduce(&reducer);
            println!(" reduced {}", reduced);
            // the text fits into a fixed buffer, truncated if needed
            let mut buffer = [0u8; 8];
            let written = reduced.write_text_in_buffer(&mut buffer);
            println!(" {} bytes written: {:?}", written, &buffer[..written]);
        }
        1 => {
            // SYMBOLS BOUND IN A CONTEXT
            let mut context = GlobalContext::new();
            context.set_expression_for_symbol("a", Expr::rational(1, 2));
            context.set_expression_for_symbol("b", parsed("a+a"));
            // x refers to itself and stays symbolic
            context.set_expression_for_symbol("x", parsed("x+1"));
            let reducer = Reducer::new(&context);
            for input in ["b*4", "a^2+x", "floor(7/2)+ceil(-7/2)"] {
                let reduced = parsed(input).deep_reduce(&reducer);
                println!("{} -> {}", input, reduced);
            }
        }
        2 => {
            // MATRICES: elementwise functions and products
            let context = EmptyContext;
            let reducer = Reducer::new(&context);
            for input in ["abs([[-1,2][-3,4]])", "[[1,2][3,4]]*[[0,1][1,0]]", "[[1,2,3]]*[[1,2,3]]"] {
                let reduced = parsed(input).deep_reduce(&reducer);
                println!("{} -> {}", input, reduced);
            }
            let kept = parsed("abs([[-1,2][-3,4]])")
                .deep_reduce(&Reducer::new(&context).with_matrix_exact_reducing(false));
            println!("without elementwise reduction: {}", kept);
        }
        3 => {
            // NUMERIC EVALUATION in radians and degrees, f64 and f32
            let context = EmptyContext;
            for input in ["cos(π)", "sin(90)", "tanh(0*i)", "2^(1/2)", "ln(-1)"] {
                let expression = parsed(input);
                let radian = expression.approximate::<f64>(&context, AngleUnit::Radian);
                let degree = expression.approximate::<f32>(&context, AngleUnit::Degree);
                let text = match radian.as_complex() {
                    Some(c) => complex_to_text(c, DisplayMode::Decimal, 7),
                    None => "undef".to_string(),
                };
                println!("{}: {} (rad, f64), {:?} (deg, f32)", input, text, degree);
            }
            let unbound = Expr::symbol("y").approximate::<f64>(&context, AngleUnit::Radian);
            assert_eq!(unbound, Evaluation::Undefined);
        }
        4 => {
            // FORCED SIGNS
            let context = EmptyContext;
            let reducer = Reducer::new(&context);
            let product = Expr::Multiplication(vec![Expr::integer(-2), Expr::pi()]);
            println!("sign of {} is {:?}", product, product.sign());
            let positive = product.set_sign(Sign::Positive, &reducer);
            println!("made positive: {} ({:?})", positive, positive.sign());
        }
        5 => {
            // PREFERENCES FROM TOML
            let text = "[display]\nmode = \"scientific\"\nsignificant_digits = 4\n[computation]\nangle_unit = \"degree\"";
            let preferences = match Preferences::from_toml_str(text) {
                Ok(preferences) => preferences,
                Err(err) => {
                    println!("{}", err);
                    return;
                }
            };
            let context = EmptyContext;
            let expression = parsed("1234.5*sin(30)");
            let reduced = expression.deep_reduce(&preferences.reducer(&context));
            let value = reduced
                .approximate::<f64>(&context, preferences.angle_unit)
                .in_format(preferences.complex_format);
            if let Some(c) = value.as_complex() {
                println!(
                    "{} = {}",
                    reduced,
                    complex_to_text(c, preferences.display_mode, preferences.significant_digits)
                );
            }
        }
        _ => {
            println!("no such example");
        }
    }
}
