use crate::symbolic::symbolic_approximate::Evaluation;
use crate::symbolic::symbolic_engine::{Expr, ExprType};
use crate::symbolic::symbolic_reduce::{AngleUnit, EmptyContext, GlobalContext, Reducer};
use crate::symbolic::symbolic_sign::Sign;
//___________________________________TESTS____________________________________

mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use num_complex::Complex;
    use proptest::prelude::*;

    fn reduce(text: &str) -> Expr {
        let context = EmptyContext;
        let reducer = Reducer::new(&context);
        Expr::parse_expression(text).unwrap().deep_reduce(&reducer)
    }

    #[test]
    fn test_clone_is_independent() {
        let original = Expr::parse_expression("(1+x)*3").unwrap();
        let mut copy = original.clone();
        copy.replace_operand(1, Expr::integer(4));
        assert_eq!(original.to_string(), "(1+x)*3");
        assert_ne!(original, copy);
        assert_eq!(copy.operand(1), &Expr::integer(4));
    }

    #[test]
    fn test_number_of_descendants() {
        let expression = Expr::parse_expression("1+2*x").unwrap();
        // +, 1, *, 2, x
        assert_eq!(expression.number_of_descendants(), 5);
    }

    #[test]
    fn test_absolute_value_of_known_signs() {
        assert_eq!(reduce("abs(3)"), Expr::integer(3));
        assert_eq!(reduce("abs(-3)"), Expr::integer(3));
        assert_eq!(reduce("abs(-π)"), Expr::pi());
        assert_eq!(reduce("abs(x)").ty(), ExprType::AbsoluteValue);
    }

    #[test]
    fn test_rational_arithmetic() {
        assert_eq!(reduce("1/2+1/3"), Expr::rational(5, 6));
        assert_eq!(reduce("2^10"), Expr::integer(1024));
        assert_eq!(reduce("√(9/4)"), Expr::rational(3, 2));
        assert_eq!(reduce("5!"), Expr::integer(120));
        assert_eq!(reduce("1/0"), Expr::Undefined);
        assert_eq!(reduce("0^0"), Expr::Undefined);
    }

    #[test]
    fn test_undefined_propagates() {
        assert_eq!(reduce("1+1/0"), Expr::Undefined);
        assert_eq!(reduce("cos(1/0)"), Expr::Undefined);
    }

    #[test]
    fn test_floor_and_ceiling() {
        assert_eq!(reduce("floor(7/2)"), Expr::integer(3));
        assert_eq!(reduce("ceil(7/2)"), Expr::integer(4));
        assert_eq!(reduce("floor(π)"), Expr::integer(3));
        assert_eq!(reduce("ceil(-7/2)"), Expr::integer(-3));
    }

    #[test]
    fn test_symbol_substitution() {
        let mut context = GlobalContext::new();
        context.set_expression_for_symbol("a", Expr::rational(1, 2));
        context.set_expression_for_symbol("b", Expr::parse_expression("a+a").unwrap());
        let reducer = Reducer::new(&context);
        let reduced = Expr::parse_expression("b*4").unwrap().deep_reduce(&reducer);
        assert_eq!(reduced, Expr::integer(4));
    }

    #[test]
    fn test_self_referencing_symbol_is_kept() {
        let mut context = GlobalContext::new();
        context.set_expression_for_symbol("x", Expr::parse_expression("x+1").unwrap());
        let reducer = Reducer::new(&context);
        assert_eq!(Expr::symbol("x").deep_reduce(&reducer), Expr::symbol("x"));
    }

    #[test]
    fn test_two_symbol_cycle_is_kept() {
        let mut context = GlobalContext::new();
        context.set_expression_for_symbol("x", Expr::symbol("y"));
        context.set_expression_for_symbol("y", Expr::symbol("x"));
        context.set_expression_for_symbol("z", Expr::parse_expression("x+1").unwrap());
        let reducer = Reducer::new(&context);
        assert_eq!(Expr::symbol("x").deep_reduce(&reducer), Expr::symbol("x"));
        assert_eq!(Expr::symbol("y").deep_reduce(&reducer), Expr::symbol("y"));
        // z itself is not on the cycle, so it expands once
        let z = Expr::symbol("z").deep_reduce(&reducer);
        assert_eq!(z, Expr::Addition(vec![Expr::integer(1), Expr::symbol("x")]));
        let value = Expr::symbol("z").approximate::<f64>(&context, AngleUnit::Radian);
        assert_eq!(value, Evaluation::Undefined);
    }

    #[test]
    fn test_three_symbol_cycle_is_kept() {
        let mut context = GlobalContext::new();
        context.set_expression_for_symbol("a", Expr::parse_expression("b+1").unwrap());
        context.set_expression_for_symbol("b", Expr::parse_expression("2*c").unwrap());
        context.set_expression_for_symbol("c", Expr::symbol("a"));
        context.set_expression_for_symbol("d", Expr::integer(5));
        let reducer = Reducer::new(&context);
        for name in ["a", "b", "c"] {
            assert_eq!(Expr::symbol(name).deep_reduce(&reducer), Expr::symbol(name));
            let value = Expr::symbol(name).approximate::<f32>(&context, AngleUnit::Radian);
            assert!(value.is_undefined());
        }
        let sum = Expr::parse_expression("a+d").unwrap().deep_reduce(&reducer);
        assert_eq!(sum, Expr::Addition(vec![Expr::integer(5), Expr::symbol("a")]));
    }

    #[test]
    fn test_matrix_power_agrees_with_its_approximation() {
        let context = EmptyContext;
        let reducer = Reducer::new(&context);
        let power = square_matrix([1, 2, 3, 4]).pow(Expr::integer(2));
        assert_eq!(power.clone().deep_reduce(&reducer).to_string(), "[[7,10][15,22]]");
        match power.approximate::<f64>(&context, AngleUnit::Radian) {
            Evaluation::Matrix { rows, columns, entries } => {
                assert_eq!((rows, columns), (2, 2));
                let re: Vec<f64> = entries.iter().map(|c| c.re).collect();
                assert_eq!(re, vec![7.0, 10.0, 15.0, 22.0]);
            }
            other => panic!("expected a matrix, got {:?}", other),
        }
        let identity = square_matrix([1, 2, 3, 4]).pow(Expr::integer(0));
        match identity.approximate::<f64>(&context, AngleUnit::Radian) {
            Evaluation::Matrix { entries, .. } => {
                let re: Vec<f64> = entries.iter().map(|c| c.re).collect();
                assert_eq!(re, vec![1.0, 0.0, 0.0, 1.0]);
            }
            other => panic!("expected a matrix, got {:?}", other),
        }
        let row = Expr::matrix(1, 3, vec![Expr::integer(1), Expr::integer(2), Expr::integer(3)]);
        let squared_row = row.pow(Expr::integer(2)).approximate::<f64>(&context, AngleUnit::Radian);
        assert!(squared_row.is_undefined());
        let half = square_matrix([1, 2, 3, 4]).pow(Expr::rational(1, 2));
        assert!(half.approximate::<f64>(&context, AngleUnit::Radian).is_undefined());
        let inverse = square_matrix([1, 2, 3, 4]).pow(Expr::integer(-1));
        assert!(inverse.approximate::<f64>(&context, AngleUnit::Radian).is_undefined());
    }

    #[test]
    fn test_matrix_elementwise_reduction() {
        let reduced = reduce("abs([[-1,2][-3,4]])");
        assert_eq!(reduced.to_string(), "[[1,2][3,4]]");
        let context = EmptyContext;
        let reducer = Reducer::new(&context).with_matrix_exact_reducing(false);
        let kept = Expr::parse_expression("abs([[-1,2][-3,4]])")
            .unwrap()
            .deep_reduce(&reducer);
        assert_eq!(kept.ty(), ExprType::AbsoluteValue);
    }

    #[test]
    fn test_matrix_product() {
        let reduced = reduce("[[1,2][3,4]]*[[0,1][1,0]]");
        assert_eq!(reduced.to_string(), "[[2,1][4,3]]");
        assert_eq!(reduce("[[1,2,3]]*[[1,2,3]]"), Expr::Undefined);
    }

    #[test]
    fn test_tanh_of_complex_zero() {
        let value = reduce("tanh(0)").approximate::<f64>(&EmptyContext, AngleUnit::Radian);
        assert_eq!(value.as_complex(), Some(Complex::new(0.0, 0.0)));
        let value = Expr::parse_expression("tanh(0*i)")
            .unwrap()
            .approximate::<f32>(&EmptyContext, AngleUnit::Radian);
        assert_eq!(value.as_complex(), Some(Complex::new(0.0f32, 0.0)));
    }

    #[test]
    fn test_approximate_in_degrees() {
        let value = Expr::parse_expression("sin(90)")
            .unwrap()
            .approximate::<f64>(&EmptyContext, AngleUnit::Degree);
        assert_relative_eq!(value.to_real().unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_approximate_unbound_symbol_is_undefined() {
        let value = Expr::symbol("y").approximate::<f64>(&EmptyContext, AngleUnit::Radian);
        assert_eq!(value, Evaluation::Undefined);
    }

    #[test]
    fn test_set_sign_on_product() {
        let context = EmptyContext;
        let reducer = Reducer::new(&context);
        let product = Expr::Multiplication(vec![Expr::integer(-2), Expr::pi()]);
        let positive = product.set_sign(Sign::Positive, &reducer);
        assert_eq!(positive.sign(), Sign::Positive);
        assert_eq!(positive.to_string(), "2*π");
    }

    #[test]
    #[should_panic]
    fn test_set_sign_unknown_target_panics() {
        let context = EmptyContext;
        let reducer = Reducer::new(&context);
        Expr::integer(1).set_sign(Sign::Unknown, &reducer);
    }

    #[test]
    #[should_panic]
    fn test_set_sign_on_symbol_panics() {
        let context = EmptyContext;
        let reducer = Reducer::new(&context);
        Expr::symbol("x").set_sign(Sign::Negative, &reducer);
    }

    #[test]
    fn test_write_text_in_small_buffer() {
        let expression = Expr::parse_expression("123+456").unwrap();
        let mut buffer = [0xffu8; 5];
        let written = expression.write_text_in_buffer(&mut buffer);
        assert_eq!(written, 4);
        assert_eq!(&buffer[..5], b"123+\0");
        let mut empty: [u8; 0] = [];
        assert_eq!(expression.write_text_in_buffer(&mut empty), 0);
    }

    fn square_matrix(entries: [i64; 4]) -> Expr {
        Expr::matrix(2, 2, entries.iter().map(|&n| Expr::integer(n)).collect())
    }

    fn matrix_expression() -> impl Strategy<Value = Expr> {
        let leaf = prop::array::uniform4(-4i64..5).prop_map(square_matrix);
        leaf.prop_recursive(2, 8, 2, |inner| {
            prop_oneof![
                (inner.clone(), inner.clone()).prop_map(|(a, b)| a + b),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| a * b),
                (-3i64..4, inner.clone()).prop_map(|(k, a)| Expr::integer(k) * a),
                (inner, 0i64..4).prop_map(|(a, n)| a.pow(Expr::integer(n))),
            ]
        })
    }

    fn matrix_entries(value: Evaluation<f64>) -> Option<(usize, usize, Vec<f64>)> {
        match value {
            Evaluation::Matrix { rows, columns, entries } => {
                Some((rows, columns, entries.iter().map(|c| c.re).collect()))
            }
            _ => None,
        }
    }

    fn arithmetic() -> impl Strategy<Value = Expr> {
        let leaf = prop_oneof![
            (-9i64..10).prop_map(Expr::integer),
            Just(Expr::symbol("x")),
            Just(Expr::pi()),
        ];
        leaf.prop_recursive(4, 24, 3, |inner| {
            prop_oneof![
                (inner.clone(), inner.clone()).prop_map(|(a, b)| a + b),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| a - b),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| a * b),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| a / b),
                inner.prop_map(|a| -a),
            ]
        })
    }

    proptest! {
        #[test]
        fn test_deep_reduce_is_idempotent(expression in arithmetic()) {
            let context = EmptyContext;
            let reducer = Reducer::new(&context);
            let once = expression.deep_reduce(&reducer);
            let twice = once.clone().deep_reduce(&reducer);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn test_matrix_reduction_keeps_the_numeric_value(expression in matrix_expression()) {
            let context = EmptyContext;
            let reducer = Reducer::new(&context);
            let direct = matrix_entries(expression.approximate::<f64>(&context, AngleUnit::Radian));
            let reduced = expression.deep_reduce(&reducer);
            let after = matrix_entries(reduced.approximate::<f64>(&context, AngleUnit::Radian));
            let (Some((rows, columns, direct)), Some((r2, c2, after))) = (direct, after) else {
                return Err(TestCaseError::fail("matrix expression did not evaluate to a matrix"));
            };
            prop_assert_eq!((rows, columns), (r2, c2));
            for (x, y) in direct.iter().zip(&after) {
                prop_assert!((x - y).abs() <= 1e-9 * x.abs().max(1.0), "{} != {}", x, y);
            }
        }

        #[test]
        fn test_reducing_a_clone_leaves_the_original(expression in arithmetic()) {
            let context = EmptyContext;
            let reducer = Reducer::new(&context);
            let text = expression.to_string();
            let _ = expression.clone().deep_reduce(&reducer);
            prop_assert_eq!(expression.to_string(), text);
        }
    }
}
