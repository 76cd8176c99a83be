//! Text → expression parser.
//!
//! Reads the text form produced by [`Expr::serialize`] and the usual calculator input:
//! `2+3*x`, `1.5E-3`, `2π`, `|x-1|`, `√(2)`, `root(8,3)`, `log(x,2)`, `5!`,
//! `[[1,2][3,4]]`, `random()`. Built from `nom` combinators; precedence, from loosest to
//! tightest, is sum, product (explicit or implicit), unary sign, power (right
//! associative), factorial.
//!
//! # Example
//! ```rust, ignore
//! let e = Expr::parse_expression("2x^2+1").unwrap();
//! assert_eq!(e.to_string(), "2*x^2+1");
//! ```

use crate::errors::{CalcError, Result};
use crate::symbolic::symbolic_engine::{Expr, ExprType};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit0, digit1, multispace0, one_of},
    combinator::{all_consuming, opt, recognize},
    error::{Error, ErrorKind},
    multi::{many0, many1, separated_list1},
    sequence::{delimited, pair, preceded},
};

fn failure(input: &str) -> nom::Err<Error<&str>> {
    nom::Err::Error(Error::new(input, ErrorKind::Verify))
}

/// Number literal: integers become rationals, anything with a point or an exponent a
/// decimal.
fn number(input: &str) -> IResult<&str, Expr> {
    let mut literal = recognize((
        digit1,
        opt(pair(char('.'), digit0)),
        opt((char('E'), opt(one_of("+-")), digit1)),
    ));
    let (rest, text) = literal.parse(input)?;
    let (mantissa_text, exponent_text) = match text.split_once('E') {
        Some((m, e)) => (m, Some(e)),
        None => (text, None),
    };
    let (int_part, frac_part) = mantissa_text.split_once('.').unwrap_or((mantissa_text, ""));
    let digits = format!("{}{}", int_part, frac_part);
    let mantissa = digits.parse::<i64>().map_err(|_| failure(input))?;
    if exponent_text.is_none() && !mantissa_text.contains('.') {
        return Ok((rest, Expr::integer(mantissa)));
    }
    let exponent = match exponent_text {
        Some(e) => e.parse::<i32>().map_err(|_| failure(input))?,
        None => 0,
    };
    Ok((rest, Expr::decimal(mantissa, exponent - frac_part.len() as i32)))
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

fn arguments(input: &str) -> IResult<&str, Vec<Expr>> {
    delimited(
        pair(char('('), multispace0),
        separated_list1(char(','), expr),
        char(')'),
    )
    .parse(input)
}

/// Function call, named constant or free symbol.
fn identifier_or_call(input: &str) -> IResult<&str, Expr> {
    let (rest, name) = identifier(input)?;
    let (after_space, _) = multispace0(rest)?;
    if after_space.starts_with('(') {
        if name == "random" {
            let (rest, _) = (char('('), multispace0, char(')')).parse(after_space)?;
            return Ok((rest, Expr::Random));
        }
        let known = ExprType::unary_function_from_name(name).is_some()
            || matches!(name, "exp" | "log" | "root");
        if known {
            let (rest, mut args) = arguments(after_space)?;
            let call = match (name, args.len()) {
                ("exp", 1) => Expr::e().pow(args.remove(0)),
                ("log", 1) => Expr::Logarithm(args.remove(0).boxed(), Expr::integer(10).boxed()),
                ("log", 2) => {
                    let base = args.remove(1);
                    Expr::Logarithm(args.remove(0).boxed(), base.boxed())
                }
                ("root", 2) => {
                    let index = args.remove(1);
                    Expr::NthRoot(args.remove(0).boxed(), index.boxed())
                }
                (_, 1) => match ExprType::unary_function_from_name(name) {
                    Some(ty) => Expr::unary(ty, args.remove(0)),
                    None => return Err(failure(input)),
                },
                _ => return Err(failure(input)),
            };
            return Ok((rest, call));
        }
    }
    let leaf = match name {
        "pi" => Expr::pi(),
        "e" => Expr::e(),
        "i" => Expr::i(),
        "undef" => Expr::Undefined,
        other => Expr::symbol(other),
    };
    Ok((rest, leaf))
}

fn parenthesized(input: &str) -> IResult<&str, Expr> {
    let (rest, inner) = delimited(char('('), expr, char(')')).parse(input)?;
    Ok((rest, Expr::Parenthesis(inner.boxed())))
}

fn absolute_bars(input: &str) -> IResult<&str, Expr> {
    let (rest, inner) = delimited(char('|'), expr, char('|')).parse(input)?;
    Ok((rest, Expr::AbsoluteValue(inner.boxed())))
}

fn square_root(input: &str) -> IResult<&str, Expr> {
    let (rest, radicand) = preceded(
        pair(char('√'), multispace0),
        alt((delimited(char('('), expr, char(')')), postfix)),
    )
    .parse(input)?;
    Ok((rest, Expr::SquareRoot(radicand.boxed())))
}

fn matrix(input: &str) -> IResult<&str, Expr> {
    let row = delimited(
        pair(multispace0, char('[')),
        separated_list1(char(','), expr),
        char(']'),
    );
    let (rest, rows) = delimited(char('['), many1(row), pair(multispace0, char(']'))).parse(input)?;
    let columns = rows[0].len();
    if rows.iter().any(|r| r.len() != columns) {
        return Err(failure(input));
    }
    let row_count = rows.len();
    Ok((rest, Expr::matrix(row_count, columns, rows.into_iter().flatten().collect())))
}

fn constant_pi(input: &str) -> IResult<&str, Expr> {
    let (rest, _) = char('π').parse(input)?;
    Ok((rest, Expr::pi()))
}

fn primary(input: &str) -> IResult<&str, Expr> {
    let (input, _) = multispace0(input)?;
    alt((
        number,
        parenthesized,
        absolute_bars,
        matrix,
        square_root,
        constant_pi,
        identifier_or_call,
    ))
    .parse(input)
}

fn postfix(input: &str) -> IResult<&str, Expr> {
    let (rest, base) = primary(input)?;
    let (rest, bangs) = many0(preceded(multispace0, char('!'))).parse(rest)?;
    let wrapped = bangs
        .iter()
        .fold(base, |acc, _| Expr::Factorial(acc.boxed()));
    Ok((rest, wrapped))
}

fn power(input: &str) -> IResult<&str, Expr> {
    let (rest, base) = postfix(input)?;
    let (rest, exponent) = opt(preceded(pair(multispace0, char('^')), unary)).parse(rest)?;
    match exponent {
        Some(exponent) => Ok((rest, base.pow(exponent))),
        None => Ok((rest, base)),
    }
}

fn unary(input: &str) -> IResult<&str, Expr> {
    let (input, _) = multispace0(input)?;
    if let Ok((rest, _)) = one_of::<_, _, Error<&str>>("-−").parse(input) {
        let (rest, operand) = unary(rest)?;
        let negated = match operand {
            Expr::Rational(r) => Expr::Rational(-r),
            Expr::Decimal { mantissa, exponent } => Expr::decimal(-mantissa, exponent),
            other => Expr::Opposite(other.boxed()),
        };
        return Ok((rest, negated));
    }
    if let Ok((rest, _)) = char::<_, Error<&str>>('+').parse(input) {
        return unary(rest);
    }
    power(input)
}

/// Whether the next character can start an implicitly multiplied factor, as in `2x`,
/// `3(x+1)` or `2π`.
fn starts_implicit_factor(input: &str) -> bool {
    input
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || matches!(c, '(' | 'π' | '√' | '['))
}

fn term(input: &str) -> IResult<&str, Expr> {
    let (mut input, mut acc) = unary(input)?;
    loop {
        let (rest, _) = multispace0(input)?;
        let (rest, rhs, divide) = if let Some(after) = rest.strip_prefix(['*', '×', '·']) {
            let (after, rhs) = unary(after)?;
            (after, rhs, false)
        } else if let Some(after) = rest.strip_prefix(['/', '÷']) {
            let (after, rhs) = unary(after)?;
            (after, rhs, true)
        } else if starts_implicit_factor(rest) {
            let (after, rhs) = power(rest)?;
            (after, rhs, false)
        } else {
            return Ok((input, acc));
        };
        acc = if divide {
            Expr::Division(acc.boxed(), rhs.boxed())
        } else if let Expr::Multiplication(mut factors) = acc {
            factors.push(rhs);
            Expr::Multiplication(factors)
        } else {
            Expr::Multiplication(vec![acc, rhs])
        };
        input = rest;
    }
}

fn expr(input: &str) -> IResult<&str, Expr> {
    let (mut input, mut acc) = term(input)?;
    loop {
        let (rest, _) = multispace0(input)?;
        let (rest, subtract) = if let Some(after) = rest.strip_prefix('+') {
            (after, false)
        } else if let Some(after) = rest.strip_prefix(['-', '−']) {
            (after, true)
        } else {
            let (rest, _) = multispace0(input)?;
            return Ok((rest, acc));
        };
        let (rest, rhs) = term(rest)?;
        acc = if subtract {
            Expr::Subtraction(acc.boxed(), rhs.boxed())
        } else if let Expr::Addition(mut terms) = acc {
            terms.push(rhs);
            Expr::Addition(terms)
        } else {
            Expr::Addition(vec![acc, rhs])
        };
        input = rest;
    }
}

/// Parses a whole input string into an expression.
pub fn parse_expression(input: &str) -> Result<Expr> {
    match all_consuming(expr).parse(input) {
        Ok((_, expression)) => Ok(expression),
        Err(err) => Err(CalcError::Parse(format!("'{}': {}", input, err))),
    }
}

impl Expr {
    /// Parses `input`; see [`parse_expression`].
    pub fn parse_expression(input: &str) -> Result<Expr> {
        parse_expression(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::symbolic_reduce::{EmptyContext, Reducer};

    fn parse(input: &str) -> Expr {
        parse_expression(input).unwrap()
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse("42"), Expr::integer(42));
        assert_eq!(parse("1.5"), Expr::decimal(15, -1));
        assert_eq!(parse("2E3"), Expr::decimal(2, 3));
        assert_eq!(parse("1.25E-2"), Expr::decimal(125, -4));
        assert_eq!(parse("-3"), Expr::integer(-3));
    }

    #[test]
    fn test_precedence() {
        let e = parse("1+2*3");
        assert_eq!(
            e,
            Expr::Addition(vec![
                Expr::integer(1),
                Expr::Multiplication(vec![Expr::integer(2), Expr::integer(3)])
            ])
        );
        let p = parse("-x^2");
        assert_eq!(p, Expr::Opposite(Expr::symbol("x").pow(Expr::integer(2)).boxed()));
        let right_assoc = parse("2^3^2");
        assert_eq!(
            right_assoc,
            Expr::integer(2).pow(Expr::integer(3).pow(Expr::integer(2)))
        );
        let sub = parse("a-b-c");
        assert_eq!(
            sub,
            Expr::Subtraction(
                Expr::Subtraction(Expr::symbol("a").boxed(), Expr::symbol("b").boxed()).boxed(),
                Expr::symbol("c").boxed()
            )
        );
    }

    #[test]
    fn test_functions_and_constants() {
        assert_eq!(
            parse("tanh(0)"),
            Expr::HyperbolicTangent(Expr::integer(0).boxed())
        );
        assert_eq!(parse("|-π|"), Expr::AbsoluteValue(Expr::Opposite(Expr::pi().boxed()).boxed()));
        assert_eq!(parse("random()"), Expr::Random);
        assert_eq!(
            parse("log(8,2)"),
            Expr::Logarithm(Expr::integer(8).boxed(), Expr::integer(2).boxed())
        );
        assert_eq!(parse("√(4)"), Expr::SquareRoot(Expr::integer(4).boxed()));
        assert_eq!(parse("5!"), Expr::Factorial(Expr::integer(5).boxed()));
        assert_eq!(parse("2π"), Expr::Multiplication(vec![Expr::integer(2), Expr::pi()]));
    }

    #[test]
    fn test_matrix() {
        let m = parse("[[1,2][3,4]]");
        assert_eq!(
            m,
            Expr::matrix(
                2,
                2,
                vec![Expr::integer(1), Expr::integer(2), Expr::integer(3), Expr::integer(4)]
            )
        );
        assert!(parse_expression("[[1,2][3]]").is_err());
    }

    #[test]
    fn test_invalid_input() {
        assert!(parse_expression("").is_err());
        assert!(parse_expression("1+").is_err());
        assert!(parse_expression("sin(").is_err());
        assert!(parse_expression("(1").is_err());
        assert!(matches!(parse_expression("2+*"), Err(CalcError::Parse(_))));
    }

    #[test]
    fn test_text_form_is_read_back() {
        let context = EmptyContext;
        let reducer = Reducer::new(&context);
        for input in ["2*x^2+1", "|x-3|", "(1/2)*x", "sin(x)^2", "x^(-1/2)", "[[1,x][y,2]]"] {
            let reduced = reducer.deep_reduce(parse(input));
            let again = reducer.deep_reduce(parse(&reduced.serialize()));
            assert_eq!(reduced, again, "text form of {} does not read back", input);
        }
    }
}
