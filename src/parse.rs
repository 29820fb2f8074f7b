//! Textual input for polynomials and equations.
//!
//! # Grammar
//!
//! ```text
//! equation := expr ("=" | "==") expr
//! expr     := term (("+" | "-") term)*
//! term     := unary ("*" unary)*
//! unary    := "-" unary | power
//! power    := atom ("^" | "**") INT | atom
//! atom     := INT | IDENT | "(" expr ")"
//! ```
//!
//! Input is first parsed into a small syntax tree, then lowered into a [`Poly`] with
//! identifiers interned into the given [`SymbolTable`] in first-seen order. Products are
//! expanded while lowering, so `(1 - x)*(1 - y)` yields `x*y - x - y + 1` and `x^3`
//! yields `x`. Lines of an equation file starting with `#` are comments.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{digit1, multispace0, satisfy},
    combinator::{map, map_res, opt, recognize},
    multi::fold_many0,
    sequence::{delimited, pair, preceded},
    IResult,
};
use num_bigint::BigInt;

use crate::equation::Equation;
use crate::error::{Error, Result};
use crate::poly::Poly;
use crate::symbols::SymbolTable;

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Int(BigInt),
    Ident(String),
    Neg(Box<Node>),
    Add(Box<Node>, Box<Node>),
    Sub(Box<Node>, Box<Node>),
    Mul(Box<Node>, Box<Node>),
    Pow(Box<Node>, u32),
}

impl Node {
    fn lower(&self, symbols: &mut SymbolTable) -> Poly {
        match self {
            Node::Int(value) => Poly::constant(value.clone()),
            Node::Ident(name) => Poly::var(symbols.intern(name)),
            Node::Neg(a) => -a.lower(symbols),
            Node::Add(a, b) => {
                let a = a.lower(symbols);
                a + b.lower(symbols)
            }
            Node::Sub(a, b) => {
                let a = a.lower(symbols);
                a - b.lower(symbols)
            }
            Node::Mul(a, b) => {
                let a = a.lower(symbols);
                a * b.lower(symbols)
            }
            Node::Pow(base, exp) => base.lower(symbols).pow(*exp),
        }
    }
}

fn parse_int(input: &str) -> IResult<&str, Node> {
    map(map_res(digit1, |s: &str| s.parse::<BigInt>()), Node::Int)(input)
}

fn parse_ident(input: &str) -> IResult<&str, Node> {
    map(
        recognize(pair(
            satisfy(|c| c.is_alphabetic() || c == '_'),
            take_while(|c: char| c.is_alphanumeric() || c == '_'),
        )),
        |s: &str| Node::Ident(s.to_string()),
    )(input)
}

fn parse_parens(input: &str) -> IResult<&str, Node> {
    delimited(tag("("), parse_expr, preceded(multispace0, tag(")")))(input)
}

fn parse_atom(input: &str) -> IResult<&str, Node> {
    preceded(multispace0, alt((parse_int, parse_ident, parse_parens)))(input)
}

fn parse_exponent(input: &str) -> IResult<&str, u32> {
    preceded(
        // `**` is tried before `*` so that `x**2` is a power, not a product
        preceded(multispace0, alt((tag("**"), tag("^")))),
        preceded(multispace0, map_res(digit1, |s: &str| s.parse::<u32>())),
    )(input)
}

fn parse_power(input: &str) -> IResult<&str, Node> {
    let (input, base) = parse_atom(input)?;
    let (input, exp) = opt(parse_exponent)(input)?;
    match exp {
        Some(exp) => Ok((input, Node::Pow(Box::new(base), exp))),
        None => Ok((input, base)),
    }
}

fn parse_unary(input: &str) -> IResult<&str, Node> {
    alt((
        map(preceded(preceded(multispace0, tag("-")), parse_unary), |a| {
            Node::Neg(Box::new(a))
        }),
        parse_power,
    ))(input)
}

fn parse_term(input: &str) -> IResult<&str, Node> {
    let (input, init) = parse_unary(input)?;
    fold_many0(
        preceded(preceded(multispace0, tag("*")), parse_unary),
        move || init.clone(),
        |acc, val| Node::Mul(Box::new(acc), Box::new(val)),
    )(input)
}

fn parse_expr(input: &str) -> IResult<&str, Node> {
    let (input, init) = parse_term(input)?;
    fold_many0(
        pair(preceded(multispace0, alt((tag("+"), tag("-")))), parse_term),
        move || init.clone(),
        |acc, (op, val)| match op {
            "+" => Node::Add(Box::new(acc), Box::new(val)),
            _ => Node::Sub(Box::new(acc), Box::new(val)),
        },
    )(input)
}

fn parse_sides(input: &str) -> IResult<&str, (Node, Node)> {
    pair(
        parse_expr,
        preceded(preceded(multispace0, alt((tag("=="), tag("=")))), parse_expr),
    )(input)
}

/// Runs `parser` over the whole of `input`, mapping failures into [`Error::Parse`].
fn parse_complete<'a, T>(input: &'a str, parser: fn(&'a str) -> IResult<&'a str, T>) -> Result<T> {
    let (rest, res) = parser(input).map_err(|e| Error::Parse(format!("{} in '{}'", e, input)))?;
    let rest = rest.trim();
    if !rest.is_empty() {
        return Err(Error::Parse(format!("trailing input '{}' in '{}'", rest, input)));
    }
    Ok(res)
}

/// Parses a single polynomial.
pub fn parse_poly(input: &str, symbols: &mut SymbolTable) -> Result<Poly> {
    let node = parse_complete(input, parse_expr)?;
    Ok(node.lower(symbols))
}

/// Parses `lhs = rhs` (or `lhs == rhs`). The equation is returned as written.
pub fn parse_equation(input: &str, symbols: &mut SymbolTable) -> Result<Equation> {
    let (lhs, rhs) = parse_complete(input, parse_sides)?;
    let lhs = lhs.lower(symbols);
    let rhs = rhs.lower(symbols);
    Ok(Equation::new(lhs, rhs))
}

/// Parses one equation per non-empty, non-comment line.
pub fn parse_equations(input: &str, symbols: &mut SymbolTable) -> Result<Vec<Equation>> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| parse_equation(line, symbols))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_expands_products() {
        let mut table = SymbolTable::new();
        let p = parse_poly("(1 - x)*(1 - y)", &mut table).unwrap();
        assert_eq!(table.show(&p), "x*y - x - y + 1");
    }

    #[test]
    fn test_parse_collapses_powers() {
        let mut table = SymbolTable::new();
        let p = parse_poly("x^3 + y**2 - 2*x", &mut table).unwrap();
        assert_eq!(table.show(&p), "-x + y");
    }

    #[test]
    fn test_parse_equation_forms() {
        let mut table = SymbolTable::new();
        let a = parse_equation("p1*q1 == 1", &mut table).unwrap();
        let b = parse_equation("p1*q1 = 1", &mut table).unwrap();
        assert_eq!(a, b);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_parse_file() {
        let mut table = SymbolTable::new();
        let text = "# carry column\nx + y = 1\n\n  z = x*y\n";
        let eqns = parse_equations(text, &mut table).unwrap();
        assert_eq!(eqns.len(), 2);
    }

    #[test]
    fn test_parse_syntax_tree() {
        let (rest, node) = parse_expr("-x*2 + y^2").unwrap();
        assert!(rest.is_empty());
        let x = Box::new(Node::Ident("x".to_string()));
        let y = Box::new(Node::Ident("y".to_string()));
        let lhs = Node::Mul(Box::new(Node::Neg(x)), Box::new(Node::Int(BigInt::from(2))));
        assert_eq!(node, Node::Add(Box::new(lhs), Box::new(Node::Pow(y, 2))));
    }

    #[test]
    fn test_parse_large_exponent() {
        let mut table = SymbolTable::new();
        let p = parse_poly("(x + y)^1000", &mut table).unwrap();
        let xy = parse_poly("x*y", &mut table).unwrap();
        let (m, _) = xy.as_term().unwrap();
        // (x + y)^n = x + y + (2^n - 2)*x*y over {0,1}
        let expected = BigInt::from(2).pow(1000) - BigInt::from(2);
        assert_eq!(p.coefficient_of(m), expected);
        assert_eq!(p.len(), 3);
    }

    #[test]
    fn test_parse_interns_in_order() {
        let mut table = SymbolTable::new();
        parse_equation("b*(c + a) = d", &mut table).unwrap();
        let names: Vec<&str> = table.vars().filter_map(|v| table.name(v)).collect();
        assert_eq!(names, vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn test_parse_errors() {
        let mut table = SymbolTable::new();
        assert!(matches!(parse_equation("x + y", &mut table), Err(Error::Parse(_))));
        assert!(matches!(parse_poly("x + $", &mut table), Err(Error::Parse(_))));
        assert!(matches!(parse_poly("(x + y", &mut table), Err(Error::Parse(_))));
        assert!(matches!(parse_poly("", &mut table), Err(Error::Parse(_))));
        assert!(matches!(parse_poly("x**y", &mut table), Err(Error::Parse(_))));
        assert!(matches!(parse_equation("x = = y", &mut table), Err(Error::Parse(_))));
    }
}
