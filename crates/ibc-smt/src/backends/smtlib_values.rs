//! Parsing of SMT-LIB2 model values into exact rationals.
//!
//! Both backends end up here: the subprocess backend reads `get-value`
//! responses, and the Z3 backend prints evaluated model constants.

use num::bigint::BigInt;
use num::rational::BigRational;
use num::traits::{One, Zero};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ValueParseError {
    #[error("unexpected end of value `{0}`")]
    UnexpectedEnd(String),
    #[error("unsupported value form `{0}`")]
    Unsupported(String),
    #[error("division by zero in `{0}`")]
    DivisionByZero(String),
    #[error("trailing input after value in `{0}`")]
    Trailing(String),
}

#[derive(Debug, Clone, PartialEq)]
enum SExpr {
    Atom(String),
    List(Vec<SExpr>),
}

fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut buf = String::new();
    let mut in_quoted_symbol = false;
    for ch in input.chars() {
        match ch {
            '|' => {
                in_quoted_symbol = !in_quoted_symbol;
                buf.push(ch);
            }
            '(' | ')' if !in_quoted_symbol => {
                if !buf.is_empty() {
                    tokens.push(std::mem::take(&mut buf));
                }
                tokens.push(ch.to_string());
            }
            c if c.is_whitespace() && !in_quoted_symbol => {
                if !buf.is_empty() {
                    tokens.push(std::mem::take(&mut buf));
                }
            }
            other => buf.push(other),
        }
    }
    if !buf.is_empty() {
        tokens.push(buf);
    }
    tokens
}

fn parse_sexpr(tokens: &[String], pos: &mut usize, source: &str) -> Result<SExpr, ValueParseError> {
    let Some(token) = tokens.get(*pos) else {
        return Err(ValueParseError::UnexpectedEnd(source.to_string()));
    };
    *pos += 1;
    match token.as_str() {
        "(" => {
            let mut items = Vec::new();
            loop {
                match tokens.get(*pos).map(String::as_str) {
                    None => return Err(ValueParseError::UnexpectedEnd(source.to_string())),
                    Some(")") => {
                        *pos += 1;
                        return Ok(SExpr::List(items));
                    }
                    Some(_) => items.push(parse_sexpr(tokens, pos, source)?),
                }
            }
        }
        ")" => Err(ValueParseError::Unsupported(source.to_string())),
        atom => Ok(SExpr::Atom(atom.to_string())),
    }
}

fn parse_single(source: &str) -> Result<SExpr, ValueParseError> {
    let tokens = tokenize(source);
    let mut pos = 0;
    let expr = parse_sexpr(&tokens, &mut pos, source)?;
    if pos != tokens.len() {
        return Err(ValueParseError::Trailing(source.to_string()));
    }
    Ok(expr)
}

/// Parse a decimal numeral such as `42`, `2.5` or `-0.13305` exactly.
pub fn parse_decimal(text: &str) -> Option<BigRational> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, f),
        None => (digits, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.chars().all(|c| c.is_ascii_digit()) || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }
    let mantissa_digits = format!("{int_part}{frac_part}");
    let mantissa: BigInt = if mantissa_digits.is_empty() {
        BigInt::zero()
    } else {
        mantissa_digits.parse().ok()?
    };
    let ten = BigInt::from(10u32);
    let mut scale = BigInt::one();
    for _ in 0..frac_part.len() {
        scale *= &ten;
    }
    let value = BigRational::new(mantissa, scale);
    Some(if negative { -value } else { value })
}

fn eval_real(expr: &SExpr, source: &str) -> Result<BigRational, ValueParseError> {
    match expr {
        SExpr::Atom(atom) => {
            parse_decimal(atom).ok_or_else(|| ValueParseError::Unsupported(source.to_string()))
        }
        SExpr::List(items) => match items.as_slice() {
            [SExpr::Atom(op), arg] if op == "-" => Ok(-eval_real(arg, source)?),
            [SExpr::Atom(op), num, den] if op == "/" => {
                let num = eval_real(num, source)?;
                let den = eval_real(den, source)?;
                if den.is_zero() {
                    return Err(ValueParseError::DivisionByZero(source.to_string()));
                }
                Ok(num / den)
            }
            _ => Err(ValueParseError::Unsupported(source.to_string())),
        },
    }
}

/// Parse a real-valued SMT-LIB2 constant: `3.0`, `(- 2.0)`, `(/ 1.0 2.0)`,
/// `(- (/ 1 3))`, `(/ (- 1) 3)`.
pub fn parse_real_value(text: &str) -> Result<BigRational, ValueParseError> {
    let expr = parse_single(text.trim())?;
    eval_real(&expr, text)
}

/// Parse a `get-value` response `((name value) ...)` into `(name, value-text)` pairs.
pub fn parse_get_value_response(response: &str) -> Result<Vec<(String, String)>, ValueParseError> {
    let expr = parse_single(response.trim())?;
    let SExpr::List(pairs) = expr else {
        return Err(ValueParseError::Unsupported(response.to_string()));
    };
    let mut out = Vec::with_capacity(pairs.len());
    for pair in pairs {
        match pair {
            SExpr::List(items) if items.len() == 2 => {
                let SExpr::Atom(name) = &items[0] else {
                    return Err(ValueParseError::Unsupported(response.to_string()));
                };
                out.push((name.trim_matches('|').to_string(), render(&items[1])));
            }
            _ => return Err(ValueParseError::Unsupported(response.to_string())),
        }
    }
    Ok(out)
}

fn render(expr: &SExpr) -> String {
    match expr {
        SExpr::Atom(a) => a.clone(),
        SExpr::List(items) => {
            let inner: Vec<String> = items.iter().map(render).collect();
            format!("({})", inner.join(" "))
        }
    }
}

/// True once every opened parenthesis in `text` has been closed.
pub fn parens_balanced(text: &str) -> bool {
    let mut depth: i64 = 0;
    let mut in_quoted_symbol = false;
    for ch in text.chars() {
        match ch {
            '|' => in_quoted_symbol = !in_quoted_symbol,
            '(' if !in_quoted_symbol => depth += 1,
            ')' if !in_quoted_symbol => depth -= 1,
            _ => {}
        }
    }
    depth <= 0
}
