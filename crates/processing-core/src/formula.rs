//! Arithmetic formulas over substituted variables.
//!
//! Grammar, evaluated directly by recursive descent:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := number | '(' expr ')'
//! ```
//!
//! Integers stay integers under `+ - *` (promoting to float on overflow);
//! `/` always produces a float.

use multiview_model::{Context, Value};

use crate::template::substitute_variables;

const ALLOWED: &str = "0123456789.+-*/ ()";

/// Why a restricted expression could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArithError {
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected character '{found}' at offset {offset}")]
    Unexpected { found: char, offset: usize },

    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("division by zero")]
    DivisionByZero,
}

/// Evaluate a formula such as `{distance} * 0.1`.
///
/// After substitution, text containing anything besides digits, `.`,
/// arithmetic operators, parentheses and spaces is returned as a float when
/// it parses as one and as the substituted string otherwise. Evaluation
/// errors also yield the substituted string.
pub fn evaluate_formula(expr: &str, context: &Context) -> Value {
    let substituted = substitute_variables(expr, context);

    if !substituted.chars().all(|c| ALLOWED.contains(c)) {
        return substituted
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or(Value::Str(substituted));
    }

    match evaluate_arithmetic(&substituted) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(formula = expr, error = %err, "Formula evaluation failed");
            Value::Str(substituted)
        }
    }
}

/// Evaluate a restricted arithmetic expression.
pub fn evaluate_arithmetic(input: &str) -> Result<Value, ArithError> {
    let mut parser = Parser {
        chars: input.char_indices().collect(),
        pos: 0,
    };
    let value = parser.expr()?;
    parser.skip_spaces();
    match parser.peek() {
        None => Ok(value.into()),
        Some((offset, found)) => Err(ArithError::Unexpected { found, offset }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn int_op(
        self,
        rhs: Number,
        checked: fn(i64, i64) -> Option<i64>,
        float: fn(f64, f64) -> f64,
    ) -> Number {
        if let (Number::Int(a), Number::Int(b)) = (self, rhs) {
            if let Some(result) = checked(a, b) {
                return Number::Int(result);
            }
        }
        Number::Float(float(self.as_f64(), rhs.as_f64()))
    }

    fn divide(self, rhs: Number) -> Result<Number, ArithError> {
        let divisor = rhs.as_f64();
        if divisor == 0.0 {
            return Err(ArithError::DivisionByZero);
        }
        Ok(Number::Float(self.as_f64() / divisor))
    }

    fn negate(self) -> Number {
        match self {
            Number::Int(i) => i
                .checked_neg()
                .map(Number::Int)
                .unwrap_or(Number::Float(-(i as f64))),
            Number::Float(f) => Number::Float(-f),
        }
    }
}

impl From<Number> for Value {
    fn from(number: Number) -> Self {
        match number {
            Number::Int(i) => Value::Int(i),
            Number::Float(f) => Value::Float(f),
        }
    }
}

struct Parser {
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<(usize, char)> {
        self.chars.get(self.pos).copied()
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some((_, ' '))) {
            self.pos += 1;
        }
    }

    /// Next non-space character, without consuming it.
    fn lookahead(&mut self) -> Option<char> {
        self.skip_spaces();
        self.peek().map(|(_, c)| c)
    }

    fn expr(&mut self) -> Result<Number, ArithError> {
        let mut acc = self.term()?;
        loop {
            match self.lookahead() {
                Some('+') => {
                    self.pos += 1;
                    let rhs = self.term()?;
                    acc = acc.int_op(rhs, i64::checked_add, |a, b| a + b);
                }
                Some('-') => {
                    self.pos += 1;
                    let rhs = self.term()?;
                    acc = acc.int_op(rhs, i64::checked_sub, |a, b| a - b);
                }
                _ => return Ok(acc),
            }
        }
    }

    fn term(&mut self) -> Result<Number, ArithError> {
        let mut acc = self.unary()?;
        loop {
            match self.lookahead() {
                Some('*') => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    acc = acc.int_op(rhs, i64::checked_mul, |a, b| a * b);
                }
                Some('/') => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    acc = acc.divide(rhs)?;
                }
                _ => return Ok(acc),
            }
        }
    }

    fn unary(&mut self) -> Result<Number, ArithError> {
        match self.lookahead() {
            Some('+') => {
                self.pos += 1;
                self.unary()
            }
            Some('-') => {
                self.pos += 1;
                Ok(self.unary()?.negate())
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Number, ArithError> {
        self.skip_spaces();
        let (offset, c) = self.peek().ok_or(ArithError::UnexpectedEnd)?;

        if c == '(' {
            self.pos += 1;
            let inner = self.expr()?;
            return match self.lookahead() {
                Some(')') => {
                    self.pos += 1;
                    Ok(inner)
                }
                Some(found) => Err(ArithError::Unexpected {
                    found,
                    offset: self.chars[self.pos].0,
                }),
                None => Err(ArithError::UnexpectedEnd),
            };
        }

        if !(c.is_ascii_digit() || c == '.') {
            return Err(ArithError::Unexpected { found: c, offset });
        }

        let start = self.pos;
        while matches!(self.peek(), Some((_, d)) if d.is_ascii_digit() || d == '.') {
            self.pos += 1;
        }
        let literal: String = self.chars[start..self.pos].iter().map(|(_, c)| c).collect();
        parse_number(&literal)
    }
}

fn parse_number(literal: &str) -> Result<Number, ArithError> {
    let invalid = || ArithError::InvalidNumber(literal.to_string());

    if literal.contains('.') {
        if literal == "." || literal.matches('.').count() > 1 {
            return Err(invalid());
        }
        return literal.parse().map(Number::Float).map_err(|_| invalid());
    }

    match literal.parse::<i64>() {
        Ok(i) => Ok(Number::Int(i)),
        // Too large for i64; keep the magnitude as a float.
        Err(_) => literal.parse().map(Number::Float).map_err(|_| invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<const N: usize>(pairs: [(&str, Value); N]) -> Context {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn test_formula_scales_sensor_value() {
        let context = ctx([("d", Value::from(350))]);
        assert_eq!(evaluate_formula("{d} * 0.1", &context), Value::Float(35.0));
    }

    #[test]
    fn test_formula_integer_arithmetic() {
        let context = ctx([("a", Value::from(7)), ("b", Value::from(3))]);
        assert_eq!(evaluate_formula("{a} + {b}", &context), Value::Int(10));
        assert_eq!(evaluate_formula("{a} - {b} * 2", &context), Value::Int(1));
        assert_eq!(evaluate_formula("({a} - {b}) * 2", &context), Value::Int(8));
        assert_eq!(evaluate_formula("-{a} + 1", &context), Value::Int(-6));
    }

    #[test]
    fn test_division_always_float() {
        assert_eq!(evaluate_arithmetic("6 / 3"), Ok(Value::Float(2.0)));
        assert_eq!(evaluate_arithmetic("7 / 2"), Ok(Value::Float(3.5)));
    }

    #[test]
    fn test_overflow_promotes_to_float() {
        let Ok(Value::Float(f)) = evaluate_arithmetic("9223372036854775807 + 1") else {
            panic!("expected float promotion");
        };
        assert!(f > 9.2e18);
    }

    #[test]
    fn test_division_by_zero_returns_substituted() {
        let context = ctx([("x", Value::from(5))]);
        assert_eq!(
            evaluate_formula("{x} / 0", &context),
            Value::from("5 / 0")
        );
        assert_eq!(
            evaluate_arithmetic("1 / (2 - 2)"),
            Err(ArithError::DivisionByZero)
        );
    }

    #[test]
    fn test_syntax_errors_return_substituted() {
        assert_eq!(evaluate_formula("3 +", &Context::new()), Value::from("3 +"));
        assert_eq!(evaluate_formula("(1 + 2", &Context::new()), Value::from("(1 + 2"));
        assert_eq!(evaluate_formula("1 2", &Context::new()), Value::from("1 2"));
        assert_eq!(evaluate_formula("", &Context::new()), Value::from(""));
        assert_eq!(evaluate_formula("1..2", &Context::new()), Value::from("1..2"));
    }

    #[test]
    fn test_power_and_floor_division_are_not_supported() {
        assert_eq!(evaluate_formula("2 ** 3", &Context::new()), Value::from("2 ** 3"));
        assert_eq!(evaluate_formula("7 // 2", &Context::new()), Value::from("7 // 2"));
    }

    #[test]
    fn test_disallowed_characters() {
        let context = ctx([("name", Value::from("abc"))]);
        assert_eq!(evaluate_formula("{name} * 2", &context), Value::from("abc * 2"));
        assert_eq!(evaluate_formula("{missing} + 1", &context), Value::from("{missing} + 1"));
        // Exponent notation is not arithmetic, but still a number.
        assert_eq!(evaluate_formula("1e3", &context), Value::Float(1000.0));
    }

    #[test]
    fn test_float_operands() {
        assert_eq!(evaluate_arithmetic(".5 + 5."), Ok(Value::Float(5.5)));
        assert_eq!(evaluate_arithmetic("- -2.5"), Ok(Value::Float(2.5)));
    }
}
