//! Template substitution and condition evaluation.
//!
//! The expression language is deliberately tiny: `{name}` placeholders, one
//! comparison operator per condition, and literal operands. Evaluation never
//! fails; malformed input degrades to `false` or to the literal text.

use std::cmp::Ordering;
use std::sync::LazyLock;

use multiview_model::{Color, ColorRule, Context, Value};
use regex::{Captures, Regex};

use crate::format::format_value;

static VARIABLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("variable pattern is valid"));

static TEMPLATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)(:[^}]+)?\}").expect("template pattern is valid"));

/// Comparison operators, in match priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Le,
    Ge,
    Lt,
    Gt,
}

impl CompareOp {
    /// Two-character operators come first so `<=` is never read as `<`.
    pub const ALL: [CompareOp; 6] = [
        CompareOp::Eq,
        CompareOp::Ne,
        CompareOp::Le,
        CompareOp::Ge,
        CompareOp::Lt,
        CompareOp::Gt,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Le => "<=",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
        }
    }

    /// Apply the operator. `None` means the operands are not comparable
    /// under this operator (ordering a string against a number).
    pub fn apply(self, left: &Value, right: &Value) -> Option<bool> {
        match compare_values(left, right) {
            Some(ordering) => Some(match self {
                CompareOp::Eq => ordering == Ordering::Equal,
                CompareOp::Ne => ordering != Ordering::Equal,
                CompareOp::Le => ordering != Ordering::Greater,
                CompareOp::Ge => ordering != Ordering::Less,
                CompareOp::Lt => ordering == Ordering::Less,
                CompareOp::Gt => ordering == Ordering::Greater,
            }),
            // Incomparable kinds are simply unequal.
            None => match self {
                CompareOp::Eq => Some(false),
                CompareOp::Ne => Some(true),
                _ => None,
            },
        }
    }
}

/// Total comparison between two parsed operands, when one exists.
///
/// Booleans count as 0/1, integers and floats compare numerically, strings
/// compare lexicographically. NaN is unordered: it is unequal to everything
/// and cannot be ordered.
fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Str(_), _) | (_, Value::Str(_)) | (Value::Null, _) | (_, Value::Null) => None,
        _ => left.as_f64()?.partial_cmp(&right.as_f64()?),
    }
}

/// Replace every `{name}` with its context value; unknown names stay literal.
pub fn substitute_variables(expr: &str, context: &Context) -> String {
    VARIABLE_PATTERN
        .replace_all(expr, |caps: &Captures<'_>| match context.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Parse a literal operand.
///
/// `true`/`false` (any case) become booleans, quoted text becomes a string
/// without its quotes, then a float is tried when a `.` is present and an
/// integer otherwise. Anything else is kept as a raw string.
pub fn parse_value(text: &str) -> Value {
    let text = text.trim();

    if text.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if text.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }

    for quote in ['\'', '"'] {
        if text.starts_with(quote) && text.ends_with(quote) {
            let inner = text.get(1..text.len().saturating_sub(1)).unwrap_or("");
            return Value::Str(inner.to_string());
        }
    }

    let numeric = if text.contains('.') {
        text.parse::<f64>().ok().map(Value::Float)
    } else {
        text.parse::<i64>().ok().map(Value::Int)
    };
    numeric.unwrap_or_else(|| Value::Str(text.to_string()))
}

/// Evaluate a condition such as `{distance} > 44` or `{status} == 'ERROR'`.
///
/// An empty condition is vacuously true. Without an operator, a literal
/// `true`/`false` is honored and anything else is looked up in the context
/// and truth-tested.
pub fn evaluate_condition(expr: &str, context: &Context) -> bool {
    if expr.is_empty() {
        return true;
    }

    let substituted = substitute_variables(expr, context);

    for op in CompareOp::ALL {
        let Some((left, right)) = substituted.split_once(op.symbol()) else {
            continue;
        };
        let left = parse_value(left);
        let right = parse_value(right);
        return match op.apply(&left, &right) {
            Some(result) => result,
            None => {
                tracing::debug!(
                    condition = expr,
                    left = left.type_name(),
                    right = right.type_name(),
                    op = op.symbol(),
                    "Operands are not comparable; condition is false"
                );
                false
            }
        };
    }

    let substituted = substituted.trim();
    if substituted.eq_ignore_ascii_case("true") {
        return true;
    }
    if substituted.eq_ignore_ascii_case("false") {
        return false;
    }

    context
        .get(substituted)
        .map(Value::is_truthy)
        .unwrap_or(false)
}

/// Render `{name}` and `{name:spec}` placeholders.
///
/// Unknown names stay literal. A spec that does not apply to the value's
/// type falls back to its plain display.
pub fn render_template(template: &str, context: &Context) -> String {
    TEMPLATE_PATTERN
        .replace_all(template, |caps: &Captures<'_>| {
            let Some(value) = context.get(&caps[1]) else {
                return caps[0].to_string();
            };

            match caps.get(2) {
                Some(spec) => {
                    let spec = &spec.as_str()[1..];
                    format_value(value, spec).unwrap_or_else(|| {
                        tracing::debug!(
                            name = &caps[1],
                            spec,
                            kind = value.type_name(),
                            "Format spec rejected; using plain display"
                        );
                        value.to_string()
                    })
                }
                None => value.to_string(),
            }
        })
        .into_owned()
}

/// First matching rule wins; a rule without a condition always matches.
pub fn evaluate_color_rules(rules: &[ColorRule], context: &Context, default: Color) -> Color {
    rules
        .iter()
        .find(|rule| match &rule.when {
            Some(condition) => evaluate_condition(condition, context),
            None => true,
        })
        .map(|rule| rule.color)
        .unwrap_or(default)
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
    fn test_substitute_variables() {
        let context = ctx([("name", Value::from("World")), ("count", Value::from(42))]);
        assert_eq!(
            substitute_variables("Hello {name}, {count} items", &context),
            "Hello World, 42 items"
        );
        assert_eq!(
            substitute_variables("Value: {unknown}", &context),
            "Value: {unknown}"
        );
        assert_eq!(substitute_variables("", &context), "");
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("true"), Value::Bool(true));
        assert_eq!(parse_value("FALSE"), Value::Bool(false));
        assert_eq!(parse_value("'hello'"), Value::from("hello"));
        assert_eq!(parse_value("\"world\""), Value::from("world"));
        assert_eq!(parse_value("42"), Value::Int(42));
        assert_eq!(parse_value("-7"), Value::Int(-7));
        assert_eq!(parse_value("3.14"), Value::Float(3.14));
        assert_eq!(parse_value(" 3.14 "), Value::Float(3.14));
        assert_eq!(parse_value("1.2.3"), Value::from("1.2.3"));
        assert_eq!(parse_value("abc"), Value::from("abc"));
        assert_eq!(parse_value("'"), Value::from(""));
    }

    #[test]
    fn test_condition_numeric_comparisons() {
        assert!(evaluate_condition("{x} > 44", &ctx([("x", Value::from(50))])));
        assert!(!evaluate_condition("{x} > 44", &ctx([("x", Value::from(10))])));
        assert!(evaluate_condition("{x} >= 5", &ctx([("x", Value::from(5))])));
        assert!(evaluate_condition("{x} <= 5", &ctx([("x", Value::from(5))])));
        assert!(evaluate_condition("{x} < 5.5", &ctx([("x", Value::from(5))])));
        assert!(evaluate_condition("{x} == 25.0", &ctx([("x", Value::from(25))])));
        assert!(evaluate_condition("{x} != 3", &ctx([("x", Value::from(4))])));
    }

    #[test]
    fn test_condition_empty_is_true() {
        assert!(evaluate_condition("", &Context::new()));
    }

    #[test]
    fn test_condition_strings_and_booleans() {
        let context = ctx([
            ("status", Value::from("ERROR")),
            ("manual", Value::from(true)),
        ]);
        assert!(evaluate_condition("{status} == 'ERROR'", &context));
        assert!(!evaluate_condition("{status} == 'OK'", &context));
        assert!(evaluate_condition("{manual} == true", &context));
        assert!(evaluate_condition("{manual} == 1", &context));
        assert!(evaluate_condition("{manual}", &context));
    }

    #[test]
    fn test_condition_mixed_types() {
        let context = ctx([("status", Value::from("idle"))]);
        assert!(!evaluate_condition("{status} == 5", &context));
        assert!(evaluate_condition("{status} != 5", &context));
        // Ordering a string against a number is a type error, hence false.
        assert!(!evaluate_condition("{status} > 5", &context));
        assert!(!evaluate_condition("{status} < 5", &context));
    }

    #[test]
    fn test_condition_without_operator() {
        let context = ctx([("flag", Value::from(true)), ("zero", Value::from(0))]);
        assert!(evaluate_condition("true", &context));
        assert!(!evaluate_condition("False", &context));
        assert!(evaluate_condition("flag", &context));
        assert!(!evaluate_condition("zero", &context));
        assert!(!evaluate_condition("missing", &context));
    }

    #[test]
    fn test_condition_unresolved_placeholder_stays_literal() {
        // `{missing}` is neither numeric nor quoted, so it compares as a string.
        assert!(!evaluate_condition("{missing} > 3", &Context::new()));
        assert!(evaluate_condition("{missing} == {missing}", &Context::new()));
    }

    #[test]
    fn test_operator_priority() {
        // `<=` must win over `<`, and `==` over everything else.
        assert!(evaluate_condition("3 <= 3", &Context::new()));
        assert!(evaluate_condition("'a<b' == 'a<b'", &Context::new()));
    }

    #[test]
    fn test_render_template() {
        let context = ctx([
            ("v", Value::from(3.14159)),
            ("name", Value::from("cam")),
            ("temp", Value::from(25.0)),
        ]);
        assert_eq!(render_template("{v:.2f}cm", &context), "3.14cm");
        assert_eq!(render_template("{name}: {temp}", &context), "cam: 25.0");
        assert_eq!(render_template("{unknown:.2f}", &context), "{unknown:.2f}");
        // `d` rejects floats; the value is displayed plainly instead.
        assert_eq!(render_template("{v:d}", &context), "3.14159");
        assert_eq!(render_template("[{name:>5}]", &context), "[  cam]");
    }

    #[test]
    fn test_color_rules_first_match_wins() {
        let red = Color::rgb(255, 0, 0);
        let yellow = Color::rgb(255, 255, 0);
        let green = Color::rgb(0, 255, 0);
        let rules = vec![
            ColorRule::when("{level} < 20", red),
            ColorRule::when("{level} < 50", yellow),
            ColorRule::otherwise(green),
        ];

        let at = |level: i64| evaluate_color_rules(&rules, &ctx([("level", Value::from(level))]), Color::WHITE);
        assert_eq!(at(10), red);
        assert_eq!(at(30), yellow);
        assert_eq!(at(80), green);
    }

    #[test]
    fn test_color_rules_default_when_nothing_matches() {
        let rules = vec![ColorRule::when("{level} > 100", Color::BLACK)];
        let context = ctx([("level", Value::from(5))]);
        assert_eq!(
            evaluate_color_rules(&rules, &context, Color::WHITE),
            Color::WHITE
        );
        assert_eq!(evaluate_color_rules(&[], &context, Color::MAGENTA), Color::MAGENTA);
    }
}
