//! Format directives for `{name:spec}` placeholders.
//!
//! Supports the common subset of the format mini-language:
//!
//! ```text
//! [[fill]align][sign][0][width][,|_][.precision][type]
//! ```
//!
//! Alignments are `<`, `>`, `^` and `=`; signs `+`, `-` and space. Types are
//! `f F e E g G %` for floating point, `d x X o b` for integers, `s` for text,
//! or none. A spec that does not apply to the value is rejected as a whole
//! (`None`) and callers fall back to plain display.

use multiview_model::{format_float, normalize_exponent, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
    /// Padding goes between the sign and the digits.
    AfterSign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Minus,
    Plus,
    Space,
}

/// A parsed format directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    fill: Option<char>,
    align: Option<Align>,
    sign: Option<Sign>,
    zero_pad: bool,
    width: usize,
    grouping: Option<char>,
    precision: Option<usize>,
    kind: Option<char>,
}

impl FormatSpec {
    /// Parse a directive; `None` if the syntax is not understood.
    pub fn parse(spec: &str) -> Option<Self> {
        let chars: Vec<char> = spec.chars().collect();
        let mut i = 0;

        let align_of = |c: char| match c {
            '<' => Some(Align::Left),
            '>' => Some(Align::Right),
            '^' => Some(Align::Center),
            '=' => Some(Align::AfterSign),
            _ => None,
        };

        let (mut fill, mut align) = (None, None);
        if let Some(a) = chars.get(1).and_then(|c| align_of(*c)) {
            fill = Some(chars[0]);
            align = Some(a);
            i = 2;
        } else if let Some(a) = chars.first().and_then(|c| align_of(*c)) {
            align = Some(a);
            i = 1;
        }

        let sign = match chars.get(i) {
            Some('+') => Some(Sign::Plus),
            Some('-') => Some(Sign::Minus),
            Some(' ') => Some(Sign::Space),
            _ => None,
        };
        if sign.is_some() {
            i += 1;
        }

        let zero_pad = chars.get(i) == Some(&'0');
        if zero_pad {
            i += 1;
        }

        let width = take_number(&chars, &mut i).unwrap_or(0);

        let grouping = match chars.get(i) {
            Some(c @ (',' | '_')) => {
                i += 1;
                Some(*c)
            }
            _ => None,
        };

        let precision = if chars.get(i) == Some(&'.') {
            i += 1;
            Some(take_number(&chars, &mut i)?)
        } else {
            None
        };

        let kind = match chars.get(i) {
            Some(c) if "fFeEgG%dxXobs".contains(*c) => {
                i += 1;
                Some(*c)
            }
            _ => None,
        };

        if i != chars.len() {
            return None;
        }

        Some(Self {
            fill,
            align,
            sign,
            zero_pad,
            width,
            grouping,
            precision,
            kind,
        })
    }

    /// Apply this directive to a value.
    pub fn apply(&self, value: &Value) -> Option<String> {
        match value {
            // Booleans format as the integers 0/1 once a spec is given.
            Value::Bool(b) => self.format_int(i64::from(*b)),
            Value::Int(i) => self.format_int(*i),
            Value::Float(f) => self.format_float(*f),
            Value::Str(s) => self.format_str(s),
            Value::Null => None,
        }
    }

    fn format_str(&self, text: &str) -> Option<String> {
        if !matches!(self.kind, None | Some('s'))
            || self.sign.is_some()
            || self.grouping.is_some()
            || self.align == Some(Align::AfterSign)
        {
            return None;
        }
        let body: String = match self.precision {
            Some(p) => text.chars().take(p).collect(),
            None => text.to_string(),
        };
        Some(self.pad("", &body, Align::Left))
    }

    fn format_int(&self, value: i64) -> Option<String> {
        let (radix, upper) = match self.kind {
            None | Some('d') => (10, false),
            Some('x') => (16, false),
            Some('X') => (16, true),
            Some('o') => (8, false),
            Some('b') => (2, false),
            Some('s') => return None,
            // Float presentation types convert the integer.
            Some(_) => return self.format_float(value as f64),
        };
        if self.precision.is_some() {
            return None;
        }

        let magnitude = value.unsigned_abs();
        let mut digits = match radix {
            16 => format!("{magnitude:x}"),
            8 => format!("{magnitude:o}"),
            2 => format!("{magnitude:b}"),
            _ => magnitude.to_string(),
        };
        if upper {
            digits = digits.to_uppercase();
        }

        let digits = match (self.grouping, radix) {
            (None, _) => digits,
            (Some(sep), 10) => group_digits(&digits, sep, 3),
            (Some('_'), _) => group_digits(&digits, '_', 4),
            _ => return None,
        };

        Some(self.pad(self.sign_prefix(value < 0), &digits, Align::Right))
    }

    fn format_float(&self, value: f64) -> Option<String> {
        let kind = self.kind.unwrap_or('\0');
        if !matches!(kind, '\0' | 'f' | 'F' | 'e' | 'E' | 'g' | 'G' | '%') {
            return None;
        }

        let negative = value.is_sign_negative() && !value.is_nan();
        let magnitude = value.abs();

        let body = if !magnitude.is_finite() {
            let text = if magnitude.is_nan() { "nan" } else { "inf" };
            if kind.is_ascii_uppercase() {
                text.to_uppercase()
            } else {
                text.to_string()
            }
        } else {
            match kind {
                'f' | 'F' => fixed(magnitude, self.precision.unwrap_or(6)),
                'e' | 'E' => {
                    let text = scientific(magnitude, self.precision.unwrap_or(6));
                    if kind == 'E' {
                        text.to_uppercase()
                    } else {
                        text
                    }
                }
                'g' | 'G' => {
                    let text = general(magnitude, self.precision.unwrap_or(6), false);
                    if kind == 'G' {
                        text.to_uppercase()
                    } else {
                        text
                    }
                }
                '%' => format!("{}%", fixed(magnitude * 100.0, self.precision.unwrap_or(6))),
                _ => match self.precision {
                    Some(p) => general(magnitude, p, true),
                    None => format_float(magnitude),
                },
            }
        };

        let body = match self.grouping {
            Some(sep) if magnitude.is_finite() => group_leading_integer(&body, sep),
            _ => body,
        };

        Some(self.pad(self.sign_prefix(negative), &body, Align::Right))
    }

    fn sign_prefix(&self, negative: bool) -> &'static str {
        match (negative, self.sign) {
            (true, _) => "-",
            (false, Some(Sign::Plus)) => "+",
            (false, Some(Sign::Space)) => " ",
            (false, _) => "",
        }
    }

    fn pad(&self, sign: &str, body: &str, default_align: Align) -> String {
        let (fill, align) = match (self.fill, self.align, self.zero_pad) {
            (Some(fill), Some(align), _) => (fill, align),
            (None, Some(align), true) => ('0', align),
            (None, Some(align), false) => (' ', align),
            (_, None, true) => ('0', Align::AfterSign),
            (_, None, false) => (' ', default_align),
        };

        let len = sign.chars().count() + body.chars().count();
        let missing = self.width.saturating_sub(len);
        let filler = |n: usize| std::iter::repeat(fill).take(n).collect::<String>();

        match align {
            Align::Left => format!("{sign}{body}{}", filler(missing)),
            Align::Right => format!("{}{sign}{body}", filler(missing)),
            Align::Center => {
                let left = missing / 2;
                format!("{}{sign}{body}{}", filler(left), filler(missing - left))
            }
            Align::AfterSign => format!("{sign}{}{body}", filler(missing)),
        }
    }
}

/// Format `value` with `spec`, or `None` if the spec does not apply.
pub fn format_value(value: &Value, spec: &str) -> Option<String> {
    FormatSpec::parse(spec)?.apply(value)
}

fn take_number(chars: &[char], i: &mut usize) -> Option<usize> {
    let start = *i;
    while chars.get(*i).is_some_and(char::is_ascii_digit) {
        *i += 1;
    }
    if *i == start {
        return None;
    }
    chars[start..*i].iter().collect::<String>().parse().ok()
}

fn fixed(value: f64, precision: usize) -> String {
    format!("{value:.precision$}")
}

fn scientific(value: f64, precision: usize) -> String {
    normalize_exponent(&format!("{value:.precision$e}"))
}

/// `g` presentation: significant-digit rounding, then fixed or scientific
/// depending on the decimal exponent. Trailing zeros are removed; with
/// `keep_point`, integral fixed output keeps one decimal (`3.0`).
fn general(value: f64, precision: usize, keep_point: bool) -> String {
    let precision = precision.max(1);
    if value == 0.0 {
        return if keep_point { "0.0" } else { "0" }.to_string();
    }

    // Exponent after rounding to `precision` significant digits.
    let digits = precision - 1;
    let rounded = format!("{value:.digits$e}");
    let exponent: i32 = rounded
        .split_once('e')
        .and_then(|(_, exp)| exp.parse().ok())
        .unwrap_or(0);

    if exponent < -4 || exponent >= precision as i32 {
        let (mantissa, _) = rounded.split_once('e').unwrap_or((&rounded, ""));
        let mantissa = strip_fraction_zeros(mantissa);
        normalize_exponent(&format!("{mantissa}e{exponent}"))
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        let text = strip_fraction_zeros(&fixed(value, decimals));
        if keep_point && !text.contains('.') {
            format!("{text}.0")
        } else {
            text
        }
    }
}

fn strip_fraction_zeros(text: &str) -> String {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text.to_string()
    }
}

fn group_digits(digits: &str, separator: char, every: usize) -> String {
    let count = digits.chars().count();
    let mut out = String::with_capacity(count + count / every);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (count - i) % every == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

/// Group the integer digits at the front of a formatted float.
fn group_leading_integer(body: &str, separator: char) -> String {
    let split = body
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(body.len());
    let (integer, rest) = body.split_at(split);
    format!("{}{rest}", group_digits(integer, separator, 3))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(value: impl Into<Value>, spec: &str) -> Option<String> {
        format_value(&value.into(), spec)
    }

    #[test]
    fn test_fixed_point() {
        assert_eq!(fmt(3.14159, ".2f").as_deref(), Some("3.14"));
        assert_eq!(fmt(2.0, ".0f").as_deref(), Some("2"));
        assert_eq!(fmt(-1.5, ".3f").as_deref(), Some("-1.500"));
        assert_eq!(fmt(42, ".1f").as_deref(), Some("42.0"));
        assert_eq!(fmt(1.0, "f").as_deref(), Some("1.000000"));
    }

    #[test]
    fn test_width_fill_and_alignment() {
        assert_eq!(fmt(25.5, "6.1f").as_deref(), Some("  25.5"));
        assert_eq!(fmt(25.5, "<6.1f").as_deref(), Some("25.5  "));
        assert_eq!(fmt(25.5, "*^8.1f").as_deref(), Some("**25.5**"));
        assert_eq!(fmt(7, "03d").as_deref(), Some("007"));
        assert_eq!(fmt(-7, "04d").as_deref(), Some("-007"));
        assert_eq!(fmt("ab", ">4").as_deref(), Some("  ab"));
        assert_eq!(fmt("ab", "4").as_deref(), Some("ab  "));
    }

    #[test]
    fn test_sign_options() {
        assert_eq!(fmt(5, "+d").as_deref(), Some("+5"));
        assert_eq!(fmt(5, " d").as_deref(), Some(" 5"));
        assert_eq!(fmt(-5.26, "+.1f").as_deref(), Some("-5.3"));
    }

    #[test]
    fn test_grouping() {
        assert_eq!(fmt(1234567, ",").as_deref(), Some("1,234,567"));
        assert_eq!(fmt(1234567.891, ",.2f").as_deref(), Some("1,234,567.89"));
        assert_eq!(fmt(255, "_b").as_deref(), Some("1111_1111"));
        assert_eq!(fmt(255, ",x"), None);
    }

    #[test]
    fn test_integer_radixes() {
        assert_eq!(fmt(255, "x").as_deref(), Some("ff"));
        assert_eq!(fmt(255, "X").as_deref(), Some("FF"));
        assert_eq!(fmt(8, "o").as_deref(), Some("10"));
        assert_eq!(fmt(5, "b").as_deref(), Some("101"));
        assert_eq!(fmt(-255, "x").as_deref(), Some("-ff"));
    }

    #[test]
    fn test_scientific_and_general() {
        assert_eq!(fmt(12345.678, ".2e").as_deref(), Some("1.23e+04"));
        assert_eq!(fmt(0.00012, "E").as_deref(), Some("1.200000E-04"));
        assert_eq!(fmt(1234.5678, "g").as_deref(), Some("1234.57"));
        assert_eq!(fmt(0.00001234, "g").as_deref(), Some("1.234e-05"));
        assert_eq!(fmt(1234567.0, ".3g").as_deref(), Some("1.23e+06"));
        assert_eq!(fmt(100.0, "g").as_deref(), Some("100"));
    }

    #[test]
    fn test_no_type_with_precision() {
        assert_eq!(fmt(3.0, ".3").as_deref(), Some("3.0"));
        assert_eq!(fmt(3.14159, ".3").as_deref(), Some("3.14"));
        assert_eq!(fmt(1234.5678, ".2").as_deref(), Some("1.2e+03"));
    }

    #[test]
    fn test_percent() {
        assert_eq!(fmt(0.256, ".1%").as_deref(), Some("25.6%"));
        assert_eq!(fmt(1, ".0%").as_deref(), Some("100%"));
    }

    #[test]
    fn test_strings() {
        assert_eq!(fmt("hello", ".3").as_deref(), Some("hel"));
        assert_eq!(fmt("hello", "s").as_deref(), Some("hello"));
        assert_eq!(fmt("hello", ".2f"), None);
        assert_eq!(fmt("hello", "+"), None);
    }

    #[test]
    fn test_type_mismatches_rejected() {
        assert_eq!(fmt(3.5, "d"), None);
        assert_eq!(fmt(3, "s"), None);
        assert_eq!(fmt(3, ".2d"), None);
        assert_eq!(format_value(&Value::Null, ".2f"), None);
    }

    #[test]
    fn test_booleans_format_as_integers() {
        assert_eq!(fmt(true, "d").as_deref(), Some("1"));
        assert_eq!(fmt(false, ".1f").as_deref(), Some("0.0"));
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(fmt(f64::INFINITY, ".2f").as_deref(), Some("inf"));
        assert_eq!(fmt(f64::NEG_INFINITY, "F").as_deref(), Some("-INF"));
        assert_eq!(fmt(f64::NAN, ".1f").as_deref(), Some("nan"));
    }

    #[test]
    fn test_malformed_specs_rejected() {
        assert_eq!(FormatSpec::parse(".f"), None);
        assert_eq!(FormatSpec::parse("2.2q"), None);
        assert_eq!(FormatSpec::parse("#x"), None);
    }
}
