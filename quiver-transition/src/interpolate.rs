use quiver_scales::color::interpolate_rgb;
use quiver_scenegraph::node::{fmt_number, AttrValue};

pub fn interpolate_number(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// Interpolates between two attribute values.
///
/// Numbers and colours blend directly. Text and path data blend the numbers
/// embedded in them, keeping the non-numeric parts of `b`; a missing start
/// value or a kind mismatch jumps straight to `b`.
pub fn interpolate_attr(a: Option<&AttrValue>, b: &AttrValue, t: f64) -> AttrValue {
    match (a, b) {
        (Some(AttrValue::Number(a)), AttrValue::Number(b)) => {
            AttrValue::Number(interpolate_number(*a, *b, t))
        }
        (Some(AttrValue::Color(a)), AttrValue::Color(b)) => {
            AttrValue::Color(interpolate_rgb(*a, *b, t))
        }
        (Some(AttrValue::Text(a)), AttrValue::Text(b)) => {
            AttrValue::Text(interpolate_string(a, b, t))
        }
        (Some(AttrValue::Path(a)), AttrValue::Path(b)) => {
            AttrValue::Path(interpolate_string(a, b, t))
        }
        _ => b.clone(),
    }
}

/// A string split into literal text and the numbers between it
#[derive(Debug, PartialEq)]
struct NumberTemplate<'a> {
    literals: Vec<&'a str>,
    numbers: Vec<f64>,
}

fn number_template(s: &str) -> NumberTemplate<'_> {
    let bytes = s.as_bytes();
    let mut literals = Vec::new();
    let mut numbers = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let starts_number = bytes[i].is_ascii_digit()
            || ((bytes[i] == b'-' || bytes[i] == b'+' || bytes[i] == b'.')
                && bytes
                    .get(i + 1)
                    .is_some_and(|c| c.is_ascii_digit() || *c == b'.'));
        if !starts_number {
            i += 1;
            continue;
        }
        let mut end = i + 1;
        let mut seen_dot = bytes[i] == b'.';
        let mut seen_exp = false;
        while end < bytes.len() {
            let c = bytes[end];
            if c.is_ascii_digit() {
                end += 1;
            } else if c == b'.' && !seen_dot && !seen_exp {
                seen_dot = true;
                end += 1;
            } else if (c == b'e' || c == b'E')
                && !seen_exp
                && bytes.get(end + 1).is_some_and(|n| {
                    n.is_ascii_digit()
                        || ((*n == b'-' || *n == b'+')
                            && bytes.get(end + 2).is_some_and(u8::is_ascii_digit))
                })
            {
                seen_exp = true;
                end += 2;
            } else {
                break;
            }
        }
        if let Ok(v) = s[i..end].parse::<f64>() {
            literals.push(&s[literal_start..i]);
            numbers.push(v);
            literal_start = end;
        }
        i = end;
    }
    literals.push(&s[literal_start..]);
    NumberTemplate { literals, numbers }
}

/// Interpolates the numbers embedded in two strings, e.g. transforms
/// `translate(0,10)` to `translate(50,30)`.
pub fn interpolate_string(a: &str, b: &str, t: f64) -> String {
    if t >= 1.0 {
        return b.to_string();
    }
    let from = number_template(a);
    let to = number_template(b);
    let mut out = String::with_capacity(b.len());
    for (i, literal) in to.literals.iter().enumerate() {
        out.push_str(literal);
        if let Some(target) = to.numbers.get(i) {
            let value = match from.numbers.get(i) {
                Some(start) => interpolate_number(*start, *target, t),
                None => *target,
            };
            out.push_str(&fmt_number(value));
        }
    }
    out
}
