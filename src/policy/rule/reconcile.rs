//! Value reconciliation
//!
//! Aligns a record value with a predicate literal before any operator runs:
//! - numeric literal vs. textual record value: the leading number of the
//!   text is read as `f64`, so `"150000 MAD"` is `150000`
//! - textual literal vs. numeric record value: the number is rendered as text
//! - same kinds are compared natively

use super::ast::Scalar;
use std::borrow::Cow;
use std::cmp::Ordering;

/// A record value and a literal brought to the same kind
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciled<'a> {
    Numbers(f64, f64),
    Texts(Cow<'a, str>, Cow<'a, str>),
}

/// The record text could not be read as a number
#[derive(Debug, Clone, PartialEq)]
pub struct NotANumber;

/// Reconcile `record` (left-hand side) with `literal` (right-hand side)
pub fn reconcile<'a>(record: &'a Scalar, literal: &'a Scalar) -> Result<Reconciled<'a>, NotANumber> {
    match (record, literal) {
        (Scalar::Number(a), Scalar::Number(b)) => Ok(Reconciled::Numbers(*a, *b)),
        (Scalar::Text(a), Scalar::Number(b)) => parse_number(a)
            .map(|a| Reconciled::Numbers(a, *b))
            .ok_or(NotANumber),
        (Scalar::Number(a), Scalar::Text(b)) => Ok(Reconciled::Texts(
            Cow::Owned(canonical_text(*a)),
            Cow::Borrowed(b.as_str()),
        )),
        (Scalar::Text(a), Scalar::Text(b)) => Ok(Reconciled::Texts(
            Cow::Borrowed(a.as_str()),
            Cow::Borrowed(b.as_str()),
        )),
    }
}

impl Reconciled<'_> {
    pub fn equals(&self) -> bool {
        match self {
            Reconciled::Numbers(a, b) => a == b,
            Reconciled::Texts(a, b) => a == b,
        }
    }

    /// Numeric order for numbers, lexical order for text.
    ///
    /// Text is ordered by UTF-8 bytes, which agrees with code point order.
    /// It differs from UTF-16 code unit order only between characters above
    /// U+FFFF and those in U+E000..=U+FFFF.
    pub fn ordering(&self) -> Option<Ordering> {
        match self {
            Reconciled::Numbers(a, b) => a.partial_cmp(b),
            Reconciled::Texts(a, b) => Some(a.cmp(b)),
        }
    }

    /// Text forms of both sides, for the substring operators
    pub fn texts(&self) -> (Cow<'_, str>, Cow<'_, str>) {
        match self {
            Reconciled::Numbers(a, b) => (
                Cow::Owned(canonical_text(*a)),
                Cow::Owned(canonical_text(*b)),
            ),
            Reconciled::Texts(a, b) => (Cow::Borrowed(&**a), Cow::Borrowed(&**b)),
        }
    }
}

/// Read the number at the start of `text`, ignoring whatever follows it.
///
/// Leading whitespace is skipped. The number is an optional sign followed by
/// either `Infinity` or decimal digits with an optional fraction and
/// exponent. `None` when no such prefix exists; `inf` and `NaN` are not
/// numbers here.
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if text[end..].starts_with("Infinity") {
        return Some(if bytes[0] == b'-' {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        end += 1 + frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    // an exponent counts only when it has digits
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = count_digits(&bytes[exp..]);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    text[..end].parse::<f64>().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Shortest decimal text of a number: `150000`, `1.5`, `0` for both zeros.
///
/// Magnitudes from `1e21` up and below `1e-6` use exponent form with a
/// signed exponent: `1e+21`, `1.5e-7`.
pub fn canonical_text(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        let text = format!("{:e}", n);
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => text,
        }
    } else {
        n.to_string()
    }
}
