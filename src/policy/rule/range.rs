//! Two-ended ranges for the `between` operator

use super::ast::{RuleValue, Scalar};
use super::reconcile::parse_number;

/// Inclusive numeric range; a missing bound is open on that side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Range {
    /// Read a range from `"min,max"` or `[min, max]`.
    ///
    /// Returns `None` when the value has the wrong shape, a bound does not
    /// parse, or both bounds are blank.
    pub fn parse(value: &RuleValue) -> Option<Range> {
        let (min, max) = match value {
            RuleValue::Scalar(Scalar::Text(text)) => {
                let (min, max) = text.split_once(',')?;
                (parse_bound_text(min)?, parse_bound_text(max)?)
            }
            RuleValue::List(items) if items.len() == 2 => {
                (parse_bound(&items[0])?, parse_bound(&items[1])?)
            }
            _ => return None,
        };

        if min.is_none() && max.is_none() {
            return None;
        }
        Some(Range { min, max })
    }

    pub fn contains(&self, n: f64) -> bool {
        self.min.map_or(true, |min| min <= n) && self.max.map_or(true, |max| n <= max)
    }
}

/// `Some(None)` is a blank bound, `None` a bound that does not parse
fn parse_bound_text(text: &str) -> Option<Option<f64>> {
    if text.trim().is_empty() {
        return Some(None);
    }
    parse_number(text).map(Some)
}

fn parse_bound(scalar: &Scalar) -> Option<Option<f64>> {
    match scalar {
        Scalar::Number(n) => Some(Some(*n)),
        Scalar::Text(text) => parse_bound_text(text),
    }
}
