//! Bounded integer arguments.

use std::collections::BTreeSet;

use crate::context::CommandContext;
use crate::error::ArgumentError;
use crate::input::TokenCursor;
use crate::value::Value;

use super::{ArgumentParser, InputShape};

/// How many `n * 10 + d` continuations are proposed for a typed prefix `n`.
const MAX_SUGGESTIONS_INCREMENT: i128 = 10;
const NUMBER_SHIFT_MULTIPLIER: i128 = 10;

/// Parses one token as an `i64` within `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerParser {
    min: i64,
    max: i64,
}

impl IntegerParser {
    pub fn new() -> Self {
        Self {
            min: i64::MIN,
            max: i64::MAX,
        }
    }

    pub fn range(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn with_min(self, min: i64) -> Self {
        Self { min, ..self }
    }

    pub fn with_max(self, max: i64) -> Self {
        Self { max, ..self }
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn has_min(&self) -> bool {
        self.min != i64::MIN
    }

    pub fn has_max(&self) -> bool {
        self.max != i64::MAX
    }
}

impl Default for IntegerParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Numeric completions for a partially typed number.
///
/// The typed number itself is proposed along with its next-digit
/// continuations that stay within `max`. The sign of the input is kept and
/// anything outside `[min, max]` is dropped. Results are ordered by absolute
/// value. Input that is not numeric yields nothing.
pub fn integer_suggestions(min: i64, max: i64, input: &str) -> Vec<String> {
    let normalized = match input {
        "" => "0",
        "-" => "-0",
        other => other,
    };
    let Ok(number) = normalized.parse::<i64>() else {
        return Vec::new();
    };

    let number = i128::from(number);
    let negative = input.starts_with('-');
    let absolute = number.abs();

    let mut numbers = BTreeSet::new();
    numbers.insert(absolute);
    for digit in 0..MAX_SUGGESTIONS_INCREMENT {
        if number * NUMBER_SHIFT_MULTIPLIER + digit > i128::from(max) {
            break;
        }
        numbers.insert(absolute * NUMBER_SHIFT_MULTIPLIER + digit);
    }

    numbers
        .into_iter()
        .map(|n| if negative { -n } else { n })
        .filter(|n| (i128::from(min)..=i128::from(max)).contains(n))
        .map(|n| n.to_string())
        .collect()
}

impl<S> ArgumentParser<S> for IntegerParser {
    fn parse(
        &self,
        _ctx: &mut CommandContext<'_, S>,
        input: &mut TokenCursor<'_>,
    ) -> Result<Value, ArgumentError> {
        let token = input.peek().ok_or(ArgumentError::NoInput)?;
        let value: i64 = token.parse().map_err(|_| ArgumentError::NotANumber {
            input: token.to_string(),
        })?;
        if value < self.min || value > self.max {
            return Err(ArgumentError::OutOfRange {
                input: token.to_string(),
                min: self.min,
                max: self.max,
            });
        }
        input.advance();
        Ok(Value::Int(value))
    }

    fn suggestions(&self, _ctx: &CommandContext<'_, S>, input: &str) -> Vec<String> {
        integer_suggestions(self.min, self.max, input)
    }

    fn is_context_free(&self) -> bool {
        true
    }

    fn shape(&self) -> InputShape {
        InputShape::Integer {
            min: self.min,
            max: self.max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(parser: IntegerParser, token: &str) -> Result<Value, ArgumentError> {
        let tokens = vec![token.to_string()];
        let mut cursor = TokenCursor::new(&tokens);
        let sender = ();
        let mut ctx = CommandContext::new(&sender);
        parser.parse(&mut ctx, &mut cursor)
    }

    #[test]
    fn test_distinct_failure_kinds() {
        let parser = IntegerParser::range(1, 64);
        assert_eq!(parse(parser, "10"), Ok(Value::Int(10)));
        assert!(parse(parser, "100").unwrap_err().is_out_of_range());
        assert_eq!(
            parse(parser, "ten"),
            Err(ArgumentError::NotANumber {
                input: "ten".into()
            })
        );
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let parser = IntegerParser::new().with_min(-5).with_max(5);
        assert!(parse(parser, "-5").is_ok());
        assert!(parse(parser, "5").is_ok());
        assert!(parse(parser, "6").is_err());
        assert!(parser.has_min() && parser.has_max());
        assert!(!IntegerParser::new().has_max());
    }

    #[test]
    fn test_suggestions_for_empty_input() {
        let expected: Vec<String> = (1..=9).map(|n| n.to_string()).collect();
        assert_eq!(integer_suggestions(1, 64, ""), expected);
    }

    #[test]
    fn test_suggestions_respect_max() {
        assert_eq!(
            integer_suggestions(1, 64, "6"),
            vec!["6", "60", "61", "62", "63", "64"]
        );
        assert!(integer_suggestions(1, 64, "abc").is_empty());
    }

    #[test]
    fn test_suggestions_keep_sign() {
        let suggestions = integer_suggestions(-20, 20, "-1");
        assert_eq!(suggestions.first().map(String::as_str), Some("-1"));
        assert!(suggestions.contains(&"-15".to_string()));
        assert!(suggestions.iter().all(|s| s.starts_with('-')));
    }
}
