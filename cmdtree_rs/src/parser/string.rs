//! String arguments.

use regex::Regex;

use crate::context::CommandContext;
use crate::error::ArgumentError;
use crate::input::TokenCursor;
use crate::value::Value;

use super::ArgumentParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringMode {
    /// Exactly one token.
    Single,
    /// Every remaining token, joined by single spaces.
    Greedy,
}

/// Free-text argument, optionally constrained by a regular expression.
#[derive(Debug, Clone)]
pub struct StringParser {
    mode: StringMode,
    pattern: Option<Regex>,
    completions: Vec<String>,
}

impl StringParser {
    pub fn single() -> Self {
        Self {
            mode: StringMode::Single,
            pattern: None,
            completions: Vec::new(),
        }
    }

    pub fn greedy() -> Self {
        Self {
            mode: StringMode::Greedy,
            ..Self::single()
        }
    }

    /// Reject values that do not match `pattern`.
    pub fn with_pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Like [`with_pattern`](Self::with_pattern), compiling `pattern` first.
    pub fn matching(self, pattern: &str) -> Result<Self, regex::Error> {
        Ok(self.with_pattern(Regex::new(pattern)?))
    }

    /// Static completions offered for this argument.
    pub fn with_completions<I, T>(mut self, completions: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.completions = completions.into_iter().map(Into::into).collect();
        self
    }

    pub fn mode(&self) -> StringMode {
        self.mode
    }

    fn check_pattern(&self, value: &str) -> Result<(), ArgumentError> {
        match &self.pattern {
            Some(pattern) if !pattern.is_match(value) => Err(ArgumentError::PatternMismatch {
                input: value.to_string(),
                pattern: pattern.as_str().to_string(),
            }),
            _ => Ok(()),
        }
    }
}

impl<S> ArgumentParser<S> for StringParser {
    fn parse(
        &self,
        _ctx: &mut CommandContext<'_, S>,
        input: &mut TokenCursor<'_>,
    ) -> Result<Value, ArgumentError> {
        if input.is_empty() {
            return Err(ArgumentError::NoInput);
        }
        let value = match self.mode {
            StringMode::Single => input.peek().unwrap_or_default().to_string(),
            StringMode::Greedy => input.remaining().join(" "),
        };
        self.check_pattern(&value)?;
        match self.mode {
            StringMode::Single => {
                input.advance();
            }
            StringMode::Greedy => {
                input.take_rest();
            }
        }
        Ok(Value::Text(value))
    }

    fn suggestions(&self, _ctx: &CommandContext<'_, S>, _input: &str) -> Vec<String> {
        self.completions.clone()
    }

    fn is_context_free(&self) -> bool {
        true
    }

    fn consumes_remaining(&self) -> bool {
        self.mode == StringMode::Greedy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(parser: &StringParser, raw: &[&str]) -> (Result<Value, ArgumentError>, usize) {
        let tokens: Vec<String> = raw.iter().map(|s| s.to_string()).collect();
        let mut cursor = TokenCursor::new(&tokens);
        let sender = ();
        let mut ctx = CommandContext::new(&sender);
        let result = parser.parse(&mut ctx, &mut cursor);
        (result, cursor.len())
    }

    #[test]
    fn test_single_takes_one_token() {
        let (result, left) = run(&StringParser::single(), &["hello", "world"]);
        assert_eq!(result, Ok(Value::Text("hello".into())));
        assert_eq!(left, 1);
    }

    #[test]
    fn test_greedy_takes_everything() {
        let parser = StringParser::greedy();
        let (result, left) = run(&parser, &["hello", "big", "world"]);
        assert_eq!(result, Ok(Value::Text("hello big world".into())));
        assert_eq!(left, 0);
        assert!(ArgumentParser::<()>::consumes_remaining(&parser));
    }

    #[test]
    fn test_pattern_mismatch_leaves_input() {
        let parser = StringParser::single()
            .matching(r"^[a-z]+$")
            .expect("valid regex");
        let (result, left) = run(&parser, &["Bob42"]);
        assert!(matches!(result, Err(ArgumentError::PatternMismatch { .. })));
        assert_eq!(left, 1);
        assert!(run(&parser, &[]).0.unwrap_err().is_no_input());
    }
}
