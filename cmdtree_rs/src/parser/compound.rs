//! Several parsers bound as one argument, e.g. `x y z` coordinates.

use std::fmt;
use std::sync::Arc;

use crate::context::CommandContext;
use crate::error::ArgumentError;
use crate::input::TokenCursor;
use crate::value::Value;

use super::{ArgumentParser, InputShape, guarded_parse};

/// Runs its parts in order and binds their results as a [`Value::List`].
pub struct CompoundParser<S> {
    parts: Vec<(String, Arc<dyn ArgumentParser<S>>)>,
}

impl<S> CompoundParser<S> {
    pub fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// Append a named part. Names only appear in error messages.
    pub fn part(mut self, name: impl Into<String>, parser: impl ArgumentParser<S> + 'static) -> Self {
        self.parts.push((name.into(), Arc::new(parser)));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(name, _)| name.as_str())
    }
}

impl<S> Default for CompoundParser<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for CompoundParser<S> {
    fn clone(&self) -> Self {
        Self {
            parts: self.parts.clone(),
        }
    }
}

impl<S> fmt::Debug for CompoundParser<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl<S> ArgumentParser<S> for CompoundParser<S> {
    fn parse(
        &self,
        ctx: &mut CommandContext<'_, S>,
        input: &mut TokenCursor<'_>,
    ) -> Result<Value, ArgumentError> {
        ctx.set_pending_part(None);
        let mut values = Vec::with_capacity(self.parts.len());
        for (index, (name, parser)) in self.parts.iter().enumerate() {
            // While completing, stop at the part the user has not typed yet.
            if index > 0 && input.is_empty() && ctx.is_suggestions() {
                ctx.set_pending_part(Some(index));
                return Ok(Value::List(values));
            }
            let value = guarded_parse(parser.as_ref(), ctx, input).map_err(|err| match err {
                ArgumentError::NoInput => ArgumentError::NoInput,
                other => ArgumentError::Custom(format!("{name}: {other}")),
            })?;
            values.push(value);
        }
        Ok(Value::List(values))
    }

    /// Completes the part after the ones already typed, or the first part.
    fn suggestions(&self, ctx: &CommandContext<'_, S>, input: &str) -> Vec<String> {
        self.parts
            .get(ctx.pending_part().unwrap_or(0))
            .map(|(_, parser)| parser.suggestions(ctx, input))
            .unwrap_or_default()
    }

    fn is_context_free(&self) -> bool {
        self.parts.iter().all(|(_, parser)| parser.is_context_free())
    }

    fn shape(&self) -> InputShape {
        self.parts
            .first()
            .map(|(_, parser)| parser.shape())
            .unwrap_or(InputShape::Any)
    }

    fn consumes_remaining(&self) -> bool {
        self.parts
            .last()
            .is_some_and(|(_, parser)| parser.consumes_remaining())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::IntegerParser;
    use crate::parser::integer::integer_suggestions;

    fn position() -> CompoundParser<()> {
        CompoundParser::new()
            .part("x", IntegerParser::new())
            .part("y", IntegerParser::range(0, 255))
            .part("z", IntegerParser::new())
    }

    #[test]
    fn test_binds_list_in_order() {
        let tokens: Vec<String> = ["10", "64", "-3", "rest"].iter().map(|s| s.to_string()).collect();
        let mut cursor = TokenCursor::new(&tokens);
        let sender = ();
        let mut ctx = CommandContext::new(&sender);

        let value = position().parse(&mut ctx, &mut cursor).expect("valid position");
        assert_eq!(
            value,
            Value::List(vec![Value::Int(10), Value::Int(64), Value::Int(-3)])
        );
        assert_eq!(cursor.peek(), Some("rest"));
    }

    #[test]
    fn test_part_failure_names_the_part() {
        let tokens: Vec<String> = ["1", "999", "2"].iter().map(|s| s.to_string()).collect();
        let mut cursor = TokenCursor::new(&tokens);
        let sender = ();
        let mut ctx = CommandContext::new(&sender);

        let err = position().parse(&mut ctx, &mut cursor).unwrap_err();
        assert!(err.to_string().starts_with("y: "));

        let short: Vec<String> = vec!["1".into()];
        let mut cursor = TokenCursor::new(&short);
        assert!(position().parse(&mut ctx, &mut cursor).unwrap_err().is_no_input());
    }

    #[test]
    fn test_partial_input_while_completing() {
        let tokens: Vec<String> = vec!["1".into(), "64".into()];
        let mut cursor = TokenCursor::new(&tokens);
        let sender = ();
        let mut ctx = CommandContext::for_suggestions(&sender);

        let value = position().parse(&mut ctx, &mut cursor).expect("partial is fine");
        assert_eq!(value, Value::List(vec![Value::Int(1), Value::Int(64)]));
        assert_eq!(ctx.pending_part(), Some(2));
        assert_eq!(
            position().suggestions(&ctx, "3"),
            integer_suggestions(i64::MIN, i64::MAX, "3")
        );

        ctx.set_pending_part(Some(1));
        assert_eq!(
            position().suggestions(&ctx, "25"),
            vec!["25", "250", "251", "252", "253", "254", "255"]
        );
    }
}
