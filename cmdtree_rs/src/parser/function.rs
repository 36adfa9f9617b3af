//! Closure-backed parsers for one-off argument types.

use std::fmt;
use std::sync::Arc;

use crate::context::CommandContext;
use crate::error::ArgumentError;
use crate::input::TokenCursor;
use crate::value::Value;

use super::{ArgumentParser, SuggestionProvider};

type ParseFn<S> = Arc<
    dyn Fn(&mut CommandContext<'_, S>, &mut TokenCursor<'_>) -> Result<Value, ArgumentError>
        + Send
        + Sync,
>;

/// A parser built from closures. It may read earlier bindings and the
/// sender through the context, so it is never context-free.
pub struct FnParser<S> {
    parse: ParseFn<S>,
    suggestions: Option<SuggestionProvider<S>>,
}

/// Build a parser from a closure.
///
/// ```
/// use cmdtree::{ArgumentError, Value, parser::from_fn};
///
/// let online = ["alice", "bob"];
/// let player = from_fn::<(), _>(move |_ctx, input| {
///     let token = input.peek().ok_or(ArgumentError::NoInput)?;
///     if !online.contains(&token) {
///         return Err(ArgumentError::custom(format!("'{token}' is not online")));
///     }
///     input.advance();
///     Ok(Value::Text(token.to_string()))
/// });
/// # let _ = player;
/// ```
pub fn from_fn<S, F>(parse: F) -> FnParser<S>
where
    F: Fn(&mut CommandContext<'_, S>, &mut TokenCursor<'_>) -> Result<Value, ArgumentError>
        + Send
        + Sync
        + 'static,
{
    FnParser {
        parse: Arc::new(parse),
        suggestions: None,
    }
}

impl<S> FnParser<S> {
    pub fn with_suggestions<F>(mut self, suggestions: F) -> Self
    where
        F: Fn(&CommandContext<'_, S>, &str) -> Vec<String> + Send + Sync + 'static,
    {
        self.suggestions = Some(Arc::new(suggestions));
        self
    }
}

impl<S> Clone for FnParser<S> {
    fn clone(&self) -> Self {
        Self {
            parse: Arc::clone(&self.parse),
            suggestions: self.suggestions.clone(),
        }
    }
}

impl<S> fmt::Debug for FnParser<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnParser")
            .field("suggestions", &self.suggestions.is_some())
            .finish_non_exhaustive()
    }
}

impl<S> ArgumentParser<S> for FnParser<S> {
    fn parse(
        &self,
        ctx: &mut CommandContext<'_, S>,
        input: &mut TokenCursor<'_>,
    ) -> Result<Value, ArgumentError> {
        (self.parse)(ctx, input)
    }

    fn suggestions(&self, ctx: &CommandContext<'_, S>, input: &str) -> Vec<String> {
        self.suggestions
            .as_ref()
            .map(|provider| provider(ctx, input))
            .unwrap_or_default()
    }
}
