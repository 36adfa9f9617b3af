//! Fixed-text arguments: command and sub-command names.

use crate::context::CommandContext;
use crate::error::ArgumentError;
use crate::input::TokenCursor;
use crate::value::Value;

use super::{ArgumentParser, InputShape};

/// Matches exactly its name or one of its aliases, case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralParser {
    name: String,
    aliases: Vec<String>,
}

impl LiteralParser {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.add_alias(alias);
        self
    }

    pub(crate) fn add_alias(&mut self, alias: impl Into<String>) {
        let alias = alias.into();
        if alias != self.name && !self.aliases.contains(&alias) {
            self.aliases.push(alias);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Primary name first, then aliases in declaration order.
    pub fn spellings(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    pub fn matches(&self, token: &str) -> bool {
        self.spellings().any(|spelling| spelling == token)
    }

    /// First spelling shared with `other`, if any.
    pub fn collision_with(&self, other: &LiteralParser) -> Option<&str> {
        self.spellings().find(|spelling| other.matches(spelling))
    }

    /// Spellings starting with `partial`; aliases only when `include_aliases`.
    pub fn completions(&self, partial: &str, include_aliases: bool) -> Vec<String> {
        let candidates: Box<dyn Iterator<Item = &str>> = if include_aliases {
            Box::new(self.spellings())
        } else {
            Box::new(std::iter::once(self.name.as_str()))
        };
        candidates
            .filter(|spelling| spelling.starts_with(partial))
            .map(str::to_string)
            .collect()
    }
}

impl<S> ArgumentParser<S> for LiteralParser {
    fn parse(
        &self,
        _ctx: &mut CommandContext<'_, S>,
        input: &mut TokenCursor<'_>,
    ) -> Result<Value, ArgumentError> {
        let token = input.peek().ok_or(ArgumentError::NoInput)?;
        if !self.matches(token) {
            return Err(ArgumentError::UnknownLiteral {
                input: token.to_string(),
                expected: self.spellings().map(str::to_string).collect(),
            });
        }
        input.advance();
        Ok(Value::Text(self.name.clone()))
    }

    fn suggestions(&self, _ctx: &CommandContext<'_, S>, input: &str) -> Vec<String> {
        self.completions(input, true)
    }

    fn is_context_free(&self) -> bool {
        true
    }

    fn shape(&self) -> InputShape {
        InputShape::Choices(self.spellings().map(str::to_lowercase).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_matching_and_canonical_value() {
        let literal = LiteralParser::new("teleport").with_alias("tp");
        let tokens = vec!["tp".to_string()];
        let mut cursor = TokenCursor::new(&tokens);
        let sender = ();
        let mut ctx = CommandContext::new(&sender);

        let value = literal.parse(&mut ctx, &mut cursor).expect("alias matches");
        assert_eq!(value, Value::Text("teleport".into()));
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_mismatch_does_not_consume() {
        let literal = LiteralParser::new("give");
        let tokens = vec!["take".to_string()];
        let mut cursor = TokenCursor::new(&tokens);
        let sender = ();
        let mut ctx = CommandContext::new(&sender);

        let err = literal.parse(&mut ctx, &mut cursor).unwrap_err();
        assert!(matches!(err, ArgumentError::UnknownLiteral { .. }));
        assert_eq!(cursor.len(), 1);
    }

    #[test]
    fn test_completions_and_collisions() {
        let literal = LiteralParser::new("gamemode").with_alias("gm").with_alias("gm");
        assert_eq!(literal.aliases(), ["gm".to_string()]);
        assert_eq!(literal.completions("g", true), vec!["gamemode", "gm"]);
        assert_eq!(literal.completions("g", false), vec!["gamemode"]);

        let other = LiteralParser::new("give").with_alias("gm");
        assert_eq!(literal.collision_with(&other), Some("gm"));
        assert_eq!(literal.collision_with(&LiteralParser::new("kick")), None);
    }
}
