//! One-of-N word arguments.

use crate::context::CommandContext;
use crate::error::ArgumentError;
use crate::input::TokenCursor;
use crate::value::Value;

use super::{ArgumentParser, InputShape};

/// Accepts one token from a fixed set, case-insensitively, and binds the
/// declared spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceParser {
    choices: Vec<String>,
}

impl ChoiceParser {
    pub fn new<I, T>(choices: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for choice in choices.into_iter().map(Into::into) {
            if !unique.iter().any(|c| c.eq_ignore_ascii_case(&choice)) {
                unique.push(choice);
            }
        }
        Self { choices: unique }
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    fn lookup(&self, token: &str) -> Option<&str> {
        self.choices
            .iter()
            .find(|choice| choice.eq_ignore_ascii_case(token))
            .map(String::as_str)
    }
}

impl<S> ArgumentParser<S> for ChoiceParser {
    fn parse(
        &self,
        _ctx: &mut CommandContext<'_, S>,
        input: &mut TokenCursor<'_>,
    ) -> Result<Value, ArgumentError> {
        let token = input.peek().ok_or(ArgumentError::NoInput)?;
        let choice = self
            .lookup(token)
            .ok_or_else(|| ArgumentError::InvalidChoice {
                input: token.to_string(),
                choices: self.choices.clone(),
            })?
            .to_string();
        input.advance();
        Ok(Value::Text(choice))
    }

    fn suggestions(&self, _ctx: &CommandContext<'_, S>, input: &str) -> Vec<String> {
        let lowered = input.to_lowercase();
        self.choices
            .iter()
            .filter(|choice| choice.to_lowercase().starts_with(&lowered))
            .cloned()
            .collect()
    }

    fn is_context_free(&self) -> bool {
        true
    }

    fn shape(&self) -> InputShape {
        InputShape::Choices(self.choices.iter().map(|c| c.to_lowercase()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_canonical_value() {
        let parser = ChoiceParser::new(["Survival", "Creative", "creative"]);
        assert_eq!(parser.choices().len(), 2);

        let tokens = vec!["CREATIVE".to_string()];
        let mut cursor = TokenCursor::new(&tokens);
        let sender = ();
        let mut ctx = CommandContext::new(&sender);
        assert_eq!(
            parser.parse(&mut ctx, &mut cursor),
            Ok(Value::Text("Creative".into()))
        );
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_invalid_choice_and_suggestions() {
        let parser = ChoiceParser::new(["d6", "d8", "d20"]);
        let tokens = vec!["d7".to_string()];
        let mut cursor = TokenCursor::new(&tokens);
        let sender = ();
        let mut ctx = CommandContext::new(&sender);

        let err = parser.parse(&mut ctx, &mut cursor).unwrap_err();
        assert!(matches!(err, ArgumentError::InvalidChoice { .. }));
        assert_eq!(cursor.len(), 1);
        assert_eq!(parser.suggestions(&ctx, "d2"), vec!["d20".to_string()]);
    }
}
